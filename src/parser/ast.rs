// AST (Abstract Syntax Tree) definitions built by the reduction actions

use crate::options::Dialect;
use std::fmt;

/// Source range of a node: byte offset plus length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub offset: usize,
    pub length: usize,
}

impl Span {
    pub const fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// Span from `offset` up to `end`, clamped to zero length.
    pub fn between(offset: usize, end: usize) -> Self {
        Self::new(offset, end.saturating_sub(offset))
    }

    pub const fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Smallest span covering both `self` and `other`.
    pub fn union(self, other: Span) -> Span {
        Span::between(self.offset.min(other.offset), self.end().max(other.end()))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.offset, self.end())
    }
}

/// An identifier as written in the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Name {
    pub text: String,
    pub span: Span,
}

impl Name {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            span: Span::default(),
        }
    }

    /// Abstract declarators and anonymous tags carry an empty name.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Integer,
    Float,
    Char,
    String,
    True,
    False,
    This,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    PrefixIncr,
    PrefixDecr,
    Plus,
    Minus,
    Star,
    Amper,
    Tilde,
    Not,
    Sizeof,
    PostfixIncr,
    PostfixDecr,
    /// Parenthesized expression `( e )`.
    Bracketed,
    Typeid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Multiply,
    Divide,
    Modulo,
    Plus,
    Minus,
    ShiftLeft,
    ShiftRight,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equals,
    NotEquals,
    BinaryAnd,
    BinaryXor,
    BinaryOr,
    LogicalAnd,
    LogicalOr,
    Assign,
    MultiplyAssign,
    DivideAssign,
    ModuloAssign,
    PlusAssign,
    MinusAssign,
    ShiftLeftAssign,
    ShiftRightAssign,
    BinaryAndAssign,
    BinaryXorAssign,
    BinaryOrAssign,
}

impl BinaryOp {
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            BinaryOp::Assign
                | BinaryOp::MultiplyAssign
                | BinaryOp::DivideAssign
                | BinaryOp::ModuloAssign
                | BinaryOp::PlusAssign
                | BinaryOp::MinusAssign
                | BinaryOp::ShiftLeftAssign
                | BinaryOp::ShiftRightAssign
                | BinaryOp::BinaryAndAssign
                | BinaryOp::BinaryXorAssign
                | BinaryOp::BinaryOrAssign
        )
    }
}

/// Operator of an expression whose operand is a type-id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeIdOp {
    Sizeof,
    Typeid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemId {
    SyntaxError,
}

/// Marker for a span the parser could not make sense of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub id: ProblemId,
    pub text: String,
    pub span: Span,
}

// ===== Expressions =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionKind {
    Id(Name),
    Literal {
        kind: LiteralKind,
        text: String,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Conditional {
        condition: Box<Expression>,
        positive: Box<Expression>,
        negative: Box<Expression>,
    },
    Cast {
        type_id: Box<TypeId>,
        operand: Box<Expression>,
    },
    TypeIdExpression {
        op: TypeIdOp,
        type_id: Box<TypeId>,
    },
    FunctionCall {
        function: Box<Expression>,
        argument: Option<Box<Expression>>,
    },
    ArraySubscript {
        array: Box<Expression>,
        subscript: Box<Expression>,
    },
    FieldReference {
        owner: Box<Expression>,
        field: Name,
        is_pointer: bool,
    },
    /// Comma-separated expression list with at least two elements.
    List(Vec<Expression>),
    /// Alternative readings of the same tokens, left for a semantic pass.
    Ambiguous(Vec<Expression>),
    Problem(Problem),
}

impl Expression {
    pub fn new(kind: ExpressionKind) -> Self {
        Self {
            kind,
            span: Span::default(),
        }
    }

    pub fn is_problem(&self) -> bool {
        matches!(self.kind, ExpressionKind::Problem(_))
    }

    pub fn is_function_call(&self) -> bool {
        matches!(self.kind, ExpressionKind::FunctionCall { .. })
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self.kind, ExpressionKind::Ambiguous(_))
    }
}

// ===== Statements =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    Expression(Expression),
    Declaration(Declaration),
    Compound(Vec<Statement>),
    Null,
    If {
        condition: Expression,
        then_clause: Box<Statement>,
        else_clause: Option<Box<Statement>>,
    },
    Switch {
        controller: Expression,
        body: Box<Statement>,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
    },
    DoWhile {
        body: Box<Statement>,
        condition: Expression,
    },
    For {
        init: Option<Box<Statement>>,
        condition: Option<Expression>,
        iteration: Option<Expression>,
        body: Box<Statement>,
    },
    Case(Expression),
    Default,
    Label {
        name: Name,
        body: Box<Statement>,
    },
    Goto(Name),
    Break,
    Continue,
    Return(Option<Expression>),
    Ambiguous(Vec<Statement>),
    Problem(Problem),
}

impl Statement {
    pub fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            span: Span::default(),
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self.kind, StatementKind::Ambiguous(_))
    }
}

// ===== Declarations =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationKind {
    Simple {
        specifier: DeclSpecifier,
        declarators: Vec<Declarator>,
    },
    FunctionDefinition {
        specifier: DeclSpecifier,
        declarator: Declarator,
        body: Box<Statement>,
    },
    Problem(Problem),
}

impl Declaration {
    pub fn new(kind: DeclarationKind) -> Self {
        Self {
            kind,
            span: Span::default(),
        }
    }

    pub fn specifier(&self) -> Option<&DeclSpecifier> {
        match &self.kind {
            DeclarationKind::Simple { specifier, .. }
            | DeclarationKind::FunctionDefinition { specifier, .. } => Some(specifier),
            DeclarationKind::Problem(_) => None,
        }
    }

    /// True when the declaration has no type specifier at all.
    pub fn is_implicit_int(&self) -> bool {
        self.specifier().is_some_and(DeclSpecifier::is_implicit_int)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageClass {
    #[default]
    None,
    Typedef,
    Extern,
    Static,
    Auto,
    Register,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BaseType {
    #[default]
    Unspecified,
    Void,
    Char,
    Int,
    Float,
    Double,
    Bool,
}

/// Built-in type assembled from keyword specifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimpleType {
    pub base: BaseType,
    pub is_short: bool,
    pub long_count: u8,
    pub is_signed: bool,
    pub is_unsigned: bool,
}

impl SimpleType {
    pub fn is_unspecified(&self) -> bool {
        *self == SimpleType::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKey {
    Struct,
    Union,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElaboratedKey {
    Struct,
    Union,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclSpecifierKind {
    Simple(SimpleType),
    /// A typedef name used as a type.
    Named(Name),
    Composite {
        key: CompositeKey,
        name: Name,
        members: Vec<Declaration>,
    },
    Elaborated {
        key: ElaboratedKey,
        name: Name,
    },
    Enumeration {
        name: Name,
        enumerators: Vec<Enumerator>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclSpecifier {
    pub kind: DeclSpecifierKind,
    pub storage: StorageClass,
    pub is_const: bool,
    pub is_volatile: bool,
    pub is_restrict: bool,
    pub is_inline: bool,
    pub span: Span,
}

impl DeclSpecifier {
    pub fn is_implicit_int(&self) -> bool {
        matches!(&self.kind, DeclSpecifierKind::Simple(simple) if simple.is_unspecified())
    }

    pub fn is_typedef(&self) -> bool {
        self.storage == StorageClass::Typedef
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerOperator {
    pub is_const: bool,
    pub is_volatile: bool,
    pub is_restrict: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayModifier {
    pub size: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaratorKind {
    Plain,
    Array(Vec<ArrayModifier>),
    Function {
        parameters: Vec<ParameterDeclaration>,
        /// K&R identifier list, `f(a, b)`.
        identifiers: Vec<Name>,
        takes_varargs: bool,
    },
    Field {
        bit_width: Expression,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declarator {
    pub name: Name,
    pub pointers: Vec<PointerOperator>,
    pub nested: Option<Box<Declarator>>,
    pub kind: DeclaratorKind,
    pub initializer: Option<Initializer>,
    pub span: Span,
}

impl Declarator {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            pointers: Vec::new(),
            nested: None,
            kind: DeclaratorKind::Plain,
            initializer: None,
            span: Span::default(),
        }
    }

    /// Whether the declared entity has function type.
    ///
    /// Pointer operators attached to a function declarator belong to its
    /// return type, so `*f(void)` is still a function. A nested declarator
    /// with pointers (`(*fp)(int)`) makes it a pointer to function instead.
    pub fn is_function_type(&self) -> bool {
        match &self.kind {
            DeclaratorKind::Function { .. } => self
                .nested
                .as_deref()
                .map_or(true, |nested| nested.pointers.is_empty()),
            DeclaratorKind::Plain if self.pointers.is_empty() => self
                .nested
                .as_deref()
                .is_some_and(Declarator::is_function_type),
            _ => false,
        }
    }

    /// The name being declared, looking through parenthesized declarators.
    pub fn innermost_name(&self) -> &Name {
        match &self.nested {
            Some(nested) if self.name.is_empty() => nested.innermost_name(),
            _ => &self.name,
        }
    }

    /// A declarator that only names its entity (or names nothing).
    pub fn is_plain(&self) -> bool {
        matches!(self.kind, DeclaratorKind::Plain) && self.pointers.is_empty() && self.nested.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDeclaration {
    pub specifier: DeclSpecifier,
    pub declarator: Declarator,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Initializer {
    pub kind: InitializerKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitializerKind {
    Expression(Expression),
    List(Vec<Initializer>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumerator {
    pub name: Name,
    pub value: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeId {
    pub specifier: DeclSpecifier,
    pub declarator: Declarator,
    pub span: Span,
}

// ===== Translation unit =====

/// Root of the tree. Created empty before the first reduction, filled when
/// the outermost scope closes, frozen afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    declarations: Vec<Declaration>,
    pub span: Span,
    pub dialect: Dialect,
    frozen: bool,
}

impl TranslationUnit {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            declarations: Vec::new(),
            span: Span::default(),
            dialect,
            frozen: false,
        }
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Mutable access for deferred passes that run before the unit is frozen.
    pub fn declarations_mut(&mut self) -> &mut [Declaration] {
        &mut self.declarations
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub(crate) fn push_declaration(&mut self, declaration: Declaration) {
        self.declarations.push(declaration);
    }

    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function_declarator(nested: Option<Declarator>) -> Declarator {
        let mut declarator = Declarator::new(Name::new(if nested.is_some() { "" } else { "f" }));
        declarator.nested = nested.map(Box::new);
        declarator.kind = DeclaratorKind::Function {
            parameters: Vec::new(),
            identifiers: Vec::new(),
            takes_varargs: false,
        };
        declarator
    }

    #[test]
    fn test_span_union_and_clamp() {
        let a = Span::new(4, 3);
        let b = Span::new(0, 2);
        assert_eq!(a.union(b), Span::new(0, 7));
        assert_eq!(Span::between(9, 3), Span::new(9, 0));
    }

    #[test]
    fn test_function_type_detection() {
        assert!(function_declarator(None).is_function_type());

        let mut pointer = Declarator::new(Name::new("fp"));
        pointer.pointers.push(PointerOperator::default());
        assert!(!function_declarator(Some(pointer)).is_function_type());

        let plain = Declarator::new(Name::new("f"));
        assert!(function_declarator(Some(plain)).is_function_type());

        let mut returns_pointer = function_declarator(None);
        returns_pointer.pointers.push(PointerOperator::default());
        assert!(returns_pointer.is_function_type());
    }

    #[test]
    fn test_innermost_name() {
        let inner = Declarator::new(Name::new("x"));
        let mut outer = Declarator::new(Name::default());
        outer.nested = Some(Box::new(inner));
        assert_eq!(outer.innermost_name().text, "x");
    }
}
