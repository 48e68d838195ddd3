//! Values held on the AST stack between reductions
//!
//! Every reduced grammar symbol leaves one [`StackValue`] behind. Typed
//! accessors (`into_expression`, `into_declarator`, ...) turn a popped value
//! back into its node, or report which category was found instead.

use super::errors::ActionError;
use crate::parser::ast::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackValue {
    /// An optional grammar element that was not present.
    Empty,
    /// Index of a keyword token kept for a later specifier reduction.
    Token(usize),
    Name(Name),
    Expression(Expression),
    Statement(Statement),
    Declaration(Declaration),
    DeclSpecifier(DeclSpecifier),
    Declarator(Declarator),
    TypeId(TypeId),
    Pointer(PointerOperator),
    ArrayModifier(ArrayModifier),
    Initializer(Initializer),
    Enumerator(Enumerator),
    Parameter(ParameterDeclaration),
}

impl StackValue {
    pub fn describe(&self) -> &'static str {
        match self {
            StackValue::Empty => "empty marker",
            StackValue::Token(_) => "token",
            StackValue::Name(_) => "name",
            StackValue::Expression(_) => "expression",
            StackValue::Statement(_) => "statement",
            StackValue::Declaration(_) => "declaration",
            StackValue::DeclSpecifier(_) => "declaration specifier",
            StackValue::Declarator(_) => "declarator",
            StackValue::TypeId(_) => "type-id",
            StackValue::Pointer(_) => "pointer operator",
            StackValue::ArrayModifier(_) => "array modifier",
            StackValue::Initializer(_) => "initializer",
            StackValue::Enumerator(_) => "enumerator",
            StackValue::Parameter(_) => "parameter declaration",
        }
    }

    pub fn is_empty_marker(&self) -> bool {
        matches!(self, StackValue::Empty)
    }

    pub(crate) fn unexpected(expected: &'static str, found: &StackValue) -> ActionError {
        ActionError::UnexpectedValue {
            expected,
            found: found.describe(),
        }
    }
}

macro_rules! stack_values {
    ($($variant:ident($ty:ty) => $method:ident, $label:literal;)*) => {
        impl StackValue {
            $(
                pub fn $method(self) -> Result<$ty, ActionError> {
                    match self {
                        StackValue::$variant(value) => Ok(value),
                        other => Err(StackValue::unexpected($label, &other)),
                    }
                }
            )*
        }

        $(
            impl From<$ty> for StackValue {
                fn from(value: $ty) -> Self {
                    StackValue::$variant(value)
                }
            }
        )*
    };
}

stack_values! {
    Name(Name) => into_name, "name";
    Expression(Expression) => into_expression, "expression";
    Statement(Statement) => into_statement, "statement";
    Declaration(Declaration) => into_declaration, "declaration";
    DeclSpecifier(DeclSpecifier) => into_decl_specifier, "declaration specifier";
    Declarator(Declarator) => into_declarator, "declarator";
    TypeId(TypeId) => into_type_id, "type-id";
    Pointer(PointerOperator) => into_pointer, "pointer operator";
    ArrayModifier(ArrayModifier) => into_array_modifier, "array modifier";
    Initializer(Initializer) => into_initializer, "initializer";
    Enumerator(Enumerator) => into_enumerator, "enumerator";
    Parameter(ParameterDeclaration) => into_parameter, "parameter declaration";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessors() {
        let value = StackValue::from(Name::new("x"));
        assert_eq!(value.into_name().map(|name| name.text), Ok("x".to_string()));

        let err = StackValue::Empty.into_expression().unwrap_err();
        assert_eq!(
            err,
            ActionError::UnexpectedValue {
                expected: "expression",
                found: "empty marker"
            }
        );
    }
}
