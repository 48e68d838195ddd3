//! Parser configuration
//!
//! [`ParserOptions`] selects the language dialect, the keyword table, the
//! completion caret and the initializer-skipping mode. Options are plain data:
//! they are cloned into a [`crate::Parser`] and borrowed by every reduction
//! action and secondary parse of that parser.

use crate::parser::parse::ParseError;
use crate::parser::symbols::{self, SymbolTable};

/// Language variant accepted by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    #[default]
    C,
    Cpp,
}

impl Dialect {
    /// Whether a declaration may omit its type specifier entirely.
    pub fn allows_implicit_int(self) -> bool {
        matches!(self, Dialect::C)
    }

    pub fn name(self) -> &'static str {
        match self {
            Dialect::C => "C",
            Dialect::Cpp => "C++",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParserOptions {
    pub dialect: Dialect,
    /// Accept the GNU keyword spellings (`__const`, `__inline__`, ...).
    pub gnu_extensions: bool,
    /// Byte offset of the code-completion caret, if this is a completion parse.
    pub completion_offset: Option<usize>,
    /// Drop initializer-list elements that cannot contain a name.
    pub skip_trivial_initializers: bool,
}

impl ParserOptions {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    pub fn with_gnu_extensions(mut self, enabled: bool) -> Self {
        self.gnu_extensions = enabled;
        self
    }

    pub fn with_completion_offset(mut self, offset: usize) -> Self {
        self.completion_offset = Some(offset);
        self
    }

    pub fn with_skip_trivial_initializers(mut self, enabled: bool) -> Self {
        self.skip_trivial_initializers = enabled;
        self
    }

    /// Keyword table the lexer tokenizes with.
    pub fn symbol_table(&self) -> &'static SymbolTable {
        match (self.dialect, self.gnu_extensions) {
            (Dialect::C, false) => &symbols::C99,
            (Dialect::C, true) => &symbols::GNU_C99,
            (Dialect::Cpp, false) => &symbols::CPP,
            (Dialect::Cpp, true) => &symbols::GNU_CPP,
        }
    }

    /// Keyword table of the base grammar the parser is written against.
    pub fn base_symbol_table(&self) -> &'static SymbolTable {
        match self.dialect {
            Dialect::C => &symbols::C99,
            Dialect::Cpp => &symbols::CPP,
        }
    }

    pub(crate) fn validate(&self, source_len: usize) -> Result<(), ParseError> {
        match self.completion_offset {
            Some(offset) if offset > source_len => Err(ParseError::InvalidOptions(format!(
                "completion offset {offset} is past the end of the source ({source_len} bytes)"
            ))),
            _ => Ok(()),
        }
    }
}
