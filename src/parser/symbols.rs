//! Keyword tables and the token kind map
//!
//! A [`SymbolTable`] is the keyword vocabulary of one grammar. Extension
//! grammars (the GNU tables) add spellings whose kinds do not exist in the
//! base grammar, together with aliases naming the base kind each one stands
//! for. [`TokenKindMap`] applies those aliases when the parser classifies a
//! token, so the lexed tokens themselves never change.

use super::lexer::TokenKind;
use rustc_hash::FxHashMap;

type Keywords = &'static [(&'static str, TokenKind)];

const C99_KEYWORDS: Keywords = &[
    ("auto", TokenKind::Auto),
    ("break", TokenKind::Break),
    ("case", TokenKind::Case),
    ("char", TokenKind::Char),
    ("const", TokenKind::Const),
    ("continue", TokenKind::Continue),
    ("default", TokenKind::Default),
    ("do", TokenKind::Do),
    ("double", TokenKind::Double),
    ("else", TokenKind::Else),
    ("enum", TokenKind::Enum),
    ("extern", TokenKind::Extern),
    ("float", TokenKind::Float),
    ("for", TokenKind::For),
    ("goto", TokenKind::Goto),
    ("if", TokenKind::If),
    ("inline", TokenKind::Inline),
    ("int", TokenKind::Int),
    ("long", TokenKind::Long),
    ("register", TokenKind::Register),
    ("restrict", TokenKind::Restrict),
    ("return", TokenKind::Return),
    ("short", TokenKind::Short),
    ("signed", TokenKind::Signed),
    ("sizeof", TokenKind::Sizeof),
    ("static", TokenKind::Static),
    ("struct", TokenKind::Struct),
    ("switch", TokenKind::Switch),
    ("typedef", TokenKind::Typedef),
    ("union", TokenKind::Union),
    ("unsigned", TokenKind::Unsigned),
    ("void", TokenKind::Void),
    ("volatile", TokenKind::Volatile),
    ("while", TokenKind::While),
    ("_Bool", TokenKind::Bool),
];

const CPP_KEYWORDS: Keywords = &[
    ("auto", TokenKind::Auto),
    ("bool", TokenKind::Bool),
    ("break", TokenKind::Break),
    ("case", TokenKind::Case),
    ("char", TokenKind::Char),
    ("const", TokenKind::Const),
    ("continue", TokenKind::Continue),
    ("default", TokenKind::Default),
    ("do", TokenKind::Do),
    ("double", TokenKind::Double),
    ("else", TokenKind::Else),
    ("enum", TokenKind::Enum),
    ("extern", TokenKind::Extern),
    ("false", TokenKind::False),
    ("float", TokenKind::Float),
    ("for", TokenKind::For),
    ("goto", TokenKind::Goto),
    ("if", TokenKind::If),
    ("inline", TokenKind::Inline),
    ("int", TokenKind::Int),
    ("long", TokenKind::Long),
    ("register", TokenKind::Register),
    ("return", TokenKind::Return),
    ("short", TokenKind::Short),
    ("signed", TokenKind::Signed),
    ("sizeof", TokenKind::Sizeof),
    ("static", TokenKind::Static),
    ("struct", TokenKind::Struct),
    ("switch", TokenKind::Switch),
    ("this", TokenKind::This),
    ("true", TokenKind::True),
    ("typedef", TokenKind::Typedef),
    ("typeid", TokenKind::Typeid),
    ("union", TokenKind::Union),
    ("unsigned", TokenKind::Unsigned),
    ("void", TokenKind::Void),
    ("volatile", TokenKind::Volatile),
    ("while", TokenKind::While),
];

const GNU_KEYWORDS: Keywords = &[
    ("__const", TokenKind::GnuConst),
    ("__const__", TokenKind::GnuConst),
    ("__inline", TokenKind::GnuInline),
    ("__inline__", TokenKind::GnuInline),
    ("__restrict", TokenKind::GnuRestrict),
    ("__restrict__", TokenKind::GnuRestrict),
    ("__signed__", TokenKind::GnuSigned),
    ("__volatile", TokenKind::GnuVolatile),
    ("__volatile__", TokenKind::GnuVolatile),
];

const GNU_ALIASES: &[(TokenKind, TokenKind)] = &[
    (TokenKind::GnuConst, TokenKind::Const),
    (TokenKind::GnuInline, TokenKind::Inline),
    (TokenKind::GnuRestrict, TokenKind::Restrict),
    (TokenKind::GnuSigned, TokenKind::Signed),
    (TokenKind::GnuVolatile, TokenKind::Volatile),
];

/// Keyword vocabulary of one grammar.
#[derive(Debug)]
pub struct SymbolTable {
    name: &'static str,
    keyword_sets: &'static [Keywords],
    aliases: &'static [(TokenKind, TokenKind)],
}

pub static C99: SymbolTable = SymbolTable {
    name: "c99",
    keyword_sets: &[C99_KEYWORDS],
    aliases: &[],
};

pub static CPP: SymbolTable = SymbolTable {
    name: "c++",
    keyword_sets: &[CPP_KEYWORDS],
    aliases: &[],
};

pub static GNU_C99: SymbolTable = SymbolTable {
    name: "gnu-c99",
    keyword_sets: &[C99_KEYWORDS, GNU_KEYWORDS],
    aliases: GNU_ALIASES,
};

pub static GNU_CPP: SymbolTable = SymbolTable {
    name: "gnu-c++",
    keyword_sets: &[CPP_KEYWORDS, GNU_KEYWORDS],
    aliases: GNU_ALIASES,
};

impl SymbolTable {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn keywords(&self) -> impl Iterator<Item = (&'static str, TokenKind)> + '_ {
        self.keyword_sets.iter().flat_map(|set| set.iter().copied())
    }

    /// Extension kinds paired with the base kind they stand for.
    pub fn aliases(&self) -> &'static [(TokenKind, TokenKind)] {
        self.aliases
    }
}

/// Translates token kinds of an extension grammar into the kinds of the base
/// grammar the parser is written against.
#[derive(Debug, Clone, Default)]
pub struct TokenKindMap {
    // `None` is the identity map
    mapping: Option<FxHashMap<TokenKind, TokenKind>>,
}

impl TokenKindMap {
    /// Builds the map once per grammar pair. When the lexer's table is the
    /// base table itself the map is the identity and costs one branch.
    pub fn new(extension: &SymbolTable, base: &SymbolTable) -> Self {
        if std::ptr::eq(extension, base) {
            return Self::identity();
        }

        let mapping = extension.aliases().iter().copied().collect();
        Self {
            mapping: Some(mapping),
        }
    }

    pub fn identity() -> Self {
        Self { mapping: None }
    }

    pub fn is_identity(&self) -> bool {
        self.mapping.is_none()
    }

    #[inline]
    pub fn map(&self, kind: TokenKind) -> TokenKind {
        match &self.mapping {
            None => kind,
            Some(mapping) => mapping.get(&kind).copied().unwrap_or(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_for_shared_table() {
        let map = TokenKindMap::new(&C99, &C99);
        assert!(map.is_identity());
        assert_eq!(map.map(TokenKind::GnuConst), TokenKind::GnuConst);
    }

    #[test]
    fn test_gnu_aliases_map_to_base_kinds() {
        let map = TokenKindMap::new(&GNU_C99, &C99);
        assert!(!map.is_identity());
        for &(extension, base) in GNU_ALIASES {
            assert_eq!(map.map(extension), base);
        }
        assert_eq!(map.map(TokenKind::Identifier), TokenKind::Identifier);
        assert_eq!(map.map(TokenKind::Const), TokenKind::Const);
    }

    #[test]
    fn test_gnu_table_extends_base_keywords() {
        let base = C99.keywords().count();
        assert_eq!(GNU_C99.keywords().count(), base + GNU_KEYWORDS.len());
        assert!(GNU_CPP.keywords().any(|(word, _)| word == "typeid"));
    }
}
