//! Syntax kinds and the `rowan` language binding for C.

#![allow(non_camel_case_types)]

macro_rules! syntax_kinds {
    ($($kind:ident,)*) => {
        /// Every token and node kind of the C syntax tree.
        ///
        /// Tokens come first, nodes after.
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        pub enum SyntaxKind {
            $($kind,)*
        }

        impl SyntaxKind {
            /// Every kind, indexed by its raw value
            pub const ALL: &'static [SyntaxKind] = &[$(SyntaxKind::$kind,)*];
        }
    };
}

syntax_kinds! {
    // trivia
    TOKEN_WHITESPACE,
    TOKEN_COMMENT,
    TOKEN_PREPROCESSOR,
    TOKEN_ERROR,

    // atoms
    TOKEN_IDENT,
    TOKEN_NUMBER,
    TOKEN_STRING,
    TOKEN_CHAR,

    // keywords
    TOKEN_TYPEDEF,
    TOKEN_EXTERN,
    TOKEN_STATIC,
    TOKEN_SPECIFIER,
    TOKEN_STRUCT,
    TOKEN_UNION,
    TOKEN_ENUM,
    TOKEN_ATTRIBUTE,
    TOKEN_ASM,
    TOKEN_TYPEOF,
    TOKEN_SIZEOF,
    TOKEN_IF,
    TOKEN_ELSE,
    TOKEN_WHILE,
    TOKEN_DO,
    TOKEN_FOR,
    TOKEN_SWITCH,
    TOKEN_CASE,
    TOKEN_DEFAULT,
    TOKEN_RETURN,
    TOKEN_BREAK,
    TOKEN_CONTINUE,
    TOKEN_GOTO,

    // punctuation
    TOKEN_L_PAREN,
    TOKEN_R_PAREN,
    TOKEN_L_BRACE,
    TOKEN_R_BRACE,
    TOKEN_L_BRACK,
    TOKEN_R_BRACK,
    TOKEN_SEMICOLON,
    TOKEN_COMMA,
    TOKEN_DOT,
    TOKEN_ARROW,
    TOKEN_ELLIPSIS,
    TOKEN_QUESTION,
    TOKEN_COLON,
    TOKEN_ASSIGN,
    TOKEN_ASSIGN_OP,
    TOKEN_STAR,
    TOKEN_AMP,
    TOKEN_PLUS,
    TOKEN_MINUS,
    TOKEN_INCREMENT,
    TOKEN_DECREMENT,
    TOKEN_BANG,
    TOKEN_TILDE,
    TOKEN_OPERATOR,

    // top level and declarations
    NODE_ROOT,
    NODE_ERROR,
    NODE_FUNCTION_DEF,
    NODE_DECL_GROUP,
    NODE_SPECIFIERS,
    NODE_TAG_SPECIFIER,
    NODE_STRUCT_BODY,
    NODE_FIELD_GROUP,
    NODE_ENUM_BODY,
    NODE_ENUMERATOR,
    NODE_ATTRIBUTE,
    NODE_TYPEOF,
    NODE_INIT_DECLARATOR,
    NODE_DECLARATOR,
    NODE_NESTED_DECLARATOR,
    NODE_NAME,
    NODE_ARRAY_SUFFIX,
    NODE_PARAM_LIST,
    NODE_PARAM,
    NODE_INIT_LIST,
    NODE_DESIGNATOR,
    NODE_TYPE_NAME,

    // statements
    NODE_COMPOUND_STMT,
    NODE_EXPR_STMT,
    NODE_IF_STMT,
    NODE_WHILE_STMT,
    NODE_DO_STMT,
    NODE_FOR_STMT,
    NODE_SWITCH_STMT,
    NODE_CASE_STMT,
    NODE_LABELED_STMT,
    NODE_RETURN_STMT,
    NODE_JUMP_STMT,
    NODE_ASM_STMT,
    NODE_EMPTY_STMT,

    // expressions
    NODE_NAME_REF,
    NODE_LITERAL,
    NODE_PAREN_EXPR,
    NODE_STMT_EXPR,
    NODE_BIN_EXPR,
    NODE_COND_EXPR,
    NODE_PREFIX_EXPR,
    NODE_POSTFIX_EXPR,
    NODE_CAST_EXPR,
    NODE_COMPOUND_LITERAL,
    NODE_SIZEOF_EXPR,
    NODE_CALL_EXPR,
    NODE_ARG_LIST,
    NODE_INDEX_EXPR,
    NODE_FIELD_EXPR,
}

use SyntaxKind::*;

impl SyntaxKind {
    /// Tokens that carry no syntax: whitespace, comments, and `#` lines
    pub fn is_trivia(self) -> bool {
        matches!(self, TOKEN_WHITESPACE | TOKEN_COMMENT | TOKEN_PREPROCESSOR)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CLanguage {}

impl rowan::Language for CLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> SyntaxKind {
        // raw kinds only come from `kind_to_raw`
        SyntaxKind::ALL
            .get(usize::from(raw.0))
            .copied()
            .unwrap_or(TOKEN_ERROR)
    }

    fn kind_to_raw(kind: SyntaxKind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<CLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<CLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<CLanguage>;

/// First child node of the given kind
pub fn child(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxNode> {
    node.children().find(|child| child.kind() == kind)
}

/// Whether `node` directly holds a token of the given kind
pub fn has_token(node: &SyntaxNode, kind: SyntaxKind) -> bool {
    node.children_with_tokens()
        .any(|element| element.as_token().map_or(false, |token| token.kind() == kind))
}
