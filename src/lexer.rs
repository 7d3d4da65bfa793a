use crate::syntax::SyntaxKind::{self, *};

/// Splits C source into tokens. Every byte of the input ends up in
/// exactly one token, so the tree built from them is lossless.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    line_start: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            input,
            pos: 0,
            line_start: true,
        }
    }

    fn peek_byte(&self, n: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + n).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn bump_while(&mut self, f: impl Fn(u8) -> bool) {
        while let Some(b) = self.peek_byte(0) {
            if !f(b) {
                break;
            }
            self.pos += 1;
        }
    }

    fn whitespace(&mut self) -> SyntaxKind {
        while let Some(b) = self.peek_byte(0) {
            match b {
                b'\n' => self.line_start = true,
                b' ' | b'\t' | b'\r' | 0x0b | 0x0c => {}
                // line continuation outside of directives
                b'\\' if matches!(self.peek_byte(1), Some(b'\n')) => self.pos += 1,
                _ => break,
            }
            self.pos += 1;
        }
        TOKEN_WHITESPACE
    }

    fn line_comment(&mut self) -> SyntaxKind {
        self.bump_while(|b| b != b'\n');
        TOKEN_COMMENT
    }

    fn block_comment(&mut self) -> SyntaxKind {
        self.pos += 2;
        match self.input[self.pos..].find("*/") {
            Some(end) => self.pos += end + 2,
            None => self.pos = self.input.len(),
        }
        TOKEN_COMMENT
    }

    fn directive(&mut self) -> SyntaxKind {
        while let Some(b) = self.peek_byte(0) {
            match b {
                b'\\' if matches!(self.peek_byte(1), Some(b'\n')) => self.pos += 2,
                b'\n' => break,
                _ => self.pos += 1,
            }
        }
        TOKEN_PREPROCESSOR
    }

    fn quoted(&mut self, quote: u8, kind: SyntaxKind) -> SyntaxKind {
        self.pos += 1;
        while let Some(b) = self.peek_byte(0) {
            match b {
                b'\\' => self.pos += if self.peek_byte(1).is_some() { 2 } else { 1 },
                b'\n' => break,
                _ => {
                    self.pos += 1;
                    if b == quote {
                        break;
                    }
                }
            }
        }
        // stay on a char boundary if an escape split a multibyte char
        while !self.input.is_char_boundary(self.pos) {
            self.pos += 1;
        }
        kind
    }

    fn number(&mut self) -> SyntaxKind {
        // preprocessing number: digits, letters, dots, and exponent signs
        while let Some(b) = self.peek_byte(0) {
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' {
                self.pos += 1;
                if matches!(b, b'e' | b'E' | b'p' | b'P') && matches!(self.peek_byte(0), Some(b'+' | b'-')) {
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
        TOKEN_NUMBER
    }

    fn ident(&mut self) -> SyntaxKind {
        let start = self.pos;
        self.bump_while(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$');
        let text = &self.input[start..self.pos];
        match (text, self.peek_byte(0)) {
            ("L" | "u" | "U" | "u8", Some(b'"')) => self.quoted(b'"', TOKEN_STRING),
            ("L" | "u" | "U", Some(b'\'')) => self.quoted(b'\'', TOKEN_CHAR),
            _ => keyword(text).unwrap_or(TOKEN_IDENT),
        }
    }

    fn punctuation(&mut self) -> SyntaxKind {
        const PUNCTUATION: &[(&str, SyntaxKind)] = &[
            ("...", TOKEN_ELLIPSIS),
            ("<<=", TOKEN_ASSIGN_OP),
            (">>=", TOKEN_ASSIGN_OP),
            ("->", TOKEN_ARROW),
            ("++", TOKEN_INCREMENT),
            ("--", TOKEN_DECREMENT),
            ("+=", TOKEN_ASSIGN_OP),
            ("-=", TOKEN_ASSIGN_OP),
            ("*=", TOKEN_ASSIGN_OP),
            ("/=", TOKEN_ASSIGN_OP),
            ("%=", TOKEN_ASSIGN_OP),
            ("&=", TOKEN_ASSIGN_OP),
            ("^=", TOKEN_ASSIGN_OP),
            ("|=", TOKEN_ASSIGN_OP),
            ("<<", TOKEN_OPERATOR),
            (">>", TOKEN_OPERATOR),
            ("<=", TOKEN_OPERATOR),
            (">=", TOKEN_OPERATOR),
            ("==", TOKEN_OPERATOR),
            ("!=", TOKEN_OPERATOR),
            ("&&", TOKEN_OPERATOR),
            ("||", TOKEN_OPERATOR),
            ("(", TOKEN_L_PAREN),
            (")", TOKEN_R_PAREN),
            ("{", TOKEN_L_BRACE),
            ("}", TOKEN_R_BRACE),
            ("[", TOKEN_L_BRACK),
            ("]", TOKEN_R_BRACK),
            (";", TOKEN_SEMICOLON),
            (",", TOKEN_COMMA),
            (".", TOKEN_DOT),
            ("?", TOKEN_QUESTION),
            (":", TOKEN_COLON),
            ("=", TOKEN_ASSIGN),
            ("*", TOKEN_STAR),
            ("&", TOKEN_AMP),
            ("+", TOKEN_PLUS),
            ("-", TOKEN_MINUS),
            ("!", TOKEN_BANG),
            ("~", TOKEN_TILDE),
            ("/", TOKEN_OPERATOR),
            ("%", TOKEN_OPERATOR),
            ("<", TOKEN_OPERATOR),
            (">", TOKEN_OPERATOR),
            ("^", TOKEN_OPERATOR),
            ("|", TOKEN_OPERATOR),
        ];

        for (text, kind) in PUNCTUATION {
            if self.starts_with(text) {
                self.pos += text.len();
                return *kind;
            }
        }

        // unknown character, consumed whole
        let len = self.input[self.pos..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        self.pos += len;
        TOKEN_ERROR
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = (SyntaxKind, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        let first = self.peek_byte(0)?;
        let line_start = self.line_start;
        self.line_start = false;

        let kind = match first {
            b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c => {
                self.line_start = line_start;
                self.whitespace()
            }
            b'\\' if matches!(self.peek_byte(1), Some(b'\n')) => {
                self.line_start = line_start;
                self.whitespace()
            }
            b'/' if self.peek_byte(1) == Some(b'/') => self.line_comment(),
            b'/' if self.peek_byte(1) == Some(b'*') => self.block_comment(),
            b'#' if line_start => self.directive(),
            b'"' => self.quoted(b'"', TOKEN_STRING),
            b'\'' => self.quoted(b'\'', TOKEN_CHAR),
            b'0'..=b'9' => self.number(),
            b'.' if matches!(self.peek_byte(1), Some(b'0'..=b'9')) => self.number(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => self.ident(),
            _ => self.punctuation(),
        };

        Some((kind, &self.input[start..self.pos]))
    }
}

/// Tokenize a whole input
pub fn tokenize(input: &str) -> Vec<(SyntaxKind, &str)> {
    Tokenizer::new(input).collect()
}

fn keyword(text: &str) -> Option<SyntaxKind> {
    let kind = match text {
        "typedef" => TOKEN_TYPEDEF,
        "extern" => TOKEN_EXTERN,
        "static" => TOKEN_STATIC,
        "struct" => TOKEN_STRUCT,
        "union" => TOKEN_UNION,
        "enum" => TOKEN_ENUM,
        "__attribute__" | "__attribute" | "__declspec" | "_Alignas" | "alignas" => TOKEN_ATTRIBUTE,
        "asm" | "__asm__" | "__asm" => TOKEN_ASM,
        "typeof" | "__typeof__" | "__typeof" => TOKEN_TYPEOF,
        "sizeof" | "_Alignof" | "alignof" | "__alignof__" | "__alignof" => TOKEN_SIZEOF,
        "if" => TOKEN_IF,
        "else" => TOKEN_ELSE,
        "while" => TOKEN_WHILE,
        "do" => TOKEN_DO,
        "for" => TOKEN_FOR,
        "switch" => TOKEN_SWITCH,
        "case" => TOKEN_CASE,
        "default" => TOKEN_DEFAULT,
        "return" => TOKEN_RETURN,
        "break" => TOKEN_BREAK,
        "continue" => TOKEN_CONTINUE,
        "goto" => TOKEN_GOTO,
        _ if is_type_word(text) || is_qualifier(text) => TOKEN_SPECIFIER,
        _ => return None,
    };
    Some(kind)
}

/// Builtin type names; at most one group of these forms a type
pub fn is_type_word(text: &str) -> bool {
    matches!(
        text,
        "void" | "char" | "short" | "int" | "long" | "float" | "double"
            | "signed" | "unsigned" | "_Bool" | "_Complex" | "__complex__"
            | "__signed" | "__signed__" | "__int128" | "_Float128"
            | "__float128" | "__builtin_va_list"
    )
}

fn is_qualifier(text: &str) -> bool {
    matches!(
        text,
        "const" | "volatile" | "restrict" | "auto" | "register" | "inline"
            | "_Noreturn" | "__inline" | "__inline__" | "__restrict"
            | "__restrict__" | "__const" | "__const__" | "__volatile"
            | "__volatile__" | "__extension__" | "_Thread_local" | "__thread"
    )
}
