use std::collections::HashMap;

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange, TextSize};

use crate::{
    error::ParseError,
    lexer::{self, is_type_word},
    syntax::{SyntaxKind::{self, *}, SyntaxNode},
};

/// The result of parsing: a lossless tree plus any syntax errors
#[derive(Debug, Clone)]
pub struct Parse {
    green: GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    pub fn node(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }
}

/// Parse a C translation unit. Always produces a tree, even for broken
/// input; check `errors()` before trusting it.
pub fn parse(text: &str) -> Parse {
    let mut parser = Parser::new(text);
    parser.root();
    Parse {
        green: parser.builder.finish(),
        errors: parser.errors,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclContext {
    File,
    Block,
    ForInit,
}

struct Specifiers {
    typedef: bool,
    has_type: bool,
}

/// Ordinary identifiers of one scope, `true` for typedef names
type Names = HashMap<String, bool>;

struct Parser<'a> {
    tokens: Vec<(SyntaxKind, &'a str)>,
    starts: Vec<TextSize>,
    end: TextSize,
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<ParseError>,
    names: Vec<Names>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        let tokens = lexer::tokenize(text);
        let mut starts = Vec::with_capacity(tokens.len());
        let mut offset = TextSize::from(0);
        for (_, token) in &tokens {
            starts.push(offset);
            offset += TextSize::of(*token);
        }
        Parser {
            tokens,
            starts,
            end: offset,
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
            names: vec![HashMap::new()],
        }
    }

    // token cursor

    fn nth_index(&self, n: usize) -> Option<usize> {
        self.tokens[self.pos..]
            .iter()
            .enumerate()
            .filter(|(_, (kind, _))| !kind.is_trivia())
            .nth(n)
            .map(|(i, _)| self.pos + i)
    }

    fn nth(&self, n: usize) -> Option<SyntaxKind> {
        self.nth_index(n).map(|i| self.tokens[i].0)
    }

    fn nth_text(&self, n: usize) -> &'a str {
        self.nth_index(n).map_or("", |i| self.tokens[i].1)
    }

    fn current(&self) -> Option<SyntaxKind> {
        self.nth(0)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == Some(kind)
    }

    fn at_end(&self) -> bool {
        self.current().is_none()
    }

    /// Index of the next significant token, to detect lack of progress
    fn mark(&self) -> usize {
        self.nth_index(0).unwrap_or(self.tokens.len())
    }

    // tree building

    fn eat_trivia(&mut self) {
        while let Some(&(kind, text)) = self.tokens.get(self.pos) {
            if !kind.is_trivia() {
                break;
            }
            self.builder.token(kind.into(), text);
            self.pos += 1;
        }
    }

    fn bump(&mut self) {
        self.eat_trivia();
        if let Some(&(kind, text)) = self.tokens.get(self.pos) {
            self.builder.token(kind.into(), text);
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind, what: &str) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!("expected {}", what));
            false
        }
    }

    fn start_node(&mut self, kind: SyntaxKind) {
        self.eat_trivia();
        self.builder.start_node(kind.into());
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.eat_trivia();
        self.builder.checkpoint()
    }

    fn error(&mut self, message: impl Into<String>) {
        let range = match self.nth_index(0) {
            Some(i) => TextRange::at(self.starts[i], TextSize::of(self.tokens[i].1)),
            None => TextRange::empty(self.end),
        };
        self.errors.push(ParseError {
            message: message.into(),
            range,
        });
    }

    fn bump_error(&mut self, message: &str) {
        self.error(message);
        self.start_node(NODE_ERROR);
        self.bump();
        self.finish_node();
    }

    // ordinary identifier scopes, for telling typedef names apart

    fn push_scope(&mut self) {
        self.names.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.names.pop();
    }

    fn declare_name(&mut self, name: String, typedef: bool) {
        if let Some(scope) = self.names.last_mut() {
            scope.insert(name, typedef);
        }
    }

    fn is_typedef_name(&self, text: &str) -> bool {
        self.names
            .iter()
            .rev()
            .find_map(|scope| scope.get(text).copied())
            .unwrap_or(false)
    }

    fn is_type_start(&self, n: usize) -> bool {
        match self.nth(n) {
            Some(TOKEN_SPECIFIER) => self.nth_text(n) != "__extension__",
            Some(TOKEN_STRUCT | TOKEN_UNION | TOKEN_ENUM | TOKEN_TYPEOF) => true,
            Some(TOKEN_IDENT) => self.is_typedef_name(self.nth_text(n)),
            _ => false,
        }
    }

    fn is_declaration_start(&self) -> bool {
        match self.current() {
            Some(
                TOKEN_TYPEDEF | TOKEN_EXTERN | TOKEN_STATIC | TOKEN_STRUCT | TOKEN_UNION
                | TOKEN_ENUM | TOKEN_TYPEOF | TOKEN_ATTRIBUTE,
            ) => true,
            Some(TOKEN_SPECIFIER) => {
                self.nth_text(0) != "__extension__" || self.nth(1) != Some(TOKEN_L_PAREN)
            }
            Some(TOKEN_IDENT) => {
                self.is_typedef_name(self.nth_text(0)) && self.nth(1) != Some(TOKEN_COLON)
            }
            _ => false,
        }
    }

    // declarations

    fn root(&mut self) {
        self.builder.start_node(NODE_ROOT.into());
        while !self.at_end() {
            let mark = self.mark();
            self.external_declaration();
            if self.mark() == mark {
                self.bump_error("expected a declaration");
            }
        }
        self.eat_trivia();
        self.builder.finish_node();
    }

    fn external_declaration(&mut self) {
        match self.current() {
            Some(TOKEN_SEMICOLON) => {
                self.start_node(NODE_EMPTY_STMT);
                self.bump();
                self.finish_node();
            }
            Some(TOKEN_ASM) => self.asm_statement(),
            Some(TOKEN_IDENT | TOKEN_STAR | TOKEN_L_PAREN) => self.declaration(DeclContext::File),
            _ if self.is_declaration_start() => self.declaration(DeclContext::File),
            _ => self.bump_error("expected a declaration"),
        }
    }

    fn declaration(&mut self, context: DeclContext) {
        let group = self.checkpoint();
        let specifiers = self.specifiers();

        if self.at(TOKEN_SEMICOLON) {
            // only a tag or attribute, no declarators
            self.start_node_at(group, NODE_DECL_GROUP);
            if context != DeclContext::ForInit {
                self.bump();
            }
            self.finish_node();
            return;
        }

        let declarator = self.checkpoint();
        let (name, params) = self.function_declarator();
        // old-style definitions declare their parameters before the body
        let old_style = params.is_some() && self.is_declaration_start();
        if context == DeclContext::File && (self.at(TOKEN_L_BRACE) || old_style) {
            self.start_node_at(group, NODE_FUNCTION_DEF);
            if let Some(name) = name {
                self.declare_name(name, false);
            }
            self.function_body(params.unwrap_or_default());
            self.finish_node();
            return;
        }

        self.init_declarator(declarator, name, specifiers.typedef);
        while self.eat(TOKEN_COMMA) {
            let declarator = self.checkpoint();
            let name = self.declarator();
            self.init_declarator(declarator, name, specifiers.typedef);
        }

        self.start_node_at(group, NODE_DECL_GROUP);
        if context != DeclContext::ForInit {
            self.expect(TOKEN_SEMICOLON, "`;` after declaration");
        }
        self.finish_node();
    }

    /// Parameter declarations of an old-style definition, then the body,
    /// all with the parameters in scope
    fn function_body(&mut self, params: Names) {
        self.names.push(params);
        while self.is_declaration_start() {
            let mark = self.mark();
            self.declaration(DeclContext::Block);
            if self.mark() == mark {
                break;
            }
        }
        if self.at(TOKEN_L_BRACE) {
            self.compound_statement();
        } else {
            self.error("expected a function body");
        }
        self.pop_scope();
    }

    /// Wraps the declarator parsed since `declarator` together with its
    /// initializer. The name is in scope for the initializer already.
    fn init_declarator(&mut self, declarator: Checkpoint, name: Option<String>, typedef: bool) {
        self.start_node_at(declarator, NODE_INIT_DECLARATOR);
        if let Some(name) = name {
            self.declare_name(name, typedef);
        }
        if self.eat(TOKEN_ASSIGN) {
            self.initializer();
        }
        self.finish_node();
    }

    fn specifiers(&mut self) -> Specifiers {
        let mut specifiers = Specifiers {
            typedef: false,
            has_type: false,
        };
        self.start_node(NODE_SPECIFIERS);
        loop {
            match self.current() {
                Some(TOKEN_TYPEDEF) => {
                    specifiers.typedef = true;
                    self.bump();
                }
                Some(TOKEN_EXTERN | TOKEN_STATIC) => self.bump(),
                Some(TOKEN_SPECIFIER) => {
                    if is_type_word(self.nth_text(0)) {
                        specifiers.has_type = true;
                    }
                    self.bump();
                }
                Some(TOKEN_STRUCT | TOKEN_UNION | TOKEN_ENUM) => {
                    specifiers.has_type = true;
                    self.tag_specifier();
                }
                Some(TOKEN_TYPEOF) => {
                    specifiers.has_type = true;
                    self.typeof_specifier();
                }
                Some(TOKEN_ATTRIBUTE) => self.attribute(),
                Some(TOKEN_IDENT)
                    if !specifiers.has_type && self.is_typedef_name(self.nth_text(0)) =>
                {
                    specifiers.has_type = true;
                    self.bump();
                }
                _ => break,
            }
        }
        self.finish_node();
        specifiers
    }

    fn tag_specifier(&mut self) {
        self.start_node(NODE_TAG_SPECIFIER);
        let is_enum = self.at(TOKEN_ENUM);
        self.bump();
        while self.at(TOKEN_ATTRIBUTE) {
            self.attribute();
        }
        self.eat(TOKEN_IDENT);
        if self.at(TOKEN_L_BRACE) {
            if is_enum {
                self.enum_body();
            } else {
                self.struct_body();
            }
        }
        while self.at(TOKEN_ATTRIBUTE) {
            self.attribute();
        }
        self.finish_node();
    }

    fn struct_body(&mut self) {
        self.start_node(NODE_STRUCT_BODY);
        self.bump();
        while !self.at_end() && !self.at(TOKEN_R_BRACE) {
            let mark = self.mark();
            if !self.eat(TOKEN_SEMICOLON) {
                self.field_group();
            }
            if self.mark() == mark {
                self.bump_error("expected a field declaration");
            }
        }
        self.expect(TOKEN_R_BRACE, "`}` after fields");
        self.finish_node();
    }

    fn field_group(&mut self) {
        self.start_node(NODE_FIELD_GROUP);
        self.specifiers();
        if !self.at(TOKEN_SEMICOLON) {
            loop {
                if !self.at(TOKEN_COLON) {
                    self.declarator();
                }
                // bit-field width
                if self.eat(TOKEN_COLON) {
                    self.conditional_expression();
                }
                while self.at(TOKEN_ATTRIBUTE) {
                    self.attribute();
                }
                if !self.eat(TOKEN_COMMA) {
                    break;
                }
            }
        }
        self.expect(TOKEN_SEMICOLON, "`;` after field");
        self.finish_node();
    }

    fn enum_body(&mut self) {
        self.start_node(NODE_ENUM_BODY);
        self.bump();
        while self.at(TOKEN_IDENT) {
            self.start_node(NODE_ENUMERATOR);
            let name = self.nth_text(0).to_string();
            self.start_node(NODE_NAME);
            self.bump();
            self.finish_node();
            while self.at(TOKEN_ATTRIBUTE) {
                self.attribute();
            }
            if self.eat(TOKEN_ASSIGN) {
                self.conditional_expression();
            }
            self.finish_node();
            self.declare_name(name, false);
            if !self.eat(TOKEN_COMMA) {
                break;
            }
        }
        self.expect(TOKEN_R_BRACE, "`}` after enumerators");
        self.finish_node();
    }

    /// `__attribute__((...))`, `asm("...")` labels and friends, kept verbatim
    fn attribute(&mut self) {
        self.start_node(NODE_ATTRIBUTE);
        self.bump();
        if self.at(TOKEN_L_PAREN) {
            self.balanced();
        }
        self.finish_node();
    }

    fn balanced(&mut self) {
        let mut depth = 0usize;
        while let Some(kind) = self.current() {
            match kind {
                TOKEN_L_PAREN => depth += 1,
                TOKEN_R_PAREN => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.bump();
            if depth == 0 {
                return;
            }
        }
        self.error("unbalanced parentheses");
    }

    fn typeof_specifier(&mut self) {
        self.start_node(NODE_TYPEOF);
        self.bump();
        if self.expect(TOKEN_L_PAREN, "`(` after typeof") {
            if self.is_type_start(0) {
                self.type_name();
            } else {
                self.expression();
            }
            self.expect(TOKEN_R_PAREN, "`)` after typeof operand");
        }
        self.finish_node();
    }

    /// Parse a declarator, named or abstract, and return the declared name
    fn declarator(&mut self) -> Option<String> {
        self.function_declarator().0
    }

    /// Like `declarator`, also returning the parameters of the function
    /// it declares, if it declares one
    fn function_declarator(&mut self) -> (Option<String>, Option<Names>) {
        self.start_node(NODE_DECLARATOR);
        while self.eat(TOKEN_STAR) {
            while self.at(TOKEN_SPECIFIER) && !is_type_word(self.nth_text(0)) {
                self.bump();
            }
            while self.at(TOKEN_ATTRIBUTE) {
                self.attribute();
            }
        }

        let mut name = None;
        let mut params = None;
        match self.current() {
            Some(TOKEN_IDENT) => {
                name = Some(self.nth_text(0).to_string());
                self.start_node(NODE_NAME);
                self.bump();
                self.finish_node();
            }
            Some(TOKEN_L_PAREN) if self.is_nested_declarator() => {
                self.start_node(NODE_NESTED_DECLARATOR);
                self.bump();
                while self.at(TOKEN_ATTRIBUTE) {
                    self.attribute();
                }
                (name, params) = self.function_declarator();
                self.expect(TOKEN_R_PAREN, "`)` after declarator");
                self.finish_node();
            }
            _ => {}
        }

        // the innermost function suffix belongs to the declared name
        let mut first_suffix = true;
        loop {
            match self.current() {
                Some(TOKEN_L_BRACK) => self.array_suffix(),
                Some(TOKEN_L_PAREN) => {
                    let names = self.param_list();
                    if first_suffix && params.is_none() {
                        params = Some(names);
                    }
                }
                _ => break,
            }
            first_suffix = false;
        }
        while matches!(self.current(), Some(TOKEN_ATTRIBUTE | TOKEN_ASM)) {
            self.attribute();
        }
        self.finish_node();
        (name, params)
    }

    /// `(` opening a parenthesised declarator rather than a parameter list
    fn is_nested_declarator(&self) -> bool {
        match self.nth(1) {
            Some(TOKEN_STAR | TOKEN_L_PAREN | TOKEN_L_BRACK | TOKEN_ATTRIBUTE) => true,
            Some(TOKEN_IDENT) => !self.is_typedef_name(self.nth_text(1)),
            _ => false,
        }
    }

    fn array_suffix(&mut self) {
        self.start_node(NODE_ARRAY_SUFFIX);
        self.bump();
        while matches!(self.current(), Some(TOKEN_STATIC | TOKEN_SPECIFIER)) {
            self.bump();
        }
        if self.at(TOKEN_STAR) && self.nth(1) == Some(TOKEN_R_BRACK) {
            self.bump();
        } else if !self.at(TOKEN_R_BRACK) {
            self.assignment_expression();
        }
        self.expect(TOKEN_R_BRACK, "`]` after array size");
        self.finish_node();
    }

    /// Returns the names the parameters declare
    fn param_list(&mut self) -> Names {
        self.start_node(NODE_PARAM_LIST);
        self.bump();
        self.push_scope();
        while !self.at_end() && !self.at(TOKEN_R_PAREN) {
            let mark = self.mark();
            if !self.eat(TOKEN_ELLIPSIS) {
                self.param();
            }
            if self.mark() == mark {
                self.bump_error("expected a parameter");
            }
            if !self.eat(TOKEN_COMMA) {
                break;
            }
        }
        let names = self.names.pop().unwrap_or_default();
        self.expect(TOKEN_R_PAREN, "`)` after parameters");
        self.finish_node();
        names
    }

    fn param(&mut self) {
        self.start_node(NODE_PARAM);
        self.specifiers();
        if !matches!(self.current(), Some(TOKEN_COMMA | TOKEN_R_PAREN) | None) {
            if let Some(name) = self.declarator() {
                self.declare_name(name, false);
            }
        }
        self.finish_node();
    }

    fn initializer(&mut self) {
        if self.at(TOKEN_L_BRACE) {
            self.init_list();
        } else {
            self.assignment_expression();
        }
    }

    fn init_list(&mut self) {
        self.start_node(NODE_INIT_LIST);
        self.bump();
        while !self.at_end() && !self.at(TOKEN_R_BRACE) {
            let mark = self.mark();
            if matches!(self.current(), Some(TOKEN_DOT | TOKEN_L_BRACK)) {
                self.designator();
            }
            self.initializer();
            if self.mark() == mark {
                self.bump_error("expected an initializer");
            }
            if !self.eat(TOKEN_COMMA) {
                break;
            }
        }
        self.expect(TOKEN_R_BRACE, "`}` after initializer list");
        self.finish_node();
    }

    fn designator(&mut self) {
        self.start_node(NODE_DESIGNATOR);
        loop {
            if self.eat(TOKEN_DOT) {
                self.expect(TOKEN_IDENT, "field name after `.`");
            } else if self.eat(TOKEN_L_BRACK) {
                self.conditional_expression();
                if self.eat(TOKEN_ELLIPSIS) {
                    self.conditional_expression();
                }
                self.expect(TOKEN_R_BRACK, "`]` after designator");
            } else {
                break;
            }
        }
        self.eat(TOKEN_ASSIGN);
        self.finish_node();
    }

    fn type_name(&mut self) {
        self.start_node(NODE_TYPE_NAME);
        self.specifiers();
        if !matches!(self.current(), Some(TOKEN_R_PAREN | TOKEN_COMMA) | None) {
            self.declarator();
        }
        self.finish_node();
    }

    // statements

    fn compound_statement(&mut self) {
        self.start_node(NODE_COMPOUND_STMT);
        self.bump();
        self.push_scope();
        while !self.at_end() && !self.at(TOKEN_R_BRACE) {
            let mark = self.mark();
            self.block_item();
            if self.mark() == mark {
                self.bump_error("expected a statement");
            }
        }
        self.pop_scope();
        self.expect(TOKEN_R_BRACE, "`}` after block");
        self.finish_node();
    }

    fn block_item(&mut self) {
        if self.is_declaration_start() {
            self.declaration(DeclContext::Block);
        } else {
            self.statement();
        }
    }

    fn statement(&mut self) {
        match self.current() {
            Some(TOKEN_L_BRACE) => self.compound_statement(),
            Some(TOKEN_IF) => {
                self.start_node(NODE_IF_STMT);
                self.bump();
                self.condition();
                self.statement();
                if self.eat(TOKEN_ELSE) {
                    self.statement();
                }
                self.finish_node();
            }
            Some(kind @ (TOKEN_WHILE | TOKEN_SWITCH)) => {
                self.start_node(if kind == TOKEN_WHILE {
                    NODE_WHILE_STMT
                } else {
                    NODE_SWITCH_STMT
                });
                self.bump();
                self.condition();
                self.statement();
                self.finish_node();
            }
            Some(TOKEN_DO) => {
                self.start_node(NODE_DO_STMT);
                self.bump();
                self.statement();
                self.expect(TOKEN_WHILE, "`while` after do body");
                self.condition();
                self.expect(TOKEN_SEMICOLON, "`;` after do statement");
                self.finish_node();
            }
            Some(TOKEN_FOR) => self.for_statement(),
            Some(TOKEN_CASE) => {
                self.start_node(NODE_CASE_STMT);
                self.bump();
                self.conditional_expression();
                // case ranges
                if self.eat(TOKEN_ELLIPSIS) {
                    self.conditional_expression();
                }
                self.expect(TOKEN_COLON, "`:` after case");
                self.label_body();
                self.finish_node();
            }
            Some(TOKEN_DEFAULT) => {
                self.start_node(NODE_CASE_STMT);
                self.bump();
                self.expect(TOKEN_COLON, "`:` after default");
                self.label_body();
                self.finish_node();
            }
            Some(TOKEN_RETURN) => {
                self.start_node(NODE_RETURN_STMT);
                self.bump();
                if !self.at(TOKEN_SEMICOLON) {
                    self.expression();
                }
                self.expect(TOKEN_SEMICOLON, "`;` after return");
                self.finish_node();
            }
            Some(TOKEN_BREAK | TOKEN_CONTINUE) => {
                self.start_node(NODE_JUMP_STMT);
                self.bump();
                self.expect(TOKEN_SEMICOLON, "`;` after jump");
                self.finish_node();
            }
            Some(TOKEN_GOTO) => {
                self.start_node(NODE_JUMP_STMT);
                self.bump();
                if self.eat(TOKEN_STAR) {
                    self.expression();
                } else {
                    self.expect(TOKEN_IDENT, "label after goto");
                }
                self.expect(TOKEN_SEMICOLON, "`;` after goto");
                self.finish_node();
            }
            Some(TOKEN_SEMICOLON) => {
                self.start_node(NODE_EMPTY_STMT);
                self.bump();
                self.finish_node();
            }
            Some(TOKEN_ASM) => self.asm_statement(),
            Some(TOKEN_IDENT) if self.nth(1) == Some(TOKEN_COLON) => {
                self.start_node(NODE_LABELED_STMT);
                self.bump();
                self.bump();
                while self.at(TOKEN_ATTRIBUTE) {
                    self.attribute();
                }
                self.label_body();
                self.finish_node();
            }
            _ => {
                self.start_node(NODE_EXPR_STMT);
                self.expression();
                self.expect(TOKEN_SEMICOLON, "`;` after expression");
                self.finish_node();
            }
        }
    }

    /// Labels may close a block, or label a declaration
    fn label_body(&mut self) {
        if !self.at_end() && !self.at(TOKEN_R_BRACE) {
            self.block_item();
        }
    }

    fn condition(&mut self) {
        self.expect(TOKEN_L_PAREN, "`(` before condition");
        self.expression();
        self.expect(TOKEN_R_PAREN, "`)` after condition");
    }

    fn for_statement(&mut self) {
        self.start_node(NODE_FOR_STMT);
        self.bump();
        self.push_scope();
        if self.expect(TOKEN_L_PAREN, "`(` after for") {
            if self.is_declaration_start() {
                self.declaration(DeclContext::ForInit);
            } else if !self.at(TOKEN_SEMICOLON) {
                self.expression();
            }
            self.expect(TOKEN_SEMICOLON, "`;` after for initializer");
            if !self.at(TOKEN_SEMICOLON) {
                self.expression();
            }
            self.expect(TOKEN_SEMICOLON, "`;` after for condition");
            if !self.at(TOKEN_R_PAREN) {
                self.expression();
            }
            self.expect(TOKEN_R_PAREN, "`)` after for clauses");
        }
        self.statement();
        self.pop_scope();
        self.finish_node();
    }

    fn asm_statement(&mut self) {
        self.start_node(NODE_ASM_STMT);
        self.bump();
        while matches!(self.current(), Some(TOKEN_SPECIFIER | TOKEN_GOTO)) {
            self.bump();
        }
        if self.expect(TOKEN_L_PAREN, "`(` after asm") {
            while !self.at_end() && !self.at(TOKEN_R_PAREN) {
                match self.current() {
                    // template, sections, clobbers, and goto labels
                    Some(TOKEN_STRING | TOKEN_COLON | TOKEN_COMMA | TOKEN_IDENT) => self.bump(),
                    Some(TOKEN_L_BRACK) => {
                        self.bump();
                        self.eat(TOKEN_IDENT);
                        self.expect(TOKEN_R_BRACK, "`]` after operand name");
                    }
                    // operand expressions
                    Some(TOKEN_L_PAREN) => self.primary_expression(),
                    _ => self.bump_error("unexpected token in asm operands"),
                }
            }
            self.expect(TOKEN_R_PAREN, "`)` after asm operands");
        }
        self.expect(TOKEN_SEMICOLON, "`;` after asm");
        self.finish_node();
    }

    // expressions

    fn expression(&mut self) {
        let start = self.checkpoint();
        self.assignment_expression();
        while self.at(TOKEN_COMMA) {
            self.start_node_at(start, NODE_BIN_EXPR);
            self.bump();
            self.assignment_expression();
            self.finish_node();
        }
    }

    fn assignment_expression(&mut self) {
        let start = self.checkpoint();
        self.conditional_expression();
        if matches!(self.current(), Some(TOKEN_ASSIGN | TOKEN_ASSIGN_OP)) {
            self.start_node_at(start, NODE_BIN_EXPR);
            self.bump();
            self.assignment_expression();
            self.finish_node();
        }
    }

    fn conditional_expression(&mut self) {
        let start = self.checkpoint();
        self.binary_expression(1);
        if self.at(TOKEN_QUESTION) {
            self.start_node_at(start, NODE_COND_EXPR);
            self.bump();
            // `a ?: b`
            if !self.at(TOKEN_COLON) {
                self.expression();
            }
            self.expect(TOKEN_COLON, "`:` in conditional expression");
            self.conditional_expression();
            self.finish_node();
        }
    }

    fn binary_expression(&mut self, min_precedence: u8) {
        let start = self.checkpoint();
        self.unary_expression();
        loop {
            let precedence = self.binary_precedence();
            if precedence == 0 || precedence < min_precedence {
                break;
            }
            self.start_node_at(start, NODE_BIN_EXPR);
            self.bump();
            self.binary_expression(precedence + 1);
            self.finish_node();
        }
    }

    fn binary_precedence(&self) -> u8 {
        match self.current() {
            Some(TOKEN_STAR) => 10,
            Some(TOKEN_PLUS | TOKEN_MINUS) => 9,
            Some(TOKEN_AMP) => 5,
            Some(TOKEN_OPERATOR) => match self.nth_text(0) {
                "/" | "%" => 10,
                "<<" | ">>" => 8,
                "<" | ">" | "<=" | ">=" => 7,
                "==" | "!=" => 6,
                "^" => 4,
                "|" => 3,
                "&&" => 2,
                "||" => 1,
                _ => 0,
            },
            _ => 0,
        }
    }

    fn unary_expression(&mut self) {
        match self.current() {
            Some(
                TOKEN_INCREMENT | TOKEN_DECREMENT | TOKEN_AMP | TOKEN_STAR | TOKEN_PLUS
                | TOKEN_MINUS | TOKEN_BANG | TOKEN_TILDE,
            ) => {
                self.start_node(NODE_PREFIX_EXPR);
                self.bump();
                self.unary_expression();
                self.finish_node();
            }
            // address of a label
            Some(TOKEN_OPERATOR) if self.nth_text(0) == "&&" => {
                self.start_node(NODE_PREFIX_EXPR);
                self.bump();
                self.expect(TOKEN_IDENT, "label after `&&`");
                self.finish_node();
            }
            Some(TOKEN_SPECIFIER) if self.nth_text(0) == "__extension__" => {
                self.start_node(NODE_PREFIX_EXPR);
                self.bump();
                self.unary_expression();
                self.finish_node();
            }
            Some(TOKEN_SIZEOF) => {
                self.start_node(NODE_SIZEOF_EXPR);
                self.bump();
                if self.at(TOKEN_L_PAREN) && self.is_type_start(1) {
                    self.bump();
                    self.type_name();
                    self.expect(TOKEN_R_PAREN, "`)` after type");
                    if self.at(TOKEN_L_BRACE) {
                        self.init_list();
                    }
                } else {
                    self.unary_expression();
                }
                self.finish_node();
            }
            Some(TOKEN_L_PAREN) if self.is_type_start(1) => {
                let start = self.checkpoint();
                self.bump();
                self.type_name();
                self.expect(TOKEN_R_PAREN, "`)` after type");
                if self.at(TOKEN_L_BRACE) {
                    self.start_node_at(start, NODE_COMPOUND_LITERAL);
                    self.init_list();
                    self.finish_node();
                    self.postfix_tail(start);
                } else {
                    self.start_node_at(start, NODE_CAST_EXPR);
                    self.unary_expression();
                    self.finish_node();
                }
            }
            _ => self.postfix_expression(),
        }
    }

    fn postfix_expression(&mut self) {
        let start = self.checkpoint();
        self.primary_expression();
        self.postfix_tail(start);
    }

    fn postfix_tail(&mut self, start: Checkpoint) {
        loop {
            match self.current() {
                Some(TOKEN_L_PAREN) => {
                    self.start_node_at(start, NODE_CALL_EXPR);
                    self.arg_list();
                    self.finish_node();
                }
                Some(TOKEN_L_BRACK) => {
                    self.start_node_at(start, NODE_INDEX_EXPR);
                    self.bump();
                    self.expression();
                    self.expect(TOKEN_R_BRACK, "`]` after index");
                    self.finish_node();
                }
                Some(TOKEN_DOT | TOKEN_ARROW) => {
                    self.start_node_at(start, NODE_FIELD_EXPR);
                    self.bump();
                    self.expect(TOKEN_IDENT, "field name");
                    self.finish_node();
                }
                Some(TOKEN_INCREMENT | TOKEN_DECREMENT) => {
                    self.start_node_at(start, NODE_POSTFIX_EXPR);
                    self.bump();
                    self.finish_node();
                }
                _ => break,
            }
        }
    }

    fn arg_list(&mut self) {
        self.start_node(NODE_ARG_LIST);
        self.bump();
        while !self.at_end() && !self.at(TOKEN_R_PAREN) {
            let mark = self.mark();
            // builtins such as `__builtin_va_arg(ap, int)` take types
            if self.is_type_start(0) {
                self.type_name();
            } else {
                self.assignment_expression();
            }
            if self.mark() == mark || !self.eat(TOKEN_COMMA) {
                break;
            }
        }
        self.expect(TOKEN_R_PAREN, "`)` after arguments");
        self.finish_node();
    }

    fn primary_expression(&mut self) {
        match self.current() {
            Some(TOKEN_IDENT) => {
                self.start_node(NODE_NAME_REF);
                self.bump();
                self.finish_node();
            }
            Some(TOKEN_NUMBER | TOKEN_CHAR) => {
                self.start_node(NODE_LITERAL);
                self.bump();
                self.finish_node();
            }
            Some(TOKEN_STRING) => {
                // adjacent literals concatenate
                self.start_node(NODE_LITERAL);
                while self.at(TOKEN_STRING) {
                    self.bump();
                }
                self.finish_node();
            }
            Some(TOKEN_L_PAREN) if self.nth(1) == Some(TOKEN_L_BRACE) => {
                self.start_node(NODE_STMT_EXPR);
                self.bump();
                self.compound_statement();
                self.expect(TOKEN_R_PAREN, "`)` after statement expression");
                self.finish_node();
            }
            Some(TOKEN_L_PAREN) => {
                self.start_node(NODE_PAREN_EXPR);
                self.bump();
                self.expression();
                self.expect(TOKEN_R_PAREN, "`)`");
                self.finish_node();
            }
            None
            | Some(
                TOKEN_R_PAREN | TOKEN_R_BRACK | TOKEN_R_BRACE | TOKEN_SEMICOLON | TOKEN_COMMA,
            ) => self.error("expected an expression"),
            Some(_) => self.bump_error("expected an expression"),
        }
    }
}
