#![cfg(test)]

use rowan::Language;

use crate::{
    binding::is_function_declarator,
    parser::parse,
    syntax::{child, CLanguage, SyntaxKind::{self, *}, SyntaxNode},
};

fn run(content: &str) -> SyntaxNode {
    let parse = parse(content);
    assert!(parse.errors().is_empty(), "{:?}", parse.errors());
    parse.node()
}

fn kinds(node: &SyntaxNode) -> Vec<SyntaxKind> {
    node.descendants().map(|node| node.kind()).collect()
}

const PROGRAM: &str = r#"#include <stdio.h>
#define MAX(a, b) \
    ((a) > (b) ? (a) : (b))
/* block */ typedef struct point { int x, y; } point_t;
static const char *names[] = { "a", "b", [3] = "d" };
int (*handler)(int, char **);
enum color { RED, GREEN = 2, BLUE };
int main(int argc, char **argv) {
    point_t p = { .x = 1, .y = 2 };
    unsigned long n = sizeof(point_t) + sizeof p;
    for (int i = 0; i < argc; i++) {
        if (argv[i][0] == '-') continue; // flag
        else n += (unsigned long) i;
    }
    switch (p.x) { case 1: break; default: n = n ? : 1; }
    __asm__ volatile ("nop" : : "r" (n));
    return ({ int t = 3; t; }) + handler(0, argv);
}
"#;

#[test]
fn lossless() {
    let root = run(PROGRAM);
    assert_eq!(root.text().to_string(), PROGRAM);
}

#[test]
fn lossless_with_errors() {
    for content in ["int x = ;", "int main(void) { return 0; ", "int x @;", "}}"] {
        let parse = parse(content);
        assert!(!parse.errors().is_empty(), "{}", content);
        assert_eq!(parse.node().text().to_string(), content);
    }
}

#[test]
fn declaration_group() {
    let root = run("int a, b = 1, *c;");
    let group = child(&root, NODE_DECL_GROUP).unwrap();
    let declarators = group
        .children()
        .filter(|node| node.kind() == NODE_INIT_DECLARATOR)
        .map(|node| node.text().to_string())
        .collect::<Vec<_>>();
    assert_eq!(declarators, ["a", "b = 1", "*c"]);
    assert_eq!(group.text().to_string(), "int a, b = 1, *c;");
}

#[test]
fn function_definition() {
    let root = run("int f(void) { return 0; }\nint g(void);");
    let nodes = root.children().map(|node| node.kind()).collect::<Vec<_>>();
    assert_eq!(nodes, [NODE_FUNCTION_DEF, NODE_DECL_GROUP]);
}

#[test]
fn function_declarators() {
    let root = run("int *f(void), (*g)(void), h[3], *(*k)(int);");
    let group = child(&root, NODE_DECL_GROUP).unwrap();
    let functions = group
        .children()
        .filter_map(|node| child(&node, NODE_DECLARATOR))
        .map(|declarator| is_function_declarator(&declarator))
        .collect::<Vec<_>>();
    assert_eq!(functions, [true, false, false, false]);
}

#[test]
fn typedef_name_starts_declaration() {
    let root = run("typedef int T; int f(void) { T * x; return 0; }");
    let body = child(&root, NODE_FUNCTION_DEF)
        .and_then(|function| child(&function, NODE_COMPOUND_STMT))
        .unwrap();
    assert!(child(&body, NODE_DECL_GROUP).is_some());
    assert!(child(&body, NODE_EXPR_STMT).is_none());
}

#[test]
fn variable_starts_expression() {
    let root = run("int T, x; int f(void) { T * x; return 0; }");
    let body = child(&root, NODE_FUNCTION_DEF)
        .and_then(|function| child(&function, NODE_COMPOUND_STMT))
        .unwrap();
    assert!(child(&body, NODE_DECL_GROUP).is_none());
    assert!(child(&body, NODE_EXPR_STMT).is_some());
}

#[test]
fn parameter_hides_typedef() {
    let root = run("typedef int T, U; int p; int (*g(int T))(int U) { T * p; U * p; return 0; }");
    let body = child(&root, NODE_FUNCTION_DEF)
        .and_then(|function| child(&function, NODE_COMPOUND_STMT))
        .unwrap();
    let statements = body.children().map(|node| node.kind()).collect::<Vec<_>>();
    assert_eq!(statements, [NODE_EXPR_STMT, NODE_DECL_GROUP, NODE_RETURN_STMT]);
}

#[test]
fn parameters_end_with_body() {
    let root = run("typedef int T; int f(int T) { return T; } T x;");
    let nodes = root.children().map(|node| node.kind()).collect::<Vec<_>>();
    assert_eq!(nodes, [NODE_DECL_GROUP, NODE_FUNCTION_DEF, NODE_DECL_GROUP]);
}

#[test]
fn old_style_definition() {
    let root = run("int f(a, b) int a; char *b; { return a; }\nint g;");
    let nodes = root.children().map(|node| node.kind()).collect::<Vec<_>>();
    assert_eq!(nodes, [NODE_FUNCTION_DEF, NODE_DECL_GROUP]);

    let function = child(&root, NODE_FUNCTION_DEF).unwrap();
    let parts = function.children().map(|node| node.kind()).collect::<Vec<_>>();
    assert_eq!(
        parts,
        [NODE_SPECIFIERS, NODE_DECLARATOR, NODE_DECL_GROUP, NODE_DECL_GROUP, NODE_COMPOUND_STMT]
    );
}

#[test]
fn old_style_definition_without_body() {
    let parse = parse("int f(a) int a;");
    assert!(!parse.errors().is_empty());
}

#[test]
fn cast_and_parenthesis() {
    let cast = run("typedef int T; int g(int y) { return (T) y; }");
    assert!(kinds(&cast).contains(&NODE_CAST_EXPR));

    let paren = run("int h(int y) { return (y) + 1; }");
    assert!(kinds(&paren).contains(&NODE_PAREN_EXPR));
    assert!(!kinds(&paren).contains(&NODE_CAST_EXPR));
}

#[test]
fn for_initializer_leaves_semicolon() {
    let root = run("void f(void) { for (int i = 0; i < 3; i++) ; }");
    let group = root
        .descendants()
        .find(|node| node.kind() == NODE_DECL_GROUP)
        .unwrap();
    assert_eq!(group.text().to_string(), "int i = 0");
    assert_eq!(group.parent().map(|parent| parent.kind()), Some(NODE_FOR_STMT));
}

#[test]
fn trivia_between_nodes() {
    let root = run("  int x;  // done\n");
    let group = child(&root, NODE_DECL_GROUP).unwrap();
    assert_eq!(group.text().to_string(), "int x;");
}

#[test]
fn raw_kinds() {
    for (raw, kind) in SyntaxKind::ALL.iter().enumerate() {
        assert_eq!(*kind as usize, raw);
        assert_eq!(CLanguage::kind_from_raw(CLanguage::kind_to_raw(*kind)), *kind);
    }
    let unknown = rowan::SyntaxKind(SyntaxKind::ALL.len() as u16);
    assert_eq!(CLanguage::kind_from_raw(unknown), TOKEN_ERROR);
}
