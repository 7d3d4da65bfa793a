#![cfg(test)]

use crate::{
    binding::BindingKind,
    dead_code::scan,
    parser::parse,
    usage::find_references,
};

/// Whether each variable called `name` is referenced, in source order
fn referenced(content: &str, name: &str) -> Vec<bool> {
    let parse = parse(content);
    assert!(parse.errors().is_empty(), "{:?}", parse.errors());
    let root = parse.node();

    let references = find_references(&root);
    scan(&root, &references, None)
        .declarations
        .iter()
        .filter(|binding| binding.kind == BindingKind::Variable && binding.name() == name)
        .map(|binding| binding.is_referenced())
        .collect()
}

#[test]
fn read() {
    assert_eq!(referenced("int main(void) { int x = 1; return x; }", "x"), [true]);
}

#[test]
fn write_only() {
    assert_eq!(referenced("int main(void) { int x; x = 1; return 0; }", "x"), [true]);
}

#[test]
fn initializer_only() {
    assert_eq!(referenced("int main(void) { int x = 5; return 0; }", "x"), [false]);
}

#[test]
fn sizeof_and_address() {
    assert_eq!(referenced("int main(void) { int x; return sizeof x; }", "x"), [true]);
    assert_eq!(
        referenced("int main(void) { int a; int *p = &a; return *p; }", "a"),
        [true]
    );
}

#[test]
fn own_initializer() {
    assert_eq!(referenced("int main(void) { int x = x; return 0; }", "x"), [true]);
}

#[test]
fn block_shadowing() {
    assert_eq!(
        referenced("int main(void) { int x = 1; { int x = 2; return x; } }", "x"),
        [false, true]
    );
}

#[test]
fn parameter_shadows_global() {
    assert_eq!(referenced("int x; int f(int x) { return x; }", "x"), [false]);
}

#[test]
fn old_style_parameter_shadows_global() {
    assert_eq!(referenced("int a; int f(a) int a; { return a; }", "a"), [false]);
}

#[test]
fn enumerator_shadows_local() {
    assert_eq!(
        referenced("int main(void) { int A = 0; { enum { A = 1 }; return A; } }", "A"),
        [false]
    );
}

#[test]
fn member_names() {
    assert_eq!(
        referenced(
            "struct S { int x; }; int main(void) { struct S s; int x; return s.x; }",
            "x"
        ),
        [false]
    );
}

#[test]
fn labels() {
    assert_eq!(
        referenced("int main(void) { int done; goto done; done: return 0; }", "done"),
        [false]
    );
}

#[test]
fn linked_declarations() {
    assert_eq!(
        referenced("int shared; int main(void) { extern int shared; return shared; }", "shared"),
        [true, true]
    );
    assert_eq!(
        referenced("extern int g; int g; int main(void) { return g; }", "g"),
        [true, true]
    );
}

#[test]
fn later_definition() {
    assert_eq!(
        referenced("int main(void) { return later; } int later;", "later"),
        [true]
    );
}

#[test]
fn function_pointer_call() {
    assert_eq!(
        referenced("int (*fp)(void); int main(void) { return fp(); }", "fp"),
        [true]
    );
}

#[test]
fn array_size() {
    assert_eq!(
        referenced("int main(void) { int n = 4; int a[n]; return 0; }", "n"),
        [true]
    );
}
