#![cfg(test)]

use std::num::NonZeroUsize;

use pretty_assertions::assert_eq;
use rowan::TextRange;

use crate::{
    binding::DeclId,
    dead_code::scan,
    edit::{removal_range, Rewriter},
    error::EditError,
    group::DeclGroup,
    pass::{run, Mode, Outcome, Program},
    usage::find_references,
};

/// Remove the `index`th unused declaration
fn remove(content: &str, index: usize) -> String {
    let program = Program::parse(content).unwrap();
    let index = NonZeroUsize::new(index).unwrap();
    match run(&program, Mode::Apply(index)) {
        Outcome::Applied(output) => output,
        outcome => panic!("unexpected outcome {:?}", outcome),
    }
}

/// Remove unused declarations until none are left
fn remove_all(content: &str) -> String {
    let mut content = content.to_string();
    loop {
        let program = Program::parse(content.as_str()).unwrap();
        match run(&program, Mode::Apply(NonZeroUsize::MIN)) {
            Outcome::Applied(output) => content = output,
            Outcome::IndexOutOfRange { .. } => return content,
            outcome => panic!("unexpected outcome {:?}", outcome),
        }
    }
}

macro_rules! no_edits {
    ($s: expr) => {
        let s = $s.to_string();
        assert_eq!(remove_all(&s), s);
    };
}

#[test]
fn alive() {
    no_edits!("int main(void) { int alive = 23; return alive; }");
    no_edits!("int shared; int main(void) { extern int shared; return shared; }");
}

#[test]
fn whole_statement() {
    let results = remove("int main(void) { int dead = 23; return 0; }", 1);
    assert_eq!(results, "int main(void) { return 0; }");
}

#[test]
fn whole_statement_on_own_line() {
    let results = remove("int main(void) {\n    int dead;\n    return 0;\n}\n", 1);
    assert_eq!(results, "int main(void) {\n    return 0;\n}\n");
}

#[test]
fn first_declarator() {
    let results = remove("int dead, alive; int main(void) { return alive; }", 1);
    assert_eq!(results, "int alive; int main(void) { return alive; }");
}

#[test]
fn middle_declarator() {
    let results = remove("int a, b, c; int main(void) { return a + c; }", 1);
    assert_eq!(results, "int a, c; int main(void) { return a + c; }");
}

#[test]
fn last_declarator() {
    let results = remove("int a, b = 1; int main(void) { return a; }", 1);
    assert_eq!(results, "int a; int main(void) { return a; }");
}

#[test]
fn declarator_with_pointer_and_initializer() {
    let results = remove("char *s = \"x\", c; int main(void) { return c; }", 1);
    assert_eq!(results, "char c; int main(void) { return c; }");

    let results = remove("int a, *b[2] = { 0, 0 }, c; int main(void) { return a + c; }", 1);
    assert_eq!(results, "int a, c; int main(void) { return a + c; }");
}

#[test]
fn effectful_initializer() {
    let results = remove("int f(void); int main(void) { int x = f(); return 0; }", 1);
    assert_eq!(results, "int f(void); int main(void) { return 0; }");
}

#[test]
fn tag_definition_survives() {
    let results = remove("struct S { int field; } s;", 1);
    assert_eq!(results, "struct S { int field; };");

    let results = remove("enum E { A, B } e = A;", 1);
    assert_eq!(results, "enum E { A, B };");
}

#[test]
fn tag_reference_removed() {
    let results = remove("struct S; int main(void) { struct S *s; return 0; }", 1);
    assert_eq!(results, "struct S; int main(void) { return 0; }");
}

#[test]
fn for_initializer() {
    let results = remove("int main(void) { for (int i = 0;;) break; return 0; }", 1);
    assert_eq!(results, "int main(void) { for (;;) break; return 0; }");

    let results = remove("int main(void) { for (int i = 0, j = 1; j;) break; return 0; }", 1);
    assert_eq!(results, "int main(void) { for (int j = 1; j;) break; return 0; }");
}

#[test]
fn after_preprocessor_line() {
    let results = remove("#include <x.h>\nint unused;\nint main(void) { return 0; }", 1);
    assert_eq!(results, "#include <x.h>\n\nint main(void) { return 0; }");
}

#[test]
fn after_line_comment() {
    let results = remove("int main(void) { // locals\n  int dead;\n  return 0; }", 1);
    assert_eq!(results, "int main(void) { // locals\n  \n  return 0; }");
}

#[test]
fn repeated_removal() {
    let results = remove_all("int a, b, c; int main(void) { int d = 1, e; return 0; }");
    assert_eq!(results, " int main(void) { return 0; }");
}

#[test]
fn removal_range_of_declarators() {
    let content = "int a, b, c;";
    let program = Program::parse(content).unwrap();
    let references = find_references(program.root());
    let scan = scan(program.root(), &references, None);

    let ranges = scan
        .declarations
        .candidates()
        .map(|binding| {
            let group = scan.declarations.group_of(binding.id).unwrap();
            let range = removal_range(binding, group).unwrap();
            &content[range]
        })
        .collect::<Vec<_>>();
    assert_eq!(ranges, ["a, ", ", b", ", c"]);
}

#[test]
fn rewriter() {
    assert_eq!(Rewriter::new("int a, b;").finish(), "int a, b;");

    let mut rewriter = Rewriter::new("int a, b;");
    rewriter.replace(TextRange::new(7.into(), 8.into()), "c").unwrap();
    rewriter.remove(TextRange::new(0.into(), 4.into())).unwrap();
    assert_eq!(rewriter.finish(), "a, c;");
}

#[test]
fn rewriter_rejects_overlap() {
    let mut rewriter = Rewriter::new("int a;");
    rewriter.remove(TextRange::new(3.into(), 5.into())).unwrap();
    let range = TextRange::new(4.into(), 6.into());
    assert_eq!(rewriter.remove(range), Err(EditError::Overlap { range }));
    assert_eq!(rewriter.finish(), "int;");
}

#[test]
fn rewriter_rejects_out_of_bounds() {
    let mut rewriter = Rewriter::new("int a;");
    let range = TextRange::new(4.into(), 10.into());
    assert_eq!(
        rewriter.remove(range),
        Err(EditError::OutOfBounds { range, len: 6 })
    );
    assert_eq!(rewriter.finish(), "int a;");
}

#[test]
fn removal_rejects_foreign_group() {
    let program = Program::parse("int a; int b;").unwrap();
    let references = find_references(program.root());
    let scan = scan(program.root(), &references, None);
    let bindings = scan.declarations.candidates().collect::<Vec<_>>();
    let (a, b) = (bindings[0], bindings[1]);
    let group_of_b = scan.declarations.group_of(b.id).unwrap();

    let not_in_group = Err(EditError::NotInGroup {
        name: "a".to_string(),
    });
    assert_eq!(removal_range(a, group_of_b), not_in_group);

    // listed as a member, but declared under another statement
    let misfiled = DeclGroup {
        node: group_of_b.node.clone(),
        members: vec![a.id],
    };
    assert_eq!(removal_range(a, &misfiled), not_in_group);
}

#[test]
fn removal_needs_separator() {
    let program = Program::parse("int a;").unwrap();
    let references = find_references(program.root());
    let scan = scan(program.root(), &references, None);
    let a = scan.declarations.candidates().next().unwrap();
    let node = scan.declarations.group_of(a.id).unwrap().node.clone();

    let missing_separator = Err(EditError::MissingSeparator {
        name: "a".to_string(),
    });
    let first = DeclGroup {
        node: node.clone(),
        members: vec![a.id, DeclId(a.id.0 + 1)],
    };
    assert_eq!(removal_range(a, &first), missing_separator);

    let last = DeclGroup {
        node,
        members: vec![DeclId(a.id.0 + 1), a.id],
    };
    assert_eq!(removal_range(a, &last), missing_separator);
}
