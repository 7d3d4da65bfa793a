#![cfg(test)]

use std::num::NonZeroUsize;

use pretty_assertions::assert_eq;

use crate::{
    error::{EditError, InvocationError, PassError},
    pass::{
        check_edit, run, Invocation, Mode, Outcome, Program, RemoveUnusedVar, DESCRIPTION, NAME,
    },
    registry::{Registry, Transformation},
};

fn program(content: &str) -> Program {
    Program::parse(content).unwrap()
}

fn apply(index: usize) -> Mode {
    Mode::Apply(NonZeroUsize::new(index).unwrap())
}

#[test]
fn written_but_never_read() {
    let program = program("int main(){ int x = 5; return 0; }");
    assert_eq!(run(&program, Mode::Query), Outcome::CountReported(1));
    assert_eq!(
        run(&program, apply(1)),
        Outcome::Applied("int main(){ return 0; }".to_string())
    );
}

#[test]
fn second_of_two_declarators() {
    let program = program("int a, b; int main(){ return a; }");
    assert_eq!(run(&program, Mode::Query), Outcome::CountReported(1));
    assert_eq!(
        run(&program, apply(1)),
        Outcome::Applied("int a; int main(){ return a; }".to_string())
    );
}

#[test]
fn parameter_not_counted() {
    let program = program("void f(int p) { }");
    assert_eq!(run(&program, Mode::Query), Outcome::CountReported(0));
}

#[test]
fn middle_of_three_declarators() {
    let program = program("int a, b, c; int main(){ return a + c; }");
    assert_eq!(run(&program, Mode::Query), Outcome::CountReported(1));
    assert_eq!(
        run(&program, apply(1)),
        Outcome::Applied("int a, c; int main(){ return a + c; }".to_string())
    );
}

#[test]
fn parameter_hides_typedef_in_body() {
    let program = program("typedef int T; int p; int f(int T) { T * p; return 0; }");
    assert_eq!(run(&program, Mode::Query), Outcome::CountReported(0));
}

#[test]
fn old_style_definition() {
    let program = program("int f(a) int a; { return a; } int unused;");
    assert_eq!(run(&program, Mode::Query), Outcome::CountReported(1));
    assert_eq!(
        run(&program, apply(1)),
        Outcome::Applied("int f(a) int a; { return a; }".to_string())
    );
}

#[test]
fn query_leaves_program_unchanged() {
    let content = "int a, b, c; int main(){ return a + c; }";
    let program = program(content);
    assert_eq!(run(&program, Mode::Query), Outcome::CountReported(1));
    assert_eq!(program.text(), content);
    assert_eq!(run(&program, Mode::Query), Outcome::CountReported(1));
}

#[test]
fn index_bounds() {
    let program = program("int a, b, c;");
    assert_eq!(run(&program, Mode::Query), Outcome::CountReported(3));
    assert_eq!(
        run(&program, apply(3)),
        Outcome::Applied("int a, b;".to_string())
    );
    assert_eq!(
        run(&program, apply(4)),
        Outcome::IndexOutOfRange {
            index: NonZeroUsize::new(4).unwrap(),
            count: 3,
        }
    );
}

#[test]
fn nothing_to_remove() {
    let program = program("int main(void) { return 0; }");
    let outcome = run(&program, apply(1));
    assert!(!outcome.is_success());
    assert_eq!(outcome.output(), None);
}

#[test]
fn outcome_output() {
    let program = program("int dead;");
    let outcome = run(&program, apply(1));
    assert!(outcome.is_success());
    assert_eq!(outcome.output(), Some(""));
}

#[test]
fn invocation() {
    assert_eq!(
        Invocation::new(NAME, Some(2), false),
        Ok(Invocation {
            transformation: NAME.to_string(),
            mode: apply(2),
        })
    );
    assert_eq!(
        Invocation::new(NAME, None, true).map(|invocation| invocation.mode),
        Ok(Mode::Query)
    );
    assert_eq!(
        Invocation::new(NAME, Some(0), false),
        Err(InvocationError::ZeroCounter)
    );
    assert_eq!(
        Invocation::new(NAME, None, false),
        Err(InvocationError::MissingCounter)
    );
}

#[test]
fn syntax_errors_rejected() {
    match Program::parse("int main(void) { int x = ; }") {
        Err(PassError::Parse { errors }) => assert!(!errors.is_empty()),
        Ok(_) => panic!("broken program was accepted"),
    }
}

#[test]
fn label_left_without_statement() {
    let program = program("int main(void) { L: int x; }");
    assert_eq!(run(&program, Mode::Query), Outcome::CountReported(1));
    match run(&program, apply(1)) {
        Outcome::EditFailed(EditError::Diagnostics(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].message, "expected a statement after label");
        }
        outcome => panic!("unexpected outcome {:?}", outcome),
    }
}

#[test]
fn edited_program_checked() {
    let original = program("int main(void) { int x = 1; return 0; }");
    assert_eq!(check_edit(original.root(), "int main(void) { return 0; }"), Ok(()));

    match check_edit(original.root(), "int main(void) { int x = ; return 0; }") {
        Err(EditError::Diagnostics(errors)) => assert!(!errors.is_empty()),
        result => panic!("broken program was accepted: {:?}", result),
    }

    // labels that already ended a block are left alone
    let original = program("int main(void) { int x; L: }");
    assert_eq!(check_edit(original.root(), "int main(void) { L: }"), Ok(()));
    assert!(check_edit(original.root(), "int main(void) { L: M: }").is_err());
}

#[test]
fn registry_lookup() {
    let registry = Registry::with_builtins();
    let transformation: &dyn Transformation = registry.get(NAME).unwrap();
    assert_eq!(transformation.name(), "remove-unused-var");
    assert_eq!(transformation.description(), DESCRIPTION);
    assert!(registry.get("remove-unused-function").is_none());

    let names = registry
        .iter()
        .map(|transformation| transformation.name())
        .collect::<Vec<_>>();
    assert_eq!(names, [NAME]);
}

#[test]
fn registry_invoke() {
    let registry = Registry::with_builtins();
    let program = program("int a, b;");

    let invocation = Invocation::new(NAME, Some(1), false).unwrap();
    assert_eq!(
        registry.invoke(&invocation, &program),
        Ok(Outcome::Applied("int b;".to_string()))
    );

    let invocation = Invocation::new("nope", None, true).unwrap();
    assert_eq!(
        registry.invoke(&invocation, &program),
        Err(InvocationError::UnknownTransformation("nope".to_string()))
    );
}

#[test]
fn registry_rejects_duplicates() {
    let mut registry = Registry::new();
    assert!(registry.register(Box::new(RemoveUnusedVar)).is_ok());
    assert_eq!(
        registry.register(Box::new(RemoveUnusedVar)),
        Err(InvocationError::DuplicateTransformation(NAME.to_string()))
    );
}
