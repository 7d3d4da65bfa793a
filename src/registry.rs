use tracing::debug;

use crate::{
    error::InvocationError,
    pass::{Invocation, Mode, Outcome, Program, RemoveUnusedVar},
};

/// A reduction pass a driver can select by name
pub trait Transformation {
    /// Stable name, such as `remove-unused-var`
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Count the instances in `program`, or transform one of them
    fn transform(&self, program: &Program, mode: Mode) -> Outcome;
}

/// Transformations by name
#[derive(Default)]
pub struct Registry {
    transformations: Vec<Box<dyn Transformation>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// A registry with every transformation of this crate
    pub fn with_builtins() -> Self {
        Registry {
            transformations: vec![Box::new(RemoveUnusedVar)],
        }
    }

    pub fn register(&mut self, transformation: Box<dyn Transformation>) -> Result<(), InvocationError> {
        if self.get(transformation.name()).is_some() {
            return Err(InvocationError::DuplicateTransformation(
                transformation.name().to_string(),
            ));
        }
        self.transformations.push(transformation);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Transformation> {
        self.transformations
            .iter()
            .find(|transformation| transformation.name() == name)
            .map(|transformation| transformation.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Transformation> {
        self.transformations
            .iter()
            .map(|transformation| transformation.as_ref())
    }

    /// Look up the requested transformation and run it once
    pub fn invoke(&self, invocation: &Invocation, program: &Program) -> Result<Outcome, InvocationError> {
        let transformation = self.get(&invocation.transformation).ok_or_else(|| {
            InvocationError::UnknownTransformation(invocation.transformation.clone())
        })?;
        debug!(transformation = transformation.name(), mode = ?invocation.mode, "invoking");
        Ok(transformation.transform(program, invocation.mode))
    }
}
