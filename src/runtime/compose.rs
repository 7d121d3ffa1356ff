//! Interpreter composition
//!
//! `compose([I1, I2, .., In])` applies `I1` around `I2` around .. around `In`
//! around the target. The rightmost layer wraps innermost, so it sees each
//! command first. Layers for disjoint kinds commute.

use super::bridge;
use super::computation::Comp;
use super::driver;
use super::interpreter::Interpreter;
use super::types::Val;
use crate::errors::Result;
use std::sync::Arc;

/// An ordered interpreter stack, outermost first
#[derive(Clone, Default)]
pub struct Stack {
    layers: Vec<Arc<dyn Interpreter>>,
}

pub fn compose(layers: Vec<Arc<dyn Interpreter>>) -> Stack {
    Stack { layers }
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer inside the existing ones
    pub fn layer(mut self, interpreter: impl Interpreter + 'static) -> Self {
        self.layers.push(Arc::new(interpreter));
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Interpret and drive synchronously
    pub fn run(&self, comp: Comp) -> Result<Val> {
        driver::run(self.interpret(comp))
    }

    /// Interpret and drive through the async bridge
    pub async fn run_async(&self, comp: Comp) -> Result<Val> {
        bridge::run_async(self.interpret(comp)).await
    }
}

impl Interpreter for Stack {
    fn interpret(&self, inner: Comp) -> Comp {
        self.layers
            .iter()
            .rev()
            .fold(inner, |comp, layer| layer.interpret(comp))
    }
}

impl FromIterator<Arc<dyn Interpreter>> for Stack {
    fn from_iter<T: IntoIterator<Item = Arc<dyn Interpreter>>>(iter: T) -> Self {
        compose(iter.into_iter().collect())
    }
}
