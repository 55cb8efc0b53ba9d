//! Derived-value engine: arithmetic evaluation and fixed-point resolution

pub mod eval;
pub mod resolver;

pub use eval::{evaluate, render_value, EvalError};
pub use resolver::{calculate_expressions, dependency_graph, MAX_ITERATIONS};
