//! Checks used by instructor code to validate a student's program.
//!
//! The checking code describes what the student defined as a [`Bindings`]
//! table (and the open figures as a [`FigureSet`]), runs the checks it cares
//! about and finally prints [`summarize`] of the results. Printing the
//! sentinel is what makes the marking run pass.

pub mod bindings;
pub mod introspect;
pub mod plot;

pub use bindings::{Binding, Bindings, CallResult, Function, RuntimeFault};
pub use introspect::{check_eval, check_function, EvalCheck, FunctionCheck};
pub use plot::{check_bare, check_single_plot, Axes, Axis, Figure, FigureSet, PlotCheck, Spine};

use crmarker_common::CheckResult;

/// Message of the first failed check, or `sentinel` when every check passed
pub fn summarize(results: &[CheckResult], sentinel: &str) -> String {
    results
        .iter()
        .find(|result| !result.success)
        .map(|result| result.message.clone().unwrap_or_default())
        .unwrap_or_else(|| sentinel.to_string())
}
