//! Diagnostic and failure types.
//!
//! [`Diagnostic`] is what every rule function reports: a message anchored at a
//! document location. [`LintError`] covers infrastructure failures such as a
//! schema the validation engine refuses to compile.

mod diagnostic;
mod lint_error;

pub use diagnostic::{Diagnostic, Diagnostics};
pub use lint_error::LintError;
