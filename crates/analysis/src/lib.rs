// rst-check analysis layer
// Runs the markup validator with a scope's registry injected and reconciles
// its raw output against that registry.

mod batch;
mod cache;
mod docutils;
mod error;
mod filter;
mod reconcile;
mod runner;
mod validator;

pub use batch::{BatchOutcome, CancellationToken, Checker, DocumentReport};
pub use cache::HarvestCache;
pub use docutils::{DocutilsValidator, SystemMessage};
pub use error::{Result, ValidationError};
pub use filter::DiagnosticFilter;
pub use reconcile::{reconcile, Reconciliation};
pub use runner::{RawValidation, ResolvedScope, ValidationRunner};
pub use validator::{classify_message, InjectedSymbols, MarkupValidator};
