//! Foundation types for rst-check.
//!
//! This crate provides shared types used across the rst-check stack.
//! It has zero external dependencies, making it suitable as a foundation layer.
//!
//! # Type Categories
//!
//! - **Diagnostic types**: [`Diagnostic`], [`DiagnosticCategory`], [`DiagnosticSeverity`]
//! - **Symbol types**: [`SymbolKind`], [`SymbolDefinition`], [`SymbolRegistry`]

mod diagnostic;
mod registry;
mod severity;
mod symbol;

pub use diagnostic::{Diagnostic, DiagnosticCategory};
pub use registry::SymbolRegistry;
pub use severity::{DiagnosticSeverity, UnknownSeverity};
pub use symbol::{normalize_name, normalize_whitespace, SymbolDefinition, SymbolKind};
