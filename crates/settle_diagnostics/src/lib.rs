//! Diagnostic creation, severity management, and terminal rendering.
//!
//! This crate provides structured [`Diagnostic`] messages with severity
//! levels and optional notes. The thread-safe [`DiagnosticSink`] accumulates
//! diagnostics while the placer and benchmark workers run, and
//! [`DiagnosticRenderer`] implementations format them for terminal output.

#![warn(missing_docs)]

pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
