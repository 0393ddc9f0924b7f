//! Diagnostic rendering backends for terminal output.

use crate::diagnostic::Diagnostic;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a compact, rustc-style terminal format.
///
/// Produces output like:
/// ```text
/// warning: net line 4 declares 3 blocks but lists 2
///    = note: extra ids are ignored
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn severity_prefix(&self, diag: &Diagnostic) -> String {
        if !self.color {
            return diag.severity.to_string();
        }
        let code = match diag.severity {
            crate::severity::Severity::Note => "1;36",
            crate::severity::Severity::Warning => "1;33",
            crate::severity::Severity::Error => "1;31",
        };
        format!("\x1b[{}m{}\x1b[0m", code, diag.severity)
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{}: {}\n",
            self.severity_prefix(diag),
            diag.message
        ));
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        out
    }
}
