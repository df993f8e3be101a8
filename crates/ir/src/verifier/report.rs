use std::fmt;

use super::diagnostic::Diagnostic;

#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    pub diagnostics: Vec<Diagnostic>,
    /// Errors dropped once `max_diagnostics` was reached. They still count
    /// against the outcome of the report.
    omitted_errors: usize,
}

impl VerificationReport {
    pub fn is_ok(&self) -> bool {
        !self.has_errors()
    }

    pub fn has_errors(&self) -> bool {
        self.omitted_errors != 0 || self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn omitted_errors(&self) -> usize {
        self.omitted_errors
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|diag| diag.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|diag| !diag.is_error())
    }

    pub(crate) fn push(&mut self, diagnostic: Diagnostic, max_diagnostics: usize) {
        if max_diagnostics == 0 || self.diagnostics.len() < max_diagnostics {
            self.diagnostics.push(diagnostic);
        } else if diagnostic.is_error() {
            self.omitted_errors += 1;
        }
    }

    pub(crate) fn extend_with_limit(&mut self, other: Self, max_diagnostics: usize) {
        self.omitted_errors += other.omitted_errors;
        for diagnostic in other.diagnostics {
            self.push(diagnostic, max_diagnostics);
        }
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.diagnostics.is_empty() {
            return "verification succeeded".fmt(f);
        }

        for (index, diagnostic) in self.diagnostics.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        if self.omitted_errors != 0 {
            write!(f, "\n{} more error(s) omitted", self.omitted_errors)?;
        }

        Ok(())
    }
}
