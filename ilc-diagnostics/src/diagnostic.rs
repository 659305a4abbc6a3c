use colored::Colorize;

use crate::{Location, SourceMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Error,
    Hint,
}

impl DiagnosticKind {
    fn label(self) -> colored::ColoredString {
        match self {
            DiagnosticKind::Error => "error".red().bold(),
            DiagnosticKind::Hint => "hint".cyan().bold(),
        }
    }
}

/// A single accumulated finding: a kind, an optional source location, and a
/// rendered message. There is no severity beyond `Error`/`Hint` — this is a
/// compiler front-end, not an IDE linter.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub location: Option<Location>,
    pub message: String,
}

impl Diagnostic {
    pub fn error(location: Location, message: impl Into<String>) -> Self {
        Diagnostic {
            kind: DiagnosticKind::Error,
            location: Some(location),
            message: message.into(),
        }
    }

    pub fn error_no_location(message: impl Into<String>) -> Self {
        Diagnostic {
            kind: DiagnosticKind::Error,
            location: None,
            message: message.into(),
        }
    }

    pub fn hint(location: Location, message: impl Into<String>) -> Self {
        Diagnostic {
            kind: DiagnosticKind::Hint,
            location: Some(location),
            message: message.into(),
        }
    }

    /// Render this diagnostic as a multi-line string: kind + location on the
    /// first line, then the preceding line (if any), the offending line with
    /// its span underlined, and the following line.
    pub fn render(&self, sources: &SourceMap) -> String {
        let Some(loc) = self.location else {
            return format!("{}: {}", self.kind.label(), self.message);
        };

        let path = sources.path(loc.file).display().to_string();
        let (line, col) = sources.line_col(loc);
        let mut out = format!(
            "{}: {}\n  {} {}:{}:{}\n",
            self.kind.label(),
            self.message,
            "-->".cyan(),
            path,
            line,
            col
        );

        let width = (line + 1).to_string().len();
        if line > 1 {
            if let Some(prev) = sources.line_text(loc.file, line - 1) {
                out.push_str(&format!("{:>width$} | {}\n", line - 1, prev, width = width));
            }
        }
        if let Some(current) = sources.line_text(loc.file, line) {
            out.push_str(&format!("{:>width$} | {}\n", line, current, width = width));
            let underline_len = (loc.len().max(1)) as usize;
            out.push_str(&format!(
                "{:width$} | {}{}\n",
                "",
                " ".repeat(col.saturating_sub(1)),
                "^".repeat(underline_len).red().bold(),
                width = width
            ));
        }
        if let Some(next) = sources.line_text(loc.file, line + 1) {
            out.push_str(&format!("{:>width$} | {}\n", line + 1, next, width = width));
        }

        out
    }
}

/// Accumulates diagnostics for the whole pipeline. A single instance is
/// created by the driver and passed by mutable reference into every phase;
/// no phase aborts the moment it finds a problem.
#[derive(Default)]
pub struct DiagnosticEngine {
    diagnostics: Vec<Diagnostic>,
    had_error: bool,
}

impl DiagnosticEngine {
    pub fn new() -> Self {
        DiagnosticEngine::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.kind == DiagnosticKind::Error {
            self.had_error = true;
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn error(&mut self, location: Location, message: impl Into<String>) {
        self.push(Diagnostic::error(location, message));
    }

    pub fn error_no_location(&mut self, message: impl Into<String>) {
        self.push(Diagnostic::error_no_location(message));
    }

    pub fn hint(&mut self, location: Location, message: impl Into<String>) {
        self.push(Diagnostic::hint(location, message));
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn print_all(&self, sources: &SourceMap) {
        for diag in &self.diagnostics {
            eprintln!("{}", diag.render(sources));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileId;

    fn sample_map() -> (SourceMap, FileId) {
        let mut sm = SourceMap::new();
        let file = sm.add_file("t.ilc", "fn main() -> i32 {\n    return \"hi\";\n}\n".to_string());
        (sm, file)
    }

    #[test]
    fn renders_surrounding_lines() {
        let (sm, file) = sample_map();
        let loc = Location::new(file, 31, 35);
        let diag = Diagnostic::error(loc, "mismatched types");
        let rendered = diag.render(&sm);
        assert!(rendered.contains("mismatched types"));
        assert!(rendered.contains("fn main"));
        assert!(rendered.contains("return"));
    }

    #[test]
    fn missing_location_renders_kind_and_message_only() {
        let diag = Diagnostic::error_no_location("no entry point");
        let (sm, _) = sample_map();
        let rendered = diag.render(&sm);
        assert_eq!(rendered, format!("{}: {}", DiagnosticKind::Error.label(), "no entry point"));
    }

    #[test]
    fn engine_tracks_had_error_independent_of_hints() {
        let mut engine = DiagnosticEngine::new();
        let (_, file) = sample_map();
        assert!(!engine.had_error());
        engine.hint(Location::new(file, 0, 1), "consider this");
        assert!(!engine.had_error());
        engine.error(Location::new(file, 0, 1), "boom");
        assert!(engine.had_error());
        assert_eq!(engine.diagnostics().len(), 2);
    }
}
