/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Text rendering of diagnostics, with source context when available.
 */

use crate::{Diagnostic, Diagnostics, Severity};
use bundle_dyn::Location;
use std::collections::HashMap;
use std::fmt::Write;

/// File contents used to show source context.
///
/// Files are read from disk on first use unless registered up front with
/// [`add`](SourceCache::add), which is how generated content under a
/// virtual path gets rendered.
#[derive(Debug, Default)]
pub struct SourceCache {
    files: HashMap<String, Option<String>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, file: impl Into<String>, content: impl Into<String>) {
        self.files.insert(file.into(), Some(content.into()));
    }

    /// Contents of `file`, or `None` if it cannot be read.
    pub fn get(&mut self, file: &str) -> Option<&str> {
        self.files
            .entry(file.to_string())
            .or_insert_with(|| std::fs::read_to_string(file).ok())
            .as_deref()
    }
}

impl Diagnostic {
    /// Render for a terminal.
    ///
    /// With the source of `self.location.file` available the output is an
    /// ariadne report pointing at the offending node; otherwise a two-line
    /// plain form:
    ///
    /// ```text
    /// Warning: unknown field: foo
    ///   at bundle.yml:4:7 (resources.jobs.job0.foo)
    /// ```
    pub fn to_text(&self, sources: &mut SourceCache) -> String {
        if !self.location.is_empty()
            && let Some(content) = sources.get(&self.location.file)
            && let Some(text) = self.render_ariadne(content)
        {
            return text;
        }
        self.to_plain_text()
    }

    fn to_plain_text(&self) -> String {
        let mut result = String::new();
        let kind = match self.severity {
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        };
        let _ = writeln!(result, "{}: {}", kind, self.summary);
        match (self.location.is_empty(), self.path.is_empty()) {
            (false, false) => {
                let _ = writeln!(result, "  at {} ({})", self.location, self.path);
            }
            (false, true) => {
                let _ = writeln!(result, "  at {}", self.location);
            }
            (true, false) => {
                let _ = writeln!(result, "  at {}", self.path);
            }
            (true, true) => {}
        }
        result
    }

    fn render_ariadne(&self, content: &str) -> Option<String> {
        use ariadne::{Color, Config, Label, Report, ReportKind, Source};

        let span = node_span(content, &self.location)?;
        let (report_kind, color) = match self.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
        };
        let file = self.location.file.clone();

        let mut label = Label::new((file.clone(), span.clone())).with_color(color);
        if !self.path.is_empty() {
            label = label.with_message(format!("at {}", self.path));
        }

        let report = Report::build(report_kind, file.clone(), span.start)
            .with_config(Config::default().with_color(false))
            .with_message(&self.summary)
            .with_label(label)
            .finish();

        let mut output = Vec::new();
        report
            .write((file, Source::from(content)), &mut output)
            .ok()?;
        String::from_utf8(output).ok()
    }
}

impl Diagnostics {
    /// Render every diagnostic, in order.
    pub fn to_text(&self, sources: &mut SourceCache) -> String {
        self.iter().map(|d| d.to_text(sources)).collect()
    }
}

/// Character span of the token starting at `location`.
///
/// Runs to the next whitespace or the end of the line, and is never empty.
fn node_span(content: &str, location: &Location) -> Option<std::ops::Range<usize>> {
    if location.line == 0 || location.column == 0 {
        return None;
    }
    let mut offset = 0;
    for (index, line) in content.split('\n').enumerate() {
        let chars = line.chars().count();
        if index + 1 == location.line {
            let column = location.column - 1;
            if column > chars {
                return None;
            }
            let start = offset + column;
            let token = line
                .chars()
                .skip(column)
                .take_while(|c| !c.is_whitespace())
                .count();
            return Some(start..start + token.max(1));
        }
        offset += chars + 1;
    }
    None
}
