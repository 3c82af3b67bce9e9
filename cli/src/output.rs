//! Terminal output utilities for styled CLI output.

use std::fmt::Display;

use console::{StyledObject, Term, style};
use lumiqr_business::{ContentAction, Field, FillKind, QrContentSpec, ScanDisplay};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct FieldRow<'a> {
    #[tabled(rename = "Field")]
    label: &'a str,
    #[tabled(rename = "Value")]
    value: &'a str,
}

/// Terminal output helper for consistent styled output.
pub struct Output {
    term: Term,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    fn line(&self, text: impl AsRef<str>) {
        drop(self.term.write_line(text.as_ref()));
    }

    fn marked(&self, mark: StyledObject<&str>, message: impl Display) {
        self.line(format!("{mark} {message}"));
    }

    pub fn success(&self, message: impl Display) {
        self.marked(style("✓").green().bold(), message);
    }

    pub fn error(&self, message: impl Display) {
        self.marked(style("✗").red().bold(), message);
    }

    pub fn info(&self, message: impl Display) {
        self.marked(style("ℹ").blue().bold(), message);
    }

    /// Print a plain message without any prefix.
    pub fn print(&self, message: impl Display) {
        self.line(message.to_string());
    }

    pub fn newline(&self) {
        self.line("");
    }

    pub fn header(&self, message: impl Display) {
        self.line(style(message).bold().cyan().to_string());
    }

    pub fn dim(&self, message: impl Display) {
        self.line(style(message).dim().to_string());
    }

    pub fn labeled(&self, label: impl Display, value: impl Display) {
        self.line(format!("  {}: {value}", style(label).dim()));
    }

    pub fn fields(&self, fields: &[Field]) {
        let rows: Vec<FieldRow<'_>> = fields
            .iter()
            .map(|field| FieldRow {
                label: &field.label,
                value: &field.value,
            })
            .collect();
        let mut table = Table::new(&rows);
        table.with(Style::rounded());
        self.print(table);
    }

    pub fn actions(&self, actions: &[ContentAction]) {
        for action in actions {
            self.line(format!(
                "  {} {}",
                style(format!("[{}]", action.label())).green().bold(),
                style(&action.target).dim()
            ));
        }
    }

    /// Type, fields and actions of a decoded or inspected payload.
    pub fn scan_display(&self, display: &ScanDisplay) {
        self.header(format!("Type: {}", display.content_type.display_name()));
        self.fields(&display.fields);
        if !display.actions.is_empty() {
            self.newline();
            self.print(style("Actions").bold());
            self.actions(&display.actions);
        }
    }

    /// What the model produced, before rendering.
    pub fn spec_summary(&self, spec: &QrContentSpec, payload: &str) {
        let fill = match spec.colors.fill.kind {
            FillKind::Solid => spec.colors.fill.primary().to_owned(),
            FillKind::Gradient => spec.colors.fill.values.join(" → "),
        };
        self.header(format!("Content: {}", spec.content.kind));
        self.labeled("Error correction", spec.error_correction);
        self.labeled("Style", spec.style);
        self.labeled("Background", &spec.colors.background);
        self.labeled("Fill", fill);
        self.newline();
        self.print(style("Payload").bold());
        self.print(payload);
    }
}
