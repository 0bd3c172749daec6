//! Diagnostics collected during a compilation

use std::fmt;

use ariadne::{Color, Label, Report, ReportKind, Source};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Warning => f.write_str("warning"),
            Level::Error => f.write_str("error"),
        }
    }
}

/// A warning or error, optionally tied to a 1-based line and column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn at_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }

    /// Byte range in `source` this diagnostic points at
    ///
    /// A column narrows the range to one character; a line alone covers the
    /// whole line. Returns `None` when the position is unknown or out of range.
    fn source_span(&self, source: &str) -> Option<std::ops::Range<usize>> {
        let line = self.line?;
        let mut offset = 0;
        for (index, text) in source.split('\n').enumerate() {
            if index + 1 == line {
                let text = text.strip_suffix('\r').unwrap_or(text);
                return Some(match self.column {
                    Some(column) if column >= 1 && column <= text.len() => {
                        let start = offset + column - 1;
                        let width = text
                            .get(column - 1..)
                            .and_then(|rest| rest.chars().next())
                            .map_or(1, char::len_utf8);
                        start..start + width
                    }
                    _ => offset..offset + text.len(),
                });
            }
            offset += text.len() + 1;
        }
        None
    }

    /// `source_span` converted to the character offsets ariadne indexes by
    fn char_span(&self, source: &str) -> Option<std::ops::Range<usize>> {
        let span = self.source_span(source)?;
        let start = source.get(..span.start)?.chars().count();
        let width = source.get(span.clone())?.chars().count();
        Some(start..start + width)
    }

    /// Format the diagnostic with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let kind = match self.level {
            Level::Warning => ReportKind::Warning,
            Level::Error => ReportKind::Error,
        };
        let color = match self.level {
            Level::Warning => Color::Yellow,
            Level::Error => Color::Red,
        };

        let span = self.char_span(source);
        let mut report = Report::<(&str, std::ops::Range<usize>)>::build(
            kind,
            filename,
            span.as_ref().map_or(0, |s| s.start),
        )
        .with_message(&self.message);
        if let Some(span) = span {
            report = report.with_label(
                Label::new((filename, span))
                    .with_message(&self.message)
                    .with_color(color),
            );
        }

        let mut buf = Vec::new();
        match report
            .finish()
            .write((filename, Source::from(source)), &mut buf)
        {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => {
                write!(f, "{} (line {}:{}): {}", self.level, line, column, self.message)
            }
            (Some(line), None) => write!(f, "{} (line {}): {}", self.level, line, self.message),
            _ => write!(f, "{}: {}", self.level, self.message),
        }
    }
}

/// True when any diagnostic is an error
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}
