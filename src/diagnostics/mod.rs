pub mod codes;

use crate::utils::Span;
use ariadne::{Color, Config, Label as AriadneLabel, Report, ReportKind, Source};
use codes::ErrorCode;
use std::io;
use std::mem;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

impl Label {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    // 错误码和级别来自 ErrorCode
    code: &'static str,
    level: DiagnosticLevel,
    // 可以被覆盖，以便加入具体的类型名等动态信息
    message: String,

    labels: Vec<Label>,
    notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(error_code: &'static ErrorCode, primary_label: Label) -> Self {
        Self {
            code: error_code.code,
            level: error_code.level,
            message: error_code.message.to_string(),
            labels: vec![primary_label],
            notes: Vec::new(),
        }
    }

    pub fn error(error_code: &'static ErrorCode, primary_label: Label) -> Self {
        assert!(
            matches!(error_code.level, DiagnosticLevel::Error),
            "Tried to create an error diagnostic with a non-error code."
        );
        Self::new(error_code, primary_label)
    }

    /// 用包含动态信息的消息覆盖 ErrorCode 的默认消息。
    pub fn with_dynamic_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_secondary_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn code(&self) -> &str {
        self.code
    }

    pub fn level(&self) -> DiagnosticLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }
}

/// 诊断背包：收集所有阶段的诊断，最后统一打印。
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    source: String,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            diagnostics: Vec::new(),
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::trace!("diagnostic {}: {}", diagnostic.code, diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.level == DiagnosticLevel::Error)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    /// 把收集到的诊断写到 stderr，并清空背包。
    pub fn print(&mut self, file_name: &str, color: bool) -> io::Result<()> {
        let diags_to_print = mem::take(&mut self.diagnostics);
        print_all(file_name, &self.source, diags_to_print, color)
    }
}

fn print_all(
    file_name: &str,
    source_code: &str,
    diagnostics: Vec<Diagnostic>,
    color: bool,
) -> io::Result<()> {
    let cache = (file_name, Source::from(source_code));

    for diag in diagnostics {
        let Some(primary) = diag.labels.first() else {
            continue;
        };

        let kind = match diag.level {
            DiagnosticLevel::Error => ReportKind::Error,
            DiagnosticLevel::Warning => ReportKind::Warning,
        };
        let primary_color = match diag.level {
            DiagnosticLevel::Error => Color::Red,
            DiagnosticLevel::Warning => Color::Yellow,
        };

        let mut report = Report::build(kind, (file_name, Range::from(primary.span)))
            .with_config(Config::default().with_color(color))
            .with_message(&diag.message)
            .with_code(diag.code);

        for (i, label_info) in diag.labels.iter().enumerate() {
            let label = AriadneLabel::new((file_name, Range::from(label_info.span)))
                .with_message(&label_info.message)
                .with_color(if i == 0 { primary_color } else { Color::Blue });
            report.add_label(label);
        }

        for note in &diag.notes {
            report = report.with_note(note);
        }

        report.finish().eprint(cache.clone())?;
    }

    Ok(())
}
