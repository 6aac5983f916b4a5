//! Report export.
//!
//! Rendering is pure and never mutates state. Writing goes to a caller-
//! chosen directory and reports the path it wrote.

use crate::core::StageRecord;
use crate::errors::ExportError;
use crate::structured::{BmcEntry, BusinessModelCanvas};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default report file name.
pub const DEFAULT_REPORT_FILE_NAME: &str = "BMC_Full_Report.txt";

/// Output format of a stage-log report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Headed prompt/response/feedback blocks.
    #[default]
    Text,
    /// The log as pretty-printed JSON.
    Json,
}

impl ReportFormat {
    /// File extension for this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "json",
        }
    }
}

/// Renders the stage log as the plain-text report.
///
/// One section per record in log order; the feedback block is omitted when
/// no refinement was applied.
#[must_use]
pub fn render_text(log: &[StageRecord]) -> String {
    let mut out = String::new();
    for record in log {
        let _ = writeln!(out, "## {}", record.stage_name());
        let _ = write!(out, "### Prompt:\n{}\n\n", record.prompt());
        let _ = write!(out, "### Response:\n{}\n\n", record.response());
        if record.has_feedback() {
            let _ = write!(out, "### Feedback:\n{}\n\n", record.feedback());
        }
    }
    out
}

/// Renders the stage log as pretty JSON.
///
/// # Errors
///
/// Returns [`ExportError::Serialization`] if serialization fails.
pub fn render_json(log: &[StageRecord]) -> Result<String, ExportError> {
    serde_json::to_string_pretty(log).map_err(|e| ExportError::Serialization(e.to_string()))
}

/// Renders one canvas as `## {block}` headings with `- item` lines.
#[must_use]
pub fn render_canvas_text(canvas: &BusinessModelCanvas) -> String {
    let mut out = String::new();
    for (title, items) in canvas.blocks() {
        let _ = writeln!(out, "## {title}");
        for item in items {
            let _ = writeln!(out, "- {item}");
        }
        out.push('\n');
    }
    out
}

/// Renders several canvases, each under its value proposition.
#[must_use]
pub fn render_canvases(entries: &[BmcEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            let title = if entry.value_proposition.is_empty() {
                "Untitled Value Proposition"
            } else {
                entry.value_proposition.as_str()
            };
            format!("# {title}\n\n{}", render_canvas_text(&entry.canvas))
        })
        .collect()
}

/// Writes reports of a stage log to disk.
#[derive(Debug, Clone)]
pub struct ReportExporter {
    file_name: String,
}

impl Default for ReportExporter {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_FILE_NAME)
    }
}

impl ReportExporter {
    /// Creates an exporter writing `file_name`.
    ///
    /// The extension is replaced to match the format being written.
    #[must_use]
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// The configured file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Target path for `format` inside `dir`.
    #[must_use]
    pub fn path_for(&self, dir: &Path, format: ReportFormat) -> PathBuf {
        dir.join(Path::new(&self.file_name).with_extension(format.extension()))
    }

    /// Renders `log` in `format`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::EmptyLog`] for an empty log.
    pub fn render(&self, log: &[StageRecord], format: ReportFormat) -> Result<String, ExportError> {
        if log.is_empty() {
            return Err(ExportError::EmptyLog);
        }
        match format {
            ReportFormat::Text => Ok(render_text(log)),
            ReportFormat::Json => render_json(log),
        }
    }

    /// Writes the report of `log` into `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::EmptyLog`] for an empty log and
    /// [`ExportError::Io`] if the file cannot be written.
    pub fn write(&self, log: &[StageRecord], dir: &Path, format: ReportFormat) -> Result<PathBuf, ExportError> {
        let contents = self.render(log, format)?;
        let path = self.path_for(dir, format);
        write_file(&path, &contents)?;
        info!(path = %path.display(), records = log.len(), ?format, "report saved");
        Ok(path)
    }

    /// Writes the canvas text report of `entries` into `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the file cannot be written.
    pub fn write_canvases(&self, entries: &[BmcEntry], dir: &Path) -> Result<PathBuf, ExportError> {
        let stem = Path::new(&self.file_name)
            .file_stem()
            .map_or_else(|| "report".into(), |s| s.to_string_lossy());
        let path = dir.join(format!("{stem}_canvas.txt"));
        write_file(&path, &render_canvases(entries))?;
        info!(path = %path.display(), canvases = entries.len(), "canvas report saved");
        Ok(path)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), ExportError> {
    let io_error = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, contents).map_err(io_error)
}
