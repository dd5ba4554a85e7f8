//! Feedback report rendering
//!
//! The session core exposes a read-only snapshot; turning it into a
//! document happens here, outside the state machine.

use anyhow::{Context, Result};
use chrono::Utc;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::session::Session;

/// Render a session snapshot as a plain-text feedback report.
pub fn render_report(session: &Session) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Interview Practice: {}", session.role);
    let _ = writeln!(out, "# Exported: {}", Utc::now().format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out);

    let _ = writeln!(out, "Question:");
    let _ = writeln!(out, "{}", session.question);
    let _ = writeln!(out);

    let _ = writeln!(out, "Answer:");
    let _ = writeln!(out, "{}", session.answer);
    let _ = writeln!(out);

    if let Some(sentiment) = &session.sentiment {
        let _ = writeln!(out, "Detected tone: {:?}", sentiment);
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "Feedback:");
    for point in &session.feedback_points {
        let _ = writeln!(out, "  - {}", point);
    }

    if !session.improved_answer.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Improved answer:");
        let _ = writeln!(out, "{}", session.improved_answer);
    }

    out
}

/// Write the rendered report to a file.
pub fn export_to_file(session: &Session, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, render_report(session))
        .with_context(|| format!("Failed to write report: {}", path.display()))
}
