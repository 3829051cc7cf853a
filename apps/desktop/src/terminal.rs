use std::io::{self, BufRead, Write};

use client_core::{
    CommitteeListView, CommitteeRow, ConfirmationPrompt, LabelSet, Notice, NoticeLevel, Renderer,
    ScanControl,
};
use shared::domain::Filter;
use url::Url;

/// Prints notices and navigation targets; region re-renders only go to the log.
pub struct TerminalRenderer;

impl Renderer for TerminalRenderer {
    fn render_committees(&self, view: &CommitteeListView) {
        tracing::debug!(filter = %view.filter, count = view.rows.len(), "committee list rendered");
    }

    fn render_labels(&self, labels: &LabelSet) {
        tracing::debug!(language = %labels.language, title = %labels.page_title, "labels rendered");
    }

    fn render_filter(&self, filter: Filter) {
        tracing::debug!(%filter, "filter marker rendered");
    }

    fn render_scan_control(&self, control: &ScanControl) {
        tracing::debug!(enabled = control.enabled, label = %control.label, "scan control rendered");
    }

    fn render_last_scan(&self, last_update: &str) {
        tracing::debug!(last_update, "last scan rendered");
    }

    fn open_inline_edit(&self, row: &CommitteeRow) {
        eprintln!("new committee at #{}: {}", row.index, row.name);
    }

    fn notify(&self, notice: &Notice) {
        let level = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "ok",
            NoticeLevel::Error => "error",
        };
        eprintln!("[{level}] {}", notice.text);
    }

    fn navigate(&self, url: &Url) {
        println!("{url}");
    }

    fn reset_window_size(&self, width: u32, height: u32) {
        tracing::debug!(width, height, "window size reset ignored in terminal");
    }
}

pub fn print_committees(view: &CommitteeListView) {
    println!("{} committees:", view.filter);
    if let Some(placeholder) = &view.placeholder {
        println!("  {placeholder}");
    }
    for row in &view.rows {
        println!("  {:>3}  {}", row.index, row.name);
    }
}

/// Asks on stderr and reads a y/N answer from stdin.
pub struct StdinConfirm;

impl ConfirmationPrompt for StdinConfirm {
    fn confirm(&self, question: &str) -> bool {
        eprint!("{question} [y/N] ");
        if io::stderr().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read confirmation");
                false
            }
        }
    }
}
