//! Feedback transcript showing what was run and what came back.

use std::path::{Path, PathBuf};

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::domain::model::ExecutionResult;

const MAX_ENTRIES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryLevel {
    Command,
    Output,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub timestamp: String,
    pub level: EntryLevel,
    pub text: String,
}

/// Append-only log of invocations and their results.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    last_output: Option<PathBuf>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Output file of the most recent run, if that run succeeded.
    pub fn last_output(&self) -> Option<&Path> {
        self.last_output.as_deref()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.last_output = None;
    }

    pub fn push(&mut self, level: EntryLevel, text: impl Into<String>) {
        let timestamp = OffsetDateTime::now_utc()
            .format(format_description!("[hour]:[minute]:[second]"))
            .unwrap_or_else(|_| "--:--:--".to_owned());
        for line in text.into().lines() {
            self.entries.push(TranscriptEntry {
                timestamp: timestamp.clone(),
                level,
                text: line.to_owned(),
            });
        }
        if self.entries.len() > MAX_ENTRIES {
            let excess = self.entries.len() - MAX_ENTRIES;
            self.entries.drain(..excess);
        }
    }

    pub fn record_command(&mut self, command_line: &str) {
        self.push(EntryLevel::Command, format!("$ repomix {command_line}"));
    }

    pub fn record_result(&mut self, result: &ExecutionResult) {
        if !result.stdout.trim().is_empty() {
            self.push(EntryLevel::Output, result.stdout.trim_end());
        }

        if result.success {
            if !result.stderr.trim().is_empty() {
                self.push(EntryLevel::Warning, result.stderr.trim_end());
            }
            if let Some(path) = &result.output_path {
                self.push(
                    EntryLevel::Success,
                    format!("Packed into {}", path.display()),
                );
                self.last_output = Some(path.clone());
            }
        } else {
            self.last_output = None;
            let kind = result
                .failure
                .map(|kind| kind.as_str())
                .unwrap_or("failure");
            self.push(EntryLevel::Error, format!("[{kind}] {}", result.stderr.trim_end()));
        }
    }
}

/// Renders the transcript, pinned to the newest entries.
#[derive(Debug, Default)]
pub struct TranscriptPanel;

impl TranscriptPanel {
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, transcript: &Transcript) {
        let block = Block::default().title("Feedback").borders(Borders::ALL);
        let inner = block.inner(area);

        if transcript.entries().is_empty() {
            let placeholder = Paragraph::new("Press Enter to pack · Ctrl+Y copies the last output")
                .style(
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                )
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(placeholder, area);
            return;
        }

        let lines: Vec<Line<'static>> = transcript.entries().iter().map(entry_line).collect();
        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
        // Offset in rendered rows, not entries.
        let rows = paragraph.line_count(inner.width);
        let offset = u16::try_from(rows.saturating_sub(inner.height as usize)).unwrap_or(u16::MAX);

        frame.render_widget(block, area);
        frame.render_widget(paragraph.scroll((offset, 0)), inner);
    }
}

fn entry_line(entry: &TranscriptEntry) -> Line<'static> {
    let style = match entry.level {
        EntryLevel::Command => Style::default().fg(Color::Cyan),
        EntryLevel::Output => Style::default().fg(Color::Gray),
        EntryLevel::Success => Style::default().fg(Color::Green),
        EntryLevel::Warning => Style::default().fg(Color::Yellow),
        EntryLevel::Error => Style::default().fg(Color::Red),
    };
    Line::from(vec![
        Span::styled(
            format!("{} ", entry.timestamp),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(entry.text.clone(), style),
    ])
}
