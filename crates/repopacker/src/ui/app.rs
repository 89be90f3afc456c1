//! Application loop for the TUI.

use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};

use crate::app::patterns;
use crate::app::runner::Packer;
use crate::domain::model::ExecutionResult;
use crate::infra::clipboard::{self, ClipboardSink};
use crate::infra::config::Config;
use crate::ui::components::form::{FormField, FormState, OptionsForm};
use crate::ui::components::transcript::{EntryLevel, Transcript, TranscriptPanel};

const TICK_RATE: Duration = Duration::from_millis(120);

/// Primary entry point for running the interactive TUI.
pub struct UiApp {
    packer: Packer,
    clipboard: Box<dyn ClipboardSink>,
    form: FormState,
    form_view: OptionsForm,
    transcript: Transcript,
    transcript_view: TranscriptPanel,
    status: Option<StatusMessage>,
    pending_pack: bool,
    should_quit: bool,
}

impl UiApp {
    pub fn new(config: &Config, packer: Packer, clipboard: Box<dyn ClipboardSink>) -> Self {
        Self {
            packer,
            clipboard,
            form: FormState::from_config(config),
            form_view: OptionsForm,
            transcript: Transcript::new(),
            transcript_view: TranscriptPanel,
            status: None,
            pending_pack: false,
            should_quit: false,
        }
    }

    /// Launch the terminal UI and enter the event loop.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
            .context("failed to enter alternate screen")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to initialize terminal")?;
        terminal.hide_cursor().ok();

        let event_loop_result = self.event_loop(&mut terminal);

        disable_raw_mode().ok();
        let _ = execute!(
            terminal.backend_mut(),
            DisableBracketedPaste,
            LeaveAlternateScreen
        );
        let _ = terminal.show_cursor();

        event_loop_result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|frame| self.render(frame))?;

            // The "Packing…" frame is on screen; now block on repomix.
            if self.pending_pack {
                self.perform_pack();
                continue;
            }

            self.tick();

            if self.should_quit {
                break;
            }

            if event::poll(TICK_RATE)? {
                let ev = event::read()?;
                self.handle_event(ev);
            }
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame<'_>) {
        let size = frame.size();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(OptionsForm::HEIGHT),
                Constraint::Min(4),
                Constraint::Length(1),
                Constraint::Length(2),
            ])
            .split(size);

        self.form_view.render(frame, layout[0], &self.form);
        self.transcript_view
            .render(frame, layout[1], &self.transcript);

        let hints = Paragraph::new(Line::from(vec![
            Span::styled("tab", Style::default().fg(Color::Cyan)),
            Span::raw(" next field · "),
            Span::styled("space", Style::default().fg(Color::Cyan)),
            Span::raw(" toggle · "),
            Span::styled("←/→", Style::default().fg(Color::Cyan)),
            Span::raw(" style · "),
            Span::styled("↵", Style::default().fg(Color::Cyan)),
            Span::raw(" pack · "),
            Span::styled("ctrl+y", Style::default().fg(Color::Cyan)),
            Span::raw(" copy · "),
            Span::styled("ctrl+l", Style::default().fg(Color::Cyan)),
            Span::raw(" clear · "),
            Span::styled("esc", Style::default().fg(Color::Cyan)),
            Span::raw(" quit"),
        ]))
        .style(Style::default().fg(Color::Gray));
        frame.render_widget(hints, layout[2]);

        self.render_status(frame, layout[3]);
    }

    fn render_status(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let message = self.status.as_ref().map(|status| {
            let style = match status.level {
                StatusLevel::Info => Style::default().fg(Color::Gray),
                StatusLevel::Success => Style::default().fg(Color::Green),
                StatusLevel::Error => Style::default().fg(Color::Red),
            };
            Line::styled(status.text.clone(), style)
        });

        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let line = message.unwrap_or_else(|| {
            Line::styled(
                format!("Ready · output goes to {}", self.packer.cwd().display()),
                Style::default().fg(Color::DarkGray),
            )
        });
        frame.render_widget(Paragraph::new(line), inner);
    }

    fn tick(&mut self) {
        if let Some(status) = &self.status
            && status.is_expired()
        {
            self.status = None;
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key_event(key),
            Event::Paste(text) => match self.form.focused() {
                // Dropping a folder on the terminal pastes its path.
                FormField::Input => self.form.set_input(text.trim().trim_matches(['\'', '"'])),
                field if field.is_text() => {
                    for ch in text.chars().filter(|ch| !ch.is_control()) {
                        self.form.push_char(ch);
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('p') => self.request_pack(),
                KeyCode::Char('y') => self.copy_output(),
                KeyCode::Char('l') => {
                    self.transcript.clear();
                    self.set_status(StatusLevel::Info, "Feedback cleared");
                }
                _ => {}
            }
            return;
        }

        let focused = self.form.focused();
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Down => self.form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.form.focus_previous(),
            KeyCode::Left if focused == FormField::Style => self.form.cycle_style(-1),
            KeyCode::Right if focused == FormField::Style => self.form.cycle_style(1),
            KeyCode::Enter => match focused {
                FormField::Copy => self.copy_output(),
                _ => self.request_pack(),
            },
            KeyCode::Backspace => self.form.pop_char(),
            KeyCode::Char(' ') if !focused.is_text() => self.form.toggle_focused(),
            KeyCode::Char('q') if !focused.is_text() => self.should_quit = true,
            KeyCode::Char(ch) => {
                if !key.modifiers.contains(KeyModifiers::ALT) {
                    self.form.push_char(ch);
                }
            }
            _ => {}
        }
    }

    fn request_pack(&mut self) {
        self.pending_pack = true;
        self.set_status(StatusLevel::Info, "Packing…");
    }

    fn perform_pack(&mut self) {
        self.pending_pack = false;
        let options = self.form.to_options();

        for warning in patterns::validate("include", options.include_patterns.as_deref())
            .into_iter()
            .chain(patterns::validate("ignore", options.ignore_patterns.as_deref()))
        {
            self.transcript
                .push(EntryLevel::Warning, warning.message());
        }

        let result = match self.packer.prepare(&options) {
            Ok(invocation) => {
                self.transcript.record_command(&invocation.display_args());
                self.packer.execute(&invocation)
            }
            Err(err) => ExecutionResult::from(&err),
        };
        self.transcript.record_result(&result);

        if result.success {
            self.set_status(StatusLevel::Success, "Pack complete");
        } else {
            let kind = result
                .failure
                .map(|kind| kind.as_str())
                .unwrap_or("failure");
            self.set_status(StatusLevel::Error, format!("Pack failed ({kind})"));
        }
    }

    fn copy_output(&mut self) {
        let Some(path) = self.transcript.last_output().map(ToOwned::to_owned) else {
            self.set_status(StatusLevel::Error, "Nothing packed yet");
            return;
        };

        match clipboard::copy_file(self.clipboard.as_mut(), &path) {
            Ok(count) => {
                self.set_status(
                    StatusLevel::Success,
                    format!("Copied {count} characters to clipboard"),
                );
            }
            Err(err) => {
                self.transcript
                    .push(EntryLevel::Error, format!("{err:#}"));
                self.set_status(StatusLevel::Error, "Copy failed");
            }
        }
    }

    fn set_status<S: Into<String>>(&mut self, level: StatusLevel, message: S) {
        self.status = Some(StatusMessage::new(level, message.into()));
    }
}

#[derive(Debug)]
struct StatusMessage {
    level: StatusLevel,
    text: String,
    expires_at: Instant,
}

impl StatusMessage {
    fn new(level: StatusLevel, text: String) -> Self {
        Self {
            level,
            text,
            expires_at: Instant::now() + Duration::from_secs(4),
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy)]
enum StatusLevel {
    Info,
    Success,
    Error,
}

#[cfg(test)]
mod tests {
    use std::fs;

    use ratatui::backend::TestBackend;

    use super::*;
    use crate::app::runner::Runner;
    use crate::domain::model::PackFlag;
    use crate::infra::clipboard::tests::RecordingSink;
    use crate::infra::locator::{Platform, ToolLocator};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_in(dir: &std::path::Path) -> UiApp {
        let empty = dir.join("empty-path");
        fs::create_dir_all(&empty).unwrap();
        let locator = ToolLocator::new(Platform::current())
            .with_search_path(empty.as_os_str())
            .with_install_dir(&empty)
            .prefer_npx(false);
        let packer = Packer::new(Runner::new(locator), dir);
        UiApp::new(
            &Config::default(),
            packer,
            Box::new(RecordingSink::default()),
        )
    }

    fn type_text(app: &mut UiApp, text: &str) {
        for ch in text.chars() {
            app.handle_key_event(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn enter_requests_pack_and_missing_input_is_reported() {
        let temp = tempfile::tempdir().unwrap();
        let mut app = app_in(temp.path());
        type_text(&mut app, "./missing");
        app.handle_key_event(key(KeyCode::Enter));
        assert!(app.pending_pack);

        app.perform_pack();
        assert!(!app.pending_pack);
        let last = app.transcript.entries().last().unwrap();
        assert_eq!(last.level, EntryLevel::Error);
        assert!(last.text.contains("[input-not-found]"));
    }

    #[test]
    fn unresolvable_tool_is_reported_after_command_line() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp.path().join("sample")).unwrap();
        let mut app = app_in(temp.path());
        type_text(&mut app, "sample");

        app.perform_pack();
        let entries = app.transcript.entries();
        assert_eq!(entries[0].level, EntryLevel::Command);
        assert!(entries[0].text.contains("--style xml"));
        assert!(
            entries
                .iter()
                .any(|entry| entry.text.contains("[executable-not-found]"))
        );
    }

    #[test]
    fn space_toggles_flags_but_types_in_text_fields() {
        let temp = tempfile::tempdir().unwrap();
        let mut app = app_in(temp.path());
        type_text(&mut app, "a b");
        assert_eq!(app.form.input(), "a b");

        app.form.focus(FormField::Flag(PackFlag::CompressCode));
        app.handle_key_event(key(KeyCode::Char(' ')));
        assert!(app.form.flags().compress_code);
    }

    #[test]
    fn copy_without_output_sets_error_status() {
        let temp = tempfile::tempdir().unwrap();
        let mut app = app_in(temp.path());
        app.handle_key_event(KeyEvent::new(KeyCode::Char('y'), KeyModifiers::CONTROL));
        let status = app.status.as_ref().unwrap();
        assert_eq!(status.text, "Nothing packed yet");
    }

    #[test]
    fn paste_replaces_input_and_appends_elsewhere() {
        let temp = tempfile::tempdir().unwrap();
        let mut app = app_in(temp.path());
        type_text(&mut app, "old");
        app.handle_event(Event::Paste("'/home/me/project' \n".into()));
        assert_eq!(app.form.input(), "/home/me/project");

        app.form.focus(FormField::Include);
        app.handle_event(Event::Paste("src/**,\ndocs/**".into()));
        let options = app.form.to_options();
        assert_eq!(options.include_patterns.as_deref(), Some("src/**,docs/**"));

        app.form.focus(FormField::Pack);
        app.handle_event(Event::Paste("ignored".into()));
        assert_eq!(app.form.input(), "/home/me/project");
    }

    #[test]
    fn escape_quits() {
        let temp = tempfile::tempdir().unwrap();
        let mut app = app_in(temp.path());
        app.handle_key_event(key(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn renders_full_layout() {
        let temp = tempfile::tempdir().unwrap();
        let mut app = app_in(temp.path());
        let backend = TestBackend::new(110, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("Feedback"));
        assert!(text.contains("Output Configuration"));
        assert!(text.contains("Ready"));
    }
}
