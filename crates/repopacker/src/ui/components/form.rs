//! Options form: input, output configuration, and toggles.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::domain::model::{OutputStyle, PackFlag, PackFlags, PackOptions};
use crate::infra::config::Config;

/// A focusable element of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Input,
    Style,
    OutputFile,
    Include,
    Ignore,
    Flag(PackFlag),
    Pack,
    Copy,
}

impl FormField {
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            FormField::Input | FormField::OutputFile | FormField::Include | FormField::Ignore
        )
    }
}

const FIELD_COUNT: usize = 7 + PackFlag::ALL.len();

fn field_at(index: usize) -> FormField {
    match index {
        0 => FormField::Input,
        1 => FormField::Style,
        2 => FormField::OutputFile,
        3 => FormField::Include,
        4 => FormField::Ignore,
        i if i < 5 + PackFlag::ALL.len() => FormField::Flag(PackFlag::ALL[i - 5]),
        i if i == 5 + PackFlag::ALL.len() => FormField::Pack,
        _ => FormField::Copy,
    }
}

/// Editable form contents plus keyboard focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    input: String,
    style: OutputStyle,
    output_file: String,
    include: String,
    ignore: String,
    flags: PackFlags,
    focus: usize,
}

impl Default for FormState {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl FormState {
    pub fn from_config(config: &Config) -> Self {
        let style = config.defaults.style();
        let output_file = match config.defaults.output_file().trim() {
            "" => style.default_file_name().to_owned(),
            name => name.to_owned(),
        };
        Self {
            input: String::new(),
            style,
            output_file,
            include: config.defaults.include().to_owned(),
            ignore: config.defaults.ignore().to_owned(),
            flags: config.flags.to_flags(),
            focus: 0,
        }
    }

    pub fn focused(&self) -> FormField {
        field_at(self.focus)
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % FIELD_COUNT;
    }

    pub fn focus_previous(&mut self) {
        self.focus = (self.focus + FIELD_COUNT - 1) % FIELD_COUNT;
    }

    pub fn focus(&mut self, field: FormField) {
        if let Some(index) = (0..FIELD_COUNT).find(|index| field_at(*index) == field) {
            self.focus = index;
        }
    }

    pub fn style(&self) -> OutputStyle {
        self.style
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn output_file(&self) -> &str {
        &self.output_file
    }

    pub fn flags(&self) -> PackFlags {
        self.flags
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.focused() {
            FormField::Input => Some(&mut self.input),
            FormField::OutputFile => Some(&mut self.output_file),
            FormField::Include => Some(&mut self.include),
            FormField::Ignore => Some(&mut self.ignore),
            _ => None,
        }
    }

    /// Append to the focused text field. Returns false when focus is not on text.
    pub fn push_char(&mut self, ch: char) -> bool {
        match self.text_mut() {
            Some(text) => {
                text.push(ch);
                true
            }
            None => false,
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(text) = self.text_mut() {
            text.pop();
        }
    }

    /// Replace the input field with a pasted path.
    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// Toggle the focused checkbox or advance the style radio group.
    pub fn toggle_focused(&mut self) {
        match self.focused() {
            FormField::Style => self.cycle_style(1),
            FormField::Flag(flag) => self.flags.set(flag, !self.flags.is_set(flag)),
            _ => {}
        }
    }

    /// Move the style selection. The output file follows the style while it
    /// still holds the previous style's default name.
    pub fn cycle_style(&mut self, delta: isize) {
        let styles = OutputStyle::ALL;
        let current = styles
            .iter()
            .position(|style| *style == self.style)
            .unwrap_or(0) as isize;
        let len = styles.len() as isize;
        let next = styles[(current + delta).rem_euclid(len) as usize];

        let trimmed = self.output_file.trim();
        if trimmed.is_empty() || trimmed == self.style.default_file_name() {
            self.output_file = next.default_file_name().to_owned();
        }
        self.style = next;
    }

    /// Snapshot the form as a fresh options record.
    pub fn to_options(&self) -> PackOptions {
        PackOptions {
            input: self.input.trim().to_owned(),
            style: self.style,
            output_file_name: self.output_file.trim().to_owned(),
            include_patterns: optional(&self.include),
            ignore_patterns: optional(&self.ignore),
            flags: self.flags,
        }
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Renders the three form panels.
#[derive(Debug, Default)]
pub struct OptionsForm;

impl OptionsForm {
    /// Height needed above the feedback panel.
    pub const HEIGHT: u16 = 3 + 14;

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, state: &FormState) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        self.render_input(frame, rows[0], state);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(34)])
            .split(rows[1]);
        self.render_output_config(frame, columns[0], state);
        self.render_options(frame, columns[1], state);
    }

    fn render_input(&self, frame: &mut Frame<'_>, area: Rect, state: &FormState) {
        let focused = state.focused() == FormField::Input;
        let block = panel("Repository Input", focused);
        let line = if state.input.is_empty() {
            Line::styled(
                "Enter GitHub URL, owner/repo, or local path",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            Line::raw(text_with_cursor(&state.input, focused))
        };
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn render_output_config(&self, frame: &mut Frame<'_>, area: Rect, state: &FormState) {
        let focus = state.focused();
        let mut style_spans = vec![label("Style", focus == FormField::Style)];
        for style in OutputStyle::ALL {
            let marker = if style == state.style { "(•)" } else { "( )" };
            style_spans.push(Span::raw(format!("  {marker} {}", style.label())));
        }

        let lines = vec![
            Line::from(style_spans),
            Line::raw(""),
            text_row("Output file", &state.output_file, focus == FormField::OutputFile),
            text_row("Include", &state.include, focus == FormField::Include),
            text_row("Ignore", &state.ignore, focus == FormField::Ignore),
            Line::raw(""),
            Line::styled(
                "Patterns are comma separated, e.g. *.py, src/**/*.js",
                Style::default().fg(Color::DarkGray),
            ),
        ];
        let block = panel("Output Configuration", false);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_options(&self, frame: &mut Frame<'_>, area: Rect, state: &FormState) {
        let focus = state.focused();
        let mut lines = vec![Line::styled(
            "Output Format Options",
            Style::default().fg(Color::Gray),
        )];
        lines.extend(
            PackFlag::ALL
                .iter()
                .filter(|flag| flag.is_output_format())
                .map(|flag| checkbox(*flag, state, focus)),
        );
        lines.push(Line::styled(
            "File Processing Options",
            Style::default().fg(Color::Gray),
        ));
        lines.extend(
            PackFlag::ALL
                .iter()
                .filter(|flag| !flag.is_output_format())
                .map(|flag| checkbox(*flag, state, focus)),
        );
        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            button("Pack", focus == FormField::Pack, Color::Blue),
            Span::raw(" "),
            button("Copy", focus == FormField::Copy, Color::DarkGray),
        ]));

        let block = panel("Options", false);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

fn panel(title: &str, focused: bool) -> Block<'static> {
    Block::default()
        .title(title.to_owned())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused {
            Color::Cyan
        } else {
            Color::DarkGray
        }))
}

fn label(text: &str, focused: bool) -> Span<'static> {
    let style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Span::styled(format!("{text}:"), style)
}

fn text_row(name: &str, value: &str, focused: bool) -> Line<'static> {
    Line::from(vec![
        label(name, focused),
        Span::raw(" "),
        Span::raw(text_with_cursor(value, focused)),
    ])
}

fn text_with_cursor(value: &str, focused: bool) -> String {
    if focused {
        format!("{value}▏")
    } else {
        value.to_owned()
    }
}

fn checkbox(flag: PackFlag, state: &FormState, focus: FormField) -> Line<'static> {
    let mark = if state.flags.is_set(flag) { "[x]" } else { "[ ]" };
    let style = if focus == FormField::Flag(flag) {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::styled(format!(" {mark} {}", flag.label()), style)
}

fn button(text: &str, focused: bool, color: Color) -> Span<'static> {
    let mut style = Style::default().fg(Color::White).bg(color);
    if focused {
        style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
    }
    Span::styled(format!(" {text} "), style)
}
