//! Domain models for pack options, invocations, and results.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output format produced by repomix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum OutputStyle {
    /// XML document, the tool's default.
    #[default]
    Xml,
    /// Markdown document with fenced code blocks.
    Markdown,
    /// Plain text.
    Plain,
}

impl OutputStyle {
    pub const ALL: [OutputStyle; 3] = [OutputStyle::Xml, OutputStyle::Markdown, OutputStyle::Plain];

    /// Identifier passed to `--style`.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputStyle::Xml => "xml",
            OutputStyle::Markdown => "markdown",
            OutputStyle::Plain => "plain",
        }
    }

    /// Human readable label used by the form.
    pub fn label(&self) -> &'static str {
        match self {
            OutputStyle::Xml => "XML",
            OutputStyle::Markdown => "Markdown",
            OutputStyle::Plain => "Plain",
        }
    }

    /// File name repomix writes when no output name is given.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            OutputStyle::Xml => "repomix-output.xml",
            OutputStyle::Markdown => "repomix-output.md",
            OutputStyle::Plain => "repomix-output.txt",
        }
    }
}

impl fmt::Display for OutputStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputStyle {
    type Err = OutputStyleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "xml" => Ok(OutputStyle::Xml),
            "markdown" | "md" => Ok(OutputStyle::Markdown),
            "plain" | "text" | "txt" => Ok(OutputStyle::Plain),
            other => Err(OutputStyleParseError::UnknownStyle(other.to_string())),
        }
    }
}

/// Error returned when parsing an [`OutputStyle`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum OutputStyleParseError {
    #[error("unknown output style '{0}' (expected xml, markdown or plain)")]
    UnknownStyle(String),
}

/// One of the boolean formatting toggles understood by repomix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackFlag {
    NoFileSummary,
    NoDirectoryStructure,
    ShowLineNumbers,
    ParsableStyle,
    CompressCode,
    RemoveComments,
    RemoveEmptyLines,
}

impl PackFlag {
    /// Every flag in the order its switch is emitted.
    pub const ALL: [PackFlag; 7] = [
        PackFlag::NoFileSummary,
        PackFlag::NoDirectoryStructure,
        PackFlag::ShowLineNumbers,
        PackFlag::ParsableStyle,
        PackFlag::CompressCode,
        PackFlag::RemoveComments,
        PackFlag::RemoveEmptyLines,
    ];

    pub fn switch(&self) -> &'static str {
        match self {
            PackFlag::NoFileSummary => "--no-file-summary",
            PackFlag::NoDirectoryStructure => "--no-directory-structure",
            PackFlag::ShowLineNumbers => "--output-show-line-numbers",
            PackFlag::ParsableStyle => "--parsable-style",
            PackFlag::CompressCode => "--compress",
            PackFlag::RemoveComments => "--remove-comments",
            PackFlag::RemoveEmptyLines => "--remove-empty-lines",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PackFlag::NoFileSummary => "No file summary",
            PackFlag::NoDirectoryStructure => "No directory structure",
            PackFlag::ShowLineNumbers => "Line numbers",
            PackFlag::ParsableStyle => "Parsable format",
            PackFlag::CompressCode => "Compress code",
            PackFlag::RemoveComments => "Remove comments",
            PackFlag::RemoveEmptyLines => "Remove empty lines",
        }
    }

    /// Whether the flag shapes the rendered output rather than the processed files.
    pub fn is_output_format(&self) -> bool {
        matches!(
            self,
            PackFlag::NoFileSummary
                | PackFlag::NoDirectoryStructure
                | PackFlag::ShowLineNumbers
                | PackFlag::ParsableStyle
        )
    }
}

/// The seven formatting toggles. `false` leaves the tool's default behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PackFlags {
    pub no_file_summary: bool,
    pub no_directory_structure: bool,
    pub show_line_numbers: bool,
    pub parsable_style: bool,
    pub compress_code: bool,
    pub remove_comments: bool,
    pub remove_empty_lines: bool,
}

impl PackFlags {
    pub fn is_set(&self, flag: PackFlag) -> bool {
        match flag {
            PackFlag::NoFileSummary => self.no_file_summary,
            PackFlag::NoDirectoryStructure => self.no_directory_structure,
            PackFlag::ShowLineNumbers => self.show_line_numbers,
            PackFlag::ParsableStyle => self.parsable_style,
            PackFlag::CompressCode => self.compress_code,
            PackFlag::RemoveComments => self.remove_comments,
            PackFlag::RemoveEmptyLines => self.remove_empty_lines,
        }
    }

    pub fn set(&mut self, flag: PackFlag, value: bool) {
        let slot = match flag {
            PackFlag::NoFileSummary => &mut self.no_file_summary,
            PackFlag::NoDirectoryStructure => &mut self.no_directory_structure,
            PackFlag::ShowLineNumbers => &mut self.show_line_numbers,
            PackFlag::ParsableStyle => &mut self.parsable_style,
            PackFlag::CompressCode => &mut self.compress_code,
            PackFlag::RemoveComments => &mut self.remove_comments,
            PackFlag::RemoveEmptyLines => &mut self.remove_empty_lines,
        };
        *slot = value;
    }

    /// Flags that are switched on, in emission order.
    pub fn enabled(&self) -> impl Iterator<Item = PackFlag> + '_ {
        PackFlag::ALL.into_iter().filter(|flag| self.is_set(*flag))
    }
}

/// Everything needed to build one repomix invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackOptions {
    /// Local path, URL, or `owner/repo` shorthand.
    pub input: String,
    pub style: OutputStyle,
    /// File name written into the working directory. Empty means the style default.
    pub output_file_name: String,
    pub include_patterns: Option<String>,
    pub ignore_patterns: Option<String>,
    pub flags: PackFlags,
}

impl PackOptions {
    pub fn new(input: impl Into<String>, style: OutputStyle) -> Self {
        Self {
            input: input.into(),
            style,
            ..Self::default()
        }
    }

    pub fn with_output_file_name(mut self, name: impl Into<String>) -> Self {
        self.output_file_name = name.into();
        self
    }

    /// Output file name with the style default substituted for an empty value.
    pub fn effective_file_name(&self) -> &str {
        let trimmed = self.output_file_name.trim();
        if trimmed.is_empty() {
            self.style.default_file_name()
        } else {
            trimmed
        }
    }
}

/// Classified input of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// URL or `owner/repo` shorthand, passed with `--remote`.
    Remote(String),
    /// Path on disk, passed positionally.
    Local(PathBuf),
}

impl InputSource {
    pub fn is_remote(&self) -> bool {
        matches!(self, InputSource::Remote(_))
    }
}

/// Builder output: tool arguments (without the program) and the expected output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackInvocation {
    pub source: InputSource,
    pub args: Vec<String>,
    pub output_path: PathBuf,
}

impl PackInvocation {
    /// Arguments joined with spaces, for display only.
    pub fn display_args(&self) -> String {
        self.args.join(" ")
    }
}

/// Classification of a failed invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    InputNotFound,
    ExecutableNotFound,
    PermissionRepairFailed,
    LaunchError,
    ToolFailure,
    SilentFailure,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InputNotFound => "input-not-found",
            FailureKind::ExecutableNotFound => "executable-not-found",
            FailureKind::PermissionRepairFailed => "permission-repair-failed",
            FailureKind::LaunchError => "launch-error",
            FailureKind::ToolFailure => "tool-failure",
            FailureKind::SilentFailure => "silent-failure",
        }
    }
}

/// Outcome of one invocation, successful or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub stdout: String,
    /// Captured stderr on success; the full error message on failure.
    pub stderr: String,
    pub output_path: Option<PathBuf>,
    pub failure: Option<FailureKind>,
}

impl ExecutionResult {
    pub fn succeeded(stdout: String, stderr: String, output_path: PathBuf) -> Self {
        Self {
            success: true,
            stdout,
            stderr,
            output_path: Some(output_path),
            failure: None,
        }
    }

    pub fn failed(kind: FailureKind, stdout: String, message: String) -> Self {
        Self {
            success: false,
            stdout,
            stderr: message,
            output_path: None,
            failure: Some(kind),
        }
    }
}
