//! Translation of [`PackOptions`] into a repomix command line.

use std::path::{Component, Path, PathBuf};

use clap::Parser;

use crate::domain::errors::PackError;
use crate::domain::model::{InputSource, OutputStyle, PackFlags, PackInvocation, PackOptions};

pub const REMOTE_FLAG: &str = "--remote";
pub const OUTPUT_FLAG: &str = "-o";
pub const STYLE_FLAG: &str = "--style";
pub const INCLUDE_FLAG: &str = "--include";
pub const IGNORE_FLAG: &str = "--ignore";
pub const QUIET_FLAG: &str = "--quiet";

/// Decide whether `input` names a remote repository or a local path.
///
/// Remote inputs are `http(s)://` URLs and `owner/repo` shorthands. Everything
/// else is a local path with leading `./` components removed, unless that
/// would leave it starting with `-`.
pub fn classify_input(input: &str) -> InputSource {
    let trimmed = input.trim();
    if is_remote(trimmed) {
        InputSource::Remote(trimmed.to_owned())
    } else {
        InputSource::Local(normalize_local(trimmed))
    }
}

fn is_remote(input: &str) -> bool {
    let lowered = input.to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        return true;
    }

    let mut segments = input.split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(owner), Some(repo), None) => is_shorthand_segment(owner) && is_shorthand_segment(repo),
        _ => false,
    }
}

fn is_shorthand_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
}

fn normalize_local(input: &str) -> PathBuf {
    if input.is_empty() {
        return PathBuf::new();
    }
    let normalized: PathBuf = Path::new(input)
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect();
    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else if normalized.to_string_lossy().starts_with('-') {
        // Keep the tool from reading the path as a switch.
        Path::new(".").join(normalized)
    } else {
        normalized
    }
}

/// Build the argument list for one invocation.
///
/// The output file always lands in `cwd`. Local inputs are resolved against
/// `cwd` and must exist. Nothing is executed here.
pub fn build_invocation(options: &PackOptions, cwd: &Path) -> Result<PackInvocation, PackError> {
    let source = classify_input(&options.input);
    let mut args = Vec::new();

    match &source {
        InputSource::Remote(reference) => {
            args.push(REMOTE_FLAG.to_owned());
            args.push(reference.clone());
        }
        InputSource::Local(path) => {
            if path.as_os_str().is_empty() || !cwd.join(path).exists() {
                return Err(PackError::InputNotFound { path: path.clone() });
            }
            args.push(path.to_string_lossy().into_owned());
        }
    }

    let output_path = cwd.join(options.effective_file_name());
    args.push(OUTPUT_FLAG.to_owned());
    args.push(output_path.to_string_lossy().into_owned());
    args.push(STYLE_FLAG.to_owned());
    args.push(options.style.as_str().to_owned());

    if let Some(include) = non_empty(options.include_patterns.as_deref()) {
        args.push(INCLUDE_FLAG.to_owned());
        args.push(include.to_owned());
    }
    if let Some(ignore) = non_empty(options.ignore_patterns.as_deref()) {
        args.push(IGNORE_FLAG.to_owned());
        args.push(ignore.to_owned());
    }

    args.extend(options.flags.enabled().map(|flag| flag.switch().to_owned()));
    args.push(QUIET_FLAG.to_owned());

    Ok(PackInvocation {
        source,
        args,
        output_path,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Parser for the subset of repomix's command line this crate emits.
///
/// Used to read a built argument list back into options.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "repomix",
    no_binary_name = true,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct RepomixArgs {
    pub input: Option<String>,
    #[arg(long)]
    pub remote: Option<String>,
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    #[arg(long, value_enum)]
    pub style: Option<OutputStyle>,
    #[arg(long)]
    pub include: Option<String>,
    #[arg(long)]
    pub ignore: Option<String>,
    #[arg(long)]
    pub no_file_summary: bool,
    #[arg(long)]
    pub no_directory_structure: bool,
    #[arg(long = "output-show-line-numbers")]
    pub show_line_numbers: bool,
    #[arg(long)]
    pub parsable_style: bool,
    #[arg(long = "compress")]
    pub compress_code: bool,
    #[arg(long)]
    pub remove_comments: bool,
    #[arg(long)]
    pub remove_empty_lines: bool,
    #[arg(long)]
    pub quiet: bool,
}

impl RepomixArgs {
    pub fn parse_args(args: &[String]) -> Result<Self, clap::Error> {
        Self::try_parse_from(args)
    }

    /// Recover the options that would produce this command line.
    pub fn into_options(self) -> PackOptions {
        let output_file_name = self
            .output
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        PackOptions {
            input: self.remote.or(self.input).unwrap_or_default(),
            style: self.style.unwrap_or_default(),
            output_file_name,
            include_patterns: self.include,
            ignore_patterns: self.ignore,
            flags: PackFlags {
                no_file_summary: self.no_file_summary,
                no_directory_structure: self.no_directory_structure,
                show_line_numbers: self.show_line_numbers,
                parsable_style: self.parsable_style,
                compress_code: self.compress_code,
                remove_comments: self.remove_comments,
                remove_empty_lines: self.remove_empty_lines,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::domain::model::{FailureKind, PackFlag};

    fn workspace() -> tempfile::TempDir {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("sample")).expect("sample dir");
        temp
    }

    fn all_flags() -> PackFlags {
        let mut flags = PackFlags::default();
        for flag in PackFlag::ALL {
            flags.set(flag, true);
        }
        flags
    }

    #[test]
    fn local_input_with_defaults_ends_with_expected_tail() {
        let temp = workspace();
        let cwd = temp.path();
        let options = PackOptions::new("./sample", OutputStyle::Xml).with_output_file_name("out.xml");

        let invocation = build_invocation(&options, cwd).unwrap();
        let expected_output = cwd.join("out.xml").to_string_lossy().into_owned();

        assert_eq!(
            invocation.args,
            vec![
                "sample".to_string(),
                "-o".into(),
                expected_output,
                "--style".into(),
                "xml".into(),
                "--quiet".into(),
            ]
        );
        assert_eq!(invocation.output_path, cwd.join("out.xml"));
        assert_eq!(invocation.source, InputSource::Local(PathBuf::from("sample")));
    }

    #[test]
    fn missing_local_input_is_rejected() {
        let temp = workspace();
        let options = PackOptions::new("does-not-exist", OutputStyle::Xml);

        let err = build_invocation(&options, temp.path()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::InputNotFound);
        assert!(err.to_string().contains("does-not-exist"));
    }

    #[test]
    fn empty_input_is_rejected() {
        let temp = workspace();
        let options = PackOptions::new("   ", OutputStyle::Xml);
        let err = build_invocation(&options, temp.path()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::InputNotFound);
    }

    #[test]
    fn urls_and_shorthands_are_remote() {
        for input in [
            "https://github.com/yamadashy/repomix",
            "http://example.com/repo.git",
            "HTTPS://github.com/a/b",
            "yamadashy/repomix",
            "octo-cat/Spoon.Knife_2",
        ] {
            assert!(classify_input(input).is_remote(), "{input} should be remote");
        }
    }

    #[test]
    fn paths_are_local() {
        for input in [
            "./sample",
            "../sibling",
            "sample",
            "/abs/path",
            "a/b/c",
            "C:/Users",
            "~/code",
            ".",
            "src/",
        ] {
            assert!(!classify_input(input).is_remote(), "{input} should be local");
        }
    }

    #[test]
    fn remote_input_skips_existence_check() {
        let temp = workspace();
        let options = PackOptions::new("yamadashy/repomix", OutputStyle::Markdown);

        let invocation = build_invocation(&options, temp.path()).unwrap();
        assert_eq!(invocation.args[0], "--remote");
        assert_eq!(invocation.args[1], "yamadashy/repomix");
        assert_eq!(
            invocation.output_path,
            temp.path().join("repomix-output.md")
        );
    }

    #[test]
    fn each_enabled_flag_appears_once_in_stable_order() {
        let temp = workspace();
        let mut options = PackOptions::new("sample", OutputStyle::Plain);
        options.flags = all_flags();

        let invocation = build_invocation(&options, temp.path()).unwrap();
        let switches: Vec<&str> = PackFlag::ALL.iter().map(PackFlag::switch).collect();
        let positions: Vec<usize> = switches
            .iter()
            .map(|switch| {
                let hits: Vec<_> = invocation
                    .args
                    .iter()
                    .enumerate()
                    .filter(|(_, arg)| arg == switch)
                    .collect();
                assert_eq!(hits.len(), 1, "{switch} should appear exactly once");
                hits[0].0
            })
            .collect();

        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(invocation.args.last().map(String::as_str), Some(QUIET_FLAG));
    }

    #[test]
    fn disabled_flags_are_absent() {
        let temp = workspace();
        let mut options = PackOptions::new("sample", OutputStyle::Xml);
        options.flags.set(PackFlag::RemoveComments, true);

        let invocation = build_invocation(&options, temp.path()).unwrap();
        for flag in PackFlag::ALL {
            let present = invocation.args.iter().any(|arg| arg == flag.switch());
            assert_eq!(present, flag == PackFlag::RemoveComments, "{flag:?}");
        }
    }

    #[test]
    fn blank_patterns_are_omitted() {
        let temp = workspace();
        let mut options = PackOptions::new("sample", OutputStyle::Xml);
        options.include_patterns = Some("   ".into());
        options.ignore_patterns = Some(String::new());

        let invocation = build_invocation(&options, temp.path()).unwrap();
        assert!(!invocation.args.iter().any(|arg| arg == INCLUDE_FLAG));
        assert!(!invocation.args.iter().any(|arg| arg == IGNORE_FLAG));
    }

    #[test]
    fn parsing_built_arguments_recovers_options() {
        let temp = workspace();
        let mut options = PackOptions::new("sample", OutputStyle::Markdown)
            .with_output_file_name("bundle.md");
        options.include_patterns = Some("src/**/*.rs,Cargo.toml".into());
        options.ignore_patterns = Some("target/**".into());
        options.flags.set(PackFlag::ShowLineNumbers, true);
        options.flags.set(PackFlag::CompressCode, true);
        options.flags.set(PackFlag::NoDirectoryStructure, true);

        let invocation = build_invocation(&options, temp.path()).unwrap();
        let parsed = RepomixArgs::parse_args(&invocation.args).unwrap();
        assert!(parsed.quiet);
        assert_eq!(parsed.output.as_deref(), Some(invocation.output_path.as_path()));

        let recovered = parsed.into_options();
        assert_eq!(recovered, options);
    }

    #[test]
    fn parsing_remote_arguments_recovers_reference() {
        let temp = workspace();
        let mut options = PackOptions::new("https://github.com/octocat/Spoon-Knife", OutputStyle::Plain)
            .with_output_file_name("spoon.txt");
        options.flags.set(PackFlag::ParsableStyle, true);

        let invocation = build_invocation(&options, temp.path()).unwrap();
        let recovered = RepomixArgs::parse_args(&invocation.args)
            .unwrap()
            .into_options();
        assert_eq!(recovered, options);
    }

    #[cfg(unix)]
    #[test]
    fn dash_prefixed_directory_stays_a_path() {
        let temp = workspace();
        fs::create_dir_all(temp.path().join("--help")).unwrap();
        let options = PackOptions::new("./--help", OutputStyle::Xml);

        let invocation = build_invocation(&options, temp.path()).unwrap();
        assert_eq!(invocation.args[0], "./--help");
        assert_eq!(
            invocation.source,
            InputSource::Local(PathBuf::from("./--help"))
        );

        let parsed = RepomixArgs::parse_args(&invocation.args).unwrap();
        assert_eq!(parsed.input.as_deref(), Some("./--help"));
        assert!(parsed.quiet);
    }

    #[cfg(unix)]
    #[test]
    fn bare_dash_prefixed_input_gains_current_dir_prefix() {
        let temp = workspace();
        fs::create_dir_all(temp.path().join("-x")).unwrap();
        let options = PackOptions::new("-x", OutputStyle::Plain);

        let invocation = build_invocation(&options, temp.path()).unwrap();
        assert_eq!(invocation.args[0], "./-x");
    }
}
