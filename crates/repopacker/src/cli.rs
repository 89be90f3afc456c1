//! Command-line entry points.

use std::env;
use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};

use crate::app::runner::Packer;
use crate::domain::model::{ExecutionResult, OutputStyle, PackFlag, PackOptions};
use crate::infra::clipboard::{self, Clipboard};
use crate::infra::config::Config;
use crate::infra::logging;
use crate::ui::app::UiApp;

/// Pack a local directory or remote repository into one AI-friendly file with repomix.
#[derive(Parser, Debug)]
#[command(name = "repopacker")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase log verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive form (default).
    Tui,
    /// Run a single pack and report the result.
    Pack(PackArgs),
    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Default)]
pub struct PackArgs {
    /// Local path, repository URL, or owner/repo shorthand
    pub input: String,

    /// Output file name, written into the current directory
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output style
    #[arg(long, value_enum)]
    pub style: Option<OutputStyle>,

    /// Comma-separated include patterns
    #[arg(long)]
    pub include: Option<String>,

    /// Comma-separated ignore patterns
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

    /// Copy the packed file to the clipboard after a successful run
    #[arg(long)]
    pub copy: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl PackArgs {
    /// Options seeded from `config`, with anything given on the command line taking over.
    pub fn to_options(&self, config: &Config) -> PackOptions {
        let mut options = config.options_for(self.input.trim());
        if let Some(style) = self.style {
            options.style = style;
        }
        if let Some(output) = &self.output {
            options.output_file_name = output.clone();
        }
        if let Some(include) = &self.include {
            options.include_patterns = Some(include.clone());
        }
        if let Some(ignore) = &self.ignore {
            options.ignore_patterns = Some(ignore.clone());
        }
        for flag in PackFlag::ALL {
            if self.switch(flag) {
                options.flags.set(flag, true);
            }
        }
        options
    }

    fn switch(&self, flag: PackFlag) -> bool {
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
}

impl Cli {
    pub fn run(self) -> Result<ExitCode> {
        match self.command {
            None | Some(Commands::Tui) => {
                // Log lines would tear the alternate screen.
                crate::init("off");
                let config = Config::load()?;
                let cwd = env::current_dir().context("failed to read current directory")?;
                let packer = Packer::from_config(&config, cwd);
                UiApp::new(&config, packer, Box::new(Clipboard::new())).run()?;
                Ok(ExitCode::SUCCESS)
            }
            Some(Commands::Pack(args)) => {
                crate::init(logging::directive_for_verbosity(self.verbose));
                run_pack(&args)
            }
            Some(Commands::Completions { shell }) => {
                let mut command = Cli::command();
                let name = command.get_name().to_owned();
                generate(shell, &mut command, name, &mut io::stdout());
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn run_pack(args: &PackArgs) -> Result<ExitCode> {
    let config = Config::load()?;
    let cwd = env::current_dir().context("failed to read current directory")?;
    let packer = Packer::from_config(&config, cwd);
    let options = args.to_options(&config);

    let result = packer.pack(&options);

    if result.success
        && args.copy
        && let Some(path) = &result.output_path
    {
        let mut sink = Clipboard::new();
        match clipboard::copy_file(&mut sink, path) {
            Ok(chars) => tracing::info!(chars, "copied packed output to clipboard"),
            Err(err) => tracing::warn!(error = %err, "clipboard copy failed"),
        }
    }

    report(&result, args.json)?;
    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn report(result: &ExecutionResult, json: bool) -> Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(result).context("failed to serialize pack result")?;
        println!("{rendered}");
        return Ok(());
    }

    if !result.stdout.trim().is_empty() {
        println!("{}", result.stdout.trim_end());
    }
    if result.success {
        if !result.stderr.trim().is_empty() {
            eprintln!("{}", result.stderr.trim_end());
        }
        if let Some(path) = &result.output_path {
            println!("Packed into {}", path.display());
        }
    } else {
        eprintln!("error: {}", result.stderr.trim_end());
    }
    Ok(())
}
