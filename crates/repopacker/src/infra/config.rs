//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use serde::{Deserialize, Serialize};

use crate::domain::model::{OutputStyle, PackFlag, PackFlags, PackOptions};

const DEFAULT_CONFIG: &str = include_str!("../../assets/default-config.toml");
const DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".repopacker/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub flags: FlagDefaults,
    #[serde(default)]
    pub tool: ToolSettings,
}

/// Values preselected in the form and the `pack` command.
///
/// Unset keys fall through to the layer below; an empty string clears them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Defaults {
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub output_file: Option<String>,
    #[serde(default)]
    pub include: Option<String>,
    #[serde(default)]
    pub ignore: Option<String>,
}

impl Defaults {
    /// Configured style, falling back to XML when unset or unknown.
    pub fn style(&self) -> OutputStyle {
        let Some(style) = self.style.as_deref() else {
            return OutputStyle::default();
        };
        style.parse().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "ignoring configured output style");
            OutputStyle::default()
        })
    }

    pub fn output_file(&self) -> &str {
        self.output_file.as_deref().unwrap_or_default()
    }

    pub fn include(&self) -> &str {
        self.include.as_deref().unwrap_or_default()
    }

    pub fn ignore(&self) -> &str {
        self.ignore.as_deref().unwrap_or_default()
    }
}

/// Initial state of the seven formatting toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FlagDefaults {
    #[serde(default)]
    no_file_summary: Option<bool>,
    #[serde(default)]
    no_directory_structure: Option<bool>,
    #[serde(default)]
    show_line_numbers: Option<bool>,
    #[serde(default)]
    parsable_style: Option<bool>,
    #[serde(default)]
    compress_code: Option<bool>,
    #[serde(default)]
    remove_comments: Option<bool>,
    #[serde(default)]
    remove_empty_lines: Option<bool>,
}

impl FlagDefaults {
    fn slot(&self, flag: PackFlag) -> Option<bool> {
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

    pub fn to_flags(&self) -> PackFlags {
        let mut flags = PackFlags::default();
        for flag in PackFlag::ALL {
            flags.set(flag, self.slot(flag).unwrap_or(false));
        }
        flags
    }
}

/// How the repomix executable is located.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ToolSettings {
    /// Explicit executable, tried before any lookup.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    prefer_npx: Option<bool>,
}

impl ToolSettings {
    pub fn prefer_npx(&self) -> bool {
        self.prefer_npx.unwrap_or(true)
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    style: Option<String>,
    tool: Option<PathBuf>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            style: env::var("REPOPACKER_STYLE").ok(),
            tool: env::var_os("REPOPACKER_TOOL").map(PathBuf::from),
        }
    }

    #[cfg(test)]
    fn for_tests(style: &str, tool: &str) -> Self {
        Self {
            style: Some(style.to_owned()),
            tool: Some(PathBuf::from(tool)),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    pub fn load() -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            tracing::debug!(path = %global_path.display(), "loading user config");
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            tracing::debug!(path = %workspace_path.display(), "loading workspace config");
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            defaults: merge_defaults(self.defaults, other.defaults),
            flags: merge_flags(self.flags, other.flags),
            tool: merge_tool(self.tool, other.tool),
        }
    }

    /// Pack options for `input` seeded from the configured defaults.
    pub fn options_for(&self, input: impl Into<String>) -> PackOptions {
        PackOptions {
            input: input.into(),
            style: self.defaults.style(),
            output_file_name: self.defaults.output_file().to_owned(),
            include_patterns: non_empty(self.defaults.include()),
            ignore_patterns: non_empty(self.defaults.ignore()),
            flags: self.flags.to_flags(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn merge_defaults(base: Defaults, overlay: Defaults) -> Defaults {
    Defaults {
        style: overlay.style.or(base.style),
        output_file: overlay.output_file.or(base.output_file),
        include: overlay.include.or(base.include),
        ignore: overlay.ignore.or(base.ignore),
    }
}

fn merge_flags(base: FlagDefaults, overlay: FlagDefaults) -> FlagDefaults {
    FlagDefaults {
        no_file_summary: overlay.no_file_summary.or(base.no_file_summary),
        no_directory_structure: overlay.no_directory_structure.or(base.no_directory_structure),
        show_line_numbers: overlay.show_line_numbers.or(base.show_line_numbers),
        parsable_style: overlay.parsable_style.or(base.parsable_style),
        compress_code: overlay.compress_code.or(base.compress_code),
        remove_comments: overlay.remove_comments.or(base.remove_comments),
        remove_empty_lines: overlay.remove_empty_lines.or(base.remove_empty_lines),
    }
}

fn merge_tool(base: ToolSettings, overlay: ToolSettings) -> ToolSettings {
    ToolSettings {
        path: overlay.path.or(base.path),
        prefer_npx: overlay.prefer_npx.or(base.prefer_npx),
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("repopacker/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(style) = env.style {
        config.defaults.style = Some(style);
    }
    if let Some(tool) = env.tool {
        config.tool.path = Some(tool);
    }
    config
}
