//! Resolution of the repomix executable for the running platform.

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::domain::errors::PackError;
use crate::infra::config::ToolSettings;

const NPX: &str = "npx";
const REPOMIX: &str = "repomix";

/// Operating systems with a known bundled binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::MacOs => "macos",
            Platform::Linux => "linux",
        }
    }

    /// Bundled binary layout for this platform.
    pub fn bundled(&self) -> Option<&'static BundledBinary> {
        BUNDLED_BINARIES
            .iter()
            .find(|entry| entry.platform == *self)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a standalone install keeps its copy of repomix.
#[derive(Debug)]
pub struct BundledBinary {
    pub platform: Platform,
    pub file_name: &'static str,
    /// Directories relative to the install location, searched in order.
    pub dirs: &'static [&'static str],
}

static BUNDLED_BINARIES: [BundledBinary; 3] = [
    BundledBinary {
        platform: Platform::Windows,
        file_name: "repomix-win.exe",
        dirs: &[".", "bin"],
    },
    BundledBinary {
        platform: Platform::MacOs,
        file_name: "repomix-macos",
        dirs: &[".", "bin", "../Resources"],
    },
    BundledBinary {
        platform: Platform::Linux,
        file_name: "repomix-linux",
        dirs: &[".", "bin"],
    },
];

/// How the executable was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOrigin {
    /// Path named in configuration.
    Configured,
    /// `npx repomix` through the Node package runner.
    PackageManagerShim,
    /// `repomix` installed on the search path.
    Installed,
    /// Binary shipped next to this application.
    Bundled,
}

/// An executable ready to be launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTool {
    pub program: PathBuf,
    /// Arguments placed before the invocation's own arguments.
    pub prefix_args: Vec<String>,
    pub origin: ToolOrigin,
    /// Launch through `cmd /C`, needed for `.cmd`/`.bat` shims on Windows.
    pub via_shell: bool,
}

impl ResolvedTool {
    fn direct(program: PathBuf, origin: ToolOrigin) -> Self {
        Self {
            program,
            prefix_args: Vec::new(),
            origin,
            via_shell: false,
        }
    }

    /// Build the process command for `args` without spawning it.
    pub fn command(&self, args: &[String]) -> Command {
        let mut command = if self.via_shell {
            let mut shell = Command::new("cmd");
            shell.arg("/C").arg(&self.program);
            shell
        } else {
            Command::new(&self.program)
        };
        command.args(&self.prefix_args).args(args);
        command
    }
}

/// Finds repomix using the configured path, the search path, then the install directory.
#[derive(Debug, Clone)]
pub struct ToolLocator {
    platform: Platform,
    search_path: Option<OsString>,
    install_dir: Option<PathBuf>,
    configured: Option<PathBuf>,
    prefer_npx: bool,
}

impl ToolLocator {
    /// Locator for `platform` using `PATH` and the running executable's directory.
    pub fn new(platform: Platform) -> Self {
        let install_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        Self {
            platform,
            search_path: env::var_os("PATH"),
            install_dir,
            configured: None,
            prefer_npx: true,
        }
    }

    pub fn from_settings(settings: &ToolSettings) -> Self {
        let mut locator = Self::new(Platform::current());
        locator.configured = settings.path.clone();
        locator.prefer_npx = settings.prefer_npx();
        locator
    }

    pub fn with_search_path(mut self, paths: impl Into<OsString>) -> Self {
        self.search_path = Some(paths.into());
        self
    }

    pub fn with_install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = Some(dir.into());
        self
    }

    pub fn with_configured_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.configured = Some(path.into());
        self
    }

    pub fn prefer_npx(mut self, prefer: bool) -> Self {
        self.prefer_npx = prefer;
        self
    }

    /// Resolve the executable, in order: configured path, npx shim, installed
    /// binary, bundled binary.
    pub fn resolve(&self) -> Result<ResolvedTool, PackError> {
        if let Some(path) = &self.configured {
            if path.is_file() {
                tracing::debug!(path = %path.display(), "using configured repomix");
                return Ok(ResolvedTool::direct(path.clone(), ToolOrigin::Configured));
            }
            tracing::warn!(
                path = %path.display(),
                "configured repomix path does not exist, falling back to lookup"
            );
        }

        if self.prefer_npx
            && let Some(npx) = self.lookup(NPX)
        {
            tracing::debug!(path = %npx.display(), "using npx shim");
            let via_shell = self.platform == Platform::Windows && is_batch_script(&npx);
            return Ok(ResolvedTool {
                program: npx,
                prefix_args: vec![REPOMIX.to_owned()],
                origin: ToolOrigin::PackageManagerShim,
                via_shell,
            });
        }

        if let Some(installed) = self.lookup(REPOMIX) {
            tracing::debug!(path = %installed.display(), "using installed repomix");
            return Ok(ResolvedTool::direct(installed, ToolOrigin::Installed));
        }

        if let Some(bundled) = self.bundled_path() {
            tracing::debug!(path = %bundled.display(), "using bundled repomix");
            return Ok(ResolvedTool::direct(bundled, ToolOrigin::Bundled));
        }

        Err(PackError::ExecutableNotFound {
            platform: self.platform.to_string(),
        })
    }

    fn lookup(&self, name: &str) -> Option<PathBuf> {
        let search_path = self.search_path.as_ref()?;
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        which::which_in(name, Some(search_path), cwd).ok()
    }

    fn bundled_path(&self) -> Option<PathBuf> {
        let install_dir = self.install_dir.as_ref()?;
        let layout = self.platform.bundled()?;
        layout
            .dirs
            .iter()
            .map(|dir| install_dir.join(dir).join(layout.file_name))
            .find(|candidate| candidate.is_file())
    }
}

fn is_batch_script(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("cmd") || ext.eq_ignore_ascii_case("bat"))
}
