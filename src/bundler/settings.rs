//! Configuration structures for AppDir staging and packaging.
//!
//! This module provides the user-supplied [`BundleSpec`], its fluent
//! [`BundleSpecBuilder`], and the explicit [`ToolConfig`] that locates the
//! external packaging tools.

use crate::bundler::error::{Context, Error, Result};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Name of the generated entry-point script at the bundle root.
pub const APPRUN_NAME: &str = "AppRun";

/// File name both icon copies are stored under.
pub const ICON_FILE_NAME: &str = "icon.png";

/// Reserved window-icon file name that is never copied from the source tree.
pub const RESERVED_ICON_NAME: &str = "icono.png";

/// Suffix appended to the application name to form the bundle directory.
pub const APPDIR_SUFFIX: &str = ".AppDir";

/// Default location of the system metadata scanner required by appimagetool.
pub const DEFAULT_METADATA_SCANNER: &str = "/usr/bin/appstreamcli";

/// Default system binary directory placed first on the packaging `PATH`.
pub const DEFAULT_SYSTEM_BIN_DIR: &str = "/usr/bin";

/// CPU architecture tag handed to the packaging tool.
///
/// The tag selects the tool file names (`appimagetool-<tag>.AppImage`,
/// `runtime-<tag>`) and is exported as `ARCH` to the tool's environment.
///
/// # Examples
///
/// ```
/// use appdir_bundler::bundler::Arch;
///
/// let arch: Arch = "aarch64".parse().unwrap();
/// assert_eq!(arch.appimage_tag(), "aarch64");
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// x86_64 / AMD64 (64-bit)
    #[default]
    X86_64,
    /// x86 / i686 (32-bit)
    #[serde(alias = "i686")]
    X86,
    /// AArch64 / ARM64 (64-bit)
    AArch64,
    /// ARM with hard-float (32-bit)
    Armhf,
}

impl Arch {
    /// Returns the architecture name used in AppImage tool file names.
    pub fn appimage_tag(self) -> &'static str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::X86 => "i686",
            Arch::AArch64 => "aarch64",
            Arch::Armhf => "armhf",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.appimage_tag())
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" => Ok(Arch::X86_64),
            "x86" | "i686" | "i386" => Ok(Arch::X86),
            "aarch64" | "arm64" => Ok(Arch::AArch64),
            "armhf" | "armv7" => Ok(Arch::Armhf),
            other => Err(format!(
                "unsupported architecture '{other}' (expected x86_64, i686, aarch64 or armhf)"
            )),
        }
    }
}

/// User inputs describing one application bundle.
///
/// Construct with [`BundleSpecBuilder`]. The spec is not validated on
/// construction; [`crate::bundler::planner::plan`] performs validation and
/// reports every missing field at once.
///
/// # Examples
///
/// ```no_run
/// use appdir_bundler::bundler::BundleSpecBuilder;
///
/// let spec = BundleSpecBuilder::new()
///     .source_dir("/home/me/project")
///     .exec_path("/home/me/project/myapp")
///     .icon_path("/home/me/project/logo.png")
///     .app_name("MyApp")
///     .description("Does things")
///     .categories("Utility;Development")
///     .build();
///
/// assert_eq!(spec.app_name(), "MyApp");
/// ```
#[derive(Clone, Debug, Default)]
pub struct BundleSpec {
    source_dir: PathBuf,
    icon_path: Option<PathBuf>,
    exec_path: PathBuf,
    app_name: String,
    description: String,
    categories: String,
}

impl BundleSpec {
    /// Returns the project tree that receives the bundle directory.
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Returns the icon path, if one was supplied.
    pub fn icon_path(&self) -> Option<&Path> {
        self.icon_path.as_deref()
    }

    /// Returns the executable to bundle.
    pub fn exec_path(&self) -> &Path {
        &self.exec_path
    }

    /// Returns the application name (bundle stem and display name).
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Returns the free-text description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the semicolon-delimited category list, verbatim.
    pub fn categories(&self) -> &str {
        &self.categories
    }

    /// Returns the bundle directory name, `{app_name}.AppDir`.
    pub fn appdir_name(&self) -> String {
        format!("{}{}", self.app_name, APPDIR_SUFFIX)
    }

    /// Returns the descriptor file name, `{app_name}.desktop`.
    pub fn desktop_file_name(&self) -> String {
        format!("{}.desktop", self.app_name)
    }

    /// Returns the bundle root, `{source_dir}/{app_name}.AppDir`.
    pub fn appdir_path(&self) -> PathBuf {
        self.source_dir.join(self.appdir_name())
    }
}

/// Builder for constructing [`BundleSpec`].
///
/// Every setter may be called more than once; the last call wins. This lets
/// callers layer a manifest file underneath command line overrides.
#[derive(Default, Debug, Clone)]
pub struct BundleSpecBuilder {
    source_dir: Option<PathBuf>,
    icon_path: Option<PathBuf>,
    exec_path: Option<PathBuf>,
    app_name: Option<String>,
    description: Option<String>,
    categories: Option<String>,
}

impl BundleSpecBuilder {
    /// Creates a new builder with every field unset.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the project source directory.
    pub fn source_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the icon file (PNG or SVG).
    pub fn icon_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.icon_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the executable to bundle.
    pub fn exec_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.exec_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the application name.
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// Sets the description written to the descriptor's `Comment` key.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the semicolon-delimited categories.
    pub fn categories(mut self, categories: impl Into<String>) -> Self {
        self.categories = Some(categories.into());
        self
    }

    /// Builds the spec. Unset fields become empty and are reported by the planner.
    pub fn build(self) -> BundleSpec {
        BundleSpec {
            source_dir: self.source_dir.unwrap_or_default(),
            icon_path: self.icon_path.filter(|p| !p.as_os_str().is_empty()),
            exec_path: self.exec_path.unwrap_or_default(),
            app_name: self.app_name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            categories: self.categories.unwrap_or_default(),
        }
    }
}

/// Location of the external packaging tools and the environment they run in.
///
/// Passed explicitly to [`crate::bundler::platform::linux::appimage::package`]
/// so nothing depends on the running program's location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolConfig {
    tools_dir: PathBuf,
    system_bin_dir: PathBuf,
    metadata_scanner: PathBuf,
    arch: Arch,
}

impl ToolConfig {
    /// Creates a configuration for tools stored in `tools_dir`.
    pub fn new<P: AsRef<Path>>(tools_dir: P) -> Self {
        Self {
            tools_dir: tools_dir.as_ref().to_path_buf(),
            system_bin_dir: PathBuf::from(DEFAULT_SYSTEM_BIN_DIR),
            metadata_scanner: PathBuf::from(DEFAULT_METADATA_SCANNER),
            arch: Arch::default(),
        }
    }

    /// Creates a configuration whose tools directory is `tools/` next to the
    /// running executable.
    pub fn for_current_exe() -> Result<Self> {
        let exe = std::env::current_exe()
            .map_err(Error::from)
            .context("locating the running executable")?;
        let dir = exe
            .parent()
            .context("running executable has no parent directory")?;
        Ok(Self::new(dir.join("tools")))
    }

    /// Replaces the tools directory.
    pub fn with_tools_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.tools_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Sets the architecture tag.
    pub fn with_arch(mut self, arch: Arch) -> Self {
        self.arch = arch;
        self
    }

    /// Sets the system binary directory placed first on `PATH`.
    pub fn with_system_bin_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.system_bin_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Sets the fixed location the metadata scanner must exist at.
    pub fn with_metadata_scanner<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.metadata_scanner = path.as_ref().to_path_buf();
        self
    }

    /// Returns the tools directory.
    pub fn tools_dir(&self) -> &Path {
        &self.tools_dir
    }

    /// Returns the system binary directory.
    pub fn system_bin_dir(&self) -> &Path {
        &self.system_bin_dir
    }

    /// Returns the metadata scanner location.
    pub fn metadata_scanner(&self) -> &Path {
        &self.metadata_scanner
    }

    /// Returns the architecture tag.
    pub fn arch(&self) -> Arch {
        self.arch
    }

    /// Returns the packaging tool file name, e.g. `appimagetool-x86_64.AppImage`.
    pub fn packaging_tool_name(&self) -> String {
        format!("appimagetool-{}.AppImage", self.arch.appimage_tag())
    }

    /// Returns the runtime helper file name, e.g. `runtime-x86_64`.
    pub fn runtime_name(&self) -> String {
        format!("runtime-{}", self.arch.appimage_tag())
    }

    /// Returns the full path of the packaging tool.
    pub fn packaging_tool_path(&self) -> PathBuf {
        self.tools_dir.join(self.packaging_tool_name())
    }

    /// Returns the full path of the runtime helper.
    pub fn runtime_path(&self) -> PathBuf {
        self.tools_dir.join(self.runtime_name())
    }

    /// Builds the packaging `PATH`: system bin dir, tools dir, then `inherited`.
    pub fn search_path(&self, inherited: Option<OsString>) -> Result<OsString> {
        let mut entries = vec![self.system_bin_dir.clone(), self.tools_dir.clone()];
        if let Some(inherited) = inherited {
            entries.extend(std::env::split_paths(&inherited));
        }
        std::env::join_paths(entries).map_err(|e| Error::InvalidInput {
            field: "tools_dir",
            reason: format!("cannot be placed on PATH: {e}"),
        })
    }
}
