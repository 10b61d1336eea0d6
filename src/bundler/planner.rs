//! Bundle planning: input validation and layout derivation.
//!
//! [`plan`] turns a [`BundleSpec`] into a [`BundleLayout`] without touching
//! the filesystem beyond metadata reads. Every path the builder writes is
//! derived here, so the layout is the single source of truth for the AppDir
//! shape:
//!
//! ```text
//! {app_name}.AppDir/
//!   AppRun
//!   icon.png
//!   {app_name}.desktop
//!   usr/
//!     bin/{exec_name}  -> ../share/{exec_name}
//!     share/{exec_name}
//!     share/icons/hicolor/256x256/apps/icon.png
//!     {app_name}.desktop
//! ```

use crate::bundler::{
    error::{Error, Result},
    settings::{APPRUN_NAME, BundleSpec, ICON_FILE_NAME, RESERVED_ICON_NAME},
};
use std::path::{Path, PathBuf};

/// Icon theme directory relative to `usr/share`.
const ICON_THEME_SUBDIR: &str = "icons/hicolor/256x256/apps";

/// Characters that would change how the AppRun script parses the exec line.
const SHELL_UNSAFE: &[char] = &[
    '"', '\'', '`', '$', ';', '&', '|', '<', '>', '(', ')', '*', '?', '[', ']', '\\',
];

/// Canonical on-disk layout of one AppDir.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleLayout {
    root: PathBuf,
    exec_name: String,
    app_name: String,
}

impl BundleLayout {
    /// Bundle root, `{source_dir}/{app_name}.AppDir`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Final path segment of the executable.
    pub fn exec_name(&self) -> &str {
        &self.exec_name
    }

    /// Application name the layout was derived from.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Bundle directory name, `{app_name}.AppDir`.
    pub fn appdir_name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// `root/usr`
    pub fn usr_dir(&self) -> PathBuf {
        self.root.join("usr")
    }

    /// `root/usr/bin`
    pub fn bin_dir(&self) -> PathBuf {
        self.usr_dir().join("bin")
    }

    /// `root/usr/share`
    pub fn share_dir(&self) -> PathBuf {
        self.usr_dir().join("share")
    }

    /// `root/usr/share/icons/hicolor/256x256/apps`
    pub fn icon_theme_dir(&self) -> PathBuf {
        self.share_dir().join(ICON_THEME_SUBDIR)
    }

    /// Fixed subdirectories created before anything is copied.
    pub fn fixed_dirs(&self) -> [PathBuf; 3] {
        [self.bin_dir(), self.share_dir(), self.icon_theme_dir()]
    }

    /// `root/usr/share/{exec_name}`, the copied executable.
    pub fn shared_exec_path(&self) -> PathBuf {
        self.share_dir().join(&self.exec_name)
    }

    /// `root/usr/bin/{exec_name}`, the symlink entry point.
    pub fn bin_link_path(&self) -> PathBuf {
        self.bin_dir().join(&self.exec_name)
    }

    /// Relative target of the `usr/bin` symlink, `../share/{exec_name}`.
    pub fn bin_link_target(&self) -> PathBuf {
        Path::new("..").join("share").join(&self.exec_name)
    }

    /// `root/AppRun`
    pub fn apprun_path(&self) -> PathBuf {
        self.root.join(APPRUN_NAME)
    }

    /// `root/icon.png`
    pub fn root_icon_path(&self) -> PathBuf {
        self.root.join(ICON_FILE_NAME)
    }

    /// `root/usr/share/icons/hicolor/256x256/apps/icon.png`
    pub fn theme_icon_path(&self) -> PathBuf {
        self.icon_theme_dir().join(ICON_FILE_NAME)
    }

    /// Descriptor file name, `{app_name}.desktop`.
    pub fn desktop_file_name(&self) -> String {
        format!("{}.desktop", self.app_name)
    }

    /// `root/usr/{app_name}.desktop`
    pub fn usr_desktop_path(&self) -> PathBuf {
        self.usr_dir().join(self.desktop_file_name())
    }

    /// `root/{app_name}.desktop`
    pub fn root_desktop_path(&self) -> PathBuf {
        self.root.join(self.desktop_file_name())
    }

    /// Top-level source entries the bulk copy skips.
    pub fn excluded_names(&self) -> [String; 5] {
        [
            self.exec_name.clone(),
            APPRUN_NAME.to_string(),
            self.desktop_file_name(),
            self.appdir_name(),
            RESERVED_ICON_NAME.to_string(),
        ]
    }

    /// Returns true if a top-level source entry named `name` must not be copied.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded_names().iter().any(|n| n == name)
    }
}

/// Validates `spec` and computes its layout.
///
/// # Errors
///
/// - [`Error::Validation`] naming every empty required field
/// - [`Error::InvalidInput`] for unusable names or missing source paths
/// - [`Error::AlreadyExists`] if the bundle root is already present
pub fn plan(spec: &BundleSpec) -> Result<BundleLayout> {
    let mut missing = Vec::new();
    if spec.source_dir().as_os_str().is_empty() {
        missing.push("source_dir");
    }
    if spec.exec_path().as_os_str().is_empty() {
        missing.push("exec_path");
    }
    if spec.app_name().trim().is_empty() {
        missing.push("app_name");
    }
    if spec.description().trim().is_empty() {
        missing.push("description");
    }
    if spec.categories().trim().is_empty() {
        missing.push("categories");
    }
    if !missing.is_empty() {
        return Err(Error::Validation { missing });
    }

    validate_app_name(spec.app_name())?;
    validate_single_line("description", spec.description())?;
    validate_single_line("categories", spec.categories())?;

    match std::fs::metadata(spec.source_dir()) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(invalid("source_dir", spec.source_dir(), "not a directory")),
        Err(e) => return Err(invalid("source_dir", spec.source_dir(), &e.to_string())),
    }
    if let Err(e) = std::fs::read_dir(spec.source_dir()) {
        return Err(invalid("source_dir", spec.source_dir(), &e.to_string()));
    }

    match std::fs::metadata(spec.exec_path()) {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return Err(invalid("exec_path", spec.exec_path(), "not a regular file")),
        Err(e) => return Err(invalid("exec_path", spec.exec_path(), &e.to_string())),
    }
    let exec_name = exec_name_of(spec.exec_path())?;

    let root = spec.appdir_path();
    if std::fs::symlink_metadata(&root).is_ok() {
        return Err(Error::AlreadyExists { path: root });
    }

    log::debug!("Planned AppDir at {} for {}", root.display(), exec_name);

    Ok(BundleLayout {
        root,
        exec_name,
        app_name: spec.app_name().to_string(),
    })
}

/// Rejects names that cannot serve as a single path segment or INI value.
fn validate_app_name(name: &str) -> Result<()> {
    let reason = if name.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if name == "." || name == ".." {
        Some("must not be a relative directory reference")
    } else if name.chars().any(char::is_control) {
        Some("must not contain control characters")
    } else if name != name.trim() {
        Some("must not start or end with whitespace")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidInput {
            field: "app_name",
            reason: format!("'{}' {reason}", name.escape_debug()),
        }),
        None => Ok(()),
    }
}

/// Descriptor values are written verbatim, so a line break would inject keys.
fn validate_single_line(field: &'static str, value: &str) -> Result<()> {
    if value.contains(['\n', '\r']) {
        return Err(Error::InvalidInput {
            field,
            reason: "must be a single line".to_string(),
        });
    }
    Ok(())
}

fn exec_name_of(exec_path: &Path) -> Result<String> {
    let name = exec_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| invalid("exec_path", exec_path, "file name is not valid UTF-8"))?;

    if name.chars().any(|c| c.is_whitespace() || c.is_control() || SHELL_UNSAFE.contains(&c)) {
        return Err(invalid(
            "exec_path",
            exec_path,
            "file name contains characters that would break the AppRun script",
        ));
    }
    Ok(name.to_string())
}

fn invalid(field: &'static str, path: &Path, reason: &str) -> Error {
    Error::InvalidInput {
        field,
        reason: format!("{}: {reason}", path.display()),
    }
}
