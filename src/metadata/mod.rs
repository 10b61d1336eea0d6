//! Bundle metadata from an `appdir.toml` manifest.
//!
//! ```toml
//! [bundle]
//! source_dir = "."
//! exec_path = "target/release/myapp"
//! icon_path = "assets/logo.png"
//! app_name = "MyApp"
//! description = "Does things"
//! categories = "Utility;Development;"
//!
//! [tools]
//! dir = "tools"
//! arch = "x86_64"
//! ```
//!
//! Relative paths are resolved against the directory holding the manifest.

use crate::bundler::{Arch, BundleSpecBuilder, ToolConfig};
use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Parsed manifest file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// `[bundle]` table
    #[serde(default)]
    pub bundle: BundleTable,

    /// `[tools]` table
    #[serde(default)]
    pub tools: ToolsTable,
}

/// Bundle inputs; every key is optional so flags can fill the gaps
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundleTable {
    /// Project tree receiving the AppDir
    pub source_dir: Option<PathBuf>,
    /// Executable to bundle
    pub exec_path: Option<PathBuf>,
    /// Icon file
    pub icon_path: Option<PathBuf>,
    /// Application name
    pub app_name: Option<String>,
    /// Descriptor comment
    pub description: Option<String>,
    /// Semicolon-delimited categories
    pub categories: Option<String>,
}

/// Packaging tool location
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsTable {
    /// Directory holding appimagetool and the runtime helper
    pub dir: Option<PathBuf>,
    /// Architecture tag
    pub arch: Option<Arch>,
    /// Directory placed first on the tool's PATH
    pub system_bin_dir: Option<PathBuf>,
    /// Metadata scanner location
    pub metadata_scanner: Option<PathBuf>,
}

/// Load a manifest and resolve its relative paths
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;

    let mut manifest: Manifest =
        toml::from_str(&content).map_err(|source| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })?;

    let base = path.parent().unwrap_or(Path::new(""));
    manifest.resolve_paths(base);

    log::debug!("Loaded manifest {}", path.display());
    Ok(manifest)
}

fn resolve(base: &Path, slot: &mut Option<PathBuf>) {
    if let Some(p) = slot.as_mut()
        && p.is_relative()
        && !p.as_os_str().is_empty()
    {
        *p = base.join(&*p);
    }
}

impl Manifest {
    fn resolve_paths(&mut self, base: &Path) {
        resolve(base, &mut self.bundle.source_dir);
        resolve(base, &mut self.bundle.exec_path);
        resolve(base, &mut self.bundle.icon_path);
        resolve(base, &mut self.tools.dir);
        resolve(base, &mut self.tools.system_bin_dir);
        resolve(base, &mut self.tools.metadata_scanner);
    }

    /// Seed a spec builder with the `[bundle]` values
    pub fn bundle_builder(&self) -> BundleSpecBuilder {
        let b = &self.bundle;
        let mut builder = BundleSpecBuilder::new();
        if let Some(v) = &b.source_dir {
            builder = builder.source_dir(v);
        }
        if let Some(v) = &b.exec_path {
            builder = builder.exec_path(v);
        }
        if let Some(v) = &b.icon_path {
            builder = builder.icon_path(v);
        }
        if let Some(v) = &b.app_name {
            builder = builder.app_name(v);
        }
        if let Some(v) = &b.description {
            builder = builder.description(v);
        }
        if let Some(v) = &b.categories {
            builder = builder.categories(v);
        }
        builder
    }

    /// Apply the `[tools]` values on top of `tools`
    pub fn apply_tools(&self, mut tools: ToolConfig) -> ToolConfig {
        let t = &self.tools;
        if let Some(dir) = &t.dir {
            tools = tools.with_tools_dir(dir);
        }
        if let Some(arch) = t.arch {
            tools = tools.with_arch(arch);
        }
        if let Some(dir) = &t.system_bin_dir {
            tools = tools.with_system_bin_dir(dir);
        }
        if let Some(scanner) = &t.metadata_scanner {
            tools = tools.with_metadata_scanner(scanner);
        }
        tools
    }
}
