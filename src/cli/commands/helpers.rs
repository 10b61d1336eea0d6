//! Shared helper functions for command execution.

use crate::bundler::{BundleSpec, ToolConfig};
use crate::cli::OutputManager;
use crate::cli::args::{BundleArgs, MAIN_CATEGORIES, OutputArgs, ToolArgs};
use crate::error::{CliError, Result};
use crate::metadata::{Manifest, load_manifest};
use std::path::PathBuf;

/// Load the manifest named by `--manifest`, if any
pub(super) fn manifest_for(bundle: &BundleArgs) -> Result<Option<Manifest>> {
    bundle.manifest.as_deref().map(load_manifest).transpose()
}

/// Layer flags over manifest values
pub(super) fn resolve_spec(bundle: &BundleArgs, manifest: Option<&Manifest>) -> BundleSpec {
    let mut builder = manifest.map(Manifest::bundle_builder).unwrap_or_default();

    if let Some(v) = &bundle.source_dir {
        builder = builder.source_dir(v);
    }
    if let Some(v) = &bundle.exec_path {
        builder = builder.exec_path(v);
    }
    if let Some(v) = &bundle.icon_path {
        builder = builder.icon_path(v);
    }
    if let Some(v) = &bundle.app_name {
        builder = builder.app_name(v);
    }
    if let Some(v) = &bundle.description {
        builder = builder.description(v);
    }
    if let Some(v) = &bundle.categories {
        builder = builder.categories(v);
    }

    builder.build()
}

/// Tool configuration: flags, then manifest, then defaults next to the executable
pub(super) fn resolve_tools(tools: &ToolArgs, manifest: Option<&Manifest>) -> Result<ToolConfig> {
    let manifest_dir = manifest.and_then(|m| m.tools.dir.as_ref());
    let mut config = match tools.tools_dir.as_ref().or(manifest_dir) {
        Some(dir) => ToolConfig::new(dir),
        None => ToolConfig::for_current_exe()?,
    };

    if let Some(m) = manifest {
        config = m.apply_tools(config);
    }
    if let Some(dir) = &tools.tools_dir {
        config = config.with_tools_dir(dir);
    }
    if let Some(arch) = tools.arch {
        config = config.with_arch(arch);
    }
    if let Some(dir) = &tools.system_bin_dir {
        config = config.with_system_bin_dir(dir);
    }
    if let Some(scanner) = &tools.metadata_scanner {
        config = config.with_metadata_scanner(scanner);
    }

    log::debug!("Using tools in {}", config.tools_dir().display());
    Ok(config)
}

/// `--output`, or `{output_dir}/{app_name}.AppImage`
pub(super) fn resolve_output(output: &OutputArgs, spec: &BundleSpec) -> Result<PathBuf> {
    if let Some(file) = &output.output {
        if file.is_dir() {
            return Err(CliError::InvalidArguments {
                reason: format!(
                    "--output {} is a directory; use --output-dir instead",
                    file.display()
                ),
            }
            .into());
        }
        return Ok(file.clone());
    }

    let dir = output
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(dir.join(format!("{}.AppImage", spec.app_name())))
}

/// Packaging only needs enough of the spec to find the AppDir
pub(super) fn require_appdir_fields(spec: &BundleSpec) -> Result<()> {
    if spec.source_dir().as_os_str().is_empty() {
        return Err(CliError::MissingArgument {
            argument: "source-dir".to_string(),
        }
        .into());
    }
    if spec.app_name().trim().is_empty() {
        return Err(CliError::MissingArgument {
            argument: "app-name".to_string(),
        }
        .into());
    }
    Ok(())
}

/// Category tags outside the main category list
pub(super) fn unknown_categories(categories: &str) -> Vec<&str> {
    categories
        .split(';')
        .map(str::trim)
        .filter(|tag| !tag.is_empty() && !MAIN_CATEGORIES.contains(tag))
        .collect()
}

/// Warn (never fail) about unconventional category tags
pub(super) fn warn_unknown_categories(spec: &BundleSpec, output: &OutputManager) -> Result<()> {
    for tag in unknown_categories(spec.categories()) {
        output.warn(&format!(
            "Category '{tag}' is not one of the main categories ({})",
            MAIN_CATEGORIES.join(", ")
        ))?;
    }
    Ok(())
}
