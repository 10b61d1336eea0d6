//! `package`: run appimagetool over a prepared AppDir.

use super::helpers::{
    manifest_for, require_appdir_fields, resolve_output, resolve_spec, resolve_tools,
};
use crate::bundler::{Bundler, PackagedImage, ToolConfig};
use crate::cli::OutputManager;
use crate::cli::args::PackageArgs;
use crate::error::Result;
use serde_json::json;
use std::path::Path;

/// Package the AppDir of `bundler` into `image_path` and print the outcome
pub(super) async fn pack(
    bundler: &Bundler,
    tools: &ToolConfig,
    image_path: &Path,
    output: &OutputManager,
) -> Result<PackagedImage> {
    output.section("Packaging AppImage")?;
    output.progress(&format!(
        "Running {} on {}",
        tools.packaging_tool_name(),
        bundler.spec().appdir_path().display()
    ))?;

    let image = bundler.package(image_path, tools).await?;

    for line in image.stdout.lines().chain(image.stderr.lines()) {
        output.verbose(line)?;
    }
    output.success(&format!("Created AppImage: {}", image.path.display()))?;
    output.indent(&format!("Size: {} bytes", image.size))?;
    output.indent(&format!("SHA256: {}", image.checksum))?;

    Ok(image)
}

/// JSON view of a packaged image
pub(super) fn image_json(image: &PackagedImage) -> serde_json::Value {
    json!({
        "path": image.path.display().to_string(),
        "size": image.size,
        "sha256": image.checksum,
    })
}

/// Execute the package command
pub(super) async fn execute_package(
    args: &PackageArgs,
    output: &OutputManager,
    json: bool,
) -> Result<i32> {
    let manifest = manifest_for(&args.bundle)?;
    let spec = resolve_spec(&args.bundle, manifest.as_ref());
    require_appdir_fields(&spec)?;

    let tools = resolve_tools(&args.tools, manifest.as_ref())?;
    let image_path = resolve_output(&args.output, &spec)?;
    let bundler = Bundler::new(spec);

    let image = pack(&bundler, &tools, &image_path, output).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "package": image_json(&image) }))?
        );
    }
    Ok(0)
}
