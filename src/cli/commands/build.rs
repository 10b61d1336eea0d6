//! `build`: prepare, then package.

use super::helpers::{manifest_for, resolve_output, resolve_spec, resolve_tools};
use super::{package, prepare};
use crate::bundler::Bundler;
use crate::cli::OutputManager;
use crate::cli::args::PackageArgs;
use crate::error::Result;
use serde_json::json;

/// Execute the build command
///
/// Tool and output settings are resolved before anything is staged.
pub(super) async fn execute_build(
    args: &PackageArgs,
    output: &OutputManager,
    json: bool,
) -> Result<i32> {
    let manifest = manifest_for(&args.bundle)?;
    let spec = resolve_spec(&args.bundle, manifest.as_ref());
    let tools = resolve_tools(&args.tools, manifest.as_ref())?;
    let image_path = resolve_output(&args.output, &spec)?;
    let bundler = Bundler::new(spec);

    let report = prepare::stage(&bundler, output).await?;
    let image = package::pack(&bundler, &tools, &image_path, output).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "prepare": prepare::report_json(&report),
                "package": package::image_json(&image),
            }))?
        );
    }
    Ok(0)
}
