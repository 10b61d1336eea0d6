//! `prepare`: plan and stage the AppDir.

use super::helpers::{manifest_for, resolve_spec, warn_unknown_categories};
use crate::bundler::{BuildReport, Bundler, builder};
use crate::cli::OutputManager;
use crate::cli::args::PrepareArgs;
use crate::error::Result;
use serde_json::json;

/// Stage the AppDir for `bundler` and print the outcome
pub(super) async fn stage(bundler: &Bundler, output: &OutputManager) -> Result<BuildReport> {
    output.section("Preparing AppDir")?;
    warn_unknown_categories(bundler.spec(), output)?;

    let layout = bundler.plan()?;
    output.progress(&format!("Staging {}", layout.root().display()))?;

    let report = builder::build(&layout, bundler.spec()).await?;

    output.verbose(&format!("AppRun: {}", layout.apprun_path().display()))?;
    output.verbose(&format!(
        "Executable: {} -> {}",
        layout.bin_link_path().display(),
        layout.bin_link_target().display()
    ))?;
    output.verbose(&format!("Desktop file: {}", layout.usr_desktop_path().display()))?;
    output.verbose(&format!("Icon: {}", layout.theme_icon_path().display()))?;

    output.source_copy_summary(&report.source_copy)?;
    output.success(&format!("AppDir ready: {}", layout.root().display()))?;

    Ok(report)
}

/// JSON view of a staging run
pub(super) fn report_json(report: &BuildReport) -> serde_json::Value {
    let copy = &report.source_copy;
    json!({
        "appdir": report.root().display().to_string(),
        "attempted": copy.attempted,
        "copied": copy.copied,
        "failures": copy
            .failures
            .iter()
            .map(|f| json!({ "entry": f.entry, "error": f.error.to_string() }))
            .collect::<Vec<_>>(),
    })
}

/// Execute the prepare command
pub(super) async fn execute_prepare(
    args: &PrepareArgs,
    output: &OutputManager,
    json: bool,
) -> Result<i32> {
    let manifest = manifest_for(&args.bundle)?;
    let bundler = Bundler::new(resolve_spec(&args.bundle, manifest.as_ref()));

    let report = stage(&bundler, output).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "prepare": report_json(&report) }))?
        );
    }
    Ok(0)
}
