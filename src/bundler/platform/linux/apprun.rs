//! AppRun entry script generation.

use super::template::APPRUN_TEMPLATE;
use crate::bundler::{
    error::{ErrorExt, Result},
    planner::BundleLayout,
    utils::fs::{EXECUTABLE_MODE, set_mode},
};
use handlebars::Handlebars;
use std::{collections::BTreeMap, path::PathBuf};

/// Renders the AppRun script for `exec_name`.
pub fn render_apprun(exec_name: &str) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);
    handlebars.register_template_string("AppRun", APPRUN_TEMPLATE)?;

    let mut data = BTreeMap::new();
    data.insert("exec_name", exec_name);

    Ok(handlebars.render("AppRun", &data)?)
}

/// Writes `root/AppRun` and marks it executable.
///
/// A failed mode change surfaces as [`crate::bundler::Error::Permission`].
pub async fn write_apprun(layout: &BundleLayout) -> Result<PathBuf> {
    let path = layout.apprun_path();
    let script = render_apprun(layout.exec_name())?;

    tokio::fs::write(&path, script)
        .await
        .fs_context("writing AppRun script", &path)?;
    set_mode(&path, EXECUTABLE_MODE).await?;

    log::debug!("Wrote {}", path.display());
    Ok(path)
}
