//! FreeDesktop.org desktop entry and icon placement.
//!
//! Produces the `[Desktop Entry]` descriptor and installs the application icon
//! at the two locations AppImage tooling looks for it.

use super::template::DESKTOP_TEMPLATE;
use crate::bundler::{
    error::{ErrorExt, Result},
    planner::BundleLayout,
    resources::icons::inspect_icon,
    settings::BundleSpec,
    utils::fs::{DESCRIPTOR_MODE, copy_file, set_mode},
};
use handlebars::Handlebars;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Renders the desktop descriptor. Values are inserted verbatim.
pub fn render_desktop_entry(spec: &BundleSpec) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);
    handlebars.register_template_string("desktop", DESKTOP_TEMPLATE)?;

    let mut data = BTreeMap::new();
    data.insert("app_name", spec.app_name());
    data.insert("categories", spec.categories());
    data.insert("description", spec.description());

    Ok(handlebars.render("desktop", &data)?)
}

/// Writes the descriptor to `usr/{app_name}.desktop` (mode 0644) and copies the
/// same bytes to `root/{app_name}.desktop`.
///
/// Returns both paths, `usr/` copy first.
pub async fn write_desktop_files(layout: &BundleLayout, spec: &BundleSpec) -> Result<[PathBuf; 2]> {
    let contents = render_desktop_entry(spec)?;

    let usr_path = layout.usr_desktop_path();
    tokio::fs::write(&usr_path, contents.as_bytes())
        .await
        .fs_context("writing desktop file", &usr_path)?;
    set_mode(&usr_path, DESCRIPTOR_MODE).await?;
    log::debug!("Wrote {}", usr_path.display());

    let root_path = layout.root_desktop_path();
    copy_file(&usr_path, &root_path, "copying desktop file to").await?;
    log::debug!("Wrote {}", root_path.display());

    Ok([usr_path, root_path])
}

/// Copies the icon to the AppDir root and to the 256x256 hicolor theme slot.
///
/// Both copies are independent files named `icon.png` regardless of the
/// source format. Each failure names the destination it could not write.
pub async fn install_icons(layout: &BundleLayout, icon: &Path) -> Result<[PathBuf; 2]> {
    inspect_icon(icon).await;

    let root_icon = layout.root_icon_path();
    copy_file(icon, &root_icon, "copying icon to").await?;
    log::debug!("Installed icon to {}", root_icon.display());

    let theme_icon = layout.theme_icon_path();
    copy_file(icon, &theme_icon, "copying icon to").await?;
    log::debug!("Installed icon to {}", theme_icon.display());

    Ok([root_icon, theme_icon])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::BundleSpecBuilder;

    #[test]
    fn descriptor_has_fixed_key_order() {
        let spec = BundleSpecBuilder::new()
            .app_name("Foo")
            .description("A test app")
            .categories("Utility;Development")
            .build();

        assert_eq!(
            render_desktop_entry(&spec).unwrap(),
            "[Desktop Entry]\nName=Foo\nExec=AppRun\nIcon=icon\nType=Application\n\
             Categories=Utility;Development\nComment=A test app\n"
        );
    }

    #[test]
    fn descriptor_values_are_not_escaped() {
        let spec = BundleSpecBuilder::new()
            .app_name("Tom & Jerry")
            .description("<b>cats</b> & \"mice\"")
            .categories("Game;")
            .build();

        let entry = render_desktop_entry(&spec).unwrap();
        assert!(entry.contains("Name=Tom & Jerry\n"));
        assert!(entry.contains("Comment=<b>cats</b> & \"mice\"\n"));
    }
}
