//! AppDir staging and orchestration.
//!
//! [`build`] materialises a [`BundleLayout`] on disk; [`Bundler`] ties
//! planning, staging and packaging together for callers that hold a single
//! [`BundleSpec`].
//!
//! # Overview
//!
//! Staging runs these steps in order, each awaited before the next:
//! 1. Create the root and the fixed `usr/` subdirectories
//! 2. Copy the executable to `usr/share/`
//! 3. Copy the icon to the root and to the hicolor theme slot
//! 4. Write `AppRun` (mode 0755)
//! 5. Link `usr/bin/{exec}` to `../share/{exec}`
//! 6. Copy the rest of the source tree into `usr/share/`, best effort
//! 7. Write the desktop descriptor to `usr/` and the root
//!
//! Every step except 6 fails fast. Nothing is rolled back.
//!
//! # Example
//!
//! ```no_run
//! use appdir_bundler::bundler::{Bundler, BundleSpecBuilder, ToolConfig};
//!
//! # async fn example() -> appdir_bundler::bundler::Result<()> {
//! let spec = BundleSpecBuilder::new()
//!     .source_dir("/home/me/project")
//!     .exec_path("/home/me/project/myapp")
//!     .icon_path("/home/me/project/logo.png")
//!     .app_name("MyApp")
//!     .description("Does things")
//!     .categories("Utility;")
//!     .build();
//!
//! let bundler = Bundler::new(spec);
//! let report = bundler.prepare().await?;
//! println!("{} of {} entries copied", report.source_copy.copied_count(), report.source_copy.attempted);
//!
//! let image = bundler
//!     .package("/home/me/MyApp.AppImage", &ToolConfig::for_current_exe()?)
//!     .await?;
//! println!("SHA256: {}", image.checksum);
//! # Ok(())
//! # }
//! ```

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    planner::{self, BundleLayout},
    platform::linux::{
        appimage,
        apprun::write_apprun,
        freedesktop::{install_icons, write_desktop_files},
    },
    report::{BuildReport, CopyFailure, PackagedImage, SourceCopyReport},
    settings::{BundleSpec, ToolConfig},
    utils::fs::{copy_entry, copy_file, create_relative_symlink},
};
use std::{io, path::Path};

/// Stages an AppDir according to `layout`.
///
/// The icon precondition is checked before anything is written.
///
/// # Errors
///
/// - [`Error::Validation`] naming `icon_path` when no icon was supplied
/// - [`Error::AlreadyExists`] if the root appeared since planning
/// - [`Error::Copy`], [`Error::Permission`], [`Error::Link`] from the
///   corresponding step
pub async fn build(layout: &BundleLayout, spec: &BundleSpec) -> Result<BuildReport> {
    let icon = require_icon(spec).await?;

    log::info!("Preparing AppDir {}", layout.root().display());

    create_structure(layout).await?;

    let exec_dest = layout.shared_exec_path();
    copy_file(spec.exec_path(), &exec_dest, "copying executable to").await?;
    log::debug!("Copied executable to {}", exec_dest.display());

    install_icons(layout, icon).await?;

    write_apprun(layout).await?;

    create_relative_symlink(&layout.bin_link_target(), &layout.bin_link_path()).await?;
    log::debug!(
        "Linked {} -> {}",
        layout.bin_link_path().display(),
        layout.bin_link_target().display()
    );

    let source_copy = copy_source_tree(spec.source_dir(), layout).await?;

    write_desktop_files(layout, spec).await?;

    log::info!("AppDir ready: {}", layout.root().display());

    Ok(BuildReport {
        layout: layout.clone(),
        source_copy,
    })
}

async fn require_icon(spec: &BundleSpec) -> Result<&Path> {
    let icon = spec.icon_path().ok_or_else(|| Error::Validation {
        missing: vec!["icon_path"],
    })?;

    match tokio::fs::metadata(icon).await {
        Ok(meta) if meta.is_file() => Ok(icon),
        Ok(_) => Err(Error::InvalidInput {
            field: "icon_path",
            reason: format!("{}: not a regular file", icon.display()),
        }),
        Err(e) => Err(Error::InvalidInput {
            field: "icon_path",
            reason: format!("{}: {e}", icon.display()),
        }),
    }
}

/// Creates the root exclusively, then the fixed subdirectories.
async fn create_structure(layout: &BundleLayout) -> Result<()> {
    let root = layout.root();
    tokio::fs::create_dir(root).await.map_err(|error| {
        if error.kind() == io::ErrorKind::AlreadyExists {
            Error::AlreadyExists {
                path: root.to_path_buf(),
            }
        } else {
            Error::Fs {
                context: "creating AppDir",
                path: root.to_path_buf(),
                error,
            }
        }
    })?;

    for dir in layout.fixed_dirs() {
        tokio::fs::create_dir_all(&dir)
            .await
            .fs_context("creating AppDir structure", &dir)?;
        log::debug!("Created {}", dir.display());
    }
    Ok(())
}

/// Copies every non-excluded top-level source entry into `usr/share/`.
///
/// Per-entry failures are collected, never propagated. Entries are visited in
/// name order so reports are reproducible.
async fn copy_source_tree(source_dir: &Path, layout: &BundleLayout) -> Result<SourceCopyReport> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(source_dir)
        .await
        .fs_context("reading source directory", source_dir)?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .fs_context("reading source directory", source_dir)?
    {
        names.push(entry.file_name());
    }
    names.sort();

    let share_dir = layout.share_dir();
    let mut report = SourceCopyReport::default();

    for name in names {
        let display = name.to_string_lossy().into_owned();
        if name.to_str().is_some_and(|n| layout.is_excluded(n)) {
            log::debug!("Skipping reserved entry {display}");
            continue;
        }

        report.attempted += 1;
        match copy_entry(&source_dir.join(&name), &share_dir.join(&name)).await {
            Ok(()) => {
                log::debug!("Copied {display} into {}", share_dir.display());
                report.copied.push(display);
            }
            Err(error) => {
                log::warn!("Could not copy {display}: {error}");
                report.failures.push(CopyFailure {
                    entry: display,
                    error,
                });
            }
        }
    }

    Ok(report)
}

/// Plans, stages and packages a single bundle.
#[derive(Debug, Clone)]
pub struct Bundler {
    spec: BundleSpec,
}

impl Bundler {
    /// Creates a bundler for `spec`.
    pub fn new(spec: BundleSpec) -> Self {
        Self { spec }
    }

    /// Returns the spec this bundler works on.
    pub fn spec(&self) -> &BundleSpec {
        &self.spec
    }

    /// Validates the spec and derives its layout without writing anything.
    pub fn plan(&self) -> Result<BundleLayout> {
        planner::plan(&self.spec)
    }

    /// Plans and stages the AppDir.
    pub async fn prepare(&self) -> Result<BuildReport> {
        let layout = self.plan()?;
        build(&layout, &self.spec).await
    }

    /// Packages the previously prepared AppDir into `output`.
    pub async fn package(&self, output: impl AsRef<Path>, tools: &ToolConfig) -> Result<PackagedImage> {
        appimage::package(&self.spec.appdir_path(), output.as_ref(), tools).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::BundleSpecBuilder;

    fn project() -> (tempfile::TempDir, BundleSpecBuilder) {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path();
        std::fs::write(src.join("myapp"), b"\x7fELF binary").unwrap();
        std::fs::write(src.join("logo.png"), b"png bytes").unwrap();
        let builder = BundleSpecBuilder::new()
            .source_dir(src)
            .exec_path(src.join("myapp"))
            .icon_path(src.join("logo.png"))
            .app_name("Foo")
            .description("A test app")
            .categories("Utility;");
        (tmp, builder)
    }

    #[tokio::test]
    async fn missing_icon_fails_before_any_write() {
        let (tmp, builder) = project();
        let spec = builder.icon_path("").build();
        let layout = planner::plan(&spec).unwrap();

        let err = build(&layout, &spec).await.unwrap_err();
        match err {
            Error::Validation { missing } => assert_eq!(missing, vec!["icon_path"]),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!tmp.path().join("Foo.AppDir").exists());
    }

    #[tokio::test]
    async fn root_created_after_planning_is_reported() {
        let (tmp, builder) = project();
        let spec = builder.build();
        let layout = planner::plan(&spec).unwrap();
        std::fs::create_dir(tmp.path().join("Foo.AppDir")).unwrap();

        let err = build(&layout, &spec).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn source_copy_skips_reserved_names() {
        let (tmp, builder) = project();
        let src = tmp.path();
        std::fs::write(src.join("icono.png"), b"window icon").unwrap();
        std::fs::write(src.join("AppRun"), b"stale").unwrap();
        std::fs::write(src.join("Foo.desktop"), b"stale").unwrap();
        std::fs::write(src.join("README"), b"hi").unwrap();

        let report = Bundler::new(builder.build()).prepare().await.unwrap();
        let share = src.join("Foo.AppDir/usr/share");

        // logo.png and README
        assert_eq!(report.source_copy.attempted, 2);
        assert_eq!(report.source_copy.copied, vec!["README", "logo.png"]);
        assert!(!share.join("icono.png").exists());
        assert!(!share.join("AppRun").exists());
        assert!(!share.join("Foo.desktop").exists());
        assert_eq!(std::fs::read(share.join("myapp")).unwrap(), b"\x7fELF binary");
    }
}
