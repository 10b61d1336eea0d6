//! AppDir staging and AppImage packaging.
//!
//! Turns a loose project tree (executable, icon, metadata) into a
//! self-contained AppDir and hands it to `appimagetool` to produce a single
//! portable image.
//!
//! # Pipeline
//!
//! | Stage | Entry point | Writes to disk |
//! |-------|-------------|----------------|
//! | Plan | [`planner::plan`] | no |
//! | Stage | [`builder::build`] | `{source}/{app}.AppDir` |
//! | Package | [`platform::linux::appimage::package`] | output image |
//!
//! [`Bundler`] runs the three stages for one [`BundleSpec`].
//!
//! # Example
//!
//! ```no_run
//! use appdir_bundler::bundler::{builder, planner, BundleSpecBuilder};
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
//! let layout = planner::plan(&spec)?;
//! let report = builder::build(&layout, &spec).await?;
//! assert!(report.source_copy.is_complete());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod builder;
mod checksum;
pub mod error;
pub mod planner;
pub mod platform;
pub mod report;
mod resources;
pub mod settings;
pub(crate) mod utils;

// Public re-exports
pub use builder::Bundler;
pub use error::{Error, Result};
pub use planner::BundleLayout;
pub use report::{BuildReport, CopyFailure, PackagedImage, SourceCopyReport};
pub use settings::{Arch, BundleSpec, BundleSpecBuilder, ToolConfig};
