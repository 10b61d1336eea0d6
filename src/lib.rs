//! # appdir_bundler
//!
//! Assembles AppDir bundles from a project tree and packages them as
//! single-file AppImages.
//!
//! ## Features
//!
//! - **Validated planning**: every missing input is reported at once, before
//!   anything is written
//! - **Deterministic layout**: fixed directory structure, generated `AppRun`
//!   and desktop entry, relative executable symlink
//! - **Best-effort asset copy**: the rest of the source tree is merged into
//!   `usr/share` with a per-entry failure report
//! - **Packaging**: runs `appimagetool` with an explicit tool configuration and
//!   reports the image size and SHA-256
//!
//! ## Usage
//!
//! ```bash
//! appdir_bundler prepare --source-dir . --exec-path ./myapp --icon-path logo.png \
//!     --app-name MyApp --description "Does things" --categories "Utility;"
//! appdir_bundler package --source-dir . --app-name MyApp --output-dir dist
//! appdir_bundler build --manifest appdir.toml
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

pub use bundler::{BuildReport, BundleLayout, BundleSpec, BundleSpecBuilder, Bundler, ToolConfig};
pub use cli::Args;
pub use error::{AppDirError, CliError, ConfigError, Result};
