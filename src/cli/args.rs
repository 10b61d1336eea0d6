//! Command line argument parsing.
//!
//! Bundle inputs can come from flags, `APPDIR_*` environment variables or an
//! `appdir.toml` manifest. Flags and environment variables override the
//! manifest.

use crate::bundler::Arch;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Main categories a desktop entry is expected to carry one of.
pub const MAIN_CATEGORIES: &[&str] = &[
    "Audio",
    "Video",
    "Development",
    "Education",
    "Game",
    "Graphics",
    "Network",
    "Office",
    "Science",
    "Settings",
    "System",
    "Utility",
];

const CATEGORIES_HELP: &str = "Semicolon-delimited desktop categories, written verbatim.

Main categories: Audio, Video, Development, Education, Game, Graphics,
Network, Office, Science, Settings, System, Utility.

Example: --categories 'Utility;Development;'";

/// Stage AppDir bundles and package them as AppImages
#[derive(Parser, Debug)]
#[command(
    name = "appdir_bundler",
    version,
    about = "Stage AppDir bundles and package them as AppImages",
    long_about = "Assemble a self-contained AppDir from a project tree, executable, icon and
metadata, then hand it to appimagetool to produce a single-file AppImage.

Usage:
  appdir_bundler prepare --source-dir . --exec-path ./myapp --icon-path logo.png \\
      --app-name MyApp --description 'Does things' --categories 'Utility;'
  appdir_bundler package --source-dir . --app-name MyApp --output-dir dist
  appdir_bundler build --manifest appdir.toml"
)]
pub struct Args {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Show every staged path
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress status output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print a JSON summary on stdout instead of status lines
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stage the AppDir inside the source directory
    Prepare(PrepareArgs),

    /// Package a previously prepared AppDir
    Package(PackageArgs),

    /// Prepare, then package
    Build(PackageArgs),
}

/// Arguments for `prepare`
#[derive(clap::Args, Debug, Clone)]
pub struct PrepareArgs {
    /// Bundle inputs
    #[command(flatten)]
    pub bundle: BundleArgs,
}

/// Arguments for `package` and `build`
#[derive(clap::Args, Debug, Clone)]
pub struct PackageArgs {
    /// Bundle inputs
    #[command(flatten)]
    pub bundle: BundleArgs,

    /// Packaging tool location
    #[command(flatten)]
    pub tools: ToolArgs,

    /// Output image location
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Bundle inputs
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BundleArgs {
    /// Manifest file with [bundle] and [tools] tables
    #[arg(long, env = "APPDIR_MANIFEST", value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Project tree that receives the AppDir
    #[arg(long, env = "APPDIR_SOURCE_DIR", value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// Executable to bundle
    #[arg(long, env = "APPDIR_EXEC_PATH", value_name = "FILE")]
    pub exec_path: Option<PathBuf>,

    /// Icon (PNG, ideally 256x256, or SVG)
    #[arg(long, env = "APPDIR_ICON_PATH", value_name = "FILE")]
    pub icon_path: Option<PathBuf>,

    /// Application name; also the AppDir and desktop file stem
    #[arg(long, env = "APPDIR_APP_NAME", value_name = "NAME")]
    pub app_name: Option<String>,

    /// Description written to the desktop file's Comment key
    #[arg(long, env = "APPDIR_DESCRIPTION", value_name = "TEXT")]
    pub description: Option<String>,

    /// Semicolon-delimited desktop categories
    #[arg(long, env = "APPDIR_CATEGORIES", value_name = "LIST", long_help = CATEGORIES_HELP)]
    pub categories: Option<String>,
}

/// Packaging tool location
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ToolArgs {
    /// Directory holding appimagetool-<arch>.AppImage and runtime-<arch>
    /// [default: tools/ next to this executable]
    #[arg(long, env = "APPDIR_TOOLS_DIR", value_name = "DIR")]
    pub tools_dir: Option<PathBuf>,

    /// Target architecture (x86_64, i686, aarch64, armhf)
    #[arg(long, env = "APPDIR_ARCH", value_name = "ARCH")]
    pub arch: Option<Arch>,

    /// Directory placed first on the packaging tool's PATH [default: /usr/bin]
    #[arg(long, value_name = "DIR")]
    pub system_bin_dir: Option<PathBuf>,

    /// Location the metadata scanner must exist at [default: /usr/bin/appstreamcli]
    #[arg(long, value_name = "FILE")]
    pub metadata_scanner: Option<PathBuf>,
}

/// Output image location
#[derive(clap::Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output image file
    #[arg(short, long, value_name = "FILE", conflicts_with = "output_dir")]
    pub output: Option<PathBuf>,

    /// Directory for {app_name}.AppImage [default: current directory]
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn build_accepts_tool_and_output_flags() {
        let args = Args::try_parse_from([
            "appdir_bundler",
            "build",
            "--app-name",
            "Foo",
            "--arch",
            "arm64",
            "--output-dir",
            "dist",
        ])
        .unwrap();

        match args.command {
            Command::Build(pkg) => {
                assert_eq!(pkg.bundle.app_name.as_deref(), Some("Foo"));
                assert_eq!(pkg.tools.arch, Some(Arch::AArch64));
                assert_eq!(pkg.output.output_dir, Some(PathBuf::from("dist")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn output_and_output_dir_conflict() {
        let res = Args::try_parse_from([
            "appdir_bundler",
            "package",
            "--output",
            "a.AppImage",
            "--output-dir",
            "dist",
        ]);
        assert!(res.is_err());
    }
}
