//! Error types for the appdir_bundler command line application.
//!
//! Wraps the library's [`crate::bundler::Error`] together with CLI and
//! manifest errors, and attaches actionable recovery suggestions.

use crate::bundler::Error as BundlerError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for application operations
pub type Result<T> = std::result::Result<T, AppDirError>;

/// Main error type for the command line application
#[derive(Error, Debug)]
pub enum AppDirError {
    /// Staging or packaging errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] BundlerError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// Manifest errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Manifest file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Manifest could not be read
    #[error("Failed to read manifest {path}: {source}")]
    ReadFailed {
        /// Manifest path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Manifest is not valid TOML or has unexpected keys
    #[error("Failed to parse manifest {path}: {source}")]
    ParseFailed {
        /// Manifest path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },
}

impl AppDirError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            AppDirError::Bundler(err) => bundler_suggestions(err),
            AppDirError::Config(ConfigError::ParseFailed { .. }) => vec![
                "Check the manifest has a [bundle] table with source_dir, exec_path, icon_path, app_name, description and categories".to_string(),
                "Optional tool settings belong in a [tools] table".to_string(),
            ],
            AppDirError::Config(ConfigError::ReadFailed { path, .. }) => {
                vec![format!("Verify {} exists and is readable", path.display())]
            }
            AppDirError::Cli(CliError::MissingArgument { argument }) => vec![
                format!("Pass --{argument} or set it in the manifest's [bundle] table"),
                "Run with --help to list every option".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            AppDirError::Bundler(
                BundlerError::Packaging { .. } | BundlerError::CommandFailed { .. }
            )
        )
    }
}

fn bundler_suggestions(err: &BundlerError) -> Vec<String> {
    match err {
        BundlerError::Context(_, inner) => bundler_suggestions(inner),
        BundlerError::AlreadyExists { path } => vec![
            format!("Remove the existing AppDir: rm -rf '{}'", path.display()),
            "Or choose a different --app-name".to_string(),
        ],
        BundlerError::Validation { missing } => missing
            .iter()
            .map(|field| format!("Provide --{}", field.replace('_', "-")))
            .collect(),
        BundlerError::MissingTool { tools, location } => {
            if tools.iter().any(|t| t == "appstreamcli") {
                vec![
                    "Install the appstream package (e.g. sudo apt install appstream)".to_string(),
                ]
            } else {
                vec![
                    format!("Place {} in {}", tools.join(" and "), location.display()),
                    "Or point --tools-dir at the directory that holds them".to_string(),
                ]
            }
        }
        BundlerError::InvalidBundle { .. } => {
            vec!["Run the prepare command first to stage the AppDir".to_string()]
        }
        BundlerError::Permission { path, .. } => vec![format!(
            "Check that you own {} and the filesystem is not mounted read-only",
            path.display()
        )],
        BundlerError::Packaging { .. } => vec![
            "Read the tool output above; appimagetool usually names the offending file".to_string(),
            "Validate the desktop file with desktop-file-validate".to_string(),
        ],
        _ => vec!["Check the error message above for specific details".to_string()],
    }
}
