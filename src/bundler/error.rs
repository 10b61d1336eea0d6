//! Error types for AppDir staging and packaging.
//!
//! Provides contextual error chaining, filesystem-specific errors that carry the
//! offending path, and the staging/packaging taxonomy surfaced to callers.
//!
//! # Features
//!
//! - **Context trait**: Add context to errors similar to anyhow
//! - **ErrorExt trait**: Filesystem operations with automatic path context
//! - **bail! macro**: Early return with formatted error messages
//!
//! # Example
//!
//! ```no_run
//! use appdir_bundler::bundler::error::{Context, ErrorExt, Result};
//! use std::path::Path;
//!
//! fn read_descriptor(path: &Path) -> Result<String> {
//!     let contents = std::fs::read_to_string(path)
//!         .fs_context("reading desktop descriptor", path)?;
//!
//!     contents
//!         .lines()
//!         .find(|line| line.starts_with("Name="))
//!         .map(|line| line["Name=".len()..].to_string())
//!         .context("descriptor has no Name key")
//! }
//! ```

use std::{
    fmt::Display,
    io,
    path::{self, PathBuf},
};
use thiserror::Error as DeriveError;

/// Errors returned by the bundler.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Error with context. Created by the [`Context`] trait.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// One or more required input fields are empty.
    #[error("missing required field(s): {}", .missing.join(", "))]
    Validation {
        /// Names of the empty fields, in declaration order
        missing: Vec<&'static str>,
    },

    /// An input field is present but unusable.
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Field name
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// The bundle directory is already present on disk.
    #[error("bundle directory {path} already exists; remove it before preparing again")]
    AlreadyExists {
        /// Path of the existing bundle root
        path: PathBuf,
    },

    /// Copying a file into the bundle failed.
    #[error("{context} {path}: {error}")]
    Copy {
        /// What was being copied (e.g., "copying icon to")
        context: &'static str,
        /// Destination path
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// Creating a symbolic link failed.
    #[error("failed to link {path} -> {target}: {error}")]
    Link {
        /// Path of the link itself
        path: PathBuf,
        /// Relative target the link should point to
        target: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// Changing permission bits failed.
    #[error("failed to set mode {mode:o} on {path}: {error}")]
    Permission {
        /// File whose mode could not be changed
        path: PathBuf,
        /// Requested mode
        mode: u32,
        /// The underlying I/O error
        error: io::Error,
    },

    /// A required external binary is absent.
    #[error("required tool(s) not found in {location}: {}", .tools.join(", "))]
    MissingTool {
        /// File names of the missing tools
        tools: Vec<String>,
        /// Directory (or full path) that was searched
        location: PathBuf,
    },

    /// The path handed to packaging is not a staged AppDir.
    #[error("{path} is not a prepared AppDir: {reason}")]
    InvalidBundle {
        /// Path that was checked
        path: PathBuf,
        /// What is missing
        reason: String,
    },

    /// The packaging tool exited unsuccessfully.
    #[error("{command} failed with exit code: {code:?}\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    Packaging {
        /// Command line that was run
        command: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
        /// Captured standard output
        stdout: String,
        /// Captured standard error
        stderr: String,
    },

    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {path}: {error}")]
    Fs {
        /// Context describing the operation (e.g., "reading source directory")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// Child process could not be spawned.
    #[error("failed to run command {command}: {error}")]
    CommandFailed {
        /// Command that failed to execute
        command: String,
        /// The underlying error
        error: io::Error,
    },

    /// Generic I/O error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// Error walking a source directory.
    #[error("{0}")]
    WalkdirError(#[from] walkdir::Error),

    /// Path prefix stripping error.
    #[error("{0}")]
    StripError(#[from] path::StripPrefixError),

    /// Handlebars template rendering error.
    #[error("{0}")]
    HandleBarsError(#[from] handlebars::RenderError),

    /// Handlebars template parsing error.
    #[error("{0}")]
    Template(#[from] handlebars::TemplateError),

    /// Generic error with custom message.
    #[error("{0}")]
    GenericError(String),
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for adding context to errors.
///
/// Similar to `anyhow::Context` but integrated with the bundler's Error type.
/// Works with both `Result<T, E>` and `Option<T>`.
pub trait Context<T> {
    /// Add context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Add context to an error using a closure (lazy evaluation).
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Extension trait for filesystem operations with automatic path context.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g., "reading file", "creating directory".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;

    /// Wrap an I/O error as a [`Error::Copy`] naming the destination.
    fn copy_context(self, context: &'static str, dest: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }

    fn copy_context(self, context: &'static str, dest: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Copy {
            context,
            path: dest.into(),
            error,
        })
    }
}

impl Error {
    /// Returns the filesystem path this error is about, when it carries one.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Error::Context(_, inner) => inner.path(),
            Error::AlreadyExists { path }
            | Error::Copy { path, .. }
            | Error::Link { path, .. }
            | Error::Permission { path, .. }
            | Error::InvalidBundle { path, .. }
            | Error::Fs { path, .. } => Some(path),
            Error::MissingTool { location, .. } => Some(location),
            _ => None,
        }
    }
}

/// Macro for early return with error.
///
/// Converts the message into a [`Error::GenericError`] and returns immediately.
///
/// # Examples
///
/// ```ignore
/// bail!("operation failed");
/// bail!("invalid value: {}", value);
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::error::Error::GenericError($msg.into()))
    };
    ($err:expr $(,)?) => {
        return Err($crate::bundler::error::Error::GenericError($err.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::error::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
