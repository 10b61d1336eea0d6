//! File system utilities for staging.
//!
//! Provides file operations with path-carrying errors, merge-style
//! directory copies that follow symlinks, and permission helpers.

use crate::bail;
use crate::bundler::error::{Error, ErrorExt, Result};
use std::{
    io::{self},
    path::Path,
};
use tokio::fs;

/// Mode applied to generated scripts and repaired tools.
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Mode applied to the generated desktop descriptor.
pub const DESCRIPTOR_MODE: u32 = 0o644;

/// Returns true if anything (including a dangling symlink) exists at `path`.
pub async fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).await.is_ok()
}

/// Makes a symbolic link to a file.
#[cfg(unix)]
async fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    fs::symlink(src, dst).await
}

/// Makes a symbolic link to a file.
#[cfg(windows)]
async fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    fs::symlink_file(src, dst).await
}

/// Creates a relative symbolic link at `link` pointing to `target`.
///
/// Fails with [`Error::Link`] if the link path is already taken or the
/// platform offers no symlink primitive.
pub async fn create_relative_symlink(target: &Path, link: &Path) -> Result<()> {
    let link_err = |error: io::Error| Error::Link {
        path: link.to_path_buf(),
        target: target.to_path_buf(),
        error,
    };

    if entry_exists(link).await {
        return Err(link_err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "link path already exists",
        )));
    }

    #[cfg(any(unix, windows))]
    {
        symlink_file(target, link).await.map_err(link_err)
    }

    #[cfg(not(any(unix, windows)))]
    {
        Err(link_err(io::Error::new(
            io::ErrorKind::Unsupported,
            "symbolic links are not supported on this platform",
        )))
    }
}

/// Sets the permission bits of `path`.
///
/// A no-op on platforms without Unix permission bits.
pub async fn set_mode(path: &Path, mode: u32) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
            .await
            .map_err(|error| Error::Permission {
                path: path.to_path_buf(),
                mode,
                error,
            })?;
    }
    #[cfg(not(unix))]
    {
        let _ = (path, mode);
    }
    Ok(())
}

/// Returns true if `path` has any execute bit set.
///
/// Always true on platforms without Unix permission bits.
pub async fn is_executable(path: &Path) -> Result<bool> {
    let metadata = fs::metadata(path)
        .await
        .fs_context("reading permissions of", path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        Ok(metadata.permissions().mode() & 0o111 != 0)
    }
    #[cfg(not(unix))]
    {
        Ok(metadata.is_file())
    }
}

/// Copies a regular file from one path to another.
///
/// The destination's parent must already exist. Errors name the destination.
pub async fn copy_file(from: &Path, to: &Path, context: &'static str) -> Result<u64> {
    fs::copy(from, to).await.copy_context(context, to)
}

/// Recursively copies a directory into `to`, merging with any directories
/// already present at the destination.
///
/// Existing files at the destination are overwritten. Symlinks are followed
/// and their targets copied; dangling links, link cycles and special files
/// fail the whole copy.
pub async fn copy_dir_merge(from: &Path, to: &Path) -> Result<()> {
    if !from.is_dir() {
        bail!("{} is not a directory", from.display());
    }

    for entry in walkdir::WalkDir::new(from).follow_links(true) {
        let entry = entry?;
        debug_assert!(entry.path().starts_with(from));
        let rel_path = entry.path().strip_prefix(from)?;
        let dest_path = to.join(rel_path);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest_path)
                .await
                .fs_context("creating directory", &dest_path)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &dest_path)
                .await
                .copy_context("copying source file to", &dest_path)?;
        } else {
            return Err(unsupported(entry.path()));
        }
    }

    Ok(())
}

/// FIFOs, sockets and device nodes are never opened.
fn unsupported(path: &Path) -> Error {
    Error::Fs {
        context: "copying source entry",
        path: path.to_path_buf(),
        error: io::Error::new(io::ErrorKind::Unsupported, "unsupported file type"),
    }
}

/// Copies one source entry to `to`, following symlinks.
///
/// Directories are merged and regular files overwritten. A dangling symlink
/// or a special file is an error.
pub async fn copy_entry(from: &Path, to: &Path) -> Result<()> {
    let metadata = match fs::metadata(from).await {
        Ok(metadata) => metadata,
        Err(error) if entry_exists(from).await => {
            return Err(Error::Fs {
                context: "resolving symlink",
                path: from.to_path_buf(),
                error,
            });
        }
        Err(error) => return Err(error).fs_context("reading metadata of", from),
    };

    if metadata.is_dir() {
        copy_dir_merge(from, to).await
    } else if metadata.is_file() {
        copy_file(from, to, "copying source file to").await.map(drop)
    } else {
        Err(unsupported(from))
    }
}
