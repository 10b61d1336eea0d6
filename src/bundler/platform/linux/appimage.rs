//! AppImage packaging - hands a staged AppDir to appimagetool.
//!
//! The packaging tool and its runtime helper are not downloaded; they must
//! already sit in the configured tools directory. The tool itself shells out
//! to the system metadata scanner, so that is checked up front too.

use crate::bundler::{
    checksum::calculate_sha256,
    error::{Error, ErrorExt, Result},
    report::PackagedImage,
    settings::{APPRUN_NAME, ToolConfig},
    utils::fs::{EXECUTABLE_MODE, entry_exists, is_executable, set_mode},
};
use std::io;
use std::path::{Path, PathBuf};

/// Bundle a staged AppDir as an AppImage.
///
/// # Process
///
/// 1. Verifies the AppDir root and its `AppRun`
/// 2. Verifies the packaging tool and runtime helper, repairing missing
///    execute bits
/// 3. Verifies the metadata scanner
/// 4. Runs `appimagetool-<arch>.AppImage <appdir> <output>` with `PATH` and
///    `ARCH` set, waiting for it to exit
/// 5. Measures and hashes the produced image
///
/// # Returns
///
/// The produced image with its size, checksum and the tool's captured output.
pub async fn package(appdir: &Path, output: &Path, tools: &ToolConfig) -> Result<PackagedImage> {
    verify_appdir(appdir).await?;
    let tool = prepare_tools(tools).await?;
    check_metadata_scanner(tools).await?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating output directory", parent)?;
    }

    let arch = tools.arch().appimage_tag();
    let search_path = tools.search_path(std::env::var_os("PATH"))?;
    let command = format!(
        "{} {} {}",
        tool.display(),
        appdir.display(),
        output.display()
    );

    log::info!("Building AppImage from {}", appdir.display());
    log::debug!("Running {} (ARCH={})", command, arch);

    let result = tokio::process::Command::new(&tool)
        .arg(appdir)
        .arg(output)
        .env("PATH", &search_path)
        .env("ARCH", arch)
        .output()
        .await
        .map_err(|error| Error::CommandFailed {
            command: command.clone(),
            error,
        })?;

    let stdout = String::from_utf8_lossy(&result.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&result.stderr).into_owned();

    if !result.status.success() {
        return Err(Error::Packaging {
            command,
            code: result.status.code(),
            stdout,
            stderr,
        });
    }

    let size = tokio::fs::metadata(output)
        .await
        .fs_context("reading packaged image", output)?
        .len();
    let checksum = calculate_sha256(output).await?;

    log::info!("✓ Created AppImage: {}", output.display());

    Ok(PackagedImage {
        path: output.to_path_buf(),
        size,
        checksum,
        stdout,
        stderr,
    })
}

/// Checks that `appdir` is a directory containing `AppRun`.
pub async fn verify_appdir(appdir: &Path) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidBundle {
        path: appdir.to_path_buf(),
        reason: reason.to_string(),
    };

    match tokio::fs::metadata(appdir).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(invalid("not a directory")),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(invalid(&format!("directory does not exist ({e})")));
        }
        Err(e) => return Err(invalid(&format!("cannot be inspected: {e}"))),
    }
    if !entry_exists(&appdir.join(APPRUN_NAME)).await {
        return Err(invalid("AppRun is missing"));
    }
    Ok(())
}

/// Ensures the packaging tool and runtime helper are present and executable.
///
/// Every absent file is reported in one [`Error::MissingTool`]. Files without
/// an execute bit are set to 0755. Returns the packaging tool path.
pub async fn prepare_tools(tools: &ToolConfig) -> Result<PathBuf> {
    let required = [tools.packaging_tool_path(), tools.runtime_path()];

    let mut missing = Vec::new();
    for path in &required {
        if !tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file()) {
            missing.push(
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );
        }
    }
    if !missing.is_empty() {
        return Err(Error::MissingTool {
            tools: missing,
            location: tools.tools_dir().to_path_buf(),
        });
    }

    for path in &required {
        if !is_executable(path).await? {
            log::warn!("{} is not executable, setting mode 0755", path.display());
            set_mode(path, EXECUTABLE_MODE).await?;
        }
    }

    let [tool, _runtime] = required;
    Ok(tool)
}

/// Ensures the metadata scanner exists at its fixed location.
pub async fn check_metadata_scanner(tools: &ToolConfig) -> Result<()> {
    let scanner = tools.metadata_scanner();
    if entry_exists(scanner).await {
        return Ok(());
    }
    Err(Error::MissingTool {
        tools: vec![
            scanner
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| scanner.display().to_string()),
        ],
        location: scanner.parent().map(Path::to_path_buf).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::Arch;

    #[tokio::test]
    async fn verify_appdir_requires_apprun() {
        let tmp = tempfile::tempdir().unwrap();
        let err = verify_appdir(tmp.path()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidBundle { .. }));

        std::fs::write(tmp.path().join("AppRun"), b"#!").unwrap();
        verify_appdir(tmp.path()).await.unwrap();
    }

    #[tokio::test]
    async fn verify_appdir_rejects_missing_root() {
        let tmp = tempfile::tempdir().unwrap();
        let err = verify_appdir(&tmp.path().join("Nope.AppDir")).await.unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn verify_appdir_keeps_inspection_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("plain"), b"file").unwrap();

        let err = verify_appdir(&tmp.path().join("plain/Foo.AppDir"))
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("cannot be inspected"), "{message}");
        assert!(!message.contains("does not exist"), "{message}");
    }

    #[tokio::test]
    async fn missing_tools_are_listed_together() {
        let tmp = tempfile::tempdir().unwrap();
        let tools = ToolConfig::new(tmp.path()).with_arch(Arch::AArch64);

        match prepare_tools(&tools).await.unwrap_err() {
            Error::MissingTool { tools, location } => {
                assert_eq!(
                    tools,
                    vec!["appimagetool-aarch64.AppImage", "runtime-aarch64"]
                );
                assert_eq!(location, tmp.path());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_executable_tools_are_repaired() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let tools = ToolConfig::new(tmp.path());
        for path in [tools.packaging_tool_path(), tools.runtime_path()] {
            std::fs::write(&path, b"#!/bin/sh\n").unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        }

        let tool = prepare_tools(&tools).await.unwrap();
        assert_eq!(tool, tools.packaging_tool_path());
        for path in [tools.packaging_tool_path(), tools.runtime_path()] {
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[tokio::test]
    async fn missing_scanner_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let tools =
            ToolConfig::new(tmp.path()).with_metadata_scanner(tmp.path().join("appstreamcli"));

        match check_metadata_scanner(&tools).await.unwrap_err() {
            Error::MissingTool { tools, .. } => assert_eq!(tools, vec!["appstreamcli"]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
