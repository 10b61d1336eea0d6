#[cfg(all(test, unix))]
mod tests {
    use appdir_bundler::bundler::{
        Arch, BundleSpecBuilder, Bundler, Error, ToolConfig, builder, planner,
    };
    use sha2::{Digest, Sha256};
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    const EXEC_BYTES: &[u8] = b"\x7fELF pretend binary";
    const ICON_BYTES: &[u8] = b"\x89PNG pretend icon";

    /// `myapp`, `logo.png` and `data/x` in a fresh project directory
    fn project() -> (tempfile::TempDir, BundleSpecBuilder) {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path();
        std::fs::write(src.join("myapp"), EXEC_BYTES).unwrap();
        std::fs::set_permissions(src.join("myapp"), std::fs::Permissions::from_mode(0o755))
            .unwrap();
        std::fs::write(src.join("logo.png"), ICON_BYTES).unwrap();
        std::fs::create_dir(src.join("data")).unwrap();
        std::fs::write(src.join("data/x"), b"payload").unwrap();

        let spec = BundleSpecBuilder::new()
            .source_dir(src)
            .exec_path(src.join("myapp"))
            .icon_path(src.join("logo.png"))
            .app_name("Foo")
            .description("A test app")
            .categories("Utility;Development");
        (tmp, spec)
    }

    fn mode(path: &Path) -> u32 {
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    /// Every path under `root` with its size, in walk order
    fn snapshot(root: &Path) -> Vec<(PathBuf, u64)> {
        walkdir::WalkDir::new(root)
            .sort_by_file_name()
            .follow_links(false)
            .into_iter()
            .map(|e| {
                let e = e.unwrap();
                let len = std::fs::symlink_metadata(e.path()).unwrap().len();
                (e.path().to_path_buf(), len)
            })
            .collect()
    }

    fn write_script(path: &Path, body: &str) {
        std::fs::write(path, format!("#!/bin/sh\n{body}")).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Tools directory with a stand-in appimagetool, plus a fake scanner
    fn fake_tools(dir: &Path, tool_body: &str) -> ToolConfig {
        let tools_dir = dir.join("tools");
        std::fs::create_dir_all(&tools_dir).unwrap();
        let tools = ToolConfig::new(&tools_dir)
            .with_arch(Arch::X86_64)
            .with_metadata_scanner(dir.join("appstreamcli"));

        write_script(&tools.packaging_tool_path(), tool_body);
        std::fs::write(tools.runtime_path(), b"runtime").unwrap();
        std::fs::set_permissions(tools.runtime_path(), std::fs::Permissions::from_mode(0o644))
            .unwrap();
        write_script(&dir.join("appstreamcli"), "exit 0\n");
        tools
    }

    #[tokio::test]
    async fn test_full_bundle_layout() {
        let (tmp, spec) = project();
        let report = Bundler::new(spec.build()).prepare().await.unwrap();

        let root = tmp.path().join("Foo.AppDir");
        assert_eq!(report.root(), root);

        assert_eq!(std::fs::read(root.join("usr/share/myapp")).unwrap(), EXEC_BYTES);

        let link = root.join("usr/bin/myapp");
        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_link(&link).unwrap(), Path::new("../share/myapp"));
        assert_eq!(std::fs::read(&link).unwrap(), EXEC_BYTES);

        let apprun = root.join("AppRun");
        assert_eq!(
            std::fs::read_to_string(&apprun).unwrap(),
            "#! /bin/bash\ncd \"$(dirname \"$0\")\"\nexec ./usr/bin/myapp\n"
        );
        assert_eq!(mode(&apprun), 0o755);

        assert_eq!(std::fs::read(root.join("icon.png")).unwrap(), ICON_BYTES);
        assert_eq!(
            std::fs::read(root.join("usr/share/icons/hicolor/256x256/apps/icon.png")).unwrap(),
            ICON_BYTES
        );

        let usr_desktop = std::fs::read(root.join("usr/Foo.desktop")).unwrap();
        let root_desktop = std::fs::read(root.join("Foo.desktop")).unwrap();
        assert_eq!(usr_desktop, root_desktop);
        assert_eq!(
            String::from_utf8(usr_desktop).unwrap(),
            "[Desktop Entry]\nName=Foo\nExec=AppRun\nIcon=icon\nType=Application\n\
             Categories=Utility;Development\nComment=A test app\n"
        );
        assert_eq!(mode(&root.join("usr/Foo.desktop")), 0o644);

        assert_eq!(std::fs::read(root.join("usr/share/data/x")).unwrap(), b"payload");
        assert!(!root.join("usr/share/Foo.AppDir").exists());

        // data and logo.png
        assert_eq!(report.source_copy.attempted, 2);
        assert!(report.source_copy.is_complete());
    }

    #[tokio::test]
    async fn test_second_run_is_rejected_without_writes() {
        let (tmp, spec) = project();
        let spec = spec.build();
        Bundler::new(spec.clone()).prepare().await.unwrap();

        let root = tmp.path().join("Foo.AppDir");
        let before = snapshot(&root);

        let err = Bundler::new(spec).prepare().await.unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { ref path } if path == &root));
        assert_eq!(snapshot(&root), before);
    }

    #[tokio::test]
    async fn test_dangling_symlink_blocks_planning() {
        let (tmp, spec) = project();
        std::os::unix::fs::symlink("/nonexistent", tmp.path().join("Foo.AppDir")).unwrap();

        let err = planner::plan(&spec.build()).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_plan_then_build_explicitly() {
        let (_tmp, spec) = project();
        let spec = spec.build();

        let layout = planner::plan(&spec).unwrap();
        assert!(!layout.root().exists());

        let report = builder::build(&layout, &spec).await.unwrap();
        assert_eq!(report.layout, layout);
        assert!(layout.apprun_path().is_file());
    }

    #[tokio::test]
    async fn test_categories_are_written_verbatim() {
        let (tmp, spec) = project();
        let categories = "Audio;;Weird Tag;  ";
        Bundler::new(spec.categories(categories).build())
            .prepare()
            .await
            .unwrap();

        let desktop =
            std::fs::read_to_string(tmp.path().join("Foo.AppDir/Foo.desktop")).unwrap();
        assert!(desktop.contains(&format!("\nCategories={categories}\n")));
    }

    #[tokio::test]
    async fn test_source_directories_merge_into_share() {
        let (tmp, spec) = project();
        std::fs::create_dir_all(tmp.path().join("icons/extra")).unwrap();
        std::fs::write(tmp.path().join("icons/extra/a.svg"), b"<svg/>").unwrap();

        let report = Bundler::new(spec.build()).prepare().await.unwrap();
        let share = tmp.path().join("Foo.AppDir/usr/share");

        assert!(report.source_copy.is_complete());
        assert_eq!(std::fs::read(share.join("icons/extra/a.svg")).unwrap(), b"<svg/>");
        assert!(share.join("icons/hicolor/256x256/apps/icon.png").is_file());
    }

    #[tokio::test]
    async fn test_bulk_copy_failures_do_not_abort() {
        let (tmp, spec) = project();
        // A plain file cannot replace the icons directory already staged in usr/share
        std::fs::write(tmp.path().join("icons"), b"not a directory").unwrap();

        let report = Bundler::new(spec.build()).prepare().await.unwrap();
        let copy = &report.source_copy;

        assert_eq!(copy.attempted, 3);
        assert_eq!(copy.copied, vec!["data", "logo.png"]);
        assert_eq!(copy.failures.len(), 1);
        assert_eq!(copy.failures[0].entry, "icons");
        assert!(tmp.path().join("Foo.AppDir/Foo.desktop").is_file());
    }

    #[tokio::test]
    async fn test_symlinked_assets_are_copied_by_value() {
        let (tmp, spec) = project();
        let shared = tempfile::tempdir().unwrap();
        std::fs::write(shared.path().join("font.ttf"), b"glyphs").unwrap();
        std::os::unix::fs::symlink(shared.path(), tmp.path().join("assets")).unwrap();
        std::os::unix::fs::symlink("x", tmp.path().join("data/alias")).unwrap();

        let report = Bundler::new(spec.build()).prepare().await.unwrap();
        let share = tmp.path().join("Foo.AppDir/usr/share");

        assert!(report.source_copy.is_complete());
        assert_eq!(report.source_copy.copied, vec!["assets", "data", "logo.png"]);

        let assets = std::fs::symlink_metadata(share.join("assets")).unwrap();
        assert!(assets.file_type().is_dir());
        assert_eq!(std::fs::read(share.join("assets/font.ttf")).unwrap(), b"glyphs");

        let alias = std::fs::symlink_metadata(share.join("data/alias")).unwrap();
        assert!(alias.file_type().is_file());
        assert_eq!(std::fs::read(share.join("data/alias")).unwrap(), b"payload");
    }

    #[tokio::test]
    async fn test_dangling_source_link_is_a_copy_failure() {
        let (tmp, spec) = project();
        std::os::unix::fs::symlink("../missing", tmp.path().join("broken")).unwrap();

        let report = Bundler::new(spec.build()).prepare().await.unwrap();
        let copy = &report.source_copy;

        assert_eq!(copy.failures.len(), 1);
        assert_eq!(copy.failures[0].entry, "broken");
        assert_eq!(copy.copied, vec!["data", "logo.png"]);
        assert!(!tmp.path().join("Foo.AppDir/usr/share/broken").exists());
    }

    #[tokio::test]
    async fn test_named_pipes_are_skipped_without_blocking() {
        let (tmp, spec) = project();
        for fifo in [tmp.path().join("pipe"), tmp.path().join("data/pipe")] {
            let status = std::process::Command::new("mkfifo").arg(&fifo).status().unwrap();
            assert!(status.success());
        }

        let report = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            Bundler::new(spec.build()).prepare(),
        )
        .await
        .expect("staging must not block on a FIFO")
        .unwrap();
        let copy = &report.source_copy;

        assert_eq!(copy.attempted, 3);
        assert_eq!(copy.copied, vec!["logo.png"]);
        let failed: Vec<_> = copy.failures.iter().map(|f| f.entry.as_str()).collect();
        assert_eq!(failed, vec!["data", "pipe"]);
        for failure in &copy.failures {
            assert!(
                failure.error.to_string().contains("unsupported file type"),
                "{}",
                failure.error
            );
        }
        assert!(tmp.path().join("Foo.AppDir/Foo.desktop").is_file());
    }

    #[tokio::test]
    async fn test_apprun_launches_bundled_executable() {
        let (tmp, spec) = project();
        let launcher = tmp.path().join("launcher");
        write_script(&launcher, "echo \"launched-$0 in $(pwd)\"\n");

        Bundler::new(spec.exec_path(&launcher).build())
            .prepare()
            .await
            .unwrap();
        let root = tmp.path().join("Foo.AppDir");

        let elsewhere = tempfile::tempdir().unwrap();
        let output = std::process::Command::new(root.join("AppRun"))
            .current_dir(elsewhere.path())
            .output()
            .unwrap();

        assert!(output.status.success(), "{output:?}");
        assert_eq!(
            String::from_utf8(output.stdout).unwrap(),
            format!("launched-./usr/bin/launcher in {}\n", root.display())
        );
    }

    #[tokio::test]
    async fn test_missing_fields_are_reported_together() {
        let err = Bundler::new(BundleSpecBuilder::new().app_name("Foo").build())
            .prepare()
            .await
            .unwrap_err();
        match err {
            Error::Validation { missing } => assert_eq!(
                missing,
                vec!["source_dir", "exec_path", "description", "categories"]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_package_with_stand_in_tool() {
        let (tmp, spec) = project();
        let bundler = Bundler::new(spec.build());
        bundler.prepare().await.unwrap();

        let tools = fake_tools(
            tmp.path(),
            "echo \"ARCH=$ARCH\"\necho \"PATH=$PATH\"\necho \"packing $1\" >&2\nprintf IMG > \"$2\"\n",
        );
        let output = tmp.path().join("dist/Foo.AppImage");

        let image = bundler.package(&output, &tools).await.unwrap();

        assert_eq!(image.path, output);
        assert_eq!(std::fs::read(&output).unwrap(), b"IMG");
        assert_eq!(image.size, 3);
        assert_eq!(image.checksum, format!("{:x}", Sha256::digest(b"IMG")));
        assert!(image.stdout.contains("ARCH=x86_64"));
        let expected_path = format!("PATH=/usr/bin:{}:", tools.tools_dir().display());
        assert!(image.stdout.contains(&expected_path), "{}", image.stdout);
        assert!(image.stderr.contains("Foo.AppDir"));

        // runtime helper had no execute bit
        assert_eq!(mode(&tools.runtime_path()), 0o755);
    }

    #[tokio::test]
    async fn test_package_failure_carries_tool_output() {
        let (tmp, spec) = project();
        let bundler = Bundler::new(spec.build());
        bundler.prepare().await.unwrap();

        let tools = fake_tools(tmp.path(), "echo scanning\necho 'bad desktop file' >&2\nexit 3\n");
        let err = bundler
            .package(tmp.path().join("Foo.AppImage"), &tools)
            .await
            .unwrap_err();

        match err {
            Error::Packaging {
                code,
                stdout,
                stderr,
                ..
            } => {
                assert_eq!(code, Some(3));
                assert_eq!(stdout, "scanning\n");
                assert_eq!(stderr, "bad desktop file\n");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_package_requires_prepared_appdir() {
        let (tmp, spec) = project();
        let tools = fake_tools(tmp.path(), "exit 0\n");

        let err = Bundler::new(spec.build())
            .package(tmp.path().join("Foo.AppImage"), &tools)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidBundle { .. }));
    }

    #[tokio::test]
    async fn test_package_reports_all_missing_tools() {
        let (tmp, spec) = project();
        let bundler = Bundler::new(spec.build());
        bundler.prepare().await.unwrap();

        let tools = ToolConfig::new(tmp.path().join("empty")).with_arch(Arch::Armhf);
        match bundler
            .package(tmp.path().join("Foo.AppImage"), &tools)
            .await
            .unwrap_err()
        {
            Error::MissingTool { tools, .. } => {
                assert_eq!(tools, vec!["appimagetool-armhf.AppImage", "runtime-armhf"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
