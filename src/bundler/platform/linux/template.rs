//! Fixed templates for generated AppDir files.
//!
//! Both templates are rendered with HTML escaping disabled so values land in
//! the output byte for byte.

/// Entry-point script placed at the AppDir root.
pub const APPRUN_TEMPLATE: &str = r#"#! /bin/bash
cd "$(dirname "$0")"
exec ./usr/bin/{{exec_name}}
"#;

/// Desktop descriptor. Key order is fixed.
pub const DESKTOP_TEMPLATE: &str = "[Desktop Entry]
Name={{app_name}}
Exec=AppRun
Icon=icon
Type=Application
Categories={{categories}}
Comment={{description}}
";
