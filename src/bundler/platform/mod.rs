//! Platform-specific bundle formats.
//!
//! Only the AppDir/AppImage format is produced. Staging is plain file
//! manipulation and runs on any Unix host; packaging needs the Linux
//! appimagetool binaries.

pub mod linux;
