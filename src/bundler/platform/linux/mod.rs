//! Linux AppDir staging and AppImage packaging.
//!
//! - [`apprun`] writes the entry-point script
//! - [`freedesktop`] writes the desktop descriptor and installs the icon
//! - [`appimage`] runs the external packaging tool over a staged AppDir
//!
//! # Required Tools
//!
//! | Tool | Location |
//! |------|----------|
//! | `appimagetool-<arch>.AppImage` | tools directory |
//! | `runtime-<arch>` | tools directory |
//! | `appstreamcli` | `/usr/bin` |

pub mod appimage;
pub mod apprun;
pub mod freedesktop;
mod template;
