//! Icon inspection before staging.
//!
//! The icon is copied into the AppDir byte for byte; nothing is converted or
//! resized. This module only probes the file so the user hears about icons
//! that desktop environments are likely to render poorly.
//!
//! | Extension | Handling |
//! |-----------|----------|
//! | `.png` | dimensions probed, warning unless 256x256 |
//! | `.svg` | accepted without probing |
//! | other | accepted with a warning |

use std::path::Path;

/// Edge length of the hicolor theme slot the icon is installed into.
pub const THEME_ICON_SIZE: u32 = 256;

/// Recognised icon encodings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IconFormat {
    /// Raster PNG
    Png,
    /// Scalable SVG
    Svg,
    /// Anything else; copied as-is
    Other,
}

impl IconFormat {
    /// Classifies a path by its extension, case-insensitively.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("png") => IconFormat::Png,
            Some("svg") => IconFormat::Svg,
            _ => IconFormat::Other,
        }
    }
}

/// Icon metadata gathered by [`inspect_icon`].
#[derive(Debug, Clone)]
pub struct IconInfo {
    /// Encoding inferred from the extension.
    pub format: IconFormat,

    /// Pixel dimensions, when the file is a decodable PNG.
    pub dimensions: Option<(u32, u32)>,
}

impl IconInfo {
    /// Returns true if the icon fits the 256x256 theme slot exactly.
    pub fn matches_theme_size(&self) -> bool {
        match self.format {
            IconFormat::Svg => true,
            IconFormat::Png => self.dimensions == Some((THEME_ICON_SIZE, THEME_ICON_SIZE)),
            IconFormat::Other => false,
        }
    }
}

/// Probes an icon and logs a warning for anything unusual.
///
/// Never fails: an unreadable header is reported as a warning and the staging
/// step still copies the file verbatim.
pub async fn inspect_icon(path: &Path) -> IconInfo {
    let format = IconFormat::from_path(path);

    let dimensions = match format {
        IconFormat::Png => {
            let probe_path = path.to_path_buf();
            let probed =
                tokio::task::spawn_blocking(move || image::image_dimensions(&probe_path)).await;
            match probed {
                Ok(Ok(dims)) => Some(dims),
                Ok(Err(e)) => {
                    log::warn!("Could not read PNG header of {}: {}", path.display(), e);
                    None
                }
                Err(e) => {
                    log::warn!("Icon probe task failed for {}: {}", path.display(), e);
                    None
                }
            }
        }
        IconFormat::Svg | IconFormat::Other => None,
    };

    let info = IconInfo {
        format,
        dimensions,
    };

    match (info.format, info.dimensions) {
        (IconFormat::Png, Some((w, h))) if !info.matches_theme_size() => {
            log::warn!(
                "Icon {} is {}x{}; it is installed in the {size}x{size} theme slot unchanged",
                path.display(),
                w,
                h,
                size = THEME_ICON_SIZE
            );
        }
        (IconFormat::Other, _) => {
            log::warn!(
                "Icon {} is neither PNG nor SVG; copying it as icon.png anyway",
                path.display()
            );
        }
        _ => log::debug!("Icon {} accepted", path.display()),
    }

    info
}
