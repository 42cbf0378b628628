use anyhow::{Context, Result};
use image::{ImageFormat, RgbImage};
use std::path::{Path, PathBuf};

/// Used when the input path has no usable file stem.
pub const FALLBACK_NAME: &str = "music_analysis_plot.png";

/// `<dir>/<input stem>.png`
pub fn output_path_for(input: &Path, dir: &Path) -> PathBuf {
    let name = input
        .file_stem()
        .filter(|stem| !stem.is_empty())
        .map(|stem| {
            let mut name = stem.to_os_string();
            name.push(".png");
            name
        })
        .unwrap_or_else(|| FALLBACK_NAME.into());
    dir.join(name)
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

/// Encode as PNG next to `path` and move it into place, replacing any
/// existing file. On failure `path` is left untouched.
pub fn save_png(image: &RgbImage, path: &Path) -> Result<()> {
    let tmp = partial_path(path);
    let result = image
        .save_with_format(&tmp, ImageFormat::Png)
        .with_context(|| format!("Failed to write image: {}", tmp.display()))
        .and_then(|_| {
            std::fs::rename(&tmp, path)
                .with_context(|| format!("Failed to move image into place: {}", path.display()))
        });

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    } else {
        log::info!("Wrote {}x{} figure to {}", image.width(), image.height(), path.display());
    }
    result
}
