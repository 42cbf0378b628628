pub mod colormap;
pub mod figure;
pub mod output;
pub mod panels;
pub mod theme;

use anyhow::Result;
use image::RgbImage;

use crate::audio::features::FeatureSet;

/// Turns a feature set into the composite figure.
pub trait FigureRenderer {
    fn render(&self, features: &FeatureSet, title: &str) -> Result<RgbImage>;
}
