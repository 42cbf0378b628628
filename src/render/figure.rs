use anyhow::{Context, Result};
use image::RgbImage;
use plotters::prelude::*;

use super::panels::{self, Area, Labels};
use super::theme::{suptitle_font, BACKGROUND, FOREGROUND, ZCR_LINE};
use super::FigureRenderer;
use crate::audio::features::FeatureSet;
use crate::audio::spectral::PITCH_CLASSES;
use crate::config::RenderConfig;

pub const ROWS: usize = 5;
pub const COLS: usize = 2;

const MIN_WIDTH: u32 = 400;
const MIN_HEIGHT: u32 = 300;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Panel {
    Waveform,
    Spectrogram,
    Tempo,
    Mfcc,
    Chroma,
    ZeroCrossingRate,
    OnsetStrength,
    FrequencyBalance,
    SpectralCentroid,
}

/// Row-major grid; the last cell stays empty.
pub const LAYOUT: [Option<Panel>; ROWS * COLS] = [
    Some(Panel::Waveform),
    Some(Panel::Spectrogram),
    Some(Panel::Tempo),
    Some(Panel::Mfcc),
    Some(Panel::Chroma),
    Some(Panel::ZeroCrossingRate),
    Some(Panel::OnsetStrength),
    Some(Panel::FrequencyBalance),
    Some(Panel::SpectralCentroid),
    None,
];

impl Panel {
    pub fn title(self) -> &'static str {
        match self {
            Panel::Waveform => "Waveform",
            Panel::Spectrogram => "Spectrogram",
            Panel::Tempo => "Tempo",
            Panel::Mfcc => "MFCC",
            Panel::Chroma => "Chroma Feature",
            Panel::ZeroCrossingRate => "Zero Crossing Rate",
            Panel::OnsetStrength => "Noise and Distortion Detection",
            Panel::FrequencyBalance => "Frequency Balance",
            Panel::SpectralCentroid => "Spectral Centroid (Timbre)",
        }
    }

    fn x_desc(self) -> Option<&'static str> {
        match self {
            Panel::Tempo | Panel::FrequencyBalance => None,
            Panel::ZeroCrossingRate => Some("Frames"),
            _ => Some("Time (s)"),
        }
    }

    fn y_desc(self) -> Option<&'static str> {
        match self {
            Panel::Waveform => Some("Amplitude"),
            Panel::Spectrogram => Some("Frequency (Hz)"),
            Panel::Mfcc => Some("MFCC Coefficients"),
            Panel::ZeroCrossingRate => Some("Rate"),
            Panel::OnsetStrength => Some("Onset Strength"),
            Panel::FrequencyBalance => Some("Amplitude (dB)"),
            Panel::SpectralCentroid => Some("Hz"),
            Panel::Tempo | Panel::Chroma => None,
        }
    }

    /// Its x axis is not the shared time axis, so it is labelled wherever it sits.
    fn labels_own_x_axis(self) -> bool {
        matches!(self, Panel::ZeroCrossingRate)
    }
}

/// Inner panels drop their x description; only the lowest occupied panel
/// of each column keeps it.
pub fn shows_x_desc(index: usize) -> bool {
    let Some(panel) = LAYOUT.get(index).copied().flatten() else {
        return false;
    };
    if panel.labels_own_x_axis() {
        return true;
    }
    let col = index % COLS;
    let lowest = (0..ROWS)
        .rev()
        .map(|row| row * COLS + col)
        .find(|&i| LAYOUT[i].is_some());
    lowest == Some(index)
}

pub fn labels_for(index: usize, panel: Panel) -> Labels {
    Labels {
        title: panel.title(),
        x_desc: panel.x_desc().filter(|_| shows_x_desc(index)),
        y_desc: panel.y_desc(),
    }
}

/// Draws the full grid with plotters into an in-memory RGB buffer.
pub struct PlottersRenderer {
    pub config: RenderConfig,
}

impl PlottersRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }
}

impl FigureRenderer for PlottersRenderer {
    fn render(&self, features: &FeatureSet, title: &str) -> Result<RgbImage> {
        render_figure(features, title, &self.config)
    }
}

pub fn render_figure(features: &FeatureSet, title: &str, config: &RenderConfig) -> Result<RgbImage> {
    let (width, height) = (config.width, config.height);
    if width < MIN_WIDTH || height < MIN_HEIGHT {
        anyhow::bail!(
            "Figure size {}x{} is below the minimum {}x{}",
            width,
            height,
            MIN_WIDTH,
            MIN_HEIGHT
        );
    }

    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&BACKGROUND)?;
        let body = root.titled(title, suptitle_font())?;

        for (index, cell) in body.split_evenly((ROWS, COLS)).iter().enumerate() {
            let Some(panel) = LAYOUT[index] else {
                continue;
            };
            log::debug!("Drawing panel: {}", panel.title());
            draw_panel(cell, panel, features, &labels_for(index, panel))
                .with_context(|| format!("Failed to draw {} panel", panel.title()))?;
        }
        root.present()?;
    }

    RgbImage::from_raw(width, height, buffer).context("Figure buffer does not match its size")
}

fn draw_panel(cell: &Area, panel: Panel, features: &FeatureSet, labels: &Labels) -> Result<()> {
    let step = features.frame_step();
    match panel {
        Panel::Waveform => {
            panels::draw_waveform(cell, &features.waveform, features.sample_rate, labels)
        }
        Panel::Spectrogram => panels::draw_spectrogram(
            cell,
            &features.spectrogram_db,
            &features.frequencies,
            step,
            labels,
        ),
        Panel::Tempo => panels::draw_tempo(cell, features.tempo_bpm, labels.title),
        Panel::Mfcc => panels::draw_matrix(cell, &features.mfcc, step, None, labels),
        Panel::Chroma => {
            panels::draw_matrix(cell, &features.chroma, step, Some(&PITCH_CLASSES[..]), labels)
        }
        Panel::ZeroCrossingRate => {
            let points: Vec<(f32, f32)> = features
                .zero_crossing_rate
                .iter()
                .enumerate()
                .map(|(i, &z)| (i as f32, z))
                .collect();
            panels::draw_curve(cell, &points, ZCR_LINE, Some("Zero Crossing Rate"), labels)
        }
        Panel::OnsetStrength => {
            let points = zip_times(&features.frame_times, &features.onset_strength);
            panels::draw_curve(cell, &points, FOREGROUND, None, labels)
        }
        Panel::FrequencyBalance => panels::draw_band_energy(cell, &features.band_energy, labels),
        Panel::SpectralCentroid => {
            let points = zip_times(&features.frame_times, &features.spectral_centroid);
            panels::draw_curve(cell, &points, FOREGROUND, None, labels)
        }
    }
}

fn zip_times(times: &[f32], values: &[f32]) -> Vec<(f32, f32)> {
    times.iter().copied().zip(values.iter().copied()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::analysis::analyze;
    use crate::audio::decode::AudioData;
    use crate::config::AnalysisConfig;

    #[test]
    fn layout_holds_nine_distinct_panels() {
        let panels: Vec<Panel> = LAYOUT.iter().flatten().copied().collect();
        assert_eq!(panels.len(), 9);
        for (i, p) in panels.iter().enumerate() {
            assert!(!panels[i + 1..].contains(p));
        }
        assert_eq!(LAYOUT[ROWS * COLS - 1], None);
    }

    #[test]
    fn only_outer_panels_keep_x_descriptions() {
        let kept: Vec<&str> = (0..LAYOUT.len())
            .filter_map(|i| LAYOUT[i].map(|p| (i, p)))
            .filter_map(|(i, p)| labels_for(i, p).x_desc.map(|_| p.title()))
            .collect();
        assert_eq!(kept, vec!["Zero Crossing Rate", "Spectral Centroid (Timbre)"]);
        assert!(shows_x_desc(7), "lowest panel of the right column");
        assert!(!shows_x_desc(9), "empty cell");
        assert!(!shows_x_desc(0));
    }

    #[test]
    fn y_descriptions_are_kept_everywhere() {
        assert_eq!(labels_for(1, Panel::Spectrogram).y_desc, Some("Frequency (Hz)"));
        assert_eq!(labels_for(5, Panel::ZeroCrossingRate).y_desc, Some("Rate"));
        assert_eq!(labels_for(2, Panel::Tempo).y_desc, None);
    }

    #[test]
    fn rejects_tiny_figures() {
        let audio = AudioData {
            samples: vec![0.0; 4096],
            sample_rate: 8000,
        };
        let features = analyze(&audio, &AnalysisConfig::default()).unwrap();
        let config = RenderConfig {
            width: 100,
            height: 100,
        };
        assert!(render_figure(&features, "tiny", &config).is_err());
    }

    #[test]
    #[ignore = "needs a system sans-serif font"]
    fn renders_full_figure() {
        let sr = 22050;
        let samples = (0..sr)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sr as f32).sin() * 0.5)
            .collect();
        let audio = AudioData {
            samples,
            sample_rate: sr as u32,
        };
        let features = analyze(&audio, &AnalysisConfig::default()).unwrap();
        let image = render_figure(&features, "tone.wav", &RenderConfig::default()).unwrap();
        assert_eq!(image.dimensions(), (2500, 1400));
        assert_eq!(image.get_pixel(2, 2).0, [0x2E, 0x2E, 0x2E]);
    }
}
