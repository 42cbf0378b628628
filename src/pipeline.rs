use anyhow::Context;
use std::path::{Path, PathBuf};

use crate::audio::analysis::analyze;
use crate::audio::decode::{decode_audio, AudioData};
use crate::config::{AnalysisConfig, Config};
use crate::error::RunError;
use crate::render::figure::PlottersRenderer;
use crate::render::output::{output_path_for, save_png};
use crate::render::FigureRenderer;

/// Analyze one file and save its figure into the current working directory.
pub fn analyze_file(path: &Path, config: &Config) -> Result<PathBuf, RunError> {
    let out_dir = std::env::current_dir()
        .context("Failed to resolve the working directory")
        .map_err(RunError::Analyze)?;
    let renderer = PlottersRenderer::new(config.render.clone());
    analyze_file_with(path, &config.analysis, &out_dir, &renderer)
}

pub fn analyze_file_with(
    path: &Path,
    analysis: &AnalysisConfig,
    out_dir: &Path,
    renderer: &dyn FigureRenderer,
) -> Result<PathBuf, RunError> {
    log::info!("Decoding audio: {}", path.display());
    let audio = decode_audio(path).map_err(RunError::Load)?;

    let output = output_path_for(path, out_dir);
    let title = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    render_to(&audio, &title, analysis, renderer, &output).map_err(RunError::Analyze)?;
    Ok(output)
}

fn render_to(
    audio: &AudioData,
    title: &str,
    analysis: &AnalysisConfig,
    renderer: &dyn FigureRenderer,
    output: &Path,
) -> anyhow::Result<()> {
    log::info!("Analyzing audio...");
    let features = analyze(audio, analysis)?;

    log::info!("Rendering figure ({} frames)...", features.n_frames());
    let image = renderer.render(&features, title)?;

    save_png(&image, output)
}

/// Console status line for one attempt.
pub fn status_line(result: &Result<PathBuf, RunError>) -> String {
    match result {
        Ok(output) => {
            let name = output
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| output.display().to_string());
            format!("Analysis complete. The plot has been saved as '{}'.", name)
        }
        Err(err) => err.to_string(),
    }
}

pub fn report(result: &Result<PathBuf, RunError>) {
    println!("{}", status_line(result));
}
