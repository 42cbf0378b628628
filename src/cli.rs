use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "music-analyzer",
    about = "Render waveform, spectrogram, tempo, MFCC, chroma and more for an audio file"
)]
pub struct Cli {
    /// Audio file to analyze (WAV, MP3, FLAC, OGG, AAC). Opens the file picker when omitted.
    pub input: Option<PathBuf>,

    /// Config file. Defaults to ./music-analyzer.toml or the user config directory.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Keep the window open after a successful analysis
    #[arg(long)]
    pub keep_open: bool,

    /// Figure width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Figure height in pixels
    #[arg(long)]
    pub height: Option<u32>,
}

impl Cli {
    /// Flags given on the command line win over the config file.
    pub fn apply(&self, config: &mut Config) {
        if let Some(width) = self.width {
            config.render.width = width;
        }
        if let Some(height) = self.height {
            config.render.height = height;
        }
        if self.keep_open {
            config.shell.auto_close = false;
        }
    }
}
