use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "music-analyzer.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub shell: ShellConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_n_fft")]
    pub n_fft: usize,
    #[serde(default = "default_hop_length")]
    pub hop_length: usize,
    #[serde(default = "default_n_mfcc")]
    pub n_mfcc: usize,
    #[serde(default = "default_n_mels")]
    pub n_mels: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShellConfig {
    /// Close the window after the first successful analysis.
    #[serde(default = "default_auto_close")]
    pub auto_close: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            n_fft: default_n_fft(),
            hop_length: default_hop_length(),
            n_mfcc: default_n_mfcc(),
            n_mels: default_n_mels(),
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            auto_close: default_auto_close(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_fft < 2 || self.hop_length == 0 || self.n_mels == 0 || self.n_mfcc == 0 {
            anyhow::bail!("Analysis sizes must be positive: {:?}", self);
        }
        if self.hop_length > self.n_fft {
            anyhow::bail!(
                "hop_length ({}) cannot exceed n_fft ({})",
                self.hop_length,
                self.n_fft
            );
        }
        if self.n_mfcc > self.n_mels {
            anyhow::bail!(
                "n_mfcc ({}) cannot exceed n_mels ({})",
                self.n_mfcc,
                self.n_mels
            );
        }
        Ok(())
    }
}

fn default_width() -> u32 { 2500 }
fn default_height() -> u32 { 1400 }
fn default_n_fft() -> usize { 2048 }
fn default_hop_length() -> usize { 512 }
fn default_n_mfcc() -> usize { 13 }
fn default_n_mels() -> usize { 128 }
fn default_auto_close() -> bool { true }

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config: {}", path.display()))
}

/// `./music-analyzer.toml`, then the per-user config locations.
pub fn discover_config() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("music-analyzer").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("music-analyzer").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.render.width, 2500);
        assert_eq!(cfg.render.height, 1400);
        assert_eq!(cfg.analysis.n_fft, 2048);
        assert_eq!(cfg.analysis.n_mfcc, 13);
        assert!(cfg.shell.auto_close);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg: Config = toml::from_str(
            "[shell]\nauto_close = false\n\n[analysis]\nhop_length = 256\n",
        )
        .unwrap();
        assert!(!cfg.shell.auto_close);
        assert_eq!(cfg.analysis.hop_length, 256);
        assert_eq!(cfg.analysis.n_mels, 128);
        assert_eq!(cfg.render.width, 2500);
    }

    #[test]
    fn validate_rejects_bad_sizes() {
        assert!(AnalysisConfig::default().validate().is_ok());
        let hop_too_big = AnalysisConfig {
            hop_length: 4096,
            ..AnalysisConfig::default()
        };
        assert!(hop_too_big.validate().is_err());
        let no_mels = AnalysisConfig {
            n_mels: 0,
            ..AnalysisConfig::default()
        };
        assert!(no_mels.validate().is_err());
    }

    #[test]
    fn load_config_reports_missing_file() {
        let missing = std::env::temp_dir().join("music-analyzer-no-such-config.toml");
        assert!(load_config(&missing).is_err());
    }
}
