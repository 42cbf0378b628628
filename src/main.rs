mod audio;
mod cli;
mod config;
mod error;
mod pipeline;
mod render;
mod shell;

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use config::Config;
use shell::NativeShell;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    // An explicit --config must load; an auto-detected one only warns.
    let mut config = match cli.config.as_deref() {
        Some(path) => {
            let cfg = config::load_config(path)?;
            log::info!("Loaded config from {}", path.display());
            cfg
        }
        None => match config::discover_config() {
            Some(path) => match config::load_config(&path) {
                Ok(cfg) => {
                    log::info!("Loaded config from {}", path.display());
                    cfg
                }
                Err(err) => {
                    log::warn!("{:#}", err);
                    Config::default()
                }
            },
            None => Config::default(),
        },
    };
    cli.apply(&mut config);

    log::info!(
        "music-analyzer - figure {}x{}, n_fft={}, hop={}",
        config.render.width,
        config.render.height,
        config.analysis.n_fft,
        config.analysis.hop_length
    );

    if let Some(ref input) = cli.input {
        let result = pipeline::analyze_file(input, &config);
        pipeline::report(&result);
        return Ok(());
    }

    let mut window = NativeShell;
    let written = shell::run(&mut window, config.shell.auto_close, |path| {
        pipeline::analyze_file(path, &config)
    });
    log::info!("Done. {} figure(s) written", written.len());
    Ok(())
}
