use anyhow::Result;
use clap::{CommandFactory, Parser};
use streamscribe::cli::{Cli, Commands};
use streamscribe::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => log::LevelFilter::Error,
        (false, 0) => log::LevelFilter::Warn,
        (false, 1) => log::LevelFilter::Info,
        (false, _) => log::LevelFilter::Debug,
    };
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .init()?;

    let mut config = load_config(&cli)?;
    if let Some(model_dir) = &cli.model_dir {
        config.model.dir = model_dir.clone();
    }

    match cli.command {
        Commands::Live {
            device,
            chunk_size,
            limit,
            save,
        } => {
            if let Some(chunk_size) = chunk_size {
                config.audio.chunk_size = chunk_size;
            }
            #[cfg(all(feature = "cpal-audio", feature = "vosk"))]
            {
                streamscribe::app::run_live_command(config, device, limit, save, cli.quiet)
                    .await?;
            }
            #[cfg(not(all(feature = "cpal-audio", feature = "vosk")))]
            {
                let _ = (device, limit, save);
                anyhow::bail!(
                    "live transcription requires a build with the `cpal-audio` and `vosk` features"
                );
            }
        }
        Commands::File { path, strict, save } => {
            #[cfg(feature = "vosk")]
            {
                streamscribe::app::run_file_command(config, &path, strict, save, cli.quiet)?;
            }
            #[cfg(not(feature = "vosk"))]
            {
                let _ = (path, strict, save);
                anyhow::bail!("file transcription requires a build with the `vosk` feature");
            }
        }
        Commands::Devices => {
            #[cfg(feature = "cpal-audio")]
            {
                streamscribe::app::run_devices_command()?;
            }
            #[cfg(not(feature = "cpal-audio"))]
            {
                anyhow::bail!("device listing requires a build with the `cpal-audio` feature");
            }
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "streamscribe",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => match Config::default_path() {
            Some(path) => Config::load_or_default(&path)?,
            None => Config::default(),
        },
    };
    Ok(config.with_env_overrides())
}
