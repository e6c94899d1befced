mod demo;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use retromode_core::hash::hash_frame;
use retromode_core::EngineConfig;
use retromode_render::save_png;

#[derive(Parser)]
#[command(
    name = "retromode",
    version,
    about = "Retromode: tick-driven software rendering for 2D scenes"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the demo scene to numbered PNG files
    Render {
        /// Engine config file (TOML); defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of frames to produce
        #[arg(short = 'n', long, default_value_t = 60)]
        frames: u64,

        /// Directory the frames are written to
        #[arg(short, long, default_value = "output")]
        out: PathBuf,
    },

    /// Print the SHA-256 content hash of each demo frame
    Hash {
        /// Engine config file (TOML); defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of frames to produce
        #[arg(short = 'n', long, default_value_t = 1)]
        frames: u64,
    },

    /// Print the default engine config, or write it to a file
    Config {
        /// Write to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `hash` and `config` output stays clean on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render {
            config,
            frames,
            out,
        } => cmd_render(config.as_deref(), frames, &out),
        Commands::Hash { config, frames } => cmd_hash(config.as_deref(), frames),
        Commands::Config { output } => cmd_config(output.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load_from_file(path)
            .with_context(|| format!("failed to load config: {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn cmd_render(config: Option<&Path>, frames: u64, out: &Path) -> Result<()> {
    let config = load_config(config)?;
    let mut driver = demo::build(&config).context("failed to build demo scene")?;
    std::fs::create_dir_all(out)
        .with_context(|| format!("failed to create output directory: {}", out.display()))?;

    let start = Instant::now();
    for _ in 0..frames {
        let tick = driver.tick();
        let frame = driver
            .produce_frame()
            .with_context(|| format!("failed to produce frame {}", tick.index))?;
        let path = out.join(format!("frame_{:04}.png", tick.index));
        save_png(frame, &path)
            .with_context(|| format!("failed to write frame: {}", path.display()))?;
    }
    let elapsed = start.elapsed();

    tracing::info!(frames, elapsed_ms = elapsed.as_millis() as u64, "render finished");
    println!(
        "Rendered {} frames to {} in {:.1}ms",
        frames,
        out.display(),
        elapsed.as_secs_f64() * 1000.0
    );
    Ok(())
}

fn cmd_hash(config: Option<&Path>, frames: u64) -> Result<()> {
    let config = load_config(config)?;
    let mut driver = demo::build(&config).context("failed to build demo scene")?;
    for _ in 0..frames {
        let tick = driver.tick();
        let frame = driver
            .produce_frame()
            .with_context(|| format!("failed to produce frame {}", tick.index))?;
        println!("{:04} sha256:{}", tick.index, hash_frame(frame));
    }
    Ok(())
}

fn cmd_config(output: Option<&Path>) -> Result<()> {
    let config = EngineConfig::default();
    match output {
        Some(path) => {
            config
                .save_to_file(path)
                .with_context(|| format!("failed to write config: {}", path.display()))?;
            println!("Wrote default config to {}", path.display());
        }
        None => print!("{}", config.to_toml_string()?),
    }
    Ok(())
}
