#![deny(unsafe_code)]
//! CLI binary for the flow-art generative system.
//!
//! Subcommands:
//! - `render`: generate curves, draw them and write a PNG
//! - `list`: print available palettes and thickness scales
//! - `schema`: print the settings param schema as JSON

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use flow_art_core::{Palette, Settings, ThicknessScale};
use flow_art_studio::{FrameStatus, Studio};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "flow-art", about = "Flow field curve art CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a flow field drawing and write it as a PNG.
    Render {
        /// Canvas width in pixels.
        #[arg(short = 'W', long, default_value_t = 800)]
        width: u32,

        /// Canvas height in pixels.
        #[arg(short = 'H', long, default_value_t = 600)]
        height: u32,

        /// PRNG seed for deterministic output (overrides params and config).
        #[arg(long)]
        seed: Option<u32>,

        /// Palette name (see `list`).
        #[arg(short, long)]
        palette: Option<String>,

        /// Settings as a JSON object, applied over the config file.
        #[arg(long, default_value = "{}")]
        params: String,

        /// JSON settings file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file path.
        #[arg(short, long, default_value = "flow-field.png")]
        output: PathBuf,

        /// Draw every curve in one pass instead of animated batches.
        #[arg(long)]
        batch: bool,

        /// Outline zones and obstacles on top of the drawing.
        #[arg(long)]
        overlay: bool,
    },
    /// List available palettes and thickness scales.
    List,
    /// Print the settings param schema as JSON.
    Schema,
}

fn parse_object(text: &str, what: &str) -> Result<Value, CliError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| CliError::Input(format!("invalid {what} JSON: {e}")))?;
    if !value.is_object() {
        return Err(CliError::Input(format!("{what} must be a JSON object")));
    }
    Ok(value)
}

/// Defaults, then the config file, then `--params`, then the dedicated flags.
fn load_settings(
    config: Option<&Path>,
    params: &str,
    seed: Option<u32>,
    palette: Option<&str>,
) -> Result<Settings, CliError> {
    let mut settings = Settings::default();
    if let Some(path) = config {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))?;
        settings = settings.merged(&parse_object(&text, "config")?);
    }
    settings = settings.merged(&parse_object(params, "--params")?);
    if let Some(seed) = seed {
        settings.seed = seed;
    }
    if let Some(name) = palette {
        if Palette::get(name).is_none() {
            return Err(CliError::Input(format!(
                "unknown palette {name:?} (available: {})",
                Palette::list_names().join(", ")
            )));
        }
        settings.palette = name.to_owned();
    }
    Ok(settings)
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let palettes = Palette::list_names();
            let scales = ThicknessScale::list_names();
            if cli.json {
                let info = serde_json::json!({
                    "palettes": palettes,
                    "thickness_scales": scales,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Palettes:");
                println!("  {}", palettes.join(", "));
                println!("Thickness scales:");
                println!("  {}", scales.join(", "));
            }
        }
        Command::Schema => {
            let schema =
                Settings::param_schema(&Palette::list_names(), &ThicknessScale::list_names());
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Command::Render {
            width,
            height,
            seed,
            palette,
            params,
            config,
            output,
            batch,
            overlay,
        } => {
            let mut settings =
                load_settings(config.as_deref(), &params, seed, palette.as_deref())?;
            if batch {
                settings.animate = false;
            }
            let seed = settings.seed;
            let palette = settings.palette.clone();

            let mut studio = Studio::new(width, height, settings)?;
            studio.wait()?;
            let mut frames = 0_usize;
            loop {
                match studio.frame()? {
                    FrameStatus::Idle => break,
                    FrameStatus::Loading => {}
                    FrameStatus::Drawing { .. } => frames += 1,
                }
            }
            if overlay {
                studio.draw_overlay();
            }
            studio.save_image(&output)?;

            let curves = studio.manager().map_or(0, |m| m.total());
            if cli.json {
                let info = serde_json::json!({
                    "width": width,
                    "height": height,
                    "seed": seed,
                    "palette": palette,
                    "curves": curves,
                    "frames": frames,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {curves} curves ({width}x{height}, seed {seed}, {frames} frames) -> {}",
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        log::debug!("exiting with {e:?}");
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
