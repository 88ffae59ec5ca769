// Macrokeys CLI
// Compiles a macro-profile configuration into an AutoHotkey v2 script

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use macrokeys_core::compile::{CompileOptions, DEFAULT_CATCH_PORT};
use macrokeys_core::config::Config;
use macrokeys_core::validate;

/// Macro keyboard profile compiler
#[derive(Parser, Debug)]
#[command(name = "macrokeys")]
#[command(version = "0.2.0")]
#[command(about = "Compile macro keyboard profiles to an AutoHotkey v2 script", long_about = None)]
struct Args {
    /// JSON configuration file (defaults to the per-user config dir)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,

    /// Output script path (defaults to macros.ahk next to the config)
    #[arg(short, long, value_name = "SCRIPT")]
    output: Option<PathBuf>,

    /// Raw-input device number the script listens to
    #[arg(long, default_value_t = 1)]
    device: u32,

    /// Loopback port of the catch-list listener
    #[arg(long, default_value_t = DEFAULT_CATCH_PORT)]
    port: u16,

    /// Catch-list poll interval in milliseconds
    #[arg(long = "poll-ms", default_value_t = 1000)]
    poll_ms: u32,

    /// Path the script launches the device helper from
    #[arg(long, default_value = "MultiKB_For_AutoHotkey.exe")]
    helper: String,

    /// Extra #Include line for the generated script
    #[arg(long, value_name = "PATH")]
    include: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("macrokeys").join("config.json"))
}

/// Run every check over the whole model, scoping the cycle-hotkey
/// check to each program in turn.
fn check_all(config: &Config) -> Option<validate::Conflict> {
    for key in config.programs.keys() {
        if let Some(conflict) = validate::validate(config, key) {
            return Some(conflict);
        }
    }
    None
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let config_path = match args.config.clone().or_else(default_config_path) {
        Some(path) => path,
        None => bail!("--config is required when no per-user config dir exists"),
    };
    log::debug!("loading configuration from {}", config_path.display());

    let config = Config::load(&config_path);
    log::debug!(
        "loaded {} program(s), schema version {}",
        config.programs.len(),
        macrokeys_core::SCHEMA_VERSION
    );

    if let Some(conflict) = check_all(&config) {
        bail!("configuration conflict: {conflict}");
    }
    if args.check {
        println!("Configuration is valid");
        return Ok(());
    }

    let opts = CompileOptions {
        device_number: args.device,
        catch_port: args.port,
        poll_interval_ms: args.poll_ms,
        helper_exe: args.helper.clone(),
        include_path: args.include.clone(),
    };
    let script = macrokeys_core::compile(&config, &opts);

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| config_path.with_file_name("macros.ahk"));
    fs::write(&output_path, &script)
        .with_context(|| format!("failed to write {}", output_path.display()))?;
    log::debug!("wrote {} bytes", script.len());
    println!("Wrote {}", output_path.display());

    Ok(())
}
