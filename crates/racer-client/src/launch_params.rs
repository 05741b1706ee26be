//! Launch parameter parsing for the racer.
//!
//! On native, parameters are parsed from command-line arguments using clap.
//! On WASM, defaults are used (CLI argument parsing is not available).

use racer_core::{Mode, SessionConfig};

/// Launch parameters for the racer.
#[derive(Debug, Default)]
pub struct LaunchParams {
    /// Session tuning, from a TOML file or the built-in defaults.
    pub config: SessionConfig,
    /// Fixed seed for AI car placement.
    pub seed: Option<u64>,
    /// Mode the session starts in.
    pub initial_mode: Mode,
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use std::path::{Path, PathBuf};

    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    #[command(about = "3D box racer with a track designer")]
    struct CliArgs {
        /// TOML file overriding the session defaults.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seed for AI car placement (random if omitted).
        #[arg(long)]
        seed: Option<u64>,

        /// Start in the track designer instead of play mode.
        #[arg(long)]
        designer: bool,
    }

    /// Load a session config, falling back to defaults if it can't be used.
    fn load_config(path: &Path) -> SessionConfig {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to read config {}: {e}", path.display());
                return SessionConfig::default();
            }
        };

        match SessionConfig::from_toml_str(&text) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::error!("Invalid config {}: {e}", path.display());
                SessionConfig::default()
            }
        }
    }

    pub fn parse() -> LaunchParams {
        let args = CliArgs::parse();
        LaunchParams {
            config: args
                .config
                .as_deref()
                .map(load_config)
                .unwrap_or_default(),
            seed: args.seed,
            initial_mode: if args.designer {
                Mode::Designing
            } else {
                Mode::Racing
            },
        }
    }

}

/// Parse launch parameters from CLI args (native) or use defaults (WASM).
pub fn parse() -> LaunchParams {
    #[cfg(not(target_family = "wasm"))]
    {
        native::parse()
    }
    #[cfg(target_family = "wasm")]
    {
        LaunchParams::default()
    }
}
