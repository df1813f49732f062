//! Command-line arguments
//!
//! Options are read from the configuration file given with `--config`, or from
//! `$HOME/.avaproof/config.toml` when it exists, then overridden by
//! `AVAPROOF__` environment variables.

use std::path::PathBuf;

use avaproof_config::{load_config, Config};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use directories::BaseDirs;

use crate::cmd::{
    build::BuildCmd, check_config::CheckConfigCmd, decode::DecodeCmd, delegate::DelegateCmd,
    keygen::KeygenCmd, verify::VerifyCmd,
};
use crate::logging::DebugSection;

const APP_FOLDER: &str = ".avaproof";
const CONFIG_FILE: &str = "config.toml";

#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Config file path
    #[arg(short, long, value_name = "FILE", env = "AVAPROOF_CONFIG")]
    pub config: Option<PathBuf>,

    #[clap(
        short,
        long = "debug",
        help = "Enable debug output for the given comma-separated sections",
        value_enum,
        value_delimiter = ','
    )]
    pub debug: Vec<DebugSection>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Generate a new key pair
    Keygen(KeygenCmd),

    /// Build and sign a proof
    Build(BuildCmd),

    /// Decode a proof or a delegation
    Decode(DecodeCmd),

    /// Verify a proof, and optionally a delegation for it
    Verify(VerifyCmd),

    /// Delegate the authority of a proof to another key
    Delegate(DelegateCmd),

    /// Check the avalanche options of the configuration
    CheckConfig(CheckConfigCmd),
}

impl Args {
    pub fn new() -> Args {
        Args::parse()
    }

    /// The application home folder, typically `$HOME/.avaproof`.
    pub fn get_home_dir(&self) -> Result<PathBuf> {
        Ok(BaseDirs::new()
            .ok_or_else(|| eyre!("could not determine home directory path"))?
            .home_dir()
            .join(APP_FOLDER))
    }

    /// The configuration file to load, if any.
    ///
    /// An explicit `--config` must exist. The default file is optional.
    pub fn get_config_file_path(&self) -> Result<Option<PathBuf>> {
        if let Some(path) = &self.config {
            return Ok(Some(path.clone()));
        }

        let default = self.get_home_dir()?.join(CONFIG_FILE);
        Ok(default.is_file().then_some(default))
    }

    pub fn load_config(&self) -> Result<Config> {
        let path = self.get_config_file_path()?;
        Ok(load_config(path.as_deref(), None)?)
    }
}
