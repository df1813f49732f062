use color_eyre::eyre::Result;
use tracing::debug;

use crate::args::{Args, Commands};

mod args;
mod cmd;
mod logging;

#[tokio::main(flavor = "current_thread")]
pub async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::new();
    let config = args.load_config()?;

    logging::init(config.logging, &args.debug);
    debug!("Command-line parameters: {args:?}");

    match &args.command {
        Commands::Keygen(cmd) => cmd.run(),
        Commands::Build(cmd) => cmd.run(&config),
        Commands::Decode(cmd) => cmd.run(&config),
        Commands::Verify(cmd) => cmd.run(&config),
        Commands::Delegate(cmd) => cmd.run(&config),
        Commands::CheckConfig(cmd) => cmd.run(&config).await,
    }
}
