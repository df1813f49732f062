use avaproof_config::Config;
use clap::Args;
use color_eyre::eyre::Result;

#[derive(Args, Clone, Debug, PartialEq)]
pub struct DelegateCmd {
    /// Hex-encoded proof
    #[clap(long)]
    pub proof: String,

    /// Private key of the current authority, as WIF or hex
    #[clap(long, env = "AVAPROOF_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// Hex-encoded public key receiving the authority
    #[clap(long)]
    pub delegate: String,

    /// Existing delegation to extend
    #[clap(long)]
    pub delegation: Option<String>,
}

impl DelegateCmd {
    pub fn run(&self, config: &Config) -> Result<()> {
        let delegation = super::proof_service(config).delegate(
            &self.proof,
            &self.private_key,
            &self.delegate,
            self.delegation.as_deref(),
        )?;

        println!("{delegation}");
        Ok(())
    }
}
