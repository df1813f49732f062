use avaproof_config::Config;
use clap::Args;
use color_eyre::eyre::Result;

#[derive(Args, Clone, Debug, PartialEq)]
pub struct VerifyCmd {
    /// Hex-encoded proof
    pub proof: String,

    /// Hex-encoded delegation to verify along with the proof
    #[clap(long)]
    pub delegation: Option<String>,
}

impl VerifyCmd {
    pub fn run(&self, config: &Config) -> Result<()> {
        let service = super::proof_service(config);

        let valid = match &self.delegation {
            Some(delegation) => service.verify_delegation(&self.proof, delegation)?,
            None => service.verify(&self.proof)?,
        };

        println!("{valid}");
        Ok(())
    }
}
