use avaproof_config::Config;
use clap::Args;
use color_eyre::eyre::Result;

#[derive(Args, Clone, Debug, PartialEq)]
pub struct DecodeCmd {
    /// Hex-encoded proof, or delegation with `--delegation`
    pub hex: String,

    /// Decode a delegation instead of a proof
    #[clap(long)]
    pub delegation: bool,
}

impl DecodeCmd {
    pub fn run(&self, config: &Config) -> Result<()> {
        let service = super::proof_service(config);

        if self.delegation {
            super::print_json(&service.decode_delegation(&self.hex)?)
        } else {
            super::print_json(&service.decode(&self.hex)?)
        }
    }
}
