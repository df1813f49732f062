use std::path::PathBuf;

use avaproof_config::Config;
use avaproof_node::StakeRequest;
use clap::Args;
use color_eyre::eyre::{eyre, Result, WrapErr};

#[derive(Args, Clone, Debug, PartialEq)]
pub struct BuildCmd {
    /// Proof sequence number
    #[clap(long, default_value_t = 0)]
    pub sequence: u64,

    /// Expiration timestamp
    #[clap(long, default_value_t = 0, allow_negative_numbers = true)]
    pub expiration: i64,

    /// Hex-encoded compressed public key of the proof master
    #[clap(long)]
    pub master: String,

    /// JSON array of stakes, each with txid, vout, amount, height, iscoinbase and privatekey
    #[clap(long, conflicts_with = "stakes_file")]
    pub stakes: Option<String>,

    /// File holding the JSON array of stakes
    #[clap(long, value_name = "FILE")]
    pub stakes_file: Option<PathBuf>,
}

impl BuildCmd {
    pub fn run(&self, config: &Config) -> Result<()> {
        let stakes = self.stakes()?;

        let proof = super::proof_service(config).build(
            self.sequence,
            self.expiration,
            &self.master,
            &stakes,
        )?;

        println!("{proof}");
        Ok(())
    }

    fn stakes(&self) -> Result<Vec<StakeRequest>> {
        let json = match (&self.stakes, &self.stakes_file) {
            (Some(json), _) => json.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read {}", path.display()))?,
            (None, None) => return Err(eyre!("either --stakes or --stakes-file is required")),
        };

        serde_json::from_str(&json).wrap_err("invalid stakes")
    }
}
