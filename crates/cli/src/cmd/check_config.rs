use avaproof_config::Config;
use avaproof_node::StartupValidator;
use avaproof_peer::PeerRegistry;
use clap::Args;
use color_eyre::eyre::Result;
use serde::Serialize;
use tokio::sync::watch;
use tracing::info;

#[derive(Args, Clone, Debug, Default, PartialEq)]
pub struct CheckConfigCmd {}

#[derive(Serialize)]
struct Status {
    moniker: String,
    session_pubkey: String,
    proofid: Option<String>,
    limitedid: Option<String>,
    delegationid: Option<String>,
}

impl CheckConfigCmd {
    /// Run the startup checks as if the ledger were already synced.
    pub async fn run(&self, config: &Config) -> Result<()> {
        let mut validator = StartupValidator::from_config(&config.avalanche)?;
        let registry = PeerRegistry::new();

        let (_synced_tx, synced_rx) = watch::channel(true);
        let local = validator.run(synced_rx, &registry).await?;
        let proofid = local.map(|local| local.verified.proof_id.to_hex());
        let limitedid = local.map(|local| local.verified.limited_id.to_hex());
        let delegationid = local.map(|local| local.delegation.id().to_hex());

        let status = Status {
            moniker: config.moniker.clone(),
            session_pubkey: validator.session_public_key().to_hex(),
            proofid,
            limitedid,
            delegationid,
        };

        info!(moniker = %config.moniker, "Configuration is valid");
        super::print_json(&status)
    }
}
