use avaproof_config::Config;
use avaproof_node::ProofService;
use avaproof_peer::PeerRegistry;
use color_eyre::eyre::Result;
use serde::Serialize;

pub mod build;
pub mod check_config;
pub mod decode;
pub mod delegate;
pub mod keygen;
pub mod verify;

fn proof_service(config: &Config) -> ProofService {
    ProofService::new(config.avalanche.proof_params(), PeerRegistry::new())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
