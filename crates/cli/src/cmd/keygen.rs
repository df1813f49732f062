use avaproof_core_types::PrivateKey;
use avaproof_signing_ecdsa::WifNetwork;
use clap::Args;
use color_eyre::eyre::Result;
use rand::rngs::OsRng;
use serde::Serialize;

#[derive(Args, Clone, Debug, Default, PartialEq)]
pub struct KeygenCmd {
    /// Encode the private key for the test network
    #[clap(long)]
    pub testnet: bool,
}

#[derive(Serialize)]
struct KeyPair {
    privatekey: String,
    pubkey: String,
}

impl KeygenCmd {
    pub fn run(&self) -> Result<()> {
        let network = if self.testnet {
            WifNetwork::Testnet
        } else {
            WifNetwork::Mainnet
        };

        let private_key = PrivateKey::generate(OsRng);

        super::print_json(&KeyPair {
            privatekey: private_key.to_wif(network),
            pubkey: private_key.public_key().to_hex(),
        })
    }
}
