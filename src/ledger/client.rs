// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use async_trait::async_trait;
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, H256, U256, U64},
};
use std::sync::Arc;
use tracing::{error, info};

use super::contract::VolunteerToken;
use super::wallet::{checksum, parse_address};
use super::{LedgerError, TokenLedger};

type LedgerSigner = SignerMiddleware<Provider<Http>, LocalWallet>;

#[derive(Clone)]
pub struct LedgerConfig {
    pub rpc_url: String,
    pub private_key: String,
    pub contract_address: String,
    /// Queried from the node when `None`.
    pub chain_id: Option<u64>,
    pub confirmations: usize,
    /// Send pre-EIP-1559 transactions. Ganache and some dev chains need this.
    pub legacy: bool,
}

impl std::fmt::Debug for LedgerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerConfig")
            .field("rpc_url", &self.rpc_url)
            .field("contract_address", &self.contract_address)
            .field("chain_id", &self.chain_id)
            .field("confirmations", &self.confirmations)
            .field("legacy", &self.legacy)
            .finish_non_exhaustive()
    }
}

/// Mints rewards through the `VolunteerToken` contract.
pub struct EthersLedger {
    contract: VolunteerToken<LedgerSigner>,
    minter: Address,
    confirmations: usize,
    legacy: bool,
}

impl EthersLedger {
    pub async fn connect(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| LedgerError::Config(format!("invalid RPC url: {}", e)))?;

        let key = config.private_key.trim_start_matches("0x");
        let wallet = key
            .parse::<LocalWallet>()
            .map_err(|e| LedgerError::Config(format!("failed to parse private key: {}", e)))?;

        let chain_id = match config.chain_id {
            Some(id) => id,
            None => provider
                .get_chainid()
                .await
                .map_err(|e| LedgerError::Rpc(e.to_string()))?
                .as_u64(),
        };
        let wallet = wallet.with_chain_id(chain_id);
        let minter = wallet.address();

        let contract_address = parse_address(&config.contract_address)
            .map_err(|_| LedgerError::Config(format!("invalid contract address: {}", config.contract_address)))?;

        let client = Arc::new(SignerMiddleware::new(provider, wallet));
        let contract = VolunteerToken::new(contract_address, client);

        info!(
            minter = %checksum(&minter),
            contract = %checksum(&contract_address),
            chain_id,
            "Connected token ledger"
        );

        Ok(Self {
            contract,
            minter,
            confirmations: config.confirmations,
            legacy: config.legacy,
        })
    }

    pub fn minter(&self) -> Address {
        self.minter
    }
}

#[async_trait]
impl TokenLedger for EthersLedger {
    async fn mint(&self, recipient: Address, amount: U256) -> Result<H256, LedgerError> {
        let mut call = self.contract.mint(recipient, amount).from(self.minter);
        if self.legacy {
            call = call.legacy();
        }

        let pending = call
            .send()
            .await
            .map_err(|e| LedgerError::Rpc(e.to_string()))?;
        let tx_hash = pending.tx_hash();
        info!(to = %checksum(&recipient), %amount, tx = ?tx_hash, "Mint submitted");

        let receipt = pending
            .confirmations(self.confirmations)
            .await
            .map_err(|e| LedgerError::Rpc(e.to_string()))?
            .ok_or(LedgerError::NoReceipt(tx_hash))?;

        if receipt.status == Some(U64::zero()) {
            error!(tx = ?tx_hash, "Mint reverted");
            return Err(LedgerError::Reverted(tx_hash));
        }

        Ok(tx_hash)
    }
}
