// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Token ledger
//!
//! Rewards are minted on an EVM chain by the coordinator's funded account.
//! The coordinator only depends on [`TokenLedger`]; [`EthersLedger`] is the
//! JSON-RPC implementation.

pub mod client;
pub mod contract;
pub mod wallet;

use async_trait::async_trait;
use ethers::types::{Address, H256, U256};
use thiserror::Error;

pub use client::{EthersLedger, LedgerConfig};
pub use contract::VolunteerToken;
pub use wallet::{checksum, generate_wallet, parse_address, GeneratedWallet};

/// Decimals of the reward token.
pub const TOKEN_DECIMALS: u32 = 18;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LedgerError {
    #[error("Ledger configuration error: {0}")]
    Config(String),

    #[error("Invalid Ethereum address: {0}")]
    InvalidAddress(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Transaction {0:?} reverted")]
    Reverted(H256),

    #[error("No receipt for transaction {0:?}")]
    NoReceipt(H256),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Mint `amount` base units to `recipient` and wait for it to be mined.
    async fn mint(&self, recipient: Address, amount: U256) -> Result<H256, LedgerError>;
}

/// Whole tokens to base units.
pub fn token_units(tokens: u64) -> U256 {
    U256::from(tokens) * U256::exp10(TOKEN_DECIMALS as usize)
}
