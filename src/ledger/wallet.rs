// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Volunteer wallet generation and address helpers.

use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use ethers::utils::to_checksum;

use super::LedgerError;

/// A freshly generated secp256k1 key pair.
#[derive(Clone)]
pub struct GeneratedWallet {
    /// EIP-55 checksummed address
    pub address: String,
    /// `0x`-prefixed hex private key
    pub private_key: String,
}

impl std::fmt::Debug for GeneratedWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedWallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

pub fn generate_wallet() -> GeneratedWallet {
    let wallet = LocalWallet::new(&mut rand::thread_rng());
    GeneratedWallet {
        address: checksum(&wallet.address()),
        private_key: format!("0x{}", hex::encode(wallet.signer().to_bytes())),
    }
}

pub fn checksum(address: &Address) -> String {
    to_checksum(address, None)
}

/// Parse a `0x`-prefixed, 40 hex digit address in any letter case.
pub fn parse_address(value: &str) -> Result<Address, LedgerError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| LedgerError::InvalidAddress(value.to_string()))?;
    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(LedgerError::InvalidAddress(value.to_string()));
    }
    digits
        .parse::<Address>()
        .map_err(|_| LedgerError::InvalidAddress(value.to_string()))
}
