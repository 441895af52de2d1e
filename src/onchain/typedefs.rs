use serde::Serialize;
use solana_sdk::{pubkey::Pubkey, signature::Signature};

pub struct CreateAtaArgs {
    pub funding_address: Pubkey,
    pub associated_account_address: Pubkey,
    pub wallet_address: Pubkey,
    pub token_mint_address: Pubkey,
    pub token_program_id: Pubkey,
    pub instruction: u8,
}

#[derive(Debug)]
pub struct TransferArgs {
    pub source: Pubkey,
    pub mint: Pubkey,
    pub destination: Pubkey,
    pub authority: Pubkey,
    pub amount: u64,
    pub decimals: u8,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FaucetBalances {
    pub address: String,
    pub sol: f64,
    pub token: String,
}

/// A transaction was sent but its fate is unknown; it may still land.
#[derive(Debug)]
pub struct UnconfirmedTransfer {
    pub signature: Signature,
    pub reason: String,
}

impl std::fmt::Display for UnconfirmedTransfer {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "transaction `{}` unconfirmed: {}", self.signature, self.reason)
    }
}

impl std::error::Error for UnconfirmedTransfer {}
