use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use solana_sdk::{pubkey::Pubkey, signature::Signature};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClaimRecord {
    fid: u64,
    claimed_at: DateTime<Utc>,
    payout_address: String,
    source_address: Option<String>,
    signature: String,
}

impl ClaimRecord {
    pub fn new(
        fid: u64,
        claimed_at: DateTime<Utc>,
        payout_address: &Pubkey,
        source_address: Option<String>,
        signature: &Signature,
    ) -> Self {
        Self {
            fid,
            claimed_at,
            payout_address: payout_address.to_string(),
            source_address,
            signature: signature.to_string(),
        }
    }

    pub fn get_fid(&self) -> u64 {
        self.fid
    }

    pub fn get_claimed_at(&self) -> DateTime<Utc> {
        self.claimed_at
    }

    pub fn get_payout_address(&self) -> &str {
        &self.payout_address
    }

    pub fn get_source_address(&self) -> Option<&str> {
        self.source_address.as_deref()
    }

    pub fn get_signature(&self) -> &str {
        &self.signature
    }
}
