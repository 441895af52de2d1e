use std::{
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::Duration,
};

use chrono::{DateTime, Utc};
use solana_sdk::{pubkey::Pubkey, signature::Signature};

use crate::{
    db::{claim::ClaimRecord, database::ClaimsDatabase, store::ClaimsStore},
    farcaster::api::IdentityResolver,
    onchain::{
        transfer::TokenTransfer,
        typedefs::{FaucetBalances, UnconfirmedTransfer},
    },
};

use super::claimer::ClaimPolicy;

pub fn policy() -> ClaimPolicy {
    ClaimPolicy {
        require_like: true,
        require_follow: true,
        require_recast: false,
        amount: 333_000,
        ui_amount: 0.000333,
        explorer_tx_url: "https://solscan.io/tx/".to_string(),
        bookkeeping_retries: 2,
        bookkeeping_retry_delay_ms: 0,
    }
}

/// In-memory claims log with injectable failures.
pub struct FlakyStore {
    pub inner: ClaimsDatabase,
    pub append_failures: AtomicUsize,
    pub fail_reads: AtomicBool,
}

impl Default for FlakyStore {
    fn default() -> Self {
        Self {
            inner: ClaimsDatabase::in_memory(),
            append_failures: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
        }
    }
}

impl ClaimsStore for FlakyStore {
    async fn most_recent_claim(&self, fid: u64) -> eyre::Result<Option<DateTime<Utc>>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            eyre::bail!("store unreachable");
        }
        self.inner.most_recent_claim(fid).await
    }

    async fn append(&self, record: ClaimRecord) -> eyre::Result<()> {
        let should_fail = self
            .append_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        if should_fail {
            eyre::bail!("insert rejected");
        }
        self.inner.append(record).await
    }
}

/// Counts transfers and yields long enough for concurrent requests to interleave.
#[derive(Default)]
pub struct FakeTreasury {
    pub transfers: AtomicUsize,
    pub fail_transfers: bool,
    pub unconfirmed: bool,
    pub fail_balances: bool,
}

impl TokenTransfer for FakeTreasury {
    async fn transfer(&self, _payout: &Pubkey, _amount: u64) -> eyre::Result<Signature> {
        self.transfers.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;

        if self.fail_transfers {
            eyre::bail!("simulation reverted");
        }
        if self.unconfirmed {
            return Err(eyre::Report::new(UnconfirmedTransfer {
                signature: Signature::new_unique(),
                reason: "no confirmation within 60s".to_string(),
            }));
        }
        Ok(Signature::new_unique())
    }

    async fn balances(&self) -> eyre::Result<FaucetBalances> {
        if self.fail_balances {
            eyre::bail!("rpc unreachable");
        }
        Ok(FaucetBalances {
            address: Pubkey::new_unique().to_string(),
            sol: 1.5,
            token: "1000".to_string(),
        })
    }
}

pub enum FakeIdentity {
    Verified(Pubkey),
    Unverified,
    Failing,
}

impl FakeIdentity {
    pub const ADDRESS: Pubkey = Pubkey::new_from_array([7; 32]);

    pub fn verified() -> Self {
        FakeIdentity::Verified(Self::ADDRESS)
    }
}

impl IdentityResolver for FakeIdentity {
    async fn verified_address(&self, _fid: u64) -> eyre::Result<Option<Pubkey>> {
        match self {
            FakeIdentity::Verified(address) => Ok(Some(*address)),
            FakeIdentity::Unverified => Ok(None),
            FakeIdentity::Failing => eyre::bail!("hub timed out"),
        }
    }
}
