use std::{
    collections::HashMap,
    fmt::{Display, Formatter},
    sync::{Mutex, PoisonError},
};

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use tracing::Instrument;

use crate::{
    config::Config,
    cooldown::evaluator::{evaluate, CooldownDecision},
    db::{claim::ClaimRecord, store::ClaimsStore},
    farcaster::{
        api::IdentityResolver,
        frame::{FrameAction, FrameRequest},
    },
    onchain::{
        transfer::TokenTransfer,
        typedefs::{FaucetBalances, UnconfirmedTransfer},
    },
    utils::misc::backoff_delay,
};

use super::locks::UserLocks;

#[derive(Debug, Clone)]
pub struct ClaimPolicy {
    pub require_like: bool,
    pub require_follow: bool,
    pub require_recast: bool,
    pub amount: u64,
    pub ui_amount: f64,
    pub explorer_tx_url: String,
    pub bookkeeping_retries: u32,
    pub bookkeeping_retry_delay_ms: u64,
}

impl ClaimPolicy {
    pub fn from_config(config: &Config, amount: u64) -> eyre::Result<Self> {
        if amount == 0 {
            eyre::bail!(
                "CLAIM_AMOUNT {} rounds to zero base units for this mint",
                config.claim_amount
            );
        }

        Ok(Self {
            require_like: config.require_like,
            require_follow: config.require_follow,
            require_recast: config.require_recast,
            amount,
            ui_amount: config.claim_amount,
            explorer_tx_url: config.explorer_tx_url.clone(),
            bookkeeping_retries: config.bookkeeping_retries,
            bookkeeping_retry_delay_ms: config.bookkeeping_retry_delay_ms,
        })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub task: String,
    pub done: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ClaimOutcome {
    Home {
        balances: Option<FaucetBalances>,
    },
    Todo {
        items: Vec<TodoItem>,
    },
    NoVerifiedAddress,
    IdentityUnavailable {
        reason: String,
    },
    StoreUnavailable {
        reason: String,
    },
    Wait {
        display_name: Option<String>,
        remaining_seconds: u64,
        formatted: String,
    },
    TransferFailed {
        reason: String,
    },
    // sent, but may or may not have landed
    TransferUnconfirmed {
        signature: String,
        reason: String,
    },
    Claimed {
        signature: String,
        amount: f64,
        explorer_url: String,
    },
    BookkeepingFailed {
        signature: String,
        reason: String,
    },
    Malformed {
        reason: String,
    },
}

impl Display for ClaimOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimOutcome::Home {
                balances: Some(balances),
            } => write!(
                f,
                "Claim tokens! Faucet balance: {} SOL, {} tokens",
                balances.sol, balances.token
            ),
            ClaimOutcome::Home { balances: None } => {
                write!(f, "Claim tokens! Faucet balance unavailable")
            }
            ClaimOutcome::Todo { items } => write!(
                f,
                "@todo list {}",
                items
                    .iter()
                    .map(|item| format!("[{}] {}", if item.done { "x" } else { " " }, item.task))
                    .join(" ")
            ),
            ClaimOutcome::NoVerifiedAddress => {
                write!(f, "You don't have a verified Solana address added to Farcaster")
            }
            ClaimOutcome::IdentityUnavailable { reason } => {
                write!(f, "Verified address lookup failed: {}", reason)
            }
            ClaimOutcome::StoreUnavailable { reason } => {
                write!(f, "Claim history unavailable: {}", reason)
            }
            ClaimOutcome::Wait {
                display_name,
                formatted,
                ..
            } => match display_name {
                Some(name) => write!(f, "GM, {}! wait {}", name, formatted),
                None => write!(f, "GM! wait {}", formatted),
            },
            ClaimOutcome::TransferFailed { reason } => write!(f, "error: {}", reason),
            ClaimOutcome::TransferUnconfirmed { signature, reason } => write!(
                f,
                "payout `{}` sent but not confirmed: {}",
                signature, reason
            ),
            ClaimOutcome::Claimed {
                amount,
                explorer_url,
                ..
            } => write!(f, "you received {} tokens: {}", amount, explorer_url),
            ClaimOutcome::BookkeepingFailed { signature, reason } => write!(
                f,
                "payout `{}` sent but not recorded: {}",
                signature, reason
            ),
            ClaimOutcome::Malformed { reason } => write!(f, "malformed request: {}", reason),
        }
    }
}

pub struct Faucet<S, T, I> {
    store: S,
    treasury: T,
    identity: I,
    policy: ClaimPolicy,
    locks: UserLocks,
    // paid out but not yet in the store
    unrecorded: Mutex<HashMap<u64, ClaimRecord>>,
}

impl<S, T, I> Faucet<S, T, I>
where
    S: ClaimsStore,
    T: TokenTransfer,
    I: IdentityResolver,
{
    pub fn new(store: S, treasury: T, identity: I, policy: ClaimPolicy) -> Self {
        Self {
            store,
            treasury,
            identity,
            policy,
            locks: UserLocks::default(),
            unrecorded: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn handle(&self, payload: serde_json::Value) -> ClaimOutcome {
        match FrameRequest::parse(payload) {
            Ok(request) => self.process(request).await,
            Err(e) => {
                tracing::warn!("{}", e);
                ClaimOutcome::Malformed {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub async fn process(&self, request: FrameRequest) -> ClaimOutcome {
        match request {
            FrameRequest::Initial => self.home().await,
            FrameRequest::Action(action) => {
                let span = tracing::info_span!("claim", fid = action.fid);
                self.claim(action).instrument(span).await
            }
        }
    }

    pub async fn eligibility(&self, fid: u64) -> eyre::Result<CooldownDecision> {
        let last_claimed_at = self.last_claim(fid).await?;
        Ok(evaluate(last_claimed_at, Utc::now()))
    }

    async fn home(&self) -> ClaimOutcome {
        let balances = match self.treasury.balances().await {
            Ok(balances) => Some(balances),
            Err(e) => {
                tracing::warn!("Failed to fetch faucet balances: {}", e);
                None
            }
        };

        ClaimOutcome::Home { balances }
    }

    fn todo_items(&self, action: &FrameAction) -> Vec<TodoItem> {
        [
            (self.policy.require_like, "Like", action.liked_cast),
            (self.policy.require_follow, "Follow", action.follows_caster),
            (self.policy.require_recast, "Recast", action.recasted),
        ]
        .into_iter()
        .filter(|(required, _, _)| *required)
        .map(|(_, task, done)| TodoItem {
            task: task.to_string(),
            done,
        })
        .collect()
    }

    async fn claim(&self, action: FrameAction) -> ClaimOutcome {
        let items = self.todo_items(&action);

        if items.iter().any(|item| !item.done) {
            tracing::info!("Engagement requirements not met");
            return ClaimOutcome::Todo { items };
        }

        let payout = match self.identity.verified_address(action.fid).await {
            Ok(Some(address)) => address,
            Ok(None) => {
                tracing::info!("No verified Solana address");
                return ClaimOutcome::NoVerifiedAddress;
            }
            Err(e) => {
                tracing::error!("Verified address lookup failed: {}", e);
                return ClaimOutcome::IdentityUnavailable {
                    reason: e.to_string(),
                };
            }
        };

        let _guard = self.locks.acquire(action.fid).await;

        self.flush_unrecorded(action.fid).await;

        let last_claimed_at = match self.last_claim(action.fid).await {
            Ok(last_claimed_at) => last_claimed_at,
            Err(e) => {
                tracing::error!("Failed to read claim history: {}", e);
                return ClaimOutcome::StoreUnavailable {
                    reason: e.to_string(),
                };
            }
        };

        let decision = evaluate(last_claimed_at, Utc::now());

        if !decision.eligible {
            tracing::info!("Cooldown active, {} remaining", decision.formatted);
            return ClaimOutcome::Wait {
                display_name: action.display_name,
                remaining_seconds: decision.remaining_seconds(),
                formatted: decision.formatted,
            };
        }

        self.pay_out(&action, &payout).await
    }

    async fn pay_out(&self, action: &FrameAction, payout: &Pubkey) -> ClaimOutcome {
        tracing::info!("Sending {} tokens to `{}`", self.policy.ui_amount, payout);

        let signature = match self.treasury.transfer(payout, self.policy.amount).await {
            Ok(signature) => signature,
            Err(e) => {
                if let Some(unconfirmed) = e.downcast_ref::<UnconfirmedTransfer>() {
                    tracing::error!(
                        "ALERT: payout `{}` to `{}` sent but unconfirmed: {}",
                        unconfirmed.signature,
                        payout,
                        unconfirmed.reason
                    );
                    // block the user as if it landed
                    self.hold_unrecorded(ClaimRecord::new(
                        action.fid,
                        Utc::now(),
                        payout,
                        action.custody_address.clone(),
                        &unconfirmed.signature,
                    ));

                    return ClaimOutcome::TransferUnconfirmed {
                        signature: unconfirmed.signature.to_string(),
                        reason: unconfirmed.reason.clone(),
                    };
                }

                tracing::error!("Transfer failed: {}", e);
                return ClaimOutcome::TransferFailed {
                    reason: e.to_string(),
                };
            }
        };

        let record = ClaimRecord::new(
            action.fid,
            Utc::now(),
            payout,
            action.custody_address.clone(),
            &signature,
        );

        if let Err(e) = self.record_claim(&record).await {
            tracing::error!(
                "ALERT: payout `{}` to `{}` could not be recorded: {}",
                signature,
                payout,
                e
            );
            self.hold_unrecorded(record);

            return ClaimOutcome::BookkeepingFailed {
                signature: signature.to_string(),
                reason: e.to_string(),
            };
        }

        tracing::info!("Claim recorded: `{}`", signature);

        ClaimOutcome::Claimed {
            signature: signature.to_string(),
            amount: self.policy.ui_amount,
            explorer_url: format!("{}{}", self.policy.explorer_tx_url, signature),
        }
    }

    async fn record_claim(&self, record: &ClaimRecord) -> eyre::Result<()> {
        let attempts = self.policy.bookkeeping_retries + 1;
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.store.append(record.clone()).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        "Failed to record claim (attempt {}/{}): {}",
                        attempt,
                        attempts,
                        e
                    );
                    last_error = Some(e);
                }
            }

            if attempt < attempts {
                let delay = backoff_delay(attempt, self.policy.bookkeeping_retry_delay_ms);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| eyre::eyre!("No attempt was made to record the claim")))
    }

    fn hold_unrecorded(&self, record: ClaimRecord) {
        self.unrecorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(record.get_fid(), record);
    }

    // callers hold the user lock
    async fn flush_unrecorded(&self, fid: u64) {
        let pending = self
            .unrecorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&fid);

        let Some(record) = pending else {
            return;
        };

        match self.store.append(record.clone()).await {
            Ok(()) => tracing::info!(
                "Recorded earlier payout `{}` after bookkeeping failure",
                record.get_signature()
            ),
            Err(e) => {
                tracing::error!(
                    "ALERT: payout `{}` still unrecorded: {}",
                    record.get_signature(),
                    e
                );
                self.hold_unrecorded(record);
            }
        }
    }

    async fn last_claim(&self, fid: u64) -> eyre::Result<Option<DateTime<Utc>>> {
        let stored = self.store.most_recent_claim(fid).await?;
        let pending = self
            .unrecorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&fid)
            .map(|record| record.get_claimed_at());

        Ok(stored.max(pending))
    }
}
