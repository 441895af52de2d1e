use std::time::Duration;

use itertools::Itertools;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, signature::Signature,
    transaction::Transaction,
};
use solana_transaction_status::{TransactionConfirmationStatus, TransactionStatus};

use crate::utils::misc::spinner;

use super::{constants::CONFIRM_POLL_INTERVAL_MS, typedefs::UnconfirmedTransfer};

pub async fn simulate_tx(provider: &RpcClient, tx: &Transaction) -> eyre::Result<()> {
    let simulation = provider.simulate_transaction(tx).await?.value;

    if let Some(err) = simulation.err {
        let logs = simulation.logs.unwrap_or_default().iter().join("\n");
        tracing::error!("Simulation logs:\n{}", logs);
        eyre::bail!("Transaction simulation failed: {}", err);
    }

    Ok(())
}

pub async fn send_and_confirm_tx(
    provider: &RpcClient,
    tx: Transaction,
    recent_blockhash: &Hash,
    timeout: Duration,
) -> eyre::Result<Signature> {
    let signature = provider.send_transaction(&tx).await?;

    tracing::info!("Sent transaction: `{}`", signature);

    let pb = spinner(format!("Confirming {}", signature));

    let result = tokio::time::timeout(
        timeout,
        wait_for_confirmation(provider, &signature, recent_blockhash),
    )
    .await;

    pb.finish_and_clear();

    match result {
        Ok(Ok(())) => {
            tracing::info!("Transaction confirmed: `{}`", signature);
            Ok(signature)
        }
        Ok(Err(e)) => Err(e),
        Err(_) => Err(eyre::Report::new(UnconfirmedTransfer {
            signature,
            reason: format!("no confirmation within {}s", timeout.as_secs()),
        })),
    }
}

#[derive(Debug, PartialEq)]
enum ConfirmationState {
    Landed,
    Failed(String),
    Pending,
    NotFound,
}

fn confirmation_state(status: Option<&TransactionStatus>) -> ConfirmationState {
    let Some(status) = status else {
        return ConfirmationState::NotFound;
    };

    if let Some(err) = &status.err {
        return ConfirmationState::Failed(err.to_string());
    }

    match status.confirmation_status {
        Some(TransactionConfirmationStatus::Confirmed)
        | Some(TransactionConfirmationStatus::Finalized) => ConfirmationState::Landed,
        _ => ConfirmationState::Pending,
    }
}

// Only a failed status or an expired blockhash ends the loop early, RPC
// errors are retried until the caller's timeout.
async fn wait_for_confirmation(
    provider: &RpcClient,
    signature: &Signature,
    recent_blockhash: &Hash,
) -> eyre::Result<()> {
    let poll_interval = Duration::from_millis(CONFIRM_POLL_INTERVAL_MS);

    loop {
        match provider.get_signature_statuses(&[*signature]).await {
            Ok(response) => {
                match confirmation_state(response.value.first().and_then(Option::as_ref)) {
                    ConfirmationState::Landed => return Ok(()),
                    ConfirmationState::Failed(err) => {
                        eyre::bail!("Transaction `{}` failed: {}", signature, err)
                    }
                    ConfirmationState::Pending => {}
                    ConfirmationState::NotFound => match provider
                        .is_blockhash_valid(recent_blockhash, CommitmentConfig::processed())
                        .await
                    {
                        Ok(true) => {}
                        Ok(false) => {
                            eyre::bail!("Blockhash expired before `{}` landed", signature)
                        }
                        Err(e) => tracing::warn!("Blockhash check failed, retrying: {}", e),
                    },
                }
            }
            Err(e) => tracing::warn!("Status poll for `{}` failed, retrying: {}", signature, e),
        }

        tokio::time::sleep(poll_interval).await;
    }
}
