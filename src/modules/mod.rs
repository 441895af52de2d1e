mod claimer;
mod inbox;
mod locks;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use dialoguer::{theme::ColorfulTheme, Input, Select};

use crate::{
    config::Config,
    cooldown::evaluator::evaluate_iso,
    db::database::ClaimsDatabase,
    farcaster::{api::HubIdentityResolver, frame::FrameRequest},
    onchain::transfer::SplTransferService,
};

use claimer::{ClaimPolicy, Faucet};
use inbox::{process_frame_requests, REQUESTS_FILE_PATH, RESPONSES_FILE_PATH};

const LOGO: &str = r#"
   __                                __                      _
  / _|_ __ __ _ _ __ ___   ___      / _| __ _ _   _  ___ ___| |_
 | |_| '__/ _` | '_ ` _ \ / _ \    | |_ / _` | | | |/ __/ _ \ __|
 |  _| | | (_| | | | | | |  __/    |  _| (_| | |_| | (_|  __/ |_
 |_| |_|  \__,_|_| |_| |_|\___|    |_|  \__,_|\__,_|\___\___|\__|
"#;

type AppFaucet = Faucet<ClaimsDatabase, SplTransferService, HubIdentityResolver>;

async fn connect(config: &Config) -> eyre::Result<Arc<AppFaucet>> {
    let store = ClaimsDatabase::read().await?;
    let treasury = SplTransferService::connect(config).await?;
    let identity = HubIdentityResolver::new(&config.hub_http_url, config.hub_proxy())?;

    let amount = treasury.base_units(config.claim_amount);
    let policy = ClaimPolicy::from_config(config, amount)?;

    Ok(Arc::new(Faucet::new(store, treasury, identity, policy)))
}

async fn ensure_faucet<'a>(
    slot: &'a mut Option<Arc<AppFaucet>>,
    config: &Config,
) -> eyre::Result<&'a Arc<AppFaucet>> {
    if slot.is_none() {
        *slot = Some(connect(config).await?);
    }

    slot.as_ref()
        .ok_or_else(|| eyre::eyre!("Faucet failed to initialize"))
}

fn prompt_optional(prompt: &str) -> eyre::Result<Option<String>> {
    let value: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;

    Ok(match value.trim() {
        "" => None,
        value => Some(value.to_string()),
    })
}

async fn show_status(faucet: &AppFaucet) {
    let outcome = faucet.process(FrameRequest::Initial).await;
    tracing::info!("{}", outcome);
}

fn evaluate_timestamps() -> eyre::Result<()> {
    let last_claimed_at = prompt_optional("Last claim (ISO-8601, empty for none)")?;
    let now = prompt_optional("Now (ISO-8601, empty for current time)")?;

    let report = evaluate_iso(last_claimed_at.as_deref(), now.as_deref())?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

async fn check_fid(faucet: &AppFaucet) -> eyre::Result<()> {
    let fid: u64 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("FID")
        .interact_text()?;

    match faucet.store().latest_record(fid).await {
        Some(record) => tracing::info!(
            "Last claim at {} to `{}` from custody `{}` (tx `{}`)",
            record.get_claimed_at(),
            record.get_payout_address(),
            record.get_source_address().unwrap_or("-"),
            record.get_signature()
        ),
        None => tracing::info!("FID {} has never claimed", fid),
    }

    let decision = faucet.eligibility(fid).await?;

    if decision.eligible {
        tracing::info!("FID {} can claim now", fid);
    } else {
        tracing::info!("FID {} must wait {}", fid, decision.formatted);
    }

    Ok(())
}

pub async fn menu() -> eyre::Result<()> {
    let config = Config::read_default().await?;
    let mut slot: Option<Arc<AppFaucet>> = None;

    println!("{LOGO}");

    loop {
        let options = vec![
            "Show faucet status",
            "Evaluate cooldown from timestamps",
            "Check FID eligibility",
            "Process frame requests",
            "Exit",
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Choice:")
            .items(&options)
            .default(0)
            .interact()?;

        let result = match selection {
            0 => match ensure_faucet(&mut slot, &config).await {
                Ok(faucet) => {
                    show_status(faucet).await;
                    Ok(())
                }
                Err(e) => Err(e),
            },
            1 => evaluate_timestamps(),
            2 => match ensure_faucet(&mut slot, &config).await {
                Ok(faucet) => check_fid(faucet).await,
                Err(e) => Err(e),
            },
            3 => match ensure_faucet(&mut slot, &config).await {
                Ok(faucet) => process_frame_requests(
                    Arc::clone(faucet),
                    REQUESTS_FILE_PATH,
                    RESPONSES_FILE_PATH,
                )
                .await
                .map(|responses| {
                    tracing::info!(
                        "Wrote {} responses to `{}`",
                        responses.len(),
                        RESPONSES_FILE_PATH
                    )
                }),
                Err(e) => Err(e),
            },
            4 => {
                return Ok(());
            }
            _ => {
                tracing::error!("Invalid selection");
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::error!("{}", e);
        }
    }
}
