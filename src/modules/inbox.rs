use std::{path::Path, sync::Arc};

use eyre::WrapErr;
use serde::Serialize;
use tokio::task::JoinSet;

use crate::{
    db::store::ClaimsStore, farcaster::api::IdentityResolver, onchain::transfer::TokenTransfer,
    utils::misc::progress_bar,
};

use super::claimer::{ClaimOutcome, Faucet};

pub const REQUESTS_FILE_PATH: &str = "data/frame_requests.json";
pub const RESPONSES_FILE_PATH: &str = "data/frame_responses.json";

#[derive(Serialize, Debug)]
pub struct FrameResponse {
    pub index: usize,
    pub outcome: ClaimOutcome,
}

/// Runs every payload of the requests file through the faucet concurrently
/// and writes one response per payload, in input order.
pub async fn process_frame_requests<S, T, I>(
    faucet: Arc<Faucet<S, T, I>>,
    requests_path: impl AsRef<Path>,
    responses_path: impl AsRef<Path>,
) -> eyre::Result<Vec<FrameResponse>>
where
    S: ClaimsStore + 'static,
    T: TokenTransfer + 'static,
    I: IdentityResolver + 'static,
{
    let requests_path = requests_path.as_ref();
    let content = tokio::fs::read_to_string(requests_path)
        .await
        .wrap_err_with(|| format!("Failed to read `{}`", requests_path.display()))?;
    let payloads: Vec<serde_json::Value> = serde_json::from_str(&content)
        .wrap_err_with(|| format!("`{}` must hold a JSON array", requests_path.display()))?;

    tracing::info!("Processing {} frame requests", payloads.len());

    let pb = progress_bar(payloads.len() as u64);
    let mut tasks = JoinSet::new();

    for (index, payload) in payloads.into_iter().enumerate() {
        let faucet = Arc::clone(&faucet);
        tasks.spawn(async move { (index, faucet.handle(payload).await) });
    }

    let mut responses = Vec::new();

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => {
                tracing::info!("Request #{}: {}", index, outcome);
                responses.push(FrameResponse { index, outcome });
            }
            Err(e) => tracing::error!("Request task failed: {}", e),
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    responses.sort_by_key(|response| response.index);

    let responses_path = responses_path.as_ref();
    tokio::fs::write(responses_path, serde_json::to_string_pretty(&responses)?)
        .await
        .wrap_err_with(|| format!("Failed to write `{}`", responses_path.display()))?;

    Ok(responses)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;

    use super::*;
    use crate::modules::testing::{policy, FakeIdentity, FakeTreasury, FlakyStore};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "frame-faucet-{}-{}-{}.json",
            name,
            std::process::id(),
            rand::random::<u64>()
        ))
    }

    #[tokio::test]
    async fn processes_batch_in_input_order() {
        let requests_path = temp_path("requests");
        let responses_path = temp_path("responses");

        let action = json!({
            "type": "action",
            "fid": 9,
            "liked_cast": true,
            "follows_caster": true
        });
        let payloads = json!([{ "type": "initial" }, action, action, { "type": "bogus" }]);
        std::fs::write(&requests_path, payloads.to_string()).unwrap();

        let faucet = Arc::new(Faucet::new(
            FlakyStore::default(),
            FakeTreasury::default(),
            FakeIdentity::verified(),
            policy(),
        ));

        let responses = process_frame_requests(Arc::clone(&faucet), &requests_path, &responses_path)
            .await
            .unwrap();

        let indexes: Vec<usize> = responses.iter().map(|response| response.index).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3]);
        assert!(matches!(responses[0].outcome, ClaimOutcome::Home { .. }));
        assert!(matches!(responses[3].outcome, ClaimOutcome::Malformed { .. }));

        let claims = responses
            .iter()
            .filter(|response| matches!(response.outcome, ClaimOutcome::Claimed { .. }))
            .count();
        assert_eq!(claims, 1);
        assert_eq!(faucet.store().inner.len().await, 1);

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&responses_path).unwrap()).unwrap();
        assert_eq!(written[0]["outcome"]["state"], "home");
        assert_eq!(written[3]["outcome"]["state"], "malformed");

        let _ = std::fs::remove_file(&requests_path);
        let _ = std::fs::remove_file(&responses_path);
    }

    #[tokio::test]
    async fn non_array_inbox_is_rejected() {
        let requests_path = temp_path("requests");
        std::fs::write(&requests_path, r#"{"type": "initial"}"#).unwrap();

        let faucet = Arc::new(Faucet::new(
            FlakyStore::default(),
            FakeTreasury::default(),
            FakeIdentity::verified(),
            policy(),
        ));

        assert!(process_frame_requests(faucet, &requests_path, temp_path("responses"))
            .await
            .is_err());

        let _ = std::fs::remove_file(&requests_path);
    }
}
