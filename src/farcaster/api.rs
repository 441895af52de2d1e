use std::{future::Future, str::FromStr};

use reqwest::{Method, Proxy};
use solana_sdk::pubkey::Pubkey;

use crate::utils::fetch::{send_http_request, RequestParams};

use super::{
    constants::VERIFICATIONS_BY_FID,
    schemas::HubMessagesResponse,
    typedefs::Protocol,
};

/// Looks up the payout address a user has verified on their social identity.
pub trait IdentityResolver: Send + Sync {
    fn verified_address(
        &self,
        fid: u64,
    ) -> impl Future<Output = eyre::Result<Option<Pubkey>>> + Send;
}

pub struct HubIdentityResolver {
    hub_url: String,
    proxy: Option<Proxy>,
}

impl HubIdentityResolver {
    pub fn new(hub_url: &str, proxy: Option<&str>) -> eyre::Result<Self> {
        let proxy = proxy.map(Proxy::all).transpose()?;

        Ok(Self {
            hub_url: hub_url.trim_end_matches('/').to_string(),
            proxy,
        })
    }
}

impl IdentityResolver for HubIdentityResolver {
    async fn verified_address(&self, fid: u64) -> eyre::Result<Option<Pubkey>> {
        let url = format!("{}{}", self.hub_url, VERIFICATIONS_BY_FID);
        let fid = fid.to_string();

        let query_args = [("fid", fid.as_str())].into_iter().collect();

        let request_params = RequestParams {
            url: &url,
            method: Method::GET,
            body: None::<serde_json::Value>,
            query_args: Some(query_args),
            proxy: self.proxy.as_ref(),
        };

        let response = send_http_request::<HubMessagesResponse>(request_params).await?;

        Ok(first_solana_address(&response))
    }
}

/// First Solana verification in hub order that parses as a pubkey.
pub fn first_solana_address(response: &HubMessagesResponse) -> Option<Pubkey> {
    response
        .messages
        .iter()
        .filter_map(|message| message.data.as_ref())
        .filter_map(|data| data.verification())
        .filter(|body| body.protocol == Some(Protocol::Solana))
        .find_map(|body| match Pubkey::from_str(&body.address) {
            Ok(pubkey) => Some(pubkey),
            Err(e) => {
                tracing::warn!("Skipping unparsable verified address `{}`: {}", body.address, e);
                None
            }
        })
}
