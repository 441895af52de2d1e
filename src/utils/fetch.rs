use std::collections::HashMap;

use reqwest::{Method, Proxy};
use serde::{de::DeserializeOwned, Serialize};

pub struct RequestParams<'a, S: Serialize> {
    pub url: &'a str,
    pub method: Method,
    pub body: Option<S>,
    pub query_args: Option<HashMap<&'a str, &'a str>>,
    pub proxy: Option<&'a Proxy>,
}

pub async fn send_http_request<R: DeserializeOwned>(
    request_params: RequestParams<'_, impl Serialize>,
) -> eyre::Result<R> {
    let mut client_builder = reqwest::Client::builder();

    if let Some(proxy) = request_params.proxy {
        client_builder = client_builder.proxy(proxy.clone());
    }

    let client = client_builder.build()?;

    let mut request = client.request(request_params.method, request_params.url);

    if let Some(query_args) = &request_params.query_args {
        request = request.query(query_args);
    }

    if let Some(body) = &request_params.body {
        request = request.json(body);
    }

    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        eyre::bail!("Request to {} failed with {}: {}", request_params.url, status, text);
    }

    serde_json::from_str::<R>(&text).map_err(|e| {
        tracing::error!("Failed to deserialize response from {}: {}", request_params.url, text);
        eyre::eyre!("Failed to deserialize response: {}", e)
    })
}
