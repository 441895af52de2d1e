use std::path::Path;

use eyre::WrapErr;
use serde::Deserialize;

const CONFIG_FILE_PATH: &str = "data/config.toml";

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    pub solana_rpc_url: String,
    pub faucet_private_key: String,
    pub token_mint: String,
    pub claim_amount: f64,
    pub hub_http_url: String,
    #[serde(default)]
    pub hub_proxy: String,
    #[serde(default = "default_true")]
    pub require_like: bool,
    #[serde(default = "default_true")]
    pub require_follow: bool,
    #[serde(default)]
    pub require_recast: bool,
    pub explorer_tx_url: String,
    #[serde(default = "default_bookkeeping_retries")]
    pub bookkeeping_retries: u32,
    #[serde(default = "default_bookkeeping_retry_delay_ms")]
    pub bookkeeping_retry_delay_ms: u64,
    #[serde(default = "default_confirm_timeout_secs")]
    pub confirm_timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_bookkeeping_retries() -> u32 {
    3
}

fn default_bookkeeping_retry_delay_ms() -> u64 {
    500
}

fn default_confirm_timeout_secs() -> u64 {
    60
}

impl Config {
    pub async fn read_from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .wrap_err_with(|| format!("Failed to read config at `{}`", path.display()))?;

        Self::parse(&content)
    }

    pub async fn read_default() -> eyre::Result<Self> {
        Self::read_from_file(CONFIG_FILE_PATH).await
    }

    pub fn parse(content: &str) -> eyre::Result<Self> {
        let config: Config = toml::from_str(content).wrap_err("Invalid config.toml")?;

        if !config.claim_amount.is_finite() || config.claim_amount <= 0.0 {
            eyre::bail!("CLAIM_AMOUNT must be positive, got {}", config.claim_amount);
        }

        Ok(config)
    }

    pub fn hub_proxy(&self) -> Option<&str> {
        match self.hub_proxy.trim() {
            "" => None,
            proxy => Some(proxy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
SOLANA_RPC_URL = "https://api.devnet.solana.com"
FAUCET_PRIVATE_KEY = "key"
TOKEN_MINT = "So11111111111111111111111111111111111111112"
CLAIM_AMOUNT = 0.000333
HUB_HTTP_URL = "http://localhost:2281"
EXPLORER_TX_URL = "https://solscan.io/tx/"
"#;

    #[test]
    fn parses_with_defaults() {
        let config = Config::parse(SAMPLE).unwrap();

        assert!(config.require_like);
        assert!(config.require_follow);
        assert!(!config.require_recast);
        assert_eq!(config.bookkeeping_retries, 3);
        assert_eq!(config.confirm_timeout_secs, 60);
        assert_eq!(config.hub_proxy(), None);
    }

    #[test]
    fn rejects_non_positive_amount() {
        let content = SAMPLE.replace("0.000333", "0.0");
        assert!(Config::parse(&content).is_err());
    }

    #[test]
    fn rejects_nan_and_infinite_amounts() {
        for amount in ["nan", "inf", "-inf"] {
            let content = SAMPLE.replace("0.000333", amount);
            assert!(Config::parse(&content).is_err(), "{amount}");
        }
    }
}
