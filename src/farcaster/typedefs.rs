use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    #[serde(rename = "PROTOCOL_ETHEREUM")]
    Ethereum,
    #[serde(rename = "PROTOCOL_SOLANA")]
    Solana,
}
