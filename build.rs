use std::{fs, io::Write, path::Path};

fn main() {
    let data_path = Path::new("./data");
    let claims_path = data_path.join("claims.json");
    let requests_path = data_path.join("frame_requests.json");
    let config_path = data_path.join("config.toml");

    if !data_path.exists() {
        fs::create_dir_all(data_path).unwrap();
    }

    if !claims_path.exists() {
        fs::write(&claims_path, "[]").unwrap();
    }

    if !requests_path.exists() {
        fs::write(&requests_path, "[]").unwrap();
    }

    if !config_path.exists() {
        let mut config_file = fs::File::create(&config_path).unwrap();
        let config_content = r#"SOLANA_RPC_URL = ""                          # rpc url
FAUCET_PRIVATE_KEY = ""                      # base58 keypair of the faucet wallet
TOKEN_MINT = ""                              # spl mint handed out by the faucet
CLAIM_AMOUNT = 0.000333                      # ui amount sent per claim
HUB_HTTP_URL = "https://hub.pinata.cloud"    # farcaster hub http api
HUB_PROXY = ""                               # optional proxy for hub requests
REQUIRE_LIKE = true                          # user must like the cast
REQUIRE_FOLLOW = true                        # user must follow the caster
REQUIRE_RECAST = false                       # user must recast the cast
EXPLORER_TX_URL = "https://solscan.io/tx/"   # explorer link prefix
BOOKKEEPING_RETRIES = 3                      # claim log append retries after a payout
BOOKKEEPING_RETRY_DELAY_MS = 500             # base delay between append retries
CONFIRM_TIMEOUT_SECS = 60                    # tx confirmation timeout
"#;
        config_file.write_all(config_content.as_bytes()).unwrap();
    }

    println!("cargo:rerun-if-changed=build.rs");
}
