use std::{future::Future, str::FromStr, time::Duration};

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig, native_token::lamports_to_sol, pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};

use crate::config::Config;

use super::{
    constants::TOKEN_PROGRAM_ID,
    derive::derive_ata,
    ixs::Instructions,
    state::read_mint_decimals,
    tx::{send_and_confirm_tx, simulate_tx},
    typedefs::{CreateAtaArgs, FaucetBalances, TransferArgs},
};

/// Moves faucet tokens to a payout address.
pub trait TokenTransfer: Send + Sync {
    /// Sends `amount` base units to `payout`. Never retried by callers.
    fn transfer(
        &self,
        payout: &Pubkey,
        amount: u64,
    ) -> impl Future<Output = eyre::Result<Signature>> + Send;

    fn balances(&self) -> impl Future<Output = eyre::Result<FaucetBalances>> + Send;
}

pub struct SplTransferService {
    provider: RpcClient,
    payer: Keypair,
    mint: Pubkey,
    decimals: u8,
    confirm_timeout: Duration,
}

impl SplTransferService {
    pub async fn connect(config: &Config) -> eyre::Result<Self> {
        let provider = RpcClient::new_with_timeout_and_commitment(
            config.solana_rpc_url.clone(),
            Duration::from_secs(60),
            CommitmentConfig::confirmed(),
        );

        let payer = parse_keypair(&config.faucet_private_key)?;
        let mint = Pubkey::from_str(&config.token_mint)
            .map_err(|e| eyre::eyre!("Invalid TOKEN_MINT `{}`: {}", config.token_mint, e))?;
        let decimals = read_mint_decimals(&provider, &mint).await?;

        tracing::info!(
            "Faucet wallet `{}` distributing mint `{}` ({} decimals)",
            payer.pubkey(),
            mint,
            decimals
        );

        Ok(Self {
            provider,
            payer,
            mint,
            decimals,
            confirm_timeout: Duration::from_secs(config.confirm_timeout_secs),
        })
    }

    /// Converts a UI amount into base units of the faucet mint.
    pub fn base_units(&self, ui_amount: f64) -> u64 {
        spl_token::ui_amount_to_amount(ui_amount, self.decimals)
    }
}

impl TokenTransfer for SplTransferService {
    async fn transfer(&self, payout: &Pubkey, amount: u64) -> eyre::Result<Signature> {
        let payer_pubkey = self.payer.pubkey();
        let (source_ata, _) = derive_ata(&payer_pubkey, &self.mint, &TOKEN_PROGRAM_ID);
        let (destination_ata, _) = derive_ata(payout, &self.mint, &TOKEN_PROGRAM_ID);

        let mut ixs = vec![];

        if self.provider.get_account_data(&destination_ata).await.is_err() {
            ixs.push(Instructions::create_ata(CreateAtaArgs {
                funding_address: payer_pubkey,
                associated_account_address: destination_ata,
                wallet_address: *payout,
                token_mint_address: self.mint,
                token_program_id: TOKEN_PROGRAM_ID,
                instruction: 1,
            }));
        }

        ixs.push(Instructions::transfer_tokens(TransferArgs {
            source: source_ata,
            mint: self.mint,
            destination: destination_ata,
            authority: payer_pubkey,
            amount,
            decimals: self.decimals,
        })?);

        let (recent_blockhash, _) = self
            .provider
            .get_latest_blockhash_with_commitment(CommitmentConfig::finalized())
            .await?;

        let tx = Transaction::new_signed_with_payer(
            &ixs,
            Some(&payer_pubkey),
            &[&self.payer],
            recent_blockhash,
        );

        simulate_tx(&self.provider, &tx).await?;

        send_and_confirm_tx(&self.provider, tx, &recent_blockhash, self.confirm_timeout).await
    }

    async fn balances(&self) -> eyre::Result<FaucetBalances> {
        let payer_pubkey = self.payer.pubkey();
        let (source_ata, _) = derive_ata(&payer_pubkey, &self.mint, &TOKEN_PROGRAM_ID);

        let lamports = self.provider.get_balance(&payer_pubkey).await?;
        let token = self.provider.get_token_account_balance(&source_ata).await?;

        Ok(FaucetBalances {
            address: payer_pubkey.to_string(),
            sol: lamports_to_sol(lamports),
            token: token.ui_amount_string,
        })
    }
}

fn parse_keypair(private_key: &str) -> eyre::Result<Keypair> {
    let bytes = solana_sdk::bs58::decode(private_key.trim())
        .into_vec()
        .map_err(|e| eyre::eyre!("FAUCET_PRIVATE_KEY is not base58: {}", e))?;

    Keypair::from_bytes(&bytes).map_err(|e| eyre::eyre!("Invalid FAUCET_PRIVATE_KEY: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_base58_keypair() {
        let keypair = Keypair::new();
        let parsed = parse_keypair(&keypair.to_base58_string()).unwrap();

        assert_eq!(parsed.pubkey(), keypair.pubkey());
    }

    #[test]
    fn rejects_bad_keypair() {
        assert!(parse_keypair("not-base58-0OIl").is_err());
        assert!(parse_keypair("3yZe7d").is_err());
    }
}
