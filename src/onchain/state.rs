use solana_client::nonblocking::rpc_client::RpcClient;
use solana_program::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use spl_token::state::Mint;

use super::constants::TOKEN_PROGRAM_ID;

pub async fn read_mint_decimals(provider: &RpcClient, mint: &Pubkey) -> eyre::Result<u8> {
    let account = provider.get_account(mint).await?;

    if account.owner != TOKEN_PROGRAM_ID {
        eyre::bail!("Mint `{}` is not owned by the token program", mint);
    }

    let mint_state = Mint::unpack(&account.data)?;

    Ok(mint_state.decimals)
}
