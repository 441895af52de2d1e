use solana_program::instruction::{AccountMeta, Instruction};

use super::{
    constants::{ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID},
    typedefs::{CreateAtaArgs, TransferArgs},
};

pub struct Instructions {}

impl Instructions {
    pub fn create_ata(args: CreateAtaArgs) -> Instruction {
        Instruction {
            program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
            accounts: vec![
                AccountMeta::new(args.funding_address, true),
                AccountMeta::new(args.associated_account_address, false),
                AccountMeta::new_readonly(args.wallet_address, false),
                AccountMeta::new_readonly(args.token_mint_address, false),
                AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
                AccountMeta::new_readonly(args.token_program_id, false),
            ],
            data: vec![args.instruction],
        }
    }

    pub fn transfer_tokens(args: TransferArgs) -> eyre::Result<Instruction> {
        let ix = spl_token::instruction::transfer_checked(
            &TOKEN_PROGRAM_ID,
            &args.source,
            &args.mint,
            &args.destination,
            &args.authority,
            &[&args.authority],
            args.amount,
            args.decimals,
        )?;

        Ok(ix)
    }
}
