use solana_sdk::pubkey::Pubkey;

use super::constants::ASSOCIATED_TOKEN_PROGRAM_ID;

pub fn derive_ata(owner: &Pubkey, token_mint: &Pubkey, token_program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            &owner.to_bytes(),
            &token_program_id.to_bytes(),
            &token_mint.to_bytes(),
        ],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onchain::constants::TOKEN_PROGRAM_ID;

    #[test]
    fn ata_is_stable_and_owner_specific() {
        let mint = Pubkey::new_unique();
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();

        let (alice_ata, _) = derive_ata(&alice, &mint, &TOKEN_PROGRAM_ID);

        assert_eq!(derive_ata(&alice, &mint, &TOKEN_PROGRAM_ID).0, alice_ata);
        assert_ne!(derive_ata(&bob, &mint, &TOKEN_PROGRAM_ID).0, alice_ata);
    }
}
