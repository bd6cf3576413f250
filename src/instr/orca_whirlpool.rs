//! Orca Whirlpool 指令解析器
//!
//! V2 instructions may invoke the memo program between the two token
//! transfers, so legs are taken from transfer-bearing children only.

use log::debug;
use once_cell::sync::Lazy;

use super::lift::{self, NewPool};
use super::program_ids::ORCA_WHIRLPOOL_PROGRAM_ID;
use super::utils::Discriminators;
use crate::core::events::Event;
use crate::core::registry::{HandlerContext, ProgramCategory, ProgramRegistry};
use crate::core::types::Instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WhirlpoolInstruction {
    Swap,
    SwapV2,
    IncreaseLiquidity,
    IncreaseLiquidityV2,
    DecreaseLiquidity,
    DecreaseLiquidityV2,
    InitializePool,
    InitializePoolV2,
}

pub static DISCRIMINATORS: Lazy<Discriminators<WhirlpoolInstruction>> = Lazy::new(|| {
    use WhirlpoolInstruction::*;
    Discriminators::anchor(&[
        ("swap", Swap),
        ("swap_v2", SwapV2),
        ("increase_liquidity", IncreaseLiquidity),
        ("increase_liquidity_v2", IncreaseLiquidityV2),
        ("decrease_liquidity", DecreaseLiquidity),
        ("decrease_liquidity_v2", DecreaseLiquidityV2),
        ("initialize_pool", InitializePool),
        ("initialize_pool_v2", InitializePoolV2),
    ])
});

pub fn register(registry: &mut ProgramRegistry) {
    registry.register(ORCA_WHIRLPOOL_PROGRAM_ID, "orca-whirlpool", ProgramCategory::Swap, 50, parse_instruction);
}

fn parse_instruction(ix: &mut Instruction, _ctx: &mut HandlerContext<'_>) {
    let Some((kind, _)) = DISCRIMINATORS.split(ix.data()) else {
        return;
    };
    use WhirlpoolInstruction::*;
    let handled = match kind {
        // whirlpool=2, token_owner_account_a=3
        Swap => parse_swap(ix, 2, 3),
        // whirlpool=4, token_owner_account_a=7
        SwapV2 => parse_swap(ix, 4, 7),
        // whirlpool=0, position_authority=2 (v2: 4)
        IncreaseLiquidity => parse_liquidity(ix, 2, true),
        IncreaseLiquidityV2 => parse_liquidity(ix, 4, true),
        DecreaseLiquidity => parse_liquidity(ix, 2, false),
        DecreaseLiquidityV2 => parse_liquidity(ix, 4, false),
        // mint_a=1, mint_b=2, funder=3, whirlpool=4, vault_a=5, vault_b=6
        InitializePool => parse_initialize_pool(ix, 3),
        // token badges at 3/4 shift the rest by two
        InitializePoolV2 => parse_initialize_pool(ix, 5),
    };
    if handled.is_none() {
        debug!("whirlpool: short account list for {:?} (#{})", kind, ix.seq);
    }
}

fn parse_swap(ix: &mut Instruction, pool_index: usize, user_index: usize) -> Option<()> {
    let swap = lift::filtered_swap(ix, ix.account(pool_index)?, ix.account(user_index)?);
    ix.events.push(Event::Swap(swap));
    Some(())
}

fn parse_liquidity(ix: &mut Instruction, user_index: usize, increase: bool) -> Option<()> {
    let pool = ix.account(0)?;
    let user = ix.account(user_index)?;
    let event = if increase {
        let mut add = lift::add_liquidity(ix, pool, user);
        add.token_lp_mint = None;
        Event::AddLiquidity(add)
    } else {
        let mut remove = lift::remove_liquidity(ix, pool, user);
        remove.token_lp_burn = None;
        Event::RemoveLiquidity(remove)
    };
    ix.events.push(event);
    Some(())
}

fn parse_initialize_pool(ix: &mut Instruction, funder_index: usize) -> Option<()> {
    let new_pool = NewPool {
        pool: ix.account(funder_index + 1)?,
        user: ix.account(funder_index)?,
        mint_a: ix.account(1)?,
        mint_b: ix.account(2)?,
        vault_a: ix.account(funder_index + 2)?,
        vault_b: ix.account(funder_index + 3)?,
        mint_lp: None,
    };
    new_pool.emit(ix);
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::Receipt;
    use crate::core::testing::{anchor_data, keys, node, run, transfer_node};
    use crate::core::types::TransactionMeta;
    use crate::instr::utils::anchor_discriminator;
    use solana_sdk::pubkey::Pubkey;

    fn swap_args() -> (u64, u64, u128, bool, bool) {
        (1_000, 1, 0, true, true)
    }

    #[test]
    fn test_swap_v2_user_is_token_owner_a() {
        let accounts: [Pubkey; 15] = keys();
        let [mint_a, mint_b] = keys();
        let memo = node(Pubkey::new_unique(), &[], b"memo".to_vec(), Vec::new());
        let mut ix = node(
            ORCA_WHIRLPOOL_PROGRAM_ID,
            &accounts,
            anchor_data(anchor_discriminator("swap_v2"), &swap_args()),
            vec![
                transfer_node(mint_a, accounts[7], accounts[8], 1_000),
                memo,
                transfer_node(mint_b, accounts[10], accounts[9], 990),
            ],
        );
        run(parse_instruction, &mut ix, &mut TransactionMeta::default());

        assert_eq!(ix.events.len(), 1);
        let swap = ix.events[0].as_swap().unwrap();
        assert_eq!(swap.pool, accounts[4]);
        assert_eq!(swap.user, accounts[7]);
        assert_eq!(swap.output_transfer.as_ref().map(|t| t.amount), Some(990));
    }

    #[test]
    fn test_swap_v1_accounts() {
        let accounts: [Pubkey; 11] = keys();
        let mut ix = node(
            ORCA_WHIRLPOOL_PROGRAM_ID,
            &accounts,
            anchor_data(anchor_discriminator("swap"), &swap_args()),
            Vec::new(),
        );
        run(parse_instruction, &mut ix, &mut TransactionMeta::default());
        let swap = ix.events[0].as_swap().unwrap();
        assert_eq!((swap.pool, swap.user), (accounts[2], accounts[3]));
        assert!(swap.input_transfer.is_none());
    }

    #[test]
    fn test_liquidity_legs_come_from_two_children() {
        let accounts: [Pubkey; 11] = keys();
        let [mint_a, mint_b] = keys();
        let mut ix = node(
            ORCA_WHIRLPOOL_PROGRAM_ID,
            &accounts,
            anchor_data(anchor_discriminator("increase_liquidity"), &(1u128, 10u64, 20u64)),
            vec![
                transfer_node(mint_a, accounts[5], accounts[7], 10),
                transfer_node(mint_b, accounts[6], accounts[8], 20),
            ],
        );
        run(parse_instruction, &mut ix, &mut TransactionMeta::default());

        let Event::AddLiquidity(add) = &ix.events[0] else { panic!("expected AddLiquidity") };
        assert_eq!((add.pool, add.user), (accounts[0], accounts[2]));
        assert_eq!(add.token_a_transfer.as_ref().map(|t| t.mint), Some(mint_a));
        assert_eq!(add.token_b_transfer.as_ref().map(|t| t.mint), Some(mint_b));
    }

    #[test]
    fn test_decrease_liquidity_legs_and_no_lp_burn() {
        let accounts: [Pubkey; 11] = keys();
        let [mint_a, mint_b] = keys();
        let mut ix = node(
            ORCA_WHIRLPOOL_PROGRAM_ID,
            &accounts,
            anchor_data(anchor_discriminator("decrease_liquidity"), &(1u128, 10u64, 20u64)),
            vec![
                transfer_node(mint_a, accounts[7], accounts[5], 11),
                transfer_node(mint_b, accounts[8], accounts[6], 22),
            ],
        );
        run(parse_instruction, &mut ix, &mut TransactionMeta::default());

        let Event::RemoveLiquidity(remove) = &ix.events[0] else { panic!("expected RemoveLiquidity") };
        assert_eq!((remove.pool, remove.user), (accounts[0], accounts[2]));
        assert_eq!(remove.token_a_transfer.as_ref().map(|t| (t.mint, t.amount)), Some((mint_a, 11)));
        assert_eq!(remove.token_b_transfer.as_ref().map(|t| (t.mint, t.amount)), Some((mint_b, 22)));
        assert!(remove.token_lp_burn.is_none());
    }

    #[test]
    fn test_decrease_liquidity_v2_skips_memo() {
        let accounts: [Pubkey; 15] = keys();
        let [mint_a, mint_b] = keys();
        let memo = || node(Pubkey::new_unique(), &[], b"memo".to_vec(), Vec::new());
        let mut ix = node(
            ORCA_WHIRLPOOL_PROGRAM_ID,
            &accounts,
            anchor_data(anchor_discriminator("decrease_liquidity_v2"), &(1u128, 10u64, 20u64, Option::<u8>::None)),
            vec![
                memo(),
                transfer_node(mint_a, accounts[11], accounts[9], 11),
                memo(),
                transfer_node(mint_b, accounts[12], accounts[10], 22),
            ],
        );
        run(parse_instruction, &mut ix, &mut TransactionMeta::default());

        let Event::RemoveLiquidity(remove) = &ix.events[0] else { panic!("expected RemoveLiquidity") };
        assert_eq!((remove.pool, remove.user), (accounts[0], accounts[4]));
        assert_eq!(remove.token_a_transfer.as_ref().map(|t| t.mint), Some(mint_a));
        assert_eq!(remove.token_b_transfer.as_ref().map(|t| t.mint), Some(mint_b));
    }

    #[test]
    fn test_initialize_pool_v2() {
        let accounts: [Pubkey; 14] = keys();
        let mut ix = node(
            ORCA_WHIRLPOOL_PROGRAM_ID,
            &accounts,
            anchor_data(anchor_discriminator("initialize_pool_v2"), &(64u16, 1u128 << 64)),
            Vec::new(),
        );
        run(parse_instruction, &mut ix, &mut TransactionMeta::default());

        let Event::CreatePool(create) = &ix.events[0] else { panic!("expected CreatePool") };
        assert_eq!(create.pool, accounts[6]);
        assert_eq!(create.user, accounts[5]);
        assert_eq!(create.accounts, vec![accounts[7], accounts[8]]);
        let Receipt::Pool(pool) = &ix.receipts[0];
        assert_eq!((pool.mint_a, pool.mint_b), (accounts[1], accounts[2]));
    }

    #[test]
    fn test_swap_without_accounts_emits_nothing() {
        let mut ix = node(ORCA_WHIRLPOOL_PROGRAM_ID, &[], anchor_discriminator("swap").to_vec(), Vec::new());
        run(parse_instruction, &mut ix, &mut TransactionMeta::default());
        assert!(ix.events.is_empty());
    }
}
