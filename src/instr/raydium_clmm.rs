//! Raydium CLMM 指令解析器
//!
//! Anchor program; discriminators are derived from the instruction names.

use log::debug;
use once_cell::sync::Lazy;

use super::lift::{self, NewPool};
use super::program_ids::RAYDIUM_CLMM_PROGRAM_ID;
use super::utils::Discriminators;
use crate::core::events::Event;
use crate::core::registry::{HandlerContext, ProgramCategory, ProgramRegistry};
use crate::core::types::Instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClmmInstruction {
    Swap,
    SwapV2,
    CreatePool,
    IncreaseLiquidity,
    IncreaseLiquidityV2,
    DecreaseLiquidity,
    DecreaseLiquidityV2,
    OpenPositionV2,
    OpenPositionWithToken22Nft,
}

pub static DISCRIMINATORS: Lazy<Discriminators<ClmmInstruction>> = Lazy::new(|| {
    use ClmmInstruction::*;
    Discriminators::anchor(&[
        ("swap", Swap),
        ("swap_v2", SwapV2),
        ("create_pool", CreatePool),
        ("increase_liquidity", IncreaseLiquidity),
        ("increase_liquidity_v2", IncreaseLiquidityV2),
        ("decrease_liquidity", DecreaseLiquidity),
        ("decrease_liquidity_v2", DecreaseLiquidityV2),
        ("open_position_v2", OpenPositionV2),
        ("open_position_with_token22_nft", OpenPositionWithToken22Nft),
    ])
});

pub fn register(registry: &mut ProgramRegistry) {
    registry.register(RAYDIUM_CLMM_PROGRAM_ID, "raydium-clmm", ProgramCategory::Swap, 50, parse_instruction);
}

fn parse_instruction(ix: &mut Instruction, _ctx: &mut HandlerContext<'_>) {
    let Some((kind, _)) = DISCRIMINATORS.split(ix.data()) else {
        return;
    };
    let handled = match kind {
        ClmmInstruction::Swap | ClmmInstruction::SwapV2 => parse_swap(ix),
        ClmmInstruction::CreatePool => parse_create_pool(ix),
        // 账户: nft_owner=0, pool_state=2
        ClmmInstruction::IncreaseLiquidity | ClmmInstruction::IncreaseLiquidityV2 => parse_add_liquidity(ix, 2),
        ClmmInstruction::OpenPositionV2 => parse_add_liquidity(ix, 5),
        ClmmInstruction::OpenPositionWithToken22Nft => parse_add_liquidity(ix, 4),
        // 账户: nft_owner=0, pool_state=3
        ClmmInstruction::DecreaseLiquidity | ClmmInstruction::DecreaseLiquidityV2 => parse_remove_liquidity(ix),
    };
    if handled.is_none() {
        debug!("raydium clmm: short account list for {:?} (#{})", kind, ix.seq);
    }
}

/// 账户: payer=0, amm_config=1, pool_state=2
fn parse_swap(ix: &mut Instruction) -> Option<()> {
    let swap = lift::simple_swap(ix, ix.account(2)?, ix.account(0)?);
    ix.events.push(Event::Swap(swap));
    Some(())
}

/// Position NFTs are minted to the owner; CLMM has no fungible LP token.
fn parse_add_liquidity(ix: &mut Instruction, pool_index: usize) -> Option<()> {
    let mut event = lift::add_liquidity(ix, ix.account(pool_index)?, ix.account(0)?);
    event.token_lp_mint = None;
    ix.events.push(Event::AddLiquidity(event));
    Some(())
}

fn parse_remove_liquidity(ix: &mut Instruction) -> Option<()> {
    let mut event = lift::remove_liquidity(ix, ix.account(3)?, ix.account(0)?);
    event.token_lp_burn = None;
    ix.events.push(Event::RemoveLiquidity(event));
    Some(())
}

/// 账户: pool_creator=0, pool_state=2, mint_0=3, mint_1=4, vault_0=5, vault_1=6
fn parse_create_pool(ix: &mut Instruction) -> Option<()> {
    let new_pool = NewPool {
        pool: ix.account(2)?,
        user: ix.account(0)?,
        mint_a: ix.account(3)?,
        mint_b: ix.account(4)?,
        vault_a: ix.account(5)?,
        vault_b: ix.account(6)?,
        mint_lp: None,
    };
    new_pool.emit(ix);
    Some(())
}
