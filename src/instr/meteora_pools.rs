//! Meteora Pools (dynamic AMM) 指令解析器
//!
//! Token legs move through Meteora vault CPIs; the vault handlers forward
//! the transfer, so each vault child carries the leg as its first event.

use log::debug;
use once_cell::sync::Lazy;

use super::lift;
use super::program_ids::METEORA_POOLS_PROGRAM_ID;
use super::utils::Discriminators;
use crate::core::events::Event;
use crate::core::registry::{HandlerContext, ProgramCategory, ProgramRegistry};
use crate::core::types::Instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolsInstruction {
    Swap,
    AddBalanceLiquidity,
    AddImbalanceLiquidity,
    RemoveBalanceLiquidity,
    RemoveLiquiditySingleSide,
}

pub static DISCRIMINATORS: Lazy<Discriminators<PoolsInstruction>> = Lazy::new(|| {
    use PoolsInstruction::*;
    Discriminators::anchor(&[
        ("swap", Swap),
        ("add_balance_liquidity", AddBalanceLiquidity),
        ("add_imbalance_liquidity", AddImbalanceLiquidity),
        ("remove_balance_liquidity", RemoveBalanceLiquidity),
        ("remove_liquidity_single_side", RemoveLiquiditySingleSide),
    ])
});

pub fn register(registry: &mut ProgramRegistry) {
    registry.register(METEORA_POOLS_PROGRAM_ID, "meteora-pools", ProgramCategory::Swap, 50, parse_instruction);
}

fn parse_instruction(ix: &mut Instruction, _ctx: &mut HandlerContext<'_>) {
    let Some((kind, _)) = DISCRIMINATORS.split(ix.data()) else {
        return;
    };
    let handled = match kind {
        PoolsInstruction::Swap => parse_swap(ix),
        PoolsInstruction::AddBalanceLiquidity | PoolsInstruction::AddImbalanceLiquidity => parse_add_liquidity(ix),
        PoolsInstruction::RemoveBalanceLiquidity => parse_remove_liquidity(ix, 13),
        PoolsInstruction::RemoveLiquiditySingleSide => parse_remove_liquidity(ix, 12),
    };
    if handled.is_none() {
        debug!("meteora pools: short account list for {:?} (#{})", kind, ix.seq);
    }
}

/// 账户: pool=0, user=12
fn parse_swap(ix: &mut Instruction) -> Option<()> {
    let swap = lift::simple_swap(ix, ix.account(0)?, ix.account(12)?);
    ix.events.push(Event::Swap(swap));
    Some(())
}

/// 账户: pool=0, lp_mint=1, user=13
fn parse_add_liquidity(ix: &mut Instruction) -> Option<()> {
    let lp_mint = ix.account(1)?;
    let mut event = lift::add_liquidity(ix, ix.account(0)?, ix.account(13)?);
    event.token_lp_mint = event.token_lp_mint.filter(|m| m.mint == lp_mint);
    ix.events.push(Event::AddLiquidity(event));
    Some(())
}

fn parse_remove_liquidity(ix: &mut Instruction, user_index: usize) -> Option<()> {
    let lp_mint = ix.account(1)?;
    let mut event = lift::remove_liquidity(ix, ix.account(0)?, ix.account(user_index)?);
    event.token_lp_burn = event.token_lp_burn.filter(|b| b.mint == lp_mint);
    ix.events.push(Event::RemoveLiquidity(event));
    Some(())
}
