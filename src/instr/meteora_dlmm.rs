//! Meteora DLMM 指令解析器

use log::debug;
use once_cell::sync::Lazy;

use super::lift::{self, NewPool};
use super::program_ids::METEORA_DLMM_PROGRAM_ID;
use super::utils::Discriminators;
use crate::core::events::Event;
use crate::core::registry::{HandlerContext, ProgramCategory, ProgramRegistry};
use crate::core::types::Instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DlmmInstruction {
    Swap,
    Swap2,
    /// Two-sided deposit; `sender` at 11.
    AddLiquidity,
    /// Single-token deposit; `sender` at 8.
    AddLiquidityOneSide,
    /// v2 layout (bin arrays passed as remaining accounts); `sender` at 9.
    AddLiquidity2,
    RemoveLiquidity,
    RemoveLiquidity2,
    InitializeLbPair,
}

pub static DISCRIMINATORS: Lazy<Discriminators<DlmmInstruction>> = Lazy::new(|| {
    use DlmmInstruction::*;
    Discriminators::anchor(&[
        ("swap", Swap),
        ("swap_exact_out", Swap),
        ("swap_with_price_impact", Swap),
        ("swap2", Swap2),
        ("swap_exact_out2", Swap2),
        ("add_liquidity", AddLiquidity),
        ("add_liquidity_by_weight", AddLiquidity),
        ("add_liquidity_by_strategy", AddLiquidity),
        ("add_liquidity_one_side", AddLiquidityOneSide),
        ("add_liquidity_by_strategy_one_side", AddLiquidityOneSide),
        ("add_liquidity2", AddLiquidity2),
        ("add_liquidity_by_strategy2", AddLiquidity2),
        ("remove_liquidity", RemoveLiquidity),
        ("remove_liquidity_by_range", RemoveLiquidity),
        ("remove_all_liquidity", RemoveLiquidity),
        ("remove_liquidity2", RemoveLiquidity2),
        ("remove_liquidity_by_range2", RemoveLiquidity2),
        ("initialize_lb_pair", InitializeLbPair),
    ])
});

pub fn register(registry: &mut ProgramRegistry) {
    registry.register(METEORA_DLMM_PROGRAM_ID, "meteora-dlmm", ProgramCategory::Swap, 50, parse_instruction);
}

fn parse_instruction(ix: &mut Instruction, _ctx: &mut HandlerContext<'_>) {
    let Some((kind, _)) = DISCRIMINATORS.split(ix.data()) else {
        return;
    };
    let handled = match kind {
        DlmmInstruction::Swap => parse_swap(ix, false),
        // swap2 may route transfer hooks / memo through extra CPIs
        DlmmInstruction::Swap2 => parse_swap(ix, true),
        DlmmInstruction::AddLiquidity => parse_add_liquidity(ix, 11),
        DlmmInstruction::AddLiquidityOneSide => parse_add_liquidity(ix, 8),
        DlmmInstruction::AddLiquidity2 => parse_add_liquidity(ix, 9),
        DlmmInstruction::RemoveLiquidity => parse_remove_liquidity(ix, 11),
        DlmmInstruction::RemoveLiquidity2 => parse_remove_liquidity(ix, 9),
        DlmmInstruction::InitializeLbPair => parse_initialize_lb_pair(ix),
    };
    if handled.is_none() {
        debug!("meteora dlmm: short account list for {:?} (#{})", kind, ix.seq);
    }
}

/// 账户: lb_pair=0, user=10
fn parse_swap(ix: &mut Instruction, filtered: bool) -> Option<()> {
    let (pool, user) = (ix.account(0)?, ix.account(10)?);
    let swap = if filtered { lift::filtered_swap(ix, pool, user) } else { lift::simple_swap(ix, pool, user) };
    ix.events.push(Event::Swap(swap));
    Some(())
}

/// 账户: position=0, lb_pair=1
fn parse_add_liquidity(ix: &mut Instruction, sender_index: usize) -> Option<()> {
    let mut event = lift::add_liquidity(ix, ix.account(1)?, ix.account(sender_index)?);
    event.token_lp_mint = None;
    ix.events.push(Event::AddLiquidity(event));
    Some(())
}

fn parse_remove_liquidity(ix: &mut Instruction, sender_index: usize) -> Option<()> {
    let mut event = lift::remove_liquidity(ix, ix.account(1)?, ix.account(sender_index)?);
    event.token_lp_burn = None;
    ix.events.push(Event::RemoveLiquidity(event));
    Some(())
}

/// 账户: lb_pair=0, mint_x=2, mint_y=3, reserve_x=4, reserve_y=5, funder=8
fn parse_initialize_lb_pair(ix: &mut Instruction) -> Option<()> {
    let new_pool = NewPool {
        pool: ix.account(0)?,
        user: ix.account(8)?,
        mint_a: ix.account(2)?,
        mint_b: ix.account(3)?,
        vault_a: ix.account(4)?,
        vault_b: ix.account(5)?,
        mint_lp: None,
    };
    new_pool.emit(ix);
    Some(())
}
