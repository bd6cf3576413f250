//! Raydium CPMM (CP-Swap) 指令解析器

use log::debug;
use once_cell::sync::Lazy;

use super::lift::{self, NewPool};
use super::program_ids::RAYDIUM_CPMM_PROGRAM_ID;
use super::utils::Discriminators;
use crate::core::events::Event;
use crate::core::registry::{HandlerContext, ProgramCategory, ProgramRegistry};
use crate::core::types::Instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpmmInstruction {
    SwapBaseInput,
    SwapBaseOutput,
    Deposit,
    Withdraw,
    Initialize,
}

pub static DISCRIMINATORS: Lazy<Discriminators<CpmmInstruction>> = Lazy::new(|| {
    use CpmmInstruction::*;
    Discriminators::anchor(&[
        ("swap_base_input", SwapBaseInput),
        ("swap_base_output", SwapBaseOutput),
        ("deposit", Deposit),
        ("withdraw", Withdraw),
        ("initialize", Initialize),
    ])
});

pub fn register(registry: &mut ProgramRegistry) {
    registry.register(RAYDIUM_CPMM_PROGRAM_ID, "raydium-cpmm", ProgramCategory::Swap, 50, parse_instruction);
}

fn parse_instruction(ix: &mut Instruction, _ctx: &mut HandlerContext<'_>) {
    let Some((kind, _)) = DISCRIMINATORS.split(ix.data()) else {
        return;
    };
    let handled = match kind {
        CpmmInstruction::SwapBaseInput | CpmmInstruction::SwapBaseOutput => parse_swap(ix),
        CpmmInstruction::Deposit => parse_deposit(ix),
        CpmmInstruction::Withdraw => parse_withdraw(ix),
        CpmmInstruction::Initialize => parse_initialize(ix),
    };
    if handled.is_none() {
        debug!("raydium cpmm: short account list for {:?} (#{})", kind, ix.seq);
    }
}

/// 账户: payer=0, pool_state=3
fn parse_swap(ix: &mut Instruction) -> Option<()> {
    let swap = lift::simple_swap(ix, ix.account(3)?, ix.account(0)?);
    ix.events.push(Event::Swap(swap));
    Some(())
}

/// 账户: owner=0, pool_state=2
fn parse_deposit(ix: &mut Instruction) -> Option<()> {
    let event = lift::add_liquidity(ix, ix.account(2)?, ix.account(0)?);
    ix.events.push(Event::AddLiquidity(event));
    Some(())
}

fn parse_withdraw(ix: &mut Instruction) -> Option<()> {
    let event = lift::remove_liquidity(ix, ix.account(2)?, ix.account(0)?);
    ix.events.push(Event::RemoveLiquidity(event));
    Some(())
}

/// 账户: creator=0, pool_state=3, mint_0=4, mint_1=5, lp_mint=6, vault_0=10, vault_1=11
fn parse_initialize(ix: &mut Instruction) -> Option<()> {
    let new_pool = NewPool {
        pool: ix.account(3)?,
        user: ix.account(0)?,
        mint_a: ix.account(4)?,
        mint_b: ix.account(5)?,
        vault_a: ix.account(10)?,
        vault_b: ix.account(11)?,
        mint_lp: Some(ix.account(6)?),
    };
    new_pool.emit_with_deposit(ix);
    Some(())
}
