//! Stabble 指令解析器 (stable swap / weighted swap / vault)
//!
//! Both swap programs pay the input leg straight into the vault and pull the
//! output leg through a vault `withdraw` CPI, which forwards its transfer.

use log::debug;
use once_cell::sync::Lazy;

use super::lift;
use super::program_ids::{STABBLE_STABLE_SWAP_PROGRAM_ID, STABBLE_VAULT_PROGRAM_ID, STABBLE_WEIGHTED_SWAP_PROGRAM_ID};
use super::utils::{read_u64_le, Discriminators};
use crate::core::events::Event;
use crate::core::registry::{HandlerContext, ProgramCategory, ProgramRegistry};
use crate::core::types::Instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapInstruction {
    /// user=0, pool=6
    Swap,
    /// mints at 1/2 shift the pool to 8
    SwapV2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VaultInstruction {
    Withdraw,
}

pub static SWAP_DISCRIMINATORS: Lazy<Discriminators<SwapInstruction>> =
    Lazy::new(|| Discriminators::anchor(&[("swap", SwapInstruction::Swap), ("swap_v2", SwapInstruction::SwapV2)]));

pub static VAULT_DISCRIMINATORS: Lazy<Discriminators<VaultInstruction>> =
    Lazy::new(|| Discriminators::anchor(&[("withdraw", VaultInstruction::Withdraw)]));

pub fn register(registry: &mut ProgramRegistry) {
    registry
        .register(STABBLE_STABLE_SWAP_PROGRAM_ID, "stabble-stable-swap", ProgramCategory::Swap, 50, parse_swap)
        .register(STABBLE_WEIGHTED_SWAP_PROGRAM_ID, "stabble-weighted-swap", ProgramCategory::Swap, 50, parse_swap)
        .register(STABBLE_VAULT_PROGRAM_ID, "stabble-vault", ProgramCategory::Other, 40, parse_vault);
}

fn parse_swap(ix: &mut Instruction, _ctx: &mut HandlerContext<'_>) {
    let Some((kind, _)) = SWAP_DISCRIMINATORS.split(ix.data()) else {
        return;
    };
    let pool_index = match kind {
        SwapInstruction::Swap => 6,
        SwapInstruction::SwapV2 => 8,
    };
    let (Some(user), Some(pool)) = (ix.account(0), ix.account(pool_index)) else {
        debug!("stabble: short account list for {:?} (#{})", kind, ix.seq);
        return;
    };
    let swap = lift::simple_swap(ix, pool, user);
    ix.events.push(Event::Swap(swap));
}

/// withdraw(amount: u64, fee: u64)
///
/// With a fee the vault pays the beneficiary first, so the user leg is the
/// second child.
fn parse_vault(ix: &mut Instruction, _ctx: &mut HandlerContext<'_>) {
    let Some((VaultInstruction::Withdraw, args)) = VAULT_DISCRIMINATORS.split(ix.data()) else {
        return;
    };
    let Some(fee) = read_u64_le(args, 8) else {
        debug!("stabble vault: truncated withdraw args (#{})", ix.seq);
        return;
    };
    lift::forward(ix, if fee > 0 { 1 } else { 0 });
}
