//! Meteora dynamic vault 指令解析器
//!
//! The vault only wraps a token transfer (plus its own LP bookkeeping), so
//! its handlers forward the transfer event unchanged. Pools that deposit
//! into vaults then see a plain `Transfer` on the vault child.

use once_cell::sync::Lazy;

use super::lift;
use super::program_ids::METEORA_VAULT_PROGRAM_ID;
use super::utils::Discriminators;
use crate::core::registry::{HandlerContext, ProgramCategory, ProgramRegistry};
use crate::core::types::Instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VaultInstruction {
    Deposit,
    Withdraw,
    WithdrawDirectlyFromStrategy,
}

pub static DISCRIMINATORS: Lazy<Discriminators<VaultInstruction>> = Lazy::new(|| {
    use VaultInstruction::*;
    Discriminators::anchor(&[
        ("deposit", Deposit),
        ("withdraw", Withdraw),
        ("withdraw_directly_from_strategy", WithdrawDirectlyFromStrategy),
    ])
});

pub fn register(registry: &mut ProgramRegistry) {
    registry.register(METEORA_VAULT_PROGRAM_ID, "meteora-vault", ProgramCategory::Other, 40, parse_instruction);
}

fn parse_instruction(ix: &mut Instruction, _ctx: &mut HandlerContext<'_>) {
    let Some((kind, _)) = DISCRIMINATORS.split(ix.data()) else {
        return;
    };
    match kind {
        // transfer 在前, 随后 mint LP
        VaultInstruction::Deposit => lift::forward(ix, 0),
        // burn LP 在前; strategy 提取可能先有其他 CPI
        VaultInstruction::Withdraw | VaultInstruction::WithdrawDirectlyFromStrategy => {
            lift::forward_first_transfer(ix)
        }
    }
}
