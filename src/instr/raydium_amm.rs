//! Raydium AMM V4 指令解析器
//!
//! Legacy (non-Anchor) program: one leading tag byte.

use log::debug;

use super::lift::{self, NewPool};
use super::program_ids::RAYDIUM_AMM_V4_PROGRAM_ID;
use super::utils::split_tag;
use crate::core::events::Event;
use crate::core::registry::{HandlerContext, ProgramCategory, ProgramRegistry};
use crate::core::types::Instruction;

pub mod discriminators {
    pub const INITIALIZE2: u8 = 1;
    pub const DEPOSIT: u8 = 3;
    pub const WITHDRAW: u8 = 4;
    pub const SWAP_BASE_IN: u8 = 9;
    pub const SWAP_BASE_OUT: u8 = 11;
    pub const SWAP_BASE_IN_V2: u8 = 16;
    pub const SWAP_BASE_OUT_V2: u8 = 17;
}

pub fn register(registry: &mut ProgramRegistry) {
    registry.register(RAYDIUM_AMM_V4_PROGRAM_ID, "raydium-amm-v4", ProgramCategory::Swap, 50, parse_instruction);
}

fn parse_instruction(ix: &mut Instruction, _ctx: &mut HandlerContext<'_>) {
    let Some((tag, _)) = split_tag(ix.data()) else {
        return;
    };
    let handled = match tag {
        discriminators::INITIALIZE2 => parse_initialize2(ix),
        discriminators::DEPOSIT => parse_deposit(ix),
        discriminators::WITHDRAW => parse_withdraw(ix),
        discriminators::SWAP_BASE_IN
        | discriminators::SWAP_BASE_OUT
        | discriminators::SWAP_BASE_IN_V2
        | discriminators::SWAP_BASE_OUT_V2 => parse_swap(ix),
        _ => return,
    };
    if handled.is_none() {
        debug!("raydium amm: malformed instruction tag {} (#{})", tag, ix.seq);
    }
}

/// 账户: amm=1, user = signing owner
fn parse_swap(ix: &mut Instruction) -> Option<()> {
    let pool = ix.account(1)?;
    let user = ix.signer().or_else(|| ix.last_account())?;
    let swap = lift::simple_swap(ix, pool, user);
    ix.events.push(Event::Swap(swap));
    Some(())
}

/// 账户: amm=1, user_owner=12
fn parse_deposit(ix: &mut Instruction) -> Option<()> {
    let pool = ix.account(1)?;
    let user = ix.signer().or_else(|| ix.account(12))?;
    let event = lift::add_liquidity(ix, pool, user);
    ix.events.push(Event::AddLiquidity(event));
    Some(())
}

/// 账户: amm=1, user_owner=18
fn parse_withdraw(ix: &mut Instruction) -> Option<()> {
    let pool = ix.account(1)?;
    let user = ix.signer().or_else(|| ix.account(18))?;
    let event = lift::remove_liquidity(ix, pool, user);
    ix.events.push(Event::RemoveLiquidity(event));
    Some(())
}

/// 账户: amm=4, lp_mint=7, coin_mint=8, pc_mint=9, pool_coin=10, pool_pc=11, user_wallet=17
fn parse_initialize2(ix: &mut Instruction) -> Option<()> {
    let new_pool = NewPool {
        pool: ix.account(4)?,
        user: ix.account(17)?,
        mint_a: ix.account(8)?,
        mint_b: ix.account(9)?,
        vault_a: ix.account(10)?,
        vault_b: ix.account(11)?,
        mint_lp: Some(ix.account(7)?),
    };
    new_pool.emit_with_deposit(ix);
    Some(())
}
