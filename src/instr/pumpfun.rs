//! PumpFun 指令解析器
//!
//! Bonding-curve trades are directional: the SOL reserve is the bonding
//! curve account itself, the token reserve its associated token account.
//! Sells pay SOL out by editing lamports directly, so that leg has no CPI
//! and is rebuilt from the program's self-CPI `TradeEvent`.

use log::debug;
use once_cell::sync::Lazy;
use solana_sdk::pubkey::Pubkey;

use super::lift::{self, NewPool};
use super::program_ids::PUMPFUN_PROGRAM_ID;
use super::utils::Discriminators;
use crate::core::events::{Event, Swap, Transfer};
use crate::core::registry::{HandlerContext, ProgramCategory, ProgramRegistry};
use crate::core::types::{Instruction, NATIVE_SOL_MINT};
use crate::logs::pump::{parse_trade_event, TradeEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PumpfunInstruction {
    Create,
    Buy,
    Sell,
}

pub static DISCRIMINATORS: Lazy<Discriminators<PumpfunInstruction>> = Lazy::new(|| {
    Discriminators::anchor(&[
        ("create", PumpfunInstruction::Create),
        ("buy", PumpfunInstruction::Buy),
        ("sell", PumpfunInstruction::Sell),
    ])
});

pub fn register(registry: &mut ProgramRegistry) {
    registry.register(PUMPFUN_PROGRAM_ID, "pumpfun", ProgramCategory::Swap, 50, parse_instruction);
}

fn parse_instruction(ix: &mut Instruction, _ctx: &mut HandlerContext<'_>) {
    let Some((kind, _)) = DISCRIMINATORS.split(ix.data()) else {
        return;
    };
    let handled = match kind {
        PumpfunInstruction::Create => parse_create(ix),
        PumpfunInstruction::Buy => parse_trade(ix, true),
        PumpfunInstruction::Sell => parse_trade(ix, false),
    };
    if handled.is_none() {
        debug!("pumpfun: short account list for {:?} (#{})", kind, ix.seq);
    }
}

/// Trade event logged by one of the children.
fn trade_event(ix: &Instruction) -> Option<TradeEvent> {
    ix.children
        .iter()
        .filter(|c| c.program_id() == ix.program_id())
        .find_map(|c| parse_trade_event(c.data()))
}

/// 账户: global=0, fee_recipient=1, mint=2, bonding_curve=3,
/// associated_bonding_curve=4, associated_user=5, user=6
fn parse_trade(ix: &mut Instruction, is_buy: bool) -> Option<()> {
    let bonding_curve = ix.account(3)?;
    let curve_tokens = ix.account(4)?;
    let user = ix.account(6)?;
    let event = trade_event(ix);

    let swap = if is_buy {
        let mut swap = lift::directional_swap(ix, bonding_curve, user, bonding_curve, curve_tokens);
        if swap.input_transfer.is_none() {
            swap.input_transfer = event.map(|e| native(user, bonding_curve, e.sol_amount));
        }
        swap
    } else {
        Swap {
            dex: Some(*ix.program_id()),
            pool: bonding_curve,
            user,
            input_transfer: lift::find_transfer(ix, |t| t.to == curve_tokens),
            output_transfer: event.map(|e| native(bonding_curve, e.user, e.sol_amount)),
        }
    };
    ix.events.push(Event::Swap(swap));
    Some(())
}

fn native(from: Pubkey, to: Pubkey, amount: u64) -> Transfer {
    Transfer { mint: NATIVE_SOL_MINT, from, to, amount }
}

/// 账户: mint=0, mint_authority=1, bonding_curve=2, associated_bonding_curve=3, ..., user=7
fn parse_create(ix: &mut Instruction) -> Option<()> {
    let new_pool = NewPool {
        pool: ix.account(2)?,
        user: ix.account(7)?,
        mint_a: ix.account(0)?,
        mint_b: NATIVE_SOL_MINT,
        vault_a: ix.account(3)?,
        vault_b: ix.account(2)?,
        mint_lp: None,
    };
    new_pool.emit(ix);
    Some(())
}
