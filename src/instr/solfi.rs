//! SolFi 指令解析器 (方向性 swap)
//!
//! swap 数据: tag(7) | amount_in u64 | min_amount_out u64 | direction u8
//! direction 1 = quote -> base.

use super::lift;
use super::program_ids::SOLFI_PROGRAM_ID;
use super::utils::{read_u8, split_tag};
use crate::core::events::Event;
use crate::core::registry::{HandlerContext, ProgramCategory, ProgramRegistry};
use crate::core::types::Instruction;

pub mod discriminators {
    pub const SWAP: u8 = 7;
}

const DIRECTION_OFFSET: usize = 16;

pub fn register(registry: &mut ProgramRegistry) {
    registry.register(SOLFI_PROGRAM_ID, "solfi", ProgramCategory::Swap, 50, parse_instruction);
}

/// 账户: user=0, pair=1, base_vault=2, quote_vault=3
fn parse_instruction(ix: &mut Instruction, _ctx: &mut HandlerContext<'_>) {
    let Some((discriminators::SWAP, payload)) = split_tag(ix.data()) else {
        return;
    };
    let Some(direction) = read_u8(payload, DIRECTION_OFFSET) else {
        return;
    };
    let (Some(user), Some(pool), Some(base_vault), Some(quote_vault)) =
        (ix.account(0), ix.account(1), ix.account(2), ix.account(3))
    else {
        return;
    };
    let (input_vault, output_vault) =
        if direction == 1 { (quote_vault, base_vault) } else { (base_vault, quote_vault) };
    let swap = lift::directional_swap(ix, pool, user, input_vault, output_vault);
    ix.events.push(Event::Swap(swap));
}
