//! Phoenix 指令解析器
//!
//! Native program, one tag byte. Phoenix logs through a self-CPI before
//! settling, so the swap legs are the transfer-bearing children.

use super::lift;
use super::program_ids::PHOENIX_PROGRAM_ID;
use super::utils::split_tag;
use crate::core::events::Event;
use crate::core::registry::{HandlerContext, ProgramCategory, ProgramRegistry};
use crate::core::types::Instruction;

pub mod discriminators {
    pub const SWAP: u8 = 0;
}

pub fn register(registry: &mut ProgramRegistry) {
    registry.register(PHOENIX_PROGRAM_ID, "phoenix", ProgramCategory::Swap, 50, parse_instruction);
}

/// 账户: phoenix_program=0, log_authority=1, market=2, trader=3
fn parse_instruction(ix: &mut Instruction, _ctx: &mut HandlerContext<'_>) {
    if !matches!(split_tag(ix.data()), Some((discriminators::SWAP, _))) {
        return;
    }
    if let (Some(pool), Some(user)) = (ix.account(2), ix.account(3)) {
        let swap = lift::filtered_swap(ix, pool, user);
        ix.events.push(Event::Swap(swap));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{keys, node, run, transfer_node};
    use crate::core::types::TransactionMeta;
    use solana_sdk::pubkey::Pubkey;

    #[test]
    fn test_swap_skips_log_cpi() {
        let accounts: [Pubkey; 9] = keys();
        let [base, quote] = keys();
        let log = node(PHOENIX_PROGRAM_ID, &[accounts[1]], vec![15, 1, 2, 3], Vec::new());
        let mut ix = node(
            PHOENIX_PROGRAM_ID,
            &accounts,
            vec![0, 1, 2, 3],
            vec![
                log,
                transfer_node(quote, accounts[5], accounts[7], 1_000),
                transfer_node(base, accounts[6], accounts[4], 10),
            ],
        );
        run(parse_instruction, &mut ix, &mut TransactionMeta::default());

        let swap = ix.events[0].as_swap().unwrap();
        assert_eq!((swap.pool, swap.user), (accounts[2], accounts[3]));
        assert_eq!(swap.input_transfer.as_ref().map(|t| t.mint), Some(quote));
        assert_eq!(swap.output_transfer.as_ref().map(|t| t.mint), Some(base));
    }

    #[test]
    fn test_non_swap_tag() {
        let accounts: [Pubkey; 9] = keys();
        let mut ix = node(PHOENIX_PROGRAM_ID, &accounts, vec![2], Vec::new());
        run(parse_instruction, &mut ix, &mut TransactionMeta::default());
        assert!(ix.events.is_empty());
    }
}
