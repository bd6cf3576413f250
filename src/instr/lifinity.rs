//! Lifinity V2 指令解析器

use once_cell::sync::Lazy;

use super::lift;
use super::program_ids::LIFINITY_V2_PROGRAM_ID;
use super::utils::Discriminators;
use crate::core::events::Event;
use crate::core::registry::{HandlerContext, ProgramCategory, ProgramRegistry};
use crate::core::types::Instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifinityInstruction {
    Swap,
}

pub static DISCRIMINATORS: Lazy<Discriminators<LifinityInstruction>> =
    Lazy::new(|| Discriminators::anchor(&[("swap", LifinityInstruction::Swap)]));

pub fn register(registry: &mut ProgramRegistry) {
    registry.register(LIFINITY_V2_PROGRAM_ID, "lifinity-v2", ProgramCategory::Swap, 50, parse_instruction);
}

/// 账户: authority=0, amm=1, user_transfer_authority=2
fn parse_instruction(ix: &mut Instruction, _ctx: &mut HandlerContext<'_>) {
    if DISCRIMINATORS.split(ix.data()).is_none() {
        return;
    }
    if let (Some(pool), Some(user)) = (ix.account(1), ix.account(2)) {
        let swap = lift::simple_swap(ix, pool, user);
        ix.events.push(Event::Swap(swap));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{anchor_data, keys, node, run, transfer_node};
    use crate::core::types::TransactionMeta;
    use crate::instr::utils::anchor_discriminator;
    use solana_sdk::pubkey::Pubkey;

    #[test]
    fn test_swap() {
        let accounts: [Pubkey; 13] = keys();
        let [mint_a, mint_b] = keys();
        let mut ix = node(
            LIFINITY_V2_PROGRAM_ID,
            &accounts,
            anchor_data(anchor_discriminator("swap"), &(10u64, 9u64)),
            vec![
                transfer_node(mint_a, accounts[3], accounts[5], 10),
                transfer_node(mint_b, accounts[6], accounts[4], 9),
            ],
        );
        run(parse_instruction, &mut ix, &mut TransactionMeta::default());
        let swap = ix.events[0].as_swap().unwrap();
        assert_eq!((swap.pool, swap.user), (accounts[1], accounts[2]));
        assert_eq!(swap.output_transfer.as_ref().map(|t| t.amount), Some(9));
    }

    #[test]
    fn test_other_instruction_is_ignored() {
        let accounts: [Pubkey; 3] = keys();
        let mut ix = node(LIFINITY_V2_PROGRAM_ID, &accounts, anchor_discriminator("deposit_all_token_types").to_vec(), Vec::new());
        run(parse_instruction, &mut ix, &mut TransactionMeta::default());
        assert!(ix.events.is_empty());
    }
}
