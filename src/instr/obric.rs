//! Obric V2 指令解析器 (方向性 swap)

use borsh::BorshDeserialize;
use log::debug;
use once_cell::sync::Lazy;

use super::lift;
use super::program_ids::OBRIC_V2_PROGRAM_ID;
use super::utils::Discriminators;
use crate::core::events::Event;
use crate::core::registry::{HandlerContext, ProgramCategory, ProgramRegistry};
use crate::core::types::Instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObricInstruction {
    Swap,
}

pub static DISCRIMINATORS: Lazy<Discriminators<ObricInstruction>> =
    Lazy::new(|| Discriminators::anchor(&[("swap", ObricInstruction::Swap)]));

#[derive(Debug, BorshDeserialize)]
pub struct SwapArgs {
    pub is_x_to_y: bool,
    pub input_amt: u64,
    pub min_output_amt: u64,
}

pub fn register(registry: &mut ProgramRegistry) {
    registry.register(OBRIC_V2_PROGRAM_ID, "obric-v2", ProgramCategory::Swap, 50, parse_instruction);
}

/// 账户: trading_pair=0, reserve_x=3, reserve_y=4, user=10
fn parse_instruction(ix: &mut Instruction, _ctx: &mut HandlerContext<'_>) {
    let Some((ObricInstruction::Swap, mut payload)) = DISCRIMINATORS.split(ix.data()) else {
        return;
    };
    let Ok(args) = SwapArgs::deserialize(&mut payload) else {
        debug!("obric: undecodable swap args (#{})", ix.seq);
        return;
    };
    let (Some(pool), Some(reserve_x), Some(reserve_y), Some(user)) =
        (ix.account(0), ix.account(3), ix.account(4), ix.account(10))
    else {
        return;
    };
    let (input_reserve, output_reserve) =
        if args.is_x_to_y { (reserve_x, reserve_y) } else { (reserve_y, reserve_x) };
    let swap = lift::directional_swap(ix, pool, user, input_reserve, output_reserve);
    ix.events.push(Event::Swap(swap));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{anchor_data, keys, node, run, transfer_node};
    use crate::core::types::TransactionMeta;
    use crate::instr::utils::anchor_discriminator;
    use solana_sdk::pubkey::Pubkey;

    fn swap(is_x_to_y: bool, accounts: &[Pubkey], children: Vec<Instruction>) -> Instruction {
        node(
            OBRIC_V2_PROGRAM_ID,
            accounts,
            anchor_data(anchor_discriminator("swap"), &(is_x_to_y, 100u64, 90u64)),
            children,
        )
    }

    #[test]
    fn test_y_to_x_picks_reserves_by_direction() {
        let accounts: [Pubkey; 14] = keys();
        let [mint_x, mint_y, user_x, user_y] = keys();
        let (reserve_x, reserve_y) = (accounts[3], accounts[4]);
        let mut ix = swap(
            false,
            &accounts,
            vec![
                // output is paid before the input lands
                transfer_node(mint_x, reserve_x, user_x, 95),
                transfer_node(mint_y, user_y, reserve_y, 100),
            ],
        );
        run(parse_instruction, &mut ix, &mut TransactionMeta::default());

        let swap = ix.events[0].as_swap().unwrap();
        assert_eq!((swap.pool, swap.user), (accounts[0], accounts[10]));
        assert_eq!(swap.input_transfer.as_ref().map(|t| t.amount), Some(100));
        assert_eq!(swap.output_transfer.as_ref().map(|t| t.amount), Some(95));
    }

    #[test]
    fn test_truncated_args() {
        let accounts: [Pubkey; 14] = keys();
        let mut data = anchor_discriminator("swap").to_vec();
        data.push(1);
        let mut ix = node(OBRIC_V2_PROGRAM_ID, &accounts, data, Vec::new());
        run(parse_instruction, &mut ix, &mut TransactionMeta::default());
        assert!(ix.events.is_empty());
    }
}
