//! 语义提升: 从子指令事件合成高层事件
//!
//! DEX handlers run after their CPIs have been interpreted, so the token
//! movements of a swap or a deposit are already present as child `Transfer`
//! / `MintTo` / `Burn` events. The helpers here assemble them.

use solana_sdk::pubkey::Pubkey;

use crate::core::events::{
    AddLiquidity, Burn, CreatePool, Event, MintTo, PoolReceipt, Receipt, RemoveLiquidity, Swap, Transfer,
};
use crate::core::types::Instruction;

/// First event of `children[i]`, if it is a transfer.
#[inline]
pub fn child_transfer(ix: &Instruction, i: usize) -> Option<Transfer> {
    ix.children.get(i)?.events.first()?.as_transfer().cloned()
}

/// Children whose first event is a transfer, in execution order.
pub fn transfer_children(ix: &Instruction) -> impl Iterator<Item = &Instruction> {
    ix.children
        .iter()
        .filter(|c| c.events.first().is_some_and(|e| e.as_transfer().is_some()))
}

/// `n`-th transfer among the transfer-bearing children.
pub fn nth_child_transfer(ix: &Instruction, n: usize) -> Option<Transfer> {
    transfer_children(ix).nth(n)?.events.first()?.as_transfer().cloned()
}

/// First transfer in the subtree (pre-order) matching `pred`.
pub fn find_transfer(ix: &Instruction, pred: impl Fn(&Transfer) -> bool) -> Option<Transfer> {
    ix.descendants()
        .flat_map(|d| d.events.iter())
        .filter_map(Event::as_transfer)
        .find(|t| pred(*t))
        .cloned()
}

fn child_mint_to(ix: &Instruction) -> Option<MintTo> {
    ix.children.iter().flat_map(|c| c.events.iter()).find_map(Event::as_mint_to).cloned()
}

fn child_burn(ix: &Instruction) -> Option<Burn> {
    ix.children.iter().flat_map(|c| c.events.iter()).find_map(Event::as_burn).cloned()
}

/// Pattern S: `children[0]` is the input leg, `children[1]` the output leg.
pub fn simple_swap(ix: &Instruction, pool: Pubkey, user: Pubkey) -> Swap {
    Swap {
        dex: Some(*ix.program_id()),
        pool,
        user,
        input_transfer: child_transfer(ix, 0),
        output_transfer: child_transfer(ix, 1),
    }
}

/// Pattern S over transfer-bearing children only; programs that interleave
/// other CPIs (memo, logging) between the two legs.
pub fn filtered_swap(ix: &Instruction, pool: Pubkey, user: Pubkey) -> Swap {
    Swap {
        dex: Some(*ix.program_id()),
        pool,
        user,
        input_transfer: nth_child_transfer(ix, 0),
        output_transfer: nth_child_transfer(ix, 1),
    }
}

/// Pattern D: first transfer into the input reserve, first transfer out of
/// the output reserve.
pub fn directional_swap(
    ix: &Instruction,
    pool: Pubkey,
    user: Pubkey,
    input_reserve: Pubkey,
    output_reserve: Pubkey,
) -> Swap {
    Swap {
        dex: Some(*ix.program_id()),
        pool,
        user,
        input_transfer: find_transfer(ix, |t| t.to == input_reserve),
        output_transfer: find_transfer(ix, |t| t.from == output_reserve),
    }
}

/// Deposit: two token legs plus the LP mint, if any.
pub fn add_liquidity(ix: &Instruction, pool: Pubkey, user: Pubkey) -> AddLiquidity {
    AddLiquidity {
        pool,
        user,
        token_a_transfer: nth_child_transfer(ix, 0),
        token_b_transfer: nth_child_transfer(ix, 1),
        token_lp_mint: child_mint_to(ix),
    }
}

/// Withdrawal: LP burn plus the two token legs.
pub fn remove_liquidity(ix: &Instruction, pool: Pubkey, user: Pubkey) -> RemoveLiquidity {
    RemoveLiquidity {
        pool,
        user,
        token_a_transfer: nth_child_transfer(ix, 0),
        token_b_transfer: nth_child_transfer(ix, 1),
        token_lp_burn: child_burn(ix),
    }
}

/// Forwarder: expose one child's events as this node's own.
pub fn forward(ix: &mut Instruction, child: usize) {
    if let Some(events) = ix.children.get(child).map(|c| c.events.clone()) {
        ix.events.extend(events);
    }
}

/// Forwarder over the first transfer-bearing child.
pub fn forward_first_transfer(ix: &mut Instruction) {
    if let Some(pos) = ix.children.iter().position(|c| c.events.first().is_some_and(|e| e.as_transfer().is_some())) {
        forward(ix, pos);
    }
}

/// New-pool description shared by the pool-creating instructions.
pub struct NewPool {
    pub pool: Pubkey,
    pub user: Pubkey,
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
    pub vault_a: Pubkey,
    pub vault_b: Pubkey,
    pub mint_lp: Option<Pubkey>,
}

impl NewPool {
    pub fn create_pool(&self) -> CreatePool {
        CreatePool {
            pool: self.pool,
            tokens: vec![self.mint_a, self.mint_b],
            accounts: vec![self.vault_a, self.vault_b],
            user: self.user,
        }
    }

    /// Pool receipt; reserves are the initial deposits when known.
    pub fn receipt(&self, reserve_a: u64, reserve_b: u64) -> Receipt {
        Receipt::Pool(PoolReceipt {
            hash: self.pool,
            mint_a: self.mint_a,
            mint_b: self.mint_b,
            mint_lp: self.mint_lp,
            vault_a: self.vault_a,
            vault_b: self.vault_b,
            reserve_a,
            reserve_b,
        })
    }

    /// Pool creation with the initial deposit made by the same instruction:
    /// emits `CreatePool` + `AddLiquidity` and a pool receipt.
    pub fn emit_with_deposit(&self, ix: &mut Instruction) {
        let token_a_transfer = find_transfer(ix, |t| t.to == self.vault_a);
        let token_b_transfer = find_transfer(ix, |t| t.to == self.vault_b);
        let token_lp_mint = ix
            .descendants()
            .flat_map(|d| d.events.iter())
            .filter_map(Event::as_mint_to)
            .filter(|m| self.mint_lp.map_or(true, |lp| m.mint == lp))
            .last()
            .cloned();
        let reserve_a = token_a_transfer.as_ref().map_or(0, |t| t.amount);
        let reserve_b = token_b_transfer.as_ref().map_or(0, |t| t.amount);

        ix.events.push(Event::CreatePool(self.create_pool()));
        ix.events.push(Event::AddLiquidity(AddLiquidity {
            pool: self.pool,
            user: self.user,
            token_a_transfer,
            token_b_transfer,
            token_lp_mint,
        }));
        ix.receipts.push(self.receipt(reserve_a, reserve_b));
    }

    /// Pool creation without a deposit.
    pub fn emit(&self, ix: &mut Instruction) {
        ix.events.push(Event::CreatePool(self.create_pool()));
        ix.receipts.push(self.receipt(0, 0));
    }
}
