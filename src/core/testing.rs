//! Fixture builders shared by the unit tests.

use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature};

use super::events::{Burn, Event, MintTo, Transfer};
use super::input::{
    AccountKey, CompiledInstruction, ExecutionMeta, InnerInstructions, MessageHeader, RawMessage,
    RawTransaction, TokenBalance, UiTokenAmount,
};
use super::registry::{HandlerContext, HandlerFn};
use super::types::{AccountMeta, Instruction, RawInstruction, TransactionMeta};
use crate::instr::program_ids::TOKEN_PROGRAM_ID;

/// Synthetic confirmed transaction. The payer is the only signer; every
/// account is writable.
pub(crate) struct TxBuilder {
    keys: Vec<Pubkey>,
    instructions: Vec<CompiledInstruction>,
    inner: Vec<InnerInstructions>,
    balances: Vec<TokenBalance>,
}

impl TxBuilder {
    pub(crate) fn new(payer: Pubkey) -> Self {
        Self { keys: vec![payer], instructions: Vec::new(), inner: Vec::new(), balances: Vec::new() }
    }

    fn index(&mut self, key: Pubkey) -> u8 {
        match self.keys.iter().position(|k| *k == key) {
            Some(pos) => pos as u8,
            None => {
                self.keys.push(key);
                (self.keys.len() - 1) as u8
            }
        }
    }

    fn compile(&mut self, program: Pubkey, accounts: &[Pubkey], data: Vec<u8>, height: Option<u32>) -> CompiledInstruction {
        CompiledInstruction {
            program_id_index: self.index(program),
            accounts: accounts.iter().map(|k| self.index(*k)).collect(),
            data,
            stack_height: height,
            parsed: None,
        }
    }

    /// Appends an outer instruction, returning its position.
    pub(crate) fn outer(&mut self, program: Pubkey, accounts: &[Pubkey], data: Vec<u8>) -> usize {
        let ix = self.compile(program, accounts, data, None);
        self.instructions.push(ix);
        self.instructions.len() - 1
    }

    /// Appends a CPI under outer instruction `outer`.
    pub(crate) fn inner(&mut self, outer: usize, height: u32, program: Pubkey, accounts: &[Pubkey], data: Vec<u8>) {
        let ix = self.compile(program, accounts, data, Some(height));
        match self.inner.iter_mut().find(|g| g.index as usize == outer) {
            Some(group) => group.instructions.push(ix),
            None => self.inner.push(InnerInstructions { index: outer as u8, instructions: vec![ix] }),
        }
    }

    /// Records a post token balance for `account`.
    pub(crate) fn token_account(&mut self, account: Pubkey, mint: Pubkey, owner: Pubkey, amount: u64) {
        let account_index = self.index(account);
        self.balances.push(TokenBalance {
            account_index,
            owner: Some(owner),
            program_id: Some(TOKEN_PROGRAM_ID),
            mint,
            ui_token_amount: UiTokenAmount { amount: amount.to_string(), decimals: 6 },
        });
    }

    pub(crate) fn build(self) -> (RawTransaction, ExecutionMeta) {
        let tx = RawTransaction {
            signatures: vec![Signature::from([7u8; 64])],
            message: RawMessage {
                header: MessageHeader { num_required_signatures: 1, ..Default::default() },
                account_keys: self.keys.into_iter().map(AccountKey::from).collect(),
                recent_blockhash: Hash::new_from_array([3u8; 32]),
                instructions: self.instructions,
            },
        };
        let exec = ExecutionMeta {
            pre_token_balances: self.balances.clone(),
            post_token_balances: self.balances,
            inner_instructions: self.inner,
            ..Default::default()
        };
        (tx, exec)
    }
}

/// `N` fresh keys.
pub(crate) fn keys<const N: usize>() -> [Pubkey; N] {
    std::array::from_fn(|_| Pubkey::new_unique())
}

pub(crate) fn account(key: Pubkey) -> AccountMeta {
    AccountMeta { key, writable: true, signer: false }
}

pub(crate) fn signer(key: Pubkey) -> AccountMeta {
    AccountMeta { key, writable: true, signer: true }
}

/// Bare node with the given accounts and children.
pub(crate) fn node(program_id: Pubkey, accounts: &[Pubkey], data: Vec<u8>, children: Vec<Instruction>) -> Instruction {
    Instruction::new(
        RawInstruction {
            program_id,
            accounts: accounts.iter().copied().map(account).collect(),
            data,
            stack_height: 1,
            parsed: None,
        },
        children,
    )
}

/// Token-program child that already carries its event.
pub(crate) fn with_event(event: Event) -> Instruction {
    let mut ix = node(TOKEN_PROGRAM_ID, &[], Vec::new(), Vec::new());
    ix.events.push(event);
    ix
}

pub(crate) fn transfer(mint: Pubkey, from: Pubkey, to: Pubkey, amount: u64) -> Transfer {
    Transfer { mint, from, to, amount }
}

pub(crate) fn transfer_node(mint: Pubkey, from: Pubkey, to: Pubkey, amount: u64) -> Instruction {
    with_event(Event::Transfer(transfer(mint, from, to, amount)))
}

pub(crate) fn mint_to_node(mint: Pubkey, account: Pubkey, amount: u64) -> Instruction {
    with_event(Event::MintTo(MintTo { mint, account, amount }))
}

pub(crate) fn burn_node(mint: Pubkey, account: Pubkey, amount: u64) -> Instruction {
    with_event(Event::Burn(Burn { mint, account, amount }))
}

/// Runs one handler on `ix` against `meta`.
pub(crate) fn run(handler: HandlerFn, ix: &mut Instruction, meta: &mut TransactionMeta) {
    handler(ix, &mut HandlerContext::new(meta));
}

/// Anchor instruction data: discriminator followed by the Borsh payload.
pub(crate) fn anchor_data(discriminator: [u8; 8], args: &impl borsh::BorshSerialize) -> Vec<u8> {
    let mut data = discriminator.to_vec();
    if let Ok(payload) = borsh::to_vec(args) {
        data.extend(payload);
    }
    data
}

pub(crate) fn token_transfer_data(amount: u64) -> Vec<u8> {
    let mut data = vec![3u8];
    data.extend_from_slice(&amount.to_le_bytes());
    data
}

pub(crate) fn token_mint_to_data(amount: u64) -> Vec<u8> {
    let mut data = vec![7u8];
    data.extend_from_slice(&amount.to_le_bytes());
    data
}

pub(crate) fn system_transfer_data(lamports: u64) -> Vec<u8> {
    let mut data = 2u32.to_le_bytes().to_vec();
    data.extend_from_slice(&lamports.to_le_bytes());
    data
}
