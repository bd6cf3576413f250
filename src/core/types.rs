//! Transaction-scoped data model: the resolved account table, token metadata,
//! the invocation forest and the assembled `Transaction` / `Block`.

use std::collections::HashMap;

use serde::{Serialize, Serializer};
use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature};

use super::events::{Event, Receipt};

/// Pseudo-mint used for native SOL movements.
pub const NATIVE_SOL_MINT: Pubkey = Pubkey::new_from_array([0u8; 32]);
pub const NATIVE_SOL_DECIMALS: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub struct AccountMeta {
    pub key: Pubkey,
    pub writable: bool,
    pub signer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenAccount {
    pub owner: Option<Pubkey>,
    pub program: Option<Pubkey>,
    pub mint: Pubkey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MintAccount {
    pub mint: Pubkey,
    pub decimals: u8,
}

/// Everything the handlers may consult about the transaction.
///
/// `accounts` follows the canonical position ordering (static keys, then
/// loaded-writable, then loaded-readonly); instruction account indices are
/// resolved through it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionMeta {
    pub accounts: Vec<AccountMeta>,
    #[serde(serialize_with = "serialize_pubkey_map")]
    pub token_accounts: HashMap<Pubkey, TokenAccount>,
    #[serde(serialize_with = "serialize_pubkey_map")]
    pub mint_accounts: HashMap<Pubkey, MintAccount>,
    #[serde(serialize_with = "serialize_pubkey_map")]
    pub pre_balance: HashMap<Pubkey, u64>,
    #[serde(serialize_with = "serialize_pubkey_map")]
    pub post_balance: HashMap<Pubkey, u64>,
    /// JSON encoding of the on-chain execution error, if the transaction failed.
    pub err: Option<String>,
}

impl TransactionMeta {
    #[inline]
    pub fn account(&self, index: usize) -> Option<&AccountMeta> {
        self.accounts.get(index)
    }

    pub fn decimals(&self, mint: &Pubkey) -> Option<u8> {
        self.mint_accounts.get(mint).map(|m| m.decimals)
    }
}

/// JSON map keys must be strings, so pubkey-keyed maps are written base58.
fn serialize_pubkey_map<S, V>(map: &HashMap<Pubkey, V>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    serializer.collect_map(map.iter().map(|(k, v)| (k.to_string(), v)))
}

/// One invocation as executed by the runtime, with its accounts already
/// dereferenced through the transaction account table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawInstruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
    /// 1 for outer instructions, +1 per CPI level.
    pub stack_height: u16,
    /// Server-side parsed form (`jsonParsed` encoding), when the RPC supplied one.
    pub parsed: Option<serde_json::Value>,
}

/// Node of the invocation forest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instruction {
    /// Position in execution (pre-order) across the whole transaction.
    pub seq: u32,
    pub raw: RawInstruction,
    pub children: Vec<Instruction>,
    pub events: Vec<Event>,
    pub receipts: Vec<Receipt>,
}

impl Instruction {
    pub fn new(raw: RawInstruction, children: Vec<Instruction>) -> Self {
        Self { seq: 0, raw, children, events: Vec::new(), receipts: Vec::new() }
    }

    #[inline]
    pub fn program_id(&self) -> &Pubkey {
        &self.raw.program_id
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.raw.data
    }

    /// Key of the `index`-th account passed to this instruction.
    #[inline]
    pub fn account(&self, index: usize) -> Option<Pubkey> {
        self.raw.accounts.get(index).map(|a| a.key)
    }

    #[inline]
    pub fn last_account(&self) -> Option<Pubkey> {
        self.raw.accounts.last().map(|a| a.key)
    }

    /// First signing account among this instruction's accounts.
    pub fn signer(&self) -> Option<Pubkey> {
        self.raw.accounts.iter().find(|a| a.signer).map(|a| a.key)
    }

    /// Strict descendants in execution order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: self.children.iter().rev().collect() }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Instruction::subtree_len).sum::<usize>()
    }
}

/// Pre-order iterator over the strict descendants of an [`Instruction`].
pub struct Descendants<'a> {
    stack: Vec<&'a Instruction>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Instruction;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// First signature.
    pub hash: Signature,
    /// Recent blockhash carried by the message.
    pub block_hash: Hash,
    /// Position of the transaction in its block.
    pub seq: u32,
    pub meta: TransactionMeta,
    pub instructions: Vec<Instruction>,
}

impl Transaction {
    /// Events emitted directly by the outer instructions, in execution order.
    pub fn top_level_events(&self) -> impl Iterator<Item = &Event> {
        self.instructions.iter().flat_map(|ix| ix.events.iter())
    }

    pub fn is_failed(&self) -> bool {
        self.meta.err.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub hash: Hash,
    pub slot: u64,
    pub transactions: Vec<Transaction>,
}
