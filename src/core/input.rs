//! Ingestion records: a confirmed transaction and its execution metadata in the
//! shape the RPC delivers them, before any account resolution.
//!
//! `rpc_parser` builds these from `solana-transaction-status` types; tests and
//! other sources can build them directly.

use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

/// Static account key, either bare or in the JSON-parsed form that already
/// carries its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKey {
    Static(Pubkey),
    Parsed { pubkey: Pubkey, writable: bool, signer: bool },
}

impl AccountKey {
    #[inline]
    pub fn pubkey(&self) -> Pubkey {
        match self {
            AccountKey::Static(k) => *k,
            AccountKey::Parsed { pubkey, .. } => *pubkey,
        }
    }
}

impl From<Pubkey> for AccountKey {
    fn from(key: Pubkey) -> Self {
        AccountKey::Static(key)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
    /// Missing on outer instructions and on metadata from old validators.
    pub stack_height: Option<u32>,
    /// `jsonParsed` payload when the RPC parsed the instruction server-side.
    pub parsed: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMessage {
    pub header: MessageHeader,
    pub account_keys: Vec<AccountKey>,
    pub recent_blockhash: Hash,
    pub instructions: Vec<CompiledInstruction>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTransaction {
    pub signatures: Vec<Signature>,
    pub message: RawMessage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedAddresses {
    pub writable: Vec<Pubkey>,
    pub readonly: Vec<Pubkey>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiTokenAmount {
    /// Raw integer amount as a decimal string.
    pub amount: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalance {
    pub account_index: u8,
    pub owner: Option<Pubkey>,
    pub program_id: Option<Pubkey>,
    pub mint: Pubkey,
    pub ui_token_amount: UiTokenAmount,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InnerInstructions {
    /// Position of the outer instruction these were invoked from.
    pub index: u8,
    pub instructions: Vec<CompiledInstruction>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionMeta {
    /// `None` (or JSON `null`) for a successful transaction.
    pub err: Option<serde_json::Value>,
    pub loaded_addresses: LoadedAddresses,
    pub pre_token_balances: Vec<TokenBalance>,
    pub post_token_balances: Vec<TokenBalance>,
    pub inner_instructions: Vec<InnerInstructions>,
}

impl ExecutionMeta {
    pub fn is_failed(&self) -> bool {
        self.err.as_ref().is_some_and(|e| !e.is_null())
    }
}

/// Block entry; either half may be absent in RPC responses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockTransaction {
    pub transaction: Option<RawTransaction>,
    pub meta: Option<ExecutionMeta>,
}
