//! Transaction assembler
//!
//! (raw transaction, execution meta) -> `Transaction`:
//! account resolution, invocation tree, post-order interpretation.

use log::debug;
use solana_sdk::hash::Hash;

use super::accounts::{resolve_accounts, seed_token_metadata};
use super::input::{BlockTransaction, ExecutionMeta, RawTransaction};
use super::registry::{HandlerContext, ProgramRegistry};
use super::tree::build_from_message;
use super::types::{Block, Transaction, TransactionMeta};
use super::walker::walk;
use crate::instr::program_ids::VOTE_PROGRAM_ID;

/// Interprets transactions against one program registry.
///
/// Holds no per-transaction state; one parser can serve any number of
/// threads.
#[derive(Debug, Clone, Copy)]
pub struct TransactionParser<'r> {
    registry: &'r ProgramRegistry,
}

impl Default for TransactionParser<'static> {
    fn default() -> Self {
        Self::new(ProgramRegistry::global())
    }
}

impl<'r> TransactionParser<'r> {
    pub fn new(registry: &'r ProgramRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r ProgramRegistry {
        self.registry
    }

    /// Returns `None` when either input is missing.
    pub fn parse_transaction(
        &self,
        seq: u32,
        tx: Option<&RawTransaction>,
        exec: Option<&ExecutionMeta>,
    ) -> Option<Transaction> {
        let (tx, exec) = (tx?, exec?);
        let mut transaction = Transaction {
            hash: tx.signatures.first().copied().unwrap_or_default(),
            block_hash: tx.message.recent_blockhash,
            seq,
            meta: TransactionMeta::default(),
            instructions: Vec::new(),
        };

        // 失败交易: 只保留错误
        if exec.is_failed() {
            transaction.meta.err = exec.err.as_ref().and_then(|e| serde_json::to_string(e).ok());
            return Some(transaction);
        }

        let message = &tx.message;
        transaction.meta.accounts = resolve_accounts(message, Some(exec));

        let is_vote = message
            .instructions
            .first()
            .and_then(|ix| transaction.meta.account(ix.program_id_index as usize))
            .is_some_and(|a| a.key == VOTE_PROGRAM_ID);
        if is_vote {
            return Some(transaction);
        }

        seed_token_metadata(&mut transaction.meta, exec);
        let mut instructions =
            build_from_message(message, &exec.inner_instructions, &transaction.meta.accounts);
        walk(self.registry, &mut instructions, &mut HandlerContext::new(&mut transaction.meta));
        transaction.instructions = instructions;

        debug!(
            "parsed tx {} ({} roots, {} events)",
            transaction.hash,
            transaction.instructions.len(),
            transaction.top_level_events().count()
        );
        Some(transaction)
    }

    /// Assembles a block; `seq` is the position in `transactions`, entries
    /// with a missing half are dropped.
    pub fn parse_block(&self, hash: Hash, slot: u64, transactions: &[BlockTransaction]) -> Block {
        let transactions = transactions
            .iter()
            .enumerate()
            .filter_map(|(seq, entry)| {
                self.parse_transaction(seq as u32, entry.transaction.as_ref(), entry.meta.as_ref())
            })
            .collect();
        Block { hash, slot, transactions }
    }
}

/// Parses with the process-wide registry.
pub fn parse_transaction(
    seq: u32,
    tx: Option<&RawTransaction>,
    exec: Option<&ExecutionMeta>,
) -> Option<Transaction> {
    TransactionParser::default().parse_transaction(seq, tx, exec)
}

/// Assembles a block with the process-wide registry.
pub fn parse_block(hash: Hash, slot: u64, transactions: &[BlockTransaction]) -> Block {
    TransactionParser::default().parse_block(hash, slot, transactions)
}
