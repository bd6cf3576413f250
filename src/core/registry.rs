//! 程序注册表: program id -> handler
//!
//! Built once at startup, read-only afterwards. Each `instr` module contributes
//! its entries through a `register(&mut ProgramRegistry)` function.

use std::collections::HashMap;

use log::debug;
use once_cell::sync::OnceCell;
use solana_sdk::pubkey::Pubkey;

use super::types::{AccountMeta, Instruction, MintAccount, TokenAccount, TransactionMeta};

/// Program handler: reads the node (and the finished events of its
/// descendants), writes `events` / `receipts` on the node.
pub type HandlerFn = fn(&mut Instruction, &mut HandlerContext<'_>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramCategory {
    Token,
    Swap,
    Routing,
    System,
    Other,
}

#[derive(Debug, Clone, Copy)]
pub struct ProgramEntry {
    pub name: &'static str,
    pub category: ProgramCategory,
    /// Informational ordering hint for consumers; dispatch ignores it.
    pub priority: u8,
    pub handler: HandlerFn,
}

/// Transaction state visible to a handler.
///
/// Only `token_accounts` is writable: token-program handlers upsert accounts
/// they see initialized so that later instructions can resolve their mint.
pub struct HandlerContext<'a> {
    pub accounts: &'a [AccountMeta],
    pub mint_accounts: &'a HashMap<Pubkey, MintAccount>,
    pub token_accounts: &'a mut HashMap<Pubkey, TokenAccount>,
}

impl<'a> HandlerContext<'a> {
    pub fn new(meta: &'a mut TransactionMeta) -> Self {
        let TransactionMeta { accounts, token_accounts, mint_accounts, .. } = meta;
        Self { accounts, mint_accounts, token_accounts }
    }

    /// Mint held by a token account, if known.
    #[inline]
    pub fn token_mint(&self, account: &Pubkey) -> Option<Pubkey> {
        self.token_accounts.get(account).map(|t| t.mint)
    }

    #[inline]
    pub fn token_owner(&self, account: &Pubkey) -> Option<Pubkey> {
        self.token_accounts.get(account).and_then(|t| t.owner)
    }
}

static GLOBAL_REGISTRY: OnceCell<ProgramRegistry> = OnceCell::new();

fn noop_handler(_: &mut Instruction, _: &mut HandlerContext<'_>) {}

const NOOP_ENTRY: ProgramEntry = ProgramEntry {
    name: "unknown",
    category: ProgramCategory::Other,
    priority: 0,
    handler: noop_handler,
};

#[derive(Debug, Clone, Default)]
pub struct ProgramRegistry {
    entries: HashMap<Pubkey, ProgramEntry>,
}

impl ProgramRegistry {
    /// Empty registry: every program resolves to the no-op handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in program handler.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        crate::instr::register_builtin(&mut registry);
        registry
    }

    /// Process-wide registry, initialised with the built-ins on first use.
    pub fn global() -> &'static ProgramRegistry {
        GLOBAL_REGISTRY.get_or_init(Self::builtin)
    }

    /// Installs `registry` as the process-wide one. Fails (handing the
    /// registry back) once the global registry has been initialised.
    pub fn install(registry: ProgramRegistry) -> Result<(), ProgramRegistry> {
        GLOBAL_REGISTRY.set(registry)
    }

    /// Adds or replaces the entry for `program_id`.
    pub fn register(
        &mut self,
        program_id: Pubkey,
        name: &'static str,
        category: ProgramCategory,
        priority: u8,
        handler: HandlerFn,
    ) -> &mut Self {
        let entry = ProgramEntry { name, category, priority, handler };
        if let Some(prev) = self.entries.insert(program_id, entry) {
            debug!("program {} ({}) re-registered as {}", program_id, prev.name, name);
        }
        self
    }

    #[inline]
    pub fn get(&self, program_id: &Pubkey) -> Option<&ProgramEntry> {
        self.entries.get(program_id)
    }

    /// Entry for `program_id`, or the no-op entry for unknown programs.
    #[inline]
    pub fn entry_for(&self, program_id: &Pubkey) -> &ProgramEntry {
        self.entries.get(program_id).unwrap_or(&NOOP_ENTRY)
    }

    #[inline]
    pub fn handler_for(&self, program_id: &Pubkey) -> HandlerFn {
        self.entry_for(program_id).handler
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered programs of one category.
    pub fn programs_in(&self, category: ProgramCategory) -> impl Iterator<Item = (&Pubkey, &ProgramEntry)> {
        self.entries.iter().filter(move |(_, e)| e.category == category)
    }
}
