//! Account resolver
//!
//! Materializes the ordered account table of a transaction (static keys, then
//! loaded-writable, then loaded-readonly) and seeds token / mint metadata from
//! the pre- and post-token-balance records.

use log::debug;

use super::input::{AccountKey, ExecutionMeta, MessageHeader, RawMessage, TokenBalance};
use super::types::{
    AccountMeta, MintAccount, TokenAccount, TransactionMeta, NATIVE_SOL_DECIMALS, NATIVE_SOL_MINT,
};

/// Builds the ordered account table.
pub fn resolve_accounts(message: &RawMessage, exec: Option<&ExecutionMeta>) -> Vec<AccountMeta> {
    let header = &message.header;
    let total = message.account_keys.len();
    let loaded = exec.map(|m| &m.loaded_addresses);
    let loaded_len = loaded.map_or(0, |l| l.writable.len() + l.readonly.len());

    let mut accounts = Vec::with_capacity(total + loaded_len);
    for (idx, key) in message.account_keys.iter().enumerate() {
        accounts.push(match *key {
            AccountKey::Static(key) => AccountMeta {
                key,
                writable: is_writable(header, idx, total),
                signer: idx < header.num_required_signatures as usize,
            },
            AccountKey::Parsed { pubkey, writable, signer } => {
                AccountMeta { key: pubkey, writable, signer }
            }
        });
    }

    if let Some(loaded) = loaded {
        accounts.extend(
            loaded.writable.iter().map(|&key| AccountMeta { key, writable: true, signer: false }),
        );
        accounts.extend(
            loaded.readonly.iter().map(|&key| AccountMeta { key, writable: false, signer: false }),
        );
    }
    accounts
}

/// Static-key writability from the message header.
#[inline]
fn is_writable(header: &MessageHeader, idx: usize, total: usize) -> bool {
    let signers = header.num_required_signatures as usize;
    let readonly_signed = header.num_readonly_signed_accounts as usize;
    let readonly_unsigned = header.num_readonly_unsigned_accounts as usize;

    if idx < signers {
        idx < signers.saturating_sub(readonly_signed)
    } else {
        idx < total.saturating_sub(readonly_unsigned)
    }
}

/// Seeds `token_accounts`, `mint_accounts` and the token balance maps.
///
/// Post balances win: pre-balance records only create a token account when
/// no post record described it.
pub fn seed_token_metadata(meta: &mut TransactionMeta, exec: &ExecutionMeta) {
    for balance in &exec.post_token_balances {
        let Some(account) = meta.account(balance.account_index as usize).map(|a| a.key) else {
            debug!("post token balance references missing account {}", balance.account_index);
            continue;
        };
        meta.token_accounts.insert(account, token_account_of(balance));
        meta.mint_accounts.insert(
            balance.mint,
            MintAccount { mint: balance.mint, decimals: balance.ui_token_amount.decimals },
        );
        if let Some(amount) = parse_amount(balance) {
            meta.post_balance.insert(account, amount);
        }
    }

    for balance in &exec.pre_token_balances {
        let Some(account) = meta.account(balance.account_index as usize).map(|a| a.key) else {
            debug!("pre token balance references missing account {}", balance.account_index);
            continue;
        };
        if !meta.token_accounts.contains_key(&account) {
            meta.token_accounts.insert(account, token_account_of(balance));
            meta.mint_accounts.entry(balance.mint).or_insert(MintAccount {
                mint: balance.mint,
                decimals: balance.ui_token_amount.decimals,
            });
        }
        if let Some(amount) = parse_amount(balance) {
            meta.pre_balance.insert(account, amount);
        }
    }

    register_native_mint(meta);
}

#[inline]
pub(crate) fn register_native_mint(meta: &mut TransactionMeta) {
    meta.mint_accounts.insert(
        NATIVE_SOL_MINT,
        MintAccount { mint: NATIVE_SOL_MINT, decimals: NATIVE_SOL_DECIMALS },
    );
}

fn token_account_of(balance: &TokenBalance) -> TokenAccount {
    TokenAccount { owner: balance.owner, program: balance.program_id, mint: balance.mint }
}

fn parse_amount(balance: &TokenBalance) -> Option<u64> {
    balance.ui_token_amount.amount.parse().ok()
}
