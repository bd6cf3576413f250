//! SPL Token / Token-2022 指令解析
//!
//! Payloads are decoded with the programs' own `TokenInstruction::unpack`.
//! Both programs share one account layout per variant, so the two decoders
//! normalise into [`TokenOp`]. Instructions the RPC already parsed
//! (`jsonParsed`) carry no accounts and are read from their `info` object.
//! Either way a [`TokenAction`] reaches the single interpreter.

use std::str::FromStr;

use log::debug;
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;

use super::program_ids::{TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID};
use crate::core::events::{Burn, Event, Initialize, MintTo, Transfer};
use crate::core::registry::{HandlerContext, ProgramCategory, ProgramRegistry};
use crate::core::types::{Instruction, TokenAccount};

pub fn register(registry: &mut ProgramRegistry) {
    registry.register(TOKEN_PROGRAM_ID, "spl-token", ProgramCategory::Token, 100, parse_token);
    registry.register(TOKEN_2022_PROGRAM_ID, "spl-token-2022", ProgramCategory::Token, 100, parse_token_2022);
}

/// Token instruction variants with a semantic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOp {
    /// accounts: [source, destination, authority]
    Transfer { amount: u64 },
    /// accounts: [source, mint, destination, authority]
    TransferChecked { amount: u64 },
    /// accounts: [mint, account, authority]
    MintTo { amount: u64 },
    /// accounts: [account, mint, authority]
    Burn { amount: u64 },
    /// accounts: [account, mint, owner?]; `owner` set when carried in the payload
    InitializeAccount { owner: Option<Pubkey> },
}

/// bridges the token crates' pubkey type
#[inline]
fn to_pubkey(bytes: [u8; 32]) -> Pubkey {
    Pubkey::new_from_array(bytes)
}

pub fn decode_spl_token(data: &[u8]) -> Option<TokenOp> {
    use spl_token::instruction::TokenInstruction as Ix;

    let op = match Ix::unpack(data).ok()? {
        Ix::Transfer { amount } => TokenOp::Transfer { amount },
        Ix::TransferChecked { amount, .. } => TokenOp::TransferChecked { amount },
        Ix::MintTo { amount } | Ix::MintToChecked { amount, .. } => TokenOp::MintTo { amount },
        Ix::Burn { amount } | Ix::BurnChecked { amount, .. } => TokenOp::Burn { amount },
        Ix::InitializeAccount => TokenOp::InitializeAccount { owner: None },
        Ix::InitializeAccount2 { owner } | Ix::InitializeAccount3 { owner } => {
            TokenOp::InitializeAccount { owner: Some(to_pubkey(owner.to_bytes())) }
        }
        _ => return None,
    };
    Some(op)
}

#[allow(deprecated)]
pub fn decode_token_2022(data: &[u8]) -> Option<TokenOp> {
    use spl_token_2022::instruction::TokenInstruction as Ix;

    let op = match Ix::unpack(data).ok()? {
        Ix::Transfer { amount } => TokenOp::Transfer { amount },
        Ix::TransferChecked { amount, .. } => TokenOp::TransferChecked { amount },
        Ix::MintTo { amount } | Ix::MintToChecked { amount, .. } => TokenOp::MintTo { amount },
        Ix::Burn { amount } | Ix::BurnChecked { amount, .. } => TokenOp::Burn { amount },
        Ix::InitializeAccount => TokenOp::InitializeAccount { owner: None },
        Ix::InitializeAccount2 { owner } | Ix::InitializeAccount3 { owner } => {
            TokenOp::InitializeAccount { owner: Some(to_pubkey(owner.to_bytes())) }
        }
        _ => return None,
    };
    Some(op)
}

// ---- jsonParsed ----

#[derive(Debug, Deserialize)]
struct ParsedInstruction {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    info: ParsedInfo,
}

/// Union of the `info` fields the RPC's token parser emits for the
/// variants we care about.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParsedInfo {
    source: Option<String>,
    destination: Option<String>,
    mint: Option<String>,
    account: Option<String>,
    owner: Option<String>,
    amount: Option<String>,
    token_amount: Option<ParsedTokenAmount>,
}

#[derive(Debug, Deserialize)]
struct ParsedTokenAmount {
    amount: String,
}

impl ParsedInfo {
    fn key(field: &Option<String>) -> Option<Pubkey> {
        field.as_deref().and_then(|s| Pubkey::from_str(s).ok())
    }

    /// `amount` for unchecked variants, `tokenAmount.amount` for checked ones
    fn amount(&self) -> Option<u64> {
        self.amount
            .as_deref()
            .or(self.token_amount.as_ref().map(|t| t.amount.as_str()))?
            .parse()
            .ok()
    }
}

/// Decodes the RPC's server-side parsed form into a [`TokenAction`].
pub fn decode_parsed(parsed: &serde_json::Value) -> Option<TokenAction> {
    let parsed = ParsedInstruction::deserialize(parsed).ok()?;
    let info = &parsed.info;
    let action = match parsed.kind.as_str() {
        "transfer" | "transferChecked" => TokenAction::Transfer {
            from: ParsedInfo::key(&info.source)?,
            to: ParsedInfo::key(&info.destination)?,
            mint: ParsedInfo::key(&info.mint),
            amount: info.amount()?,
        },
        "mintTo" | "mintToChecked" => TokenAction::MintTo {
            mint: ParsedInfo::key(&info.mint)?,
            account: ParsedInfo::key(&info.account)?,
            amount: info.amount()?,
        },
        "burn" | "burnChecked" => TokenAction::Burn {
            account: ParsedInfo::key(&info.account)?,
            mint: ParsedInfo::key(&info.mint)?,
            amount: info.amount()?,
        },
        "initializeAccount" | "initializeAccount2" | "initializeAccount3" => TokenAction::InitializeAccount {
            account: ParsedInfo::key(&info.account)?,
            mint: ParsedInfo::key(&info.mint)?,
            owner: ParsedInfo::key(&info.owner)?,
        },
        _ => return None,
    };
    Some(action)
}

/// A token instruction with its accounts resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAction {
    /// `mint` is `None` for unchecked transfers
    Transfer { from: Pubkey, to: Pubkey, mint: Option<Pubkey>, amount: u64 },
    MintTo { mint: Pubkey, account: Pubkey, amount: u64 },
    Burn { account: Pubkey, mint: Pubkey, amount: u64 },
    InitializeAccount { account: Pubkey, mint: Pubkey, owner: Pubkey },
}

/// Binds a binary [`TokenOp`] to the instruction's account list.
fn resolve(ix: &Instruction, op: TokenOp) -> Option<TokenAction> {
    let action = match op {
        TokenOp::Transfer { amount } => {
            TokenAction::Transfer { from: ix.account(0)?, to: ix.account(1)?, mint: None, amount }
        }
        TokenOp::TransferChecked { amount } => TokenAction::Transfer {
            from: ix.account(0)?,
            mint: Some(ix.account(1)?),
            to: ix.account(2)?,
            amount,
        },
        TokenOp::MintTo { amount } => TokenAction::MintTo { mint: ix.account(0)?, account: ix.account(1)?, amount },
        TokenOp::Burn { amount } => TokenAction::Burn { account: ix.account(0)?, mint: ix.account(1)?, amount },
        TokenOp::InitializeAccount { owner } => TokenAction::InitializeAccount {
            account: ix.account(0)?,
            mint: ix.account(1)?,
            owner: match owner {
                Some(owner) => owner,
                None => ix.account(2)?,
            },
        },
    };
    Some(action)
}

fn parse_token(ix: &mut Instruction, ctx: &mut HandlerContext<'_>) {
    parse_with(ix, ctx, decode_spl_token);
}

fn parse_token_2022(ix: &mut Instruction, ctx: &mut HandlerContext<'_>) {
    parse_with(ix, ctx, decode_token_2022);
}

fn parse_with(ix: &mut Instruction, ctx: &mut HandlerContext<'_>, decode: fn(&[u8]) -> Option<TokenOp>) {
    let action = match &ix.raw.parsed {
        Some(parsed) => decode_parsed(parsed),
        None => match decode(ix.data()) {
            Some(op) => {
                let action = resolve(ix, op);
                if action.is_none() {
                    debug!("token {:?} with short account list ({})", op, ix.raw.accounts.len());
                }
                action
            }
            None => return,
        },
    };
    match action {
        Some(action) => {
            let event = interpret(ix, ctx, action);
            ix.events.push(event);
        }
        None if ix.raw.parsed.is_some() => debug!("parsed token instruction #{} carries no event", ix.seq),
        None => {}
    }
}

fn interpret(ix: &Instruction, ctx: &mut HandlerContext<'_>, action: TokenAction) -> Event {
    match action {
        TokenAction::Transfer { from, to, mint, amount } => {
            // 未知账户时 mint 为零
            let mint = mint
                .or_else(|| ctx.token_mint(&from))
                .or_else(|| ctx.token_mint(&to))
                .unwrap_or_default();
            Event::Transfer(Transfer { mint, from, to, amount })
        }
        TokenAction::MintTo { mint, account, amount } => Event::MintTo(MintTo { mint, account, amount }),
        TokenAction::Burn { account, mint, amount } => Event::Burn(Burn { account, mint, amount }),
        TokenAction::InitializeAccount { account, mint, owner } => {
            ctx.token_accounts.insert(
                account,
                TokenAccount { owner: Some(owner), program: Some(*ix.program_id()), mint },
            );
            Event::Initialize(Initialize { account, owner, mint })
        }
    }
}
