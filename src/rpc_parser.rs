//! RPC Transaction Parser
//!
//! 把 `getTransaction` 的返回值 (`EncodedConfirmedTransactionWithStatusMeta`)
//! 转换为 [`RawTransaction`] + [`ExecutionMeta`], 然后走完整解析流程.
//! 不负责网络请求.

use std::str::FromStr;

use base64::{engine::general_purpose, Engine as _};
use log::debug;
use solana_sdk::{
    hash::Hash, pubkey::Pubkey, signature::Signature, transaction::VersionedTransaction,
};
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, TransactionBinaryEncoding,
    UiCompiledInstruction, UiInstruction, UiLoadedAddresses, UiMessage, UiParsedInstruction,
    UiTransactionStatusMeta, UiTransactionTokenBalance,
};
use thiserror::Error;

use crate::core::input::{
    AccountKey, CompiledInstruction, ExecutionMeta, InnerInstructions, LoadedAddresses,
    MessageHeader, RawMessage, RawTransaction, TokenBalance, UiTokenAmount,
};
use crate::core::parser::TransactionParser;
use crate::core::types::Transaction;

/// Parse error types
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Conversion error: {0}")]
    ConversionError(String),
    #[error("Missing field: {0}")]
    MissingField(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid pubkey: {0}")]
    InvalidPubkey(String),
}

/// Parses an RPC transaction with the process-wide registry.
///
/// `Ok(None)` mirrors [`TransactionParser::parse_transaction`]: the
/// conversion succeeded but there was nothing to assemble.
///
/// # Example
/// ```no_run
/// use sol_tx_semantics::parse_rpc_transaction;
///
/// // let rpc_tx = rpc_client.get_transaction_with_config(&sig, config)?;
/// // let tx = parse_rpc_transaction(0, &rpc_tx)?;
/// ```
pub fn parse_rpc_transaction(
    seq: u32,
    rpc_tx: &EncodedConfirmedTransactionWithStatusMeta,
) -> Result<Option<Transaction>, ParseError> {
    parse_rpc_transaction_with(&TransactionParser::default(), seq, rpc_tx)
}

/// Same as [`parse_rpc_transaction`] against a caller-supplied parser.
pub fn parse_rpc_transaction_with(
    parser: &TransactionParser<'_>,
    seq: u32,
    rpc_tx: &EncodedConfirmedTransactionWithStatusMeta,
) -> Result<Option<Transaction>, ParseError> {
    let (tx, exec) = convert_rpc_transaction(rpc_tx)?;
    Ok(parser.parse_transaction(seq, Some(&tx), Some(&exec)))
}

/// RPC 格式 -> 内部输入记录
pub fn convert_rpc_transaction(
    rpc_tx: &EncodedConfirmedTransactionWithStatusMeta,
) -> Result<(RawTransaction, ExecutionMeta), ParseError> {
    let rpc_meta = rpc_tx
        .transaction
        .meta
        .as_ref()
        .ok_or_else(|| ParseError::MissingField("meta".to_string()))?;

    let loaded = convert_loaded_addresses(rpc_meta)?;

    let tx = match &rpc_tx.transaction.transaction {
        EncodedTransaction::LegacyBinary(data) => {
            convert_versioned(decode_versioned(data, TransactionBinaryEncoding::Base58)?)
        }
        EncodedTransaction::Binary(data, encoding) => convert_versioned(decode_versioned(data, *encoding)?),
        EncodedTransaction::Json(ui_tx) => {
            let signatures = ui_tx
                .signatures
                .iter()
                .map(|s| {
                    Signature::from_str(s).map_err(|e| ParseError::ConversionError(format!("Invalid signature {}: {}", s, e)))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let message = match &ui_tx.message {
                UiMessage::Raw(raw) => {
                    let account_keys = raw
                        .account_keys
                        .iter()
                        .map(|k| parse_pubkey(k).map(AccountKey::Static))
                        .collect::<Result<Vec<_>, _>>()?;
                    let instructions = raw
                        .instructions
                        .iter()
                        .map(convert_compiled)
                        .collect::<Result<Vec<_>, _>>()?;
                    RawMessage {
                        header: MessageHeader {
                            num_required_signatures: raw.header.num_required_signatures,
                            num_readonly_signed_accounts: raw.header.num_readonly_signed_accounts,
                            num_readonly_unsigned_accounts: raw.header.num_readonly_unsigned_accounts,
                        },
                        account_keys,
                        recent_blockhash: parse_hash(&raw.recent_blockhash)?,
                        instructions,
                    }
                }
                UiMessage::Parsed(parsed) => {
                    // jsonParsed 的 accountKeys 已含 lookup table 账户, loaded 由 resolver 追加
                    let account_keys = parsed
                        .account_keys
                        .iter()
                        .filter(|a| !is_loaded_key(&a.pubkey, &loaded))
                        .map(|a| {
                            Ok(AccountKey::Parsed { pubkey: parse_pubkey(&a.pubkey)?, writable: a.writable, signer: a.signer })
                        })
                        .collect::<Result<Vec<_>, ParseError>>()?;
                    let table = key_table(&account_keys, &loaded);
                    let instructions = parsed
                        .instructions
                        .iter()
                        .map(|ix| convert_ui_instruction(ix, &table))
                        .collect::<Result<Vec<_>, _>>()?;
                    RawMessage {
                        header: MessageHeader {
                            num_required_signatures: account_keys
                                .iter()
                                .filter(|k| matches!(k, AccountKey::Parsed { signer: true, .. }))
                                .count() as u8,
                            ..Default::default()
                        },
                        account_keys,
                        recent_blockhash: parse_hash(&parsed.recent_blockhash)?,
                        instructions,
                    }
                }
            };
            RawTransaction { signatures, message }
        }
        EncodedTransaction::Accounts(_) => {
            return Err(ParseError::ConversionError("Unsupported transaction encoding: accounts".to_string()));
        }
    };

    let table = key_table(&tx.message.account_keys, &loaded);
    let exec = ExecutionMeta {
        err: rpc_meta.err.as_ref().map(serde_json::to_value).transpose()?,
        inner_instructions: convert_inner_instructions(rpc_meta, &table)?,
        pre_token_balances: convert_token_balances(rpc_meta.pre_token_balances.clone().into())?,
        post_token_balances: convert_token_balances(rpc_meta.post_token_balances.clone().into())?,
        loaded_addresses: loaded,
    };

    Ok((tx, exec))
}

// ============================================================================
// Internal conversion functions
// ============================================================================

fn parse_pubkey(s: &str) -> Result<Pubkey, ParseError> {
    Pubkey::from_str(s).map_err(|_| ParseError::InvalidPubkey(s.to_string()))
}

fn parse_hash(s: &str) -> Result<Hash, ParseError> {
    Hash::from_str(s).map_err(|e| ParseError::ConversionError(format!("Invalid blockhash {}: {}", s, e)))
}

fn decode_data(data: &str) -> Result<Vec<u8>, ParseError> {
    bs58::decode(data)
        .into_vec()
        .map_err(|e| ParseError::ConversionError(format!("Failed to decode instruction data: {}", e)))
}

fn decode_versioned(data: &str, encoding: TransactionBinaryEncoding) -> Result<VersionedTransaction, ParseError> {
    let bytes = match encoding {
        TransactionBinaryEncoding::Base64 => general_purpose::STANDARD
            .decode(data)
            .map_err(|e| ParseError::ConversionError(format!("Failed to decode base64: {}", e)))?,
        TransactionBinaryEncoding::Base58 => bs58::decode(data)
            .into_vec()
            .map_err(|e| ParseError::ConversionError(format!("Failed to decode base58: {}", e)))?,
    };
    bincode::deserialize(&bytes)
        .map_err(|e| ParseError::ConversionError(format!("Failed to deserialize transaction: {}", e)))
}

fn convert_versioned(versioned_tx: VersionedTransaction) -> RawTransaction {
    let message = &versioned_tx.message;
    let header = message.header();
    RawTransaction {
        signatures: versioned_tx.signatures.clone(),
        message: RawMessage {
            header: MessageHeader {
                num_required_signatures: header.num_required_signatures,
                num_readonly_signed_accounts: header.num_readonly_signed_accounts,
                num_readonly_unsigned_accounts: header.num_readonly_unsigned_accounts,
            },
            account_keys: message.static_account_keys().iter().copied().map(AccountKey::Static).collect(),
            recent_blockhash: *message.recent_blockhash(),
            instructions: message
                .instructions()
                .iter()
                .map(|ix| CompiledInstruction {
                    program_id_index: ix.program_id_index,
                    accounts: ix.accounts.clone(),
                    data: ix.data.clone(),
                    stack_height: None,
                    parsed: None,
                })
                .collect(),
        },
    }
}

fn convert_loaded_addresses(rpc_meta: &UiTransactionStatusMeta) -> Result<LoadedAddresses, ParseError> {
    let loaded_opt: Option<UiLoadedAddresses> = rpc_meta.loaded_addresses.clone().into();
    let Some(addrs) = loaded_opt else {
        return Ok(LoadedAddresses::default());
    };
    Ok(LoadedAddresses {
        writable: addrs.writable.iter().map(|k| parse_pubkey(k)).collect::<Result<_, _>>()?,
        readonly: addrs.readonly.iter().map(|k| parse_pubkey(k)).collect::<Result<_, _>>()?,
    })
}

/// Lookup-table keys of a parsed message. Static and loaded keys never
/// overlap, so membership in `loaded` also covers RPCs that omit `source`.
/// Without `loadedAddresses` in the meta the parsed keys are kept as-is.
fn is_loaded_key(key: &str, loaded: &LoadedAddresses) -> bool {
    parse_pubkey(key)
        .map(|key| loaded.writable.contains(&key) || loaded.readonly.contains(&key))
        .unwrap_or(false)
}

/// 完整账户表 (static + loaded), 用于把字符串账户映射回索引
fn key_table(keys: &[AccountKey], loaded: &LoadedAddresses) -> Vec<Pubkey> {
    keys.iter()
        .map(AccountKey::pubkey)
        .chain(loaded.writable.iter().copied())
        .chain(loaded.readonly.iter().copied())
        .collect()
}

fn index_of(table: &[Pubkey], key: &str) -> Result<u8, ParseError> {
    let key = parse_pubkey(key)?;
    table
        .iter()
        .position(|k| *k == key)
        .map(|pos| pos as u8)
        .ok_or_else(|| ParseError::ConversionError(format!("Account {} not in transaction", key)))
}

fn convert_compiled(ix: &UiCompiledInstruction) -> Result<CompiledInstruction, ParseError> {
    Ok(CompiledInstruction {
        program_id_index: ix.program_id_index,
        accounts: ix.accounts.clone(),
        data: decode_data(&ix.data)?,
        stack_height: ix.stack_height,
        parsed: None,
    })
}

fn convert_ui_instruction(ix: &UiInstruction, table: &[Pubkey]) -> Result<CompiledInstruction, ParseError> {
    match ix {
        UiInstruction::Compiled(compiled) => convert_compiled(compiled),
        UiInstruction::Parsed(UiParsedInstruction::Parsed(parsed)) => Ok(CompiledInstruction {
            program_id_index: index_of(table, &parsed.program_id)?,
            accounts: Vec::new(),
            data: Vec::new(),
            stack_height: parsed.stack_height,
            parsed: Some(parsed.parsed.clone()),
        }),
        UiInstruction::Parsed(UiParsedInstruction::PartiallyDecoded(partial)) => Ok(CompiledInstruction {
            program_id_index: index_of(table, &partial.program_id)?,
            accounts: partial.accounts.iter().map(|k| index_of(table, k)).collect::<Result<_, _>>()?,
            data: decode_data(&partial.data)?,
            stack_height: partial.stack_height,
            parsed: None,
        }),
    }
}

fn convert_inner_instructions(
    rpc_meta: &UiTransactionStatusMeta,
    table: &[Pubkey],
) -> Result<Vec<InnerInstructions>, ParseError> {
    let inner_instructions_opt: Option<Vec<_>> = rpc_meta.inner_instructions.clone().into();
    let Some(inner_instructions) = inner_instructions_opt else {
        debug!("rpc meta carries no inner instructions");
        return Ok(Vec::new());
    };
    inner_instructions
        .iter()
        .map(|inner| {
            Ok(InnerInstructions {
                index: inner.index,
                instructions: inner
                    .instructions
                    .iter()
                    .map(|ix| convert_ui_instruction(ix, table))
                    .collect::<Result<_, _>>()?,
            })
        })
        .collect()
}

fn convert_token_balances(balances: Option<Vec<UiTransactionTokenBalance>>) -> Result<Vec<TokenBalance>, ParseError> {
    balances
        .unwrap_or_default()
        .iter()
        .map(|b| {
            let owner: Option<String> = b.owner.clone().into();
            let program_id: Option<String> = b.program_id.clone().into();
            Ok(TokenBalance {
                account_index: b.account_index,
                owner: owner.as_deref().map(parse_pubkey).transpose()?,
                program_id: program_id.as_deref().map(parse_pubkey).transpose()?,
                mint: parse_pubkey(&b.mint)?,
                ui_token_amount: UiTokenAmount {
                    amount: b.ui_token_amount.amount.clone(),
                    decimals: b.ui_token_amount.decimals,
                },
            })
        })
        .collect()
}
