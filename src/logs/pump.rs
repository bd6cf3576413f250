//! PumpFun `TradeEvent` 解析
//!
//! Only the leading fields are decoded; later program versions append more
//! fields after `virtual_token_reserves`.

use borsh::BorshDeserialize;
use once_cell::sync::Lazy;
use solana_sdk::pubkey::Pubkey;

use super::split_event;
use crate::instr::utils::event_discriminator;

pub static TRADE_EVENT: Lazy<[u8; 8]> = Lazy::new(|| event_discriminator("TradeEvent"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeEvent {
    pub mint: Pubkey,
    pub sol_amount: u64,
    pub token_amount: u64,
    pub is_buy: bool,
    pub user: Pubkey,
    pub timestamp: i64,
    pub virtual_sol_reserves: u64,
    pub virtual_token_reserves: u64,
}

#[derive(BorshDeserialize)]
struct RawTradeEvent {
    mint: [u8; 32],
    sol_amount: u64,
    token_amount: u64,
    is_buy: bool,
    user: [u8; 32],
    timestamp: i64,
    virtual_sol_reserves: u64,
    virtual_token_reserves: u64,
}

pub fn parse_trade_event(data: &[u8]) -> Option<TradeEvent> {
    let (disc, mut payload) = split_event(data)?;
    if disc != *TRADE_EVENT {
        return None;
    }
    let raw = RawTradeEvent::deserialize(&mut payload).ok()?;
    Some(TradeEvent {
        mint: Pubkey::new_from_array(raw.mint),
        sol_amount: raw.sol_amount,
        token_amount: raw.token_amount,
        is_buy: raw.is_buy,
        user: Pubkey::new_from_array(raw.user),
        timestamp: raw.timestamp,
        virtual_sol_reserves: raw.virtual_sol_reserves,
        virtual_token_reserves: raw.virtual_token_reserves,
    })
}

#[cfg(test)]
pub(crate) fn encode_trade_event(event: &TradeEvent) -> Vec<u8> {
    let mut data = super::EVENT_IX_TAG_LE.to_vec();
    data.extend_from_slice(&*TRADE_EVENT);
    data.extend_from_slice(event.mint.as_ref());
    data.extend_from_slice(&event.sol_amount.to_le_bytes());
    data.extend_from_slice(&event.token_amount.to_le_bytes());
    data.push(event.is_buy as u8);
    data.extend_from_slice(event.user.as_ref());
    data.extend_from_slice(&event.timestamp.to_le_bytes());
    data.extend_from_slice(&event.virtual_sol_reserves.to_le_bytes());
    data.extend_from_slice(&event.virtual_token_reserves.to_le_bytes());
    data
}
