//! Self-CPI 事件日志解析
//!
//! Anchor programs emit structured events by invoking themselves with
//! `EVENT_IX_TAG` followed by the event discriminator and its Borsh payload.
//! These show up as inner instructions of the emitting program.

pub mod jupiter;
pub mod pump;

pub use jupiter::parse_swap_event;
pub use pump::{parse_trade_event, TradeEvent};

/// Anchor `EVENT_IX_TAG` (0x1d9acb512ea545e4) as it appears on the wire.
pub const EVENT_IX_TAG_LE: [u8; 8] = [0xe4, 0x45, 0xa5, 0x2e, 0x51, 0xcb, 0x9a, 0x1d];

/// Splits self-CPI data into (event discriminator, payload).
#[inline]
pub fn split_event(data: &[u8]) -> Option<([u8; 8], &[u8])> {
    let rest = data.strip_prefix(&EVENT_IX_TAG_LE)?;
    let disc: [u8; 8] = rest.get(..8)?.try_into().ok()?;
    Some((disc, &rest[8..]))
}
