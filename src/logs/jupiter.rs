//! Jupiter v6 `SwapEvent` 解析

use borsh::BorshDeserialize;
use once_cell::sync::Lazy;
use solana_sdk::pubkey::Pubkey;

use super::split_event;
use crate::core::events::SwapEvent;
use crate::instr::utils::event_discriminator;

pub static SWAP_EVENT: Lazy<[u8; 8]> = Lazy::new(|| event_discriminator("SwapEvent"));

#[derive(BorshDeserialize)]
struct RawSwapEvent {
    amm: [u8; 32],
    input_mint: [u8; 32],
    input_amount: u64,
    output_mint: [u8; 32],
    output_amount: u64,
}

/// Decodes the self-CPI data of a Jupiter `SwapEvent`.
pub fn parse_swap_event(data: &[u8]) -> Option<SwapEvent> {
    let (disc, mut payload) = split_event(data)?;
    if disc != *SWAP_EVENT {
        return None;
    }
    let raw = RawSwapEvent::deserialize(&mut payload).ok()?;
    Some(SwapEvent {
        amm: Pubkey::new_from_array(raw.amm),
        input_mint: Pubkey::new_from_array(raw.input_mint),
        input_amount: raw.input_amount,
        output_mint: Pubkey::new_from_array(raw.output_mint),
        output_amount: raw.output_amount,
    })
}

#[cfg(test)]
pub(crate) fn encode_swap_event(event: &SwapEvent) -> Vec<u8> {
    let mut data = super::EVENT_IX_TAG_LE.to_vec();
    data.extend_from_slice(&*SWAP_EVENT);
    data.extend_from_slice(event.amm.as_ref());
    data.extend_from_slice(event.input_mint.as_ref());
    data.extend_from_slice(&event.input_amount.to_le_bytes());
    data.extend_from_slice(event.output_mint.as_ref());
    data.extend_from_slice(&event.output_amount.to_le_bytes());
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_swap_event() {
        let event = SwapEvent {
            amm: Pubkey::new_unique(),
            input_mint: Pubkey::new_unique(),
            input_amount: 1_000,
            output_mint: Pubkey::new_unique(),
            output_amount: 2_000,
        };
        let data = encode_swap_event(&event);
        assert_eq!(parse_swap_event(&data), Some(event));
        assert_eq!(parse_swap_event(&data[..data.len() - 1]), None);
    }

    #[test]
    fn test_other_event_is_rejected() {
        let mut data = super::super::EVENT_IX_TAG_LE.to_vec();
        data.extend_from_slice(&event_discriminator("FeeEvent"));
        data.extend_from_slice(&[0u8; 112]);
        assert_eq!(parse_swap_event(&data), None);
    }
}
