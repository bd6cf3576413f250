//! 指令解析通用工具函数

use std::collections::HashMap;
use std::hash::Hash;

use ring::digest::{digest, SHA256};

/// Anchor 指令 discriminator: sha256("global:<name>")[..8]
pub fn anchor_discriminator(name: &str) -> [u8; 8] {
    sighash("global", name)
}

/// Anchor 事件 discriminator: sha256("event:<Name>")[..8]
pub fn event_discriminator(name: &str) -> [u8; 8] {
    sighash("event", name)
}

fn sighash(namespace: &str, name: &str) -> [u8; 8] {
    let preimage = format!("{namespace}:{name}");
    let hash = digest(&SHA256, preimage.as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&hash.as_ref()[..8]);
    out
}

/// 8 字节 discriminator -> 指令变体查找表
pub struct Discriminators<T> {
    table: HashMap<[u8; 8], T>,
}

impl<T: Copy + Eq + Hash> Discriminators<T> {
    /// Table keyed by the Anchor sighash of each instruction name.
    pub fn anchor(entries: &[(&str, T)]) -> Self {
        Self { table: entries.iter().map(|(name, v)| (anchor_discriminator(name), *v)).collect() }
    }

    /// Splits `data` into its variant and the payload after the
    /// discriminator. `None` for short data or unknown discriminators.
    #[inline]
    pub fn split<'d>(&self, data: &'d [u8]) -> Option<(T, &'d [u8])> {
        let disc: [u8; 8] = data.get(..8)?.try_into().ok()?;
        self.table.get(&disc).map(|v| (*v, &data[8..]))
    }

    pub fn discriminator_of(&self, variant: T) -> Option<[u8; 8]> {
        self.table.iter().find(|(_, v)| **v == variant).map(|(d, _)| *d)
    }
}

/// Legacy programs: one leading tag byte.
#[inline(always)]
pub fn split_tag(data: &[u8]) -> Option<(u8, &[u8])> {
    data.split_first().map(|(tag, rest)| (*tag, rest))
}

/// 从指令数据中读取 u64（小端序）
#[inline(always)]
pub fn read_u64_le(data: &[u8], offset: usize) -> Option<u64> {
    data.get(offset..offset + 8)
        .and_then(|slice| slice.try_into().ok())
        .map(u64::from_le_bytes)
}

/// 从指令数据中读取 u32（小端序）
#[inline(always)]
pub fn read_u32_le(data: &[u8], offset: usize) -> Option<u32> {
    data.get(offset..offset + 4)
        .and_then(|slice| slice.try_into().ok())
        .map(u32::from_le_bytes)
}

/// 从指令数据中读取 u8
#[inline(always)]
pub fn read_u8(data: &[u8], offset: usize) -> Option<u8> {
    data.get(offset).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Ix {
        Swap,
        SwapV2,
    }

    #[test]
    fn test_anchor_discriminators_match_known_values() {
        assert_eq!(anchor_discriminator("swap"), [248, 198, 158, 145, 225, 117, 135, 200]);
        assert_eq!(anchor_discriminator("swap_v2"), [43, 4, 237, 11, 26, 201, 30, 98]);
        assert_eq!(anchor_discriminator("create_pool"), [233, 146, 209, 142, 207, 104, 64, 188]);
        assert_eq!(anchor_discriminator("buy"), [102, 6, 61, 18, 1, 218, 235, 234]);
        assert_eq!(event_discriminator("TradeEvent"), [189, 219, 127, 211, 78, 230, 97, 238]);
        assert_eq!(event_discriminator("SwapEvent"), [64, 198, 205, 232, 38, 8, 113, 226]);
    }

    #[test]
    fn test_discriminator_table() {
        let table = Discriminators::anchor(&[("swap", Ix::Swap), ("swap_v2", Ix::SwapV2)]);

        let mut data = anchor_discriminator("swap_v2").to_vec();
        data.extend_from_slice(&[1, 2, 3]);
        assert_eq!(table.split(&data), Some((Ix::SwapV2, &[1u8, 2, 3][..])));
        assert_eq!(table.split(&data[..7]), None);
        assert_eq!(table.split(&[0u8; 8]), None);
        assert_eq!(table.discriminator_of(Ix::Swap), Some(anchor_discriminator("swap")));
    }

    #[test]
    fn test_readers_are_bounds_checked() {
        let data = [1u8, 0, 0, 0, 0, 0, 0, 0, 9];
        assert_eq!(read_u64_le(&data, 0), Some(1));
        assert_eq!(read_u64_le(&data, 2), None);
        assert_eq!(read_u32_le(&data, 5), Some(9 << 24));
        assert_eq!(read_u8(&data, 8), Some(9));
        assert_eq!(split_tag(&data), Some((1, &data[1..])));
        assert_eq!(split_tag(&[]), None);
    }
}
