//! 指令解析器模块
//!
//! 每个程序一个模块, 通过 `register` 向 [`ProgramRegistry`] 注册自己的处理函数

pub mod jupiter;
pub mod lift; // 语义提升
pub mod lifinity;
pub mod meteora_dlmm;
pub mod meteora_pools;
pub mod meteora_vault;
pub mod obric;
pub mod orca_whirlpool;
pub mod phoenix;
pub mod program_ids;
pub mod pumpfun;
pub mod raydium_amm;
pub mod raydium_clmm;
pub mod raydium_cpmm;
pub mod solfi;
pub mod stabble;
pub mod system;
pub mod token;
pub mod utils;

pub use utils::{anchor_discriminator, event_discriminator, Discriminators};

use crate::core::registry::ProgramRegistry;

/// 注册全部内置程序
pub fn register_builtin(registry: &mut ProgramRegistry) {
    token::register(registry);
    system::register(registry);
    raydium_amm::register(registry);
    raydium_clmm::register(registry);
    raydium_cpmm::register(registry);
    orca_whirlpool::register(registry);
    meteora_dlmm::register(registry);
    meteora_pools::register(registry);
    meteora_vault::register(registry);
    stabble::register(registry);
    lifinity::register(registry);
    phoenix::register(registry);
    pumpfun::register(registry);
    jupiter::register(registry);
    obric::register(registry);
    solfi::register(registry);
}
