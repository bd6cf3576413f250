//! 交易语义解析核心模块
//!
//! - 账户表解析 (static + address lookup tables)
//! - 调用树重建 (stack height)
//! - 后序遍历 + 程序注册表分发

pub mod accounts; // 账户解析器
pub mod events; // 事件与回执定义
pub mod input; // 原始交易输入
pub mod parser; // 交易组装
pub mod registry; // 程序注册表
pub mod tree; // 调用树
pub mod types;
pub mod walker; // 后序遍历

#[cfg(test)]
pub(crate) mod testing;

pub use events::*;
pub use input::*;
pub use parser::{parse_block, parse_transaction, TransactionParser};
pub use registry::{HandlerContext, HandlerFn, ProgramCategory, ProgramEntry, ProgramRegistry};
pub use types::*;
