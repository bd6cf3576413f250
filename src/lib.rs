// 核心模块 - 扁平化结构
pub mod core;
pub mod instr; // 指令解析器
pub mod logs; // self-CPI 事件日志

// RPC 解析模块 - 支持直接从RPC解析交易
pub mod rpc_parser;

// 重新导出主要API
pub use crate::core::{
    // 数据模型
    AccountMeta, Block, Instruction, RawInstruction, Transaction, TransactionMeta,
    // 事件与回执
    Event, Receipt,
    // 输入记录
    BlockTransaction, ExecutionMeta, RawTransaction,
    // 注册表
    HandlerContext, HandlerFn, ProgramCategory, ProgramEntry, ProgramRegistry,
    // 主要解析函数
    parse_block, parse_transaction, TransactionParser,
};

// 导出 RPC 解析函数
pub use rpc_parser::{convert_rpc_transaction, parse_rpc_transaction, ParseError};
