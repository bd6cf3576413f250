//! Fetch a confirmed transaction over RPC and print its semantic events
//!
//! Transaction: a Jupiter v6 route (override with the first CLI argument)
//!
//! Usage:
//! ```bash
//! cargo run --example parse_rpc_tx --release
//! cargo run --example parse_rpc_tx --release -- <signature>
//! RPC_ENCODING=jsonParsed cargo run --example parse_rpc_tx --release
//! ```

use sol_tx_semantics::{parse_rpc_transaction, Instruction};
use solana_client::rpc_client::RpcClient;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_sdk::signature::Signature;
use solana_transaction_status::UiTransactionEncoding;
use std::str::FromStr;

const DEFAULT_SIGNATURE: &str =
    "ESeR3usVhdFoj36RKSbt2rYHDJLruCAEJQaAhTqQhor5pHWGihGJytQVWx8BN14VqCnCnLvQAzUfUQQrZ2whGPp";

fn main() {
    env_logger::init();

    let tx_sig = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_SIGNATURE.to_string());
    let rpc_url = std::env::var("SOLANA_RPC_URL")
        .unwrap_or_else(|_| "https://solana-rpc.publicnode.com".to_string());
    // base64 (默认) 或 jsonParsed
    let encoding = match std::env::var("RPC_ENCODING").as_deref() {
        Ok("jsonParsed") => UiTransactionEncoding::JsonParsed,
        _ => UiTransactionEncoding::Base64,
    };

    println!("=== Transaction Semantics ===\n");
    println!("Signature: {}", tx_sig);
    println!("RPC:       {} ({:?})\n", rpc_url, encoding);

    let client = RpcClient::new(rpc_url);
    let signature = Signature::from_str(&tx_sig).expect("Failed to parse signature");
    let config = RpcTransactionConfig {
        encoding: Some(encoding),
        commitment: None,
        max_supported_transaction_version: Some(0),
    };

    let rpc_tx = match client.get_transaction_with_config(&signature, config) {
        Ok(rpc_tx) => rpc_tx,
        Err(e) => {
            eprintln!("✗ Failed to fetch transaction: {}", e);
            eprintln!("Set SOLANA_RPC_URL to use a custom endpoint.");
            std::process::exit(1);
        }
    };

    let tx = match parse_rpc_transaction(0, &rpc_tx) {
        Ok(Some(tx)) => tx,
        Ok(None) => {
            eprintln!("✗ Transaction has no message or metadata");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("✗ Failed to convert transaction: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(err) = &tx.meta.err {
        println!("Transaction failed: {}", err);
        return;
    }

    println!("Accounts: {}", tx.meta.accounts.len());
    println!("Top-level instructions: {}\n", tx.instructions.len());
    for root in &tx.instructions {
        print_node(root, 0);
    }

    println!("\n=== JSON ===\n");
    match serde_json::to_string_pretty(&tx) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("✗ Failed to serialize: {}", e),
    }
}

fn print_node(ix: &Instruction, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{}#{} {}", indent, ix.seq, ix.program_id());
    for event in &ix.events {
        println!("{}  -> {}: {:?}", indent, event.kind(), event);
    }
    for child in &ix.children {
        print_node(child, depth + 1);
    }
}
