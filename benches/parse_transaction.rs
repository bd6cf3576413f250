//! End-to-end parse benchmarks
//!
//! Run with: cargo bench --bench parse_transaction

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sol_tx_semantics::core::input::{
    AccountKey, CompiledInstruction, ExecutionMeta, InnerInstructions, MessageHeader, RawMessage,
    RawTransaction, TokenBalance, UiTokenAmount,
};
use sol_tx_semantics::instr::anchor_discriminator;
use sol_tx_semantics::instr::program_ids::{JUPITER_V6_PROGRAM_ID, ORCA_WHIRLPOOL_PROGRAM_ID, TOKEN_PROGRAM_ID};
use sol_tx_semantics::logs::{jupiter::SWAP_EVENT, EVENT_IX_TAG_LE};
use sol_tx_semantics::{ProgramRegistry, TransactionParser};
use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature};

struct Keys(Vec<Pubkey>);

impl Keys {
    fn index(&mut self, key: Pubkey) -> u8 {
        match self.0.iter().position(|k| *k == key) {
            Some(pos) => pos as u8,
            None => {
                self.0.push(key);
                (self.0.len() - 1) as u8
            }
        }
    }

    fn compile(&mut self, program: Pubkey, accounts: &[Pubkey], data: Vec<u8>, height: Option<u32>) -> CompiledInstruction {
        CompiledInstruction {
            program_id_index: self.index(program),
            accounts: accounts.iter().map(|k| self.index(*k)).collect(),
            data,
            stack_height: height,
            parsed: None,
        }
    }
}

fn token_transfer(amount: u64) -> Vec<u8> {
    let mut data = vec![3u8];
    data.extend_from_slice(&amount.to_le_bytes());
    data
}

fn swap_event(amm: Pubkey, input_mint: Pubkey, input_amount: u64, output_mint: Pubkey, output_amount: u64) -> Vec<u8> {
    let mut data = EVENT_IX_TAG_LE.to_vec();
    data.extend_from_slice(&*SWAP_EVENT);
    data.extend_from_slice(amm.as_ref());
    data.extend_from_slice(input_mint.as_ref());
    data.extend_from_slice(&input_amount.to_le_bytes());
    data.extend_from_slice(output_mint.as_ref());
    data.extend_from_slice(&output_amount.to_le_bytes());
    data
}

fn balance(account_index: u8, mint: Pubkey, owner: Pubkey) -> TokenBalance {
    TokenBalance {
        account_index,
        owner: Some(owner),
        program_id: Some(TOKEN_PROGRAM_ID),
        mint,
        ui_token_amount: UiTokenAmount { amount: "1000000".to_string(), decimals: 6 },
    }
}

/// Jupiter route through `hops` whirlpools, each hop a swap CPI with two
/// token transfers followed by the router's SwapEvent self-CPI.
fn synthetic_route(hops: usize) -> (RawTransaction, ExecutionMeta) {
    let user = Pubkey::new_unique();
    let event_authority = Pubkey::new_unique();
    let mut keys = Keys(vec![user]);
    let mints: Vec<Pubkey> = (0..=hops).map(|_| Pubkey::new_unique()).collect();
    let user_accounts: Vec<Pubkey> = (0..=hops).map(|_| Pubkey::new_unique()).collect();

    let mut data = anchor_discriminator("route").to_vec();
    data.extend_from_slice(&(hops as u32).to_le_bytes());
    for i in 0..hops {
        // Whirlpool { a_to_b: true }
        data.extend_from_slice(&[17, 1, 100, i as u8, i as u8 + 1]);
    }
    data.extend_from_slice(&1_000u64.to_le_bytes());
    data.extend_from_slice(&1u64.to_le_bytes());
    data.extend_from_slice(&50u16.to_le_bytes());
    data.push(0);
    let outer = keys.compile(JUPITER_V6_PROGRAM_ID, &[TOKEN_PROGRAM_ID, user, user_accounts[0], user_accounts[hops]], data, None);

    let mut inner = Vec::new();
    let mut balances = Vec::new();
    for hop in 0..hops {
        let (pool, vault_in, vault_out) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let (user_in, user_out) = (user_accounts[hop], user_accounts[hop + 1]);
        let amount = 1_000 * (hop as u64 + 1);
        let mut swap_data = anchor_discriminator("swap").to_vec();
        swap_data.extend_from_slice(&amount.to_le_bytes());
        swap_data.extend_from_slice(&[0u8; 26]);
        inner.push(keys.compile(
            ORCA_WHIRLPOOL_PROGRAM_ID,
            &[TOKEN_PROGRAM_ID, user, pool, user_in, vault_in, user_out, vault_out],
            swap_data,
            Some(2),
        ));
        inner.push(keys.compile(TOKEN_PROGRAM_ID, &[user_in, vault_in, user], token_transfer(amount), Some(3)));
        inner.push(keys.compile(TOKEN_PROGRAM_ID, &[vault_out, user_out, pool], token_transfer(amount * 2), Some(3)));
        inner.push(keys.compile(
            JUPITER_V6_PROGRAM_ID,
            &[event_authority],
            swap_event(ORCA_WHIRLPOOL_PROGRAM_ID, mints[hop], amount, mints[hop + 1], amount * 2),
            Some(2),
        ));
        balances.push(balance(keys.index(vault_in), mints[hop], pool));
        balances.push(balance(keys.index(vault_out), mints[hop + 1], pool));
        balances.push(balance(keys.index(user_in), mints[hop], user));
    }

    let tx = RawTransaction {
        signatures: vec![Signature::from([1u8; 64])],
        message: RawMessage {
            header: MessageHeader { num_required_signatures: 1, ..Default::default() },
            account_keys: keys.0.into_iter().map(AccountKey::from).collect(),
            recent_blockhash: Hash::new_from_array([2u8; 32]),
            instructions: vec![outer],
        },
    };
    let exec = ExecutionMeta {
        pre_token_balances: balances.clone(),
        post_token_balances: balances,
        inner_instructions: vec![InnerInstructions { index: 0, instructions: inner }],
        ..Default::default()
    };
    (tx, exec)
}

fn bench_parse_route(c: &mut Criterion) {
    let _ = env_logger::builder().is_test(true).try_init();
    let registry = ProgramRegistry::builtin();
    let parser = TransactionParser::new(&registry);
    let mut group = c.benchmark_group("Parse Jupiter Route");

    for hops in [1usize, 2, 4, 8].iter() {
        let (tx, exec) = synthetic_route(*hops);
        group.bench_with_input(BenchmarkId::new("hops", hops), hops, |b, _| {
            b.iter(|| black_box(parser.parse_transaction(0, Some(black_box(&tx)), Some(black_box(&exec)))))
        });
    }

    group.finish();
}

fn bench_registry_lookup(c: &mut Criterion) {
    let registry = ProgramRegistry::builtin();
    let unknown = Pubkey::new_unique();

    c.bench_function("registry hit", |b| b.iter(|| black_box(registry.handler_for(black_box(&JUPITER_V6_PROGRAM_ID)))));
    c.bench_function("registry miss", |b| b.iter(|| black_box(registry.handler_for(black_box(&unknown)))));
}

criterion_group!(benches, bench_parse_route, bench_registry_lookup);
criterion_main!(benches);
