//! System program 指令解析
//!
//! The RPC usually hands system instructions over already parsed
//! (`{"type": "transfer", "info": {...}}`); raw binary instructions are
//! bincode-encoded `SystemInstruction`s. Both forms normalise into
//! [`SystemInstruction`].

use std::str::FromStr;

use log::debug;
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;

use super::program_ids::SYSTEM_PROGRAM_ID;
use super::utils::read_u32_le;
use crate::core::events::{Event, Transfer};
use crate::core::registry::{HandlerContext, ProgramCategory, ProgramRegistry};
use crate::core::types::{Instruction, NATIVE_SOL_MINT};

pub fn register(registry: &mut ProgramRegistry) {
    registry.register(SYSTEM_PROGRAM_ID, "system", ProgramCategory::System, 100, parse_system);
}

/// System instructions that move lamports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemInstruction {
    Transfer { from: Pubkey, to: Pubkey, lamports: u64 },
    TransferWithSeed { from: Pubkey, to: Pubkey, lamports: u64 },
}

impl SystemInstruction {
    fn transfer(&self) -> Transfer {
        let (from, to, amount) = match *self {
            SystemInstruction::Transfer { from, to, lamports }
            | SystemInstruction::TransferWithSeed { from, to, lamports } => (from, to, lamports),
        };
        Transfer { mint: NATIVE_SOL_MINT, from, to, amount }
    }
}

// ---- jsonParsed ----

#[derive(Debug, Deserialize)]
struct ParsedInstruction {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    info: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ParsedTransferInfo {
    source: String,
    destination: String,
    lamports: u64,
}

pub fn decode_parsed(parsed: &serde_json::Value) -> Option<SystemInstruction> {
    let parsed = ParsedInstruction::deserialize(parsed).ok()?;
    let info = || -> Option<(Pubkey, Pubkey, u64)> {
        let info = ParsedTransferInfo::deserialize(&parsed.info).ok()?;
        let from = Pubkey::from_str(&info.source).ok()?;
        let to = Pubkey::from_str(&info.destination).ok()?;
        Some((from, to, info.lamports))
    };
    match parsed.kind.as_str() {
        "transfer" => info().map(|(from, to, lamports)| SystemInstruction::Transfer { from, to, lamports }),
        "transferWithSeed" => {
            info().map(|(from, to, lamports)| SystemInstruction::TransferWithSeed { from, to, lamports })
        }
        _ => None,
    }
}

// ---- binary (bincode, u32 variant tag) ----

const TRANSFER_TAG: u32 = 2;
const TRANSFER_WITH_SEED_TAG: u32 = 11;

#[derive(Debug, Deserialize)]
struct TransferArgs {
    lamports: u64,
}

#[derive(Debug, Deserialize)]
struct TransferWithSeedArgs {
    lamports: u64,
    #[allow(dead_code)]
    from_seed: String,
    #[allow(dead_code)]
    from_owner: [u8; 32],
}

pub fn decode_binary(ix: &Instruction) -> Option<SystemInstruction> {
    let data = ix.data();
    match read_u32_le(data, 0)? {
        TRANSFER_TAG => {
            let args: TransferArgs = bincode::deserialize(&data[4..]).ok()?;
            Some(SystemInstruction::Transfer { from: ix.account(0)?, to: ix.account(1)?, lamports: args.lamports })
        }
        // accounts: [from, base, to]
        TRANSFER_WITH_SEED_TAG => {
            let args: TransferWithSeedArgs = bincode::deserialize(&data[4..]).ok()?;
            Some(SystemInstruction::TransferWithSeed {
                from: ix.account(0)?,
                to: ix.account(2)?,
                lamports: args.lamports,
            })
        }
        _ => None,
    }
}

fn parse_system(ix: &mut Instruction, _ctx: &mut HandlerContext<'_>) {
    let decoded = match &ix.raw.parsed {
        Some(parsed) => decode_parsed(parsed),
        None => decode_binary(ix),
    };
    match decoded {
        Some(instruction) => ix.events.push(Event::Transfer(instruction.transfer())),
        None => debug!("system instruction #{} carries no transfer", ix.seq),
    }
}
