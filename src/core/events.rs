//! 语义事件与状态回执定义
//!
//! `Event` 描述一条指令做了什么（转账、铸造、兑换……），
//! `Receipt` 描述指令执行之后应当存在的状态（例如一个新池子）。

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

/// Token movement between two token accounts (or two wallets for native SOL).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub mint: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintTo {
    pub mint: Pubkey,
    pub account: Pubkey,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Burn {
    pub mint: Pubkey,
    pub account: Pubkey,
    pub amount: u64,
}

/// Token account initialization observed on-chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Initialize {
    pub account: Pubkey,
    pub owner: Pubkey,
    pub mint: Pubkey,
}

/// A single swap through one pool.
///
/// `input_transfer` is the leg paid by the user, `output_transfer` the leg
/// received. Either may be missing when the program moved funds without a
/// token-program CPI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Swap {
    pub dex: Option<Pubkey>,
    pub pool: Pubkey,
    pub user: Pubkey,
    pub input_transfer: Option<Transfer>,
    pub output_transfer: Option<Transfer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddLiquidity {
    pub pool: Pubkey,
    pub user: Pubkey,
    pub token_a_transfer: Option<Transfer>,
    pub token_b_transfer: Option<Transfer>,
    pub token_lp_mint: Option<MintTo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoveLiquidity {
    pub pool: Pubkey,
    pub user: Pubkey,
    pub token_a_transfer: Option<Transfer>,
    pub token_b_transfer: Option<Transfer>,
    pub token_lp_burn: Option<Burn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePool {
    pub pool: Pubkey,
    /// Mints traded by the pool, in pool order (A, B).
    pub tokens: Vec<Pubkey>,
    /// Reserve vaults holding `tokens`, same order.
    pub accounts: Vec<Pubkey>,
    pub user: Pubkey,
}

/// Swap summary a router logs about itself after each hop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapEvent {
    pub amm: Pubkey,
    pub input_mint: Pubkey,
    pub input_amount: u64,
    pub output_mint: Pubkey,
    pub output_amount: u64,
}

/// One decoded element of a router's route plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutePlanStep {
    /// Venue the router dispatched to (e.g. `"Whirlpool"`).
    pub venue: &'static str,
    pub percent: u8,
    pub input_index: u8,
    pub output_index: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteStep {
    pub swap: Option<Swap>,
    pub route_plan: Option<RoutePlanStep>,
    pub swap_event: Option<SwapEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub router: Pubkey,
    pub user: Pubkey,
    pub steps: Vec<RouteStep>,
}

/// High-level action emitted by a program handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    Transfer(Transfer),
    MintTo(MintTo),
    Burn(Burn),
    Initialize(Initialize),
    Swap(Swap),
    AddLiquidity(AddLiquidity),
    RemoveLiquidity(RemoveLiquidity),
    CreatePool(CreatePool),
    Route(Route),
    SwapEvent(SwapEvent),
}

impl Event {
    pub fn as_transfer(&self) -> Option<&Transfer> {
        match self {
            Event::Transfer(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_mint_to(&self) -> Option<&MintTo> {
        match self {
            Event::MintTo(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_burn(&self) -> Option<&Burn> {
        match self {
            Event::Burn(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_swap(&self) -> Option<&Swap> {
        match self {
            Event::Swap(s) => Some(s),
            _ => None,
        }
    }

    /// Short variant name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Transfer(_) => "Transfer",
            Event::MintTo(_) => "MintTo",
            Event::Burn(_) => "Burn",
            Event::Initialize(_) => "Initialize",
            Event::Swap(_) => "Swap",
            Event::AddLiquidity(_) => "AddLiquidity",
            Event::RemoveLiquidity(_) => "RemoveLiquidity",
            Event::CreatePool(_) => "CreatePool",
            Event::Route(_) => "Route",
            Event::SwapEvent(_) => "SwapEvent",
        }
    }
}

/// Pool state expected to exist once the instruction has executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolReceipt {
    /// Pool account address.
    pub hash: Pubkey,
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
    pub mint_lp: Option<Pubkey>,
    pub vault_a: Pubkey,
    pub vault_b: Pubkey,
    pub reserve_a: u64,
    pub reserve_b: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Receipt {
    Pool(PoolReceipt),
}
