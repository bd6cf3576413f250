//! Jupiter v6 指令解析器 (路由)
//!
//! A route instruction CPIs into one venue per hop and logs a `SwapEvent`
//! through a self-CPI right after each hop, so the children come in
//! `(swap, log)` pairs. The route plan argument fixes how many hops there are.

use borsh::BorshDeserialize;
use log::warn;
use once_cell::sync::Lazy;

use super::program_ids::JUPITER_V6_PROGRAM_ID;
use super::utils::{read_u32_le, Discriminators};
use crate::core::events::{Event, Route, RoutePlanStep, RouteStep};
use crate::core::registry::{HandlerContext, ProgramCategory, ProgramRegistry};
use crate::core::types::Instruction;
use crate::logs::jupiter::parse_swap_event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JupiterInstruction {
    Route,
    RouteWithTokenLedger,
    ExactOutRoute,
    SharedAccountsRoute,
    SharedAccountsRouteWithTokenLedger,
    SharedAccountsExactOutRoute,
}

impl JupiterInstruction {
    /// shared_accounts 系列以 `id: u8` 开头
    fn is_shared(self) -> bool {
        matches!(
            self,
            Self::SharedAccountsRoute | Self::SharedAccountsRouteWithTokenLedger | Self::SharedAccountsExactOutRoute
        )
    }

    fn route_plan_offset(self) -> usize {
        if self.is_shared() {
            1
        } else {
            0
        }
    }

    fn user_index(self) -> usize {
        if self.is_shared() {
            2
        } else {
            1
        }
    }
}

pub static DISCRIMINATORS: Lazy<Discriminators<JupiterInstruction>> = Lazy::new(|| {
    Discriminators::anchor(&[
        ("route", JupiterInstruction::Route),
        ("route_with_token_ledger", JupiterInstruction::RouteWithTokenLedger),
        ("exact_out_route", JupiterInstruction::ExactOutRoute),
        ("shared_accounts_route", JupiterInstruction::SharedAccountsRoute),
        ("shared_accounts_route_with_token_ledger", JupiterInstruction::SharedAccountsRouteWithTokenLedger),
        ("shared_accounts_exact_out_route", JupiterInstruction::SharedAccountsExactOutRoute),
    ])
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshDeserialize)]
pub enum Side {
    Bid,
    Ask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshDeserialize)]
pub enum AccountsType {
    TransferHookA,
    TransferHookB,
    TransferHookReward,
    TransferHookInput,
    TransferHookIntermediate,
    TransferHookOutput,
    SupplementalTickArrays,
    SupplementalTickArraysOne,
    SupplementalTickArraysTwo,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize)]
pub struct RemainingAccountsSlice {
    pub accounts_type: AccountsType,
    pub length: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize)]
pub struct RemainingAccountsInfo {
    pub slices: Vec<RemainingAccountsSlice>,
}

/// 生成 venue 枚举及其名称; 变体顺序即 Borsh tag
macro_rules! jupiter_swaps {
    ($($variant:ident $({ $($field:ident: $ty:ty),* $(,)? })?),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize)]
        pub enum JupiterSwap {
            $($variant $({ $($field: $ty),* })?,)*
        }

        impl JupiterSwap {
            pub fn name(&self) -> &'static str {
                match self {
                    $(JupiterSwap::$variant { .. } => stringify!($variant),)*
                }
            }
        }
    };
}

jupiter_swaps! {
    Saber,
    SaberAddDecimalsDeposit,
    SaberAddDecimalsWithdraw,
    TokenSwap,
    Sencha,
    Step,
    Cropper,
    Raydium,
    Crema { a_to_b: bool },
    Lifinity,
    Mercurial,
    Cykura,
    Serum { side: Side },
    MarinadeDeposit,
    MarinadeUnstake,
    Aldrin { side: Side },
    AldrinV2 { side: Side },
    Whirlpool { a_to_b: bool },
    Invariant { x_to_y: bool },
    Meteora,
    GooseFX,
    DeltaFi { stable: bool },
    Balansol,
    MarcoPolo { x_to_y: bool },
    Dradex { side: Side },
    LifinityV2,
    RaydiumClmm,
    Openbook { side: Side },
    Phoenix { side: Side },
    Symmetry { from_token_id: u64, to_token_id: u64 },
    TokenSwapV2,
    HeliumTreasuryManagementRedeemV0,
    StakeDexStakeWrappedSol,
    StakeDexSwapViaStake { bridge_stake_seed: u32 },
    GooseFXV2,
    Perps,
    PerpsAddLiquidity,
    PerpsRemoveLiquidity,
    MeteoraDlmm,
    OpenBookV2 { side: Side },
    RaydiumClmmV2,
    StakeDexPrefundWithdrawStakeAndDepositStake { bridge_stake_seed: u32 },
    Clone { pool_index: u8, quantity_is_input: bool, quantity_is_collateral: bool },
    SanctumS { src_lst_value_calc_accs: u8, dst_lst_value_calc_accs: u8, src_lst_index: u32, dst_lst_index: u32 },
    SanctumSAddLiquidity { lst_value_calc_accs: u8, lst_index: u32 },
    SanctumSRemoveLiquidity { lst_value_calc_accs: u8, lst_index: u32 },
    RaydiumCP,
    WhirlpoolSwapV2 { a_to_b: bool, remaining_accounts_info: Option<RemainingAccountsInfo> },
    OneIntro,
    PumpdotfunWrappedBuy,
    PumpdotfunWrappedSell,
    PerpsV2,
    PerpsV2AddLiquidity,
    PerpsV2RemoveLiquidity,
    MoonshotWrappedBuy,
    MoonshotWrappedSell,
    StabbleStableSwap,
    StabbleWeightedSwap,
    Obric { x_to_y: bool },
    FoxBuyFromEstimatedCost,
    FoxClaimPartial { is_y: bool },
    SolFi { is_quote_to_base: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize)]
pub struct RawRoutePlanStep {
    pub swap: JupiterSwap,
    pub percent: u8,
    pub input_index: u8,
    pub output_index: u8,
}

impl From<RawRoutePlanStep> for RoutePlanStep {
    fn from(step: RawRoutePlanStep) -> Self {
        RoutePlanStep {
            venue: step.swap.name(),
            percent: step.percent,
            input_index: step.input_index,
            output_index: step.output_index,
        }
    }
}

/// Borsh `Vec<RoutePlanStep>`; `None` if any venue is unknown.
pub fn decode_route_plan(mut data: &[u8]) -> Option<Vec<RoutePlanStep>> {
    let steps = Vec::<RawRoutePlanStep>::deserialize(&mut data).ok()?;
    Some(steps.into_iter().map(RoutePlanStep::from).collect())
}

pub fn register(registry: &mut ProgramRegistry) {
    registry.register(JUPITER_V6_PROGRAM_ID, "jupiter-v6", ProgramCategory::Routing, 10, parse_instruction);
}

fn parse_instruction(ix: &mut Instruction, _ctx: &mut HandlerContext<'_>) {
    // self-CPI 日志节点
    if let Some(event) = parse_swap_event(ix.data()) {
        ix.events.push(Event::SwapEvent(event));
        return;
    }
    let Some((kind, payload)) = DISCRIMINATORS.split(ix.data()) else {
        return;
    };
    if let Some(route) = parse_route(ix, kind, payload) {
        ix.events.push(Event::Route(route));
    }
}

fn parse_route(ix: &Instruction, kind: JupiterInstruction, payload: &[u8]) -> Option<Route> {
    let user = ix.account(kind.user_index())?;
    let offset = kind.route_plan_offset();
    let plan_len = read_u32_le(payload, offset)? as usize;

    if ix.children.len() % 2 != 0 {
        warn!("jupiter: {:?} has {} children, expected (swap, log) pairs (#{})", kind, ix.children.len(), ix.seq);
        return None;
    }
    let hops = ix.children.len() / 2;
    if plan_len != hops {
        warn!("jupiter: route plan of {} steps but {} hops (#{})", plan_len, hops, ix.seq);
        return None;
    }

    let plan = decode_route_plan(&payload[offset..]);
    let mut steps = Vec::with_capacity(hops);
    for (k, pair) in ix.children.chunks_exact(2).enumerate() {
        let Some(swap_event) = parse_swap_event(pair[1].data()) else {
            warn!("jupiter: hop {} is not followed by a SwapEvent (#{})", k, ix.seq);
            return None;
        };
        steps.push(RouteStep {
            swap: pair[0].events.first().and_then(Event::as_swap).cloned(),
            route_plan: plan.as_ref().and_then(|p| p.get(k).cloned()),
            swap_event: Some(swap_event),
        });
    }

    Some(Route { router: *ix.program_id(), user, steps })
}
