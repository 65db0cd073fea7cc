use alloy_primitives::{Address, I256, U160, U256};

/// First price of a freshly created pool.
#[derive(Clone, Debug, PartialEq)]
pub struct Initialize {
    pub sqrt_price_x96: U160,
    pub tick: i32,
}

/// Liquidity added to a position over `[tick_lower, tick_upper)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Mint {
    pub amount0: U256,
    pub amount1: U256,
    pub amount: u128,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

/// Liquidity removed from a position over `[tick_lower, tick_upper)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Burn {
    pub amount0: U256,
    pub amount1: U256,
    pub amount: u128,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

/// A trade. The amounts are the pool's balance deltas (negative means the
/// tokens left the pool); the remaining fields are the pool state after the
/// trade.
#[derive(Clone, Debug, PartialEq)]
pub struct Swap {
    pub amount0: I256,
    pub amount1: I256,
    pub sqrt_price_x96: U160,
    pub liquidity: u128,
    pub tick: i32,
}

/// An event together with the address of the pool that emitted it.
#[derive(Clone, Debug, PartialEq)]
pub struct WithAddress<T>(pub T, pub Address);

#[derive(Clone, Debug, PartialEq)]
pub enum PoolEvent {
    Initialize(WithAddress<Initialize>),
    Mint(WithAddress<Mint>),
    Burn(WithAddress<Burn>),
    Swap(WithAddress<Swap>),
}

impl PoolEvent {
    pub fn address(&self) -> Address {
        match self {
            PoolEvent::Initialize(WithAddress(_, address)) => *address,
            PoolEvent::Mint(WithAddress(_, address)) => *address,
            PoolEvent::Burn(WithAddress(_, address)) => *address,
            PoolEvent::Swap(WithAddress(_, address)) => *address,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PoolEvent::Initialize(_) => "initialize",
            PoolEvent::Mint(_) => "mint",
            PoolEvent::Burn(_) => "burn",
            PoolEvent::Swap(_) => "swap",
        }
    }
}

/// A pool event at its position in the chain.
#[derive(Clone, Debug, PartialEq)]
pub struct LoggedEvent {
    pub block: u64,
    pub log_index: u64,
    pub event: PoolEvent,
}

impl LoggedEvent {
    /// Canonical chain order.
    pub fn position(&self) -> (u64, u64) {
        (self.block, self.log_index)
    }
}

/// Delivers pool events one at a time in canonical chain order.
pub trait EventSource {
    fn next_event(&mut self) -> Option<LoggedEvent>;
}
