use {
    crate::domain::events::{self, PoolEvent, WithAddress},
    alloy_primitives::{Log, aliases::I24},
    alloy_sol_types::{SolEvent, sol},
    anyhow::{Context, Result},
};

sol! {
    interface UniswapV3Pool {
        event Initialize(uint160 sqrtPriceX96, int24 tick);

        event Mint(
            address sender,
            address indexed owner,
            int24 indexed tickLower,
            int24 indexed tickUpper,
            uint128 amount,
            uint256 amount0,
            uint256 amount1
        );

        event Burn(
            address indexed owner,
            int24 indexed tickLower,
            int24 indexed tickUpper,
            uint128 amount,
            uint256 amount0,
            uint256 amount1
        );

        event Swap(
            address indexed sender,
            address indexed recipient,
            int256 amount0,
            int256 amount1,
            uint160 sqrtPriceX96,
            uint128 liquidity,
            int24 tick
        );
    }
}

use UniswapV3Pool::{Burn, Initialize, Mint, Swap};

/// Decodes a pool log. Logs of events the indexer doesn't handle yield
/// `None`.
pub fn decode(log: &Log) -> Result<Option<PoolEvent>> {
    let Some(topic) = log.data.topics().first() else {
        return Ok(None);
    };
    let address = log.address;
    let event = match *topic {
        topic if topic == Initialize::SIGNATURE_HASH => {
            let event = Initialize::decode_log_data(&log.data).context("Initialize")?;
            PoolEvent::Initialize(WithAddress(
                events::Initialize {
                    sqrt_price_x96: event.sqrtPriceX96,
                    tick: tick(event.tick)?,
                },
                address,
            ))
        }
        topic if topic == Mint::SIGNATURE_HASH => {
            let event = Mint::decode_log_data(&log.data).context("Mint")?;
            PoolEvent::Mint(WithAddress(
                events::Mint {
                    amount0: event.amount0,
                    amount1: event.amount1,
                    amount: event.amount,
                    tick_lower: tick(event.tickLower)?,
                    tick_upper: tick(event.tickUpper)?,
                },
                address,
            ))
        }
        topic if topic == Burn::SIGNATURE_HASH => {
            let event = Burn::decode_log_data(&log.data).context("Burn")?;
            PoolEvent::Burn(WithAddress(
                events::Burn {
                    amount0: event.amount0,
                    amount1: event.amount1,
                    amount: event.amount,
                    tick_lower: tick(event.tickLower)?,
                    tick_upper: tick(event.tickUpper)?,
                },
                address,
            ))
        }
        topic if topic == Swap::SIGNATURE_HASH => {
            let event = Swap::decode_log_data(&log.data).context("Swap")?;
            PoolEvent::Swap(WithAddress(
                events::Swap {
                    amount0: event.amount0,
                    amount1: event.amount1,
                    sqrt_price_x96: event.sqrtPriceX96,
                    liquidity: event.liquidity,
                    tick: tick(event.tick)?,
                },
                address,
            ))
        }
        _ => return Ok(None),
    };
    Ok(Some(event))
}

fn tick(value: I24) -> Result<i32> {
    i32::try_from(value).context("tick out of range")
}
