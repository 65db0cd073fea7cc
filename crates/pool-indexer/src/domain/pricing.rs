//! Price derivation: pool prices from the sqrt price, the reference
//! currency's USD price and the value of tokens in the reference currency.

use {
    crate::{
        domain::{
            Config,
            entities::{Bundle, EntityStore, EntityStoreExt, Token},
        },
        infra::observe,
    },
    alloy_primitives::U160,
    bigdecimal::BigDecimal,
    num::{One, Zero},
    number::{
        conversions::uint_to_big_decimal,
        decimal::{exponent_to_big_decimal, pow, safe_div},
    },
    std::sync::LazyLock,
};

/// `2^192`, the scale of a squared Q64.96 sqrt price.
static Q192: LazyLock<BigDecimal> = LazyLock::new(|| pow(&BigDecimal::from(2), 192));

/// Converts a Q64.96 sqrt price into `(token0 per token1, token1 per token0)`
/// in whole-token units.
///
/// A zero sqrt price yields zero for both prices.
pub fn sqrt_price_to_token_prices(
    sqrt_price: &U160,
    token0_decimals: u8,
    token1_decimals: u8,
) -> (BigDecimal, BigDecimal) {
    let sqrt_price = uint_to_big_decimal(sqrt_price);
    let num = &sqrt_price * &sqrt_price;
    let price1 = safe_div(&num, &Q192) * exponent_to_big_decimal(token0_decimals);
    let price1 = safe_div(&price1, &exponent_to_big_decimal(token1_decimals));
    let price0 = safe_div(&BigDecimal::one(), &price1);
    (price0, price1)
}

/// USD price of the reference currency, read from the anchor pool. Zero if the
/// anchor pool does not exist (yet).
pub fn reference_usd_price<S>(store: &S, config: &Config) -> BigDecimal
where
    S: EntityStore + ?Sized,
{
    match store.pool(config.anchor_pool) {
        Ok(pool) => pool.token0_price,
        Err(err) => {
            observe::reference_price_unavailable(&err);
            BigDecimal::zero()
        }
    }
}

/// Value of one `token` in the reference currency.
///
/// Walks the token's whitelist pools in order and prices the token through
/// the pool whose counterpart side locks the most reference value. Pools
/// locking no more than the configured threshold are never used, and ties go
/// to the pool found first. This only looks at total value locked, not at how
/// the liquidity is distributed around the current price.
///
/// A pool or counterpart token missing from the store ends the walk early
/// with the best price found until then.
pub fn derive_reference_value<S>(
    token: &Token,
    bundle: &Bundle,
    store: &S,
    config: &Config,
) -> BigDecimal
where
    S: EntityStore + ?Sized,
{
    if token.id == config.reference_token {
        return BigDecimal::one();
    }
    // Pool implied rates of stablecoins are too noisy, pin them to USD.
    if config.stablecoins.contains(&token.id) {
        return safe_div(&BigDecimal::one(), &bundle.eth_price_usd);
    }

    let mut largest_liquidity_eth = BigDecimal::zero();
    let mut price_so_far = BigDecimal::zero();

    for pool_address in &token.whitelist_pools {
        let pool = match store.pool(*pool_address) {
            Ok(pool) => pool,
            Err(err) => {
                observe::traversal_aborted(token.id, &err);
                return price_so_far;
            }
        };
        if pool.liquidity == 0 {
            continue;
        }

        // Price of `token` in units of the other side, and that side's TVL.
        let (counterpart, counterpart_tvl, price) = if pool.token0 == token.id {
            (
                pool.token1,
                &pool.total_value_locked_token1,
                &pool.token1_price,
            )
        } else if pool.token1 == token.id {
            (
                pool.token0,
                &pool.total_value_locked_token0,
                &pool.token0_price,
            )
        } else {
            continue;
        };

        let counterpart = match store.token(counterpart) {
            Ok(counterpart) => counterpart,
            Err(err) => {
                observe::traversal_aborted(token.id, &err);
                return price_so_far;
            }
        };

        let eth_locked = counterpart_tvl * &counterpart.derived_eth;
        if eth_locked > largest_liquidity_eth && eth_locked > config.min_liquidity_threshold {
            price_so_far = price * &counterpart.derived_eth;
            largest_liquidity_eth = eth_locked;
        }
    }

    price_so_far
}
