//! One state transition per pool event.
//!
//! Every handler first loads all the entities it needs and only then starts
//! mutating, so an event referring to a missing entity leaves the store
//! untouched.

use {
    crate::{
        domain::{
            Config,
            entities::{EntityStore, EntityStoreExt, MissingEntity, Pool},
            events::{Burn, Initialize, Mint, Swap, WithAddress},
            pricing::{derive_reference_value, reference_usd_price, sqrt_price_to_token_prices},
        },
        infra::observe,
    },
    number::{
        conversions::{i256_to_big_int, uint_to_big_int},
        decimal::to_decimal,
    },
};

pub fn initialize<S: EntityStore>(
    store: &mut S,
    config: &Config,
    WithAddress(event, address): &WithAddress<Initialize>,
) -> Result<(), MissingEntity> {
    let mut pool = store.pool(*address)?;
    let mut token0 = store.token(pool.token0)?;
    let mut token1 = store.token(pool.token1)?;
    let mut bundle = store.bundle()?;

    pool.sqrt_price = event.sqrt_price_x96;
    pool.tick = Some(event.tick);
    // Pool prices are only derived from swaps.
    store.save(pool);

    bundle.eth_price_usd = reference_usd_price(store, config);
    store.save(bundle.clone());

    token0.derived_eth = derive_reference_value(&token0, &bundle, store, config);
    token1.derived_eth = derive_reference_value(&token1, &bundle, store, config);
    token0.pool_count += 1;
    token1.pool_count += 1;
    store.save(token0);
    store.save(token1);
    Ok(())
}

pub fn mint<S: EntityStore>(
    store: &mut S,
    config: &Config,
    WithAddress(event, address): &WithAddress<Mint>,
) -> Result<(), MissingEntity> {
    let mut factory = store.factory(config.factory)?;
    let mut pool = store.pool(*address)?;
    let mut token0 = store.token(pool.token0)?;
    let mut token1 = store.token(pool.token1)?;

    let amount0 = to_decimal(uint_to_big_int(&event.amount0), token0.decimals);
    let amount1 = to_decimal(uint_to_big_int(&event.amount1), token1.decimals);

    factory.tx_count += 1;
    token0.tx_count += 1;
    token1.tx_count += 1;
    pool.tx_count += 1;

    // The pool only tracks the liquidity that is active at its current tick.
    if pool.is_in_range(event.tick_lower, event.tick_upper) {
        pool.liquidity = match pool.liquidity.checked_add(event.amount) {
            Some(liquidity) => liquidity,
            None => {
                observe::liquidity_out_of_bounds(&pool, event.amount);
                u128::MAX
            }
        };
    }

    pool.total_value_locked_token0 += amount0;
    pool.total_value_locked_token1 += amount1;

    store.save(token0);
    store.save(token1);
    store.save(pool);
    store.save(factory);
    Ok(())
}

pub fn burn<S: EntityStore>(
    store: &mut S,
    config: &Config,
    WithAddress(event, address): &WithAddress<Burn>,
) -> Result<(), MissingEntity> {
    let mut factory = store.factory(config.factory)?;
    let mut pool = store.pool(*address)?;
    let mut token0 = store.token(pool.token0)?;
    let mut token1 = store.token(pool.token1)?;

    let amount0 = to_decimal(uint_to_big_int(&event.amount0), token0.decimals);
    let amount1 = to_decimal(uint_to_big_int(&event.amount1), token1.decimals);

    factory.tx_count += 1;
    token0.tx_count += 1;
    token1.tx_count += 1;
    pool.tx_count += 1;

    if pool.is_in_range(event.tick_lower, event.tick_upper) {
        pool.liquidity = remove_liquidity(&pool, event.amount);
    }

    pool.total_value_locked_token0 -= amount0;
    pool.total_value_locked_token1 -= amount1;

    store.save(token0);
    store.save(token1);
    store.save(pool);
    store.save(factory);
    Ok(())
}

pub fn swap<S: EntityStore>(
    store: &mut S,
    config: &Config,
    WithAddress(event, address): &WithAddress<Swap>,
) -> Result<(), MissingEntity> {
    let mut factory = store.factory(config.factory)?;
    let mut pool = store.pool(*address)?;
    let mut bundle = store.bundle()?;
    let mut token0 = store.token(pool.token0)?;
    let mut token1 = store.token(pool.token1)?;

    // Balance deltas of the pool, negative for tokens leaving it.
    let amount0 = to_decimal(i256_to_big_int(&event.amount0), token0.decimals);
    let amount1 = to_decimal(i256_to_big_int(&event.amount1), token1.decimals);

    factory.tx_count += 1;
    pool.tx_count += 1;
    token0.tx_count += 1;
    token1.tx_count += 1;

    // The event carries the pool state after the swap.
    pool.liquidity = event.liquidity;
    pool.tick = Some(event.tick);
    pool.sqrt_price = event.sqrt_price_x96;
    pool.total_value_locked_token0 += amount0;
    pool.total_value_locked_token1 += amount1;

    let (price0, price1) =
        sqrt_price_to_token_prices(&pool.sqrt_price, token0.decimals, token1.decimals);
    pool.token0_price = price0;
    pool.token1_price = price1;
    store.save(pool);

    bundle.eth_price_usd = reference_usd_price(store, config);
    store.save(bundle.clone());

    // Both valuations see the counterpart's derivedETH from before this swap.
    token0.derived_eth = derive_reference_value(&token0, &bundle, store, config);
    token1.derived_eth = derive_reference_value(&token1, &bundle, store, config);

    store.save(factory);
    store.save(token0);
    store.save(token1);
    Ok(())
}

fn remove_liquidity(pool: &Pool, amount: u128) -> u128 {
    match pool.liquidity.checked_sub(amount) {
        Some(liquidity) => liquidity,
        None => {
            observe::liquidity_out_of_bounds(pool, amount);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            domain::{
                config::polygon,
                entities::{Bundle, Entity, EntityKey, Factory, Token},
            },
            infra::InMemoryStore,
        },
        alloy_primitives::{Address, I256, U160, U256, address},
        bigdecimal::BigDecimal,
        num::{One, Zero},
        std::str::FromStr,
    };

    const POOL: Address = address!("0x5000000000000000000000000000000000000005");
    const TOKEN: Address = address!("0x1000000000000000000000000000000000000001");

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn q96() -> U160 {
        U160::from(1) << 96
    }

    /// TOKEN/WETH pool, both with 18 decimals, plus the singletons.
    fn store() -> InMemoryStore {
        let config = Config::default();
        let mut store = InMemoryStore::default();
        store.save(Bundle::default());
        store.save(Factory::new(config.factory));
        store.save(Token {
            whitelist_pools: vec![POOL],
            ..Token::new(TOKEN, 18)
        });
        store.save(Token {
            derived_eth: BigDecimal::one(),
            ..Token::new(polygon::WETH, 18)
        });
        store.save(Pool::new(POOL, TOKEN, polygon::WETH));
        store
    }

    fn initialized_store(tick: i32) -> InMemoryStore {
        let mut store = store();
        initialize(
            &mut store,
            &Config::default(),
            &WithAddress(
                Initialize {
                    sqrt_price_x96: q96(),
                    tick,
                },
                POOL,
            ),
        )
        .unwrap();
        store
    }

    fn mint_event(amount: u128, tick_lower: i32, tick_upper: i32) -> WithAddress<Mint> {
        WithAddress(
            Mint {
                amount0: U256::from(10u64.pow(18)),
                amount1: U256::from(2 * 10u64.pow(18)),
                amount,
                tick_lower,
                tick_upper,
            },
            POOL,
        )
    }

    fn burn_event(amount: u128, tick_lower: i32, tick_upper: i32) -> WithAddress<Burn> {
        let WithAddress(mint, address) = mint_event(amount, tick_lower, tick_upper);
        WithAddress(
            Burn {
                amount0: mint.amount0,
                amount1: mint.amount1,
                amount: mint.amount,
                tick_lower: mint.tick_lower,
                tick_upper: mint.tick_upper,
            },
            address,
        )
    }

    #[test]
    fn initialize_sets_sqrt_price_and_tick() {
        let store = initialized_store(0);
        let pool = store.pool(POOL).unwrap();
        assert_eq!(pool.tick, Some(0));
        assert_eq!(pool.sqrt_price, q96());
        assert!(pool.token0_price.is_zero());
        assert!(pool.token1_price.is_zero());

        let token = store.token(TOKEN).unwrap();
        let weth = store.token(polygon::WETH).unwrap();
        assert_eq!(token.pool_count, 1);
        assert_eq!(weth.pool_count, 1);
        assert_eq!(weth.derived_eth, BigDecimal::one());
        // No liquidity yet, so the pool can't price TOKEN.
        assert!(token.derived_eth.is_zero());
        // No anchor pool in the store.
        assert!(store.bundle().unwrap().eth_price_usd.is_zero());
    }

    #[test]
    fn initializing_anchor_pool_leaves_reference_price_unset() {
        let config = Config::default();
        let mut store = InMemoryStore::default();
        store.save(Bundle::default());
        store.save(Token::new(polygon::USDC_E, 6));
        store.save(Token::new(polygon::WETH, 18));
        store.save(Pool::new(config.anchor_pool, polygon::USDC_E, polygon::WETH));

        // 2000 USDC.e per WETH.
        let sqrt_price = U160::from_str("1771595571142957102961017161607260").unwrap();
        initialize(
            &mut store,
            &config,
            &WithAddress(
                Initialize {
                    sqrt_price_x96: sqrt_price,
                    tick: 200_311,
                },
                config.anchor_pool,
            ),
        )
        .unwrap();

        let anchor = store.pool(config.anchor_pool).unwrap();
        assert_eq!(anchor.sqrt_price, sqrt_price);
        assert!(anchor.token0_price.is_zero());
        assert!(store.bundle().unwrap().eth_price_usd.is_zero());
        assert!(store.token(polygon::USDC_E).unwrap().derived_eth.is_zero());
        assert_eq!(
            store.token(polygon::WETH).unwrap().derived_eth,
            BigDecimal::one()
        );
    }

    #[test]
    fn initialize_of_unknown_pool_changes_nothing() {
        let mut store = store();
        let before = store.clone();
        let result = initialize(
            &mut store,
            &Config::default(),
            &WithAddress(
                Initialize {
                    sqrt_price_x96: q96(),
                    tick: 0,
                },
                Address::ZERO,
            ),
        );
        assert_eq!(
            result,
            Err(MissingEntity(EntityKey::Pool(Address::ZERO)))
        );
        assert_eq!(store, before);
    }

    #[test]
    fn initialize_with_missing_token_changes_nothing() {
        let mut store = store();
        store.remove(&EntityKey::Token(polygon::WETH));
        let before = store.clone();
        let result = initialize(
            &mut store,
            &Config::default(),
            &WithAddress(
                Initialize {
                    sqrt_price_x96: q96(),
                    tick: 0,
                },
                POOL,
            ),
        );
        assert_eq!(
            result,
            Err(MissingEntity(EntityKey::Token(polygon::WETH)))
        );
        assert_eq!(store, before);
        assert_eq!(store.pool(POOL).unwrap().tick, None);
    }

    #[test]
    fn mint_then_burn_restores_liquidity() {
        let config = Config::default();
        let mut store = initialized_store(0);

        mint(&mut store, &config, &mint_event(100, -10, 10)).unwrap();
        let pool = store.pool(POOL).unwrap();
        assert_eq!(pool.liquidity, 100);
        assert_eq!(pool.total_value_locked_token0, dec("1"));
        assert_eq!(pool.total_value_locked_token1, dec("2"));
        assert_eq!(pool.tx_count, 1);

        burn(&mut store, &config, &burn_event(100, -10, 10)).unwrap();
        let pool = store.pool(POOL).unwrap();
        assert_eq!(pool.liquidity, 0);
        assert!(pool.total_value_locked_token0.is_zero());
        assert!(pool.total_value_locked_token1.is_zero());
        assert_eq!(pool.tx_count, 2);

        assert_eq!(store.factory(config.factory).unwrap().tx_count, 2);
        assert_eq!(store.token(TOKEN).unwrap().tx_count, 2);
        assert_eq!(store.token(polygon::WETH).unwrap().tx_count, 2);
    }

    #[test]
    fn out_of_range_positions_only_change_tvl() {
        let config = Config::default();
        let mut store = initialized_store(10);

        // Upper bound is exclusive.
        mint(&mut store, &config, &mint_event(100, -10, 10)).unwrap();
        // Lower bound is inclusive.
        mint(&mut store, &config, &mint_event(7, 10, 20)).unwrap();
        let pool = store.pool(POOL).unwrap();
        assert_eq!(pool.liquidity, 7);
        assert_eq!(pool.total_value_locked_token0, dec("2"));
        assert_eq!(pool.total_value_locked_token1, dec("4"));
    }

    #[test]
    fn mint_before_initialize_does_not_add_liquidity() {
        let config = Config::default();
        let mut store = store();
        mint(&mut store, &config, &mint_event(100, -10, 10)).unwrap();
        let pool = store.pool(POOL).unwrap();
        assert_eq!(pool.liquidity, 0);
        assert_eq!(pool.total_value_locked_token0, dec("1"));
    }

    #[test]
    fn burn_more_than_active_liquidity_clamps_to_zero() {
        let config = Config::default();
        let mut store = initialized_store(0);
        mint(&mut store, &config, &mint_event(10, -10, 10)).unwrap();
        burn(&mut store, &config, &burn_event(11, -10, 10)).unwrap();
        assert_eq!(store.pool(POOL).unwrap().liquidity, 0);
    }

    #[test]
    fn mint_without_factory_changes_nothing() {
        let config = Config::default();
        let mut store = initialized_store(0);
        store.remove(&EntityKey::Factory(config.factory));
        let before = store.clone();
        assert!(mint(&mut store, &config, &mint_event(100, -10, 10)).is_err());
        assert!(burn(&mut store, &config, &burn_event(100, -10, 10)).is_err());
        assert_eq!(store, before);
    }

    #[test]
    fn mint_and_burn_do_not_need_bundle() {
        let config = Config::default();
        let mut store = initialized_store(0);
        store.remove(&EntityKey::Bundle(crate::domain::entities::BUNDLE_ID.to_string()));
        mint(&mut store, &config, &mint_event(100, -10, 10)).unwrap();
        burn(&mut store, &config, &burn_event(40, -10, 10)).unwrap();
        let pool = store.pool(POOL).unwrap();
        assert_eq!(pool.liquidity, 60);
        assert_eq!(pool.tx_count, 2);
    }

    #[test]
    fn swap_applies_deltas_and_replaces_state() {
        let config = Config::default();
        let mut store = initialized_store(0);
        let mut pool = store.pool(POOL).unwrap();
        pool.liquidity = 1_000;
        pool.total_value_locked_token0 = dec("500");
        pool.total_value_locked_token1 = dec("500");
        store.save(pool);

        swap(
            &mut store,
            &config,
            &WithAddress(
                Swap {
                    amount0: I256::from_dec_str("-50000000000000000000").unwrap(),
                    amount1: I256::from_dec_str("50000000000000000000").unwrap(),
                    sqrt_price_x96: q96() * U160::from(2),
                    liquidity: 42,
                    tick: 13_863,
                },
                POOL,
            ),
        )
        .unwrap();

        let pool = store.pool(POOL).unwrap();
        assert_eq!(pool.total_value_locked_token0, dec("450"));
        assert_eq!(pool.total_value_locked_token1, dec("550"));
        assert_eq!(pool.liquidity, 42);
        assert_eq!(pool.tick, Some(13_863));
        assert_eq!(pool.token1_price, dec("4"));
        assert_eq!(pool.token0_price, dec("0.25"));
        assert_eq!(pool.tx_count, 1);

        // 550 WETH locked, TOKEN = 4 WETH.
        assert_eq!(store.token(TOKEN).unwrap().derived_eth, dec("4"));
        assert_eq!(store.token(TOKEN).unwrap().tx_count, 1);
        assert_eq!(store.factory(config.factory).unwrap().tx_count, 1);
    }

    #[test]
    fn swap_in_anchor_pool_refreshes_reference_price() {
        let config = Config::default();
        let mut store = InMemoryStore::default();
        store.save(Bundle::default());
        store.save(Factory::new(config.factory));
        store.save(Token::new(polygon::USDC_E, 6));
        store.save(Token {
            derived_eth: BigDecimal::one(),
            ..Token::new(polygon::WETH, 18)
        });
        store.save(Pool::new(config.anchor_pool, polygon::USDC_E, polygon::WETH));

        // 2000 USDC.e per WETH: 1 raw USDC.e unit buys 5e8 raw WETH units.
        // sqrt(5e8) isn't exact, so the resulting price is compared loosely.
        let sqrt_price = U160::from_str("1771595571142957102961017161607260").unwrap();
        swap(
            &mut store,
            &config,
            &WithAddress(
                Swap {
                    amount0: I256::ZERO,
                    amount1: I256::ZERO,
                    sqrt_price_x96: sqrt_price,
                    liquidity: 1,
                    tick: 200_311,
                },
                config.anchor_pool,
            ),
        )
        .unwrap();

        let eth_price_usd = store.bundle().unwrap().eth_price_usd;
        assert!((eth_price_usd.clone() - dec("2000")).abs() < dec("0.001"));
        let usdc = store.token(polygon::USDC_E).unwrap();
        assert!((usdc.derived_eth * eth_price_usd - BigDecimal::one()).abs() < dec("0.000001"));
    }

    #[test]
    fn swap_without_bundle_changes_nothing() {
        let config = Config::default();
        let mut store = initialized_store(0);
        store.remove(&EntityKey::Bundle(crate::domain::entities::BUNDLE_ID.to_string()));
        let before = store.clone();
        let result = swap(
            &mut store,
            &config,
            &WithAddress(
                Swap {
                    amount0: I256::ZERO,
                    amount1: I256::ZERO,
                    sqrt_price_x96: q96(),
                    liquidity: 1,
                    tick: 0,
                },
                POOL,
            ),
        );
        assert!(matches!(
            result,
            Err(MissingEntity(EntityKey::Bundle(_)))
        ));
        assert_eq!(store, before);
        assert!(matches!(
            store.get(&EntityKey::Pool(POOL)),
            Some(Entity::Pool(_))
        ));
    }
}
