use {
    alloy_primitives::{Address, address},
    bigdecimal::BigDecimal,
    std::collections::HashSet,
};

/// Polygon deployment addresses.
pub mod polygon {
    use super::*;

    pub const FACTORY: Address = address!("0x1F98431c8aD98523631AE4a59f267346ea31F984");
    pub const WETH: Address = address!("0x7ceb23fd6bc0add59e62ac25578270cff1b9f619");
    pub const USDC_E: Address = address!("0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174");
    pub const USDC: Address = address!("0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359");
    pub const DAI: Address = address!("0x8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063");
    pub const USDT: Address = address!("0xc2132D05D31c914a87C6611C10748AEb04B58e8F");
    /// USDC.e/WETH 0.3%, USDC.e is token0.
    pub const USDC_WETH_03_POOL: Address = address!("0x0e44ceb592acfc5d3f09d996302eb4c499ff8c10");
}

/// Deployment constants the pricing depends on.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The reference currency. Every `derivedETH` is denominated in it.
    pub reference_token: Address,
    /// Pool whose `token0Price` is the reference currency's USD price. Its
    /// token0 has to be a USD stablecoin and its token1 the reference token.
    pub anchor_pool: Address,
    /// Tokens priced as `1 / ethPriceUSD` instead of from their pools.
    pub stablecoins: HashSet<Address>,
    /// Pools locking no more than this much reference value are ignored for
    /// pricing.
    pub min_liquidity_threshold: BigDecimal,
    /// Key of the singleton factory entity.
    pub factory: Address,
}

impl Config {
    pub fn polygon() -> Self {
        Self {
            reference_token: polygon::WETH,
            anchor_pool: polygon::USDC_WETH_03_POOL,
            stablecoins: HashSet::from([
                polygon::USDC,
                polygon::USDC_E,
                polygon::DAI,
                polygon::USDT,
            ]),
            min_liquidity_threshold: BigDecimal::from(60),
            factory: polygon::FACTORY,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::polygon()
    }
}
