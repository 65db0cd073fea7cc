//! Derived entities kept consistent with the pool event history and the store
//! abstraction they are persisted through.
//!
//! Tokens, pools, the bundle and the factory are created by an external
//! bootstrap (a snapshot). Event handlers only load and mutate them.

use {
    alloy_primitives::{Address, U160},
    bigdecimal::BigDecimal,
    number::serialization::HexOrDecimal,
    serde::{Deserialize, Serialize},
    serde_with::{DisplayFromStr, serde_as},
    std::fmt::{self, Display, Formatter},
};

/// Id of the singleton [`Bundle`].
pub const BUNDLE_ID: &str = "1";

/// Global reference currency price.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub id: String,
    #[serde(rename = "ethPriceUSD", default)]
    #[serde_as(as = "DisplayFromStr")]
    pub eth_price_usd: BigDecimal,
}

impl Default for Bundle {
    fn default() -> Self {
        Self {
            id: BUNDLE_ID.to_string(),
            eth_price_usd: Default::default(),
        }
    }
}

/// Global transaction counter, keyed by the factory address.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Factory {
    pub id: Address,
    #[serde(default)]
    pub tx_count: u64,
}

impl Factory {
    pub fn new(id: Address) -> Self {
        Self { id, tx_count: 0 }
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: Address,
    pub decimals: u8,
    #[serde(default)]
    pub pool_count: u64,
    #[serde(default)]
    pub tx_count: u64,
    /// Value of one whole token in the reference currency.
    #[serde(rename = "derivedETH", default)]
    #[serde_as(as = "DisplayFromStr")]
    pub derived_eth: BigDecimal,
    /// Pools used for price discovery, in discovery order. The valuation
    /// oracle walks them in this order so it must never be reordered.
    #[serde(default)]
    pub whitelist_pools: Vec<Address>,
}

impl Token {
    pub fn new(id: Address, decimals: u8) -> Self {
        Self {
            id,
            decimals,
            pool_count: 0,
            tx_count: 0,
            derived_eth: Default::default(),
            whitelist_pools: Vec::new(),
        }
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub id: Address,
    pub token0: Address,
    pub token1: Address,
    #[serde(default)]
    #[serde_as(as = "HexOrDecimal")]
    pub sqrt_price: U160,
    /// `None` until the pool's `Initialize` event has been processed.
    #[serde(default)]
    pub tick: Option<i32>,
    /// Liquidity of the positions that are active at the current tick.
    #[serde(default)]
    #[serde_as(as = "DisplayFromStr")]
    pub liquidity: u128,
    /// token0 per token1.
    #[serde(default)]
    #[serde_as(as = "DisplayFromStr")]
    pub token0_price: BigDecimal,
    /// token1 per token0.
    #[serde(default)]
    #[serde_as(as = "DisplayFromStr")]
    pub token1_price: BigDecimal,
    #[serde(default)]
    #[serde_as(as = "DisplayFromStr")]
    pub total_value_locked_token0: BigDecimal,
    #[serde(default)]
    #[serde_as(as = "DisplayFromStr")]
    pub total_value_locked_token1: BigDecimal,
    #[serde(default)]
    pub tx_count: u64,
}

impl Pool {
    pub fn new(id: Address, token0: Address, token1: Address) -> Self {
        Self {
            id,
            token0,
            token1,
            sqrt_price: U160::ZERO,
            tick: None,
            liquidity: 0,
            token0_price: Default::default(),
            token1_price: Default::default(),
            total_value_locked_token0: Default::default(),
            total_value_locked_token1: Default::default(),
            tx_count: 0,
        }
    }

    /// Whether a position over `[tick_lower, tick_upper)` contributes to the
    /// active liquidity. Always false for a pool without a price.
    pub fn is_in_range(&self, tick_lower: i32, tick_upper: i32) -> bool {
        matches!(self.tick, Some(tick) if tick_lower <= tick && tick < tick_upper)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKey {
    Bundle(String),
    Factory(Address),
    Token(Address),
    Pool(Address),
}

impl Display for EntityKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Bundle(id) => write!(f, "bundle {id}"),
            EntityKey::Factory(address) => write!(f, "factory {address}"),
            EntityKey::Token(address) => write!(f, "token {address}"),
            EntityKey::Pool(address) => write!(f, "pool {address}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    Bundle(Bundle),
    Factory(Factory),
    Token(Token),
    Pool(Pool),
}

impl Entity {
    pub fn key(&self) -> EntityKey {
        match self {
            Entity::Bundle(bundle) => EntityKey::Bundle(bundle.id.clone()),
            Entity::Factory(factory) => EntityKey::Factory(factory.id),
            Entity::Token(token) => EntityKey::Token(token.id),
            Entity::Pool(pool) => EntityKey::Pool(pool.id),
        }
    }
}

macro_rules! impl_entity_conversions {
    ($($variant:ident),*) => {$(
        impl From<$variant> for Entity {
            fn from(value: $variant) -> Self {
                Entity::$variant(value)
            }
        }

        impl TryFrom<Entity> for $variant {
            type Error = Entity;

            fn try_from(value: Entity) -> Result<Self, Self::Error> {
                match value {
                    Entity::$variant(inner) => Ok(inner),
                    other => Err(other),
                }
            }
        }
    )*};
}

impl_entity_conversions!(Bundle, Factory, Token, Pool);

/// A required entity could not be loaded.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("could not load {0}")]
pub struct MissingEntity(pub EntityKey);

/// Key-value persistence for entities. Implementations only need to be
/// consistent: `get` returns what the last `put` for the same key stored.
pub trait EntityStore {
    fn get(&self, key: &EntityKey) -> Option<Entity>;

    fn put(&mut self, entity: Entity);
}

/// Typed access on top of [`EntityStore`].
pub trait EntityStoreExt: EntityStore {
    fn bundle(&self) -> Result<Bundle, MissingEntity> {
        load(self, EntityKey::Bundle(BUNDLE_ID.to_string()))
    }

    fn factory(&self, address: Address) -> Result<Factory, MissingEntity> {
        load(self, EntityKey::Factory(address))
    }

    fn token(&self, address: Address) -> Result<Token, MissingEntity> {
        load(self, EntityKey::Token(address))
    }

    fn pool(&self, address: Address) -> Result<Pool, MissingEntity> {
        load(self, EntityKey::Pool(address))
    }

    fn save(&mut self, entity: impl Into<Entity>) {
        self.put(entity.into())
    }
}

impl<S: EntityStore + ?Sized> EntityStoreExt for S {}

fn load<S, T>(store: &S, key: EntityKey) -> Result<T, MissingEntity>
where
    S: EntityStore + ?Sized,
    T: TryFrom<Entity>,
{
    store
        .get(&key)
        .and_then(|entity| T::try_from(entity).ok())
        .ok_or(MissingEntity(key))
}
