//! In-memory event source and the JSON lines event file format.

use {
    crate::{
        boundary::abi,
        domain::events::{
            Burn,
            EventSource,
            Initialize,
            LoggedEvent,
            Mint,
            PoolEvent,
            Swap,
            WithAddress,
        },
        infra::observe,
    },
    alloy_primitives::{Address, B256, Bytes, I256, Log, U160, U256},
    anyhow::{Context, Result},
    number::serialization::HexOrDecimal,
    serde::Deserialize,
    serde_with::{DisplayFromStr, serde_as},
    std::{collections::BTreeMap, ops::Bound, path::Path},
    tokio::fs,
};

/// Events ordered by `(block, log_index)`, delivered in that order.
#[derive(Debug, Default)]
pub struct OrderedEvents {
    events: BTreeMap<(u64, u64), PoolEvent>,
    /// Position of the last delivered event.
    cursor: Option<(u64, u64)>,
}

impl OrderedEvents {
    pub fn new(events: impl IntoIterator<Item = LoggedEvent>) -> Self {
        let mut source = Self::default();
        source.append(events);
        source
    }

    /// Adds events. An event at an already known position replaces the old
    /// one.
    pub fn append(&mut self, events: impl IntoIterator<Item = LoggedEvent>) {
        for event in events {
            self.events.insert(event.position(), event.event);
        }
    }

    /// Replaces every event from `from_block` onwards with the corrected
    /// canonical sequence. Returns how many of the removed events had already
    /// been delivered; their effects can't be taken back.
    ///
    /// Delivery continues after the last delivered position, so corrected
    /// events at or before it are never delivered.
    pub fn replace(
        &mut self,
        from_block: u64,
        events: impl IntoIterator<Item = LoggedEvent>,
    ) -> usize {
        let removed = self.events.split_off(&(from_block, 0));
        let delivered = match self.cursor {
            Some(cursor) => removed.keys().filter(|position| **position <= cursor).count(),
            None => 0,
        };
        if delivered > 0 {
            observe::reorg_after_delivery(from_block, delivered);
        }
        self.append(events);
        delivered
    }

    /// Number of events not delivered yet.
    pub fn pending(&self) -> usize {
        self.remaining().count()
    }

    fn remaining(&self) -> impl Iterator<Item = (&(u64, u64), &PoolEvent)> {
        let start = match self.cursor {
            Some(cursor) => Bound::Excluded(cursor),
            None => Bound::Unbounded,
        };
        self.events.range((start, Bound::Unbounded))
    }

    /// Reads a file with one JSON encoded event per line. Empty lines are
    /// ignored.
    pub async fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .await
            .with_context(|| format!("reading events {path:?}"))?;
        let events = parse_lines(&data).with_context(|| format!("parsing events {path:?}"))?;
        Ok(Self::new(events))
    }
}

impl EventSource for OrderedEvents {
    fn next_event(&mut self) -> Option<LoggedEvent> {
        let (&(block, log_index), event) = self.remaining().next()?;
        let event = LoggedEvent {
            block,
            log_index,
            event: event.clone(),
        };
        self.cursor = Some((block, log_index));
        Some(event)
    }
}

/// Parses one event per line, either already decoded or as a raw log. Raw logs
/// of events the indexer doesn't handle are dropped.
pub fn parse_lines(data: &str) -> Result<Vec<LoggedEvent>> {
    let mut events = Vec::new();
    for (i, line) in data.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line: dto::Line =
            serde_json::from_str(line).with_context(|| format!("line {}", i + 1))?;
        if let Some(event) = line.into_event().with_context(|| format!("line {}", i + 1))? {
            events.push(event);
        }
    }
    Ok(events)
}

mod dto {
    use super::*;

    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    pub enum Line {
        Decoded(Decoded),
        Raw(Raw),
    }

    impl Line {
        pub fn into_event(self) -> Result<Option<LoggedEvent>> {
            match self {
                Line::Decoded(decoded) => Ok(Some(decoded.into())),
                Line::Raw(raw) => {
                    let log = Log::new(raw.address, raw.topics, raw.data)
                        .context("too many topics")?;
                    Ok(abi::decode(&log)?.map(|event| LoggedEvent {
                        block: raw.block,
                        log_index: raw.log_index,
                        event,
                    }))
                }
            }
        }
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Decoded {
        pub block: u64,
        pub log_index: u64,
        pub pool: Address,
        #[serde(flatten)]
        pub event: Event,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Raw {
        pub block: u64,
        pub log_index: u64,
        pub address: Address,
        pub topics: Vec<B256>,
        pub data: Bytes,
    }

    #[serde_as]
    #[derive(Debug, Deserialize)]
    #[serde(tag = "event", rename_all = "camelCase")]
    pub enum Event {
        #[serde(rename_all = "camelCase")]
        Initialize {
            #[serde_as(as = "HexOrDecimal")]
            sqrt_price_x96: U160,
            tick: i32,
        },
        #[serde(rename_all = "camelCase")]
        Mint {
            #[serde_as(as = "HexOrDecimal")]
            amount0: U256,
            #[serde_as(as = "HexOrDecimal")]
            amount1: U256,
            #[serde_as(as = "DisplayFromStr")]
            amount: u128,
            tick_lower: i32,
            tick_upper: i32,
        },
        #[serde(rename_all = "camelCase")]
        Burn {
            #[serde_as(as = "HexOrDecimal")]
            amount0: U256,
            #[serde_as(as = "HexOrDecimal")]
            amount1: U256,
            #[serde_as(as = "DisplayFromStr")]
            amount: u128,
            tick_lower: i32,
            tick_upper: i32,
        },
        #[serde(rename_all = "camelCase")]
        Swap {
            #[serde_as(as = "HexOrDecimal")]
            amount0: I256,
            #[serde_as(as = "HexOrDecimal")]
            amount1: I256,
            #[serde_as(as = "HexOrDecimal")]
            sqrt_price_x96: U160,
            #[serde_as(as = "DisplayFromStr")]
            liquidity: u128,
            tick: i32,
        },
    }

    impl From<Decoded> for LoggedEvent {
        fn from(line: Decoded) -> Self {
            let pool = line.pool;
            let event = match line.event {
                Event::Initialize {
                    sqrt_price_x96,
                    tick,
                } => PoolEvent::Initialize(WithAddress(
                    Initialize {
                        sqrt_price_x96,
                        tick,
                    },
                    pool,
                )),
                Event::Mint {
                    amount0,
                    amount1,
                    amount,
                    tick_lower,
                    tick_upper,
                } => PoolEvent::Mint(WithAddress(
                    Mint {
                        amount0,
                        amount1,
                        amount,
                        tick_lower,
                        tick_upper,
                    },
                    pool,
                )),
                Event::Burn {
                    amount0,
                    amount1,
                    amount,
                    tick_lower,
                    tick_upper,
                } => PoolEvent::Burn(WithAddress(
                    Burn {
                        amount0,
                        amount1,
                        amount,
                        tick_lower,
                        tick_upper,
                    },
                    pool,
                )),
                Event::Swap {
                    amount0,
                    amount1,
                    sqrt_price_x96,
                    liquidity,
                    tick,
                } => PoolEvent::Swap(WithAddress(
                    Swap {
                        amount0,
                        amount1,
                        sqrt_price_x96,
                        liquidity,
                        tick,
                    },
                    pool,
                )),
            };
            LoggedEvent {
                block: line.block,
                log_index: line.log_index,
                event,
            }
        }
    }
}
