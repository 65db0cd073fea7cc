//! In-memory [`EntityStore`] and its JSON snapshot format.

use {
    crate::domain::entities::{Bundle, Entity, EntityKey, EntityStore, Factory, Pool, Token},
    anyhow::{Context, Result},
    serde::{Deserialize, Serialize},
    std::{collections::BTreeMap, path::Path},
    tokio::fs,
};

/// Entities ordered by key so that snapshots are deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InMemoryStore(BTreeMap<EntityKey, Entity>);

impl InMemoryStore {
    pub fn remove(&mut self, key: &EntityKey) -> Option<Entity> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for entity in self.0.values().cloned() {
            match entity {
                Entity::Bundle(bundle) => snapshot.bundle = Some(bundle),
                Entity::Factory(factory) => snapshot.factory = Some(factory),
                Entity::Token(token) => snapshot.tokens.push(token),
                Entity::Pool(pool) => snapshot.pools.push(pool),
            }
        }
        snapshot
    }
}

impl EntityStore for InMemoryStore {
    fn get(&self, key: &EntityKey) -> Option<Entity> {
        self.0.get(key).cloned()
    }

    fn put(&mut self, entity: Entity) {
        self.0.insert(entity.key(), entity);
    }
}

/// Full store contents. Used both to bootstrap the entities the event handlers
/// require and to write out the result of a replay.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Snapshot {
    #[serde(default)]
    pub bundle: Option<Bundle>,
    #[serde(default)]
    pub factory: Option<Factory>,
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub pools: Vec<Pool>,
}

impl From<Snapshot> for InMemoryStore {
    fn from(snapshot: Snapshot) -> Self {
        let mut store = Self::default();
        let entities = snapshot
            .bundle
            .map(Entity::from)
            .into_iter()
            .chain(snapshot.factory.map(Entity::from))
            .chain(snapshot.tokens.into_iter().map(Entity::from))
            .chain(snapshot.pools.into_iter().map(Entity::from));
        for entity in entities {
            store.put(entity);
        }
        store
    }
}

impl Snapshot {
    pub async fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .await
            .with_context(|| format!("reading snapshot {path:?}"))?;
        serde_json::from_str(&data).with_context(|| format!("parsing snapshot {path:?}"))
    }

    pub async fn write(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)
            .await
            .with_context(|| format!("writing snapshot {path:?}"))
    }
}
