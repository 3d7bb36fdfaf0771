use std::sync::Arc;

use coinshop_auth::Hs256TokenCodec;
use coinshop_store::{MemoryStore, PgStore, ProfileAggregator, Store, TransactionCoordinator};

/// Wiring for one running instance: token codec, store backend and the two
/// core entry points built over it.
#[derive(Clone)]
pub struct AppServices {
    pub tokens: Arc<Hs256TokenCodec>,
    pub store: Arc<dyn Store>,
    pub coordinator: TransactionCoordinator,
    pub aggregator: ProfileAggregator,
}

impl AppServices {
    /// In-memory wiring (dev/test): seeded catalog, nothing durable.
    pub fn in_memory(jwt_secret: &str) -> Self {
        Self::from_store(jwt_secret, Arc::new(MemoryStore::new()))
    }

    /// Postgres wiring: connect the pool, create the schema if missing and
    /// seed the catalog.
    pub async fn postgres(jwt_secret: &str, database_url: &str) -> anyhow::Result<Self> {
        let pool = coinshop_store::postgres::connect(database_url).await?;
        let store = PgStore::new(pool);
        store.ensure_schema().await?;
        Ok(Self::from_store(jwt_secret, Arc::new(store)))
    }

    fn from_store(jwt_secret: &str, store: Arc<dyn Store>) -> Self {
        Self {
            tokens: Arc::new(Hs256TokenCodec::new(jwt_secret.as_bytes())),
            store: store.clone(),
            coordinator: TransactionCoordinator::new(store.clone()),
            aggregator: ProfileAggregator::new(store),
        }
    }
}
