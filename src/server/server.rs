use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::settings::Settings;
use nanoid::nanoid;
use sqlx::MySqlPool;
use std::sync::Arc;

/// Owns the store handle and the services built on it. Handlers only see the
/// service traits.
pub struct Server {
    pub run_id: String,
    pub player_service: Arc<dyn PlayerService>,
    pub friendship_service: Arc<dyn FriendshipService>,
    pub friend_query_service: Arc<dyn FriendQueryService>,
    pool: Option<MySqlPool>,
}

struct Storage {
    player_repo: Arc<dyn PlayerRepo>,
    friend_request_repo: Arc<dyn FriendRequestRepo>,
    tx_manager: Arc<dyn TxManager>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let (storage, pool) = match settings.store.backend.as_str() {
            "memory" => (Self::memory_storage(MemoryStore::new()), None),
            "mysql" => {
                let dsn = settings
                    .store
                    .mysql_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("store.mysql_dsn is required for mysql"))?;
                let pool = connect_pool(dsn, settings.store.max_connections).await?;
                let storage = Storage {
                    player_repo: Arc::new(MySqlPlayerRepo::new(pool.clone())),
                    friend_request_repo: Arc::new(MySqlFriendRequestRepo::new()),
                    tx_manager: Arc::new(MySqlTxManager::new(pool.clone())),
                };
                (storage, Some(pool))
            }
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        let server = Self::from_storage(storage, pool);
        info!(run_id = %server.run_id, backend = %settings.store.backend, "server started");
        Ok(server)
    }

    /// A server over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::with_memory_store(MemoryStore::new())
    }

    /// A server over an existing in-memory store, so callers can inspect it.
    pub fn with_memory_store(store: MemoryStore) -> Self {
        Self::from_storage(Self::memory_storage(store), None)
    }

    fn memory_storage(store: MemoryStore) -> Storage {
        Storage {
            player_repo: Arc::new(MemoryPlayerRepo::new(store.clone())),
            friend_request_repo: Arc::new(MemoryFriendRequestRepo::new()),
            tx_manager: Arc::new(MemoryTxManager::new(store)),
        }
    }

    fn from_storage(storage: Storage, pool: Option<MySqlPool>) -> Self {
        let alphabet: [char; 16] = [
            '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'a', 'b', 'c', 'd', 'e', 'f',
        ];
        let run_id = nanoid!(10, &alphabet);

        let Storage {
            player_repo,
            friend_request_repo,
            tx_manager,
        } = storage;
        let pair_locks = Arc::new(PairLocks::new());

        let player_service: Arc<dyn PlayerService> = Arc::new(RealPlayerService::new(
            player_repo.clone(),
            tx_manager.clone(),
        ));
        let friendship_service: Arc<dyn FriendshipService> =
            Arc::new(RealFriendshipService::new(
                player_repo.clone(),
                friend_request_repo.clone(),
                tx_manager.clone(),
                pair_locks,
            ));
        let friend_query_service: Arc<dyn FriendQueryService> =
            Arc::new(RealFriendQueryService::new(
                player_repo,
                friend_request_repo,
                tx_manager,
            ));

        Self {
            run_id,
            player_service,
            friendship_service,
            friend_query_service,
            pool,
        }
    }

    pub async fn shutdown(&self) {
        info!(run_id = %self.run_id, "server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
