#![allow(dead_code)]

use std::sync::Arc;
use town_friends::infra_memory::MemoryStore;
use town_friends::server::Server;

pub async fn server_with_players(names: &[&str]) -> Arc<Server> {
    let (server, _) = server_and_store_with_players(names).await;
    server
}

pub async fn server_and_store_with_players(names: &[&str]) -> (Arc<Server>, MemoryStore) {
    let store = MemoryStore::new();
    let server = Arc::new(Server::with_memory_store(store.clone()));
    for name in names {
        server
            .player_service
            .signup(name)
            .await
            .expect("signup fixture player");
    }
    (server, store)
}

pub fn names(players: &[town_friends::domain_model::Player]) -> Vec<&str> {
    players.iter().map(|p| p.player_name.as_str()).collect()
}
