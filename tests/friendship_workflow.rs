mod support;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use support::{names, server_and_store_with_players, server_with_players};
use tokio::task::JoinSet;
use town_friends::application_impl::{
    PairLocks, RealFriendQueryService, RealFriendshipService, RealPlayerService,
};
use town_friends::application_port::*;
use town_friends::domain_model::{FriendRequestStatus, Player, PlayerId};
use town_friends::domain_port::{PlayerRepo, StorageTx, StoreError, TxManager};
use town_friends::infra_memory::{
    MemoryFriendRequestRepo, MemoryPlayerRepo, MemoryStore, MemoryTxManager,
};

#[tokio::test]
async fn sent_request_shows_up_as_received() {
    let server = server_with_players(&["alice", "bob"]).await;

    let sent = server
        .friendship_service
        .send_friend_request("alice", "bob")
        .await
        .unwrap();
    assert_eq!(sent.status, FriendRequestStatus::Pending);

    let received = server
        .friend_query_service
        .received_requests("bob")
        .await
        .unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].sending_player_name, "alice");
    assert_eq!(received[0].receiving_player_name, "bob");
    assert_eq!(received[0].status, FriendRequestStatus::Pending);

    let outgoing = server
        .friend_query_service
        .sent_requests("alice")
        .await
        .unwrap();
    assert_eq!(outgoing, received);
}

#[tokio::test]
async fn request_to_self_is_invalid() {
    let server = server_with_players(&["alice"]).await;

    let err = server
        .friendship_service
        .send_friend_request("alice", "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, FriendshipError::InvalidPlayers));
}

#[tokio::test]
async fn unknown_players_are_invalid() {
    let server = server_with_players(&["alice"]).await;
    let workflow = &server.friendship_service;

    assert!(matches!(
        workflow.send_friend_request("alice", "nobody").await,
        Err(FriendshipError::InvalidPlayers)
    ));
    assert!(matches!(
        workflow.send_friend_request("nobody", "alice").await,
        Err(FriendshipError::InvalidPlayers)
    ));
    assert!(matches!(
        workflow.accept_friend_request("nobody", "alice").await,
        Err(FriendshipError::InvalidPlayers)
    ));
    assert!(matches!(
        workflow.reject_friend_request("alice", "alice").await,
        Err(FriendshipError::InvalidPlayers)
    ));
}

#[tokio::test]
async fn accept_makes_players_mutual_friends() {
    let server = server_with_players(&["alice", "bob"]).await;
    let workflow = &server.friendship_service;
    let queries = &server.friend_query_service;

    workflow.send_friend_request("alice", "bob").await.unwrap();
    let accepted = workflow.accept_friend_request("alice", "bob").await.unwrap();
    assert_eq!(accepted.status, FriendRequestStatus::Accepted);
    assert!(accepted.updated_at >= accepted.created_at);

    assert_eq!(names(&queries.friends_of("alice").await.unwrap()), ["bob"]);
    assert_eq!(names(&queries.friends_of("bob").await.unwrap()), ["alice"]);

    // accepted requests leave the pending projections
    assert!(queries.received_requests("bob").await.unwrap().is_empty());
    assert!(queries.sent_requests("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn reject_leaves_friend_lists_alone() {
    let server = server_with_players(&["alice", "bob"]).await;
    let workflow = &server.friendship_service;
    let queries = &server.friend_query_service;

    workflow.send_friend_request("alice", "bob").await.unwrap();
    let rejected = workflow.reject_friend_request("alice", "bob").await.unwrap();
    assert_eq!(rejected.status, FriendRequestStatus::Rejected);

    assert!(queries.friends_of("alice").await.unwrap().is_empty());
    assert!(queries.friends_of("bob").await.unwrap().is_empty());
    assert!(queries.received_requests("bob").await.unwrap().is_empty());

    // a rejected pair may try again
    workflow.send_friend_request("bob", "alice").await.unwrap();
}

#[tokio::test]
async fn accept_without_request_is_not_found() {
    let server = server_with_players(&["alice", "bob"]).await;

    let err = server
        .friendship_service
        .accept_friend_request("alice", "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, FriendshipError::RequestNotFound));
}

#[tokio::test]
async fn accept_is_directional() {
    let server = server_with_players(&["alice", "bob"]).await;
    let workflow = &server.friendship_service;

    workflow.send_friend_request("alice", "bob").await.unwrap();
    assert!(matches!(
        workflow.accept_friend_request("bob", "alice").await,
        Err(FriendshipError::RequestNotFound)
    ));
}

#[tokio::test]
async fn resolved_requests_cannot_be_resolved_again() {
    let server = server_with_players(&["alice", "bob"]).await;
    let workflow = &server.friendship_service;

    workflow.send_friend_request("alice", "bob").await.unwrap();
    workflow.accept_friend_request("alice", "bob").await.unwrap();

    assert!(matches!(
        workflow.accept_friend_request("alice", "bob").await,
        Err(FriendshipError::RequestNotFound)
    ));
    assert!(matches!(
        workflow.reject_friend_request("alice", "bob").await,
        Err(FriendshipError::RequestNotFound)
    ));

    let alice = server.friend_query_service.friends_of("alice").await.unwrap();
    assert_eq!(names(&alice), ["bob"]);
}

#[tokio::test]
async fn duplicate_pending_request_is_refused_in_either_direction() {
    let server = server_with_players(&["alice", "bob"]).await;
    let workflow = &server.friendship_service;

    workflow.send_friend_request("alice", "bob").await.unwrap();
    assert!(matches!(
        workflow.send_friend_request("alice", "bob").await,
        Err(FriendshipError::RequestAlreadyPending)
    ));
    assert!(matches!(
        workflow.send_friend_request("bob", "alice").await,
        Err(FriendshipError::RequestAlreadyPending)
    ));
    assert_eq!(
        server
            .friend_query_service
            .received_requests("bob")
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn friends_cannot_request_each_other_again() {
    let server = server_with_players(&["alice", "bob"]).await;
    let workflow = &server.friendship_service;

    workflow.send_friend_request("alice", "bob").await.unwrap();
    workflow.accept_friend_request("alice", "bob").await.unwrap();

    assert!(matches!(
        workflow.send_friend_request("bob", "alice").await,
        Err(FriendshipError::AlreadyFriends)
    ));
}

#[tokio::test]
async fn scenario_alice_and_bob() {
    let server = server_with_players(&["alice", "bob"]).await;
    let workflow = &server.friendship_service;
    let queries = &server.friend_query_service;

    let pending = workflow.send_friend_request("alice", "bob").await.unwrap();
    assert_eq!(pending.status, FriendRequestStatus::Pending);

    let accepted = workflow.accept_friend_request("alice", "bob").await.unwrap();
    assert_eq!(accepted.id, pending.id);
    assert_eq!(accepted.status, FriendRequestStatus::Accepted);

    assert_eq!(names(&queries.friends_of("alice").await.unwrap()), ["bob"]);
    assert_eq!(names(&queries.friends_of("bob").await.unwrap()), ["alice"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_accepts_apply_once() {
    let server = server_with_players(&["alice", "bob"]).await;
    server
        .friendship_service
        .send_friend_request("alice", "bob")
        .await
        .unwrap();

    let mut attempts = JoinSet::new();
    for _ in 0..8 {
        let server = server.clone();
        attempts.spawn(async move {
            server
                .friendship_service
                .accept_friend_request("alice", "bob")
                .await
        });
    }

    let mut accepted = 0;
    while let Some(result) = attempts.join_next().await {
        match result.unwrap() {
            Ok(request) => {
                assert_eq!(request.status, FriendRequestStatus::Accepted);
                accepted += 1;
            }
            Err(FriendshipError::RequestNotFound) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(accepted, 1);

    let players = server.friend_query_service.all_players().await.unwrap();
    for player in players {
        assert_eq!(player.friend_ids.len(), 1, "{}", player.player_name);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn crossing_requests_leave_one_pending() {
    let server = server_with_players(&["alice", "bob"]).await;

    let a = {
        let server = server.clone();
        tokio::spawn(async move {
            server
                .friendship_service
                .send_friend_request("alice", "bob")
                .await
        })
    };
    let b = {
        let server = server.clone();
        tokio::spawn(async move {
            server
                .friendship_service
                .send_friend_request("bob", "alice")
                .await
        })
    };
    let (a, b) = (a.await.unwrap(), b.await.unwrap());

    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser, Err(FriendshipError::RequestAlreadyPending)));
}

#[tokio::test]
async fn dangling_friend_id_is_reported() {
    let (server, store) = server_and_store_with_players(&["alice"]).await;

    // corrupt the directory behind the services' back
    let tx_manager = MemoryTxManager::new(store.clone());
    let repo = MemoryPlayerRepo::new(store);
    let ghost = PlayerId::new_v4();
    let mut tx = tx_manager.begin().await.unwrap();
    let alice = repo
        .find_by_name_in_tx(&mut *tx, "alice")
        .await
        .unwrap()
        .unwrap();
    repo.append_friend_in_tx(&mut *tx, alice.id, ghost)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    match server.friend_query_service.friends_of("alice").await {
        Err(FriendshipError::UnresolvedFriendId(id)) => assert_eq!(id, ghost),
        other => panic!("expected unresolved friend id, got {other:?}"),
    }
}

/// Delegates to the memory directory but fails the n-th friend append.
struct FailingAppendRepo {
    inner: MemoryPlayerRepo,
    appends: AtomicUsize,
    fail_on: usize,
}

#[async_trait::async_trait]
impl PlayerRepo for FailingAppendRepo {
    async fn list_all(&self) -> Result<Vec<Player>, StoreError> {
        self.inner.list_all().await
    }

    async fn find_by_name_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        player_name: &str,
    ) -> Result<Option<Player>, StoreError> {
        self.inner.find_by_name_in_tx(tx, player_name).await
    }

    async fn find_by_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        player_id: PlayerId,
    ) -> Result<Option<Player>, StoreError> {
        self.inner.find_by_id_in_tx(tx, player_id).await
    }

    async fn insert_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        player: &Player,
    ) -> Result<Player, StoreError> {
        self.inner.insert_in_tx(tx, player).await
    }

    async fn append_friend_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        player_id: PlayerId,
        friend_id: PlayerId,
    ) -> Result<(), StoreError> {
        if self.appends.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
            return Err(StoreError::Store("append friend: disk full".to_string()));
        }
        self.inner.append_friend_in_tx(tx, player_id, friend_id).await
    }

    async fn set_current_town_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        player_name: &str,
        town_id: Option<&str>,
    ) -> Result<bool, StoreError> {
        self.inner
            .set_current_town_in_tx(tx, player_name, town_id)
            .await
    }
}

#[tokio::test]
async fn failed_accept_rolls_everything_back() {
    let store = MemoryStore::new();
    let player_repo: Arc<dyn PlayerRepo> = Arc::new(FailingAppendRepo {
        inner: MemoryPlayerRepo::new(store.clone()),
        appends: AtomicUsize::new(0),
        fail_on: 2,
    });
    let friend_request_repo = Arc::new(MemoryFriendRequestRepo::new());
    let tx_manager: Arc<dyn TxManager> = Arc::new(MemoryTxManager::new(store));

    let players = RealPlayerService::new(player_repo.clone(), tx_manager.clone());
    let workflow = RealFriendshipService::new(
        player_repo.clone(),
        friend_request_repo.clone(),
        tx_manager.clone(),
        Arc::new(PairLocks::new()),
    );
    let queries = RealFriendQueryService::new(player_repo, friend_request_repo, tx_manager);

    players.signup("alice").await.unwrap();
    players.signup("bob").await.unwrap();
    let sent = workflow.send_friend_request("alice", "bob").await.unwrap();

    // the second append (bob -> alice) fails after the status CAS and first append
    assert!(matches!(
        workflow.accept_friend_request("alice", "bob").await,
        Err(FriendshipError::Store(_))
    ));

    let pending = queries.received_requests("bob").await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, sent.id);
    assert_eq!(pending[0].status, FriendRequestStatus::Pending);
    for player in queries.all_players().await.unwrap() {
        assert!(player.friend_ids.is_empty(), "{}", player.player_name);
    }

    // the failure was one-off; the same request can still be accepted
    let accepted = workflow.accept_friend_request("alice", "bob").await.unwrap();
    assert_eq!(accepted.id, sent.id);
    assert_eq!(names(&queries.friends_of("alice").await.unwrap()), ["bob"]);
    assert_eq!(names(&queries.friends_of("bob").await.unwrap()), ["alice"]);
}
