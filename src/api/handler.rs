use super::error::*;
use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::{self, reject};

/// Envelope wrapped around every response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub database_error: bool,
    #[serde(rename = "isOK")]
    pub is_ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(response: T) -> Self {
        ApiResponse {
            database_error: false,
            is_ok: true,
            message: None,
            response: Some(response),
        }
    }

    pub fn ok_empty() -> Self {
        ApiResponse {
            database_error: false,
            is_ok: true,
            message: None,
            response: None,
        }
    }

    /// An expected negative outcome, e.g. an unknown name at login.
    pub fn not_ok(message: impl Into<String>) -> Self {
        ApiResponse {
            database_error: false,
            is_ok: false,
            message: Some(message.into()),
            response: None,
        }
    }

    pub fn err(database_error: bool, message: impl Into<String>) -> Self {
        ApiResponse {
            database_error,
            is_ok: false,
            message: Some(message.into()),
            response: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: PlayerId,
    pub player_name: String,
    pub friend_ids: Vec<PlayerId>,
    pub current_town_id: String,
}

impl From<Player> for PlayerView {
    fn from(player: Player) -> Self {
        PlayerView {
            id: player.id,
            player_name: player.player_name,
            friend_ids: player.friend_ids,
            current_town_id: player.current_town_id.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestView {
    pub id: FriendRequestId,
    pub sending_player_id: PlayerId,
    pub sending_player_name: String,
    pub receiving_player_id: PlayerId,
    pub receiving_player_name: String,
    pub status: FriendRequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FriendRequest> for FriendRequestView {
    fn from(r: FriendRequest) -> Self {
        FriendRequestView {
            id: r.id,
            sending_player_id: r.sending_player_id,
            sending_player_name: r.sending_player_name,
            receiving_player_id: r.receiving_player_id,
            receiving_player_name: r.receiving_player_name,
            status: r.status,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

fn players_view(players: Vec<Player>) -> Vec<PlayerView> {
    players.into_iter().map(PlayerView::from).collect()
}

fn requests_view(requests: Vec<FriendRequest>) -> Vec<FriendRequestView> {
    requests.into_iter().map(FriendRequestView::from).collect()
}

pub async fn health() -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&ApiResponse::ok("ok")))
}

pub async fn list_players(
    friend_query_service: Arc<dyn FriendQueryService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let players = friend_query_service
        .all_players()
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(players_view(players))))
}

pub async fn login(
    player_name: String,
    player_service: Arc<dyn PlayerService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let player = player_service
        .login(&player_name)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let response = match player {
        Some(player) => ApiResponse::ok(PlayerView::from(player)),
        None => ApiResponse::not_ok("User details not available in database. Cannot login."),
    };
    Ok(warp::reply::json(&response))
}

pub async fn signup(
    player_name: String,
    player_service: Arc<dyn PlayerService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let response = match player_service.signup(&player_name).await {
        Ok(player) => ApiResponse::ok(PlayerView::from(player)),
        Err(PlayerError::PlayerExists) => ApiResponse::not_ok(
            "User details already in database. Cannot signup with the same player name.",
        ),
        Err(PlayerError::InvalidName(reason)) => ApiResponse::not_ok(reason),
        Err(e) => return Err(reject::custom(ApiErrorCode::from(e))),
    };
    Ok(warp::reply::json(&response))
}

pub async fn list_friends(
    player_name: String,
    friend_query_service: Arc<dyn FriendQueryService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let friends = friend_query_service
        .friends_of(&player_name)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(players_view(friends))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestBody {
    pub from_player_name: String,
    pub to_player_name: String,
}

pub async fn send_friend_request(
    body: FriendRequestBody,
    friendship_service: Arc<dyn FriendshipService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let request = friendship_service
        .send_friend_request(&body.from_player_name, &body.to_player_name)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(FriendRequestView::from(
        request,
    ))))
}

pub async fn accept_friend_request(
    body: FriendRequestBody,
    friendship_service: Arc<dyn FriendshipService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let request = friendship_service
        .accept_friend_request(&body.from_player_name, &body.to_player_name)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(FriendRequestView::from(
        request,
    ))))
}

pub async fn reject_friend_request(
    body: FriendRequestBody,
    friendship_service: Arc<dyn FriendshipService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let request = friendship_service
        .reject_friend_request(&body.from_player_name, &body.to_player_name)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(FriendRequestView::from(
        request,
    ))))
}

pub async fn sent_friend_requests(
    player_name: String,
    friend_query_service: Arc<dyn FriendQueryService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let requests = friend_query_service
        .sent_requests(&player_name)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(requests_view(requests))))
}

pub async fn received_friend_requests(
    player_name: String,
    friend_query_service: Arc<dyn FriendQueryService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let requests = friend_query_service
        .received_requests(&player_name)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(requests_view(requests))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TownUpdateBody {
    pub player_name: String,
    #[serde(default)]
    pub town_id: String,
}

pub async fn update_town(
    body: TownUpdateBody,
    player_service: Arc<dyn PlayerService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    player_service
        .update_town(&body.player_name, &body.town_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::<()>::ok_empty()))
}
