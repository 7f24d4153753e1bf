use crate::api::handler::ApiResponse;
use crate::application_port::*;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

const INTERNAL_MESSAGE: &str = "Internal server error, please see log in server for more details";

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let (status, body) = if let Some(code) = err.find::<ApiErrorCode>() {
        let message = match code {
            ApiErrorCode::StoreError | ApiErrorCode::InternalError => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        };
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiResponse::<()>::err(code.is_database_error(), message),
        )
    } else if err.is_not_found() {
        (
            StatusCode::NOT_FOUND,
            ApiResponse::<()>::err(false, "Route not found"),
        )
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (
            StatusCode::BAD_REQUEST,
            ApiResponse::<()>::err(false, format!("Invalid request body: {e}")),
        )
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            ApiResponse::<()>::err(false, "Method not allowed"),
        )
    } else {
        warn!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiResponse::<()>::err(false, INTERNAL_MESSAGE),
        )
    };

    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}

/// Every workflow failure surfaces as HTTP 500; the code only picks the message.
#[derive(Debug, Clone, Error)]
pub enum ApiErrorCode {
    #[error("Players are missing or identical")]
    InvalidPlayers,
    #[error("No pending friend request found between the players")]
    RequestNotFound,
    #[error("A friend request between the players is already pending")]
    RequestAlreadyPending,
    #[error("Players are already friends")]
    AlreadyFriends,
    #[error("Player details not found")]
    PlayerNotFound,
    #[error("Friend list refers to an unknown player")]
    UnresolvedFriendId,
    #[error("Database error")]
    StoreError,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    fn store<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Store error: {}", error);
        ApiErrorCode::StoreError
    }

    pub fn is_database_error(&self) -> bool {
        matches!(
            self,
            ApiErrorCode::StoreError | ApiErrorCode::UnresolvedFriendId
        )
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<FriendshipError> for ApiErrorCode {
    fn from(error: FriendshipError) -> Self {
        match error {
            FriendshipError::InvalidPlayers => ApiErrorCode::InvalidPlayers,
            FriendshipError::RequestNotFound => ApiErrorCode::RequestNotFound,
            FriendshipError::RequestAlreadyPending => ApiErrorCode::RequestAlreadyPending,
            FriendshipError::AlreadyFriends => ApiErrorCode::AlreadyFriends,
            FriendshipError::PlayerNotFound => ApiErrorCode::PlayerNotFound,
            FriendshipError::UnresolvedFriendId(id) => {
                warn!("friend id {} does not resolve", id);
                ApiErrorCode::UnresolvedFriendId
            }
            FriendshipError::Store(e) => ApiErrorCode::store(e),
        }
    }
}

impl From<PlayerError> for ApiErrorCode {
    fn from(error: PlayerError) -> Self {
        match error {
            PlayerError::PlayerNotFound => ApiErrorCode::PlayerNotFound,
            PlayerError::Store(e) => ApiErrorCode::store(e),
            e @ (PlayerError::PlayerExists | PlayerError::InvalidName(_)) => {
                ApiErrorCode::internal(e)
            }
        }
    }
}
