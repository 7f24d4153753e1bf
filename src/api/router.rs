use super::handler;
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

/// Paths are matched before methods so that unknown paths reject as 404.
pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let health = warp::path!("health")
        .and(warp::get())
        .and_then(handler::health);

    let players = warp::path!("players")
        .and(warp::get())
        .and(with(server.friend_query_service.clone()))
        .and_then(handler::list_players);

    let login = warp::path!("login" / String)
        .and(warp::post())
        .and(with(server.player_service.clone()))
        .and_then(handler::login);

    let signup = warp::path!("signup" / String)
        .and(warp::post())
        .and(with(server.player_service.clone()))
        .and_then(handler::signup);

    let friends = warp::path!("friends" / String)
        .and(warp::get())
        .and(with(server.friend_query_service.clone()))
        .and_then(handler::list_friends);

    let send_request = warp::path!("friends" / "friendRequest")
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.friendship_service.clone()))
        .and_then(handler::send_friend_request);

    let accept_request = warp::path!("friends" / "friendRequest" / "accept")
        .and(warp::put())
        .and(warp::body::json())
        .and(with(server.friendship_service.clone()))
        .and_then(handler::accept_friend_request);

    let reject_request = warp::path!("friends" / "friendRequest" / "reject")
        .and(warp::put())
        .and(warp::body::json())
        .and(with(server.friendship_service.clone()))
        .and_then(handler::reject_friend_request);

    let sent_requests = warp::path!("friendRequest" / "sent" / String)
        .and(warp::get())
        .and(with(server.friend_query_service.clone()))
        .and_then(handler::sent_friend_requests);

    let received_requests = warp::path!("friendRequest" / "received" / String)
        .and(warp::get())
        .and(with(server.friend_query_service.clone()))
        .and_then(handler::received_friend_requests);

    let update_town = warp::path!("player" / "town")
        .and(warp::put())
        .and(warp::body::json())
        .and(with(server.player_service.clone()))
        .and_then(handler::update_town);

    health
        .or(players)
        .or(login)
        .or(signup)
        .or(friends)
        .or(send_request)
        .or(accept_request)
        .or(reject_request)
        .or(sent_requests)
        .or(received_requests)
        .or(update_town)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}
