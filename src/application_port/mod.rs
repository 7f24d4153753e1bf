mod friend_query_service;
mod friendship_service;
mod player_service;

pub use friend_query_service::*;
pub use friendship_service::*;
pub use player_service::*;
