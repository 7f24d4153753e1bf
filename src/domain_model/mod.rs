mod friend_request;
mod player;

pub use friend_request::*;
pub use player::*;
