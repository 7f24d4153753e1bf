// repo

mod friend_request_repo;
mod player_repo;

mod repo_tx;
mod store_error;

pub use friend_request_repo::*;
pub use player_repo::*;

pub use repo_tx::*;
pub use store_error::*;
