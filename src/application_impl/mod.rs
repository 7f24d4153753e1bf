mod friend_query_service_impl;
mod friendship_service_impl;
mod pair_locks;
mod player_service_impl;

pub use friend_query_service_impl::*;
pub use friendship_service_impl::*;
pub use pair_locks::*;
pub use player_service_impl::*;
