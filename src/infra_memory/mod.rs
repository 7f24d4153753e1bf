//! In-process store backend. Selected with `store.backend = "memory"` and used by
//! the integration tests; state is lost on restart.

mod friend_request_repo_memory;
mod memory_store;
mod player_repo_memory;

pub use friend_request_repo_memory::*;
pub use memory_store::*;
pub use player_repo_memory::*;

mod util;
