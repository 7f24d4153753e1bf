use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_PLAYER_NAME_LEN: usize = 64;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct PlayerId(pub uuid::Uuid);

impl PlayerId {
    pub fn new_v4() -> Self {
        PlayerId(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PlayerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(PlayerId)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub player_name: String,
    pub friend_ids: Vec<PlayerId>,
    pub current_town_id: Option<String>,
}

impl Player {
    pub fn new(player_name: impl Into<String>) -> Self {
        Player {
            id: PlayerId::new_v4(),
            player_name: player_name.into(),
            friend_ids: Vec::new(),
            current_town_id: None,
        }
    }

    pub fn is_friend_of(&self, other: PlayerId) -> bool {
        self.friend_ids.contains(&other)
    }
}

/// Checks a handle chosen at signup. Returns the trimmed name.
pub fn validate_player_name(name: &str) -> Result<&str, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("player name must not be empty".to_string());
    }
    if name.chars().count() > MAX_PLAYER_NAME_LEN {
        return Err(format!(
            "player name must be at most {MAX_PLAYER_NAME_LEN} characters"
        ));
    }
    // names travel as raw URL path segments
    if let Some(c) = name
        .chars()
        .find(|c| c.is_whitespace() || matches!(c, '/' | '%' | '?' | '#'))
    {
        return Err(format!("player name must not contain {c:?}"));
    }
    Ok(name)
}

/// Unordered pair of players, used as the lock key for anything touching both.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct PlayerPair(PlayerId, PlayerId);

impl PlayerPair {
    pub fn new(a: PlayerId, b: PlayerId) -> Self {
        if a < b { Self(a, b) } else { Self(b, a) }
    }

    pub fn min(&self) -> PlayerId {
        self.0
    }

    pub fn max(&self) -> PlayerId {
        self.1
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.0 == id || self.1 == id
    }
}
