use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_PLAYERS: u32 = 3;
pub const DEFAULT_MAX_PLAYERS: u32 = 30;
pub const DEFAULT_SWIPE_THRESHOLD: i32 = 24;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TableRules {
    #[serde(default = "default_min_players")]
    pub min_players: u32,
    #[serde(default = "default_max_players")]
    pub max_players: u32,
    #[serde(default = "default_swipe_threshold")]
    pub swipe_threshold: i32,
}

impl Default for TableRules {
    fn default() -> Self {
        Self {
            min_players: DEFAULT_MIN_PLAYERS,
            max_players: DEFAULT_MAX_PLAYERS,
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
        }
    }
}

impl TableRules {
    pub fn allows_players(&self, players: u32) -> bool {
        (self.min_players..=self.max_players).contains(&players)
    }
}

fn default_min_players() -> u32 {
    DEFAULT_MIN_PLAYERS
}

fn default_max_players() -> u32 {
    DEFAULT_MAX_PLAYERS
}

fn default_swipe_threshold() -> i32 {
    DEFAULT_SWIPE_THRESHOLD
}
