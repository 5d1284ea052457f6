use crate::{Faction, Role};
use serde::{Deserialize, Serialize};

/// Session key under which the roster payload is stored.
pub const SETUP_KEY: &str = "mafia:setup";

/// Payload written by the setup screen and rewritten once cards are dealt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredSetup {
    pub player_count: u32,
    #[serde(rename = "cityCount")]
    pub town_count: u32,
    pub mafia_count: u32,
    pub include_independent: bool,
    pub independent_count: u32,
    pub roles: Vec<Role>,
}

impl StoredSetup {
    pub fn counts(&self) -> FactionCounts {
        FactionCounts::tally(&self.roles)
    }

    /// True once every card carries a player name.
    pub fn is_dealt(&self) -> bool {
        !self.roles.is_empty() && self.roles.iter().all(|role| !role.player_name().is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FactionCounts {
    pub town: usize,
    pub mafia: usize,
    pub independent: usize,
}

impl FactionCounts {
    pub fn tally(roles: &[Role]) -> Self {
        let mut counts = Self::default();
        for role in roles {
            match role.faction {
                Faction::Town => counts.town += 1,
                Faction::Mafia => counts.mafia += 1,
                Faction::Independent => counts.independent += 1,
            }
        }
        counts
    }

    pub fn get(&self, faction: Faction) -> usize {
        match faction {
            Faction::Town => self.town,
            Faction::Mafia => self.mafia,
            Faction::Independent => self.independent,
        }
    }

    pub fn total(&self) -> usize {
        self.town + self.mafia + self.independent
    }
}
