use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Faction {
    #[serde(rename = "city", alias = "town")]
    Town,
    #[serde(rename = "mafia")]
    Mafia,
    #[serde(rename = "independent")]
    Independent,
}

impl Faction {
    pub const ALL: [Faction; 3] = [Faction::Town, Faction::Mafia, Faction::Independent];

    pub fn id(self) -> &'static str {
        match self {
            Faction::Town => "city",
            Faction::Mafia => "mafia",
            Faction::Independent => "independent",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    None,
    Investigate,
    Health,
    Shot,
    Block,
    Silence,
    Recruit,
    Slaughter,
    GiveItem,
    RiskWake,
    BuffOrCleanse,
    ReviveVotedOut,
    RevengeOnVoteOut,
    Armor,
    AlwaysNegative,
    NightImmunityTriggered,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ActionPhase {
    Intro,
    Night,
    Day,
    Passive,
}

impl ActionType {
    /// When the narrator calls on this ability. Informational only.
    pub fn phase(self) -> ActionPhase {
        match self {
            ActionType::None => ActionPhase::Intro,
            ActionType::Investigate
            | ActionType::Health
            | ActionType::Shot
            | ActionType::Block
            | ActionType::Silence
            | ActionType::Recruit
            | ActionType::Slaughter
            | ActionType::GiveItem
            | ActionType::RiskWake
            | ActionType::BuffOrCleanse
            | ActionType::ReviveVotedOut => ActionPhase::Night,
            ActionType::RevengeOnVoteOut => ActionPhase::Day,
            ActionType::Armor | ActionType::AlwaysNegative | ActionType::NightImmunityTriggered => {
                ActionPhase::Passive
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RoleId(pub String);

impl RoleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoleId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

pub const DEFAULT_TOWN_ROLE: &str = "citizen";
pub const DEFAULT_MAFIA_ROLE: &str = "mafia";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub description: String,
    pub image: String,
    pub faction: Faction,
    pub actions: Vec<ActionType>,
    #[serde(default)]
    pub player: Option<String>,
}

impl Role {
    /// Copy of this role with an empty player slot, as placed in a fresh roster.
    pub fn unassigned(&self) -> Self {
        Self {
            player: Some(String::new()),
            ..self.clone()
        }
    }

    pub fn player_name(&self) -> &str {
        self.player.as_deref().unwrap_or("").trim()
    }

    /// Any role other than the two defaults and the independents.
    pub fn is_special(&self) -> bool {
        match self.faction {
            Faction::Town => self.id.as_str() != DEFAULT_TOWN_ROLE,
            Faction::Mafia => self.id.as_str() != DEFAULT_MAFIA_ROLE,
            Faction::Independent => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    roles: Vec<Role>,
}

impl Catalog {
    pub fn new(roles: Vec<Role>) -> Self {
        Self { roles }
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Role> {
        self.roles.iter().find(|role| role.id.as_str() == id)
    }

    pub fn by_faction(&self, faction: Faction) -> impl Iterator<Item = &Role> + '_ {
        self.roles.iter().filter(move |role| role.faction == faction)
    }

    pub fn independent_ids(&self) -> Vec<RoleId> {
        self.by_faction(Faction::Independent)
            .map(|role| role.id.clone())
            .collect()
    }

    pub fn mandatory_town(&self) -> Option<&Role> {
        self.get(DEFAULT_TOWN_ROLE)
    }

    pub fn mandatory_mafia(&self) -> Option<&Role> {
        self.get(DEFAULT_MAFIA_ROLE)
    }

    pub fn is_mandatory(&self, id: &str) -> bool {
        id == DEFAULT_TOWN_ROLE || id == DEFAULT_MAFIA_ROLE
    }
}
