use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use mafia_core::{ActionType, Catalog, Faction, Role, RoleId, TableRules};

/// Text that may be written either as one string or as a list of lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RawText {
    Line(String),
    Lines(Vec<String>),
}

impl RawText {
    pub fn joined(&self) -> String {
        match self {
            RawText::Line(line) => line.clone(),
            RawText::Lines(lines) => lines.join("\n"),
        }
    }
}

/// One entry of `roles.json`, before locale resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDef {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "i18n", alias = "locales")]
    pub names: HashMap<String, String>,
    pub description: RawText,
    #[serde(default)]
    pub descriptions: HashMap<String, RawText>,
    #[serde(default)]
    pub image: String,
    pub faction: Faction,
    #[serde(default)]
    pub actions: Vec<ActionType>,
}
