use mafia_core::{ActionType, Catalog, Faction, Role, RoleId};

fn role(id: &str, faction: Faction, action: ActionType) -> Role {
    Role {
        id: RoleId::new(id),
        name: id.to_string(),
        description: format!("{id} description"),
        image: format!("{id}.png"),
        faction,
        actions: vec![action],
        player: None,
    }
}

/// Same ordering as the shipped catalog.
pub fn catalog() -> Catalog {
    Catalog::new(vec![
        role("citizen", Faction::Town, ActionType::None),
        role("detective", Faction::Town, ActionType::Investigate),
        role("doctor", Faction::Town, ActionType::Health),
        role("sniper", Faction::Town, ActionType::Shot),
        role("hardHealth", Faction::Town, ActionType::Armor),
        role("wizard", Faction::Town, ActionType::Block),
        role("angel", Faction::Town, ActionType::ReviveVotedOut),
        role("general", Faction::Town, ActionType::RiskWake),
        role("moreno", Faction::Town, ActionType::GiveItem),
        role("priest", Faction::Town, ActionType::BuffOrCleanse),
        role("mafia", Faction::Mafia, ActionType::None),
        role("godFather", Faction::Mafia, ActionType::Shot),
        role("doctorLecto", Faction::Mafia, ActionType::Health),
        role("negotiator", Faction::Mafia, ActionType::Recruit),
        role("silencer", Faction::Mafia, ActionType::Silence),
        role("terrorist", Faction::Mafia, ActionType::RevengeOnVoteOut),
        role("joker", Faction::Independent, ActionType::Shot),
    ])
}

pub fn ids(roles: &[Role]) -> Vec<&str> {
    roles.iter().map(|role| role.id.as_str()).collect()
}
