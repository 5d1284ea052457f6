use crate::{
    Catalog, Event, EventBus, Faction, Role, RoleId, StoredSetup, TableRules, DEFAULT_MAFIA_ROLE,
    DEFAULT_TOWN_ROLE,
};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("player count {players} outside {min}..={max}")]
    PlayerCountOutOfRange { players: u32, min: u32, max: u32 },
    #[error("team counts not ready: {town} town + {mafia} mafia + {independent} independent != {players} players")]
    CountsNotReady {
        players: u32,
        town: u32,
        mafia: u32,
        independent: u32,
    },
    #[error("catalog has no default role {0}")]
    MissingDefaultRole(&'static str),
}

/// Checkbox state of one catalog role on the setup screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSlot {
    pub checked: bool,
    pub disabled: bool,
}

/// Parses a count field. Blank or non-numeric input means "unset".
pub fn parse_count(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<u32>().ok()
}

#[derive(Debug, Clone)]
pub struct SetupForm {
    catalog: Catalog,
    rules: TableRules,
    players: Option<u32>,
    town: Option<u32>,
    mafia: Option<u32>,
    include_independent: bool,
    selected: BTreeSet<RoleId>,
}

impl SetupForm {
    pub fn new(catalog: Catalog, rules: TableRules) -> Self {
        let mut form = Self {
            catalog,
            rules,
            players: None,
            town: None,
            mafia: None,
            include_independent: false,
            selected: BTreeSet::new(),
        };
        form.reconcile();
        form
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self) -> &TableRules {
        &self.rules
    }

    pub fn player_count(&self) -> Option<u32> {
        self.players
    }

    pub fn town_count(&self) -> Option<u32> {
        self.town
    }

    pub fn mafia_count(&self) -> Option<u32> {
        self.mafia
    }

    pub fn include_independent(&self) -> bool {
        self.include_independent
    }

    pub fn is_player_count_set(&self) -> bool {
        self.players.unwrap_or(0) > 0
    }

    pub fn set_player_count(&mut self, value: Option<u32>) {
        self.players = value;
        if value.unwrap_or(0) == 0 {
            self.town = None;
            self.mafia = None;
            self.include_independent = false;
        }
        self.reconcile();
    }

    pub fn set_town_count(&mut self, value: Option<u32>) {
        if !self.is_player_count_set() {
            return;
        }
        self.town = value;
        self.reconcile();
    }

    pub fn set_mafia_count(&mut self, value: Option<u32>) {
        if !self.is_player_count_set() {
            return;
        }
        self.mafia = value;
        self.reconcile();
    }

    pub fn set_include_independent(&mut self, value: bool) {
        if !self.is_player_count_set() {
            return;
        }
        self.include_independent = value;
        self.reconcile();
    }

    pub fn independent_count(&self) -> u32 {
        if self.include_independent {
            self.catalog.by_faction(Faction::Independent).count() as u32
        } else {
            0
        }
    }

    pub fn is_team_counts_ready(&self) -> bool {
        let players = self.players.unwrap_or(0);
        let (Some(town), Some(mafia)) = (self.town, self.mafia) else {
            return false;
        };
        let seated = town
            .checked_add(mafia)
            .and_then(|sum| sum.checked_add(self.independent_count()));
        players > 0
            && self.rules.allows_players(players)
            && town >= 1
            && mafia >= 1
            && seated == Some(players)
    }

    pub fn special_limit(&self, faction: Faction) -> u32 {
        match faction {
            Faction::Town => self.town.unwrap_or(0).saturating_sub(1),
            Faction::Mafia => self.mafia.unwrap_or(0).saturating_sub(1),
            Faction::Independent => 0,
        }
    }

    pub fn selected_special_count(&self, faction: Faction) -> u32 {
        self.catalog
            .by_faction(faction)
            .filter(|role| role.is_special() && self.selected.contains(&role.id))
            .count() as u32
    }

    pub fn remaining_selectable(&self) -> u32 {
        if !self.is_team_counts_ready() {
            return 0;
        }
        let total = self.special_limit(Faction::Town) + self.special_limit(Faction::Mafia);
        let used = self.selected_special_count(Faction::Town)
            + self.selected_special_count(Faction::Mafia);
        total.saturating_sub(used)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|selected| selected.as_str() == id)
    }

    pub fn selected_ids(&self) -> impl Iterator<Item = &RoleId> + '_ {
        self.selected.iter()
    }

    fn faction_full(&self, faction: Faction) -> bool {
        self.selected_special_count(faction) >= self.special_limit(faction)
    }

    /// Flips a specialist role. Returns whether the selection changed.
    pub fn toggle_role(&mut self, id: &str) -> bool {
        if !self.is_team_counts_ready() || self.catalog.is_mandatory(id) {
            return false;
        }
        let Some(role) = self.catalog.get(id) else {
            return false;
        };
        if role.faction == Faction::Independent {
            return false;
        }
        let role_id = role.id.clone();
        let faction = role.faction;
        if self.selected.remove(&role_id) {
            return true;
        }
        if self.faction_full(faction) {
            return false;
        }
        self.selected.insert(role_id);
        true
    }

    pub fn role_state(&self, id: &str) -> Option<RoleSlot> {
        let role = self.catalog.get(id)?;
        let independent = role.faction == Faction::Independent;
        let active = self.selected.contains(&role.id);
        let full = !active && role.is_special() && self.faction_full(role.faction);
        Some(RoleSlot {
            checked: if independent {
                self.include_independent
            } else {
                active
            },
            disabled: !self.is_team_counts_ready()
                || self.catalog.is_mandatory(id)
                || independent
                || full,
        })
    }

    /// Restores the selection invariants after a count or flag change.
    fn reconcile(&mut self) {
        self.selected.insert(RoleId::new(DEFAULT_TOWN_ROLE));
        self.selected.insert(RoleId::new(DEFAULT_MAFIA_ROLE));
        for id in self.catalog.independent_ids() {
            if self.include_independent {
                self.selected.insert(id);
            } else {
                self.selected.remove(&id);
            }
        }
        for faction in [Faction::Town, Faction::Mafia] {
            let limit = self.special_limit(faction) as usize;
            let chosen: Vec<RoleId> = self
                .catalog
                .by_faction(faction)
                .filter(|role| role.is_special() && self.selected.contains(&role.id))
                .map(|role| role.id.clone())
                .collect();
            for id in chosen.iter().skip(limit) {
                self.selected.remove(id);
            }
        }
    }

    fn check_ready(&self) -> Result<(u32, u32, u32), SetupError> {
        let players = self.players.unwrap_or(0);
        if players > 0 && !self.rules.allows_players(players) {
            return Err(SetupError::PlayerCountOutOfRange {
                players,
                min: self.rules.min_players,
                max: self.rules.max_players,
            });
        }
        let town = self.town.unwrap_or(0);
        let mafia = self.mafia.unwrap_or(0);
        if !self.is_team_counts_ready() {
            return Err(SetupError::CountsNotReady {
                players,
                town,
                mafia,
                independent: self.independent_count(),
            });
        }
        Ok((players, town, mafia))
    }

    /// Builds the roster: chosen roles per faction in catalog order, padded
    /// with the default role, then the independents, cut to the player count.
    pub fn build_roster(&self) -> Result<StoredSetup, SetupError> {
        let (players, town, mafia) = self.check_ready()?;
        let citizen = self
            .catalog
            .mandatory_town()
            .ok_or(SetupError::MissingDefaultRole(DEFAULT_TOWN_ROLE))?;
        let mafioso = self
            .catalog
            .mandatory_mafia()
            .ok_or(SetupError::MissingDefaultRole(DEFAULT_MAFIA_ROLE))?;

        let town_roster = self.faction_roster(Faction::Town, citizen, town as usize);
        let mafia_roster = self.faction_roster(Faction::Mafia, mafioso, mafia as usize);
        let independent_roster: Vec<Role> = if self.include_independent {
            self.catalog
                .by_faction(Faction::Independent)
                .map(Role::unassigned)
                .collect()
        } else {
            Vec::new()
        };

        let mut roles = town_roster;
        roles.extend(mafia_roster);
        roles.extend(independent_roster);
        roles.truncate(players as usize);

        Ok(StoredSetup {
            player_count: players,
            town_count: town,
            mafia_count: mafia,
            include_independent: self.include_independent,
            independent_count: self.independent_count(),
            roles,
        })
    }

    pub fn build_roster_with_events(
        &self,
        events: &mut EventBus,
    ) -> Result<StoredSetup, SetupError> {
        let setup = self.build_roster()?;
        events.push(Event::RosterBuilt {
            players: setup.player_count,
            town: setup.town_count,
            mafia: setup.mafia_count,
            independent: setup.independent_count,
        });
        Ok(setup)
    }

    fn faction_roster(&self, faction: Faction, filler: &Role, count: usize) -> Vec<Role> {
        let mut roster: Vec<Role> = self
            .catalog
            .by_faction(faction)
            .filter(|role| self.selected.contains(&role.id))
            .map(Role::unassigned)
            .collect();
        while roster.len() < count {
            roster.push(filler.unassigned());
        }
        roster
    }
}
