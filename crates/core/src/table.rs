use crate::{Event, EventBus, Faction, FactionCounts, Role, StoredSetup};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("no roster in this session; deal the cards first")]
    EmptyRoster,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TablePhase {
    #[default]
    Day,
    Night,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("night ambience failed: {0}")]
pub struct AmbienceError(pub String);

/// Looping ambient track played while the table is in the night phase.
pub trait Ambience {
    fn is_available(&self) -> bool;
    fn start_loop(&mut self) -> Result<(), AmbienceError>;
    /// Pauses and rewinds to the start.
    fn stop(&mut self);
}

#[derive(Debug, Default)]
pub struct SilentAmbience;

impl Ambience for SilentAmbience {
    fn is_available(&self) -> bool {
        false
    }

    fn start_loop(&mut self) -> Result<(), AmbienceError> {
        Ok(())
    }

    fn stop(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub seat: usize,
    pub player: String,
    pub role: String,
    pub faction: Faction,
}

#[derive(Debug, Clone)]
pub struct TableView {
    setup: StoredSetup,
    phase: TablePhase,
}

impl TableView {
    pub fn from_setup(setup: StoredSetup) -> Result<Self, TableError> {
        if setup.roles.is_empty() {
            return Err(TableError::EmptyRoster);
        }
        Ok(Self {
            setup,
            phase: TablePhase::Day,
        })
    }

    pub fn setup(&self) -> &StoredSetup {
        &self.setup
    }

    pub fn roles(&self) -> &[Role] {
        &self.setup.roles
    }

    pub fn total(&self) -> usize {
        self.setup.roles.len()
    }

    pub fn counts(&self) -> FactionCounts {
        self.setup.counts()
    }

    pub fn show_independent(&self) -> bool {
        self.setup.include_independent
    }

    pub fn rows(&self) -> Vec<TableRow> {
        self.setup
            .roles
            .iter()
            .enumerate()
            .map(|(idx, role)| TableRow {
                seat: idx + 1,
                player: display_player(role, idx),
                role: role.name.clone(),
                faction: role.faction,
            })
            .collect()
    }

    pub fn phase(&self) -> TablePhase {
        self.phase
    }

    pub fn set_phase(
        &mut self,
        phase: TablePhase,
        ambience: &mut dyn Ambience,
        events: &mut EventBus,
    ) {
        self.phase = phase;
        let mut playing = false;
        if ambience.is_available() {
            match phase {
                TablePhase::Night => match ambience.start_loop() {
                    Ok(()) => playing = true,
                    // The phase still changes; the failure is only reported.
                    Err(err) => events.push(Event::AmbienceFailed {
                        reason: err.to_string(),
                    }),
                },
                TablePhase::Day => ambience.stop(),
            }
        }
        events.push(Event::PhaseChanged {
            phase,
            ambience: playing,
        });
    }

    pub fn toggle_phase(&mut self, ambience: &mut dyn Ambience, events: &mut EventBus) {
        let next = match self.phase {
            TablePhase::Day => TablePhase::Night,
            TablePhase::Night => TablePhase::Day,
        };
        self.set_phase(next, ambience, events);
    }
}

/// Falls back to a numbered placeholder when no name was entered.
pub fn display_player(role: &Role, index: usize) -> String {
    let name = role.player_name();
    if name.is_empty() {
        format!("Player {}", index + 1)
    } else {
        name.to_string()
    }
}
