use crate::{Faction, TablePhase};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    RosterBuilt {
        players: u32,
        town: u32,
        mafia: u32,
        independent: u32,
    },
    DealStarted { cards: usize, seed: u64 },
    CardRevealed { index: usize, faction: Faction },
    CardPassed { index: usize, remaining: usize },
    DealFinished { players: usize },
    PhaseChanged { phase: TablePhase, ambience: bool },
    AmbienceFailed { reason: String },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
