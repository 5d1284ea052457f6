use crate::{Event, EventBus, Role, RngState, StoredSetup};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DealError {
    #[error("roster is empty; finish the setup first")]
    EmptyRoster,
    #[error("card {0} is still hidden")]
    NotRevealed(usize),
    #[error("card {0} has no player name")]
    MissingName(usize),
    #[error("already at the last card")]
    LastCard,
    #[error("{0} cards are still undealt")]
    CardsRemaining(usize),
}

/// What the moderator has to do before the current card can be passed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DealPrompt {
    Reveal,
    EnterName,
    Ready,
}

#[derive(Debug, Clone)]
pub struct DealSession {
    setup: StoredSetup,
    deck: Vec<Role>,
    names: Vec<String>,
    index: usize,
    revealed: bool,
}

impl DealSession {
    pub fn start(
        setup: StoredSetup,
        rng: &mut RngState,
        events: &mut EventBus,
    ) -> Result<Self, DealError> {
        if setup.roles.is_empty() {
            return Err(DealError::EmptyRoster);
        }
        let mut deck = setup.roles.clone();
        rng.shuffle(&mut deck);
        let names = deck
            .iter()
            .map(|role| role.player.clone().unwrap_or_default())
            .collect();
        events.push(Event::DealStarted {
            cards: deck.len(),
            seed: rng.seed(),
        });
        Ok(Self {
            setup,
            deck,
            names,
            index: 0,
            revealed: false,
        })
    }

    pub fn current(&self) -> &Role {
        &self.deck[self.index]
    }

    pub fn deck(&self) -> &[Role] {
        &self.deck
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.deck.len()
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.deck.len()
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn remaining(&self) -> usize {
        self.total().saturating_sub(self.index + 1)
    }

    pub fn progress_percent(&self) -> u32 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        (((self.index + 1) as f64 / total as f64) * 100.0).round() as u32
    }

    pub fn current_name(&self) -> &str {
        self.names.get(self.index).map(String::as_str).unwrap_or("")
    }

    pub fn reveal(&mut self, events: &mut EventBus) {
        if self.revealed {
            return;
        }
        self.revealed = true;
        events.push(Event::CardRevealed {
            index: self.index,
            faction: self.current().faction,
        });
    }

    /// Replaces the name typed for the current card. The field is locked
    /// until the card has been revealed.
    pub fn set_name(&mut self, value: impl Into<String>) -> Result<(), DealError> {
        if !self.revealed {
            return Err(DealError::NotRevealed(self.index));
        }
        self.names[self.index] = value.into();
        Ok(())
    }

    pub fn push_name_char(&mut self, ch: char) -> Result<(), DealError> {
        if !self.revealed {
            return Err(DealError::NotRevealed(self.index));
        }
        self.names[self.index].push(ch);
        Ok(())
    }

    pub fn pop_name_char(&mut self) -> Result<(), DealError> {
        if !self.revealed {
            return Err(DealError::NotRevealed(self.index));
        }
        self.names[self.index].pop();
        Ok(())
    }

    pub fn can_proceed(&self) -> bool {
        !self.current_name().trim().is_empty()
    }

    pub fn prompt(&self) -> DealPrompt {
        if !self.revealed {
            DealPrompt::Reveal
        } else if !self.can_proceed() {
            DealPrompt::EnterName
        } else {
            DealPrompt::Ready
        }
    }

    fn check_gate(&self) -> Result<(), DealError> {
        if !self.revealed {
            return Err(DealError::NotRevealed(self.index));
        }
        if !self.can_proceed() {
            return Err(DealError::MissingName(self.index));
        }
        Ok(())
    }

    pub fn next(&mut self, events: &mut EventBus) -> Result<(), DealError> {
        self.check_gate()?;
        if self.is_last() {
            return Err(DealError::LastCard);
        }
        self.index += 1;
        self.revealed = false;
        events.push(Event::CardPassed {
            index: self.index - 1,
            remaining: self.remaining(),
        });
        Ok(())
    }

    /// Writes the trimmed names into the shuffled roster.
    pub fn finish(&self, events: &mut EventBus) -> Result<StoredSetup, DealError> {
        if !self.is_last() {
            return Err(DealError::CardsRemaining(self.remaining()));
        }
        self.check_gate()?;
        let roles = self
            .deck
            .iter()
            .zip(&self.names)
            .map(|(role, name)| Role {
                player: Some(name.trim().to_string()),
                ..role.clone()
            })
            .collect();
        events.push(Event::DealFinished {
            players: self.deck.len(),
        });
        Ok(StoredSetup {
            roles,
            ..self.setup.clone()
        })
    }
}
