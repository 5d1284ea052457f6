mod support;

use mafia_core::{
    Ambience, AmbienceError, DealError, DealPrompt, DealSession, Event, EventBus, Faction,
    Glossary, RngState, SetupForm, StoredSetup, TableError, TablePhase, TableRules, TableView,
};
use support::{catalog, ids};

fn roster(players: u32, town: u32, mafia: u32, independent: bool) -> StoredSetup {
    let mut form = SetupForm::new(catalog(), TableRules::default());
    form.set_player_count(Some(players));
    form.set_town_count(Some(town));
    form.set_mafia_count(Some(mafia));
    form.set_include_independent(independent);
    form.toggle_role("detective");
    form.toggle_role("godFather");
    form.build_roster().expect("roster")
}

fn sorted(mut values: Vec<&str>) -> Vec<&str> {
    values.sort_unstable();
    values
}

#[test]
fn shuffle_keeps_the_same_cards() {
    let setup = roster(10, 6, 3, true);
    let mut events = EventBus::default();
    let session =
        DealSession::start(setup.clone(), &mut RngState::from_seed(7), &mut events).expect("deal");
    assert_eq!(session.total(), 10);
    assert_eq!(sorted(ids(session.deck())), sorted(ids(&setup.roles)));
    let drained: Vec<_> = events.drain().collect();
    assert_eq!(drained, vec![Event::DealStarted { cards: 10, seed: 7 }]);
}

#[test]
fn same_seed_same_order() {
    let setup = roster(10, 6, 3, true);
    let mut events = EventBus::default();
    let a = DealSession::start(setup.clone(), &mut RngState::from_seed(42), &mut events)
        .expect("deal");
    let b = DealSession::start(setup, &mut RngState::from_seed(42), &mut events).expect("deal");
    assert_eq!(ids(a.deck()), ids(b.deck()));
}

#[test]
fn empty_roster_cannot_be_dealt() {
    let mut setup = roster(3, 2, 1, false);
    setup.roles.clear();
    let err = DealSession::start(setup, &mut RngState::from_seed(1), &mut EventBus::default())
        .expect_err("empty");
    assert_eq!(err, DealError::EmptyRoster);
}

#[test]
fn reveal_gate_and_name_are_required() {
    let mut events = EventBus::default();
    let mut session =
        DealSession::start(roster(3, 2, 1, false), &mut RngState::from_seed(3), &mut events)
            .expect("deal");
    assert_eq!(session.prompt(), DealPrompt::Reveal);
    assert_eq!(session.set_name("Ali"), Err(DealError::NotRevealed(0)));
    assert_eq!(session.next(&mut events), Err(DealError::NotRevealed(0)));

    session.reveal(&mut events);
    assert_eq!(session.prompt(), DealPrompt::EnterName);
    session.set_name("   ").expect("typing allowed");
    assert_eq!(session.next(&mut events), Err(DealError::MissingName(0)));

    session.set_name("Ali").expect("name");
    assert_eq!(session.prompt(), DealPrompt::Ready);
    session.next(&mut events).expect("advance");
    assert_eq!(session.index(), 1);
    assert!(!session.is_revealed(), "next card starts hidden");
    assert_eq!(session.current_name(), "");
}

#[test]
fn progress_and_remaining() {
    let mut events = EventBus::default();
    let mut session =
        DealSession::start(roster(3, 2, 1, false), &mut RngState::from_seed(3), &mut events)
            .expect("deal");
    assert_eq!(session.progress_percent(), 33);
    assert_eq!(session.remaining(), 2);
    session.reveal(&mut events);
    session.set_name("A").expect("name");
    session.next(&mut events).expect("next");
    assert_eq!(session.progress_percent(), 67);
    assert_eq!(session.remaining(), 1);
}

#[test]
fn finish_writes_trimmed_names() {
    let mut events = EventBus::default();
    let setup = roster(4, 3, 1, false);
    let mut session =
        DealSession::start(setup.clone(), &mut RngState::from_seed(9), &mut events).expect("deal");
    let names = [" Ali ", "Sara", "Reza", "Mina  "];
    for (idx, name) in names.iter().enumerate() {
        session.reveal(&mut events);
        for ch in name.chars() {
            session.push_name_char(ch).expect("type");
        }
        if idx + 1 < names.len() {
            assert_eq!(
                session.finish(&mut events).expect_err("not done"),
                DealError::CardsRemaining(names.len() - idx - 1)
            );
            session.next(&mut events).expect("next");
        }
    }
    assert!(session.is_last());
    assert_eq!(session.next(&mut events), Err(DealError::LastCard));
    let done = session.finish(&mut events).expect("finish");
    let players: Vec<_> = done.roles.iter().map(|role| role.player_name()).collect();
    assert_eq!(players, vec!["Ali", "Sara", "Reza", "Mina"]);
    assert_eq!(done.player_count, setup.player_count);
    assert!(done.is_dealt());
    assert!(matches!(
        events.drain().last(),
        Some(Event::DealFinished { players: 4 })
    ));
}

#[test]
fn backspace_edits_current_name() {
    let mut events = EventBus::default();
    let mut session =
        DealSession::start(roster(3, 2, 1, false), &mut RngState::from_seed(5), &mut events)
            .expect("deal");
    assert!(session.pop_name_char().is_err());
    session.reveal(&mut events);
    session.push_name_char('A').expect("type");
    session.push_name_char('x').expect("type");
    session.pop_name_char().expect("erase");
    assert_eq!(session.current_name(), "A");
}

#[derive(Default)]
struct RecordingAmbience {
    available: bool,
    broken: bool,
    calls: Vec<&'static str>,
}

impl Ambience for RecordingAmbience {
    fn is_available(&self) -> bool {
        self.available
    }

    fn start_loop(&mut self) -> Result<(), AmbienceError> {
        self.calls.push("start");
        if self.broken {
            return Err(AmbienceError("decoder rejected night.mp3".to_string()));
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.calls.push("stop");
    }
}

#[test]
fn table_groups_counts_and_labels_players() {
    let mut setup = roster(10, 6, 3, true);
    setup.roles[0].player = Some("  Ali ".to_string());
    let table = TableView::from_setup(setup).expect("table");
    let counts = table.counts();
    assert_eq!(counts.town, 6);
    assert_eq!(counts.mafia, 3);
    assert_eq!(counts.independent, 1);
    assert!(table.show_independent());
    let rows = table.rows();
    assert_eq!(rows[0].player, "Ali");
    assert_eq!(rows[1].player, "Player 2");
    assert_eq!(rows[9].faction, Faction::Independent);
}

#[test]
fn table_needs_a_roster() {
    let mut setup = roster(3, 2, 1, false);
    setup.roles.clear();
    assert_eq!(
        TableView::from_setup(setup).expect_err("empty").to_string(),
        TableError::EmptyRoster.to_string()
    );
}

#[test]
fn night_starts_and_day_stops_the_loop() {
    let mut table = TableView::from_setup(roster(3, 2, 1, false)).expect("table");
    let mut ambience = RecordingAmbience {
        available: true,
        ..Default::default()
    };
    let mut events = EventBus::default();
    assert_eq!(table.phase(), TablePhase::Day);
    table.set_phase(TablePhase::Night, &mut ambience, &mut events);
    table.toggle_phase(&mut ambience, &mut events);
    assert_eq!(table.phase(), TablePhase::Day);
    assert_eq!(ambience.calls, vec!["start", "stop"]);
    let drained: Vec<_> = events.drain().collect();
    assert_eq!(
        drained,
        vec![
            Event::PhaseChanged {
                phase: TablePhase::Night,
                ambience: true
            },
            Event::PhaseChanged {
                phase: TablePhase::Day,
                ambience: false
            },
        ]
    );
}

#[test]
fn failed_playback_is_reported_and_night_still_falls() {
    let mut table = TableView::from_setup(roster(3, 2, 1, false)).expect("table");
    let mut ambience = RecordingAmbience {
        available: true,
        broken: true,
        ..Default::default()
    };
    let mut events = EventBus::default();
    table.set_phase(TablePhase::Night, &mut ambience, &mut events);
    assert_eq!(table.phase(), TablePhase::Night);
    let drained: Vec<_> = events.drain().collect();
    assert_eq!(
        drained,
        vec![
            Event::AmbienceFailed {
                reason: "night ambience failed: decoder rejected night.mp3".to_string()
            },
            Event::PhaseChanged {
                phase: TablePhase::Night,
                ambience: false
            },
        ]
    );
}

#[test]
fn phase_changes_without_a_track() {
    let mut table = TableView::from_setup(roster(3, 2, 1, false)).expect("table");
    let mut ambience = RecordingAmbience::default();
    table.toggle_phase(&mut ambience, &mut EventBus::default());
    assert_eq!(table.phase(), TablePhase::Night);
    assert!(ambience.calls.is_empty());
}

#[test]
fn glossary_wraps_and_resets_flip() {
    let mut glossary = Glossary::new(&catalog());
    assert_eq!(glossary.current().map(|r| r.id.as_str()), Some("citizen"));
    glossary.prev();
    assert_eq!(glossary.current().map(|r| r.id.as_str()), Some("joker"));
    glossary.flip();
    assert!(glossary.is_flipped());
    glossary.next();
    assert_eq!(glossary.index(), 0);
    assert!(!glossary.is_flipped());
    glossary.go_to(-18);
    assert_eq!(glossary.index(), 16);
    glossary.go_to(35);
    assert_eq!(glossary.index(), 1);
}

#[test]
fn glossary_swipe_threshold() {
    let mut glossary = Glossary::new(&catalog());
    glossary.swipe(-24);
    assert_eq!(glossary.index(), 0);
    glossary.swipe(-25);
    assert_eq!(glossary.index(), 1);
    glossary.swipe(40);
    assert_eq!(glossary.index(), 0);
    let mut strict = Glossary::new(&catalog()).with_swipe_threshold(100);
    strict.swipe(-60);
    assert_eq!(strict.index(), 0);
}

#[test]
fn glossary_swipe_handles_extreme_values() {
    let mut glossary = Glossary::new(&catalog()).with_swipe_threshold(i32::MIN);
    glossary.swipe(i32::MIN);
    assert_eq!(glossary.index(), 0);
    glossary.swipe(i32::MAX);
    assert_eq!(glossary.index(), 0);

    let mut glossary = Glossary::new(&catalog()).with_swipe_threshold(-24);
    glossary.swipe(i32::MIN);
    assert_eq!(glossary.index(), 1);
    glossary.swipe(i32::MAX);
    assert_eq!(glossary.index(), 0);
}
