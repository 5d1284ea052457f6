mod support;

use mafia_core::{parse_count, Faction, SetupError, SetupForm, TableRules};
use support::{catalog, ids};

fn ready_form(players: u32, town: u32, mafia: u32, independent: bool) -> SetupForm {
    let mut form = SetupForm::new(catalog(), TableRules::default());
    form.set_player_count(Some(players));
    form.set_town_count(Some(town));
    form.set_mafia_count(Some(mafia));
    form.set_include_independent(independent);
    form
}

#[test]
fn parses_count_inputs() {
    assert_eq!(parse_count(""), None);
    assert_eq!(parse_count("   "), None);
    assert_eq!(parse_count(" 12 "), Some(12));
    assert_eq!(parse_count("abc"), None);
    assert_eq!(parse_count("-3"), None);
}

#[test]
fn defaults_are_always_selected() {
    let form = SetupForm::new(catalog(), TableRules::default());
    assert!(form.is_selected("citizen"));
    assert!(form.is_selected("mafia"));
    assert!(!form.is_selected("joker"));
    assert!(!form.is_team_counts_ready());
    assert_eq!(form.remaining_selectable(), 0);
}

#[test]
fn counts_ignored_until_player_count_set() {
    let mut form = SetupForm::new(catalog(), TableRules::default());
    form.set_town_count(Some(4));
    form.set_include_independent(true);
    assert_eq!(form.town_count(), None);
    assert!(!form.include_independent());
}

#[test]
fn clearing_player_count_resets_team_fields() {
    let mut form = ready_form(10, 6, 3, true);
    assert!(form.is_team_counts_ready());
    form.set_player_count(None);
    assert_eq!(form.town_count(), None);
    assert_eq!(form.mafia_count(), None);
    assert!(!form.include_independent());
    assert!(!form.is_selected("joker"));

    let mut form = ready_form(10, 7, 3, false);
    form.set_player_count(Some(0));
    assert_eq!(form.town_count(), None);
}

#[test]
fn readiness_requires_exact_sum() {
    assert!(ready_form(10, 7, 3, false).is_team_counts_ready());
    assert!(!ready_form(10, 6, 3, false).is_team_counts_ready());
    assert!(ready_form(10, 6, 3, true).is_team_counts_ready());
    assert!(!ready_form(10, 10, 0, false).is_team_counts_ready());
    assert!(!ready_form(10, 0, 10, false).is_team_counts_ready());
}

#[test]
fn oversized_team_counts_are_never_ready() {
    let form = ready_form(5, u32::MAX, 1, false);
    assert!(!form.is_team_counts_ready());
    assert_eq!(form.remaining_selectable(), 0);

    // u32::MAX + 6 would wrap around to 5.
    let form = ready_form(5, u32::MAX, 6, false);
    assert!(!form.is_team_counts_ready());
    assert!(matches!(
        form.build_roster().expect_err("overflowing counts"),
        SetupError::CountsNotReady { town: u32::MAX, mafia: 6, .. }
    ));

    let form = ready_form(5, u32::MAX - 10, u32::MAX - 10, true);
    assert!(!form.is_team_counts_ready());
}

#[test]
fn readiness_respects_player_bounds() {
    assert!(!ready_form(2, 1, 1, false).is_team_counts_ready());
    assert!(!ready_form(31, 25, 6, false).is_team_counts_ready());
    assert!(ready_form(30, 24, 6, false).is_team_counts_ready());
    let err = ready_form(2, 1, 1, false).build_roster().expect_err("too few");
    assert_eq!(
        err,
        SetupError::PlayerCountOutOfRange {
            players: 2,
            min: 3,
            max: 30
        }
    );
}

#[test]
fn special_limits_are_faction_count_minus_one() {
    let form = ready_form(10, 7, 3, false);
    assert_eq!(form.special_limit(Faction::Town), 6);
    assert_eq!(form.special_limit(Faction::Mafia), 2);
    assert_eq!(form.remaining_selectable(), 8);
}

#[test]
fn toggle_respects_faction_limit() {
    let mut form = ready_form(6, 3, 3, false);
    assert!(form.toggle_role("detective"));
    assert!(form.toggle_role("doctor"));
    assert!(!form.toggle_role("sniper"), "town slots are full");
    assert!(!form.is_selected("sniper"));
    let slot = form.role_state("sniper").expect("known role");
    assert!(slot.disabled);
    assert!(!slot.checked);
    // selected roles stay interactive so they can be removed
    assert!(!form.role_state("doctor").expect("known").disabled);
    assert_eq!(form.remaining_selectable(), 2);

    assert!(form.toggle_role("doctor"));
    assert!(!form.is_selected("doctor"));
    assert!(form.toggle_role("sniper"));
}

#[test]
fn toggle_ignores_locked_roles() {
    let mut form = ready_form(10, 6, 3, true);
    assert!(!form.toggle_role("citizen"));
    assert!(!form.toggle_role("mafia"));
    assert!(!form.toggle_role("joker"));
    assert!(!form.toggle_role("nobody"));
    assert!(form.is_selected("citizen"));
    assert!(form.is_selected("joker"));

    let mut not_ready = ready_form(10, 6, 3, false);
    assert!(!not_ready.toggle_role("detective"));
}

#[test]
fn shrinking_counts_drops_latest_specials() {
    let mut form = ready_form(10, 7, 3, false);
    for id in ["detective", "doctor", "sniper", "wizard", "godFather", "silencer"] {
        assert!(form.toggle_role(id), "select {id}");
    }
    form.set_town_count(Some(3));
    assert!(form.is_selected("detective"));
    assert!(form.is_selected("doctor"));
    assert!(!form.is_selected("sniper"));
    assert!(!form.is_selected("wizard"));

    form.set_mafia_count(Some(2));
    assert!(form.is_selected("godFather"));
    assert!(!form.is_selected("silencer"));
}

#[test]
fn independent_flag_controls_joker() {
    let mut form = ready_form(10, 6, 3, true);
    assert_eq!(form.independent_count(), 1);
    assert!(form.role_state("joker").expect("known").checked);
    form.set_include_independent(false);
    assert_eq!(form.independent_count(), 0);
    assert!(!form.is_selected("joker"));
}

#[test]
fn builds_padded_roster_in_catalog_order() {
    let mut form = ready_form(10, 6, 3, true);
    form.toggle_role("sniper");
    form.toggle_role("detective");
    form.toggle_role("godFather");
    let setup = form.build_roster().expect("roster");
    assert_eq!(setup.player_count, 10);
    assert_eq!(setup.town_count, 6);
    assert_eq!(setup.mafia_count, 3);
    assert!(setup.include_independent);
    assert_eq!(setup.independent_count, 1);
    assert_eq!(
        ids(&setup.roles),
        vec![
            "citizen",
            "detective",
            "sniper",
            "citizen",
            "citizen",
            "citizen",
            "mafia",
            "godFather",
            "mafia",
            "joker"
        ]
    );
    assert!(setup
        .roles
        .iter()
        .all(|role| role.player.as_deref() == Some("")));
    let counts = setup.counts();
    assert_eq!((counts.town, counts.mafia, counts.independent), (6, 3, 1));
}

#[test]
fn build_fails_when_counts_not_ready() {
    let form = ready_form(10, 5, 3, false);
    let err = form.build_roster().expect_err("not ready");
    assert!(matches!(err, SetupError::CountsNotReady { players: 10, .. }));
}

#[test]
fn stored_payload_uses_session_field_names() {
    let setup = ready_form(3, 2, 1, false).build_roster().expect("roster");
    let value = serde_json::to_value(&setup).expect("json");
    assert_eq!(value["playerCount"], 3);
    assert_eq!(value["cityCount"], 2);
    assert_eq!(value["mafiaCount"], 1);
    assert_eq!(value["includeIndependent"], false);
    assert_eq!(value["independentCount"], 0);
    assert_eq!(value["roles"][0]["faction"], "city");
    assert_eq!(value["roles"][0]["player"], "");
}
