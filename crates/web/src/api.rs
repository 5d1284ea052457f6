use mafia_core::{
    Ambience, AmbienceError, Catalog, DealPrompt, DealSession, Event, EventBus, FactionCounts,
    Glossary, RngState, Role, SetupForm, StoredSetup, TablePhase, TableRow, TableRules, TableView,
};
use mafia_data::{clear_setup, load_setup, save_setup, MemoryStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tiny_http::Method;

const MAX_SESSIONS: usize = 256;

/// The page owns the audio element; the server only tracks the phase.
struct PageAmbience;

impl Ambience for PageAmbience {
    fn is_available(&self) -> bool {
        true
    }

    fn start_loop(&mut self) -> Result<(), AmbienceError> {
        Ok(())
    }

    fn stop(&mut self) {}
}

/// Everything one browser tab knows about its game.
#[derive(Default)]
struct Session {
    store: MemoryStore,
    deal: Option<DealSession>,
    phase: TablePhase,
    // Carousel position, tagged with the locale of the catalog it was built from.
    glossary: Option<(String, Glossary)>,
    events: EventBus,
    touched: u64,
}

pub struct AppState {
    catalogs: HashMap<String, Catalog>,
    rules: TableRules,
    seed: Option<u64>,
    sessions: HashMap<String, Session>,
    clock: u64,
}

#[derive(Serialize)]
pub struct ApiResponse {
    pub ok: bool,
    pub error: Option<String>,
    pub data: Value,
    pub events: Vec<Event>,
}

pub struct Reply {
    pub status: u16,
    pub body: ApiResponse,
}

impl Reply {
    fn ok(data: Value, events: Vec<Event>) -> Self {
        Self {
            status: 200,
            body: ApiResponse {
                ok: true,
                error: None,
                data,
                events,
            },
        }
    }

    fn error(status: u16, message: impl Into<String>, events: Vec<Event>) -> Self {
        Self {
            status,
            body: ApiResponse {
                ok: false,
                error: Some(message.into()),
                data: Value::Null,
                events,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupRequest {
    #[serde(default)]
    pub player_count: Option<u32>,
    #[serde(default, rename = "cityCount")]
    pub town_count: Option<u32>,
    #[serde(default)]
    pub mafia_count: Option<u32>,
    #[serde(default)]
    pub include_independent: bool,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DealRequest {
    pub action: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GlossaryRequest {
    pub action: String,
    #[serde(default)]
    pub index: Option<i64>,
    #[serde(default)]
    pub delta: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct PhaseRequest {
    pub phase: TablePhase,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogView<'a> {
    locale: &'a str,
    roles: &'a [Role],
    rules: &'a TableRules,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SlotView {
    id: String,
    checked: bool,
    disabled: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SetupPreview {
    player_count_set: bool,
    ready: bool,
    independent_count: u32,
    city_limit: u32,
    mafia_limit: u32,
    remaining_selectable: u32,
    selected: Vec<String>,
    slots: Vec<SlotView>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DealView {
    index: usize,
    total: usize,
    remaining: usize,
    progress: u32,
    revealed: bool,
    last: bool,
    prompt: DealPrompt,
    name: String,
    card: Option<Role>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GlossaryView {
    index: usize,
    total: usize,
    flipped: bool,
    role: Option<Role>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TableState {
    total: usize,
    counts: FactionCounts,
    show_independent: bool,
    phase: TablePhase,
    rows: Vec<TableRow>,
}

impl AppState {
    pub fn new(catalogs: HashMap<String, Catalog>, rules: TableRules, seed: Option<u64>) -> Self {
        Self {
            catalogs,
            rules,
            seed,
            sessions: HashMap::new(),
            clock: 0,
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Routes one `/api/...` call for the tab identified by `session`.
    pub fn handle_api(
        &mut self,
        method: &Method,
        path: &str,
        session: &str,
        locale: &str,
        body: &str,
    ) -> Reply {
        let Some(catalog) = self.catalog_for(locale).cloned() else {
            return Reply::error(500, "no role catalog loaded", Vec::new());
        };
        match (method, path) {
            (Method::Get, "/api/catalog") => {
                let view = CatalogView {
                    locale,
                    roles: catalog.roles(),
                    rules: &self.rules,
                };
                to_reply(&view, Vec::new())
            }
            (Method::Post, "/api/setup/preview") => match parse_body::<SetupRequest>(body) {
                Ok(req) => {
                    let form = self.form_from(catalog, &req);
                    to_reply(&preview(&form), Vec::new())
                }
                Err(reply) => reply,
            },
            (Method::Post, "/api/setup") => match parse_body::<SetupRequest>(body) {
                Ok(req) => {
                    let form = self.form_from(catalog, &req);
                    self.submit_setup(session, &form)
                }
                Err(reply) => reply,
            },
            (Method::Post, "/api/deal") => match parse_body::<DealRequest>(body) {
                Ok(req) => self.deal_action(session, req),
                Err(reply) => reply,
            },
            (Method::Post, "/api/glossary") => match parse_body::<GlossaryRequest>(body) {
                Ok(req) => self.glossary_action(session, locale, &catalog, req),
                Err(reply) => reply,
            },
            (Method::Get, "/api/table") => self.table(session),
            (Method::Post, "/api/table/phase") => match parse_body::<PhaseRequest>(body) {
                Ok(req) => self.set_phase(session, req.phase),
                Err(reply) => reply,
            },
            (Method::Post, "/api/reset") => {
                let tab = self.session(session);
                tab.deal = None;
                tab.phase = TablePhase::Day;
                match clear_setup(&mut tab.store) {
                    Ok(()) => Reply::ok(Value::Null, Vec::new()),
                    Err(err) => Reply::error(500, err.to_string(), Vec::new()),
                }
            }
            _ => Reply::error(404, format!("no route for {path}"), Vec::new()),
        }
    }

    fn catalog_for(&self, locale: &str) -> Option<&Catalog> {
        self.catalogs
            .get(locale)
            .or_else(|| self.catalogs.get("en_US"))
    }

    fn session(&mut self, id: &str) -> &mut Session {
        self.clock += 1;
        if !self.sessions.contains_key(id) && self.sessions.len() >= MAX_SESSIONS {
            self.evict_oldest();
        }
        let clock = self.clock;
        let tab = self.sessions.entry(id.to_string()).or_default();
        tab.touched = clock;
        tab
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|(_, tab)| tab.touched)
            .map(|(id, _)| id.clone());
        if let Some(id) = oldest {
            log::debug!("evicting idle session {id}");
            self.sessions.remove(&id);
        }
    }

    /// Replays a submitted form onto a fresh `SetupForm`. Requested specials
    /// are applied in catalog order so the earliest roles keep their slots.
    fn form_from(&self, catalog: Catalog, req: &SetupRequest) -> SetupForm {
        let mut requested: Vec<usize> = req
            .roles
            .iter()
            .filter_map(|id| catalog.roles().iter().position(|role| role.id.as_str() == id))
            .collect();
        requested.sort_unstable();
        requested.dedup();
        let ids: Vec<String> = requested
            .into_iter()
            .map(|pos| catalog.roles()[pos].id.as_str().to_string())
            .collect();

        let mut form = SetupForm::new(catalog, self.rules.clone());
        form.set_player_count(req.player_count);
        form.set_town_count(req.town_count);
        form.set_mafia_count(req.mafia_count);
        form.set_include_independent(req.include_independent);
        for id in ids {
            if !form.is_selected(&id) {
                form.toggle_role(&id);
            }
        }
        form
    }

    fn submit_setup(&mut self, session: &str, form: &SetupForm) -> Reply {
        let tab = self.session(session);
        let built = form.build_roster_with_events(&mut tab.events);
        let events: Vec<Event> = tab.events.drain().collect();
        let setup = match built {
            Ok(setup) => setup,
            Err(err) => return Reply::error(400, err.to_string(), events),
        };
        if let Err(err) = save_setup(&mut tab.store, &setup) {
            return Reply::error(500, err.to_string(), events);
        }
        tab.deal = None;
        tab.phase = TablePhase::Day;
        log::info!(
            "session {session}: roster of {} stored",
            setup.roles.len()
        );
        to_reply(&setup, events)
    }

    fn deal_action(&mut self, session: &str, req: DealRequest) -> Reply {
        let seed = self.seed;
        let tab = self.session(session);
        let result = match req.action.as_str() {
            "start" => start_deal(tab, seed),
            "reveal" => with_deal(tab, |deal, events| {
                deal.reveal(events);
                Ok(())
            }),
            "name" => with_deal(tab, |deal, _| {
                deal.set_name(req.name.clone().unwrap_or_default())
                    .map_err(|err| err.to_string())
            }),
            "next" => with_deal(tab, |deal, events| {
                deal.next(events).map_err(|err| err.to_string())
            }),
            "finish" => return finish_deal(tab),
            other => Err(format!("unknown deal action {other}")),
        };
        let events: Vec<Event> = tab.events.drain().collect();
        match result {
            Ok(()) => match tab.deal.as_ref() {
                Some(deal) => to_reply(&deal_view(deal), events),
                None => Reply::error(409, "no deal in progress", events),
            },
            Err(message) => Reply::error(400, message, events),
        }
    }

    fn glossary_action(
        &mut self,
        session: &str,
        locale: &str,
        catalog: &Catalog,
        req: GlossaryRequest,
    ) -> Reply {
        let threshold = self.rules.swipe_threshold;
        let tab = self.session(session);
        let opening = req.action == "open";
        let stale = tab
            .glossary
            .as_ref()
            .map_or(true, |(built_for, _)| built_for != locale);
        if opening || stale {
            let keep = match (&tab.glossary, opening) {
                (Some((_, old)), false) => old.index(),
                _ => 0,
            };
            let mut fresh = Glossary::new(catalog).with_swipe_threshold(threshold);
            fresh.go_to(keep as i64);
            tab.glossary = Some((locale.to_string(), fresh));
        }
        let Some((_, glossary)) = tab.glossary.as_mut() else {
            return Reply::error(500, "glossary unavailable", Vec::new());
        };
        match req.action.as_str() {
            "open" | "show" => {}
            "next" => glossary.next(),
            "prev" => glossary.prev(),
            "flip" => glossary.flip(),
            "unflip" => glossary.unflip(),
            "go" => match req.index {
                Some(index) => glossary.go_to(index),
                None => return Reply::error(400, "go needs an index", Vec::new()),
            },
            "swipe" => match req.delta {
                Some(delta) => glossary.swipe(delta),
                None => return Reply::error(400, "swipe needs a delta", Vec::new()),
            },
            other => {
                return Reply::error(400, format!("unknown glossary action {other}"), Vec::new())
            }
        }
        to_reply(&glossary_view(glossary), Vec::new())
    }

    fn table(&mut self, session: &str) -> Reply {
        let tab = self.session(session);
        match stored_table(tab) {
            Ok(table) => to_reply(&table_state(&table, tab.phase), Vec::new()),
            Err(reply) => reply,
        }
    }

    fn set_phase(&mut self, session: &str, phase: TablePhase) -> Reply {
        let tab = self.session(session);
        let mut table = match stored_table(tab) {
            Ok(table) => table,
            Err(reply) => return reply,
        };
        table.set_phase(phase, &mut PageAmbience, &mut tab.events);
        tab.phase = table.phase();
        let events: Vec<Event> = tab.events.drain().collect();
        to_reply(&table_state(&table, tab.phase), events)
    }
}

fn start_deal(tab: &mut Session, seed: Option<u64>) -> Result<(), String> {
    let setup = load_setup(&tab.store)
        .map_err(|err| err.to_string())?
        .ok_or_else(|| "no roster stored; finish the setup first".to_string())?;
    let mut rng = match seed {
        Some(seed) => RngState::from_seed(seed),
        None => RngState::from_entropy(),
    };
    let deal = DealSession::start(setup, &mut rng, &mut tab.events).map_err(|err| err.to_string())?;
    tab.deal = Some(deal);
    Ok(())
}

fn with_deal<F>(tab: &mut Session, apply: F) -> Result<(), String>
where
    F: FnOnce(&mut DealSession, &mut EventBus) -> Result<(), String>,
{
    let deal = tab
        .deal
        .as_mut()
        .ok_or_else(|| "no deal in progress".to_string())?;
    apply(deal, &mut tab.events)
}

fn finish_deal(tab: &mut Session) -> Reply {
    let Some(deal) = tab.deal.as_ref() else {
        return Reply::error(409, "no deal in progress", Vec::new());
    };
    let finished = deal.finish(&mut tab.events);
    let events: Vec<Event> = tab.events.drain().collect();
    let setup = match finished {
        Ok(setup) => setup,
        Err(err) => return Reply::error(400, err.to_string(), events),
    };
    if let Err(err) = save_setup(&mut tab.store, &setup) {
        return Reply::error(500, err.to_string(), events);
    }
    tab.deal = None;
    tab.phase = TablePhase::Day;
    to_reply(&setup, events)
}

fn stored_table(tab: &Session) -> Result<TableView, Reply> {
    let setup: StoredSetup = match load_setup(&tab.store) {
        Ok(Some(setup)) => setup,
        Ok(None) => return Err(Reply::error(409, "no roster stored", Vec::new())),
        Err(err) => return Err(Reply::error(409, err.to_string(), Vec::new())),
    };
    TableView::from_setup(setup).map_err(|err| Reply::error(409, err.to_string(), Vec::new()))
}

fn table_state(table: &TableView, phase: TablePhase) -> TableState {
    TableState {
        total: table.total(),
        counts: table.counts(),
        show_independent: table.show_independent(),
        phase,
        rows: table.rows(),
    }
}

fn preview(form: &SetupForm) -> SetupPreview {
    let slots = form
        .catalog()
        .roles()
        .iter()
        .filter_map(|role| {
            form.role_state(role.id.as_str()).map(|slot| SlotView {
                id: role.id.as_str().to_string(),
                checked: slot.checked,
                disabled: slot.disabled,
            })
        })
        .collect();
    SetupPreview {
        player_count_set: form.is_player_count_set(),
        ready: form.is_team_counts_ready(),
        independent_count: form.independent_count(),
        city_limit: form.special_limit(mafia_core::Faction::Town),
        mafia_limit: form.special_limit(mafia_core::Faction::Mafia),
        remaining_selectable: form.remaining_selectable(),
        selected: form.selected_ids().map(|id| id.to_string()).collect(),
        slots,
    }
}

fn deal_view(deal: &DealSession) -> DealView {
    DealView {
        index: deal.index(),
        total: deal.total(),
        remaining: deal.remaining(),
        progress: deal.progress_percent(),
        revealed: deal.is_revealed(),
        last: deal.is_last(),
        prompt: deal.prompt(),
        name: deal.current_name().to_string(),
        card: deal.is_revealed().then(|| deal.current().clone()),
    }
}

fn glossary_view(glossary: &Glossary) -> GlossaryView {
    GlossaryView {
        index: glossary.index(),
        total: glossary.slides().len(),
        flipped: glossary.is_flipped(),
        role: glossary.current().cloned(),
    }
}

fn parse_body<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T, Reply> {
    serde_json::from_str(body)
        .map_err(|err| Reply::error(400, format!("invalid request body: {err}"), Vec::new()))
}

fn to_reply<T: Serialize>(data: &T, events: Vec<Event>) -> Reply {
    match serde_json::to_value(data) {
        Ok(value) => Reply::ok(value, events),
        Err(err) => Reply::error(500, err.to_string(), events),
    }
}
