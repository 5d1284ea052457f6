use crate::audio::night_ambience;
use crate::persistence::{open_session_store, session_label};
use crate::LaunchOptions;
use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use mafia_core::{
    parse_count, Ambience, Catalog, DealPrompt, DealSession, Event, EventBus, Faction, Glossary, RngState,
    SetupError, SetupForm, StoredSetup, TablePhase, TableRules, TableView,
};
use mafia_data::{
    clear_setup, load_catalog_or_builtin, load_setup, load_table_rules, normalize_locale,
    save_setup, SessionStore,
};
use std::collections::VecDeque;
use std::path::Path;

const MAX_EVENT_LOG: usize = 200;
const MAX_COUNT_DIGITS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiLocale {
    EnUs,
    FaIr,
}

impl UiLocale {
    pub fn from_opt(value: Option<&str>) -> Self {
        if normalize_locale(value) == "fa_IR" {
            Self::FaIr
        } else {
            Self::EnUs
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::EnUs => "en_US",
            Self::FaIr => "fa_IR",
        }
    }

    pub fn text<'a>(self, en: &'a str, fa: &'a str) -> &'a str {
        if matches!(self, Self::FaIr) {
            fa
        } else {
            en
        }
    }

    pub fn faction(self, faction: Faction) -> &'static str {
        match faction {
            Faction::Town => self.text("Town", "شهروند"),
            Faction::Mafia => self.text("Mafia", "مافیا"),
            Faction::Independent => self.text("Independent", "مستقل"),
        }
    }

    pub fn phase(self, phase: TablePhase) -> &'static str {
        match phase {
            TablePhase::Day => self.text("Day", "روز"),
            TablePhase::Night => self.text("Night", "شب"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Setup,
    Deal,
    Table,
    Glossary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeItem {
    NewGame,
    Resume,
    Glossary,
    Quit,
}

pub const HOME_ITEMS: [HomeItem; 4] = [
    HomeItem::NewGame,
    HomeItem::Resume,
    HomeItem::Glossary,
    HomeItem::Quit,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    Players,
    Town,
    Mafia,
    Independent,
    Roles,
}

impl SetupField {
    fn is_count(self) -> bool {
        matches!(self, Self::Players | Self::Town | Self::Mafia)
    }
}

pub struct App {
    pub locale: UiLocale,
    pub seed: Option<u64>,
    pub catalog: Catalog,
    pub rules: TableRules,
    pub store: Box<dyn SessionStore>,
    pub ambience: Box<dyn Ambience>,
    pub events: EventBus,
    pub screen: Screen,
    pub home_cursor: usize,
    pub setup: SetupForm,
    pub setup_field: SetupField,
    pub players_input: String,
    pub town_input: String,
    pub mafia_input: String,
    pub role_cursor: usize,
    pub deal: Option<DealSession>,
    pub table: Option<TableView>,
    pub table_cursor: usize,
    pub glossary: Glossary,
    pub event_log: VecDeque<String>,
    pub status_line: String,
    pub show_help: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        locale: UiLocale,
        seed: Option<u64>,
        catalog: Catalog,
        rules: TableRules,
        store: Box<dyn SessionStore>,
        ambience: Box<dyn Ambience>,
    ) -> Self {
        let glossary = Glossary::new(&catalog).with_swipe_threshold(rules.swipe_threshold);
        let setup = SetupForm::new(catalog.clone(), rules.clone());
        Self {
            locale,
            seed,
            catalog,
            rules,
            store,
            ambience,
            events: EventBus::default(),
            screen: Screen::Home,
            home_cursor: 0,
            setup,
            setup_field: SetupField::Players,
            players_input: String::new(),
            town_input: String::new(),
            mafia_input: String::new(),
            role_cursor: 0,
            deal: None,
            table: None,
            table_cursor: 0,
            glossary,
            event_log: VecDeque::new(),
            status_line: locale.text("ready", "آماده").to_string(),
            show_help: false,
            should_quit: false,
        }
    }

    pub fn bootstrap(options: &LaunchOptions) -> Result<Self> {
        let locale = UiLocale::from_opt(options.locale.as_deref());
        let assets = Path::new("assets");
        let catalog =
            load_catalog_or_builtin(assets, Some(locale.code())).context("load role catalog")?;
        let rules = load_table_rules(assets).context("load table rules")?;
        let session_note = session_label(options.session.as_deref());
        let store = open_session_store(options.session.clone());
        let ambience = night_ambience(options.night_audio.as_deref());
        let audio_note = if ambience.is_available() {
            "night ambience ready"
        } else {
            "night ambience unavailable"
        };

        let mut app = Self::new(locale, options.seed, catalog, rules, store, ambience);
        app.push_event_line(format!("session: {session_note}"));
        app.push_event_line(audio_note.to_string());
        if let Some(seed) = options.seed {
            app.push_event_line(format!("seed: {seed}"));
        }
        Ok(app)
    }

    pub fn screen_label(&self) -> &'static str {
        match self.screen {
            Screen::Home => self.locale.text("Home", "خانه"),
            Screen::Setup => self.locale.text("Setup", "تنظیمات"),
            Screen::Deal => self.locale.text("Deal", "پخش نقش"),
            Screen::Table => self.locale.text("Table", "لیست بازیکنان"),
            Screen::Glossary => self.locale.text("Glossary", "معرفی نقش‌ها"),
        }
    }

    pub fn home_label(&self, item: HomeItem) -> &'static str {
        match item {
            HomeItem::NewGame => self.locale.text("Start a new game", "شروع بازی جدید"),
            HomeItem::Resume => self.locale.text("Continue the stored game", "ادامه بازی"),
            HomeItem::Glossary => self.locale.text("Role glossary", "معرفی نقش‌ها"),
            HomeItem::Quit => self.locale.text("Quit", "خروج"),
        }
    }

    pub fn field_label(&self, field: SetupField) -> &'static str {
        match field {
            SetupField::Players => self.locale.text("Players", "تعداد بازیکنان"),
            SetupField::Town => self.locale.text("Town", "تعداد شهروندان"),
            SetupField::Mafia => self.locale.text("Mafia", "تعداد مافیا"),
            SetupField::Independent => self.locale.text("Independent roles", "نقش مستقل"),
            SetupField::Roles => self.locale.text("Roles", "نقش‌ها"),
        }
    }

    pub fn next_hint(&self) -> String {
        let text = match self.screen {
            Screen::Home => self.locale.text("enter to choose", "برای انتخاب اینتر"),
            Screen::Setup => {
                if !self.setup.is_team_counts_ready() {
                    self.locale.text(
                        "counts must add up to the player count",
                        "مجموع نقش‌ها باید با تعداد بازیکنان برابر باشد",
                    )
                } else {
                    self.locale
                        .text("pick roles, enter to deal", "نقش‌ها را انتخاب کنید، اینتر برای پخش")
                }
            }
            Screen::Deal => match self.deal.as_ref().map(DealSession::prompt) {
                Some(DealPrompt::Reveal) => self
                    .locale
                    .text("hand over, then reveal the card", "کارت را نشان دهید"),
                Some(DealPrompt::EnterName) => {
                    self.locale.text("type the player's name", "نام بازیکن را وارد کنید")
                }
                Some(DealPrompt::Ready) if self.deal.as_ref().is_some_and(DealSession::is_last) => {
                    self.locale.text("enter to finish", "اینتر برای پایان")
                }
                Some(DealPrompt::Ready) => self
                    .locale
                    .text("enter for the next card", "اینتر برای کارت بعدی"),
                None => "-",
            },
            Screen::Table => self.locale.text("n night, d day", "n شب، d روز"),
            Screen::Glossary => self
                .locale
                .text("left/right browse, space flips", "چپ و راست برای مرور، فاصله برای چرخش"),
        };
        text.to_string()
    }

    pub fn cycle_focus(&mut self, forward: bool) {
        if self.screen != Screen::Setup {
            return;
        }
        self.setup_field = match (self.setup_field, forward) {
            (SetupField::Players, true) => SetupField::Town,
            (SetupField::Town, true) => SetupField::Mafia,
            (SetupField::Mafia, true) => SetupField::Independent,
            (SetupField::Independent, true) => SetupField::Roles,
            (SetupField::Roles, true) => SetupField::Players,
            (SetupField::Players, false) => SetupField::Roles,
            (SetupField::Town, false) => SetupField::Players,
            (SetupField::Mafia, false) => SetupField::Town,
            (SetupField::Independent, false) => SetupField::Mafia,
            (SetupField::Roles, false) => SetupField::Independent,
        };
    }

    pub fn move_cursor(&mut self, down: bool) {
        match self.screen {
            Screen::Home => move_index(&mut self.home_cursor, HOME_ITEMS.len(), down),
            Screen::Setup => {
                if self.setup_field == SetupField::Roles {
                    let len = self.catalog.len();
                    move_index(&mut self.role_cursor, len, down);
                } else {
                    self.cycle_focus(down);
                }
            }
            Screen::Table => {
                let len = self.table.as_ref().map(TableView::total).unwrap_or(0);
                move_index(&mut self.table_cursor, len, down);
            }
            Screen::Glossary => {
                if down {
                    self.glossary.next();
                } else {
                    self.glossary.prev();
                }
            }
            Screen::Deal => {}
        }
    }

    pub fn move_sideways(&mut self, right: bool) {
        match self.screen {
            Screen::Setup if self.setup_field.is_count() => self.step_count(right),
            Screen::Table => {
                let phase = if right {
                    TablePhase::Night
                } else {
                    TablePhase::Day
                };
                self.set_table_phase(phase);
            }
            Screen::Glossary => {
                if right {
                    self.glossary.next();
                } else {
                    self.glossary.prev();
                }
            }
            _ => {}
        }
    }

    pub fn toggle_focused(&mut self) {
        match self.screen {
            Screen::Setup => match self.setup_field {
                SetupField::Independent => {
                    if !self.setup.is_player_count_set() {
                        self.push_status(self.locale.text(
                            "enter the player count first",
                            "ابتدا تعداد بازیکنان را وارد کنید",
                        ));
                        return;
                    }
                    let include = !self.setup.include_independent();
                    self.setup.set_include_independent(include);
                }
                SetupField::Roles => self.toggle_role_at_cursor(),
                _ => {}
            },
            Screen::Deal => self.reveal_card(),
            Screen::Table => {
                if let Some(table) = self.table.as_mut() {
                    table.toggle_phase(self.ambience.as_mut(), &mut self.events);
                }
                self.flush_events();
            }
            Screen::Glossary => self.glossary.toggle_flip(),
            Screen::Home => {}
        }
    }

    pub fn activate_primary(&mut self) {
        match self.screen {
            Screen::Home => {
                let item = HOME_ITEMS[self.home_cursor.min(HOME_ITEMS.len() - 1)];
                match item {
                    HomeItem::NewGame => self.open_setup(),
                    HomeItem::Resume => self.resume(),
                    HomeItem::Glossary => self.open_glossary(),
                    HomeItem::Quit => self.quit(),
                }
            }
            Screen::Setup => self.confirm_setup(),
            Screen::Deal => self.advance_deal(),
            Screen::Table | Screen::Glossary => self.toggle_focused(),
        }
    }

    /// Captures typed characters for the count fields and the player name.
    pub fn handle_text_key(&mut self, key: KeyEvent) -> bool {
        if self.show_help
            || key.modifiers.contains(KeyModifiers::CONTROL)
            || key.modifiers.contains(KeyModifiers::ALT)
        {
            return false;
        }
        match self.screen {
            Screen::Setup => self.handle_count_key(key.code),
            Screen::Deal => self.handle_name_key(key.code),
            _ => false,
        }
    }

    /// Esc closes help first, then turns a flipped glossary card back over.
    pub fn back(&mut self) {
        if self.show_help {
            self.show_help = false;
        } else if self.screen == Screen::Glossary && self.glossary.is_flipped() {
            self.glossary.unflip();
        } else {
            self.go_home();
        }
    }

    pub fn go_home(&mut self) {
        self.leave_table();
        self.screen = Screen::Home;
    }

    pub fn quit(&mut self) {
        self.leave_table();
        self.should_quit = true;
    }

    pub fn set_table_phase(&mut self, phase: TablePhase) {
        if self.screen != Screen::Table {
            return;
        }
        if let Some(table) = self.table.as_mut() {
            table.set_phase(phase, self.ambience.as_mut(), &mut self.events);
        }
        self.flush_events();
    }

    pub fn reset_session(&mut self) {
        self.leave_table();
        if let Err(err) = clear_setup(self.store.as_mut()) {
            self.push_status(format!("{}: {err}", self.locale.text("error", "خطا")));
            return;
        }
        self.deal = None;
        self.table = None;
        self.reset_setup_form();
        self.screen = Screen::Home;
        self.push_status(self.locale.text("session cleared", "اطلاعات بازی پاک شد"));
    }

    pub fn open_setup(&mut self) {
        self.reset_setup_form();
        self.screen = Screen::Setup;
        self.push_status(self.locale.text("new game", "بازی جدید"));
    }

    pub fn open_glossary(&mut self) {
        self.glossary = Glossary::new(&self.catalog).with_swipe_threshold(self.rules.swipe_threshold);
        self.screen = Screen::Glossary;
    }

    /// Picks up the stored roster: undealt rosters go back to the deal, dealt
    /// ones straight to the table.
    pub fn resume(&mut self) {
        match load_setup(self.store.as_ref()) {
            Ok(Some(setup)) if setup.is_dealt() => self.open_table(setup),
            Ok(Some(setup)) => self.start_deal(setup),
            Ok(None) => self.push_status(self.locale.text(
                "no stored game; start a new one",
                "بازی ذخیره شده‌ای نیست",
            )),
            Err(err) => self.push_status(format!(
                "{}: {err}",
                self.locale.text("stored game unreadable", "اطلاعات بازی خراب است")
            )),
        }
    }

    pub fn confirm_setup(&mut self) {
        let built = self.setup.build_roster_with_events(&mut self.events);
        self.flush_events();
        let setup = match built {
            Ok(setup) => setup,
            Err(err) => {
                self.push_setup_error(err);
                return;
            }
        };
        if let Err(err) = save_setup(self.store.as_mut(), &setup) {
            self.push_status(format!("{}: {err}", self.locale.text("error", "خطا")));
            return;
        }
        self.start_deal(setup);
    }

    pub fn reveal_card(&mut self) {
        if let Some(deal) = self.deal.as_mut() {
            deal.reveal(&mut self.events);
        }
        self.flush_events();
    }

    pub fn advance_deal(&mut self) {
        let Some(deal) = self.deal.as_mut() else {
            return;
        };
        if !deal.is_revealed() {
            deal.reveal(&mut self.events);
            self.flush_events();
            return;
        }
        if !deal.is_last() {
            let result = deal.next(&mut self.events);
            self.flush_events();
            if let Err(err) = result {
                self.push_status(format!("{}: {err}", self.locale.text("blocked", "متوقف")));
            }
            return;
        }
        let finished = deal.finish(&mut self.events);
        self.flush_events();
        let setup = match finished {
            Ok(setup) => setup,
            Err(err) => {
                self.push_status(format!("{}: {err}", self.locale.text("blocked", "متوقف")));
                return;
            }
        };
        if let Err(err) = save_setup(self.store.as_mut(), &setup) {
            self.push_status(format!("{}: {err}", self.locale.text("error", "خطا")));
            return;
        }
        self.deal = None;
        self.open_table(setup);
    }

    pub fn push_status(&mut self, value: impl Into<String>) {
        self.status_line = value.into();
    }

    fn push_setup_error(&mut self, err: SetupError) {
        self.status_line = format!("{}: {err}", self.locale.text("setup", "تنظیمات"));
    }

    fn start_deal(&mut self, setup: StoredSetup) {
        let mut rng = match self.seed {
            Some(seed) => RngState::from_seed(seed),
            None => RngState::from_entropy(),
        };
        match DealSession::start(setup, &mut rng, &mut self.events) {
            Ok(deal) => {
                self.deal = Some(deal);
                self.screen = Screen::Deal;
            }
            Err(err) => {
                self.push_status(format!("{}: {err}", self.locale.text("error", "خطا")));
                self.open_setup();
            }
        }
        self.flush_events();
    }

    fn open_table(&mut self, setup: StoredSetup) {
        match TableView::from_setup(setup) {
            Ok(table) => {
                self.table = Some(table);
                self.table_cursor = 0;
                self.screen = Screen::Table;
                self.push_status(self.locale.text(
                    "keep this list to yourself",
                    "این لیست فقط برای راوی است",
                ));
            }
            Err(err) => self.push_status(format!("{}: {err}", self.locale.text("error", "خطا"))),
        }
    }

    fn leave_table(&mut self) {
        if self.screen != Screen::Table {
            return;
        }
        if let Some(table) = self.table.as_mut() {
            if table.phase() == TablePhase::Night {
                table.set_phase(TablePhase::Day, self.ambience.as_mut(), &mut self.events);
            }
        }
        self.flush_events();
    }

    fn reset_setup_form(&mut self) {
        self.setup = SetupForm::new(self.catalog.clone(), self.rules.clone());
        self.setup_field = SetupField::Players;
        self.players_input.clear();
        self.town_input.clear();
        self.mafia_input.clear();
        self.role_cursor = 0;
    }

    fn toggle_role_at_cursor(&mut self) {
        let Some(role) = self.catalog.roles().get(self.role_cursor) else {
            return;
        };
        let id = role.id.as_str().to_string();
        let name = role.name.clone();
        let faction = role.faction;
        if self.setup.toggle_role(&id) {
            return;
        }
        let reason = if !self.setup.is_team_counts_ready() {
            self.locale
                .text("set the team counts first", "ابتدا تعداد تیم‌ها را مشخص کنید")
        } else if self.catalog.is_mandatory(&id) {
            self.locale.text("default roles are always in play", "نقش پیش‌فرض همیشه در بازی است")
        } else if faction == Faction::Independent {
            self.locale.text(
                "independents follow the checkbox",
                "نقش مستقل با گزینه مستقل انتخاب می‌شود",
            )
        } else {
            self.locale.text("no free slots for this team", "جای خالی برای این تیم نیست")
        };
        self.push_status(format!("{name}: {reason}"));
    }

    fn handle_count_key(&mut self, code: KeyCode) -> bool {
        let field = self.setup_field;
        if !field.is_count() {
            return false;
        }
        if field != SetupField::Players && !self.setup.is_player_count_set() {
            return false;
        }
        let input = match field {
            SetupField::Players => &mut self.players_input,
            SetupField::Town => &mut self.town_input,
            _ => &mut self.mafia_input,
        };
        match code {
            KeyCode::Char(ch) if ch.is_ascii_digit() => {
                if input.len() < MAX_COUNT_DIGITS {
                    input.push(ch);
                }
            }
            KeyCode::Backspace => {
                input.pop();
            }
            _ => return false,
        }
        self.apply_count_field(field);
        true
    }

    fn step_count(&mut self, up: bool) {
        let field = self.setup_field;
        if field != SetupField::Players && !self.setup.is_player_count_set() {
            return;
        }
        let input = match field {
            SetupField::Players => &mut self.players_input,
            SetupField::Town => &mut self.town_input,
            _ => &mut self.mafia_input,
        };
        let current = parse_count(input).unwrap_or(0);
        let next = if up {
            current.saturating_add(1).min(self.rules.max_players)
        } else {
            current.saturating_sub(1)
        };
        *input = if next == 0 {
            String::new()
        } else {
            next.to_string()
        };
        self.apply_count_field(field);
    }

    fn apply_count_field(&mut self, field: SetupField) {
        match field {
            SetupField::Players => {
                self.setup.set_player_count(parse_count(&self.players_input));
                if !self.setup.is_player_count_set() {
                    self.town_input.clear();
                    self.mafia_input.clear();
                }
            }
            SetupField::Town => self.setup.set_town_count(parse_count(&self.town_input)),
            SetupField::Mafia => self.setup.set_mafia_count(parse_count(&self.mafia_input)),
            _ => {}
        }
    }

    fn handle_name_key(&mut self, code: KeyCode) -> bool {
        let Some(deal) = self.deal.as_mut() else {
            return false;
        };
        if !deal.is_revealed() {
            return false;
        }
        match code {
            KeyCode::Char(ch) => deal.push_name_char(ch).is_ok(),
            KeyCode::Backspace => deal.pop_name_char().is_ok(),
            _ => false,
        }
    }

    fn flush_events(&mut self) {
        let drained: Vec<_> = self.events.drain().collect();
        for event in drained {
            let line = format_event(self.locale, &event);
            if matches!(event, Event::AmbienceFailed { .. }) {
                self.push_status(line.clone());
            }
            self.push_event_line(line);
        }
    }

    fn push_event_line(&mut self, line: String) {
        if self.event_log.len() >= MAX_EVENT_LOG {
            let _ = self.event_log.pop_front();
        }
        self.event_log.push_back(line);
    }
}

fn move_index(value: &mut usize, len: usize, down: bool) {
    if len == 0 {
        *value = 0;
        return;
    }
    if down {
        *value = (*value + 1) % len;
    } else if *value == 0 {
        *value = len - 1;
    } else {
        *value -= 1;
    }
}

fn format_event(locale: UiLocale, event: &Event) -> String {
    match event {
        Event::RosterBuilt {
            players,
            town,
            mafia,
            independent,
        } => format!(
            "{} {players}: {} {town}, {} {mafia}, {} {independent}",
            locale.text("roster built for", "نقش‌ها ساخته شد برای"),
            locale.faction(Faction::Town),
            locale.faction(Faction::Mafia),
            locale.faction(Faction::Independent),
        ),
        Event::DealStarted { cards, seed } => format!(
            "{} {cards} (seed {seed})",
            locale.text("cards shuffled:", "کارت‌ها بر زده شد:")
        ),
        Event::CardRevealed { index, faction } => format!(
            "{} {} ({})",
            locale.text("revealed card", "کارت دیده شد"),
            index + 1,
            locale.faction(*faction)
        ),
        Event::CardPassed { index, remaining } => format!(
            "{} {} | {} {remaining}",
            locale.text("passed card", "کارت رد شد"),
            index + 1,
            locale.text("remaining", "باقی‌مانده")
        ),
        Event::DealFinished { players } => format!(
            "{} {players}",
            locale.text("deal finished, players:", "پخش نقش تمام شد، بازیکنان:")
        ),
        Event::PhaseChanged { phase, ambience } => {
            let sound = if *ambience {
                locale.text("ambience on", "صدای شب روشن")
            } else {
                locale.text("ambience off", "صدای شب خاموش")
            };
            format!(
                "{} {} | {sound}",
                locale.text("phase:", "زمان:"),
                locale.phase(*phase)
            )
        }
        Event::AmbienceFailed { reason } => format!(
            "{} {reason}",
            locale.text("night sound unavailable:", "صدای شب پخش نشد:")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mafia_core::{AmbienceError, SilentAmbience};
    use mafia_data::{builtin_catalog, MemoryStore};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Calls {
        starts: u32,
        stops: u32,
        broken: bool,
    }

    struct SharedAmbience(Rc<RefCell<Calls>>);

    impl Ambience for SharedAmbience {
        fn is_available(&self) -> bool {
            true
        }

        fn start_loop(&mut self) -> Result<(), AmbienceError> {
            let mut calls = self.0.borrow_mut();
            calls.starts += 1;
            if calls.broken {
                return Err(AmbienceError("no output device".to_string()));
            }
            Ok(())
        }

        fn stop(&mut self) {
            self.0.borrow_mut().stops += 1;
        }
    }

    fn app_with(ambience: Box<dyn Ambience>) -> App {
        let catalog = builtin_catalog(None).expect("catalog");
        App::new(
            UiLocale::EnUs,
            Some(7),
            catalog,
            TableRules::default(),
            Box::new(MemoryStore::new()),
            ambience,
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            assert!(app.handle_text_key(key(KeyCode::Char(ch))), "typed {ch}");
        }
    }

    fn fill_counts(app: &mut App, players: &str, town: &str, mafia: &str) {
        app.open_setup();
        type_text(app, players);
        app.cycle_focus(true);
        type_text(app, town);
        app.cycle_focus(true);
        type_text(app, mafia);
    }

    #[test]
    fn locale_aliases_pick_persian() {
        assert_eq!(UiLocale::from_opt(Some("fa")), UiLocale::FaIr);
        assert_eq!(UiLocale::from_opt(Some("de")), UiLocale::EnUs);
        assert_eq!(UiLocale::FaIr.text("Day", "روز"), "روز");
    }

    #[test]
    fn count_fields_stay_locked_until_players_are_set() {
        let mut app = app_with(Box::new(SilentAmbience));
        app.open_setup();
        app.cycle_focus(true);
        assert!(!app.handle_text_key(key(KeyCode::Char('3'))));
        assert!(app.town_input.is_empty());

        app.cycle_focus(false);
        type_text(&mut app, "6");
        app.cycle_focus(true);
        type_text(&mut app, "4");
        assert_eq!(app.setup.town_count(), Some(4));

        app.cycle_focus(false);
        assert!(app.handle_text_key(key(KeyCode::Backspace)));
        assert!(app.town_input.is_empty());
        assert_eq!(app.setup.town_count(), None);
    }

    #[test]
    fn full_game_reaches_the_table() {
        let mut app = app_with(Box::new(SilentAmbience));
        fill_counts(&mut app, "5", "3", "2");
        assert!(app.setup.is_team_counts_ready());
        app.confirm_setup();
        assert_eq!(app.screen, Screen::Deal);
        assert!(load_setup(app.store.as_ref()).expect("load").is_some());

        for idx in 0..5 {
            app.activate_primary();
            type_text(&mut app, &format!("p{idx}"));
            app.activate_primary();
        }
        assert_eq!(app.screen, Screen::Table);
        let table = app.table.as_ref().expect("table");
        assert_eq!(table.total(), 5);
        assert_eq!(table.counts().mafia, 2);
        let stored = load_setup(app.store.as_ref()).expect("load").expect("stored");
        assert!(stored.is_dealt());
    }

    #[test]
    fn deal_blocks_without_a_name() {
        let mut app = app_with(Box::new(SilentAmbience));
        fill_counts(&mut app, "3", "2", "1");
        app.confirm_setup();
        app.activate_primary();
        app.activate_primary();
        assert_eq!(app.deal.as_ref().expect("deal").index(), 0);
        assert!(app.status_line.contains("no player name"));
    }

    #[test]
    fn leaving_the_table_at_night_stops_the_loop() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut app = app_with(Box::new(SharedAmbience(calls.clone())));
        fill_counts(&mut app, "3", "2", "1");
        app.confirm_setup();
        for idx in 0..3 {
            app.reveal_card();
            type_text(&mut app, &format!("n{idx}"));
            app.advance_deal();
        }
        assert_eq!(app.screen, Screen::Table);
        app.set_table_phase(TablePhase::Night);
        assert_eq!(calls.borrow().starts, 1);
        app.go_home();
        assert_eq!(calls.borrow().stops, 1);
        assert_eq!(app.screen, Screen::Home);

        app.resume();
        assert_eq!(app.screen, Screen::Table);
    }

    #[test]
    fn broken_night_track_is_reported() {
        let calls = Rc::new(RefCell::new(Calls {
            broken: true,
            ..Calls::default()
        }));
        let mut app = app_with(Box::new(SharedAmbience(calls.clone())));
        fill_counts(&mut app, "3", "2", "1");
        app.confirm_setup();
        for idx in 0..3 {
            app.reveal_card();
            type_text(&mut app, &format!("n{idx}"));
            app.advance_deal();
        }
        app.set_table_phase(TablePhase::Night);
        assert_eq!(calls.borrow().starts, 1);
        assert_eq!(
            app.table.as_ref().map(TableView::phase),
            Some(TablePhase::Night)
        );
        assert!(app.status_line.contains("no output device"));
        assert!(app
            .event_log
            .back()
            .is_some_and(|line| line.contains("ambience off")));
    }

    #[test]
    fn escape_turns_the_card_before_leaving_the_glossary() {
        let mut app = app_with(Box::new(SilentAmbience));
        app.open_glossary();
        app.move_sideways(true);
        app.toggle_focused();
        assert!(app.glossary.is_flipped());
        app.back();
        assert_eq!(app.screen, Screen::Glossary);
        assert!(!app.glossary.is_flipped());
        assert_eq!(app.glossary.index(), 1);
        app.back();
        assert_eq!(app.screen, Screen::Home);
    }

    #[test]
    fn reset_clears_the_stored_game() {
        let mut app = app_with(Box::new(SilentAmbience));
        fill_counts(&mut app, "3", "2", "1");
        app.confirm_setup();
        app.reset_session();
        assert_eq!(app.screen, Screen::Home);
        assert!(load_setup(app.store.as_ref()).expect("load").is_none());
        app.resume();
        assert_eq!(app.screen, Screen::Home);
    }

    #[test]
    fn role_toggle_reports_full_team() {
        let mut app = app_with(Box::new(SilentAmbience));
        fill_counts(&mut app, "3", "2", "1");
        app.setup_field = SetupField::Roles;
        let godfather = app
            .catalog
            .roles()
            .iter()
            .position(|role| role.id.as_str() == "godFather")
            .expect("godfather");
        app.role_cursor = godfather;
        app.toggle_focused();
        assert!(!app.setup.is_selected("godFather"));
        assert!(app.status_line.contains("no free slots"));
    }
}
