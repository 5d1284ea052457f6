use anyhow::{Context, Result};
use env_logger::{Builder, Env};
use mafia_core::{
    display_player, ActionType, Catalog, DealSession, Event, EventBus, Faction, RngState,
    SetupForm, StoredSetup, TableView,
};
use mafia_data::{
    clear_setup, load_catalog_or_builtin, load_setup, load_table_rules, normalize_locale,
    save_setup, FileStore,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UiLocale {
    EnUs,
    FaIr,
}

impl UiLocale {
    fn code(self) -> &'static str {
        match self {
            Self::EnUs => "en_US",
            Self::FaIr => "fa_IR",
        }
    }

    fn from_opt(value: Option<&str>) -> Self {
        if normalize_locale(value) == "fa_IR" {
            Self::FaIr
        } else {
            Self::EnUs
        }
    }

    fn text<'a>(self, en: &'a str, fa: &'a str) -> &'a str {
        if matches!(self, Self::FaIr) {
            fa
        } else {
            en
        }
    }

    fn faction(self, faction: Faction) -> &'static str {
        match faction {
            Faction::Town => self.text("Town", "شهروند"),
            Faction::Mafia => self.text("Mafia", "مافیا"),
            Faction::Independent => self.text("Independent", "مستقل"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    cui: bool,
    seed: Option<u64>,
    locale: UiLocale,
    session: Option<PathBuf>,
    command: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SetupArgs {
    players: Option<u32>,
    town: Option<u32>,
    mafia: Option<u32>,
    independent: bool,
    roles: Vec<String>,
}

fn default_session_path() -> PathBuf {
    if let Some(path) = std::env::var_os("MAFIA_SESSION") {
        return PathBuf::from(path);
    }
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".mafia_session.json"))
        .unwrap_or_else(|| PathBuf::from("mafia_session.json"))
}

fn parse_cli_options(args: &[String]) -> CliOptions {
    let mut cui = false;
    let mut seed = std::env::var("MAFIA_SEED")
        .ok()
        .and_then(|value| value.parse::<u64>().ok());
    let mut session = None;
    let mut locale_arg: Option<String> = std::env::var("MAFIA_LANG").ok();
    let mut command = Vec::new();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--cui" if command.is_empty() => cui = true,
            "--lang" | "-l" if command.is_empty() => {
                if let Some(value) = args.get(idx + 1) {
                    locale_arg = Some(value.clone());
                    idx += 1;
                }
            }
            "--seed" if command.is_empty() => {
                if let Some(value) = args.get(idx + 1) {
                    seed = value.parse::<u64>().ok();
                    idx += 1;
                }
            }
            "--session" if command.is_empty() => {
                if let Some(value) = args.get(idx + 1) {
                    session = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            other => command.push(other.to_string()),
        }
        idx += 1;
    }
    CliOptions {
        cui,
        seed,
        locale: UiLocale::from_opt(locale_arg.as_deref()),
        session,
        command,
    }
}

fn parse_count_flag(flag: &str, value: Option<&String>) -> Result<u32, String> {
    let value = value.ok_or_else(|| format!("{flag} needs a number"))?;
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("{flag} expects a number, got {value}"))
}

fn parse_setup_args(args: &[String]) -> Result<SetupArgs, String> {
    let mut out = SetupArgs::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--players" | "-p" => {
                out.players = Some(parse_count_flag("--players", args.get(idx + 1))?);
                idx += 1;
            }
            "--town" | "--city" | "-t" => {
                out.town = Some(parse_count_flag("--town", args.get(idx + 1))?);
                idx += 1;
            }
            "--mafia" | "-m" => {
                out.mafia = Some(parse_count_flag("--mafia", args.get(idx + 1))?);
                idx += 1;
            }
            "--independent" | "-i" => out.independent = true,
            "--role" | "-r" => {
                let value = args
                    .get(idx + 1)
                    .ok_or_else(|| "--role needs a role id".to_string())?;
                out.roles.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|id| !id.is_empty())
                        .map(str::to_string),
                );
                idx += 1;
            }
            other => return Err(format!("unknown setup argument {other}")),
        }
        idx += 1;
    }
    Ok(out)
}

fn main() {
    init_logger();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_cli_options(&args);
    if options.cui {
        let launch = mafia_cui::LaunchOptions {
            locale: Some(options.locale.code().to_string()),
            seed: options.seed,
            session: options.session.clone(),
            night_audio: std::env::var_os("MAFIA_NIGHT_AUDIO").map(PathBuf::from),
        };
        if let Err(err) = mafia_cui::run(launch) {
            eprintln!("cui launch error: {err:#}");
            std::process::exit(1);
        }
        return;
    }
    if let Err(err) = run(&options) {
        eprintln!("{}: {err:#}", options.locale.text("error", "خطا"));
        std::process::exit(1);
    }
}

fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp(Some(env_logger::TimestampPrecision::Millis))
        .init();
}

fn run(options: &CliOptions) -> Result<()> {
    let locale = options.locale;
    let assets = Path::new("assets");
    let catalog =
        load_catalog_or_builtin(assets, Some(locale.code())).context("load role catalog")?;
    let session_path = options.session.clone().unwrap_or_else(default_session_path);
    let mut store = FileStore::new(&session_path);
    log::debug!("session file {}", session_path.display());

    let (name, rest) = match options.command.split_first() {
        Some((name, rest)) => (name.as_str(), rest),
        None => ("help", &[][..]),
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match name {
        "roles" => print_roles(locale, &catalog, &mut out)?,
        "setup" => {
            let args = parse_setup_args(rest).map_err(|err| anyhow::anyhow!(err))?;
            let rules = load_table_rules(assets).context("load table rules")?;
            let form = build_form(SetupForm::new(catalog, rules), &args);
            let mut events = EventBus::default();
            let setup = form.build_roster_with_events(&mut events)?;
            drain_events(&mut events);
            save_setup(&mut store, &setup).context("store roster")?;
            writeln!(
                out,
                "{} {} ({})",
                locale.text("roster stored:", "نقش‌ها ذخیره شد:"),
                setup.roles.len(),
                session_path.display()
            )?;
            for role in &setup.roles {
                writeln!(out, "  - {} [{}]", role.name, locale.faction(role.faction))?;
            }
        }
        "deal" => {
            let setup = load_setup(&store)
                .context("read stored roster")?
                .ok_or_else(|| anyhow::anyhow!("no roster stored; run `setup` first"))?;
            let mut rng = match options.seed {
                Some(seed) => RngState::from_seed(seed),
                None => RngState::from_entropy(),
            };
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let finished = run_deal(locale, setup, &mut rng, &mut input, &mut out)?;
            save_setup(&mut store, &finished).context("store dealt roster")?;
            writeln!(
                out,
                "{}",
                locale.text("all cards dealt; run `table`", "همه نقش‌ها پخش شد")
            )?;
        }
        "table" | "list" => {
            let setup = load_setup(&store)
                .context("read stored roster")?
                .ok_or_else(|| anyhow::anyhow!("no roster stored; run `setup` first"))?;
            print_table(locale, setup, &mut out)?;
        }
        "reset" => {
            clear_setup(&mut store).context("clear session")?;
            writeln!(out, "{}", locale.text("session cleared", "اطلاعات بازی پاک شد"))?;
        }
        "help" | "-h" | "--help" => print_help(locale, &mut out)?,
        other => anyhow::bail!("unknown command {other}; try `help`"),
    }
    Ok(())
}

/// Counts first, then specials in catalog order so over-asked factions keep
/// their earliest roles.
fn build_form(mut form: SetupForm, args: &SetupArgs) -> SetupForm {
    form.set_player_count(args.players);
    form.set_town_count(args.town);
    form.set_mafia_count(args.mafia);
    form.set_include_independent(args.independent);
    let ordered: Vec<String> = form
        .catalog()
        .roles()
        .iter()
        .filter(|role| args.roles.iter().any(|id| id == role.id.as_str()))
        .map(|role| role.id.as_str().to_string())
        .collect();
    for id in ordered {
        if !form.is_selected(&id) && !form.toggle_role(&id) {
            log::warn!("role {id} skipped: no free slot or not selectable");
        }
    }
    for id in &args.roles {
        if form.catalog().get(id).is_none() {
            log::warn!("unknown role {id}");
        }
    }
    form
}

fn read_line<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    let read = input.read_line(&mut line).context("read input")?;
    if read == 0 {
        anyhow::bail!("input closed before the deal finished");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn run_deal<R: BufRead, W: Write>(
    locale: UiLocale,
    setup: StoredSetup,
    rng: &mut RngState,
    input: &mut R,
    out: &mut W,
) -> Result<StoredSetup> {
    let mut events = EventBus::default();
    let mut deal = DealSession::start(setup, rng, &mut events)?;
    loop {
        writeln!(
            out,
            "{} {}/{} | {} {} | {}%",
            locale.text("Player", "بازیکن"),
            deal.index() + 1,
            deal.total(),
            locale.text("left", "باقی‌مانده"),
            deal.remaining(),
            deal.progress_percent()
        )?;
        write!(
            out,
            "{}",
            locale.text(
                "only the player may look; press Enter to reveal> ",
                "فقط بازیکن نگاه کند؛ برای نمایش اینتر> "
            )
        )?;
        out.flush()?;
        read_line(input)?;
        deal.reveal(&mut events);
        let role = deal.current();
        writeln!(out, "  [{}] {}", locale.faction(role.faction), role.name)?;
        for line in role.description.lines() {
            writeln!(out, "  {line}")?;
        }
        loop {
            write!(out, "{}> ", locale.text("name", "نام"))?;
            out.flush()?;
            let name = read_line(input)?;
            deal.set_name(name)?;
            if deal.can_proceed() {
                break;
            }
            writeln!(out, "{}", locale.text("a name is required", "نام لازم است"))?;
        }
        if deal.is_last() {
            let finished = deal.finish(&mut events)?;
            drain_events(&mut events);
            return Ok(finished);
        }
        deal.next(&mut events)?;
        drain_events(&mut events);
        writeln!(
            out,
            "{}\n",
            locale.text("pass the device on", "دستگاه را به نفر بعد بدهید")
        )?;
    }
}

fn print_roles<W: Write>(locale: UiLocale, catalog: &Catalog, out: &mut W) -> Result<()> {
    for faction in Faction::ALL {
        writeln!(out, "{}:", locale.faction(faction))?;
        for role in catalog.by_faction(faction) {
            let actions: Vec<String> = role
                .actions
                .iter()
                .filter(|action| **action != ActionType::None)
                .map(|action| format!("{action:?}"))
                .collect();
            if actions.is_empty() {
                writeln!(out, "  {:<14} {}", role.id.as_str(), role.name)?;
            } else {
                writeln!(
                    out,
                    "  {:<14} {} ({})",
                    role.id.as_str(),
                    role.name,
                    actions.join(", ")
                )?;
            }
        }
    }
    Ok(())
}

fn print_table<W: Write>(locale: UiLocale, setup: StoredSetup, out: &mut W) -> Result<()> {
    let table = TableView::from_setup(setup)?;
    let counts = table.counts();
    write!(
        out,
        "{} {} | {} {} | {} {}",
        locale.text("Players", "بازیکنان"),
        table.total(),
        locale.faction(Faction::Town),
        counts.town,
        locale.faction(Faction::Mafia),
        counts.mafia
    )?;
    if table.show_independent() {
        write!(
            out,
            " | {} {}",
            locale.faction(Faction::Independent),
            counts.independent
        )?;
    }
    writeln!(out)?;
    for (idx, role) in table.roles().iter().enumerate() {
        writeln!(
            out,
            "{:>3}. {:<16} {} [{}]",
            idx + 1,
            display_player(role, idx),
            role.name,
            locale.faction(role.faction)
        )?;
    }
    Ok(())
}

fn print_help<W: Write>(locale: UiLocale, out: &mut W) -> Result<()> {
    writeln!(
        out,
        "mafia-cli [--lang L] [--seed N] [--session PATH] [--cui] <command>"
    )?;
    writeln!(out, "{}", locale.text("Commands:", "دستورها:"))?;
    writeln!(
        out,
        "  roles                    {}",
        locale.text("list the role catalog", "فهرست نقش‌ها")
    )?;
    writeln!(
        out,
        "  setup --players N --town N --mafia N [--independent] [--role ID]...\n                           {}",
        locale.text("build and store the roster", "ساخت و ذخیره نقش‌ها")
    )?;
    writeln!(
        out,
        "  deal                     {}",
        locale.text("hand out the cards one by one", "پخش کارت‌ها یکی یکی")
    )?;
    writeln!(
        out,
        "  table|list               {}",
        locale.text("show the dealt roster", "نمایش لیست بازیکنان")
    )?;
    writeln!(
        out,
        "  reset                    {}",
        locale.text("forget the stored game", "پاک کردن بازی ذخیره شده")
    )?;
    Ok(())
}

fn drain_events(events: &mut EventBus) {
    for event in events.drain() {
        match event {
            Event::RosterBuilt { players, .. } => log::info!("roster built for {players} players"),
            Event::DealFinished { players } => log::info!("deal finished for {players} players"),
            other => log::debug!("event: {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mafia_data::builtin_catalog;
    use std::io::Cursor;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn roster(players: u32, town: u32, mafia: u32) -> StoredSetup {
        let form = SetupForm::new(builtin_catalog(None).expect("catalog"), Default::default());
        let args = SetupArgs {
            players: Some(players),
            town: Some(town),
            mafia: Some(mafia),
            ..SetupArgs::default()
        };
        build_form(form, &args).build_roster().expect("roster")
    }

    #[test]
    fn global_flags_stop_at_the_command() {
        let options = parse_cli_options(&strings(&[
            "--lang", "fa", "--seed", "9", "setup", "--players", "5",
        ]));
        assert_eq!(options.locale, UiLocale::FaIr);
        assert_eq!(options.seed, Some(9));
        assert_eq!(options.command, strings(&["setup", "--players", "5"]));
    }

    #[test]
    fn setup_args_accept_role_lists() {
        let args = parse_setup_args(&strings(&[
            "--players", "6", "--town", "4", "--mafia", "2", "--role", "doctor,detective", "-r",
            "godFather",
        ]))
        .expect("args");
        assert_eq!(args.players, Some(6));
        assert_eq!(args.roles, strings(&["doctor", "detective", "godFather"]));
        assert!(parse_setup_args(&strings(&["--players", "many"])).is_err());
        assert!(parse_setup_args(&strings(&["--wat"])).is_err());
    }

    #[test]
    fn build_form_keeps_catalog_order_under_limits() {
        let form = SetupForm::new(builtin_catalog(None).expect("catalog"), Default::default());
        let args = SetupArgs {
            players: Some(5),
            town: Some(3),
            mafia: Some(2),
            independent: false,
            roles: strings(&["sniper", "doctor", "detective"]),
        };
        let form = build_form(form, &args);
        assert!(form.is_selected("detective"));
        assert!(form.is_selected("doctor"));
        assert!(!form.is_selected("sniper"));
    }

    #[test]
    fn deal_loop_requires_names() {
        let setup = roster(3, 2, 1);
        let mut input = Cursor::new("\nAli\n\n\nBob\n\nCy\n");
        let mut out = Vec::new();
        let finished = run_deal(
            UiLocale::EnUs,
            setup,
            &mut RngState::from_seed(3),
            &mut input,
            &mut out,
        )
        .expect("deal");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("a name is required"));
        let names: Vec<&str> = finished.roles.iter().map(|role| role.player_name()).collect();
        assert_eq!(names, vec!["Ali", "Bob", "Cy"]);
    }

    #[test]
    fn deal_loop_fails_on_closed_input() {
        let setup = roster(3, 2, 1);
        let mut input = Cursor::new("\nAli\n");
        let mut out = Vec::new();
        let err = run_deal(
            UiLocale::EnUs,
            setup,
            &mut RngState::from_seed(3),
            &mut input,
            &mut out,
        )
        .expect_err("closed");
        assert!(err.to_string().contains("input closed"));
    }

    #[test]
    fn table_lists_players_with_fallback_names() {
        let setup = roster(3, 2, 1);
        let mut out = Vec::new();
        print_table(UiLocale::EnUs, setup, &mut out).expect("table");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("Players 3 | Town 2 | Mafia 1"));
        assert!(text.contains("Player 1"));
    }
}
