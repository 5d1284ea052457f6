use crate::app::{App, Screen, SetupField, HOME_ITEMS};
use mafia_core::{display_player, ActionType, Faction, TablePhase};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Alignment, Color, Line, Modifier, Span, Style, Stylize};
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

pub fn draw(frame: &mut Frame, app: &App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(12),
            Constraint::Length(8),
        ])
        .split(frame.area());

    draw_header(frame, root[0], app);
    match app.screen {
        Screen::Home => draw_home(frame, root[1], app),
        Screen::Setup => draw_setup(frame, root[1], app),
        Screen::Deal => draw_deal(frame, root[1], app),
        Screen::Table => draw_table(frame, root[1], app),
        Screen::Glossary => draw_glossary(frame, root[1], app),
    }
    draw_events(frame, root[2], app);

    if app.show_help {
        draw_help_popup(frame, app);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let title = format!(
        "{} | {}: {} | {}: {}",
        app.locale.text("Mafia Moderator", "راوی مافیا"),
        app.locale.text("Screen", "صفحه"),
        app.screen_label(),
        app.locale.text("Hint", "راهنما"),
        app.next_hint()
    );
    let seed = app
        .seed
        .map(|seed| seed.to_string())
        .unwrap_or_else(|| app.locale.text("random", "تصادفی").to_string());
    let extra = format!(
        "{} {} | {} {} | {} {}",
        app.locale.text("Seed", "بذر"),
        seed,
        app.locale.text("Lang", "زبان"),
        app.locale.code(),
        app.locale.text("Roles", "نقش‌ها"),
        app.catalog.len()
    );
    let lines = vec![
        Line::from(title.bold()),
        Line::from(extra),
        Line::from(format!(
            "{}: {}",
            app.locale.text("Status", "وضعیت"),
            app.status_line
        )),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .title(app.locale.text("Overview", "خلاصه"));
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(block);
    frame.render_widget(paragraph, area);
}

fn draw_home(frame: &mut Frame, area: Rect, app: &App) {
    let area = centered_rect(60, 70, area);
    let items: Vec<ListItem> = HOME_ITEMS
        .iter()
        .map(|item| ListItem::new(app.home_label(*item)))
        .collect();
    let list = List::new(items)
        .block(pane_block(app.locale.text("Menu", "منو"), true))
        .highlight_style(highlight_style())
        .highlight_symbol(">> ");
    let mut state = ListState::default();
    state.select(Some(app.home_cursor.min(HOME_ITEMS.len() - 1)));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_setup(frame: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let form = &app.setup;
    let ready = form.is_team_counts_ready();
    let locked = !form.is_player_count_set();
    let mut lines = vec![
        count_line(app, SetupField::Players, &app.players_input, false),
        count_line(app, SetupField::Town, &app.town_input, locked),
        count_line(app, SetupField::Mafia, &app.mafia_input, locked),
        field_line(
            app,
            SetupField::Independent,
            format!(
                "[{}] ({})",
                if form.include_independent() { "x" } else { " " },
                form.independent_count()
            ),
            locked,
        ),
        Line::from(""),
    ];
    let readiness = if ready {
        Span::styled(
            app.locale.text("counts add up", "تعداد درست است"),
            Style::default().fg(Color::Green),
        )
    } else {
        Span::styled(
            app.locale.text("counts do not add up yet", "تعداد هنوز درست نیست"),
            Style::default().fg(Color::Red),
        )
    };
    lines.push(Line::from(readiness));
    lines.push(Line::from(format!(
        "{}: {}",
        app.locale.text("Selectable specials left", "نقش ویژه باقی‌مانده"),
        form.remaining_selectable()
    )));
    for faction in [Faction::Town, Faction::Mafia] {
        lines.push(Line::from(format!(
            "{}: {}/{}",
            app.locale.faction(faction),
            form.selected_special_count(faction),
            form.special_limit(faction)
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(app.locale.text(
        "Enter builds the roster and starts the deal",
        "اینتر نقش‌ها را می‌سازد و پخش را شروع می‌کند",
    )));
    let block = pane_block(
        app.locale.text("Game", "بازی"),
        app.setup_field != SetupField::Roles,
    );
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        columns[0],
    );

    let items: Vec<ListItem> = app
        .catalog
        .roles()
        .iter()
        .map(|role| {
            let slot = form.role_state(role.id.as_str());
            let checked = slot.map(|slot| slot.checked).unwrap_or(false);
            let disabled = slot.map(|slot| slot.disabled).unwrap_or(true);
            let mark = if checked { "[x]" } else { "[ ]" };
            let mut style = Style::default().fg(faction_color(role.faction));
            if disabled {
                style = style.add_modifier(Modifier::DIM);
            }
            ListItem::new(Line::from(vec![
                Span::raw(format!("{mark} ")),
                Span::styled(role.name.clone(), style),
                Span::raw(format!(" ({})", app.locale.faction(role.faction))),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(pane_block(
            app.field_label(SetupField::Roles),
            app.setup_field == SetupField::Roles,
        ))
        .highlight_style(highlight_style())
        .highlight_symbol(">> ");
    let mut state = ListState::default();
    if app.setup_field == SetupField::Roles && !app.catalog.is_empty() {
        state.select(Some(app.role_cursor.min(app.catalog.len() - 1)));
    }
    frame.render_stateful_widget(list, columns[1], &mut state);
}

fn count_line<'a>(app: &App, field: SetupField, value: &str, locked: bool) -> Line<'a> {
    let cursor = if app.setup_field == field { "_" } else { "" };
    field_line(app, field, format!("{value}{cursor}"), locked)
}

fn field_line<'a>(app: &App, field: SetupField, value: String, locked: bool) -> Line<'a> {
    let focused = app.setup_field == field;
    let marker = if focused { ">> " } else { "   " };
    let mut style = Style::default();
    if focused {
        style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
    }
    if locked {
        style = style.add_modifier(Modifier::DIM);
    }
    Line::from(Span::styled(
        format!("{marker}{}: {value}", app.field_label(field)),
        style,
    ))
}

fn draw_deal(frame: &mut Frame, area: Rect, app: &App) {
    let Some(deal) = app.deal.as_ref() else {
        frame.render_widget(
            Paragraph::new(app.locale.text("no deal in progress", "پخشی در جریان نیست"))
                .block(pane_block(app.screen_label(), true)),
            area,
        );
        return;
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(6)])
        .split(area);

    let gauge = Gauge::default()
        .block(pane_block(app.locale.text("Progress", "پیشرفت"), false))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(deal.progress_percent().min(100) as u16)
        .label(format!(
            "{} {}/{} | {} {}",
            app.locale.text("Player", "بازیکن"),
            deal.index() + 1,
            deal.total(),
            app.locale.text("left", "باقی‌مانده"),
            deal.remaining()
        ));
    frame.render_widget(gauge, rows[0]);

    let role = deal.current();
    let lines = if deal.is_revealed() {
        let mut lines = vec![
            Line::from(Span::styled(
                app.locale.faction(role.faction),
                Style::default().fg(faction_color(role.faction)),
            )),
            Line::from(role.name.clone().bold()),
            Line::from(""),
        ];
        lines.extend(role.description.lines().map(|line| Line::from(line.to_string())));
        lines.push(Line::from(""));
        lines.push(Line::from(format!(
            "{}: {}_",
            app.locale.text("Name", "نام"),
            deal.current_name()
        )));
        lines
    } else {
        vec![
            Line::from(""),
            Line::from("? ? ?".bold()),
            Line::from(""),
            Line::from(app.locale.text(
                "Only the player in front of the screen may look.",
                "فقط بازیکن مقابل صفحه نگاه کند.",
            )),
            Line::from(app.locale.text(
                "Space or Enter reveals the card.",
                "فاصله یا اینتر کارت را نشان می‌دهد.",
            )),
        ]
    };
    let block = pane_block(app.locale.text("Card", "کارت"), deal.is_revealed());
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false }),
        rows[1],
    );
}

fn draw_table(frame: &mut Frame, area: Rect, app: &App) {
    let Some(table) = app.table.as_ref() else {
        frame.render_widget(
            Paragraph::new(app.locale.text("no roster stored", "لیستی ذخیره نشده"))
                .block(pane_block(app.screen_label(), true)),
            area,
        );
        return;
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(4)])
        .split(area);

    let counts = table.counts();
    let mut summary = vec![
        Span::raw(format!(
            "{} {} | ",
            app.locale.text("Players", "بازیکنان"),
            table.total()
        )),
        Span::styled(
            format!("{} {}", app.locale.faction(Faction::Town), counts.town),
            Style::default().fg(faction_color(Faction::Town)),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("{} {}", app.locale.faction(Faction::Mafia), counts.mafia),
            Style::default().fg(faction_color(Faction::Mafia)),
        ),
    ];
    if table.show_independent() {
        summary.push(Span::raw(" | "));
        summary.push(Span::styled(
            format!(
                "{} {}",
                app.locale.faction(Faction::Independent),
                counts.independent
            ),
            Style::default().fg(faction_color(Faction::Independent)),
        ));
    }
    let phase_style = match table.phase() {
        TablePhase::Day => Style::default().fg(Color::Yellow),
        TablePhase::Night => Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
    };
    let header = vec![
        Line::from(summary),
        Line::from(Span::styled(
            format!(
                "{}: {}",
                app.locale.text("Phase", "زمان"),
                app.locale.phase(table.phase())
            ),
            phase_style,
        )),
    ];
    frame.render_widget(
        Paragraph::new(header).block(pane_block(app.locale.text("Summary", "خلاصه"), false)),
        rows[0],
    );

    let items: Vec<ListItem> = table
        .roles()
        .iter()
        .enumerate()
        .map(|(idx, role)| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:>2}. {}  ", idx + 1, display_player(role, idx))),
                Span::styled(
                    role.name.clone(),
                    Style::default().fg(faction_color(role.faction)),
                ),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(pane_block(app.locale.text("Roster", "لیست"), true))
        .highlight_style(highlight_style())
        .highlight_symbol(">> ");
    let mut state = ListState::default();
    if table.total() > 0 {
        state.select(Some(app.table_cursor.min(table.total() - 1)));
    }
    frame.render_stateful_widget(list, rows[1], &mut state);
}

fn draw_glossary(frame: &mut Frame, area: Rect, app: &App) {
    let glossary = &app.glossary;
    let Some(role) = glossary.current() else {
        frame.render_widget(
            Paragraph::new(app.locale.text("catalog is empty", "نقشی وجود ندارد"))
                .block(pane_block(app.screen_label(), true)),
            area,
        );
        return;
    };
    let card = centered_rect(70, 90, area);
    let mut lines = vec![
        Line::from(Span::styled(
            app.locale.faction(role.faction),
            Style::default().fg(faction_color(role.faction)),
        )),
        Line::from(role.name.clone().bold()),
        Line::from(""),
    ];
    if glossary.is_flipped() {
        lines.extend(role.description.lines().map(|line| Line::from(line.to_string())));
    } else {
        lines.push(Line::from(format!(
            "{}: {}",
            app.locale.text("Image", "تصویر"),
            role.image
        )));
        let actions: Vec<String> = role
            .actions
            .iter()
            .filter(|action| **action != ActionType::None)
            .map(|action| format!("{action:?} ({:?})", action.phase()))
            .collect();
        if !actions.is_empty() {
            lines.push(Line::from(format!(
                "{}: {}",
                app.locale.text("Abilities", "توانایی‌ها"),
                actions.join(", ")
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(app.locale.text(
            "Space flips the card",
            "برای دیدن توضیحات فاصله را بزنید",
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(slide_dots(
        glossary.index(),
        glossary.slides().len(),
    )));
    let title = format!(
        "{} {}/{}",
        app.screen_label(),
        glossary.index() + 1,
        glossary.slides().len()
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(faction_color(role.faction)));
    frame.render_widget(Clear, card);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        card,
    );
}

fn slide_dots(index: usize, len: usize) -> String {
    (0..len)
        .map(|idx| if idx == index { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join(" ")
}

fn draw_events(frame: &mut Frame, area: Rect, app: &App) {
    let capacity = area.height.saturating_sub(2) as usize;
    let start = app.event_log.len().saturating_sub(capacity);
    let lines: Vec<Line<'_>> = app
        .event_log
        .iter()
        .skip(start)
        .map(|line| Line::from(line.clone()))
        .collect();
    let block = pane_block(app.locale.text("Events", "رویدادها"), false);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_help_popup(frame: &mut Frame, app: &App) {
    let area = centered_rect(70, 60, frame.area());
    frame.render_widget(Clear, area);
    let locale = app.locale;
    let lines = vec![
        Line::from(locale.text(
            "q quit | ? help | esc back to menu",
            "q خروج | ? راهنما | esc بازگشت به منو",
        )),
        Line::from(locale.text(
            "tab/shift+tab switch field | arrows/jk move",
            "tab جابجایی بین فیلدها | جهت‌ها حرکت",
        )),
        Line::from(locale.text(
            "setup: type digits, left/right adjust, space toggles",
            "تنظیمات: عدد تایپ کنید، چپ و راست تغییر، فاصله انتخاب",
        )),
        Line::from(locale.text(
            "deal: space reveals, type the name, enter passes",
            "پخش: فاصله نمایش، نام را تایپ کنید، اینتر بعدی",
        )),
        Line::from(locale.text(
            "table: n night | d day | space toggles",
            "لیست: n شب | d روز | فاصله تغییر",
        )),
        Line::from(locale.text(
            "glossary: left/right browse | space flips | esc turns back",
            "معرفی: چپ و راست مرور | فاصله چرخش | esc برگرداندن",
        )),
        Line::from(locale.text(
            "Shift+R clears the stored game",
            "Shift+R بازی ذخیره شده را پاک می‌کند",
        )),
    ];
    let block = Block::default()
        .title(locale.text("Help", "راهنما"))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn faction_color(faction: Faction) -> Color {
    match faction {
        Faction::Town => Color::Cyan,
        Faction::Mafia => Color::Red,
        Faction::Independent => Color::Magenta,
    }
}

fn highlight_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let mut block = Block::default().title(title).borders(Borders::ALL);
    if focused {
        block = block.border_style(Style::default().fg(Color::Yellow));
    }
    block
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
