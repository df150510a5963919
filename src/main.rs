use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use rust_i18n::t;

use vocabdr::app::{App, AppScreen, CliOverrides};
use vocabdr::audio::command::CommandAudio;
use vocabdr::audio::{AudioBackend, SilentAudio};
use vocabdr::audio::worker::AudioWorker;
use vocabdr::config::Config;
use vocabdr::event::{AppEvent, EventHandler};
use vocabdr::session::practice::PracticeMode;
use vocabdr::store::json_store::JsonStore;
use vocabdr::ui;
use vocabdr::ui::components::countdown_bar::CountdownBar;
use vocabdr::ui::components::dashboard::Dashboard;
use vocabdr::ui::components::deck_list::DeckList;
use vocabdr::ui::components::menu::MenuAction;
use vocabdr::ui::components::progress_bar::ProgressBar;
use vocabdr::ui::components::typing_area::TypingArea;
use vocabdr::ui::components::word_list::WordList;
use vocabdr::ui::layout::{AppLayout, pack_hint_lines};
use vocabdr::vocab::backend::BackendClient;
use vocabdr::vocab::bundled::BundledDecks;
use vocabdr::vocab::deck_file::DeckFile;
use vocabdr::vocab::{FilterCriteria, VocabSource};

// The binary renders its own screens, so it carries its own copy of the strings.
rust_i18n::i18n!("locales", fallback = "en");

#[derive(Parser)]
#[command(name = "vocabdr", version, about = "French vocabulary trainer for the terminal")]
struct Cli {
    #[arg(short, long, value_enum, help = "Start straight into this practice mode")]
    mode: Option<PracticeMode>,

    #[arg(short, long, help = "Class to practice")]
    class: Option<String>,

    #[arg(short, long, help = "Unit to practice")]
    unit: Option<String>,

    #[arg(short, long, help = "Practice words from a JSON deck file")]
    deck: Option<PathBuf>,

    #[arg(short, long, help = "Vocabulary backend base URL")]
    backend: Option<String>,

    #[arg(short, long, help = "Seconds per word in translation mode (1-20)")]
    speed: Option<u32>,

    #[arg(long, help = "Accept answers that differ only in accents")]
    ignore_accents: bool,

    #[arg(long, help = "Disable pronunciation and feedback sounds")]
    no_audio: bool,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("could not read config, using defaults: {e:#}");
        Config::default()
    });
    rust_i18n::set_locale(&config.locale);

    let backend_url = cli.backend.clone().or_else(|| config.backend_url.clone());
    let source = select_source(cli.deck.as_deref(), backend_url.as_deref());

    let events = EventHandler::new(Duration::from_millis(50));
    let audio_tx = events.sender();
    let backend: Box<dyn AudioBackend> =
        if config.tts_command.trim().is_empty() && config.player_command.trim().is_empty() {
            Box::new(SilentAudio)
        } else {
            Box::new(
                CommandAudio::new(&config.tts_command, &config.player_command).with_feedback_sounds(
                    config.correct_sound.clone(),
                    config.incorrect_sound.clone(),
                ),
            )
        };
    let worker = AudioWorker::spawn(backend, move |id| {
        let _ = audio_tx.send(AppEvent::AudioDone(id));
    });

    let store = JsonStore::new()
        .inspect_err(|e| log::warn!("history will not be saved: {e:#}"))
        .ok();
    let mut app = App::new(config, source, Some(worker), store);
    app.apply_overrides(&CliOverrides {
        speed: cli.speed,
        ignore_accents: cli.ignore_accents,
        no_audio: cli.no_audio,
        theme: cli.theme.clone(),
    });
    app.criteria = FilterCriteria::new(cli.class.clone(), cli.unit.clone());
    app.menu.refresh(&app.deck_label());

    if let Some(mode) = cli.mode {
        app.go_to_ready(mode);
        if app.screen == AppScreen::Ready {
            let _ = app.start_session(Instant::now());
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        log::error!("terminal loop failed: {err:#}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// The terminal belongs to the UI, so log records go to a file instead.
fn init_logging() {
    let Some(dir) = dirs::data_dir().map(|d| d.join("vocabdr")) else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("vocabdr.log"))
    else {
        return;
    };
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("VOCABDR_LOG", "info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

/// A deck file wins over a backend, which wins over the bundled decks.
fn select_source(deck: Option<&Path>, backend_url: Option<&str>) -> Box<dyn VocabSource> {
    if let Some(path) = deck {
        return Box::new(DeckFile::new(path));
    }
    if let Some(url) = backend_url.filter(|u| !u.trim().is_empty()) {
        match BackendClient::new(url) {
            Ok(client) => return Box::new(client),
            Err(e) => log::warn!("backend {url} unavailable, using bundled decks: {e}"),
        }
    }
    Box::new(BundledDecks)
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.tick(Instant::now()),
            AppEvent::AudioDone(id) => app.on_audio_done(id, Instant::now()),
            AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Only process Press events; Repeat would type the same letter twice
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::DeckSelect => handle_deck_key(app, key),
        AppScreen::WordList => handle_word_key(app, key),
        AppScreen::Ready => handle_ready_key(app, key),
        AppScreen::Practice => handle_practice_key(app, key),
        AppScreen::Result => handle_result_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key),
    }
}

fn run_menu_action(app: &mut App, action: MenuAction) {
    match action {
        MenuAction::Dictation => app.go_to_ready(PracticeMode::Dictation),
        MenuAction::Translation => app.go_to_ready(PracticeMode::Translation),
        MenuAction::ChooseDeck => app.go_to_deck_select(),
        MenuAction::ChooseWords => app.go_to_word_list(),
        MenuAction::Settings => app.go_to_settings(),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('1') => run_menu_action(app, MenuAction::Dictation),
        KeyCode::Char('2') => run_menu_action(app, MenuAction::Translation),
        KeyCode::Char('d') => run_menu_action(app, MenuAction::ChooseDeck),
        KeyCode::Char('w') => run_menu_action(app, MenuAction::ChooseWords),
        KeyCode::Char('c') => run_menu_action(app, MenuAction::Settings),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => {
            if let Some(action) = app.menu.selected_action() {
                run_menu_action(app, action);
            }
        }
        _ => {}
    }
}

fn handle_deck_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Up | KeyCode::Char('k') => app.deck_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.deck_next(),
        KeyCode::Enter => app.select_deck(),
        _ => {}
    }
}

fn handle_word_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => app.go_to_menu(),
        KeyCode::Up | KeyCode::Char('k') => app.word_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.word_next(),
        KeyCode::Char(' ') | KeyCode::Char('x') => app.toggle_word(),
        KeyCode::Char('a') => app.toggle_all_words(),
        KeyCode::Char('p') | KeyCode::Tab => app.preview_word(),
        _ => {}
    }
}

fn handle_ready_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Char('h') => app.toggle_hint(),
        KeyCode::Enter => {
            let _ = app.start_session(Instant::now());
        }
        _ => {}
    }
}

fn handle_practice_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('u') {
            app.clear_input();
        }
        return;
    }
    match key.code {
        KeyCode::Esc => app.end_session(),
        KeyCode::Enter => app.submit(Instant::now()),
        KeyCode::Tab => app.replay(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.clear_input(),
        KeyCode::Char(ch) => app.type_char(ch),
        _ => {}
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.retry_session(Instant::now()),
        KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => app.go_to_menu(),
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.save_settings();
            app.go_to_menu();
        }
        KeyCode::Up | KeyCode::Char('k') => app.settings_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.settings_next(),
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.settings_cycle_forward(),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle_backward(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::DeckSelect => render_deck_select(frame, app),
        AppScreen::WordList => render_word_list(frame, app),
        AppScreen::Ready => render_ready(frame, app),
        AppScreen::Practice => render_practice(frame, app),
        AppScreen::Result => render_result(frame, app),
        AppScreen::Settings => render_settings(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect, info: &str) {
    let colors = &app.theme.colors;
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " vocabdr ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info.to_string(),
            Style::default()
                .fg(colors.text_pending())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect, hint: &str) {
    let colors = &app.theme.colors;
    let line = match app.status {
        Some(ref status) => Line::from(Span::styled(
            format!(" {status}"),
            Style::default().fg(colors.error()),
        )),
        None => Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(colors.text_pending()),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let layout = AppLayout::new(area);

    let mut info = format!(
        "| {} | {}",
        app.source_description(),
        t!("menu.sessions", count = app.profile.total_sessions)
    );
    if app.profile.streak_days > 0 {
        info.push_str(&format!(
            " | {}",
            t!("menu.streak", days = app.profile.streak_days)
        ));
    }
    render_header(frame, app, layout.header, &info);

    let menu_area = ui::layout::centered_rect(50, 80, layout.main);
    frame.render_widget(&app.menu, menu_area);

    render_footer(frame, app, layout.footer, &t!("menu.footer"));
}

fn render_deck_select(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let layout = AppLayout::new(area);
    render_header(frame, app, layout.header, &format!("| {}", app.source_description()));

    let list_area = ui::layout::centered_rect(50, 80, layout.main);
    let list = DeckList::new(&app.deck_entries, app.deck_selected, app.theme);
    frame.render_widget(list, list_area);

    render_footer(frame, app, layout.footer, &t!("deck.footer"));
}

fn render_word_list(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let layout = AppLayout::new(area);
    render_header(frame, app, layout.header, &format!("| {}", app.deck_label()));

    let list_area = ui::layout::centered_rect(70, 90, layout.main);
    let list = WordList::new(&app.items, &app.word_selected, app.word_cursor, app.theme);
    frame.render_widget(list, list_area);

    render_footer(frame, app, layout.footer, &t!("words.footer"));
}

fn mode_name(mode: PracticeMode) -> String {
    match mode {
        PracticeMode::Dictation => t!("mode.dictation").to_string(),
        PracticeMode::Translation => t!("mode.translation").to_string(),
    }
}

fn render_ready(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let layout = AppLayout::new(area);
    render_header(frame, app, layout.header, &format!("| {}", mode_name(app.mode)));

    let centered = ui::layout::centered_rect(50, 50, layout.main);
    let block = Block::bordered()
        .title(format!(" {} ", t!("ready.title")))
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    frame.render_widget(block, centered);

    let hint = if app.config.show_translation_hint {
        t!("ready.hint_on")
    } else {
        t!("ready.hint_off")
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            mode_name(app.mode),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            t!("ready.deck", deck = app.deck_label()).to_string(),
            Style::default().fg(colors.fg()),
        )),
        Line::from(Span::styled(
            t!("ready.words", count = app.selected_count(), total = app.items.len()).to_string(),
            Style::default().fg(colors.fg()),
        )),
        Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(colors.text_pending()),
        )),
        Line::from(""),
        Line::from(Span::styled(
            t!("ready.press_enter").to_string(),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);

    render_footer(frame, app, layout.footer, &t!("ready.footer"));
}

fn render_practice(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let Some(driver) = app.driver.as_ref() else {
        return;
    };
    let session = &driver.session;
    let layout = AppLayout::new(area);

    let info = format!("| {} | {}", mode_name(app.mode), app.deck_label());
    render_header(frame, app, layout.header, &info);

    let countdown = driver.countdown();
    let mut constraints = Vec::new();
    if countdown.is_some() {
        constraints.push(Constraint::Min(6));
        constraints.push(Constraint::Length(8));
    } else {
        constraints.push(Constraint::Min(8));
    }
    constraints.push(Constraint::Length(3));

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(layout.main);

    let mut idx = 0;
    if let Some(countdown) = countdown {
        let now = Instant::now();
        let word = session.target().map(|t| t.english.as_str()).unwrap_or("");
        let bar = CountdownBar::new(
            word,
            countdown.fraction_elapsed(now),
            countdown.remaining(now).as_secs_f64(),
            app.theme,
        );
        frame.render_widget(bar, main_layout[idx]);
        idx += 1;
    }

    let typing = TypingArea::new(session, app.theme);
    frame.render_widget(typing, main_layout[idx]);
    idx += 1;

    let progress = ProgressBar::new(session.solved(), session.total_count(), app.theme);
    frame.render_widget(progress, main_layout[idx]);

    let footer_text = t!("practice.footer").to_string();
    let packed = pack_hint_lines(&[footer_text.trim()], layout.footer.width as usize);
    let footer = packed.first().cloned().unwrap_or_default();
    render_footer(frame, app, layout.footer, &footer);
}

fn render_result(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    if let Some(ref result) = app.last_result {
        let centered = ui::layout::centered_rect(60, 70, area);
        let dashboard = Dashboard::new(result, app.theme);
        frame.render_widget(dashboard, centered);
    }
}

fn on_off(value: bool) -> String {
    if value {
        t!("settings.on").to_string()
    } else {
        t!("settings.off").to_string()
    }
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let centered = ui::layout::centered_rect(60, 60, area);

    let block = Block::bordered()
        .title(t!("settings.title").to_string())
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    frame.render_widget(block, centered);

    let config = &app.config;
    let fields: Vec<(String, String)> = vec![
        (t!("settings.ignore_accents").to_string(), on_off(config.ignore_accents)),
        (t!("settings.audio").to_string(), on_off(config.audio_enabled)),
        (t!("settings.speed").to_string(), config.speed.to_string()),
        (t!("settings.hint").to_string(), on_off(config.show_translation_hint)),
        (t!("settings.accent").to_string(), config.accent.to_string()),
        (t!("settings.theme").to_string(), config.theme.clone()),
        (t!("settings.locale").to_string(), config.locale.clone()),
    ];

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            fields
                .iter()
                .map(|_| Constraint::Length(2))
                .chain(std::iter::once(Constraint::Min(0)))
                .collect::<Vec<_>>(),
        )
        .split(inner);

    for (i, (label, value)) in fields.iter().enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_style = Style::default()
            .fg(if is_selected { colors.accent() } else { colors.fg() })
            .add_modifier(if is_selected {
                Modifier::BOLD
            } else {
                Modifier::empty()
            });
        let value_style = Style::default().fg(if is_selected {
            colors.text_correct()
        } else {
            colors.text_pending()
        });

        let line = Line::from(vec![
            Span::styled(format!("{indicator}{label:<22}"), label_style),
            Span::styled(format!("< {value} >"), value_style),
        ]);
        frame.render_widget(Paragraph::new(line), layout[i]);
    }

    let footer = Paragraph::new(Line::from(Span::styled(
        t!("settings.footer").to_string(),
        Style::default().fg(colors.text_pending()),
    )));
    if let Some(last) = layout.last() {
        frame.render_widget(footer, *last);
    }
}
