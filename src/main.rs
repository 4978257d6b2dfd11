mod app;
mod event;
mod ui;

use std::fs;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tracing_subscriber::EnvFilter;

use skillmate::client::HttpContentClient;
use skillmate::config::Config;
use skillmate::content::Difficulty;
use skillmate::store::JsonStore;

use app::{App, AppScreen, Section};
use event::{AppEvent, EventHandler};
use ui::components::content_view::ContentView;
use ui::components::history_list::HistoryList;
use ui::components::search_form::SearchForm;
use ui::layout::{ScreenLayout, centered_rect, pack_hint_lines};
use ui::line_input::{InputResult, LineInput};

#[derive(Parser)]
#[command(
    name = "skillmate",
    version,
    about = "AI-generated micro lessons and quizzes in your terminal"
)]
struct Cli {
    #[arg(long, help = "Content service base URL (overrides SKILLMATE_API_URL)")]
    api_url: Option<String>,

    #[arg(short, long, value_enum, help = "Initial difficulty level")]
    difficulty: Option<Difficulty>,

    #[arg(short, long, help = "Prefill the skill input")]
    skill: Option<String>,

    #[arg(long, conflicts_with = "light", help = "Start in dark mode")]
    dark: bool,

    #[arg(long, help = "Start in light mode")]
    light: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Ignoring unreadable config: {e}");
        Config::default()
    });
    if let Some(url) = cli.api_url {
        config.api_url = url;
        config.normalize();
    }
    if let Some(difficulty) = cli.difficulty {
        config.default_difficulty = difficulty;
    }

    let store = JsonStore::new().ok();
    init_logging(&config, store.as_ref());
    tracing::info!(api_url = %config.api_url, "starting skillmate");

    let client = Arc::new(HttpContentClient::new(
        &config.api_url,
        config.request_timeout(),
    )?);

    let events = EventHandler::new(Duration::from_millis(100));
    let mut app = App::new(config, store, client, events.sender());
    if let Some(skill) = cli.skill {
        app.skill_input = LineInput::new(&skill);
    }
    if (cli.dark && !app.session.dark_mode) || (cli.light && app.session.dark_mode) {
        app.toggle_theme();
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
        tracing::error!(error = ?err, "event loop failed");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Logs go to a file next to the stored history; the terminal belongs to the UI.
fn init_logging(config: &Config, store: Option<&JsonStore>) {
    let Some(store) = store else {
        return;
    };
    let log_path = store.base_dir().join("skillmate.log");
    let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    else {
        return;
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
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
            AppEvent::Tick => app.tick = app.tick.wrapping_add(1),
            AppEvent::Resize(_, _) => {}
            AppEvent::Generated { id, result } => app.on_generated(id, result),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('t') => {
                app.toggle_theme();
                return;
            }
            _ => {}
        }
    }

    match app.screen {
        AppScreen::Search => handle_search_key(app, key),
        AppScreen::Content => handle_content_key(app, key),
        AppScreen::History => handle_history_key(app, key),
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
    // Inputs are locked while a request is out.
    if app.session.is_loading() {
        if key.code == KeyCode::Esc {
            app.should_quit = true;
        }
        return;
    }

    match key.code {
        KeyCode::Tab => app.cycle_difficulty(true),
        KeyCode::BackTab => app.cycle_difficulty(false),
        KeyCode::Up | KeyCode::Down => {
            if !app.session.history.is_empty() {
                app.go_to_history();
            }
        }
        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.go_to_history();
        }
        _ => match app.skill_input.handle(key) {
            InputResult::Submit => app.submit(),
            InputResult::Cancel => {
                if app.session.content.is_some() {
                    app.screen = AppScreen::Content;
                } else {
                    app.should_quit = true;
                }
            }
            InputResult::Continue => {}
        },
    }
}

fn handle_content_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::Right => return app.next_section(),
        KeyCode::BackTab | KeyCode::Left => return app.prev_section(),
        KeyCode::Char('n') | KeyCode::Char('/') | KeyCode::Esc => return app.go_to_search(),
        KeyCode::Char('h') => return app.go_to_history(),
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        _ => {}
    }

    if app.section == Section::Quiz {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.next_question(),
            KeyCode::Char('k') | KeyCode::Up => app.prev_question(),
            KeyCode::Char(ch @ '1'..='9') => {
                app.choose_option(ch as usize - '1' as usize);
            }
            KeyCode::Enter | KeyCode::Char('s') => app.submit_quiz(),
            KeyCode::Char('r') => app.retry_quiz(),
            _ => {}
        }
    } else {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
            KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
            _ => {}
        }
    }
}

fn handle_history_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            if app.session.content.is_some() {
                app.screen = AppScreen::Content;
            } else {
                app.go_to_search();
            }
        }
        KeyCode::Char('j') | KeyCode::Down => app.history_next(),
        KeyCode::Char('k') | KeyCode::Up => app.history_prev(),
        KeyCode::Enter => app.open_history(),
        KeyCode::Char('n') | KeyCode::Char('/') => app.go_to_search(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let hints = footer_hints(app);
    let hint_lines = pack_hint_lines(&hints, area.width as usize);
    // The search form shows notices itself.
    let footer_notice = app.notice.as_deref().filter(|_| app.screen != AppScreen::Search);
    let footer_height = hint_lines.len() + usize::from(footer_notice.is_some());
    let layout = ScreenLayout::new(area, footer_height as u16);

    let mode = if app.session.dark_mode { "dark" } else { "light" };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " skillmate ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                " {} | {} recent | {mode} mode",
                app.session.difficulty.label(),
                app.session.history.len()
            ),
            Style::default()
                .fg(colors.text_muted())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout.header);

    match app.screen {
        AppScreen::Search => {
            let form = SearchForm {
                input: &app.skill_input,
                difficulty: app.session.difficulty,
                loading: app.session.is_loading(),
                tick: app.tick,
                error: app.session.error.as_deref(),
                notice: app.notice.as_deref(),
                recent_count: app.session.history.len(),
                theme: &app.theme,
            };
            frame.render_widget(form, centered_rect(60, 60, layout.body));
        }
        AppScreen::Content => {
            if let Some(content) = app.session.content.as_ref() {
                let sections = app.sections();
                let view = ContentView {
                    content,
                    quiz: &app.session.quiz,
                    sections: &sections,
                    section: app.section,
                    selected_question: app.selected_question,
                    scroll: app.scroll,
                    theme: &app.theme,
                };
                frame.render_widget(view, layout.body);
            }
        }
        AppScreen::History => {
            let list = HistoryList {
                history: &app.session.history,
                selected: app.history_selected,
                current: app.session.content.as_ref(),
                theme: &app.theme,
            };
            frame.render_widget(list, centered_rect(60, 50, layout.body));
        }
    }

    let mut footer_lines: Vec<Line> = Vec::new();
    if let Some(notice) = footer_notice {
        footer_lines.push(Line::from(Span::styled(
            format!("  {notice}"),
            Style::default().fg(colors.warning()),
        )));
    }
    footer_lines.extend(hint_lines.into_iter().map(|l| {
        Line::from(Span::styled(l, Style::default().fg(colors.accent())))
    }));
    frame.render_widget(Paragraph::new(footer_lines), layout.footer);
}

fn footer_hints(app: &App) -> Vec<&'static str> {
    match app.screen {
        AppScreen::Search if app.session.is_loading() => vec!["[Esc] Quit"],
        AppScreen::Search => vec![
            "[Enter] Generate",
            "[Tab] Level",
            "[Up/Down] Recent",
            "[Ctrl+T] Theme",
            "[Esc] Back/Quit",
        ],
        AppScreen::Content if app.section == Section::Quiz => {
            if app.session.quiz.submitted {
                vec!["[r] Try again", "[Tab] Section", "[n] New", "[h] Recent", "[q] Quit"]
            } else {
                vec![
                    "[j/k] Question",
                    "[1-9] Answer",
                    "[Enter] Submit",
                    "[Tab] Section",
                    "[n] New",
                    "[q] Quit",
                ]
            }
        }
        AppScreen::Content => vec![
            "[Tab] Section",
            "[j/k] Scroll",
            "[n] New",
            "[h] Recent",
            "[Ctrl+T] Theme",
            "[q] Quit",
        ],
        AppScreen::History => vec!["[j/k] Select", "[Enter] Open", "[n] New", "[Esc] Back"],
    }
}
