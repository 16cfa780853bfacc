use crate::app::{Action, Alert, AlertKind, App, Display};
use crate::date;
use crate::github::{Profile, Repo};
use anyhow::Result;
use chrono::Utc;
use clap::ValueEnum;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

const TICK_INTERVAL: Duration = Duration::from_millis(100);
const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Theme {
    Dark,
    Light,
}

pub struct ThemeColors {
    pub text: Color,
    pub border: Color,
    pub primary: Color,
    pub secondary: Color,
    pub success: Color,
    pub info: Color,
    pub warning: Color,
    pub danger: Color,
}

impl Theme {
    pub fn colors(self) -> ThemeColors {
        match self {
            Theme::Dark => ThemeColors {
                text: Color::Rgb(0xc9, 0xd1, 0xd9),
                border: Color::Rgb(0x61, 0x6e, 0x7f),
                primary: Color::Rgb(0xa5, 0xd6, 0xff),
                secondary: Color::Rgb(0x8b, 0x94, 0x9e),
                success: Color::Rgb(0x3f, 0xb9, 0x50),
                info: Color::Rgb(0x39, 0xc5, 0xcf),
                warning: Color::Rgb(0xff, 0xa6, 0x57),
                danger: Color::Rgb(0xf8, 0x51, 0x49),
            },
            Theme::Light => ThemeColors {
                text: Color::Rgb(0x24, 0x29, 0x2f),
                border: Color::Rgb(0x6a, 0x73, 0x7d),
                primary: Color::Rgb(0x03, 0x66, 0xd6),
                secondary: Color::Rgb(0x57, 0x60, 0x6a),
                success: Color::Rgb(0x1a, 0x7f, 0x37),
                info: Color::Rgb(0x1b, 0x7c, 0x83),
                warning: Color::Rgb(0x9a, 0x67, 0x00),
                danger: Color::Rgb(0xd7, 0x3a, 0x49),
            },
        }
    }
}

/// Terminal setup, the main loop, and teardown.
pub async fn run(
    app: &mut App,
    rx: &mut mpsc::UnboundedReceiver<Action>,
    tx: mpsc::UnboundedSender<Action>,
    theme: Theme,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    spawn_input_reader(tx);

    let res = run_loop(&mut terminal, app, rx, theme).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

/// Forwards terminal key events into the action channel. `event::read`
/// blocks, so this lives on its own thread rather than the runtime.
fn spawn_input_reader(tx: mpsc::UnboundedSender<Action>) {
    std::thread::spawn(move || {
        loop {
            match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    if tx.send(Action::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
    });
}

async fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: &mut mpsc::UnboundedReceiver<Action>,
    theme: Theme,
) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app, theme))?;

        if app.should_quit {
            return Ok(());
        }

        tokio::select! {
            action = rx.recv() => match action {
                Some(action) => app.update(action),
                None => return Ok(()),
            },
            _ = tokio::time::sleep(TICK_INTERVAL) => {}
        }

        app.tick(Instant::now());
    }
}

pub fn draw(f: &mut Frame, app: &App, theme: Theme) {
    let colors = theme.colors();

    // The banner region only takes space while an alert is live; the main
    // region gets the rest.
    let constraints = if app.alert.is_some() {
        vec![
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ]
    } else {
        vec![Constraint::Length(3), Constraint::Min(0)]
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    draw_search(f, chunks[0], app, &colors);

    let main = if let Some(alert) = &app.alert {
        draw_alert(f, chunks[1], alert, &colors);
        chunks[2]
    } else {
        chunks[1]
    };

    match &app.display {
        Display::Empty => {}
        Display::Loading => draw_loading(f, main, app.spinner_frame, &colors),
        Display::Profile { profile, repos } => draw_profile(f, main, profile, repos, &colors),
    }
}

fn draw_search(f: &mut Frame, area: Rect, app: &App, colors: &ThemeColors) {
    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(colors.text))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.border))
                .title(" Search GitHub Users "),
        );
    f.render_widget(input, area);
    f.set_cursor_position((area.x + app.input.chars().count() as u16 + 1, area.y + 1));
}

fn draw_alert(f: &mut Frame, area: Rect, alert: &Alert, colors: &ThemeColors) {
    let color = match alert.kind {
        AlertKind::Warning => colors.warning,
        AlertKind::Danger => colors.danger,
    };

    let banner = Paragraph::new(alert.message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
    f.render_widget(banner, area);
}

fn draw_loading(f: &mut Frame, area: Rect, frame: usize, colors: &ThemeColors) {
    if area.height == 0 {
        return;
    }

    let spinner = SPINNER_FRAMES[frame % SPINNER_FRAMES.len()];
    let line = Rect::new(area.x, area.y + area.height / 2, area.width, 1);
    let indicator = Paragraph::new(format!("{spinner} Loading..."))
        .alignment(Alignment::Center)
        .style(Style::default().fg(colors.primary));
    f.render_widget(indicator, line);
}

fn draw_profile(f: &mut Frame, area: Rect, profile: &Profile, repos: &[Repo], colors: &ThemeColors) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(11), Constraint::Min(0)])
        .split(area);

    draw_profile_card(f, chunks[0], profile, colors);
    draw_repo_list(f, chunks[1], repos, colors);
}

fn draw_profile_card(f: &mut Frame, area: Rect, profile: &Profile, colors: &ThemeColors) {
    let badges = Line::from(vec![
        Span::styled(
            format!("Public Repos: {}", profile.public_repos),
            Style::default().fg(colors.primary),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Public Gists: {}", profile.public_gists),
            Style::default().fg(colors.secondary),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Followers: {}", profile.followers),
            Style::default().fg(colors.success),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Following: {}", profile.following),
            Style::default().fg(colors.info),
        ),
    ]);

    let lines = vec![
        Line::from(Span::styled(
            profile.avatar_url.clone(),
            Style::default().fg(colors.secondary),
        )),
        Line::from(Span::styled(
            format!("View Profile → {}", profile.html_url),
            Style::default()
                .fg(colors.primary)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        badges,
        Line::default(),
        field_line("Company", or_na(&profile.company), colors),
        field_line("Website/Blog", or_na(&profile.blog), colors),
        field_line("Location", or_na(&profile.location), colors),
        field_line(
            "Member Since",
            date::member_since(profile.created_at, Utc::now().date_naive()),
            colors,
        ),
    ];

    let card = Paragraph::new(lines)
        .style(Style::default().fg(colors.text))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.border))
                .title(format!(" {} ", profile.login)),
        );
    f.render_widget(card, area);
}

fn draw_repo_list(f: &mut Frame, area: Rect, repos: &[Repo], colors: &ThemeColors) {
    let rows = repos.iter().map(|repo| {
        let name = Line::from(vec![
            Span::styled(
                repo.name.clone(),
                Style::default()
                    .fg(colors.primary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(repo.html_url.clone(), Style::default().fg(colors.secondary)),
        ]);
        let counts = Line::from(vec![
            Span::styled(
                format!("Stars: {}", repo.stargazers_count),
                Style::default().fg(colors.primary),
            ),
            Span::raw("  "),
            Span::styled(
                format!("Watchers: {}", repo.watchers_count),
                Style::default().fg(colors.secondary),
            ),
            Span::raw("  "),
            Span::styled(
                format!("Forks: {}", repo.forks_count),
                Style::default().fg(colors.success),
            ),
        ])
        .right_aligned();

        Row::new(vec![Cell::from(name), Cell::from(counts)]).height(1)
    });

    let table = Table::new(
        rows,
        [Constraint::Percentage(50), Constraint::Percentage(50)],
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.border))
            .title(" Latest Repos "),
    );
    f.render_widget(table, area);
}

fn field_line(label: &str, value: String, colors: &ThemeColors) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(colors.text)),
        Span::styled(value, Style::default().fg(colors.secondary)),
    ])
}

fn or_na(value: &Option<String>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.clone(),
        _ => "N/A".to_string(),
    }
}
