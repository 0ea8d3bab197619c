//! Pheme Dashboard - Feedback Monitoring
//!
//! Polls a running Pheme server and displays:
//! - Aggregate statistics (total, average rating, positive, negative)
//! - All feedback records, newest first, optionally sorted by rating
//!
//! Usage:
//!   pheme-dash [OPTIONS]
//!
//! Examples:
//!   pheme-dash                          # Connect to localhost:5000
//!   pheme-dash --api http://localhost:5000
//!   pheme-dash --refresh 1000           # Faster refresh (ms)

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pheme_core::types::{FeedbackRecord, FeedbackStats};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Terminal,
};
use reqwest::Client;
use std::{io, time::Duration};
use tokio::time::interval;
use tracing::{debug, error, Level};
use tracing_subscriber::EnvFilter;

/// Dashboard CLI arguments
#[derive(Parser)]
#[command(name = "pheme-dash")]
#[command(about = "Feedback monitoring dashboard for Pheme")]
#[command(version)]
struct Args {
    /// API server URL
    #[arg(long, default_value = "http://localhost:5000")]
    api: String,

    /// Refresh interval in milliseconds
    #[arg(long, default_value = "5000")]
    refresh: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// How the feedback table is ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortMode {
    /// Creation time, newest first (the server's order)
    Date,
    /// Rating, highest first
    RatingDesc,
    /// Rating, lowest first
    RatingAsc,
}

/// Application state
struct App {
    /// Latest record snapshot from the server
    records: Vec<FeedbackRecord>,
    /// Latest statistics snapshot
    stats: FeedbackStats,
    /// Table ordering
    sort: SortMode,
    /// Connection status
    connected: bool,
    /// API base URL
    api_url: String,
}

impl App {
    fn new(api_url: String) -> Self {
        Self {
            records: Vec::new(),
            stats: FeedbackStats::empty(),
            sort: SortMode::Date,
            connected: false,
            api_url,
        }
    }

    async fn update_state(&mut self, client: &Client) {
        // Fetch records
        match client
            .get(format!("{}/api/feedback", self.api_url))
            .send()
            .await
        {
            Ok(response) => {
                if let Ok(records) = response.json::<Vec<FeedbackRecord>>().await {
                    self.records = records;
                    self.connected = true;
                }
            }
            Err(e) => {
                debug!("Failed to fetch feedback: {}", e);
                self.connected = false;
                return;
            }
        }

        // Fetch statistics
        match client
            .get(format!("{}/api/stats", self.api_url))
            .send()
            .await
        {
            Ok(response) => {
                if let Ok(stats) = response.json::<FeedbackStats>().await {
                    self.stats = stats;
                }
            }
            Err(e) => {
                debug!("Failed to fetch stats: {}", e);
            }
        }
    }

    /// Records in display order
    ///
    /// The stable sort keeps newest-first order within equal ratings.
    fn sorted_records(&self) -> Vec<&FeedbackRecord> {
        let mut records: Vec<&FeedbackRecord> = self.records.iter().collect();
        match self.sort {
            SortMode::Date => {}
            SortMode::RatingDesc => records.sort_by_key(|r| std::cmp::Reverse(r.rating)),
            SortMode::RatingAsc => records.sort_by_key(|r| r.rating),
        }
        records
    }

    /// Handle keyboard input; returns true to quit
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            // First press sorts highest-first, repeat presses flip the order
            KeyCode::Char('r') => {
                self.sort = match self.sort {
                    SortMode::RatingDesc => SortMode::RatingAsc,
                    _ => SortMode::RatingDesc,
                };
            }
            KeyCode::Char('d') => self.sort = SortMode::Date,
            _ => {}
        }
        false
    }
}

fn stars(rating: i64) -> String {
    let filled = rating.clamp(0, 5) as usize;
    format!("{}{} ({})", "★".repeat(filled), "☆".repeat(5 - filled), rating)
}

/// Render one statistics card
fn stat_card(title: &str, value: String, color: Color) -> Paragraph<'_> {
    Paragraph::new(value)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .centered()
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging (to file, not stderr - the terminal belongs to the TUI)
    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::new(format!("pheme_dash={}", level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(|| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open("/tmp/pheme-dash.log")
                .unwrap()
        })
        .init();

    debug!("Dashboard v{} starting...", env!("CARGO_PKG_VERSION"));
    debug!("API URL: {}", args.api);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(args.api.clone());
    let client = Client::new();

    // Refresh interval
    let mut tick = interval(Duration::from_millis(args.refresh));

    let result = run_app(&mut terminal, &mut app, &client, &mut tick).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!("Error: {:?}", err);
        return Err(err);
    }

    debug!("Dashboard exiting cleanly");
    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    client: &Client,
    tick: &mut tokio::time::Interval,
) -> Result<()> {
    // Force an initial refresh so data is visible before the first tick
    app.update_state(client).await;

    loop {
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3), // Header
                    Constraint::Length(4), // Stat cards
                    Constraint::Min(5),    // Feedback table
                    Constraint::Length(1), // Footer
                ])
                .split(f.area());

            // Header
            let title = if app.connected {
                "Pheme Dashboard [Connected]"
            } else {
                "Pheme Dashboard [Disconnected]"
            };
            let header = Paragraph::new(title)
                .style(Style::default().fg(if app.connected {
                    Color::Green
                } else {
                    Color::Red
                }))
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(header, chunks[0]);

            // Stat cards
            let card_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(25),
                    Constraint::Percentage(25),
                    Constraint::Percentage(25),
                    Constraint::Percentage(25),
                ])
                .split(chunks[1]);

            f.render_widget(
                stat_card("Total Feedback", app.stats.total.to_string(), Color::Cyan),
                card_chunks[0],
            );
            f.render_widget(
                stat_card(
                    "Average Rating",
                    format!("{:.1}", app.stats.avg_rating),
                    Color::Yellow,
                ),
                card_chunks[1],
            );
            f.render_widget(
                stat_card("Positive (4+)", app.stats.positive.to_string(), Color::Green),
                card_chunks[2],
            );
            f.render_widget(
                stat_card("Negative (<3)", app.stats.negative.to_string(), Color::Red),
                card_chunks[3],
            );

            // Feedback table
            let sort_label = match app.sort {
                SortMode::Date => "by date",
                SortMode::RatingDesc => "by rating, highest first",
                SortMode::RatingAsc => "by rating, lowest first",
            };

            if app.records.is_empty() {
                let empty = Paragraph::new("No feedback yet. Submit some feedback to see it here!")
                    .style(Style::default().fg(Color::Gray))
                    .block(Block::default().borders(Borders::ALL).title("All Feedback"));
                f.render_widget(empty, chunks[2]);
            } else {
                let header_row = Row::new(["Name", "Email", "Rating", "Message", "Created At"])
                    .style(Style::default().add_modifier(Modifier::BOLD));

                let rows: Vec<Row> = app
                    .sorted_records()
                    .into_iter()
                    .map(|record| {
                        Row::new(vec![
                            Cell::from(record.name.clone()),
                            Cell::from(record.email.clone()),
                            Cell::from(stars(record.rating)),
                            Cell::from(record.message.clone()),
                            Cell::from(record.created_at.format("%b %d, %Y %H:%M").to_string()),
                        ])
                    })
                    .collect();

                let table = Table::new(
                    rows,
                    [
                        Constraint::Length(16),
                        Constraint::Length(24),
                        Constraint::Length(12),
                        Constraint::Min(20),
                        Constraint::Length(18),
                    ],
                )
                .header(header_row)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!("All Feedback ({})", sort_label)),
                );
                f.render_widget(table, chunks[2]);
            }

            // Footer with keyboard shortcuts
            let footer_text = if app.connected {
                "Press 'r' to sort by rating | 'd' for date order | 'q' to quit"
            } else {
                "Disconnected - check API server | Press 'q' to quit"
            };
            let footer = Paragraph::new(footer_text).style(Style::default().fg(Color::Gray));
            f.render_widget(footer, chunks[3]);
        })?;

        // Handle input with keyboard shortcuts
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if app.handle_key(key.code) {
                    return Ok(());
                }
            }
        }

        // Refresh data on tick, but keep the input loop responsive between ticks
        tokio::select! {
            _ = tick.tick() => {
                app.update_state(client).await;
            }
            _ = tokio::time::sleep(Duration::from_millis(100)) => {}
        }
    }
}
