mod app;
mod cli;
mod config;
mod datasources;
mod error;
mod i18n;
mod logic;
mod models;
mod ui;

use app::{App, Screen};
use chrono::{Datelike, NaiveDate, Utc};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use datasources::FeedSource;
use error::{Result, VanillaOpsError};
use i18n::Locale;
use logic::charts::{self, ChartMetric, ChartSeries};
use logic::{history, target_bands, DataSyncService, HistoryQuery, LocationFilter, PolicyEngine};
use models::{ProbeSlot, Zone};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use ui::screens::{DashboardScreen, ProbesScreen, TrendsScreen};

const MIN_REFRESH_SECS: u64 = 10;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let data_dir = Config::data_dir(cli.data_dir.as_ref())?;

    // The dashboard owns the terminal, so its logs go to a file.
    let log_file = cli.command.is_none().then(|| Config::log_path(&data_dir));
    init_logging(cli.verbose, log_file.as_deref());

    let config = match Config::load(cli.config.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("See config/config.yaml.example for the expected layout");
            std::process::exit(1);
        }
    };

    let engine = match config.engine() {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let locale = resolve_locale(cli.lang.as_deref(), &data_dir, &config);

    let result = match cli.command {
        Some(Commands::Status { location, json }) => {
            run_status(&config, &engine, locale, &location, json).await
        }
        Some(Commands::Policy { month }) => run_policy(&engine, locale, month),
        Some(Commands::Chart {
            metric,
            location,
            probe,
            output,
        }) => {
            run_chart(
                &config,
                &engine,
                locale,
                &metric,
                location.as_deref(),
                probe.as_deref(),
                output,
            )
            .await
        }
        Some(Commands::Table { from, to, location }) => {
            run_table(&config, &engine, locale, from, to, &location).await
        }
        Some(Commands::Check) => run_check(&config, &engine).await,
        None => run_dashboard(config, engine, locale, data_dir).await,
    };

    if let Err(e) = result {
        eprintln!("{}", describe_error(locale, &e));
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: u8, log_file: Option<&Path>) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file = log_file.and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    match file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init(),
    }
}

/// `--lang`, then the saved choice, then the config file.
fn resolve_locale(flag: Option<&str>, data_dir: &Path, config: &Config) -> Locale {
    if let Some(code) = flag {
        match Locale::from_str(code) {
            Some(locale) => return locale,
            None => tracing::warn!("Unknown language '{}', ignoring --lang", code),
        }
    }
    i18n::load_saved_locale(data_dir).unwrap_or_else(|| config.locale())
}

fn describe_error(locale: Locale, e: &VanillaOpsError) -> String {
    let title = i18n::translate(locale, "error_title");
    match e {
        VanillaOpsError::InvalidDateRange(detail) => format!(
            "{}: {} ({})",
            title,
            i18n::translate(locale, "history_range"),
            detail
        ),
        _ => format!("{}: {}", title, e),
    }
}

fn feed_client(config: &Config) -> DataSyncService {
    DataSyncService::new(FeedSource::parse(&config.feed.source))
}

fn parse_zone(location: &str) -> Result<Zone> {
    Zone::from_str(location).ok_or_else(|| {
        VanillaOpsError::InvalidData(format!(
            "unknown location '{}', expected greenhouse or outdoor",
            location
        ))
    })
}

async fn run_status(
    config: &Config,
    engine: &PolicyEngine,
    locale: Locale,
    location: &str,
    json: bool,
) -> Result<()> {
    let zone = parse_zone(location)?;
    let sync = feed_client(config);
    let latest = sync.client().fetch_latest().await?;

    let reading = latest.reading(zone).ok_or_else(|| {
        VanillaOpsError::NotFound(format!("{} reading in {}", zone, sync.client().source()))
    })?;
    let classification = engine.evaluate(&reading, Utc::now());

    if json {
        println!("{}", serde_json::to_string_pretty(&classification)?);
    } else {
        print!("{}", ui::report::status_report(locale, zone, &classification));
    }
    Ok(())
}

fn run_policy(engine: &PolicyEngine, locale: Locale, month: Option<u32>) -> Result<()> {
    let now = Utc::now();
    let clock = engine.clock();
    let month = match month {
        Some(m) => m,
        None => clock.month_at(now).number_from_month(),
    };

    let policy = engine.catalog().resolve_number(month)?;
    let sun = clock.sun.window_for_number(month)?;
    let phase = engine.phase_at(now);

    let local = clock.local_time(now);
    println!(
        "{} {} ({})",
        clock.location_name,
        local.format("%Y-%m-%d %H:%M"),
        i18n::translate(locale, &format!("phase_{}", phase.as_str()))
    );
    print!(
        "{}",
        ui::report::policy_report(locale, policy, month, sun, Some(phase))
    );
    Ok(())
}

async fn run_chart(
    config: &Config,
    engine: &PolicyEngine,
    locale: Locale,
    metric: &str,
    location: Option<&str>,
    probe: Option<&str>,
    output: Option<PathBuf>,
) -> Result<()> {
    let metric = ChartMetric::from_str(metric)
        .ok_or_else(|| VanillaOpsError::InvalidData(format!("unknown metric '{}'", metric)))?;
    let client = feed_client(config);
    let client = client.client();

    let mut series = Vec::new();
    let mut show_band = true;

    if metric.is_probe() {
        let slots = match probe {
            Some(p) => vec![ProbeSlot::from_str(p).ok_or_else(|| {
                VanillaOpsError::InvalidData(format!("unknown probe '{}'", p))
            })?],
            None => ProbeSlot::ALL.to_vec(),
        };
        let rows = client.fetch_probe_history().await?;
        for slot in slots {
            series.push(ChartSeries {
                label: i18n::translate(locale, &format!("device_{}", slot.as_str())),
                points: charts::probe_series(&rows, slot, metric),
            });
        }
    } else {
        let zones = match location {
            Some(l) => vec![parse_zone(l)?],
            None => vec![Zone::Greenhouse, Zone::Outdoor],
        };
        show_band = zones.contains(&Zone::Greenhouse);
        for zone in zones {
            let rows = client.fetch_climate_history(zone).await?;
            series.push(ChartSeries {
                label: i18n::translate(locale, zone.as_str()),
                points: charts::climate_series(&rows, zone, metric),
            });
        }
    }

    if series.iter().all(|s| s.points.is_empty()) {
        return Err(VanillaOpsError::NotFound(i18n::translate(locale, "history_empty")));
    }

    let now = Utc::now();
    let band = show_band
        .then(|| metric.band(&target_bands(engine.policy_at(now), engine.phase_at(now))));
    let title = format!(
        "{} · {}",
        i18n::translate(locale, metric.label_key()),
        i18n::translate(locale, "trends_title")
    );
    let svg = charts::render_svg(&title, metric, &series, band);

    match output {
        Some(path) => {
            std::fs::write(&path, svg)?;
            tracing::info!("Wrote {} chart to {}", metric, path.display());
            println!("{}", path.display());
        }
        None => print!("{}", svg),
    }
    Ok(())
}

async fn run_table(
    config: &Config,
    engine: &PolicyEngine,
    locale: Locale,
    from: NaiveDate,
    to: NaiveDate,
    location: &str,
) -> Result<()> {
    let filter = LocationFilter::from_str(location).ok_or_else(|| {
        VanillaOpsError::InvalidData(format!(
            "unknown location '{}', expected greenhouse, outdoor or both",
            location
        ))
    })?;
    let query = HistoryQuery::new(from, to, filter)?;

    let sync = feed_client(config);
    let rows = sync.client().fetch_stats().await?;
    let selected = match query.apply(&rows) {
        Ok(selected) => selected,
        Err(VanillaOpsError::NotFound(detail)) => {
            tracing::debug!("{}", detail);
            return Err(VanillaOpsError::NotFound(i18n::translate(
                locale,
                "history_empty",
            )));
        }
        Err(e) => return Err(e),
    };

    let latest = history::evaluate_latest(&selected, engine, Utc::now());
    print!(
        "{}",
        ui::report::table_report(locale, &selected, latest.as_ref())
    );
    Ok(())
}

async fn run_check(config: &Config, engine: &PolicyEngine) -> Result<()> {
    let clock = engine.clock();
    let now = Utc::now();
    println!("Site:     {}", config.site.name);
    println!("Feed:     {}", FeedSource::parse(&config.feed.source));
    println!(
        "Location: {} (UTC{:+} min now, EU summer time {})",
        clock.location_name,
        clock.offset_minutes_at(now),
        if clock.eu_summer_time { "on" } else { "off" }
    );
    let names: Vec<&str> = engine
        .catalog()
        .policies()
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    println!("Policies: {}", names.join(", "));
    println!(
        "Active:   {} ({}, month {})",
        engine.policy_at(now).name,
        engine.phase_at(now),
        clock.local_time(now).month()
    );

    let status = feed_client(config).check_connections().await;
    println!("{}", status.summary());
    if !status.latest {
        return Err(VanillaOpsError::DataSourceUnavailable(
            "latest_results.json is not reachable".into(),
        ));
    }
    Ok(())
}

async fn run_dashboard(
    config: Config,
    engine: PolicyEngine,
    locale: Locale,
    data_dir: PathBuf,
) -> Result<()> {
    let refresh_secs = config.feed.refresh_secs.max(MIN_REFRESH_SECS);
    let mut app = App::new(engine, locale, config.site.name.clone(), data_dir)
        .with_refresh_interval(Duration::from_secs(refresh_secs));
    let data_sync = feed_client(&config);

    // Try to fetch initial data
    match data_sync.refresh().await {
        Ok(feed) => {
            app.update_feed(feed);
            let status = data_sync.check_connections().await;
            app.set_status(&status.summary());
        }
        Err(e) => {
            tracing::warn!("Initial feed fetch failed: {}", e);
            app.last_refresh = Some(Instant::now());
            app.set_error(&describe_error(app.locale, &e));
        }
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &data_sync).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    data_sync: &DataSyncService,
) -> Result<()> {
    loop {
        terminal.draw(|f| {
            let area = f.area();

            match app.screen {
                Screen::Dashboard => {
                    let screen =
                        DashboardScreen::new(&app.site_name, app.locale, app.active_policy())
                            .with_classifications(app.greenhouse.as_ref(), app.outdoor.as_ref())
                            .fetched_at(app.feed.fetched_at)
                            .with_status(app.status_message.as_deref(), app.status_is_error);
                    f.render_widget(screen, area);
                }
                Screen::Probes => {
                    let screen = ProbesScreen::new(app.locale)
                        .with_probes(app.feed.latest.miflora.as_ref())
                        .with_classification(app.greenhouse.as_ref());
                    f.render_widget(screen, area);
                }
                Screen::Trends => {
                    let screen =
                        TrendsScreen::new(app.locale, app.trends_state.metric(), &app.feed)
                            .with_bands(app.greenhouse.as_ref().map(|c| &c.bands));
                    f.render_widget(screen, area);
                }
            }
        })?;

        // Handle input with timeout for async operations
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                handle_key(app, key.code, key.modifiers);
            }
        }

        if !app.needs_refresh && !app.refreshing && app.refresh_due(Instant::now()) {
            app.needs_refresh = true;
        }

        if app.needs_refresh {
            app.needs_refresh = false;
            app.refreshing = true;
            match data_sync.refresh().await {
                Ok(feed) => {
                    app.update_feed(feed);
                    app.clear_status();
                }
                Err(e) => {
                    tracing::warn!("Feed refresh failed: {}", e);
                    app.last_refresh = Some(Instant::now());
                    app.set_error(&describe_error(app.locale, &e));
                }
            }
            app.refreshing = false;
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => app.quit(),
        KeyCode::Esc => app.switch_screen(Screen::Dashboard),
        KeyCode::Char('l') | KeyCode::Char('L') => app.toggle_locale(),
        KeyCode::Char('r') => app.request_refresh(),
        KeyCode::Left if app.screen == Screen::Trends => app.trends_state.prev(),
        KeyCode::Right if app.screen == Screen::Trends => app.trends_state.next(),
        KeyCode::Char(c) => {
            if let Some(screen) = Screen::from_key(c) {
                app.switch_screen(screen);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        let dir = std::env::temp_dir().join(format!("vanillaops-main-{}", std::process::id()));
        App::new(PolicyEngine::builtin(), Locale::En, "Test".into(), dir)
    }

    #[test]
    fn keys_drive_app_state() {
        let mut app = test_app();
        handle_key(&mut app, KeyCode::Char('3'), KeyModifiers::NONE);
        assert_eq!(app.screen, Screen::Trends);

        handle_key(&mut app, KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(app.trends_state.metric(), ChartMetric::Humidity);

        handle_key(&mut app, KeyCode::Char('r'), KeyModifiers::NONE);
        assert!(app.needs_refresh);

        handle_key(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(app.screen, Screen::Dashboard);

        handle_key(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }

    #[test]
    fn arrows_only_cycle_on_trends() {
        let mut app = test_app();
        handle_key(&mut app, KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(app.trends_state.metric(), ChartMetric::Temperature);
    }

    #[test]
    fn lang_flag_wins_over_config() {
        let dir = std::env::temp_dir().join(format!("vanillaops-lang-{}", std::process::id()));
        let config = Config::from_yaml("locale: en\n").unwrap();
        assert_eq!(resolve_locale(Some("pt"), &dir, &config), Locale::Pt);
        assert_eq!(resolve_locale(Some("xx"), &dir, &config), Locale::En);
    }

    #[test]
    fn date_range_errors_are_localized() {
        let e = VanillaOpsError::InvalidDateRange("maximum 2 days per request".into());
        let text = describe_error(Locale::Pt, &e);
        assert!(text.starts_with("Erro: Máximo de 2 dias"));
    }
}
