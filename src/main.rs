mod app;
mod cli;
mod config;
mod dataset;
mod error;
mod logic;
mod models;
mod ui;

use app::{App, Screen};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dataset::{load_dataset, to_json_string, write_csv_file};
use error::{IrriOpsError, Result};
use logic::{build_schedule, validate_schema};
use models::Treatment;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use ui::screens::{ChartScreen, DashboardScreen, ScheduleScreen, SettingsScreen};

fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging; default quiet so the alternate screen stays clean
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Load configuration (built-in defaults when no file exists)
    let config = match Config::load(cli.config.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    match &cli.command {
        Some(Commands::Init) => {
            Config::setup_interactive()?;
            return Ok(());
        }
        Some(Commands::Check { input, treatment }) => {
            if let Err(e) = run_check(&config, input, treatment) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
            return Ok(());
        }
        Some(Commands::Evaluate {
            input,
            treatment,
            output,
            json,
        }) => {
            if let Err(e) = run_evaluate(&config, input, treatment, output.clone(), *json) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
            return Ok(());
        }
        None => {}
    }

    // Startup treatment: CLI flag, then config, then control
    let treatment = match &cli.treatment {
        Some(s) => match parse_treatment(s) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => config
            .default_treatment()
            .ok()
            .flatten()
            .unwrap_or(Treatment::Control),
    };

    // Create app
    let mut app = App::new(config, treatment);
    if let Some(input) = &cli.input {
        app.load_dataset(input);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn parse_treatment(s: &str) -> Result<Treatment> {
    Treatment::from_str(s).ok_or_else(|| IrriOpsError::UnknownTreatment(s.to_string()))
}

fn run_check(config: &Config, input: &Path, treatment: &str) -> Result<()> {
    let treatment = parse_treatment(treatment)?;
    let dataset = load_dataset(input)?;
    validate_schema(&dataset, treatment)?;
    // Dry-run the batch so value-level problems surface too
    build_schedule(&dataset, treatment, &config.thresholds)?;
    println!(
        "OK: {} rows valid for {}",
        dataset.len(),
        treatment.label()
    );
    Ok(())
}

fn run_evaluate(
    config: &Config,
    input: &Path,
    treatment: &str,
    output: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let treatment = parse_treatment(treatment)?;
    let dataset = load_dataset(input)?;
    let schedule = build_schedule(&dataset, treatment, &config.thresholds)?;

    if json {
        println!("{}", to_json_string(&schedule)?);
        return Ok(());
    }

    let path = output
        .unwrap_or_else(|| config.export.directory.join(treatment.schedule_filename()));
    write_csv_file(&dataset, &schedule, &path)?;
    println!(
        "Wrote {} ({} rows, {} irrigation events, {:.1} mm total)",
        path.display(),
        schedule.len(),
        schedule.irrigation_events(),
        schedule.total_irrigation_mm()
    );
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    IrriOpsError: From<<B as ratatui::backend::Backend>::Error>,
{
    loop {
        // Draw UI
        terminal.draw(|f| {
            let area = f.area();

            match app.screen {
                Screen::Dashboard => {
                    f.render_widget(dashboard_screen(app), area);
                }
                Screen::Schedule => match &app.dataset {
                    Some(dataset) => {
                        let screen = ScheduleScreen::new(dataset, app.schedule.as_ref())
                            .with_selection(app.schedule_state.selected_index);
                        f.render_widget(screen, area);
                    }
                    None => f.render_widget(dashboard_screen(app), area),
                },
                Screen::Chart => match &app.dataset {
                    Some(dataset) => {
                        let screen = ChartScreen::new(dataset, app.schedule.as_ref());
                        f.render_widget(screen, area);
                    }
                    None => f.render_widget(dashboard_screen(app), area),
                },
                Screen::Settings => {
                    let screen = SettingsScreen::new(app.treatment, &app.thresholds)
                        .with_focus(app.settings_state.focused_field)
                        .editing(app.settings_state.editing, &app.settings_state.edit_buffer);
                    f.render_widget(screen, area);
                }
            }
        })?;

        // Handle input
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Global key handling
                match key.code {
                    KeyCode::Char('q') if !app.settings_state.editing => {
                        app.quit();
                    }
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        app.quit();
                    }
                    KeyCode::Esc if !app.settings_state.editing => {
                        // Go back to dashboard
                        app.switch_screen(Screen::Dashboard);
                    }
                    KeyCode::Char(c) if !app.settings_state.editing => {
                        if let Some(screen) = Screen::from_key(c) {
                            app.switch_screen(screen);
                        } else {
                            match c {
                                't' => app.cycle_treatment(),
                                'r' => app.request_reload(),
                                'e' => app.export_schedule(),
                                _ => handle_screen_input(app, key.code),
                            }
                        }
                    }
                    _ => {
                        handle_screen_input(app, key.code);
                    }
                }
            }
        }

        // Handle reload request
        if app.needs_reload {
            app.needs_reload = false;
            app.reload();
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn dashboard_screen(app: &App) -> DashboardScreen<'_> {
    DashboardScreen::new(
        app.dataset.as_ref(),
        app.schedule.as_ref(),
        app.treatment,
        &app.thresholds,
    )
    .with_status(app.status_message.as_deref())
}

fn handle_screen_input(app: &mut App, code: KeyCode) {
    match app.screen {
        Screen::Dashboard | Screen::Chart => {}
        Screen::Schedule => handle_schedule_input(app, code),
        Screen::Settings => handle_settings_input(app, code),
    }
}

fn handle_schedule_input(app: &mut App, code: KeyCode) {
    let count = app.schedule.as_ref().map(|s| s.len()).unwrap_or(0);
    match code {
        KeyCode::Up => app.schedule_state.prev(),
        KeyCode::Down => app.schedule_state.next(count),
        _ => {}
    }
}

fn handle_settings_input(app: &mut App, code: KeyCode) {
    if app.settings_state.editing {
        // Editing mode
        match code {
            KeyCode::Esc => {
                app.settings_state.cancel_editing();
            }
            KeyCode::Enter => {
                let value = app.settings_state.finish_editing();
                let field = app.settings_state.focused_field;
                apply_field_value(app, field, &value);
            }
            KeyCode::Backspace => {
                app.settings_state.edit_buffer.pop();
            }
            KeyCode::Char(c) => {
                app.settings_state.edit_buffer.push(c);
            }
            _ => {}
        }
    } else {
        // Navigation mode
        match code {
            KeyCode::Up => app.settings_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => app.settings_state.next_field(),
            KeyCode::Enter => {
                // Start editing
                let current = get_field_value(app, app.settings_state.focused_field);
                app.settings_state.start_editing(&current);
            }
            _ => {}
        }
    }
}

fn get_field_value(app: &App, field: ui::screens::SettingsField) -> String {
    use ui::screens::SettingsField;
    match field {
        SettingsField::Treatment => app.treatment.code().to_string(),
        SettingsField::Kc => format!("{}", app.thresholds.kc),
        SettingsField::FieldCapacity => format!("{}", app.thresholds.field_capacity),
        SettingsField::RainThreshold => format!("{}", app.thresholds.rain_threshold_mm),
        SettingsField::NdviThreshold => format!("{}", app.thresholds.ndvi_threshold),
        SettingsField::Et0Threshold => format!("{}", app.thresholds.et0_threshold_mm),
    }
}

/// Parse and apply an edited settings value. Invalid input leaves the
/// current configuration untouched and reports in the status line.
fn apply_field_value(app: &mut App, field: ui::screens::SettingsField, value: &str) {
    use ui::screens::SettingsField;

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return;
    }

    if field == SettingsField::Treatment {
        match Treatment::from_str(trimmed) {
            Some(t) => {
                app.treatment = t;
                app.schedule_state.selected_index = 0;
                app.rebuild_schedule();
            }
            None => app.set_status(&format!("Unknown treatment '{}'", trimmed)),
        }
        return;
    }

    let parsed: f64 = match trimmed.parse() {
        Ok(v) => v,
        Err(_) => {
            app.set_status(&format!("'{}' is not a number", trimmed));
            return;
        }
    };

    let mut candidate = app.thresholds;
    match field {
        SettingsField::Treatment => return,
        SettingsField::Kc => candidate.kc = parsed,
        SettingsField::FieldCapacity => candidate.field_capacity = parsed,
        SettingsField::RainThreshold => candidate.rain_threshold_mm = parsed,
        SettingsField::NdviThreshold => candidate.ndvi_threshold = parsed,
        SettingsField::Et0Threshold => candidate.et0_threshold_mm = parsed,
    }

    match candidate.validate() {
        Ok(()) => {
            app.thresholds = candidate;
            app.rebuild_schedule();
        }
        Err(e) => app.set_status(&format!("{}", e)),
    }
}
