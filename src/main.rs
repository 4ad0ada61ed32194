use anyhow::{Context as _, Result};
use clap::Parser;
use covid_dash::app::App;
use covid_dash::config::{Config, DEFAULT_CONFIG_FILE};
use covid_dash::ui;
use covid_dash::view::Context;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEvent,
    MouseEventKind,
};
use crossterm::execute;
use log::info;
use ratatui::DefaultTerminal;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Terminal dashboard of confirmed Covid 19 cases
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Dashboard configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Where log output goes (the terminal belongs to the dashboard)
    #[arg(long, default_value = "dash-covid.log")]
    log_file: PathBuf,

    /// Print the incidence statistics for one country and exit
    #[arg(long, value_name = "COUNTRY")]
    print: Option<String>,

    /// Write the normalized table as CSV and exit
    #[arg(long, value_name = "PATH")]
    dump_table: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    let config = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    info!(
        "config loaded: source {}, {} population entries",
        config.url,
        config.population.len()
    );

    // Headless modes
    if args.print.is_some() || args.dump_table.is_some() {
        return run_headless(&config, &args);
    }

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal, config);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

fn init_logging(path: &Path) -> Result<()> {
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run_headless(config: &Config, args: &Args) -> Result<()> {
    let ctx = Context::load(config)?;

    if let Some(path) = &args.dump_table {
        let csv = ctx.table.to_csv()?;
        fs::write(path, csv).with_context(|| format!("writing {}", path.display()))?;
        println!("wrote {} rows to {}", ctx.table.rows().len(), path.display());
    }

    if let Some(country) = &args.print {
        println!("{}", ctx.incidence_text(country));
    }

    Ok(())
}

/// Scroll wheel moves through the country list
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),
        _ => {}
    }
}

/// Draw the loading banner, then fetch
fn reload(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    app.loading = true;
    app.view = None;
    terminal.draw(|frame| ui::render(frame, app))?;
    app.refresh();
    Ok(())
}

fn run(terminal: &mut DefaultTerminal, config: Config) -> Result<()> {
    let mut app = App::new(config);
    reload(terminal, &mut app)?;

    // Main loop
    loop {
        // Draw
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Nothing animates, so only wake up for input
        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                            // Graph mode
                            KeyCode::Char('m') | KeyCode::Char('M') | KeyCode::Tab => {
                                app.toggle_mode();
                            }

                            // Country selection
                            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
                            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
                            KeyCode::PageDown => app.page_down(),
                            KeyCode::PageUp => app.page_up(),
                            KeyCode::Home | KeyCode::Char('g') => app.select_first(),
                            KeyCode::End | KeyCode::Char('G') => app.select_last(),

                            // Window length
                            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => {
                                app.adjust_weeks(1);
                            }
                            KeyCode::Char('-') | KeyCode::Char('_') | KeyCode::Left => {
                                app.adjust_weeks(-1);
                            }

                            // Fetch again
                            KeyCode::Char('r') | KeyCode::Char('R') => {
                                reload(terminal, &mut app)?;
                            }

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
