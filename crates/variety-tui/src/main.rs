mod app;
mod render;
mod theme;

#[cfg(test)]
mod tests;

use app::App;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{info, warn, LevelFilter};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use variety_core::{Puzzle, PuzzleConfig, PuzzleId, Seeds, DEFAULT_RULE_SEED};

#[derive(Parser)]
#[command(name = "variety", version, about = "Procedural multi-component puzzle in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Instance seed (random when omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Rule seed: flavor order, maze walls and LED tables
    #[arg(long, global = true, default_value_t = DEFAULT_RULE_SEED)]
    rule_seed: u64,

    /// Puzzle id shown in logs
    #[arg(long, global = true, default_value_t = 1)]
    id: u32,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Named config preset (default, compact, crowded)
    #[arg(long, global = true)]
    preset: Option<String>,

    /// Write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Play interactively (default)
    Play,
    /// Print the generated puzzle and its solution
    Show {
        /// Dump the puzzle summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate puzzles from consecutive seeds and verify them
    Check {
        /// Number of puzzles to generate
        #[arg(long, default_value_t = 100)]
        runs: u64,
    },
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.as_ref().unwrap_or(&Command::Play);
    init_logging(cli.log_file.as_deref(), matches!(command, Command::Play))?;

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };
    let seeds = match cli.seed {
        Some(seed) => Seeds::new(cli.rule_seed, seed),
        None => Seeds::with_random_instance(cli.rule_seed),
    };

    match command {
        Command::Play => play(config, seeds, PuzzleId(cli.id)),
        Command::Show { json } => show(&config, seeds, PuzzleId(cli.id), *json),
        Command::Check { runs } => check(&config, cli.rule_seed, cli.seed.unwrap_or(0), *runs, PuzzleId(cli.id)),
    }
}

/// Interactive play logs only to a file; other commands log to stderr
fn init_logging(log_file: Option<&Path>, interactive: bool) -> io::Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None if interactive => {
            builder.filter_level(LevelFilter::Off);
        }
        None => {
            builder.target(env_logger::Target::Stderr);
        }
    }
    builder.try_init().map_err(io::Error::other)
}

fn load_config(cli: &Cli) -> Result<PuzzleConfig, String> {
    if let Some(path) = &cli.config {
        return PuzzleConfig::from_path(path).map_err(|e| e.to_string());
    }
    if let Some(name) = &cli.preset {
        return PuzzleConfig::preset(name).ok_or_else(|| format!("Unknown preset '{}'", name));
    }
    let default_path = dirs::config_dir().map(|dir| dir.join("variety").join("config.json"));
    match default_path {
        Some(path) if path.exists() => {
            info!("Loading config from {}", path.display());
            PuzzleConfig::from_path(&path).map_err(|e| e.to_string())
        }
        _ => Ok(PuzzleConfig::default()),
    }
}

fn play(config: PuzzleConfig, seeds: Seeds, id: PuzzleId) -> io::Result<()> {
    // Generate before touching the terminal so failures print normally
    let mut app = match App::new(config, seeds, id) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let result = run_app(&mut stdout, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;

    result
}

fn run_app(stdout: &mut io::Stdout, app: &mut App) -> io::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        let tick_rate = app.get_tick_rate();

        render::render(stdout, app)?;
        stdout.flush()?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout.min(Duration::from_millis(33)))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                // Handle Ctrl+C
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break;
                }

                match app.handle_key(key) {
                    app::AppAction::Continue => {}
                    app::AppAction::Quit => break,
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}

fn show(config: &PuzzleConfig, seeds: Seeds, id: PuzzleId, json: bool) -> io::Result<()> {
    let puzzle = match Puzzle::generate(id, config, seeds) {
        Ok(puzzle) => puzzle,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut out = io::stdout().lock();
    if json {
        let text = serde_json::to_string_pretty(&puzzle.summary()).map_err(io::Error::other)?;
        writeln!(out, "{}", text)?;
        return Ok(());
    }

    writeln!(
        out,
        "Puzzle #{} (rule seed {}, instance seed {})",
        puzzle.id(),
        seeds.rule_seed,
        seeds.instance_seed
    )?;
    writeln!(out)?;
    for line in render::text_map(&puzzle) {
        writeln!(out, "{}", line)?;
    }
    writeln!(out)?;
    for line in render::segment_text(&puzzle.digit_strip()) {
        writeln!(out, "{}", line)?;
    }
    writeln!(
        out,
        "Serial {} ({} attempts, {} trials)",
        puzzle.serial(),
        puzzle.attempts(),
        puzzle.trials().len()
    )?;
    writeln!(out)?;

    writeln!(out, "Flavor order:")?;
    let flavors: Vec<String> = puzzle.flavor_order().as_slice().iter().map(|f| f.to_string()).collect();
    writeln!(out, "  {}", flavors.join(", "))?;
    writeln!(out)?;

    writeln!(out, "Solution:")?;
    for (i, (step, instance)) in puzzle.expected_actions().iter().zip(puzzle.components()).enumerate() {
        let anchor = puzzle.grid().label(instance.footprint().anchor());
        writeln!(out, "{:>3}. [{}] {}", i + 1, anchor, step)?;
    }
    Ok(())
}

fn check(config: &PuzzleConfig, rule_seed: u64, first_seed: u64, runs: u64, id: PuzzleId) -> io::Result<()> {
    let mut generated = 0u64;
    let mut generation_failures = 0u64;
    let mut round_trip_failures = 0u64;
    let mut overlap_failures = 0u64;
    let mut attempts = 0usize;
    let mut max_digits = 0u32;

    for run in 0..runs {
        let seeds = Seeds::new(rule_seed, first_seed.wrapping_add(run));
        let puzzle = match Puzzle::generate(id, config, seeds) {
            Ok(puzzle) => puzzle,
            Err(e) => {
                warn!("Instance seed {}: {}", seeds.instance_seed, e);
                generation_failures += 1;
                continue;
            }
        };
        generated += 1;
        attempts += puzzle.attempts();
        max_digits = max_digits.max(puzzle.serial().digit_count());
        if let Err(e) = puzzle.verify_round_trip() {
            warn!("Instance seed {}: {}", seeds.instance_seed, e);
            round_trip_failures += 1;
        }
        if !puzzle.footprints_disjoint() {
            warn!("Instance seed {}: overlapping footprints", seeds.instance_seed);
            overlap_failures += 1;
        }
    }

    let mean_attempts = if generated > 0 {
        attempts as f64 / generated as f64
    } else {
        0.0
    };
    println!("Checked {} puzzles (rule seed {})", runs, rule_seed);
    println!("  generated:           {}", generated);
    println!("  generation failures: {}", generation_failures);
    println!("  round-trip failures: {}", round_trip_failures);
    println!("  overlap failures:    {}", overlap_failures);
    println!("  mean attempts:       {:.2}", mean_attempts);
    println!("  longest serial:      {} digits", max_digits);

    if generation_failures + round_trip_failures + overlap_failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
