use bac_core::format::{format_bac, format_duration};
use bac_core::*;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::SystemTime;

#[derive(Parser)]
#[command(name = "bactrack")]
#[command(about = "Personal blood alcohol content estimator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Save your gender and weight (required before any estimate)
    Setup {
        /// male or female
        #[arg(long)]
        gender: String,

        /// Body weight in pounds
        #[arg(long, allow_hyphen_values = true)]
        weight: String,
    },

    /// Log a drink (one standard beer by default)
    Add {
        /// Preset id, see `bactrack presets`
        #[arg(long, conflicts_with_all = ["oz", "custom"])]
        preset: Option<String>,

        /// Volume in fluid ounces
        #[arg(long, requires = "abv", conflicts_with = "custom", allow_hyphen_values = true)]
        oz: Option<f64>,

        /// Alcohol by volume, percent
        #[arg(long, requires = "oz", allow_hyphen_values = true)]
        abv: Option<f64>,

        /// Saved custom drink name
        #[arg(long)]
        custom: Option<String>,

        /// Display name for a volume/ABV drink
        #[arg(long)]
        name: Option<String>,

        /// When the drink was consumed (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Remove the most recently logged drink
    Undo,

    /// Remove a drink by id
    Remove { id: uuid::Uuid },

    /// Clear all drinks and start over
    Clear,

    /// List logged drinks
    Drinks,

    /// Show the current estimated BAC (default)
    Status {
        /// Evaluate at this instant (RFC 3339) instead of now
        #[arg(long)]
        at: Option<DateTime<Utc>>,

        /// Assume a slow metabolism for this evaluation
        #[arg(long)]
        slow: bool,
    },

    /// One-shot estimate from total drinks and hours since the first one
    Estimate {
        #[arg(long)]
        drinks: f64,

        #[arg(long)]
        hours: f64,

        /// Assume a slow metabolism
        #[arg(long)]
        slow: bool,
    },

    /// How many standard drinks reach a target BAC over a drinking window
    Target {
        /// light (0.03), moderate (0.06), strong (0.09), or a BAC value
        level: String,

        /// Length of the drinking window in hours
        #[arg(long)]
        hours: f64,

        /// Assume a slow metabolism
        #[arg(long)]
        slow: bool,
    },

    /// Keep recomputing the live BAC and print each change
    Watch {
        /// Exit after this many readings
        #[arg(long)]
        count: Option<usize>,

        /// Assume a slow metabolism
        #[arg(long)]
        slow: bool,
    },

    /// List built-in drink presets
    Presets,

    /// Manage saved custom drinks
    Custom {
        #[command(subcommand)]
        action: CustomAction,
    },
}

#[derive(Subcommand)]
enum CustomAction {
    /// Save a custom drink for reuse
    Save {
        #[arg(long)]
        name: String,

        #[arg(long, allow_hyphen_values = true)]
        oz: f64,

        #[arg(long, allow_hyphen_values = true)]
        abv: f64,
    },

    /// List saved custom drinks
    List,

    /// Delete a saved custom drink
    Delete { name: String },
}

fn main() {
    bac_core::logging::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let state_path = data_dir.join("state.json");

    match cli.command {
        Some(Commands::Setup { gender, weight }) => cmd_setup(&state_path, &gender, &weight),
        Some(Commands::Add {
            preset,
            oz,
            abv,
            custom,
            name,
            at,
        }) => cmd_add(&state_path, &config, preset, oz.zip(abv), custom, name, at),
        Some(Commands::Undo) => cmd_undo(&state_path),
        Some(Commands::Remove { id }) => cmd_remove(&state_path, id),
        Some(Commands::Clear) => cmd_clear(&state_path),
        Some(Commands::Drinks) => cmd_drinks(&state_path),
        Some(Commands::Status { at, slow }) => cmd_status(&state_path, at, slow),
        Some(Commands::Estimate {
            drinks,
            hours,
            slow,
        }) => cmd_estimate(&state_path, drinks, hours, slow),
        Some(Commands::Target { level, hours, slow }) => cmd_target(&state_path, &level, hours, slow),
        Some(Commands::Watch { count, slow }) => cmd_watch(&state_path, &config, count, slow),
        Some(Commands::Presets) => cmd_presets(),
        Some(Commands::Custom { action }) => cmd_custom(&state_path, action),
        None => cmd_status(&state_path, None, false),
    }
}

fn cmd_setup(state_path: &Path, gender: &str, weight: &str) -> Result<()> {
    let profile = validate::validate_profile_input(Some(gender), weight)?;

    AppState::update(state_path, |state| {
        state.profile = Some(profile.clone());
        Ok(())
    })?;

    println!(
        "✓ Profile saved: {:?}, {} lbs",
        profile.gender, profile.weight_lbs
    );
    Ok(())
}

fn cmd_add(
    state_path: &Path,
    config: &Config,
    preset: Option<String>,
    volume: Option<(f64, f64)>,
    custom: Option<String>,
    name: Option<String>,
    at: Option<DateTime<Utc>>,
) -> Result<()> {
    let at = at.unwrap_or_else(Utc::now);

    let drink = AppState::update(state_path, |state| {
        let drink = if let Some(key) = preset {
            find_preset(&key)
                .ok_or_else(|| Error::Other(format!("Unknown preset: {}", key)))?
                .to_event(at)
        } else if let Some((oz, abv)) = volume {
            validate_drink_input(oz, abv)?;
            DrinkEvent::from_volume(name.unwrap_or_else(|| "Custom Drink".into()), oz, abv, at)
        } else if let Some(custom_name) = custom {
            let saved = state
                .find_custom_drink(&custom_name)
                .ok_or_else(|| Error::Other(format!("No saved drink named {}", custom_name)))?;
            DrinkEvent::from_volume(saved.name.clone(), saved.volume_oz, saved.abv_percent, at)
        } else {
            find_preset(catalog::DEFAULT_PRESET_ID)
                .map(|p| p.to_event(at))
                .unwrap_or_else(|| DrinkEvent::standard(at))
        };

        if state.session.drinks.is_empty() {
            state.session.metabolism = config.metabolism.preset();
        }
        state.session.switch_mode(TrackingMode::Live);
        state.session.log_drink(drink.clone());
        Ok(drink)
    })?;

    println!(
        "✓ Logged {} ({:.1} standard drinks)",
        drink.name, drink.standard_drinks
    );
    println!("  id: {}", drink.id);
    Ok(())
}

fn cmd_undo(state_path: &Path) -> Result<()> {
    let removed = AppState::update(state_path, |state| Ok(state.session.undo_last()))?;

    match removed {
        Some(drink) => println!("✓ Removed {}", drink.name),
        None => println!("No drinks to undo."),
    }
    Ok(())
}

fn cmd_remove(state_path: &Path, id: uuid::Uuid) -> Result<()> {
    let removed = AppState::update(state_path, |state| Ok(state.session.remove_drink(id)))?;

    match removed {
        Some(drink) => {
            println!("✓ Removed {}", drink.name);
            Ok(())
        }
        None => Err(Error::Other(format!("No drink with id {}", id))),
    }
}

fn cmd_clear(state_path: &Path) -> Result<()> {
    AppState::update(state_path, |state| {
        state.session.clear();
        Ok(())
    })?;
    println!("✓ All drinks cleared");
    Ok(())
}

fn cmd_drinks(state_path: &Path) -> Result<()> {
    let state = AppState::load(state_path)?;

    if state.session.drinks.is_empty() {
        println!("No drinks logged.");
        return Ok(());
    }

    for drink in &state.session.drinks {
        let when = drink
            .timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown time".into());
        println!(
            "{}  {:<14} {:>4.1} std  {}",
            when, drink.name, drink.standard_drinks, drink.id
        );
    }
    println!(
        "Total: {:.1} standard drinks",
        state.session.total_standard_drinks()
    );
    Ok(())
}

fn cmd_status(state_path: &Path, at: Option<DateTime<Utc>>, slow: bool) -> Result<()> {
    // Only a reading taken now at the session's own rate is an observation
    let observed = at.is_none() && !slow;
    let now = at.unwrap_or_else(Utc::now);

    let evaluate = |state: &AppState| -> Result<BacSnapshot> {
        let profile = state.require_profile()?;
        validate_profile(profile)?;

        let mut session = state.session.clone();
        session.switch_mode(TrackingMode::Live);
        if slow {
            session.metabolism = Metabolism::Slow;
        }
        Ok(compute_session_bac(profile, &session, now))
    };

    let (snapshot, session) = if observed {
        AppState::update(state_path, |state| {
            let snapshot = evaluate(&*state)?;
            state.session.record(&snapshot);
            Ok((snapshot, state.session.clone()))
        })?
    } else {
        let state = AppState::load(state_path)?;
        (evaluate(&state)?, state.session)
    };

    display_snapshot(&snapshot);
    if session.peak_bac > 0.0 {
        println!("  Peak this session: {}%", format_bac(session.peak_bac));
    }
    if session.has_been_impaired {
        println!("  ⚠ You reached the legal limit this session.");
    }
    Ok(())
}

fn cmd_estimate(state_path: &Path, drinks: f64, hours: f64, slow: bool) -> Result<()> {
    let state = AppState::load(state_path)?;
    let profile = state.require_profile()?;
    validate_profile(profile)?;

    let mut session = TrackingSession::new(Metabolism::from_slow_flag(slow));
    session.set_estimate(drinks, hours)?;
    let snapshot = compute_session_bac(profile, &session, Utc::now());

    println!("Estimate for {} drinks over {} hours:", drinks, hours);
    display_snapshot(&snapshot);
    Ok(())
}

fn cmd_target(state_path: &Path, level: &str, hours: f64, slow: bool) -> Result<()> {
    let state = AppState::load(state_path)?;
    let profile = state.require_profile()?;
    validate_profile(profile)?;

    let (target_bac, label) = match TargetLevel::parse(level) {
        Some(preset) => (preset.bac(), preset.label()),
        None => (validate::parse_number("Target BAC", level)?, "Custom"),
    };
    validate_target(target_bac, hours)?;

    let drinks = drinks_for_target(
        target_bac,
        profile.weight_lbs,
        profile.gender,
        hours,
        Metabolism::from_slow_flag(slow),
    );

    println!(
        "To reach {}% ({}) over {} hours: ~{:.1} standard drinks",
        format_bac(target_bac),
        label,
        hours,
        drinks
    );
    if classify(target_bac).is_over_legal_limit() {
        println!(
            "  ⚠ This target exceeds the legal limit of {}. Do not drive.",
            LEGAL_LIMIT
        );
    }
    Ok(())
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn cmd_watch(state_path: &Path, config: &Config, count: Option<usize>, slow: bool) -> Result<()> {
    let state = AppState::load(state_path)?;
    let profile = state.require_profile()?.clone();
    validate_profile(&profile)?;

    if !state.session.is_live_active() {
        println!("No drinks logged. Nothing to watch.");
        return Ok(());
    }

    let options = SchedulerOptions::from(&config.scheduler);
    let (tx, rx) = mpsc::channel();
    let path = state_path.to_path_buf();
    // Re-read the store on every evaluation so drinks logged elsewhere show up
    let handle = start_scheduler(
        Some(profile),
        move || {
            let mut session = AppState::load(&path)
                .map(|state| state.session)
                .unwrap_or_default();
            if slow {
                session.metabolism = Metabolism::Slow;
            }
            session
        },
        move |snapshot| {
            let _ = tx.send(snapshot);
        },
        options,
    )?;

    let mut last_modified = modified_at(state_path);
    let mut received = 0;
    loop {
        match rx.recv_timeout(options.cadence) {
            Ok(snapshot) => {
                display_snapshot(&snapshot);
                received += 1;

                if count.is_some_and(|limit| received >= limit) || snapshot.value == 0.0 {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                let modified = modified_at(state_path);
                if modified != last_modified {
                    last_modified = modified;
                    handle.notify_changed();
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    stop_scheduler(handle);
    Ok(())
}

fn cmd_presets() -> Result<()> {
    for preset in presets() {
        println!(
            "{:<13} {:<13} {:>5} oz  {:>5}%  {:.1} std",
            preset.id,
            preset.name,
            preset.volume_oz,
            preset.abv_percent,
            preset.standard_drinks()
        );
    }
    Ok(())
}

fn cmd_custom(state_path: &Path, action: CustomAction) -> Result<()> {
    match action {
        CustomAction::Save { name, oz, abv } => {
            AppState::update(state_path, |state| state.save_custom_drink(&name, oz, abv))?;
            println!("✓ Custom drink \"{}\" saved", name.trim());
        }
        CustomAction::List => {
            let state = AppState::load(state_path)?;
            if state.custom_drinks.is_empty() {
                println!("No custom drinks saved.");
            }
            for drink in &state.custom_drinks {
                println!(
                    "{:<20} {:>5} oz  {:>5}%  {:.1} std",
                    drink.name,
                    drink.volume_oz,
                    drink.abv_percent,
                    standard_drinks_for(drink.volume_oz, drink.abv_percent)
                );
            }
        }
        CustomAction::Delete { name } => {
            let deleted = AppState::update(state_path, |state| Ok(state.delete_custom_drink(&name)))?;
            if !deleted {
                return Err(Error::Other(format!("No saved drink named {}", name)));
            }
            println!("✓ Custom drink deleted");
        }
    }
    Ok(())
}

fn display_snapshot(snapshot: &BacSnapshot) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  BAC {}%  {}", format_bac(snapshot.value), snapshot.level.label());
    println!("╰─────────────────────────────────────────╯");
    println!("  {}", snapshot.level.message());

    match snapshot.sober_at {
        Some(at) => {
            let remaining = at - snapshot.computed_at;
            println!(
                "  Sober in ~{} (around {})",
                format_duration(remaining),
                at.with_timezone(&chrono::Local).format("%H:%M")
            );
        }
        None => println!("  Already at zero."),
    }
    println!();
}
