// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use flightlog_core::config::{Config, ConfigManager};
use flightlog_core::map::{Geocoder, NominatimGeocoder, SceneSurface};
use flightlog_core::storage::FileStore;
use flightlog_core::view::{FilterState, SortColumn, SortDirection, SortState};
use flightlog_core::{AirportDirectory, FlightLogApp, Notice, NoticeKind};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

type App = FlightLogApp<FileStore, SceneSurface>;

#[derive(Parser)]
#[command(author, version, about = "Personal pilot logbook", long_about = None)]
struct Cli {
    /// Path to config.json
    #[arg(short, long, env = "FLIGHTLOG_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory holding the stored flights
    #[arg(short, long, env = "FLIGHTLOG_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// JSON airport directory replacing the built-in one
    #[arg(long, global = true)]
    airports: Option<PathBuf>,

    /// Never query the geocoding service
    #[arg(long, global = true)]
    offline: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FlightFields {
    /// Flight date, YYYY-MM-DD (defaults to today for new flights)
    #[arg(long)]
    date: Option<String>,
    /// Duration in hours
    #[arg(long)]
    duration: Option<String>,
    /// Departure airport code
    #[arg(long = "from")]
    departure: Option<String>,
    /// Arrival airport code
    #[arg(long = "to")]
    arrival: Option<String>,
    #[arg(long)]
    aircraft: Option<String>,
    /// Training, Commercial, Personal, Cross Country or any other label
    #[arg(long = "type")]
    flight_type: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args)]
struct FilterArgs {
    /// Year-month, YYYY-MM
    #[arg(long)]
    month: Option<String>,
    /// Exact aircraft
    #[arg(long)]
    aircraft: Option<String>,
    /// Route substring, either direction (e.g. JFK or KBOS-KJFK)
    #[arg(long)]
    route: Option<String>,
}

impl From<FilterArgs> for FilterState {
    fn from(args: FilterArgs) -> Self {
        FilterState {
            month: args.month,
            aircraft: args.aircraft,
            route: args.route,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Log a new flight
    Add {
        #[command(flatten)]
        fields: FlightFields,
    },
    /// Change fields of the flight at INDEX
    Edit {
        index: usize,
        #[command(flatten)]
        fields: FlightFields,
    },
    /// Delete the flight at INDEX
    Delete {
        index: usize,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the flight table
    List {
        #[command(flatten)]
        filters: FilterArgs,
        /// date, route, aircraft, type, duration or notes
        #[arg(long, value_parser = SortColumn::from_str)]
        sort: Option<SortColumn>,
        /// Ascending order (default is descending)
        #[arg(long)]
        asc: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show totals over all flights
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// List the months and aircraft available as filters
    Filters,
    /// Search the airport directory
    Search { query: String },
    /// Look up one airport code
    Airport { code: String },
    /// Write every flight to a CSV file
    Export {
        /// Output file (defaults to flight-log-YYYY-MM-DD.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the map scene for the filtered flights as JSON
    Plot {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Fit the map to the flight at INDEX and print the viewport
    Locate { index: usize },
    /// Show the active configuration
    Config {
        /// Write the defaults to the config file if it does not exist
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = match &cli.config {
        Some(path) => ConfigManager::new(path),
        None => ConfigManager::default(),
    };
    let mut config = manager.load()?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(file) = &cli.airports {
        config.airports_file = Some(file.clone());
    }
    if cli.offline {
        config.geocoding.enabled = false;
    }

    init_logging(cli.verbose, &config.log_level);

    match cli.command {
        Commands::Config { init } => {
            if init && !manager.path().exists() {
                manager.save(&Config::default())?;
                println!("Wrote defaults to {}", manager.path().display());
            }
            println!("# {}", manager.path().display());
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Airport { code } => {
            let directory = load_directory(&config)?;
            match directory.lookup(&code) {
                Some(airport) => println!(
                    "{}  {}, {} ({})  {:.4}, {:.4}",
                    airport.code, airport.name, airport.city, airport.country, airport.lat, airport.lon
                ),
                None => println!("No airport found matching '{}'", code),
            }
        }
        Commands::Search { query } => {
            let directory = load_directory(&config)?;
            let app = open_app(&config, directory, None);
            let mut widget = app.autocomplete();
            let now = Instant::now();
            widget.on_input(&query, now);
            widget.tick(widget.next_deadline().unwrap_or(now));
            if widget.options().is_empty() {
                println!("No airports match '{}'", query);
            }
            for option in widget.options() {
                println!(
                    "{:<6} {:>5}  {} ({}, {})",
                    option.code, option.score, option.name, option.city, option.country
                );
            }
        }
        command => run_with_app(command, config)?,
    }

    Ok(())
}

fn run_with_app(command: Commands, config: Config) -> Result<()> {
    let directory = load_directory(&config)?;
    // Only the map commands resolve coordinates.
    let geocoder = match command {
        Commands::Plot { .. } | Commands::Locate { .. } => build_geocoder(&config),
        _ => None,
    };
    let mut app = open_app(&config, directory, geocoder);

    match command {
        Commands::Add { fields } => {
            apply_fields(app.form_mut(), fields);
            report(app.submit())?;
        }
        Commands::Edit { index, fields } => {
            app.edit(index)?;
            apply_fields(app.form_mut(), fields);
            report(app.submit())?;
        }
        Commands::Delete { index, yes } => {
            let outcome = app.delete(index, |flight| {
                yes || confirm(&format!(
                    "Are you sure you want to delete this flight? ({} on {}) [y/N] ",
                    flight.route(),
                    flight.date
                ))
            })?;
            match outcome {
                Some(notice) => report(notice)?,
                None => println!("Nothing deleted."),
            }
        }
        Commands::List {
            filters,
            sort,
            asc,
            json,
        } => {
            app.set_filters(filters.into());
            if let Some(column) = sort {
                let direction = if asc { SortDirection::Asc } else { SortDirection::Desc };
                app.set_sort(SortState::new(column, direction));
            }
            let table = app.table();
            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                print!("{}", table.to_text());
            }
        }
        Commands::Stats { json } => {
            let stats = app.statistics();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Total hours:     {}", stats.total_hours_display());
                println!("Total flights:   {}", stats.total_flights);
                println!("Unique airports: {}", stats.unique_airports);
            }
        }
        Commands::Filters => {
            let options = app.filter_options();
            println!("Months:");
            for month in &options.months {
                println!("  {}  {}", month.value, month.label);
            }
            println!("Aircraft:");
            for aircraft in &options.aircraft {
                println!("  {}", aircraft);
            }
        }
        Commands::Export { output } => {
            let path = output.unwrap_or_else(|| PathBuf::from(app.export_filename()));
            let notice = app.export_csv(&path);
            if notice.kind == NoticeKind::Success {
                log::info!("Export written — path={}", path.display());
            }
            report(notice)?;
        }
        Commands::Plot { filters } => {
            app.set_filters(filters.into());
            app.show_map();
            println!("{}", serde_json::to_string_pretty(app.surface())?);
        }
        Commands::Locate { index } => {
            let (notice, _) = app.locate(index)?;
            report(notice)?;
            println!("{}", serde_json::to_string_pretty(&app.surface().viewport)?);
        }
        Commands::Config { .. } | Commands::Airport { .. } | Commands::Search { .. } => {}
    }

    Ok(())
}

fn init_logging(verbose: u8, configured: &str) {
    let level = match verbose {
        0 => LevelFilter::from_str(configured).unwrap_or(LevelFilter::Warn),
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let log_config = ConfigBuilder::new().set_target_level(LevelFilter::Off).build();
    if let Err(e) = TermLogger::init(level, log_config, TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("Failed to initialise logging: {}", e);
    }
}

fn load_directory(config: &Config) -> Result<Arc<AirportDirectory>> {
    match &config.airports_file {
        Some(path) => {
            let directory = AirportDirectory::load_file(path)
                .with_context(|| format!("Failed to load airports from {}", path.display()))?;
            Ok(Arc::new(directory))
        }
        None => Ok(AirportDirectory::builtin()),
    }
}

fn build_geocoder(config: &Config) -> Option<Box<dyn Geocoder>> {
    if !config.geocoding.enabled {
        return None;
    }
    match NominatimGeocoder::new(&config.geocoding) {
        Ok(geocoder) => Some(Box::new(geocoder)),
        Err(e) => {
            log::warn!("Geocoding unavailable — error={}", e);
            None
        }
    }
}

fn open_app(config: &Config, directory: Arc<AirportDirectory>, geocoder: Option<Box<dyn Geocoder>>) -> App {
    let store = FileStore::new(config.data_dir());
    log::debug!("Opening flight log — data_dir={}", store.root().display());
    FlightLogApp::new(store, directory, geocoder, SceneSurface::new(), config.clone())
}

fn apply_fields(form: &mut flightlog_core::form::FlightForm, fields: FlightFields) {
    let FlightFields {
        date,
        duration,
        departure,
        arrival,
        aircraft,
        flight_type,
        notes,
    } = fields;
    let targets = [
        (&mut form.date, date),
        (&mut form.duration, duration),
        (&mut form.departure, departure),
        (&mut form.arrival, arrival),
        (&mut form.aircraft, aircraft),
        (&mut form.flight_type, flight_type),
        (&mut form.notes, notes),
    ];
    for (slot, value) in targets {
        if let Some(value) = value {
            *slot = value;
        }
    }
}

fn confirm(prompt: &str) -> bool {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn report(notice: Notice) -> Result<()> {
    match notice.kind {
        NoticeKind::Success | NoticeKind::Info => println!("{}", notice.text),
        NoticeKind::Warning => eprintln!("warning: {}", notice.text),
        NoticeKind::Error => anyhow::bail!("{}", notice.text),
    }
    Ok(())
}
