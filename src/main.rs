use anyhow::Result;
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use tracing::warn;

use spendwise::cli::{
    handle_calendar_command, handle_expense_command, handle_materialize_command,
    handle_plan_command, handle_recurring_command, handle_today_command, parse_instant,
};
use spendwise::config::{SpendPaths, Settings};
use spendwise::display::recurring::format_materialize_report;
use spendwise::services::RecurringService;
use spendwise::storage::Storage;

#[derive(Parser)]
#[command(
    name = "spendwise",
    version,
    about = "Daily budget allocation and recurring expense tracker",
    long_about = "Spendwise splits a budget plan into a daily spending limit, carries \
                  unspent money forward and shows how each day went on a calendar. \
                  Recurring expenses are generated automatically when they fall due."
)]
struct Cli {
    /// Override the current time (YYYY-MM-DD or YYYY-MM-DD HH:MM)
    #[arg(long, global = true, hide = true, env = "SPENDWISE_NOW")]
    now: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory
    Init,

    /// Show or change configuration
    Config {
        /// Setting to change
        key: Option<String>,
        /// New value
        value: Option<String>,
    },

    /// Budget plan commands
    #[command(subcommand)]
    Plan(spendwise::cli::PlanCommands),

    /// Expense commands
    #[command(subcommand, alias = "exp")]
    Expense(spendwise::cli::ExpenseCommands),

    /// Recurring expense commands
    #[command(subcommand, alias = "rec")]
    Recurring(spendwise::cli::RecurringCommands),

    /// Show the month calendar with daily balances
    #[command(alias = "cal")]
    Calendar {
        /// Month to show (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
        /// Print the grid as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show today's allowance within the current plan
    Today {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate due recurring expenses now
    Materialize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = SpendPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;
    spendwise::init_tracing(&settings.log_filter);

    let now = match cli.now.as_deref() {
        Some(s) => parse_instant(s)?,
        None => chrono::Local::now().naive_local(),
    };

    let command = match cli.command {
        Some(Commands::Init) => {
            println!("Initializing Spendwise at: {}", paths.base_dir().display());
            let storage = Storage::open(paths.clone())?;
            storage.save_all()?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Create your first plan with 'spendwise plan add <name> --budget <amount>'.");
            return Ok(());
        }
        Some(Commands::Config { key, value }) => {
            match (key, value) {
                (Some(key), Some(value)) => {
                    settings.set(&key, &value)?;
                    settings.save(&paths)?;
                    println!("Set {} = {}", key, value);
                }
                (Some(key), None) => {
                    anyhow::bail!("Missing value for '{}'", key);
                }
                _ => print_config(&paths, &settings),
            }
            return Ok(());
        }
        Some(command) => command,
        None => {
            println!("Spendwise - daily budget allocation");
            println!();
            println!("Run 'spendwise --help' for usage information.");
            println!("Run 'spendwise today' to see what you can spend today.");
            return Ok(());
        }
    };

    let storage = Storage::open(paths)?;

    // Explicit materialize prints its own report
    if settings.auto_materialize && !matches!(command, Commands::Materialize) {
        auto_materialize(&storage, now);
    }

    match command {
        Commands::Plan(cmd) => handle_plan_command(&storage, &settings, cmd, now)?,
        Commands::Expense(cmd) => handle_expense_command(&storage, &settings, cmd, now)?,
        Commands::Recurring(cmd) => handle_recurring_command(&storage, &settings, cmd, now)?,
        Commands::Calendar { month, json } => {
            handle_calendar_command(&storage, &settings, month, json, now)?
        }
        Commands::Today { json } => handle_today_command(&storage, &settings, json, now)?,
        Commands::Materialize => handle_materialize_command(&storage, now)?,
        Commands::Init | Commands::Config { .. } => {}
    }

    Ok(())
}

/// Startup batch; a failure here must not block the requested command
fn auto_materialize(storage: &Storage, now: NaiveDateTime) {
    match RecurringService::new(storage).materialize_all(now) {
        Ok(report) if !report.is_clean() => {
            warn!("{}", format_materialize_report(&report).trim_end());
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Recurring materialization failed"),
    }
}

fn print_config(paths: &SpendPaths, settings: &Settings) {
    println!("Spendwise Configuration");
    println!("=======================");
    println!("Base directory: {}", paths.base_dir().display());
    println!("Data directory: {}", paths.data_dir().display());
    println!();
    println!("Settings:");
    println!("  currency_symbol:   {}", settings.currency_symbol);
    println!("  date_format:       {}", settings.date_format);
    println!("  first_day_of_week: {}", settings.week_start());
    println!("  auto_materialize:  {}", settings.auto_materialize);
    println!("  log_filter:        {}", settings.log_filter);
}
