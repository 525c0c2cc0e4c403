//! Plan CLI commands

use chrono::NaiveDateTime;
use clap::Subcommand;

use super::{parse_amount, parse_date};
use crate::config::settings::Settings;
use crate::display::plan::{format_plan_details, format_plan_list};
use crate::error::{SpendError, SpendResult};
use crate::services::{CreatePlanInput, PlanService, UpdatePlanInput};
use crate::storage::Storage;

/// Plan subcommands
#[derive(Subcommand)]
pub enum PlanCommands {
    /// Create a new plan
    Add {
        /// Plan name
        name: String,
        /// Total budget in whole units
        #[arg(short, long)]
        budget: String,
        /// Amount to set aside
        #[arg(short, long, default_value = "0")]
        savings: String,
        /// First day (YYYY-MM-DD); defaults to the suggested range
        #[arg(long)]
        start: Option<String>,
        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
    },
    /// List all plans
    List,
    /// Show a plan with its daily allocations
    Show {
        /// Plan name or ID
        plan: String,
    },
    /// Edit a plan
    Edit {
        /// Plan name or ID
        plan: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        budget: Option<String>,
        #[arg(short, long)]
        savings: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        /// Mark the plan active or inactive
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a plan (its expenses are kept)
    Delete {
        /// Plan name or ID
        plan: String,
    },
    /// Suggest a date range for the next plan
    Suggest,
}

/// Handle a plan command
pub fn handle_plan_command(
    storage: &Storage,
    settings: &Settings,
    cmd: PlanCommands,
    now: NaiveDateTime,
) -> SpendResult<()> {
    let service = PlanService::new(storage);
    let symbol = settings.currency_symbol.as_str();
    let today = now.date();

    match cmd {
        PlanCommands::Add {
            name,
            budget,
            savings,
            start,
            end,
        } => {
            let (suggested_start, suggested_end) = service.suggest_range(today)?;
            let start = start.as_deref().map(parse_date).transpose()?.unwrap_or(suggested_start);
            let end = match end.as_deref() {
                Some(end) => parse_date(end)?,
                None if start == suggested_start => suggested_end,
                None => {
                    return Err(SpendError::Validation(
                        "--end is required when --start is given".into(),
                    ))
                }
            };

            let plan = service.create(CreatePlanInput {
                name,
                start,
                end,
                total_budget: parse_amount(&budget)?,
                target_savings: parse_amount(&savings)?,
            })?;

            println!("Created plan: {}", plan.name);
            println!("  Dates:       {} .. {} ({} days)", plan.start, plan.end, plan.day_count());
            println!("  Daily limit: {}", plan.daily_limit().format_with_symbol(symbol));
            println!("  ID:          {}", plan.id);
        }

        PlanCommands::List => {
            let plans = service.list()?;
            println!("{}", format_plan_list(&plans, today, symbol).trim_end());
        }

        PlanCommands::Show { plan } => {
            let found = service.resolve(&plan)?;
            let allocations = service.allocations(found.id, now)?;
            print!("{}", format_plan_details(&found, &allocations, symbol));
        }

        PlanCommands::Edit {
            plan,
            name,
            budget,
            savings,
            start,
            end,
            active,
        } => {
            let found = service.resolve(&plan)?;
            let input = UpdatePlanInput {
                name,
                start: start.as_deref().map(parse_date).transpose()?,
                end: end.as_deref().map(parse_date).transpose()?,
                total_budget: budget.as_deref().map(parse_amount).transpose()?,
                target_savings: savings.as_deref().map(parse_amount).transpose()?,
                active,
            };

            if input.is_empty() {
                println!("No changes specified.");
                return Ok(());
            }

            let updated = service.update(found.id, input)?;
            println!("Updated plan: {}", updated);
        }

        PlanCommands::Delete { plan } => {
            let found = service.resolve(&plan)?;
            let deleted = service.delete(found.id)?;
            println!("Deleted plan: {}", deleted.name);
        }

        PlanCommands::Suggest => {
            let (start, end) = service.suggest_range(today)?;
            let days = (end - start).num_days() + 1;
            println!("Next free range: {} .. {} ({} days)", start, end, days);
            println!(
                "  spendwise plan add <name> --budget <amount> --start {} --end {}",
                start, end
            );
        }
    }

    Ok(())
}
