//! Recurring expense CLI commands

use chrono::NaiveDateTime;
use clap::Subcommand;

use super::{parse_amount, parse_instant};
use crate::config::settings::Settings;
use crate::display::recurring::format_rule_list;
use crate::error::{SpendError, SpendResult};
use crate::models::Frequency;
use crate::services::{CreateRuleInput, PlanService, RecurringService};
use crate::storage::Storage;

/// Recurring subcommands
#[derive(Subcommand)]
pub enum RecurringCommands {
    /// Register a recurring expense
    Add {
        /// Amount per occurrence in whole units
        amount: String,
        #[arg(short, long)]
        category: String,
        /// daily, weekly, monthly, or a day count such as 14d
        #[arg(short, long, default_value = "monthly")]
        every: String,
        /// First occurrence (YYYY-MM-DD, optionally with HH:MM); defaults to now
        #[arg(short, long)]
        start: Option<String>,
        /// Last day an occurrence may fall on
        #[arg(long)]
        end: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
        /// Plan name or ID to associate with
        #[arg(short, long)]
        plan: Option<String>,
    },
    /// List recurring expenses
    List,
    /// Stop a recurring expense from generating further entries
    Stop {
        /// Rule ID (prefix is enough)
        rule: String,
    },
    /// Delete a recurring expense (generated expenses are kept)
    Delete {
        /// Rule ID (prefix is enough)
        rule: String,
    },
}

/// Handle a recurring command
pub fn handle_recurring_command(
    storage: &Storage,
    settings: &Settings,
    cmd: RecurringCommands,
    now: NaiveDateTime,
) -> SpendResult<()> {
    let service = RecurringService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        RecurringCommands::Add {
            amount,
            category,
            every,
            start,
            end,
            note,
            plan,
        } => {
            let frequency = Frequency::parse(&every).ok_or_else(|| {
                SpendError::Validation(format!(
                    "Invalid frequency: '{}'. Use daily, weekly, monthly or a day count like 14d",
                    every
                ))
            })?;

            let plan_id = match plan {
                Some(plan) => Some(PlanService::new(storage).resolve(&plan)?.id),
                None => None,
            };

            let rule = service.create(CreateRuleInput {
                amount: parse_amount(&amount)?,
                category,
                note,
                start: start.as_deref().map(parse_instant).transpose()?.unwrap_or(now),
                frequency,
                end: end.as_deref().map(parse_end).transpose()?,
                plan_id,
            })?;

            println!(
                "Created recurring expense: {} {} ({})",
                rule.amount.format_with_symbol(symbol),
                rule.category,
                rule.frequency
            );
            println!("  First occurrence: {}", rule.start);
            println!("  ID:               {}", rule.id);
        }

        RecurringCommands::List => {
            let rules = service.list()?;
            println!("{}", format_rule_list(&rules, symbol).trim_end());
        }

        RecurringCommands::Stop { rule } => {
            let found = service
                .find(&rule)?
                .ok_or_else(|| SpendError::rule_not_found(&rule))?;

            let stopped = service.terminate(found.id, now)?;
            println!("Stopped recurring expense {} ({})", stopped.id, stopped.category);
        }

        RecurringCommands::Delete { rule } => {
            let found = service
                .find(&rule)?
                .ok_or_else(|| SpendError::rule_not_found(&rule))?;

            let deleted = service.delete(found.id)?;
            println!("Deleted recurring expense {} ({})", deleted.id, deleted.category);
        }
    }

    Ok(())
}

/// End bounds given as a bare date cover that whole day
fn parse_end(s: &str) -> SpendResult<NaiveDateTime> {
    let instant = parse_instant(s)?;
    if s.trim().len() == 10 {
        return instant
            .date()
            .and_hms_opt(23, 59, 59)
            .ok_or_else(|| SpendError::Validation(format!("Invalid date '{}'", s)));
    }
    Ok(instant)
}
