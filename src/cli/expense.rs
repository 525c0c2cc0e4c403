//! Expense CLI commands

use chrono::NaiveDateTime;
use clap::Subcommand;

use super::{parse_amount, parse_date, parse_instant};
use crate::config::settings::Settings;
use crate::display::expense::{format_expense_created, format_expense_list};
use crate::error::{SpendError, SpendResult};
use crate::models::Necessity;
use crate::services::{CreateExpenseInput, ExpenseFilter, ExpenseService, PlanService};
use crate::storage::Storage;

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Log an expense
    Add {
        /// Amount in whole units
        amount: String,
        /// Category
        #[arg(short, long)]
        category: String,
        /// Date (YYYY-MM-DD, optionally with HH:MM); defaults to now
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
        #[arg(short, long)]
        merchant: Option<String>,
        /// Payment method (card, cash, ...)
        #[arg(short, long)]
        payment: Option<String>,
        /// Mark as a need
        #[arg(long, conflicts_with = "want")]
        need: bool,
        /// Mark as a want
        #[arg(long)]
        want: bool,
        /// Record the expense without counting it against any budget
        #[arg(long)]
        exclude: bool,
    },
    /// List expenses
    List {
        /// Only expenses inside this plan's dates
        #[arg(long)]
        plan: Option<String>,
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        /// Show only the most recent N
        #[arg(short, long)]
        limit: Option<usize>,
        /// Only expenses generated by recurring rules
        #[arg(long)]
        recurring: bool,
    },
    /// Delete an expense
    Delete {
        /// Expense ID (prefix is enough)
        expense: String,
    },
    /// Delete every expense dated inside a plan
    Clear {
        /// Plan name or ID
        plan: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ExpenseCommands,
    now: NaiveDateTime,
) -> SpendResult<()> {
    let service = ExpenseService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        ExpenseCommands::Add {
            amount,
            category,
            date,
            note,
            merchant,
            payment,
            need,
            want,
            exclude,
        } => {
            let necessity = match (need, want) {
                (true, _) => Some(Necessity::Need),
                (_, true) => Some(Necessity::Want),
                _ => None,
            };

            let expense = service.create(CreateExpenseInput {
                date: date.as_deref().map(parse_instant).transpose()?.unwrap_or(now),
                amount: parse_amount(&amount)?,
                category,
                note,
                merchant,
                payment_method: payment,
                image_ref: None,
                necessity,
                exclude_from_budget: exclude,
            })?;

            println!("{}", format_expense_created(&expense, symbol));
        }

        ExpenseCommands::List {
            plan,
            from,
            to,
            category,
            limit,
            recurring,
        } => {
            let mut filter = ExpenseFilter::new();

            if let Some(plan) = plan {
                let found = PlanService::new(storage).resolve(&plan)?;
                filter = filter.date_range(found.start, found.end.max(found.start));
            }
            if let Some(from) = from {
                filter.start_date = Some(parse_date(&from)?);
            }
            if let Some(to) = to {
                filter.end_date = Some(parse_date(&to)?);
            }
            if let Some(category) = category {
                filter = filter.category(category);
            }
            if recurring {
                filter = filter.recurring_only();
            }
            if let Some(limit) = limit {
                filter = filter.limit(limit);
            }

            let expenses = service.list(filter)?;
            println!(
                "{}",
                format_expense_list(&expenses, symbol, &settings.date_format).trim_end()
            );
        }

        ExpenseCommands::Delete { expense } => {
            let found = service
                .find(&expense)?
                .ok_or_else(|| SpendError::expense_not_found(&expense))?;

            let deleted = service.delete(found.id)?;
            println!(
                "Deleted expense: {} {} on {}",
                deleted.amount.format_with_symbol(symbol),
                deleted.category,
                deleted.day()
            );
        }

        ExpenseCommands::Clear { plan, yes } => {
            let found = PlanService::new(storage).resolve(&plan)?;

            if !yes {
                println!(
                    "This deletes every expense dated {} .. {}. Re-run with --yes to confirm.",
                    found.start, found.end
                );
                return Ok(());
            }

            let removed = service.clear_plan_expenses(found.id)?;
            println!("Deleted {} expense(s) from plan {}", removed, found.name);
        }
    }

    Ok(())
}
