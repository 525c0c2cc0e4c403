//! Expense display formatting

use crate::models::{Expense, Money};

/// Format expenses as a table with a budget total
pub fn format_expense_list(expenses: &[Expense], symbol: &str, date_format: &str) -> String {
    if expenses.is_empty() {
        return "No expenses found.".to_string();
    }

    let category_width = expenses
        .iter()
        .map(|e| e.category.len())
        .max()
        .unwrap_or(8)
        .max(8);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<10}  {:>9}  {:<category_width$}  {}\n",
        "ID",
        "Date",
        "Amount",
        "Category",
        "Note",
        category_width = category_width,
    ));
    output.push_str(&format!(
        "{:-<12}  {:-<10}  {:->9}  {:-<category_width$}  {:-<10}\n",
        "",
        "",
        "",
        "",
        "",
        category_width = category_width,
    ));

    for expense in expenses {
        let mut note = expense.note.clone();
        if expense.exclude_from_budget {
            note = format!("{} [excluded]", note).trim_start().to_string();
        }

        output.push_str(&format!(
            "{:<12}  {:<10}  {:>9}  {:<category_width$}  {}\n",
            expense.id.to_string(),
            expense.date.format(date_format).to_string(),
            expense.amount.format_with_symbol(symbol),
            expense.category,
            note,
            category_width = category_width,
        ));
    }

    let counted: Money = expenses
        .iter()
        .filter(|e| e.counts_against_budget())
        .map(|e| e.amount)
        .sum();
    output.push_str(&format!(
        "\n{} expense(s), {} against budget\n",
        expenses.len(),
        counted.format_with_symbol(symbol)
    ));

    output
}

/// One-line confirmation after logging an expense
pub fn format_expense_created(expense: &Expense, symbol: &str) -> String {
    let plan = match expense.plan_id {
        Some(id) => format!(" under plan {}", id),
        None => " (no plan covers this day)".to_string(),
    };
    format!(
        "Logged {} for {} on {}{} [{}]",
        expense.amount.format_with_symbol(symbol),
        expense.category,
        expense.day(),
        plan,
        expense.id
    )
}
