//! Recurring rule display formatting

use crate::models::RecurringRule;
use crate::services::MaterializeReport;

/// Format recurring rules as a table
pub fn format_rule_list(rules: &[RecurringRule], symbol: &str) -> String {
    if rules.is_empty() {
        return "No recurring expenses.".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:>9}  {:<16}  {:<14}  {:<16}  {}\n",
        "ID", "Amount", "Category", "Every", "Next", "Ends"
    ));
    output.push_str(&format!(
        "{:-<12}  {:->9}  {:-<16}  {:-<14}  {:-<16}  {:-<10}\n",
        "", "", "", "", "", ""
    ));

    for rule in rules {
        let next = if rule.is_dormant() {
            "stopped".to_string()
        } else {
            rule.next_due()
                .map(|n| n.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string())
        };
        let ends = rule
            .end
            .map(|e| e.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "never".to_string());

        output.push_str(&format!(
            "{:<12}  {:>9}  {:<16}  {:<14}  {:<16}  {}\n",
            rule.id.to_string(),
            rule.amount.format_with_symbol(symbol),
            rule.category,
            rule.frequency.description(),
            next,
            ends,
        ));
    }

    output
}

/// Summary of a materialization run
pub fn format_materialize_report(report: &MaterializeReport) -> String {
    let mut output = format!(
        "Generated {} expense(s) from {} recurring rule(s).\n",
        report.generated, report.rules_advanced
    );

    if report.conflicts > 0 {
        output.push_str(&format!(
            "{} rule(s) were already being processed elsewhere and were skipped.\n",
            report.conflicts
        ));
    }
    for failure in &report.failures {
        output.push_str(&format!("Skipped {}: {}\n", failure.rule_id, failure.message));
    }

    output
}
