//! Text rendering for estimates, the floor table and parsed replies.
//!
//! Each view implements `Display`; `main` prints them and tests call
//! `to_string()`.

use std::fmt;

use honorarios_ai::FeeReport;
use honorarios_core::{FeeEstimate, FeeFloorTable, FeeLevel, ParsedResponse, format_brl};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

const CHART_WIDTH: usize = 40;
const NOT_AVAILABLE: &str = "N/A";

// ── Views ──

/// Metric cards, chart, justification and warnings for one report.
pub struct ReportView<'a>(pub &'a FeeReport);

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let est = &report.estimate;

        writeln!(f, "=== Fee estimate: {} ===", est.case.case_type)?;
        writeln!(
            f,
            "Case value {}, {} complexity, {}",
            format_brl(est.case.case_value),
            est.case.complexity,
            est.case.procedural_phase
        )?;
        writeln!(f)?;

        write!(f, "{}{}", Cards(est), Chart(est))?;

        let source = report.model.as_deref().unwrap_or("internal rules");
        writeln!(f, "Justification ({source})")?;
        writeln!(f, "  {}", est.justification)?;
        writeln!(f)?;

        if !est.warnings.is_empty() {
            writeln!(f, "Warnings")?;
            for warning in &est.warnings {
                writeln!(f, "  - {warning}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The three suggestion cards with their reference figures.
pub struct Cards<'a>(pub &'a FeeEstimate);

impl fmt::Display for Cards<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let est = self.0;
        writeln!(f, "Suggested Range")?;
        writeln!(
            f,
            "  {:<12} {:>18}   (OAB/RJ floor: {})",
            "Minimum",
            money(est.suggested_minimum),
            format_brl(est.floor_amount)
        )?;
        writeln!(
            f,
            "  {:<12} {:>18}   (20% base: {})",
            "Median",
            money(est.suggested_median),
            format_brl(est.base_amount)
        )?;
        writeln!(f, "  {:<12} {:>18}", "Maximum", money(est.suggested_maximum))?;
        writeln!(f)
    }
}

/// Horizontal bar chart of floor, minimum, median and maximum.
///
/// Absent values are left out; bars scale to the largest value shown.
pub struct Chart<'a>(pub &'a FeeEstimate);

impl fmt::Display for Chart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let est = self.0;
        let bars: Vec<(&str, Decimal)> = [
            ("OAB/RJ floor", Some(est.floor_amount)),
            ("Minimum", est.suggested(FeeLevel::Minimum)),
            ("Median", est.suggested(FeeLevel::Median)),
            ("Maximum", est.suggested(FeeLevel::Maximum)),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| (label, v)))
        .collect();

        writeln!(f, "Chart")?;

        let max = bars.iter().map(|(_, v)| *v).max().unwrap_or(Decimal::ZERO);
        if bars.is_empty() || max <= Decimal::ZERO {
            writeln!(f, "  Not enough data to draw the chart.")?;
            return writeln!(f);
        }

        for (label, value) in &bars {
            let width = bar_width(*value, max);
            writeln!(
                f,
                "  {:<13} {:<CHART_WIDTH$} {}",
                label,
                "█".repeat(width),
                format_brl(*value)
            )?;
        }
        writeln!(f)
    }
}

/// The active floor table.
pub struct FloorTableView<'a>(pub &'a FeeFloorTable);

impl fmt::Display for FloorTableView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.0;
        writeln!(f, "=== OAB/RJ minimum fees ===")?;
        for (case_type, floor) in table.entries() {
            writeln!(f, "  {:<36} {:>16}", case_type, format_brl(floor))?;
        }
        writeln!(
            f,
            "  {:<36} {:>16}",
            "(any other case type)",
            format_brl(table.default_floor())
        )
    }
}

/// Fields and issues recovered from a saved model reply.
pub struct ParsedView<'a>(pub &'a ParsedResponse);

impl fmt::Display for ParsedView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parsed = self.0;
        writeln!(f, "=== Parsed reply ===")?;
        for level in FeeLevel::ALL {
            writeln!(f, "  {:<14} {}", level.key(), money(parsed.get(level)))?;
        }
        writeln!(f, "  {:<14} {}", "JUSTIFICATION", parsed.justification)?;

        if !parsed.issues.is_empty() {
            writeln!(f)?;
            writeln!(f, "Issues")?;
            for issue in &parsed.issues {
                writeln!(f, "  - {issue}")?;
            }
        }
        Ok(())
    }
}

// ── Helpers ──

fn money(value: Option<Decimal>) -> String {
    value.map(format_brl).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Bar length for `value`, at least one cell for any positive value.
fn bar_width(value: Decimal, max: Decimal) -> usize {
    if value <= Decimal::ZERO {
        return 0;
    }
    let ratio = (value / max).to_f64().unwrap_or(0.0);
    ((ratio * CHART_WIDTH as f64).round() as usize).clamp(1, CHART_WIDTH)
}
