//! Instruction text sent to the generative model.
//!
//! Every amount in the prompt is written as a plain decimal (`4000.00`), the
//! same shape the reply must use.

use rust_decimal::Decimal;

use crate::case::CaseInput;
use crate::currency::format_plain;

// ── Prompt template ──

const ROLE: &str = "\
You are a consultant on attorney fees in Rio de Janeiro, Brazil, following the \
OAB/RJ (Brazilian Bar Association, Rio de Janeiro section) minimum fee table. \
Suggest a fair and reasonable range for a contractual attorney fee.";

const OUTPUT_FORMAT: &str = "\
Respond EXACTLY in the format below, with no markdown and no other text. \
Amounts are in BRL, without the R$ symbol, without thousands separators, \
using a point as the decimal separator. The line '---' separates the \
amounts from the justification.
MINIMUM: <amount>
MEDIAN: <amount>
MAXIMUM: <amount>
---
JUSTIFICATION: <concise, professional text in Brazilian Portuguese explaining \
the suggestion based on the complexity, the procedural phase and the OAB/RJ \
reference>";

/// Build the instruction sent to the generative model.
///
/// The floor and base amounts are stated as hard constraints: the suggested
/// minimum must not be below the floor, and the median is an adjustment of
/// the base for the stated complexity.
pub fn build_prompt(case: &CaseInput, floor_amount: Decimal, base_amount: Decimal) -> String {
    let floor = format_plain(floor_amount);
    let base = format_plain(base_amount);
    format!(
        "{ROLE}\n\
         \n\
         CASE CONTEXT:\n\
         - Type of action: {case_type} ({case_type_pt})\n\
         - Case value (valor da causa): {case_value} BRL\n\
         - Complexity (self-assessed by the lawyer): {complexity}\n\
         - Procedural phase: {phase} ({phase_pt})\n\
         \n\
         CONSTRAINTS:\n\
         1. The ethical minimum (piso) for this action under the OAB/RJ table is {floor} BRL.\n\
         2. The base fee computed with the 20% rule is {base} BRL.\n\
         3. MINIMUM must be greater than or equal to {floor}.\n\
         4. MEDIAN must be an adjustment of {base} that reflects the complexity.\n\
         5. MAXIMUM is the upper bound for a successful, demanding case.\n\
         \n\
         {OUTPUT_FORMAT}\n",
        case_type = case.case_type.label(),
        case_type_pt = case.case_type.label_pt(),
        case_value = format_plain(case.case_value),
        complexity = case.complexity.label(),
        phase = case.procedural_phase.label(),
        phase_pt = case.procedural_phase.label_pt(),
    )
}
