use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{settings::DiscountType, snapshot::QuotationSnapshot};

/// How the engine treats inputs that fail validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputPolicy {
    /// Price whatever was entered; negative values propagate arithmetically.
    #[default]
    Lenient,
    /// Reject the snapshot with the collected violations.
    Strict,
}

impl std::str::FromStr for InputPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unsupported input policy `{other}` (expected lenient|strict)")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputViolation {
    pub code: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl InputViolation {
    pub fn new(code: &str, message: impl Into<String>, suggestion: Option<&str>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            suggestion: suggestion.map(str::to_string),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<InputViolation>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self { valid: true, violations: Vec::new() }
    }
}

pub fn validate_snapshot(snapshot: &QuotationSnapshot) -> ValidationResult {
    let mut result = ValidationResult::default();
    let violations = &mut result.violations;

    let board = &snapshot.board;
    for (field, value) in [
        ("length_mm", board.length_mm),
        ("width_mm", board.width_mm),
        ("height_mm", board.height_mm),
    ] {
        if value < Decimal::ZERO {
            violations.push(InputViolation::new(
                "NEGATIVE_DIMENSION",
                format!("board.{field} is negative ({value})"),
                Some("Enter dimensions in millimetres, zero or above"),
            ));
        }
    }
    if board.kg_rate < Decimal::ZERO {
        violations.push(InputViolation::new(
            "NEGATIVE_RATE",
            format!("board.kg_rate is negative ({})", board.kg_rate),
            Some("Use a per-kilogram board rate of zero or above"),
        ));
    }

    let quantities = &snapshot.quantities;
    if quantities.quantity > 0 && quantities.units_per_board == 0 {
        violations.push(InputViolation::new(
            "ZERO_UNITS_PER_BOARD",
            format!("quantity {} requested with zero units per board", quantities.quantity),
            Some("Set how many pieces are cut from one board (at least 1)"),
        ));
    }

    let mut seen_ids = HashSet::new();
    let mut orders = Vec::with_capacity(snapshot.processes.len());
    for entry in &snapshot.processes {
        if !seen_ids.insert(entry.id.clone()) {
            violations.push(InputViolation::new(
                "DUPLICATE_PROCESS_ID",
                format!("process id `{}` appears more than once", entry.id),
                Some("Give every process card its own id"),
            ));
        }
        orders.push(entry.order);

        for (field, value) in entry.kind.rate_fields() {
            if value < Decimal::ZERO {
                violations.push(InputViolation::new(
                    "NEGATIVE_RATE",
                    format!("{}.{field} is negative ({value})", entry.process_type().label()),
                    Some("Use rates of zero or above"),
                ));
            }
        }
    }
    orders.sort_unstable();
    let contiguous = orders.iter().zip(1u32..).all(|(order, expected)| *order == expected);
    if !contiguous {
        violations.push(InputViolation::new(
            "NON_CONTIGUOUS_ORDER",
            format!("process order numbers {orders:?} are not 1..{}", orders.len()),
            Some("Renumber process cards after reordering"),
        ));
    }

    let settings = &snapshot.settings;
    if !in_percent_range(settings.tax_rate_pct) {
        violations.push(InputViolation::new(
            "TAX_RATE_OUT_OF_RANGE",
            format!("tax rate {} is outside 0..=100", settings.tax_rate_pct),
            None,
        ));
    }
    if !in_percent_range(settings.margin_pct) {
        violations.push(InputViolation::new(
            "MARGIN_OUT_OF_RANGE",
            format!("margin {} is outside 0..=100", settings.margin_pct),
            None,
        ));
    }
    if settings.discount_value < Decimal::ZERO {
        violations.push(InputViolation::new(
            "NEGATIVE_DISCOUNT",
            format!("discount value {} is negative", settings.discount_value),
            None,
        ));
    } else if settings.discount_type == DiscountType::Percentage
        && settings.discount_value > Decimal::ONE_HUNDRED
    {
        violations.push(InputViolation::new(
            "DISCOUNT_EXCEEDS_SUBTOTAL_PCT",
            format!("percentage discount {} exceeds 100", settings.discount_value),
            Some("Switch to a fixed discount or lower the percentage"),
        ));
    }
    if settings.packing_charge < Decimal::ZERO {
        violations.push(InputViolation::new(
            "NEGATIVE_PACKING_CHARGE",
            format!("packing charge {} is negative", settings.packing_charge),
            None,
        ));
    }

    result.valid = result.violations.is_empty();
    result
}

fn in_percent_range(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE_HUNDRED
}
