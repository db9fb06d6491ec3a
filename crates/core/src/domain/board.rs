use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sheet dimensions and material rate for a single product line.
///
/// Height is captured with the rest of the box geometry but never takes part
/// in the board cost; only the flat sheet (length x width) is billed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardInputs {
    #[serde(default)]
    pub length_mm: Decimal,
    #[serde(default)]
    pub width_mm: Decimal,
    #[serde(default)]
    pub height_mm: Decimal,
    #[serde(default)]
    pub gsm: u32,
    #[serde(default)]
    pub kg_rate: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityInputs {
    #[serde(default)]
    pub quantity: u32,
    /// Finished pieces cut from one board ("ups").
    #[serde(default)]
    pub units_per_board: u32,
    #[serde(default)]
    pub waste_qty: u32,
}

impl QuantityInputs {
    pub fn new(quantity: u32, units_per_board: u32, waste_qty: u32) -> Self {
        Self { quantity, units_per_board, waste_qty }
    }
}
