use serde::{Deserialize, Serialize};

use crate::domain::{
    board::{BoardInputs, QuantityInputs},
    process::ProcessEntry,
    settings::PricingSettings,
};

/// Immutable copy of the quotation form taken at recompute time.
///
/// The pricing engine only ever sees this value; whoever owns the form keeps
/// the mutable state and hands over a fresh snapshot on each change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationSnapshot {
    #[serde(default)]
    pub board: BoardInputs,
    #[serde(default)]
    pub quantities: QuantityInputs,
    #[serde(default)]
    pub processes: Vec<ProcessEntry>,
    #[serde(default)]
    pub settings: PricingSettings,
}
