use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    #[default]
    None,
    Percentage,
    Fixed,
}

impl std::str::FromStr for DiscountType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "percentage" | "percent" => Ok(Self::Percentage),
            "fixed" => Ok(Self::Fixed),
            other => Err(format!(
                "unsupported discount type `{other}` (expected none|percentage|fixed)"
            )),
        }
    }
}

/// Which grand-total formula a screen uses.
///
/// `Simple` is the live calculator: board + processes, then tax, minus an
/// optional discount. `Builder` is the quotation-creation flow: board +
/// processes + packing, marked up by margin, then taxed. The two never mix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingPipeline {
    Simple,
    #[default]
    Builder,
}

impl fmt::Display for PricingPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => f.write_str("simple"),
            Self::Builder => f.write_str("builder"),
        }
    }
}

impl std::str::FromStr for PricingPipeline {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "builder" => Ok(Self::Builder),
            other => {
                Err(format!("unsupported pricing pipeline `{other}` (expected simple|builder)"))
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSettings {
    #[serde(default)]
    pub tax_rate_pct: Decimal,
    #[serde(default)]
    pub discount_type: DiscountType,
    #[serde(default)]
    pub discount_value: Decimal,
    /// Markup applied by the builder pipeline only.
    #[serde(default)]
    pub margin_pct: Decimal,
    #[serde(default)]
    pub packing_charge: Decimal,
}
