use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessId(pub String);

impl ProcessId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Double-sided processing flag. Only printing and lamination honour it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Backside {
    Yes,
    #[default]
    No,
}

impl Backside {
    pub fn multiplier(self) -> Decimal {
        match self {
            Self::Yes => Decimal::TWO,
            Self::No => Decimal::ONE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessType {
    Printing,
    UvPlate,
    Varnish,
    Lamination,
    Flute,
    Die,
    SingleWindowPasting,
    CornerPasting,
    B2bPasting,
}

impl ProcessType {
    pub const ALL: [ProcessType; 9] = [
        Self::Printing,
        Self::UvPlate,
        Self::Varnish,
        Self::Lamination,
        Self::Flute,
        Self::Die,
        Self::SingleWindowPasting,
        Self::CornerPasting,
        Self::B2bPasting,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Printing => "Printing",
            Self::UvPlate => "UV Plate",
            Self::Varnish => "Varnish",
            Self::Lamination => "Lamination",
            Self::Flute => "Flute",
            Self::Die => "Die",
            Self::SingleWindowPasting => "Single Window Pasting",
            Self::CornerPasting => "Single Side/4 Corner Pasting",
            Self::B2bPasting => "B2B Pasting",
        }
    }

    /// Serialized `type` tag of the matching [`ProcessKind`] variant.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Printing => "printing",
            Self::UvPlate => "uv_plate",
            Self::Varnish => "varnish",
            Self::Lamination => "lamination",
            Self::Flute => "flute",
            Self::Die => "die",
            Self::SingleWindowPasting => "single_window_pasting",
            Self::CornerPasting => "corner_pasting",
            Self::B2bPasting => "b2b_pasting",
        }
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ProcessType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| {
                kind.label().to_ascii_lowercase() == normalized || kind.tag() == normalized
            })
            .ok_or_else(|| format!("unknown process type `{value}`"))
    }
}

/// Rate fields of one manufacturing step.
///
/// The set of variants is closed: every consumer matches exhaustively, so a
/// new process type cannot silently price at zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProcessKind {
    Printing {
        #[serde(default)]
        rate_per_1000: Decimal,
        #[serde(default)]
        backside: Backside,
    },
    UvPlate {
        #[serde(default)]
        rate_per_1000: Decimal,
    },
    Varnish {
        #[serde(default)]
        rate_per_1000: Decimal,
    },
    Lamination {
        #[serde(default)]
        rate_per_1000: Decimal,
        #[serde(default)]
        backside: Backside,
    },
    Flute {
        #[serde(default)]
        gsm1_rate: Decimal,
        #[serde(default)]
        gsm2_rate: Decimal,
        #[serde(default)]
        rate_per_1000: Decimal,
    },
    Die {
        #[serde(default)]
        die_charge: Decimal,
        #[serde(default)]
        die_cut_rate_per_1000: Decimal,
    },
    SingleWindowPasting {
        #[serde(default)]
        window_pasting_rate: Decimal,
    },
    CornerPasting {
        #[serde(default)]
        pasting_rate: Decimal,
    },
    B2bPasting,
}

impl ProcessKind {
    pub fn blank(process_type: ProcessType) -> Self {
        match process_type {
            ProcessType::Printing => {
                Self::Printing { rate_per_1000: Decimal::ZERO, backside: Backside::No }
            }
            ProcessType::UvPlate => Self::UvPlate { rate_per_1000: Decimal::ZERO },
            ProcessType::Varnish => Self::Varnish { rate_per_1000: Decimal::ZERO },
            ProcessType::Lamination => {
                Self::Lamination { rate_per_1000: Decimal::ZERO, backside: Backside::No }
            }
            ProcessType::Flute => Self::Flute {
                gsm1_rate: Decimal::ZERO,
                gsm2_rate: Decimal::ZERO,
                rate_per_1000: Decimal::ZERO,
            },
            ProcessType::Die => {
                Self::Die { die_charge: Decimal::ZERO, die_cut_rate_per_1000: Decimal::ZERO }
            }
            ProcessType::SingleWindowPasting => {
                Self::SingleWindowPasting { window_pasting_rate: Decimal::ZERO }
            }
            ProcessType::CornerPasting => Self::CornerPasting { pasting_rate: Decimal::ZERO },
            ProcessType::B2bPasting => Self::B2bPasting,
        }
    }

    pub fn process_type(&self) -> ProcessType {
        match self {
            Self::Printing { .. } => ProcessType::Printing,
            Self::UvPlate { .. } => ProcessType::UvPlate,
            Self::Varnish { .. } => ProcessType::Varnish,
            Self::Lamination { .. } => ProcessType::Lamination,
            Self::Flute { .. } => ProcessType::Flute,
            Self::Die { .. } => ProcessType::Die,
            Self::SingleWindowPasting { .. } => ProcessType::SingleWindowPasting,
            Self::CornerPasting { .. } => ProcessType::CornerPasting,
            Self::B2bPasting => ProcessType::B2bPasting,
        }
    }

    /// Aggregate rate shown on the process card (`totalPrintRate`,
    /// `totalFluteRate`, ...). This is a display figure and differs from the
    /// billed cost for flute, die and every per-thousand process.
    ///
    /// Returns `None` for B2B pasting, whose figure depends on sibling cards.
    pub fn display_rate(&self) -> Option<Decimal> {
        match self {
            Self::Printing { rate_per_1000, backside }
            | Self::Lamination { rate_per_1000, backside } => {
                Some(*rate_per_1000 * backside.multiplier())
            }
            Self::UvPlate { rate_per_1000 } | Self::Varnish { rate_per_1000 } => {
                Some(*rate_per_1000)
            }
            Self::Flute { gsm1_rate, gsm2_rate, rate_per_1000 } => {
                Some(*gsm1_rate + *gsm2_rate + *rate_per_1000)
            }
            Self::Die { die_cut_rate_per_1000, .. } => Some(*die_cut_rate_per_1000),
            Self::SingleWindowPasting { window_pasting_rate } => Some(*window_pasting_rate),
            Self::CornerPasting { pasting_rate } => Some(*pasting_rate),
            Self::B2bPasting => None,
        }
    }

    /// Every user-entered rate on the card, labelled, for validation.
    pub fn rate_fields(&self) -> Vec<(&'static str, Decimal)> {
        match self {
            Self::Printing { rate_per_1000, .. }
            | Self::UvPlate { rate_per_1000 }
            | Self::Varnish { rate_per_1000 }
            | Self::Lamination { rate_per_1000, .. } => vec![("rate_per_1000", *rate_per_1000)],
            Self::Flute { gsm1_rate, gsm2_rate, rate_per_1000 } => vec![
                ("gsm1_rate", *gsm1_rate),
                ("gsm2_rate", *gsm2_rate),
                ("rate_per_1000", *rate_per_1000),
            ],
            Self::Die { die_charge, die_cut_rate_per_1000 } => vec![
                ("die_charge", *die_charge),
                ("die_cut_rate_per_1000", *die_cut_rate_per_1000),
            ],
            Self::SingleWindowPasting { window_pasting_rate } => {
                vec![("window_pasting_rate", *window_pasting_rate)]
            }
            Self::CornerPasting { pasting_rate } => vec![("pasting_rate", *pasting_rate)],
            Self::B2bPasting => Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessEntry {
    pub id: ProcessId,
    /// 1-based display position; contiguous across the owning list.
    pub order: u32,
    #[serde(flatten)]
    pub kind: ProcessKind,
}

impl ProcessEntry {
    pub fn process_type(&self) -> ProcessType {
        self.kind.process_type()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Backside, ProcessEntry, ProcessId, ProcessKind, ProcessType};

    #[test]
    fn blank_kind_round_trips_its_type() {
        for process_type in ProcessType::ALL {
            assert_eq!(ProcessKind::blank(process_type).process_type(), process_type);
        }
    }

    #[test]
    fn backside_doubles_print_and_lamination_display_rate() {
        let printing =
            ProcessKind::Printing { rate_per_1000: Decimal::new(500, 0), backside: Backside::Yes };
        let lamination =
            ProcessKind::Lamination { rate_per_1000: Decimal::new(320, 0), backside: Backside::No };

        assert_eq!(printing.display_rate(), Some(Decimal::new(1000, 0)));
        assert_eq!(lamination.display_rate(), Some(Decimal::new(320, 0)));
    }

    #[test]
    fn flute_display_rate_sums_all_three_tiers() {
        let flute = ProcessKind::Flute {
            gsm1_rate: Decimal::new(12, 0),
            gsm2_rate: Decimal::new(8, 0),
            rate_per_1000: Decimal::new(150, 0),
        };
        assert_eq!(flute.display_rate(), Some(Decimal::new(170, 0)));
        assert_eq!(ProcessKind::B2bPasting.display_rate(), None);
    }

    #[test]
    fn process_type_parses_labels_and_tags() {
        assert_eq!("UV Plate".parse::<ProcessType>(), Ok(ProcessType::UvPlate));
        assert_eq!("b2b_pasting".parse::<ProcessType>(), Ok(ProcessType::B2bPasting));
        assert_eq!(
            "Single Side/4 Corner Pasting".parse::<ProcessType>(),
            Ok(ProcessType::CornerPasting)
        );
        assert!("embossing".parse::<ProcessType>().is_err());
    }

    #[test]
    fn entry_deserializes_from_tagged_json() {
        let entry: ProcessEntry = serde_json::from_str(
            r#"{"id":"p-1","order":1,"type":"printing","rate_per_1000":"500","backside":"Yes"}"#,
        )
        .expect("tagged process entry");

        assert_eq!(entry.id, ProcessId("p-1".to_owned()));
        assert_eq!(
            entry.kind,
            ProcessKind::Printing { rate_per_1000: Decimal::new(500, 0), backside: Backside::Yes }
        );
    }
}
