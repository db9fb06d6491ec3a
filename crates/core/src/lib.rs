pub mod config;
pub mod cpq;
pub mod display;
pub mod domain;
pub mod errors;

pub use cpq::pricing::{
    compute_b2b_pasting_total, compute_board_cost, compute_builder_totals, compute_line_costs,
    compute_process_cost, compute_simple_totals, compute_total_process_cost, compute_totals,
    BoardCost, BuilderTotals, DeterministicPricingEngine, PricingEngine, PricingResult,
    ProcessCharge, ProcessLineCost, SimpleTotals, Totals,
};
pub use cpq::process_list::ProcessList;
pub use cpq::validation::{validate_snapshot, InputPolicy, InputViolation, ValidationResult};
pub use domain::board::{BoardInputs, QuantityInputs};
pub use domain::process::{Backside, ProcessEntry, ProcessId, ProcessKind, ProcessType};
pub use domain::quote::{Quotation, QuotationId, QuotationStatus};
pub use domain::settings::{DiscountType, PricingPipeline, PricingSettings};
pub use domain::snapshot::QuotationSnapshot;
pub use errors::{ApplicationError, DomainError, InterfaceError};
