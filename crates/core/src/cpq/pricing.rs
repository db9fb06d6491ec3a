use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        board::{BoardInputs, QuantityInputs},
        process::{ProcessEntry, ProcessId, ProcessKind, ProcessType},
        settings::{DiscountType, PricingPipeline, PricingSettings},
        snapshot::QuotationSnapshot,
    },
    errors::DomainError,
};

/// mm x mm x g/m^2 x currency/kg collapses to currency per sheet through this divisor.
const SHEET_RATE_DIVISOR: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
const PER_THOUSAND: Decimal = Decimal::ONE_THOUSAND;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardCost {
    pub single_board_rate: Decimal,
    pub boards_required: u64,
    pub total_boards_required: u64,
    pub total_board_rate: Decimal,
}

/// Outcome of costing one entry in isolation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessCharge {
    Standalone(Decimal),
    /// The entry's cost is a function of the other entries in its list.
    SiblingDerived,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessLineCost {
    pub id: ProcessId,
    pub order: u32,
    pub process_type: ProcessType,
    pub display_rate: Decimal,
    pub total_cost: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub grand_total: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderTotals {
    pub total_rate: Decimal,
    pub single_box_rate: Decimal,
    pub margin_amount: Decimal,
    pub rate_with_margin: Decimal,
    pub tax: Decimal,
    pub grand_total: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "pipeline", rename_all = "snake_case")]
pub enum Totals {
    Simple(SimpleTotals),
    Builder(BuilderTotals),
}

impl Totals {
    pub fn grand_total(&self) -> Decimal {
        match self {
            Self::Simple(totals) => totals.grand_total,
            Self::Builder(totals) => totals.grand_total,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    pub board: BoardCost,
    pub lines: Vec<ProcessLineCost>,
    pub total_process_cost: Decimal,
    pub totals: Totals,
    pub trace: Vec<PricingTraceStep>,
}

pub trait PricingEngine: Send + Sync {
    fn price(
        &self,
        snapshot: &QuotationSnapshot,
        pipeline: PricingPipeline,
    ) -> Result<PricingResult, DomainError>;
}

#[derive(Default)]
pub struct DeterministicPricingEngine;

impl PricingEngine for DeterministicPricingEngine {
    fn price(
        &self,
        snapshot: &QuotationSnapshot,
        pipeline: PricingPipeline,
    ) -> Result<PricingResult, DomainError> {
        price_snapshot(snapshot, pipeline)
    }
}

fn mul(left: Decimal, right: Decimal, stage: &'static str) -> Result<Decimal, DomainError> {
    left.checked_mul(right).ok_or(DomainError::AmountOverflow { stage })
}

fn add(left: Decimal, right: Decimal, stage: &'static str) -> Result<Decimal, DomainError> {
    left.checked_add(right).ok_or(DomainError::AmountOverflow { stage })
}

fn sub(left: Decimal, right: Decimal, stage: &'static str) -> Result<Decimal, DomainError> {
    left.checked_sub(right).ok_or(DomainError::AmountOverflow { stage })
}

/// `amount * pct / 100`
fn percent_of(amount: Decimal, pct: Decimal, stage: &'static str) -> Result<Decimal, DomainError> {
    Ok(mul(amount, pct, stage)? / Decimal::ONE_HUNDRED)
}

fn per_thousand(
    quantity: u32,
    rate: Decimal,
    stage: &'static str,
) -> Result<Decimal, DomainError> {
    mul(Decimal::from(quantity) / PER_THOUSAND, rate, stage)
}

pub fn compute_board_cost(
    board: &BoardInputs,
    quantities: &QuantityInputs,
) -> Result<BoardCost, DomainError> {
    const STAGE: &str = "single_board_rate";
    let area = mul(board.length_mm, board.width_mm, STAGE)?;
    let weight = mul(area, Decimal::from(board.gsm), STAGE)?;
    let single_board_rate = mul(weight, board.kg_rate, STAGE)? / SHEET_RATE_DIVISOR;

    let boards_required = if quantities.quantity > 0 && quantities.units_per_board > 0 {
        u64::from(quantities.quantity.div_ceil(quantities.units_per_board))
    } else {
        0
    };
    let total_boards_required = boards_required + u64::from(quantities.waste_qty);
    let total_board_rate =
        mul(Decimal::from(total_boards_required), single_board_rate, "total_board_rate")?;

    Ok(BoardCost { single_board_rate, boards_required, total_boards_required, total_board_rate })
}

pub fn compute_process_cost(
    kind: &ProcessKind,
    quantity: u32,
) -> Result<ProcessCharge, DomainError> {
    const STAGE: &str = "process_cost";
    let cost = match kind {
        ProcessKind::Printing { rate_per_1000, backside }
        | ProcessKind::Lamination { rate_per_1000, backside } => {
            let effective_rate = mul(*rate_per_1000, backside.multiplier(), STAGE)?;
            per_thousand(quantity, effective_rate, STAGE)?
        }
        ProcessKind::UvPlate { rate_per_1000 } | ProcessKind::Varnish { rate_per_1000 } => {
            per_thousand(quantity, *rate_per_1000, STAGE)?
        }
        // GSM tier rates only feed the card's display total.
        ProcessKind::Flute { rate_per_1000, .. } => per_thousand(quantity, *rate_per_1000, STAGE)?,
        ProcessKind::Die { die_charge, die_cut_rate_per_1000 } => {
            add(*die_charge, per_thousand(quantity, *die_cut_rate_per_1000, STAGE)?, STAGE)?
        }
        ProcessKind::SingleWindowPasting { window_pasting_rate } => *window_pasting_rate,
        ProcessKind::CornerPasting { pasting_rate } => *pasting_rate,
        ProcessKind::B2bPasting => return Ok(ProcessCharge::SiblingDerived),
    };

    Ok(ProcessCharge::Standalone(cost))
}

/// Sum of the window and corner pasting totals of every other entry.
pub fn compute_b2b_pasting_total(
    entries: &[ProcessEntry],
    self_id: &ProcessId,
) -> Result<Decimal, DomainError> {
    entries
        .iter()
        .filter(|entry| &entry.id != self_id)
        .map(|entry| match &entry.kind {
            ProcessKind::SingleWindowPasting { window_pasting_rate } => *window_pasting_rate,
            ProcessKind::CornerPasting { pasting_rate } => *pasting_rate,
            ProcessKind::Printing { .. }
            | ProcessKind::UvPlate { .. }
            | ProcessKind::Varnish { .. }
            | ProcessKind::Lamination { .. }
            | ProcessKind::Flute { .. }
            | ProcessKind::Die { .. }
            | ProcessKind::B2bPasting => Decimal::ZERO,
        })
        .try_fold(Decimal::ZERO, |total, rate| add(total, rate, "b2b_pasting"))
}

pub fn compute_line_costs(
    entries: &[ProcessEntry],
    quantity: u32,
) -> Result<Vec<ProcessLineCost>, DomainError> {
    entries
        .iter()
        .map(|entry| {
            let total_cost = match compute_process_cost(&entry.kind, quantity)? {
                ProcessCharge::Standalone(cost) => cost,
                ProcessCharge::SiblingDerived => compute_b2b_pasting_total(entries, &entry.id)?,
            };
            let display_rate = entry.kind.display_rate().unwrap_or(total_cost);

            Ok(ProcessLineCost {
                id: entry.id.clone(),
                order: entry.order,
                process_type: entry.process_type(),
                display_rate,
                total_cost,
            })
        })
        .collect()
}

pub fn compute_total_process_cost(lines: &[ProcessLineCost]) -> Result<Decimal, DomainError> {
    lines
        .iter()
        .try_fold(Decimal::ZERO, |total, line| add(total, line.total_cost, "total_process_cost"))
}

/// Live calculator pipeline: board + processes, taxed, less discount.
pub fn compute_simple_totals(
    total_board_rate: Decimal,
    total_process_cost: Decimal,
    settings: &PricingSettings,
) -> Result<SimpleTotals, DomainError> {
    let subtotal = add(total_board_rate, total_process_cost, "subtotal")?;
    let tax = percent_of(subtotal, settings.tax_rate_pct, "tax")?;
    let discount = match settings.discount_type {
        DiscountType::None => Decimal::ZERO,
        DiscountType::Percentage => percent_of(subtotal, settings.discount_value, "discount")?,
        DiscountType::Fixed => settings.discount_value,
    };
    let grand_total = sub(add(subtotal, tax, "grand_total")?, discount, "grand_total")?;

    Ok(SimpleTotals { subtotal, tax, discount, grand_total })
}

/// Quotation builder pipeline: board + processes + packing, marked up, taxed.
pub fn compute_builder_totals(
    total_board_rate: Decimal,
    total_process_cost: Decimal,
    quantity: u32,
    settings: &PricingSettings,
) -> Result<BuilderTotals, DomainError> {
    let total_rate = add(
        add(total_board_rate, total_process_cost, "total_rate")?,
        settings.packing_charge,
        "total_rate",
    )?;
    let single_box_rate =
        if quantity == 0 { Decimal::ZERO } else { total_rate / Decimal::from(quantity) };
    let margin_amount = percent_of(total_rate, settings.margin_pct, "margin")?;
    let rate_with_margin = add(total_rate, margin_amount, "rate_with_margin")?;
    let tax = percent_of(rate_with_margin, settings.tax_rate_pct, "tax")?;
    let grand_total = add(rate_with_margin, tax, "grand_total")?;

    Ok(BuilderTotals {
        total_rate,
        single_box_rate,
        margin_amount,
        rate_with_margin,
        tax,
        grand_total,
    })
}

pub fn compute_totals(
    board: &BoardCost,
    total_process_cost: Decimal,
    quantity: u32,
    settings: &PricingSettings,
    pipeline: PricingPipeline,
) -> Result<Totals, DomainError> {
    let total_board_rate = board.total_board_rate;
    Ok(match pipeline {
        PricingPipeline::Simple => {
            Totals::Simple(compute_simple_totals(total_board_rate, total_process_cost, settings)?)
        }
        PricingPipeline::Builder => Totals::Builder(compute_builder_totals(
            total_board_rate,
            total_process_cost,
            quantity,
            settings,
        )?),
    })
}

/// Prices the snapshot in full. Fails only when an amount leaves the
/// representable decimal range.
pub fn price_snapshot(
    snapshot: &QuotationSnapshot,
    pipeline: PricingPipeline,
) -> Result<PricingResult, DomainError> {
    let quantity = snapshot.quantities.quantity;
    let board = compute_board_cost(&snapshot.board, &snapshot.quantities)?;
    let lines = compute_line_costs(&snapshot.processes, quantity)?;
    let total_process_cost = compute_total_process_cost(&lines)?;
    let totals =
        compute_totals(&board, total_process_cost, quantity, &snapshot.settings, pipeline)?;
    let trace = build_trace(&board, &lines, total_process_cost, &totals);

    Ok(PricingResult { board, lines, total_process_cost, totals, trace })
}

fn build_trace(
    board: &BoardCost,
    lines: &[ProcessLineCost],
    total_process_cost: Decimal,
    totals: &Totals,
) -> Vec<PricingTraceStep> {
    let mut steps = vec![
        step(
            "single_board_rate",
            "length * width * gsm * kg_rate / 1000000",
            board.single_board_rate,
        ),
        step(
            "total_board_rate",
            format!(
                "({} boards + waste = {}) * single_board_rate",
                board.boards_required, board.total_boards_required
            ),
            board.total_board_rate,
        ),
    ];

    steps.extend(lines.iter().map(|line| {
        step(
            format!("process.{}", line.order),
            format!("{} ({})", line.process_type.label(), line.id),
            line.total_cost,
        )
    }));
    steps.push(step("total_process_cost", "sum(process costs)", total_process_cost));

    match totals {
        Totals::Simple(totals) => {
            steps.push(step("subtotal", "total_board_rate + total_process_cost", totals.subtotal));
            steps.push(step("tax", "subtotal * tax_rate / 100", totals.tax));
            steps.push(step("discount", "per discount type", totals.discount));
            steps.push(step("grand_total", "subtotal + tax - discount", totals.grand_total));
        }
        Totals::Builder(totals) => {
            steps.push(step(
                "total_rate",
                "total_board_rate + total_process_cost + packing_charge",
                totals.total_rate,
            ));
            steps.push(step("single_box_rate", "total_rate / quantity", totals.single_box_rate));
            steps.push(step("margin", "total_rate * margin / 100", totals.margin_amount));
            steps.push(step("tax", "rate_with_margin * tax_rate / 100", totals.tax));
            steps.push(step("grand_total", "rate_with_margin + tax", totals.grand_total));
        }
    }

    steps
}

fn step(stage: impl Into<String>, detail: impl Into<String>, amount: Decimal) -> PricingTraceStep {
    PricingTraceStep { stage: stage.into(), detail: detail.into(), amount }
}
