pub mod pricing;
pub mod process_list;
pub mod validation;

use serde::{Deserialize, Serialize};

use crate::domain::{settings::PricingPipeline, snapshot::QuotationSnapshot};
use crate::errors::DomainError;

use self::{
    pricing::{DeterministicPricingEngine, PricingEngine, PricingResult},
    validation::{validate_snapshot, InputPolicy, ValidationResult},
};

#[derive(Clone, Copy, Debug)]
pub struct QuotationEvaluationInput<'a> {
    pub snapshot: &'a QuotationSnapshot,
    pub pipeline: PricingPipeline,
    pub policy: InputPolicy,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationEvaluation {
    pub validation: ValidationResult,
    pub pricing: PricingResult,
}

/// Validation and pricing behind one call, for callers that recompute on
/// every form change.
pub trait QuotationRuntime: Send + Sync {
    fn evaluate(
        &self,
        input: QuotationEvaluationInput<'_>,
    ) -> Result<QuotationEvaluation, DomainError>;
}

pub struct DeterministicQuotationRuntime<P> {
    pricing_engine: P,
}

impl<P> DeterministicQuotationRuntime<P> {
    pub fn new(pricing_engine: P) -> Self {
        Self { pricing_engine }
    }
}

impl Default for DeterministicQuotationRuntime<DeterministicPricingEngine> {
    fn default() -> Self {
        Self::new(DeterministicPricingEngine)
    }
}

impl<P> QuotationRuntime for DeterministicQuotationRuntime<P>
where
    P: PricingEngine,
{
    fn evaluate(
        &self,
        input: QuotationEvaluationInput<'_>,
    ) -> Result<QuotationEvaluation, DomainError> {
        let validation = validate_snapshot(input.snapshot);
        if input.policy == InputPolicy::Strict && !validation.valid {
            return Err(DomainError::InvalidInput(validation.violations));
        }

        let pricing = self.pricing_engine.price(input.snapshot, input.pipeline)?;
        Ok(QuotationEvaluation { validation, pricing })
    }
}
