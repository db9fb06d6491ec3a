use thiserror::Error;

use crate::{
    cpq::validation::InputViolation,
    domain::{
        process::{ProcessId, ProcessType},
        quote::QuotationStatus,
    },
};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid quotation transition from {from:?} to {to:?}")]
    InvalidQuotationTransition { from: QuotationStatus, to: QuotationStatus },
    #[error("quotation is locked for editing in status {status:?}")]
    QuotationLocked { status: QuotationStatus },
    #[error("reorder index out of range: {from} -> {to} with {len} entries")]
    ReorderOutOfRange { from: usize, to: usize, len: usize },
    #[error("unknown process entry `{0}`")]
    UnknownProcess(ProcessId),
    #[error("process entry is {expected} but update carried {actual}")]
    ProcessTypeMismatch { expected: ProcessType, actual: ProcessType },
    #[error("quotation input rejected: {}", summarize(.0))]
    InvalidInput(Vec<InputViolation>),
    #[error("amount out of range while computing {stage}")]
    AmountOverflow { stage: &'static str },
}

fn summarize(violations: &[InputViolation]) -> String {
    violations.iter().map(|violation| violation.code.as_str()).collect::<Vec<_>>().join(", ")
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("input failure: {0}")]
    Input(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. } | Self::Internal { correlation_id, .. } => {
                correlation_id
            }
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The quotation could not be priced. Check inputs and try again."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(error) => Self::BadRequest {
                message: error.to_string(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Input(message) => {
                Self::BadRequest { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}
