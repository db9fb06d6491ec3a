pub mod check;
pub mod config;
pub mod input;
pub mod price;

use pressquote_core::{ApplicationError, DomainError, InputViolation};
use serde::Serialize;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_VALIDATION: u8 = 3;
pub const EXIT_INPUT: u8 = 4;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome<T: Serialize> {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<T>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with(command, message, None::<()>)
    }

    pub fn success_with<T: Serialize>(
        command: &str,
        message: impl Into<String>,
        details: Option<T>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            correlation_id: None,
            hint: None,
            details,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    /// Renders a failed command through the interface error mapping.
    /// Rejected input keeps its violation list as `details`.
    pub fn failure(command: &str, error: ApplicationError, correlation_id: &str) -> Self {
        let (error_class, exit_code) = classify(&error);
        let violations: Option<Vec<InputViolation>> = match &error {
            ApplicationError::Domain(DomainError::InvalidInput(violations)) => {
                Some(violations.clone())
            }
            _ => None,
        };

        let interface = error.into_interface(correlation_id);
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: interface.to_string(),
            correlation_id: Some(interface.correlation_id().to_string()),
            hint: Some(interface.user_message().to_string()),
            details: violations,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn classify(error: &ApplicationError) -> (&'static str, u8) {
    match error {
        ApplicationError::Configuration(_) => ("config_validation", EXIT_CONFIG),
        ApplicationError::Input(_) => ("input", EXIT_INPUT),
        ApplicationError::Domain(DomainError::InvalidInput(_)) => {
            ("input_validation", EXIT_VALIDATION)
        }
        ApplicationError::Domain(DomainError::AmountOverflow { .. }) => {
            ("amount_overflow", EXIT_VALIDATION)
        }
        ApplicationError::Domain(_) => ("domain", EXIT_VALIDATION),
    }
}

fn serialize_payload<T: Serialize>(payload: CommandOutcome<T>) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

#[cfg(test)]
mod tests {
    use pressquote_core::{ApplicationError, DomainError, InputViolation};
    use serde_json::Value;

    use super::{CommandResult, EXIT_CONFIG, EXIT_INPUT, EXIT_VALIDATION};

    fn parse_payload(result: &CommandResult) -> Value {
        serde_json::from_str(&result.output).expect("command output should be valid JSON")
    }

    #[test]
    fn failures_carry_correlation_id_and_user_hint() {
        let result = CommandResult::failure(
            "price",
            ApplicationError::Input("snapshot file is empty".to_owned()),
            "quote.toml",
        );
        assert_eq!(result.exit_code, EXIT_INPUT);

        let payload = parse_payload(&result);
        assert_eq!(payload["error_class"], "input");
        assert_eq!(payload["correlation_id"], "quote.toml");
        assert_eq!(payload["message"], "bad request: snapshot file is empty");
        assert_eq!(
            payload["hint"],
            "The quotation could not be priced. Check inputs and try again."
        );
    }

    #[test]
    fn error_variants_select_class_and_exit_code() {
        let config = CommandResult::failure(
            "config",
            ApplicationError::Configuration("margin out of range".to_owned()),
            "config",
        );
        assert_eq!(config.exit_code, EXIT_CONFIG);
        assert_eq!(parse_payload(&config)["error_class"], "config_validation");

        let overflow = CommandResult::failure(
            "price",
            ApplicationError::from(DomainError::AmountOverflow { stage: "tax" }),
            "quote.toml",
        );
        assert_eq!(overflow.exit_code, EXIT_VALIDATION);
        assert_eq!(parse_payload(&overflow)["error_class"], "amount_overflow");
    }

    #[test]
    fn rejected_input_lists_violations_as_details() {
        let result = CommandResult::failure(
            "check",
            ApplicationError::from(DomainError::InvalidInput(vec![InputViolation::new(
                "NEGATIVE_RATE",
                "Varnish.rate_per_1000 is negative (-40)",
                None,
            )])),
            "quote.toml",
        );

        assert_eq!(result.exit_code, EXIT_VALIDATION);
        let payload = parse_payload(&result);
        assert_eq!(payload["error_class"], "input_validation");
        assert_eq!(payload["details"][0]["code"], "NEGATIVE_RATE");
    }

    #[test]
    fn success_payload_omits_error_fields() {
        let payload = parse_payload(&CommandResult::success("check", "snapshot is valid"));

        assert_eq!(payload["status"], "ok");
        assert!(payload.get("correlation_id").is_none());
        assert!(payload.get("details").is_none());
    }
}
