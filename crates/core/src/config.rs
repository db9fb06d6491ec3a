use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cpq::validation::InputPolicy;
use crate::domain::settings::{DiscountType, PricingPipeline, PricingSettings};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub pricing: PricingConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct PricingConfig {
    pub currency_symbol: String,
    pub tax_rate_pct: Decimal,
    pub margin_pct: Decimal,
    pub packing_charge: Decimal,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub pipeline: PricingPipeline,
    pub input_policy: InputPolicy,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub pipeline: Option<PricingPipeline>,
    pub input_policy: Option<InputPolicy>,
    pub tax_rate_pct: Option<Decimal>,
    pub currency_symbol: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pricing: PricingConfig {
                currency_symbol: "₹".to_string(),
                tax_rate_pct: Decimal::new(18, 0),
                margin_pct: Decimal::ZERO,
                packing_charge: Decimal::ZERO,
                discount_type: DiscountType::None,
                discount_value: Decimal::ZERO,
                pipeline: PricingPipeline::Builder,
                input_policy: InputPolicy::Lenient,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("pressquote.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Pricing settings a snapshot falls back to when it carries none.
    pub fn default_settings(&self) -> PricingSettings {
        PricingSettings {
            tax_rate_pct: self.pricing.tax_rate_pct,
            discount_type: self.pricing.discount_type,
            discount_value: self.pricing.discount_value,
            margin_pct: self.pricing.margin_pct,
            packing_charge: self.pricing.packing_charge,
        }
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(pricing) = patch.pricing {
            if let Some(currency_symbol) = pricing.currency_symbol {
                self.pricing.currency_symbol = currency_symbol;
            }
            if let Some(tax_rate_pct) = pricing.tax_rate_pct {
                self.pricing.tax_rate_pct = tax_rate_pct;
            }
            if let Some(margin_pct) = pricing.margin_pct {
                self.pricing.margin_pct = margin_pct;
            }
            if let Some(packing_charge) = pricing.packing_charge {
                self.pricing.packing_charge = packing_charge;
            }
            if let Some(discount_type) = pricing.discount_type {
                self.pricing.discount_type = discount_type;
            }
            if let Some(discount_value) = pricing.discount_value {
                self.pricing.discount_value = discount_value;
            }
            if let Some(pipeline) = pricing.pipeline {
                self.pricing.pipeline = pipeline;
            }
            if let Some(input_policy) = pricing.input_policy {
                self.pricing.input_policy = input_policy;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PRESSQUOTE_PRICING_CURRENCY_SYMBOL") {
            self.pricing.currency_symbol = value;
        }
        if let Some(value) = read_env("PRESSQUOTE_PRICING_TAX_RATE_PCT") {
            self.pricing.tax_rate_pct = parse_decimal("PRESSQUOTE_PRICING_TAX_RATE_PCT", &value)?;
        }
        if let Some(value) = read_env("PRESSQUOTE_PRICING_MARGIN_PCT") {
            self.pricing.margin_pct = parse_decimal("PRESSQUOTE_PRICING_MARGIN_PCT", &value)?;
        }
        if let Some(value) = read_env("PRESSQUOTE_PRICING_PACKING_CHARGE") {
            self.pricing.packing_charge =
                parse_decimal("PRESSQUOTE_PRICING_PACKING_CHARGE", &value)?;
        }
        if let Some(value) = read_env("PRESSQUOTE_PRICING_DISCOUNT_TYPE") {
            self.pricing.discount_type = parse_with("PRESSQUOTE_PRICING_DISCOUNT_TYPE", &value)?;
        }
        if let Some(value) = read_env("PRESSQUOTE_PRICING_DISCOUNT_VALUE") {
            self.pricing.discount_value =
                parse_decimal("PRESSQUOTE_PRICING_DISCOUNT_VALUE", &value)?;
        }
        if let Some(value) = read_env("PRESSQUOTE_PRICING_PIPELINE") {
            self.pricing.pipeline = parse_with("PRESSQUOTE_PRICING_PIPELINE", &value)?;
        }
        if let Some(value) = read_env("PRESSQUOTE_PRICING_INPUT_POLICY") {
            self.pricing.input_policy = parse_with("PRESSQUOTE_PRICING_INPUT_POLICY", &value)?;
        }

        let log_level =
            read_env("PRESSQUOTE_LOGGING_LEVEL").or_else(|| read_env("PRESSQUOTE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PRESSQUOTE_LOGGING_FORMAT").or_else(|| read_env("PRESSQUOTE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(pipeline) = overrides.pipeline {
            self.pricing.pipeline = pipeline;
        }
        if let Some(input_policy) = overrides.input_policy {
            self.pricing.input_policy = input_policy;
        }
        if let Some(tax_rate_pct) = overrides.tax_rate_pct {
            self.pricing.tax_rate_pct = tax_rate_pct;
        }
        if let Some(currency_symbol) = overrides.currency_symbol {
            self.pricing.currency_symbol = currency_symbol;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_pricing(&self.pricing)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("pressquote.toml"), PathBuf::from("config/pressquote.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_pricing(pricing: &PricingConfig) -> Result<(), ConfigError> {
    if !in_percent_range(pricing.tax_rate_pct) {
        return Err(ConfigError::Validation(
            "pricing.tax_rate_pct must be in range 0..=100".to_string(),
        ));
    }

    if !in_percent_range(pricing.margin_pct) {
        return Err(ConfigError::Validation(
            "pricing.margin_pct must be in range 0..=100".to_string(),
        ));
    }

    if pricing.packing_charge < Decimal::ZERO {
        return Err(ConfigError::Validation(
            "pricing.packing_charge must not be negative".to_string(),
        ));
    }

    if pricing.discount_value < Decimal::ZERO {
        return Err(ConfigError::Validation(
            "pricing.discount_value must not be negative".to_string(),
        ));
    }

    if pricing.currency_symbol.chars().count() > 4 {
        return Err(ConfigError::Validation(
            "pricing.currency_symbol must be at most 4 characters".to_string(),
        ));
    }

    Ok(())
}

fn in_percent_range(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE_HUNDRED
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    value.trim().parse::<Decimal>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_with<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    pricing: Option<PricingPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    currency_symbol: Option<String>,
    tax_rate_pct: Option<Decimal>,
    margin_pct: Option<Decimal>,
    packing_charge: Option<Decimal>,
    discount_type: Option<DiscountType>,
    discount_value: Option<Decimal>,
    pipeline: Option<PricingPipeline>,
    input_policy: Option<InputPolicy>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
    use crate::cpq::validation::InputPolicy;
    use crate::domain::settings::{DiscountType, PricingPipeline};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_validate_and_build_settings() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;
        let settings = config.default_settings();

        ensure(settings.tax_rate_pct == Decimal::new(18, 0), "default tax rate should be 18%")?;
        ensure(settings.discount_type == DiscountType::None, "no discount by default")?;
        ensure(config.pricing.pipeline == PricingPipeline::Builder, "builder pipeline default")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_PRESSQUOTE_TAX", "12");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("pressquote.toml");
            fs::write(
                &path,
                r#"
[pricing]
tax_rate_pct = ${TEST_PRESSQUOTE_TAX}
discount_type = "percentage"
discount_value = 5
input_policy = "strict"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.pricing.tax_rate_pct == Decimal::new(12, 0),
                "tax rate should be interpolated from environment",
            )?;
            ensure(
                config.pricing.discount_type == DiscountType::Percentage,
                "discount type should be read from file",
            )?;
            ensure(config.pricing.input_policy == InputPolicy::Strict, "strict policy from file")
        })();

        clear_vars(&["TEST_PRESSQUOTE_TAX"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("PRESSQUOTE_LOG_LEVEL", "warn");
        env::set_var("PRESSQUOTE_LOG_FORMAT", "json");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Json),
                "json logging format should be set from env var",
            )
        })();

        clear_vars(&["PRESSQUOTE_LOG_LEVEL", "PRESSQUOTE_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("PRESSQUOTE_PRICING_MARGIN_PCT", "15");
        env::set_var("PRESSQUOTE_PRICING_PIPELINE", "simple");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("pressquote.toml");
            fs::write(
                &path,
                r#"
[pricing]
margin_pct = 8
tax_rate_pct = 5
currency_symbol = "$"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    pipeline: Some(PricingPipeline::Builder),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.pricing.margin_pct == Decimal::new(15, 0), "env margin should win")?;
            ensure(config.pricing.tax_rate_pct == Decimal::new(5, 0), "file tax rate applies")?;
            ensure(config.pricing.currency_symbol == "$", "file currency symbol applies")?;
            ensure(
                config.pricing.pipeline == PricingPipeline::Builder,
                "override pipeline should win over env",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")
        })();

        clear_vars(&["PRESSQUOTE_PRICING_MARGIN_PCT", "PRESSQUOTE_PRICING_PIPELINE"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("PRESSQUOTE_PRICING_TAX_RATE_PCT", "140");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("pricing.tax_rate_pct")
            );
            ensure(has_message, "validation failure should mention pricing.tax_rate_pct")
        })();

        clear_vars(&["PRESSQUOTE_PRICING_TAX_RATE_PCT"]);
        result
    }

    #[test]
    fn malformed_env_override_is_reported_with_key() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("PRESSQUOTE_PRICING_INPUT_POLICY", "paranoid");

        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("expected invalid override error".to_string()),
            Err(ConfigError::InvalidEnvOverride { key, .. }) => {
                ensure(key == "PRESSQUOTE_PRICING_INPUT_POLICY", "error should name the env key")
            }
            Err(other) => Err(format!("unexpected error: {other}")),
        };

        clear_vars(&["PRESSQUOTE_PRICING_INPUT_POLICY"]);
        result
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let missing = dir.path().join("absent.toml");
        let result = AppConfig::load(LoadOptions {
            config_path: Some(missing),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "missing required file should fail",
        )
    }
}
