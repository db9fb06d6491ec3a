use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use pressquote_core::config::{AppConfig, LoadOptions};
use pressquote_core::ApplicationError;
use toml::Value;

use crate::commands::CommandResult;

/// Prints the effective configuration as plain text, or a JSON failure
/// payload with the config exit code when the configuration is invalid.
pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            let error = ApplicationError::Configuration(error.to_string());
            return CommandResult::failure("config", error, "config");
        }
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_key: &str| {
        field_source(key_path, &[env_key], config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let pricing = &config.pricing;
    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    let entries = [
        (
            "pricing.currency_symbol",
            pricing.currency_symbol.clone(),
            "PRESSQUOTE_PRICING_CURRENCY_SYMBOL",
        ),
        (
            "pricing.tax_rate_pct",
            pricing.tax_rate_pct.to_string(),
            "PRESSQUOTE_PRICING_TAX_RATE_PCT",
        ),
        ("pricing.margin_pct", pricing.margin_pct.to_string(), "PRESSQUOTE_PRICING_MARGIN_PCT"),
        (
            "pricing.packing_charge",
            pricing.packing_charge.to_string(),
            "PRESSQUOTE_PRICING_PACKING_CHARGE",
        ),
        (
            "pricing.discount_type",
            format!("{:?}", pricing.discount_type),
            "PRESSQUOTE_PRICING_DISCOUNT_TYPE",
        ),
        (
            "pricing.discount_value",
            pricing.discount_value.to_string(),
            "PRESSQUOTE_PRICING_DISCOUNT_VALUE",
        ),
        ("pricing.pipeline", pricing.pipeline.to_string(), "PRESSQUOTE_PRICING_PIPELINE"),
        (
            "pricing.input_policy",
            format!("{:?}", pricing.input_policy),
            "PRESSQUOTE_PRICING_INPUT_POLICY",
        ),
    ];
    for (key_path, value, env_key) in entries {
        lines.push(render_line(key_path, &value, source(key_path, env_key)));
    }

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        field_source(
            "logging.level",
            &["PRESSQUOTE_LOGGING_LEVEL", "PRESSQUOTE_LOG_LEVEL"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        field_source(
            "logging.format",
            &["PRESSQUOTE_LOGGING_FORMAT", "PRESSQUOTE_LOG_FORMAT"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("pressquote.toml"), PathBuf::from("config/pressquote.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::{contains_path, field_source};

    #[test]
    fn nested_keys_are_found_in_config_doc() {
        let doc: Value = "[pricing]\ntax_rate_pct = 12\n".parse().expect("toml doc");

        assert!(contains_path(&doc, "pricing.tax_rate_pct"));
        assert!(!contains_path(&doc, "pricing.margin_pct"));
        assert!(!contains_path(&doc, "logging.level"));
    }

    #[test]
    fn unset_keys_fall_back_to_default_source() {
        let doc: Value = "[logging]\nlevel = \"warn\"\n".parse().expect("toml doc");

        assert_eq!(
            field_source("pricing.margin_pct", &["PRESSQUOTE_TEST_UNSET_KEY"], Some(&doc), None),
            "default"
        );
        assert_eq!(
            field_source("logging.level", &["PRESSQUOTE_TEST_UNSET_KEY"], Some(&doc), None),
            "file (config file)"
        );
    }
}
