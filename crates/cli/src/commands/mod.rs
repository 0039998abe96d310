pub mod check;
pub mod config;
pub mod shop;
pub mod stats;

use serde::Serialize;
use vitrine_core::config::{AppConfig, LoadOptions};
use vitrine_core::{ApplicationError, Catalog, ImportOutcome};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError, exit_code: u8) -> Self {
        Self::failure(command, error.error_class(), error.to_string(), exit_code)
    }
}

/// Loads configuration and imports the catalog it points at.
pub(crate) fn load_catalog(
    command: &str,
    options: LoadOptions,
) -> Result<(AppConfig, ImportOutcome), CommandResult> {
    let config = AppConfig::load(options).map_err(|error| {
        let error = ApplicationError::Configuration(error.to_string());
        CommandResult::from_error(command, &error, 2)
    })?;

    let outcome = Catalog::load(&config.catalog.data_path, config.catalog.import_policy)
        .map_err(|error| {
            let error = ApplicationError::Import(error.to_string());
            CommandResult::from_error(command, &error, 3)
        })?;

    Ok((config, outcome))
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
