pub mod analyze;
pub mod build_kb;
pub mod catalog;
pub mod config;
pub mod doctor;
pub mod normalize;
pub mod score;
pub mod substitutes;

use std::fs;
use std::path::PathBuf;

use bottlescan_core::config::{AppConfig, LoadOptions};
use bottlescan_core::errors::{ApplicationError, DomainError};
use bottlescan_core::runtime::BottleScanRuntime;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome<T: Serialize> {
    command: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with::<()>(command, message, None)
    }

    pub fn success_with<T: Serialize>(
        command: &str,
        message: impl Into<String>,
        data: Option<T>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            correlation_id: None,
            data,
        };
        Self { exit_code: 0, output: serialize_payload(&payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome::<()> {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            correlation_id: None,
            data: None,
        };
        Self { exit_code, output: serialize_payload(&payload) }
    }

    /// Maps an application error through the boundary error type. Config
    /// problems exit with 2, everything else with 1.
    pub fn from_error(command: &str, error: ApplicationError) -> Self {
        let correlation_id = Uuid::new_v4().to_string();
        let error_class = error.error_class();
        let exit_code = match error {
            ApplicationError::Config(_) | ApplicationError::Configuration(_) => 2,
            ApplicationError::Domain(_) => 1,
        };
        let detail = error.to_string();
        let interface = error.into_interface(correlation_id.as_str());

        tracing::warn!(
            event_name = "cli.command.failed",
            command,
            error_class,
            correlation_id = interface.correlation_id(),
            "{detail}"
        );

        let payload = CommandOutcome::<()> {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: format!("{} {detail}", interface.user_message()),
            correlation_id: Some(correlation_id),
            data: None,
        };
        Self { exit_code, output: serialize_payload(&payload) }
    }
}

fn serialize_payload<T: Serialize>(payload: &CommandOutcome<T>) -> String {
    serde_json::to_string(payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Options shared by every command that needs configuration.
#[derive(Clone, Debug, Default)]
pub struct CommandContext {
    pub config_path: Option<PathBuf>,
}

impl CommandContext {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config_path.clone(),
            require_file: self.config_path.is_some(),
            ..LoadOptions::default()
        }
    }

    pub fn load_config(&self) -> Result<AppConfig, ApplicationError> {
        Ok(AppConfig::load(self.load_options())?)
    }

    pub fn load_runtime(&self) -> Result<BottleScanRuntime, ApplicationError> {
        let config = self.load_config()?;
        BottleScanRuntime::from_config(&config)
    }
}

/// Raw label input: inline text or a file read as bytes.
#[derive(Clone, Debug)]
pub enum TextSource {
    Inline(String),
    File(PathBuf),
}

impl TextSource {
    pub fn from_args(text: Option<String>, file: Option<PathBuf>) -> Result<Self, ApplicationError> {
        match (text, file) {
            (Some(text), None) => Ok(Self::Inline(text)),
            (None, Some(file)) => Ok(Self::File(file)),
            (Some(_), Some(_)) => {
                Err(DomainError::Input("pass either --text or --file, not both".to_owned()).into())
            }
            (None, None) => {
                Err(DomainError::Input("one of --text or --file is required".to_owned()).into())
            }
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>, ApplicationError> {
        match self {
            Self::Inline(text) => Ok(text.into_bytes()),
            Self::File(path) => fs::read(&path).map_err(|error| {
                DomainError::Input(format!("failed to read `{}`: {error}", path.display())).into()
            }),
        }
    }

    pub fn into_text(self) -> Result<String, ApplicationError> {
        String::from_utf8(self.into_bytes()?).map_err(|error| {
            DomainError::Input(format!("label text is not valid UTF-8: {error}")).into()
        })
    }
}
