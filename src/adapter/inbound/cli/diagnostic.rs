//! Miette-based error presentation for the binary.

use miette::Diagnostic;
use thiserror::Error;

use crate::error::{ConfigError, Error};

/// Top-level CLI failure with a help suggestion where one applies.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(cyclarb::cli))]
pub struct CliError {
    pub message: String,

    #[help]
    pub help: Option<String>,
}

impl CliError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            help: None,
        }
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl From<Error> for CliError {
    fn from(err: Error) -> Self {
        let help = match &err {
            Error::Config(ConfigError::ReadFile(_)) => {
                Some("pass the configuration file with --config <path>")
            }
            Error::Config(ConfigError::Parse(_)) => Some("check the TOML syntax of the config file"),
            Error::Config(ConfigError::UnknownToken { .. }) => {
                Some("declare every symbol used in paths or the catalog under [[tokens]]")
            }
            Error::Url(_) => Some("check [venue] base_url and balance_url"),
            _ => None,
        };
        let cli = Self::new(err.to_string());
        match help {
            Some(help) => cli.with_help(help),
            None => cli,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_token_gets_help() {
        let err: CliError = Error::from(ConfigError::UnknownToken {
            field: "paths.tokens",
            symbol: "BONK".into(),
        })
        .into();
        assert!(err.message.contains("BONK"));
        assert!(err.help.is_some());
    }

    #[test]
    fn test_other_errors_have_no_help() {
        let err: CliError = Error::from(ConfigError::MissingField { field: "tokens" }).into();
        assert!(err.help.is_none());
    }
}
