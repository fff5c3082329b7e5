//! Log configuration for the `vman` binary.
//!
//! Options come from `VMAN_LOG_FORMAT` / `VMAN_LOG_LEVEL`, overridden by the
//! `--log-format` / `--log-level` flags. `RUST_LOG`, when set, replaces the
//! level filter entirely.

use std::fmt;
use std::io::IsTerminal;
use std::str::FromStr;

pub const FORMAT_VAR: &str = "VMAN_LOG_FORMAT";
pub const LEVEL_VAR: &str = "VMAN_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log {kind} '{value}'")]
pub struct UnknownLogSetting {
    kind: &'static str,
    value: String,
}

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Text when stderr is a terminal, JSON when it is captured.
    Auto,
    Text,
    Json,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Auto => "auto",
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        }
    }
}

impl FromStr for LogFormat {
    type Err = UnknownLogSetting;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(UnknownLogSetting {
                kind: "format",
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Least severe level that is still recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = UnknownLogSetting;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(UnknownLogSetting {
                kind: "level",
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effective log configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    pub format: LogFormat,
    pub level: LogLevel,
}

impl LogOptions {
    /// Program output owns stdout; stderr only carries warnings and worse
    /// unless asked otherwise.
    pub const DEFAULT: Self = Self {
        format: LogFormat::Auto,
        level: LogLevel::Warn,
    };

    /// Defaults overlaid with whatever `lookup` returns for the `VMAN_LOG_*`
    /// variables. Unparseable values are ignored with a note on stderr.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::DEFAULT;
        if let Some(format) = lookup(FORMAT_VAR).and_then(|v| parse_var(FORMAT_VAR, &v)) {
            options.format = format;
        }
        if let Some(level) = lookup(LEVEL_VAR).and_then(|v| parse_var(LEVEL_VAR, &v)) {
            options.level = level;
        }
        options
    }

    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Replace `Auto` with a concrete format for the given stderr.
    pub fn resolved_for(self, stderr_is_terminal: bool) -> Self {
        let format = match self.format {
            LogFormat::Auto if stderr_is_terminal => LogFormat::Text,
            LogFormat::Auto => LogFormat::Json,
            other => other,
        };
        Self { format, ..self }
    }

    pub fn resolved(self) -> Self {
        self.resolved_for(std::io::stderr().is_terminal())
    }
}

impl Default for LogOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn parse_var<T: FromStr<Err = UnknownLogSetting>>(name: &str, value: &str) -> Option<T> {
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            // The subscriber is not installed yet.
            eprintln!("warning: ignoring {name}: {e}");
            None
        }
    }
}

/// Flag overrides; `None` keeps the environment's choice.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    pub format: Option<LogFormat>,
    pub level: Option<LogLevel>,
}

impl LogSettings {
    pub fn apply_to(self, base: LogOptions) -> LogOptions {
        LogOptions {
            format: self.format.unwrap_or(base.format),
            level: self.level.unwrap_or(base.level),
        }
    }

    pub fn merged_with_env(self) -> LogOptions {
        self.apply_to(LogOptions::from_env())
    }
}
