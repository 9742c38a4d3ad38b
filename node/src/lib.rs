use clap::{ArgAction, Parser};
use std::{fmt, str::FromStr, time::Duration};
use suitwatch_execution::{
    DailySchedule, EngineConfig, ResetScope, RulePolicy, ScheduleError, StoreConfig,
};
use suitwatch_types::{
    SuitPairing, DEFAULT_MAX_ACTIVE, DEFAULT_PREDICTION_OFFSET, DEFAULT_PROXIMITY_THRESHOLD,
    HOURLY_RESET_SECS,
};
use thiserror::Error;
use tracing::Level;
use url::Url;

pub mod commands;
pub mod engine;
pub mod server;
pub mod transport;


/// Channel ids given without their sign have at least this many digits.
const CHANNEL_ID_MIN_DIGITS: usize = 10;

/// Configuration read from flags or the environment.
#[derive(Parser, Clone)]
#[command(name = "suitwatch-node", version, about = "Missing-suit prediction bot.")]
pub struct Config {
    /// Bot API token.
    #[arg(long, env = "BOT_TOKEN", default_value = "", hide_env_values = true)]
    pub bot_token: String,

    /// Feed channel whose finalized results are watched.
    #[arg(long, env = "SOURCE_CHANNEL_ID", default_value = "0", allow_hyphen_values = true)]
    pub source_channel_id: String,

    /// Channel where predictions are announced.
    #[arg(long, env = "PREDICTION_CHANNEL_ID", default_value = "0", allow_hyphen_values = true)]
    pub prediction_channel_id: String,

    /// Operator user id; 0 leaves restricted commands open.
    #[arg(long, env = "ADMIN_ID", default_value_t = 0)]
    pub admin_id: i64,

    /// Port of the health server.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    #[arg(long, env = "API_BASE_URL", default_value = "https://api.telegram.org")]
    pub api_base_url: String,

    #[arg(long, env = "MAX_ACTIVE", default_value_t = DEFAULT_MAX_ACTIVE)]
    pub max_active: usize,

    #[arg(long, env = "PROXIMITY_THRESHOLD", default_value_t = DEFAULT_PROXIMITY_THRESHOLD)]
    pub proximity_threshold: u64,

    #[arg(long, env = "PREDICTION_OFFSET", default_value_t = DEFAULT_PREDICTION_OFFSET)]
    pub prediction_offset: u64,

    /// `paired` or `single`.
    #[arg(long, env = "RULE_POLICY", default_value = "paired")]
    pub rule_policy: String,

    /// `color` or `alternate`.
    #[arg(long, env = "SUIT_PAIRING", default_value = "color")]
    pub suit_pairing: String,

    /// `safety-net` or `full`.
    #[arg(long, env = "HOURLY_RESET_SCOPE", default_value = "safety-net")]
    pub hourly_reset_scope: String,

    /// Local time of the daily reset, `HH:MM`.
    #[arg(long, env = "RESET_TIME", default_value = "00:59")]
    pub reset_time: String,

    #[arg(
        long,
        env = "RESET_UTC_OFFSET_MINUTES",
        default_value_t = 60,
        allow_hyphen_values = true
    )]
    pub reset_utc_offset_minutes: i32,

    /// Relay every finalized feed message to the operator.
    #[arg(long, env = "FORWARD_TO_OPERATOR", default_value_t = true, action = ArgAction::Set)]
    pub forward_to_operator: bool,

    #[arg(long, env = "POLL_TIMEOUT_SECS", default_value_t = 30)]
    pub poll_timeout_secs: u64,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "LOG_JSON", default_value_t = false, action = ArgAction::Set)]
    pub log_json: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be set")]
    MissingCredential { field: &'static str },
    #[error("{field} is not a valid chat id: {value:?}")]
    InvalidChannelId { field: &'static str, value: String },
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: u64 },
    #[error("{field} must be a valid URL: {value}")]
    InvalidUrl { field: &'static str, value: String },
    #[error("{field} URL scheme must be http or https: {value}")]
    InvalidUrlScheme { field: &'static str, value: String },
    #[error("{field}: {reason}")]
    InvalidChoice { field: &'static str, reason: String },
    #[error("invalid reset schedule: {0}")]
    InvalidSchedule(#[from] ScheduleError),
}

pub struct ValidatedConfig {
    pub bot_token: String,
    pub api_base_url: Url,
    pub port: u16,
    pub poll_timeout: Duration,
    pub log_level: Level,
    pub log_json: bool,
    pub engine: engine::Config,
}

struct RedactedConfig<'a>(&'a Config);

impl fmt::Debug for RedactedConfig<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cfg = self.0;
        f.debug_struct("Config")
            .field("bot_token", &"<redacted>")
            .field("source_channel_id", &cfg.source_channel_id)
            .field("prediction_channel_id", &cfg.prediction_channel_id)
            .field("admin_id", &cfg.admin_id)
            .field("port", &cfg.port)
            .field("api_base_url", &cfg.api_base_url)
            .field("max_active", &cfg.max_active)
            .field("proximity_threshold", &cfg.proximity_threshold)
            .field("prediction_offset", &cfg.prediction_offset)
            .field("rule_policy", &cfg.rule_policy)
            .field("suit_pairing", &cfg.suit_pairing)
            .field("hourly_reset_scope", &cfg.hourly_reset_scope)
            .field("reset_time", &cfg.reset_time)
            .field("reset_utc_offset_minutes", &cfg.reset_utc_offset_minutes)
            .field("forward_to_operator", &cfg.forward_to_operator)
            .field("poll_timeout_secs", &cfg.poll_timeout_secs)
            .field("log_level", &cfg.log_level)
            .field("log_json", &cfg.log_json)
            .finish()
    }
}

/// Parse a chat id, restoring the sign of channel ids written without it.
pub fn parse_channel_id(field: &'static str, value: &str) -> Result<i64, ConfigError> {
    let trimmed = value.trim();
    let id: i64 = trimmed.parse().map_err(|_| ConfigError::InvalidChannelId {
        field,
        value: value.to_string(),
    })?;
    if id == 0 {
        return Err(ConfigError::InvalidChannelId {
            field,
            value: value.to_string(),
        });
    }
    if id > 0 && trimmed.trim_start_matches('+').len() >= CHANNEL_ID_MIN_DIGITS {
        return Ok(-id);
    }
    Ok(id)
}

fn ensure_nonzero(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidNonZero { field, value });
    }
    Ok(())
}

fn parse_choice<T: FromStr<Err = String>>(field: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|reason| ConfigError::InvalidChoice { field, reason })
}

fn validate_http_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|_| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => {}
        _ => {
            return Err(ConfigError::InvalidUrlScheme {
                field,
                value: value.to_string(),
            })
        }
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
    Ok(url)
}

impl Config {
    pub fn redacted_debug(&self) -> impl fmt::Debug + '_ {
        RedactedConfig(self)
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        let bot_token = self.bot_token.trim().to_string();
        if bot_token.is_empty() {
            return Err(ConfigError::MissingCredential { field: "BOT_TOKEN" });
        }
        let source_channel = parse_channel_id("source_channel_id", &self.source_channel_id)?;
        let prediction_channel =
            parse_channel_id("prediction_channel_id", &self.prediction_channel_id)?;
        let operator = (self.admin_id != 0).then_some(self.admin_id);

        ensure_nonzero("max_active", self.max_active as u64)?;
        ensure_nonzero("proximity_threshold", self.proximity_threshold)?;
        ensure_nonzero("prediction_offset", self.prediction_offset)?;
        ensure_nonzero("poll_timeout_secs", self.poll_timeout_secs)?;

        let policy: RulePolicy = parse_choice("rule_policy", &self.rule_policy)?;
        let pairing: SuitPairing = parse_choice("suit_pairing", &self.suit_pairing)?;
        let hourly_scope: ResetScope = parse_choice("hourly_reset_scope", &self.hourly_reset_scope)?;
        let daily = DailySchedule::parse(&self.reset_time, self.reset_utc_offset_minutes)?;
        let api_base_url = validate_http_url("api_base_url", &self.api_base_url)?;
        let log_level =
            Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel {
                value: self.log_level.clone(),
            })?;

        let core = EngineConfig {
            store: StoreConfig {
                max_active: self.max_active,
                proximity_threshold: self.proximity_threshold,
                offset: self.prediction_offset,
                pairing,
            },
            policy,
            forward_to_operator: self.forward_to_operator && operator.is_some(),
        };

        Ok(ValidatedConfig {
            bot_token,
            api_base_url,
            port: self.port,
            poll_timeout: Duration::from_secs(self.poll_timeout_secs),
            log_level,
            log_json: self.log_json,
            engine: engine::Config {
                core,
                source_channel,
                prediction_channel,
                operator,
                hourly_interval: Duration::from_secs(HOURLY_RESET_SECS),
                hourly_scope,
                daily,
            },
        })
    }
}
