//! SDK configuration decoded from the `initialize` call
//!
//! Decoding is tolerant: every optional key is read defensively and skipped
//! when it is absent or carries a value of the wrong type. Only the CDP API
//! key is required.

use crate::{BridgeError, BridgeResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Untyped argument map as received from the caller
pub type Arguments = Map<String, Value>;

/// Typed, tolerant access to an argument map
pub trait ArgumentsExt {
    /// Get a typed value, or `None` when absent or of the wrong type
    fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T>;

    /// Borrow a string value
    fn get_str(&self, key: &str) -> Option<&str>;

    /// Borrow a string value, treating blank strings as absent
    fn get_non_blank(&self, key: &str) -> Option<&str>;

    /// Borrow a nested map
    fn get_map(&self, key: &str) -> Option<&Arguments>;

    /// Borrow a nested map, treating empty maps as absent
    fn get_non_empty_map(&self, key: &str) -> Option<&Arguments>;

    /// Get a string that must be present
    fn require_str(&self, key: &str) -> BridgeResult<String>;
}

impl ArgumentsExt for Arguments {
    fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| T::deserialize(v).ok())
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    fn get_non_blank(&self, key: &str) -> Option<&str> {
        self.get_str(key).filter(|s| !s.trim().is_empty())
    }

    fn get_map(&self, key: &str) -> Option<&Arguments> {
        self.get(key).and_then(Value::as_object)
    }

    fn get_non_empty_map(&self, key: &str) -> Option<&Arguments> {
        self.get_map(key).filter(|m| !m.is_empty())
    }

    fn require_str(&self, key: &str) -> BridgeResult<String> {
        self.get_str(key)
            .map(str::to_string)
            .ok_or_else(|| BridgeError::MissingArgument(key.to_string()))
    }
}

/// Data center region of the workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Region {
    #[default]
    US,
    EU,
}

impl Region {
    /// Resolve a region code, falling back to [`Region::US`] for unknown codes
    pub fn from_code(code: &str) -> Self {
        if code.trim().eq_ignore_ascii_case("eu") {
            Region::EU
        } else {
            Region::US
        }
    }

    /// Region code understood by the native SDKs
    pub fn code(&self) -> &'static str {
        match self {
            Region::US => "US",
            Region::EU => "EU",
        }
    }
}

/// Native SDK log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SdkLogLevel {
    None,
    Error,
    Info,
    Debug,
}

impl SdkLogLevel {
    /// Parse a level name case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Some(SdkLogLevel::None),
            "error" => Some(SdkLogLevel::Error),
            "info" => Some(SdkLogLevel::Info),
            "debug" => Some(SdkLogLevel::Debug),
            _ => None,
        }
    }

    /// Bridge log level matching this SDK level
    pub fn as_log_level(&self) -> crate::LogLevel {
        match self {
            SdkLogLevel::None => crate::LogLevel::Off,
            SdkLogLevel::Error => crate::LogLevel::Error,
            SdkLogLevel::Info => crate::LogLevel::Info,
            SdkLogLevel::Debug => crate::LogLevel::Debug,
        }
    }
}

/// Which screen events the SDK should forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenViewUse {
    /// Send screen events to destinations and use them for in-app targeting
    All,
    /// Only use screen events for in-app targeting
    InApp,
}

impl ScreenViewUse {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Some(ScreenViewUse::All),
            "inapp" => Some(ScreenViewUse::InApp),
            _ => None,
        }
    }
}

/// How the app is brought forward when a push notification is tapped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PushClickBehavior {
    ResetTaskStack,
    /// Default for embedded hosts, which must not restart their activity
    #[default]
    ActivityPreventRestart,
    ActivityNoFlags,
}

impl PushClickBehavior {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "RESET_TASK_STACK" => Some(PushClickBehavior::ResetTaskStack),
            "ACTIVITY_PREVENT_RESTART" => Some(PushClickBehavior::ActivityPreventRestart),
            "ACTIVITY_NO_FLAGS" => Some(PushClickBehavior::ActivityNoFlags),
            _ => None,
        }
    }
}

/// In-app messaging module configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InAppConfig {
    pub site_id: String,
    pub region: Region,
}

impl InAppConfig {
    /// Decode the `inApp` block; the region is inherited from the SDK config
    ///
    /// Returns `None` when the site ID is missing or blank.
    pub fn from_args(args: &Arguments, region: Region) -> Option<Self> {
        let site_id = args.get_non_blank("siteId")?;
        Some(Self {
            site_id: site_id.to_string(),
            region,
        })
    }
}

/// Push messaging module configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushConfig {
    pub push_click_behavior: PushClickBehavior,
}

impl PushConfig {
    /// Decode the `push` block, preferring the platform-specific `android` object
    pub fn from_args(args: &Arguments) -> Self {
        let push_click_behavior = args
            .get_map("android")
            .and_then(|android| android.get_non_blank("pushClickBehavior"))
            .and_then(PushClickBehavior::parse)
            .unwrap_or_default();
        Self {
            push_click_behavior,
        }
    }
}

/// Identity of the wrapping SDK reported to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdkClientInfo {
    pub source: String,
    pub version: String,
}

/// Full configuration passed to the native SDK on initialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdkConfig {
    pub cdp_api_key: String,
    pub migration_site_id: Option<String>,
    pub region: Option<Region>,
    pub log_level: Option<SdkLogLevel>,
    pub auto_track_device_attributes: Option<bool>,
    pub track_application_lifecycle_events: Option<bool>,
    pub flush_at: Option<u32>,
    /// Flush interval in seconds
    pub flush_interval: Option<f64>,
    pub api_host: Option<String>,
    pub cdn_host: Option<String>,
    pub screen_view_use: Option<ScreenViewUse>,
    pub in_app: Option<InAppConfig>,
    pub push: PushConfig,
    pub client: Option<SdkClientInfo>,
}

impl SdkConfig {
    /// Create a configuration with only the API key set
    pub fn new(cdp_api_key: impl Into<String>) -> Self {
        Self {
            cdp_api_key: cdp_api_key.into(),
            migration_site_id: None,
            region: None,
            log_level: None,
            auto_track_device_attributes: None,
            track_application_lifecycle_events: None,
            flush_at: None,
            flush_interval: None,
            api_host: None,
            cdn_host: None,
            screen_view_use: None,
            in_app: None,
            push: PushConfig::default(),
            client: None,
        }
    }

    /// Decode the `initialize` call payload
    pub fn from_args(args: &Arguments) -> BridgeResult<Self> {
        let cdp_api_key = args.get_non_blank("cdpApiKey").ok_or_else(|| {
            BridgeError::ConfigError("CDP API Key is required to initialize the SDK".to_string())
        })?;

        let region = args.get_str("region").map(Region::from_code);
        let in_app = args
            .get_map("inApp")
            .and_then(|in_app| InAppConfig::from_args(in_app, region.unwrap_or_default()));
        let push = args
            .get_map("push")
            .map(PushConfig::from_args)
            .unwrap_or_default();
        let client = match (args.get_str("source"), args.get_str("version")) {
            (Some(source), Some(version)) => Some(SdkClientInfo {
                source: source.to_string(),
                version: version.to_string(),
            }),
            _ => None,
        };

        Ok(Self {
            cdp_api_key: cdp_api_key.to_string(),
            migration_site_id: args.get_as("migrationSiteId"),
            region,
            log_level: args.get_str("logLevel").and_then(SdkLogLevel::parse),
            auto_track_device_attributes: args.get_as("autoTrackDeviceAttributes"),
            track_application_lifecycle_events: args.get_as("trackApplicationLifecycleEvents"),
            flush_at: args.get_as("flushAt"),
            flush_interval: args.get_as("flushInterval"),
            api_host: args.get_as("apiHost"),
            cdn_host: args.get_as("cdnHost"),
            screen_view_use: args.get_str("screenViewUse").and_then(ScreenViewUse::parse),
            in_app,
            push,
            client,
        })
    }

    /// Region in effect, defaulting to US
    pub fn effective_region(&self) -> Region {
        self.region.unwrap_or_default()
    }
}
