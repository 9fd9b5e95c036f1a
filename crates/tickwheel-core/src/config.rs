use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Default tick interval for the local wheel, in milliseconds.
pub const DEFAULT_TICK_MS: u64 = 1_000;
/// Default slot count for the local wheel.
pub const DEFAULT_SLOTS: usize = 10;

/// Top-level config (tickwheel.toml + TICKWHEEL_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TickwheelConfig {
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub local: LocalWheelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalWheelConfig {
    #[serde(default = "default_slots")]
    pub slots: usize,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for LocalWheelConfig {
    fn default() -> Self {
        Self {
            slots: DEFAULT_SLOTS,
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}
fn default_slots() -> usize {
    DEFAULT_SLOTS
}
fn default_tick_ms() -> u64 {
    DEFAULT_TICK_MS
}

impl TickwheelConfig {
    /// Load config from a TOML file with TICKWHEEL_* env var overrides.
    ///
    /// A missing file is not an error — every field has a default.
    pub fn load(config_path: Option<&str>) -> Result<Self, figment::Error> {
        let path = config_path.unwrap_or("tickwheel.toml");

        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("TICKWHEEL_").split("_"))
            .extract()
    }
}
