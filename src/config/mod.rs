use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::geo::{DEFAULT_DECIMALS, MAX_DECIMALS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// 未设置时使用内存记录源
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// 未设置时不启用消息缓存
    pub redis_url: Option<String>,
    pub message_cache_ttl_secs: u64,
    /// 粗坐标保留的小数位数，写入方与查询方必须一致
    pub broad_coordinate_decimals: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_host: "0.0.0.0".into(),
            server_port: 3000,
            database_url: None,
            database_max_connections: 10,
            redis_url: None,
            message_cache_ttl_secs: 300,
            broad_coordinate_decimals: DEFAULT_DECIMALS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源读取配置，未设置的键使用默认值
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();
        // 空字符串等同于未设置
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let broad_coordinate_decimals = parse_or(&get, "BROAD_COORDINATE_DECIMALS", defaults.broad_coordinate_decimals)?;
        if broad_coordinate_decimals > MAX_DECIMALS {
            return Err(ConfigError::Invalid {
                key: "BROAD_COORDINATE_DECIMALS",
                value: broad_coordinate_decimals.to_string(),
            });
        }

        Ok(Config {
            server_host: get("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_or(&get, "SERVER_PORT", defaults.server_port)?,
            database_url: get("DATABASE_URL"),
            database_max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", defaults.database_max_connections)?,
            redis_url: get("REDIS_URL"),
            message_cache_ttl_secs: parse_or(&get, "MESSAGE_CACHE_TTL", defaults.message_cache_ttl_secs)?,
            broad_coordinate_decimals,
        })
    }

    pub fn message_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.message_cache_ttl_secs)
    }
}

fn parse_or<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}
