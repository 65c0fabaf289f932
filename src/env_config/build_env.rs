use super::models::app_env::{AppEnv, Env};
use std::env;
use std::str::FromStr;

impl AppEnv {
    pub fn new() -> AppEnv {
        AppEnv {
            env: Env::from_str(&get_env_var_or("ENV", "local")).expect("Unknown environment"),
            clickhouse_url: get_env_var_or("CLICKHOUSE_HOST", "http://localhost:8123"),
            clickhouse_user: get_env_var_or("CLICKHOUSE_USER", "default"),
            clickhouse_password: get_env_var_or("CLICKHOUSE_PASSWORD", ""),
            clickhouse_database: get_env_var_or("CLICKHOUSE_DATABASE", "market_data"),
        }
    }
}

impl Default for AppEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn get_env_var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}
