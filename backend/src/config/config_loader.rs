use anyhow::{Context, Result};

use super::config_model::{BackendServer, Billing, Database, DotEnvyConfig, JwtSecret};

const DEFAULT_TRIAL_DAYS: i64 = 14;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required("SERVER_PORT_BACKEND")?
            .parse()
            .context("SERVER_PORT_BACKEND is invalid")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        max_connections: optional("DATABASE_MAX_CONNECTIONS")
            .map(|raw| raw.parse())
            .transpose()
            .context("DATABASE_MAX_CONNECTIONS is invalid")?
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
    };

    let trial_days = optional("TRIAL_DAYS")
        .map(|raw| raw.parse::<i64>())
        .transpose()
        .context("TRIAL_DAYS is invalid")?
        .unwrap_or(DEFAULT_TRIAL_DAYS);
    anyhow::ensure!(trial_days > 0, "TRIAL_DAYS must be positive");

    Ok(DotEnvyConfig {
        backend_server,
        database,
        billing: Billing { trial_days },
    })
}

pub fn get_jwt_secret() -> Result<JwtSecret> {
    dotenvy::dotenv().ok();

    Ok(JwtSecret {
        secret: required("JWT_SECRET")?,
    })
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is invalid"))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
