use std::{net::SocketAddr, time::Duration};

#[derive(Clone, Debug, PartialEq)]
pub enum Env {
    Dev,
    Staging,
    Production,
}

pub struct ServerConfig {
    pub env: Env,
    pub database_url: String,
    pub database_pool_size: usize,
    pub bind_addr: SocketAddr,
    /// Where a freshly started practice session is sent to be attempted
    pub attempt_url: String,
    pub start_quiz_guard: Duration,
    pub cors_allowed_origins: Vec<String>,
}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_ATTEMPT_URL: &str = "/mod/studentquiz/attempt.php";
const DEFAULT_POOL_SIZE: usize = 10;
const DEFAULT_START_QUIZ_GUARD_SECS: u64 = 5;

fn var(key: &str) -> Result<Option<String>, String> {
    match std::env::var(key) {
        Ok(env) => Ok(Some(env)),
        Err(e) => match e {
            std::env::VarError::NotPresent => {
                tracing::debug!("Missing environment variable `{key}`, using default");
                Ok(None)
            }
            std::env::VarError::NotUnicode(_) => Err(format!(
                "Could not get the environment variable `{key}` due to unicode error"
            )),
        },
    }
}

fn required_var(key: &str) -> String {
    let val = var(key);
    match val {
        Ok(val) => match val {
            Some(val) => val,
            None => {
                tracing::error!("Environment variable `{key}` is required");
                std::process::exit(1)
            }
        },
        Err(e) => {
            tracing::error!(
                "Environment variable `{key}` is required, but could not retrieve: {e}"
            );
            std::process::exit(1)
        }
    }
}

/// Parses an optional variable, falling back to `default` when it is unset or
/// cannot be parsed.
fn parsed_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    match var(key) {
        Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Environment variable `{key}` has an invalid value `{raw}`, using default");
            default
        }),
        _ => default,
    }
}

fn parse_env(raw: Option<&str>) -> Env {
    match raw {
        Some("dev") => Env::Dev,
        Some("staging") => Env::Staging,
        Some("production") => Env::Production,
        _ => Env::Dev,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

/// The deployment environment, from `ENVIRONMENT`.
pub fn current_env() -> Env {
    parse_env(var("ENVIRONMENT").ok().flatten().as_deref())
}

impl ServerConfig {
    pub fn new_from_env() -> Self {
        let bind_addr = parsed_var(
            "BIND_ADDR",
            DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or(SocketAddr::from(([0, 0, 0, 0], 3000))),
        );

        ServerConfig {
            env: current_env(),
            database_url: required_var("DATABASE_URL"),
            database_pool_size: parsed_var("DATABASE_POOL_SIZE", DEFAULT_POOL_SIZE).max(1),
            bind_addr,
            attempt_url: var("ATTEMPT_URL")
                .ok()
                .flatten()
                .unwrap_or_else(|| DEFAULT_ATTEMPT_URL.into()),
            start_quiz_guard: Duration::from_secs(parsed_var(
                "START_QUIZ_GUARD_SECS",
                DEFAULT_START_QUIZ_GUARD_SECS,
            )),
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS")
                .ok()
                .flatten()
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
        }
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        ServerConfig {
            env: Env::Dev,
            database_url: String::new(),
            database_pool_size: 1,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            attempt_url: DEFAULT_ATTEMPT_URL.into(),
            start_quiz_guard: Duration::from_secs(DEFAULT_START_QUIZ_GUARD_SECS),
            cors_allowed_origins: vec![],
        }
    }
}
