#[derive(Clone, Debug, PartialEq)]
pub enum Env {
    Dev,
    Staging,
    Production,
}

impl Env {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("dev") => Env::Dev,
            Some("staging") => Env::Staging,
            Some("production") => Env::Production,
            _ => Env::Dev,
        }
    }
}

#[derive(Debug)]
pub struct ServerConfig {
    pub env: Env,
    pub database_url: String,
    pub database_pool_size: usize,
    pub port: u16,
    pub cors_allowed_origin: Option<String>,
}

const DEFAULT_POOL_SIZE: usize = 10;
const DEFAULT_PORT: u16 = 3000;

fn var(key: &str) -> Result<Option<String>, String> {
    match std::env::var(key) {
        Ok(env) => Ok(Some(env)),
        Err(e) => match e {
            std::env::VarError::NotPresent => Ok(None),
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

/// Reads a numeric variable, falling back to `default` when it is unset or
/// not a number.
fn parsed_var<T: std::str::FromStr + std::fmt::Display + Copy>(key: &str, default: T) -> T {
    match var(key) {
        Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Environment variable `{key}` is not a valid number, using {default}");
            default
        }),
        _ => default,
    }
}

impl ServerConfig {
    pub fn new_from_env() -> Self {
        ServerConfig {
            env: Env::parse(var("ENVIRONMENT").ok().flatten().as_deref()),
            database_url: required_var("DATABASE_URL"),
            database_pool_size: parsed_var("DATABASE_POOL_SIZE", DEFAULT_POOL_SIZE),
            port: parsed_var("PORT", DEFAULT_PORT),
            cors_allowed_origin: var("CORS_ALLOWED_ORIGIN").ok().flatten(),
        }
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        ServerConfig {
            env: Env::Dev,
            database_url: String::new(),
            database_pool_size: 1,
            port: 0,
            cors_allowed_origin: None,
        }
    }
}
