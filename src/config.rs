use std::net::SocketAddr;

use anyhow::{bail, Context};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Postgres,
    Memory,
}

/// Where generated recipes come from.
#[derive(Debug, Clone, Deserialize)]
pub enum GeneratorBackendConfig {
    /// Chat-completions style HTTP API (Mistral by default).
    Mistral {
        api_url: String,
        api_key: String,
        model: String,
    },
    /// Local program: prompt on stdin, model text on stdout.
    Command { program: String, args: Vec<String> },
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    pub backend: GeneratorBackendConfig,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageKind,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt: JwtConfig,
    pub cors_allowed_origins: Vec<String>,
    pub generator: GeneratorConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| var(key).with_context(|| format!("{key} must be set"));

        let storage = match var("STORAGE").as_deref().unwrap_or("postgres") {
            "postgres" => StorageKind::Postgres,
            "memory" => StorageKind::Memory,
            other => bail!("unknown STORAGE {other:?}, expected postgres or memory"),
        };
        let database_url = match storage {
            StorageKind::Postgres => Some(required("DATABASE_URL")?),
            StorageKind::Memory => var("DATABASE_URL"),
        };

        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: var("JWT_ISSUER").unwrap_or_else(|| "recipebox".into()),
            audience: var("JWT_AUDIENCE").unwrap_or_else(|| "recipebox-users".into()),
        };

        let backend = match var("RECIPE_AI_BACKEND").as_deref().unwrap_or("mistral") {
            "mistral" => GeneratorBackendConfig::Mistral {
                api_url: required("MISTRAL_API_URL")?,
                api_key: required("MISTRAL_API_KEY")?,
                model: var("MISTRAL_MODEL").unwrap_or_else(|| "mistral-small".into()),
            },
            "command" => {
                let line = required("RECIPE_AI_COMMAND")?;
                let mut parts = line.split_whitespace().map(str::to_string);
                let program = parts.next().context("RECIPE_AI_COMMAND is empty")?;
                GeneratorBackendConfig::Command {
                    program,
                    args: parts.collect(),
                }
            }
            other => bail!("unknown RECIPE_AI_BACKEND {other:?}, expected mistral or command"),
        };

        let generator = GeneratorConfig {
            backend,
            timeout_secs: parse_or(&var, "RECIPE_AI_TIMEOUT_SECS", 30)?,
            max_attempts: parse_or(&var, "RECIPE_AI_MAX_ATTEMPTS", 3)?,
            temperature: parse_or(&var, "RECIPE_AI_TEMPERATURE", 0.7)?,
        };
        if generator.max_attempts == 0 {
            bail!("RECIPE_AI_MAX_ATTEMPTS must be at least 1");
        }

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3001".into())
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&var, "APP_PORT", 8080)?,
            storage,
            database_url,
            database_max_connections: parse_or(&var, "DATABASE_MAX_CONNECTIONS", 10)?,
            jwt,
            cors_allowed_origins,
            generator,
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {key} {raw:?}: {e}")),
        None => Ok(default),
    }
}
