//! Application configuration module
//!
//! Credentials come from the environment (a `.env` file is honored for
//! development via `dotenvy`); behavior policy comes from a static JSON file
//! and the persona from a static text file. Configuration is loaded once at
//! startup and handed into components by value - missing required
//! credentials are fatal before any state mutation.
//!
//! # Environment variables
//!
//! Required: `ORACLE_API_KEY`, `SOURCE_HOST_TOKEN`.
//! Optional, all-or-nothing sets: `SOCIAL_CONSUMER_KEY` /
//! `SOCIAL_CONSUMER_SECRET` / `SOCIAL_ACCESS_TOKEN` /
//! `SOCIAL_ACCESS_TOKEN_SECRET` (social posting) and `TOKEN_DEPLOY_API_KEY`
//! / `TOKEN_REWARD_ADDRESS` (token deployment).
//! Overrides: `ORACLE_MODEL`, `AGENT_POLICY_PATH`, `AGENT_PERSONA_PATH`.

mod collaborators;
mod error;
mod oracle;
mod policy;

pub use collaborators::{SocialConfig, SourceHostConfig, TokenDeployConfig};
pub use error::{ConfigError, ValidationError};
pub use oracle::OracleConfig;
pub use policy::{
    ActionPolicy, CreateIssuePolicy, JournalPolicy, LaunchTokenPolicy, MonitorPolicy, PostPolicy,
    SelfImprovePolicy,
};

use std::env;
use std::path::{Path, PathBuf};

use secrecy::Secret;

const DEFAULT_POLICY_PATH: &str = "config/policy.json";
const DEFAULT_PERSONA_PATH: &str = "config/persona.md";

/// Root application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub oracle: OracleConfig,
    pub source_host: SourceHostConfig,
    /// Present only when the full social credential quad is set.
    pub social: Option<SocialConfig>,
    /// Present only when the full token-deployment credential set is set.
    pub token_deploy: Option<TokenDeployConfig>,
    pub policy: ActionPolicy,
    /// Persona system prompt, read from the persona file.
    pub persona: String,
}

impl AppConfig {
    /// Load configuration from the environment and the static policy files.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required credential is absent, a policy
    /// file is unreadable, or validation fails. Callers treat this as fatal.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let oracle_key = require_env("ORACLE_API_KEY")?;
        let host_token = require_env("SOURCE_HOST_TOKEN")?;

        let policy_path =
            env::var("AGENT_POLICY_PATH").unwrap_or_else(|_| DEFAULT_POLICY_PATH.to_string());
        let persona_path =
            env::var("AGENT_PERSONA_PATH").unwrap_or_else(|_| DEFAULT_PERSONA_PATH.to_string());

        let policy = ActionPolicy::load(Path::new(&policy_path))?;
        let persona = read_text(Path::new(&persona_path))?;

        let owner = require_env("SOURCE_HOST_OWNER")?;
        let repo = require_env("SOURCE_HOST_REPO")?;
        if owner.is_empty() || repo.is_empty() {
            return Err(ValidationError::InvalidRepo.into());
        }

        let mut oracle = OracleConfig::new(oracle_key);
        if let Ok(model) = env::var("ORACLE_MODEL") {
            oracle = oracle.with_model(model);
        }

        Ok(Self {
            oracle,
            source_host: SourceHostConfig::new(host_token, owner, repo),
            social: social_from_env(),
            token_deploy: token_deploy_from_env(),
            policy,
            persona,
        })
    }
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingEnv(name)),
    }
}

fn read_text(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: PathBuf::from(path),
        source,
    })
}

/// Social posting is enabled only with the complete credential quad.
fn social_from_env() -> Option<SocialConfig> {
    let consumer_key = non_empty_env("SOCIAL_CONSUMER_KEY")?;
    let consumer_secret = non_empty_env("SOCIAL_CONSUMER_SECRET")?;
    let access_token = non_empty_env("SOCIAL_ACCESS_TOKEN")?;
    let access_token_secret = non_empty_env("SOCIAL_ACCESS_TOKEN_SECRET")?;
    Some(SocialConfig {
        consumer_key,
        consumer_secret: Secret::new(consumer_secret),
        access_token,
        access_token_secret: Secret::new(access_token_secret),
    })
}

/// Token deployment is enabled only with both the key and reward address.
fn token_deploy_from_env() -> Option<TokenDeployConfig> {
    let api_key = non_empty_env("TOKEN_DEPLOY_API_KEY")?;
    let reward_address = non_empty_env("TOKEN_REWARD_ADDRESS")?;
    Some(TokenDeployConfig::new(api_key, reward_address))
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}
