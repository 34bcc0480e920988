//! Binary entry point: run exactly one decision-and-action cycle.
//!
//! An external scheduler (cron, CI timer) invokes this on its own cadence;
//! the process holds no loop of its own. Configuration failures exit
//! nonzero before any state is touched.

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sentinel_agent::adapters::{BankrDeployer, GitHubHost, OpenRouterOracle, TwitterPoster};
use sentinel_agent::config::AppConfig;
use sentinel_agent::engine::{run_cycle, ActionExecutor, CycleReport, DecisionEngine, StateStore};
use sentinel_agent::ports::{SocialPoster, TokenDeployer};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(report) => {
            info!(
                cycle = report.cycle,
                action = %report.action,
                result = %report.result,
                "cycle complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "cycle aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<CycleReport, Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    let oracle = OpenRouterOracle::new(config.oracle)?;
    let host = GitHubHost::new(config.source_host)?;
    let poster = config.social.map(TwitterPoster::new).transpose()?;
    let deployer = config.token_deploy.map(BankrDeployer::new).transpose()?;

    if poster.is_none() {
        info!("social posting disabled: credentials not configured");
    }
    if deployer.is_none() {
        info!("token deployment disabled: credentials not configured");
    }

    let mut store = StateStore::load(
        &config.policy.state_file,
        config.policy.action_log_max_entries,
        &config.policy.initial_goals,
    )
    .await?;

    let mut engine = DecisionEngine::new(&oracle, &config.policy, &config.persona);
    let executor = ActionExecutor::new(
        &host,
        &oracle,
        poster.as_ref().map(|p| p as &dyn SocialPoster),
        deployer.as_ref().map(|d| d as &dyn TokenDeployer),
        &config.policy,
    );

    Ok(run_cycle(&mut store, &mut engine, &executor).await?)
}
