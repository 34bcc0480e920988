//! Adapters - concrete collaborator implementations behind the ports.
//!
//! One adapter per external service, plus in-memory mocks for tests.

mod bankr;
mod github;
mod mock;
mod openrouter;
mod twitter;

pub use bankr::BankrDeployer;
pub use github::GitHubHost;
pub use mock::{FilePut, MockDeployer, MockOracle, MockPoster, MockSourceHost};
pub use openrouter::OpenRouterOracle;
pub use twitter::TwitterPoster;
