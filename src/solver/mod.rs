//! The DNS-01 solver plugin interface and its Infoblox implementation

mod config;
mod infoblox;
pub mod names;
mod request;

use async_trait::async_trait;

use crate::error::SolverResult;
use crate::secrets::ClusterConfig;

pub use config::ProviderConfig;
pub use infoblox::{InfobloxSolver, SOLVER_NAME};
pub use request::{ChallengeAction, ChallengeRequest};

/// Contract between cert-manager's webhook front end and a DNS provider.
///
/// `present` and `clean_up` may be called concurrently for different
/// challenges once `initialize` has returned.
#[async_trait]
pub trait Solver: Send + Sync {
    /// Name cert-manager uses to route challenges to this solver
    fn name(&self) -> &str;

    /// Publish the challenge TXT record
    async fn present(&self, request: &ChallengeRequest) -> SolverResult<()>;

    /// Remove every TXT record published for the challenge name
    async fn clean_up(&self, request: &ChallengeRequest) -> SolverResult<()>;

    /// Connect to the cluster's secret store. Called once before serving.
    fn initialize(&self, cluster: &ClusterConfig) -> SolverResult<()>;
}
