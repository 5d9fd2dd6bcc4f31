pub mod api;
pub mod config;
pub mod error;
pub mod infoblox;
pub mod secrets;
pub mod solver;

pub use config::Settings;
pub use error::{SolverError, SolverResult};
pub use solver::{ChallengeRequest, InfobloxSolver, Solver};
