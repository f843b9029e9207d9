//! HTTP surface of Jahreszahlen: topic administration, the three-phase quiz
//! and the leaderboard, served by axum.

pub mod auth;
pub mod config;
pub mod error;
pub mod jobs;
pub mod metrics;
pub mod middleware;
pub mod quiz;
pub mod response;
pub mod router;
pub mod score;
pub mod session;
pub mod state;
pub mod store;
pub mod topic;
pub mod tracing;
pub mod validation;

pub use config::ApiConfig;
pub use state::{ApiState, AuthConfig};
pub use store::{PgStore, Store};
