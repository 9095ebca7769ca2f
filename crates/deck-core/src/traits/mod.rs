//! Ports - traits implemented by the infrastructure layer

mod gateway;
mod repositories;

pub use gateway::PaymentGateway;
pub use repositories::{AccountRepository, ContentRepository, RepoResult};
