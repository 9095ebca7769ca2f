//! Business logic services
//!
//! This module contains all service layer implementations that handle
//! authentication, session integrity, entitlement and payments.

pub mod access;
pub mod admin;
pub mod auth;
pub mod content;
pub mod context;
pub mod device_lock;
pub mod error;
pub mod payment;
pub mod session;

// Re-export all services for convenience
pub use access::{AccessService, ResolvedCaller};
pub use admin::AdminService;
pub use auth::AuthService;
pub use content::ContentService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use device_lock::DeviceLockManager;
pub use error::{ServiceError, ServiceResult};
pub use payment::PaymentService;
pub use session::{ClientInfo, SessionManager};
