//! # deck-service
//!
//! Application layer: authentication, sessions, device locks, entitlement
//! checks, payments, administration and content delivery.

pub mod dto;
pub mod gateway;
pub mod services;

pub use gateway::HttpPaymentGateway;
pub use services::{
    AccessService, AdminService, AuthService, ClientInfo, ContentService, DeviceLockManager,
    PaymentService, ResolvedCaller, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult, SessionManager,
};
