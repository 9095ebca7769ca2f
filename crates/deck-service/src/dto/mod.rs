//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    CreateAccountRequest, ForceLogoutRequest, ListAccountsQuery, LoginRequest, SignupRequest,
    UsernameRequest, VerifyPaymentRequest,
};

pub use responses::{
    AccountResponse, ActiveSessionResponse, ApiResponse, AuthResponse, ChapterDetailResponse,
    ChapterSummaryResponse, DeviceLockResponse, FlashcardResponse, ForceLogoutResponse,
    HealthChecks, HealthResponse, IssuedCredentials, LoginAttemptResponse, MeResponse,
    NoteResponse, OrderResponse, PaginatedResponse, PaginationMeta, PremiumStatusResponse,
    ReadinessResponse, SessionInfoResponse, SessionTicket, TopicDetailResponse, TopicResponse,
    UserSessionResponse,
};
