//! Error types for the auto-router

use thiserror::Error;

/// Errors surfaced by route resolution and transaction building
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("Unknown token: {token}")]
    UnknownToken { token: String },

    #[error("No route found from {token_in} to {token_out}")]
    NoRouteFound { token_in: String, token_out: String },

    #[error("Insufficient liquidity in pool {pool}")]
    InsufficientLiquidity { pool: String },

    #[error("Pool {pool} is not active")]
    PoolInactive { pool: String },

    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("Pool registry data integrity error: {message}")]
    DataIntegrity { message: String },

    #[error("Invalid route: {message}")]
    InvalidRoute { message: String },

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Failures reported by the external collaborators (pool snapshot, token
/// metadata, USD prices)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("{provider} unavailable: {message}")]
    Unavailable {
        provider: &'static str,
        message: String,
    },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("Failed to parse provider response: {0}")]
    ParseError(String),
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type alias for router operations
pub type Result<T> = std::result::Result<T, RouterError>;

impl RouterError {
    /// Get a stable, front-end friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownToken { .. } => "unknown_token",
            Self::NoRouteFound { .. } => "no_route_found",
            Self::InsufficientLiquidity { .. } => "insufficient_liquidity",
            Self::PoolInactive { .. } => "pool_inactive",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::DataIntegrity { .. } => "data_integrity_error",
            Self::InvalidRoute { .. } => "invalid_route",
            Self::Provider(_) => "provider_unavailable",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount { .. } | Self::InvalidRoute { .. } => 400,
            Self::UnknownToken { .. } => 404,
            Self::NoRouteFound { .. } => 422,
            Self::InsufficientLiquidity { .. } | Self::PoolInactive { .. } => 422,
            Self::DataIntegrity { .. } => 500,
            Self::Provider(_) => 503,
        }
    }

    /// Failures that only disqualify one candidate route
    pub fn is_route_local(&self) -> bool {
        matches!(
            self,
            Self::InsufficientLiquidity { .. } | Self::PoolInactive { .. }
        )
    }

    pub fn data_integrity(message: impl Into<String>) -> Self {
        Self::DataIntegrity {
            message: message.into(),
        }
    }

    pub fn invalid_route(message: impl Into<String>) -> Self {
        Self::InvalidRoute {
            message: message.into(),
        }
    }

    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::InvalidAmount {
            message: message.into(),
        }
    }
}
