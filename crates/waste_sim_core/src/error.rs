//! Error types for the simulation core.
//!
//! Every command returns [`Result`]. A rejected command leaves the world
//! unchanged; nothing in here is fatal to the tick loop.

use crate::ecs::BinId;
use crate::route::RouteId;

/// Coarse classification used by callers that only care about the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Conflict,
    Config,
}

/// Errors raised by simulation commands.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// No bin with this id is registered.
    #[error("bin not found: {0}")]
    BinNotFound(BinId),

    /// No route with this id has been generated.
    #[error("route not found: {0}")]
    RouteNotFound(RouteId),

    /// No notification with this id is in the log.
    #[error("notification not found: {0}")]
    NotificationNotFound(u64),

    /// A bin with this id already exists.
    #[error("duplicate bin id: {0}")]
    DuplicateBin(BinId),

    /// Another route is already in progress.
    #[error("route {active} is already in progress")]
    RouteAlreadyActive {
        /// The route currently holding the vehicle.
        active: RouteId,
    },

    /// Argument outside the accepted domain (coordinates, fill levels, speeds...).
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument.
        reason: String,
    },

    /// Configuration could not be read or failed validation.
    #[error("invalid configuration: {reason}")]
    Config {
        /// What was wrong with the configuration.
        reason: String,
    },
}

impl SimError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BinNotFound(_) | Self::RouteNotFound(_) | Self::NotificationNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::DuplicateBin(_) | Self::RouteAlreadyActive { .. } => ErrorKind::Conflict,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Config { .. } => ErrorKind::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
