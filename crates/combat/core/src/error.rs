//! Common error infrastructure for combat-core.
//!
//! Definition lookups and state-consistency checks are the only operations that
//! fail with `Err`. Rejected player intents (no reaction left, second stance
//! change in a round, moving while trapped) are reported through typed outcome
//! values by the resolvers instead.
//!
//! # Design Principles
//!
//! - **Type Safety**: Each subsystem has its own error type with specific variants
//! - **Rich Context**: Errors can carry combatant, position, and round for debugging
//! - **Severity Classification**: Errors are categorized for recovery strategies

use crate::env::{DiceError, OracleError};
use crate::state::{CombatantId, GridError, Position};

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: Temporary conditions that may succeed later
/// - **Validation**: Bad content or bad caller input, reject without retry
/// - **Internal**: Unexpected state inconsistencies that require investigation
/// - **Fatal**: Combat state is corrupted and cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Examples: status effect slots exhausted
    Recoverable,

    /// Examples: unknown definition id, malformed dice expression
    Validation,

    /// Examples: occupancy index desync, duplicate combatant registration
    Internal,

    /// Examples: missing required oracle, position outside the grid
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Contextual information attached to errors for debugging and diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    pub combatant: Option<CombatantId>,
    pub position: Option<Position>,
    /// Combat round at the time of error.
    pub round: u32,
    pub message: Option<&'static str>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(round: u32) -> Self {
        Self {
            combatant: None,
            position: None,
            round,
            message: None,
        }
    }

    #[must_use]
    pub const fn with_combatant(mut self, combatant: CombatantId) -> Self {
        self.combatant = Some(combatant);
        self
    }

    #[must_use]
    pub const fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

/// Common trait for all combat-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Returns the context information for this error, if available.
    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Top-level error returned by every resolver entry point.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Dice(#[from] DiceError),

    #[error("combatant {0} is not part of this combat")]
    UnknownCombatant(CombatantId),

    #[error("combatant {0} is already part of this combat")]
    DuplicateCombatant(CombatantId),

    #[error("no status effect slot left on {target} for '{effect_id}'")]
    StatusSlotsExhausted {
        target: CombatantId,
        effect_id: String,
    },

    #[error("combatant {0} is not registered as a boss")]
    NotABoss(CombatantId),

    /// Health or another clamped quantity left its valid range.
    #[error("state invariant violated: {message}")]
    InvariantViolated {
        message: &'static str,
        context: ErrorContext,
    },
}

impl GameError for CombatError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Oracle(err) => err.severity(),
            Self::Grid(err) => err.severity(),
            Self::Dice(err) => err.severity(),
            Self::UnknownCombatant(_) | Self::InvariantViolated { .. } => ErrorSeverity::Fatal,
            Self::DuplicateCombatant(_) => ErrorSeverity::Internal,
            Self::StatusSlotsExhausted { .. } => ErrorSeverity::Recoverable,
            Self::NotABoss(_) => ErrorSeverity::Validation,
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::InvariantViolated { context, .. } => Some(context),
            _ => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Oracle(err) => err.error_code(),
            Self::Grid(err) => err.error_code(),
            Self::Dice(err) => err.error_code(),
            Self::UnknownCombatant(_) => "COMBAT_UNKNOWN_COMBATANT",
            Self::DuplicateCombatant(_) => "COMBAT_DUPLICATE_COMBATANT",
            Self::StatusSlotsExhausted { .. } => "COMBAT_STATUS_SLOTS_EXHAUSTED",
            Self::NotABoss(_) => "COMBAT_NOT_A_BOSS",
            Self::InvariantViolated { .. } => "COMBAT_INVARIANT_VIOLATED",
        }
    }
}

pub type CombatResult<T> = Result<T, CombatError>;
