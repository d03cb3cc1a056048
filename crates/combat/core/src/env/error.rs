//! Definition lookup errors.

use crate::error::{ErrorSeverity, GameError};

/// Required definition data is unavailable.
///
/// A missing oracle means the environment was wired incorrectly. An unknown id
/// means content references something that was never defined.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("ConfigOracle not available")]
    ConfigNotAvailable,

    #[error("StatusEffectOracle not available")]
    StatusEffectsNotAvailable,

    #[error("ComboOracle not available")]
    CombosNotAvailable,

    #[error("StanceOracle not available")]
    StancesNotAvailable,

    #[error("HazardOracle not available")]
    HazardsNotAvailable,

    #[error("ZoneOracle not available")]
    ZonesNotAvailable,

    #[error("BossOracle not available")]
    BossesNotAvailable,

    #[error("status effect '{0}' not found")]
    UnknownStatusEffect(String),

    #[error("combo '{0}' not found")]
    UnknownCombo(String),

    #[error("stance '{0}' not found")]
    UnknownStance(String),

    #[error("hazard '{0}' not found")]
    UnknownHazard(String),

    #[error("zone '{0}' not found")]
    UnknownZone(String),

    #[error("boss '{0}' not found")]
    UnknownBoss(String),
}

impl GameError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        use OracleError::*;
        match self {
            ConfigNotAvailable
            | StatusEffectsNotAvailable
            | CombosNotAvailable
            | StancesNotAvailable
            | HazardsNotAvailable
            | ZonesNotAvailable
            | BossesNotAvailable => ErrorSeverity::Fatal,

            UnknownStatusEffect(_)
            | UnknownCombo(_)
            | UnknownStance(_)
            | UnknownHazard(_)
            | UnknownZone(_)
            | UnknownBoss(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            ConfigNotAvailable => "ORACLE_CONFIG_NOT_AVAILABLE",
            StatusEffectsNotAvailable => "ORACLE_STATUS_EFFECTS_NOT_AVAILABLE",
            CombosNotAvailable => "ORACLE_COMBOS_NOT_AVAILABLE",
            StancesNotAvailable => "ORACLE_STANCES_NOT_AVAILABLE",
            HazardsNotAvailable => "ORACLE_HAZARDS_NOT_AVAILABLE",
            ZonesNotAvailable => "ORACLE_ZONES_NOT_AVAILABLE",
            BossesNotAvailable => "ORACLE_BOSSES_NOT_AVAILABLE",
            UnknownStatusEffect(_) => "ORACLE_UNKNOWN_STATUS_EFFECT",
            UnknownCombo(_) => "ORACLE_UNKNOWN_COMBO",
            UnknownStance(_) => "ORACLE_UNKNOWN_STANCE",
            UnknownHazard(_) => "ORACLE_UNKNOWN_HAZARD",
            UnknownZone(_) => "ORACLE_UNKNOWN_ZONE",
            UnknownBoss(_) => "ORACLE_UNKNOWN_BOSS",
        }
    }
}
