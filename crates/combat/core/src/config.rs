/// Combat tunables and capacity constants.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Percentage of incoming damage a block prevents before the shield bonus.
    pub block_reduction_percent: u32,
    /// Added to the attack roll to form the parry DC.
    pub parry_dc_bonus: i32,
    /// Damage multiplier applied to a vulnerable boss, in percent.
    pub vulnerability_multiplier_percent: u32,
    /// Active zones a single caster may maintain before the oldest is evicted.
    pub max_zones_per_caster: usize,
    /// Stance assigned when no definition is marked as default.
    pub default_stance: String,
    /// When true a dodge succeeds on `roll >= attack`; otherwise the roll must exceed it.
    pub dodge_ties_favor_defender: bool,
    /// When true a rejected stance change still uses up the round's allowance.
    pub rejected_stance_change_consumes_allowance: bool,
    /// Bonus to dodge and parry totals while the defender is in a defending posture.
    pub defending_bonus: i32,
    /// Fallback DC for climbing out of a hazard that does not specify one.
    pub climb_out_dc: i32,
    /// Cells a critical hit knocks the target back.
    pub critical_knockback_cells: u32,
    pub summon_defaults: SummonDefaults,
}

/// Values used when a boss phase summon block omits a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SummonDefaults {
    pub count: u32,
    pub interval_turns: u32,
    pub max_active: u32,
}

impl Default for SummonDefaults {
    fn default() -> Self {
        Self {
            count: 1,
            interval_turns: 2,
            max_active: 4,
        }
    }
}

impl CombatConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_STATUS_EFFECTS: usize = 16;
    pub const MAX_COMBO_STEPS: usize = 8;
    pub const MAX_BOSS_PHASES: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_BLOCK_REDUCTION_PERCENT: u32 = 50;
    pub const DEFAULT_PARRY_DC_BONUS: i32 = 2;
    pub const DEFAULT_VULNERABILITY_MULTIPLIER_PERCENT: u32 = 150;
    pub const DEFAULT_MAX_ZONES_PER_CASTER: usize = 10;
    pub const DEFAULT_STANCE: &'static str = "balanced";
    pub const DEFAULT_DEFENDING_BONUS: i32 = 2;
    pub const DEFAULT_CLIMB_OUT_DC: i32 = 12;
    pub const DEFAULT_CRITICAL_KNOCKBACK_CELLS: u32 = 1;

    pub fn new() -> Self {
        Self {
            block_reduction_percent: Self::DEFAULT_BLOCK_REDUCTION_PERCENT,
            parry_dc_bonus: Self::DEFAULT_PARRY_DC_BONUS,
            vulnerability_multiplier_percent: Self::DEFAULT_VULNERABILITY_MULTIPLIER_PERCENT,
            max_zones_per_caster: Self::DEFAULT_MAX_ZONES_PER_CASTER,
            default_stance: Self::DEFAULT_STANCE.to_string(),
            dodge_ties_favor_defender: true,
            rejected_stance_change_consumes_allowance: false,
            defending_bonus: Self::DEFAULT_DEFENDING_BONUS,
            climb_out_dc: Self::DEFAULT_CLIMB_OUT_DC,
            critical_knockback_cells: Self::DEFAULT_CRITICAL_KNOCKBACK_CELLS,
            summon_defaults: SummonDefaults::default(),
        }
    }

    /// Applies a percentage to `amount`, rounding down.
    pub fn scale_percent(amount: u32, percent: u32) -> u32 {
        (u64::from(amount) * u64::from(percent) / 100) as u32
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
