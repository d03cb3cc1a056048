use super::CombatantId;

/// In-progress combo tracked for one combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComboProgress {
    pub combo_id: String,
    /// 1-based index of the last completed step.
    pub current_step: u32,
    pub total_steps: u32,
    /// Turns left to perform the next step. A stored value is never 0.
    pub window_remaining: u32,
    /// Target of the last completed step.
    pub last_target: Option<CombatantId>,
}

impl ComboProgress {
    pub fn start(
        combo_id: impl Into<String>,
        total_steps: u32,
        window_turns: u32,
        target: Option<CombatantId>,
    ) -> Self {
        Self {
            combo_id: combo_id.into(),
            current_step: 1,
            total_steps,
            window_remaining: window_turns,
            last_target: target,
        }
    }

    pub fn steps_remaining(&self) -> u32 {
        self.total_steps.saturating_sub(self.current_step)
    }

    /// 1-based index of the step that would advance this combo.
    pub fn next_step(&self) -> u32 {
        self.current_step + 1
    }
}
