use crate::state::StatModifiers;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StanceDefinition {
    pub id: String,
    pub name: String,
    pub modifiers: StatModifiers,
    /// Marks the stance every combatant starts in.
    pub is_default: bool,
}

pub trait StanceOracle {
    fn stance(&self, id: &str) -> Option<&StanceDefinition>;

    /// The stance marked as default, if any definition carries the marker.
    fn default_stance(&self) -> Option<&StanceDefinition>;
}
