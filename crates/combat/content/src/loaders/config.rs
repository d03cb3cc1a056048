//! Combat tunables loader.

use std::path::Path;

use combat_core::CombatConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`CombatConfig`] from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> LoadResult<CombatConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<CombatConfig> {
        let config: CombatConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ConfigLoader::parse(
            r#"
            parry_dc_bonus = 4
            dodge_ties_favor_defender = false

            [summon_defaults]
            max_active = 6
            "#,
        )
        .unwrap();
        assert_eq!(config.parry_dc_bonus, 4);
        assert!(!config.dodge_ties_favor_defender);
        assert_eq!(config.summon_defaults.max_active, 6);
        assert_eq!(config.summon_defaults.count, 1);
        assert_eq!(
            config.block_reduction_percent,
            CombatConfig::DEFAULT_BLOCK_REDUCTION_PERCENT
        );
    }

    #[test]
    fn wrong_types_fail() {
        assert!(ConfigLoader::parse("max_zones_per_caster = \"many\"").is_err());
    }
}
