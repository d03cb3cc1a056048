//! Content factory for building a catalog from data files.

use std::path::{Path, PathBuf};

use combat_core::CombatConfig;
use serde::de::DeserializeOwned;

use crate::catalog::{Catalog, CatalogError};
use crate::loaders::definitions::{
    BossFile, ComboFile, HazardFile, StanceFile, StatusFile, ZoneFile,
};
use crate::loaders::{ConfigLoader, LoadResult, read_file};

/// Raw text of every content file, before parsing.
#[derive(Clone, Debug)]
pub struct CatalogSources<'a> {
    /// TOML tunables; `None` keeps [`CombatConfig::default`].
    pub config: Option<&'a str>,
    pub statuses: &'a str,
    pub stances: &'a str,
    pub combos: &'a str,
    pub hazards: &'a str,
    pub zones: &'a str,
    pub bosses: &'a str,
}

impl CatalogSources<'static> {
    /// The content shipped with this crate.
    pub const EMBEDDED: Self = Self {
        config: Some(include_str!("../../data/config.toml")),
        statuses: include_str!("../../data/statuses.ron"),
        stances: include_str!("../../data/stances.ron"),
        combos: include_str!("../../data/combos.ron"),
        hazards: include_str!("../../data/hazards.ron"),
        zones: include_str!("../../data/zones.ron"),
        bosses: include_str!("../../data/bosses.ron"),
    };
}

impl CatalogSources<'_> {
    /// Parses, converts, and validates every family into one catalog.
    pub fn build(&self) -> LoadResult<Catalog> {
        let config = match self.config {
            Some(text) => ConfigLoader::parse(text)?,
            None => CombatConfig::default(),
        };
        let summon_defaults = config.summon_defaults;
        let mut catalog = Catalog::new(config);

        let statuses: StatusFile = parse_ron("status effects", self.statuses)?;
        for spec in statuses.effects {
            catalog.add_status(spec.into_definition()?)?;
        }

        let stances: StanceFile = parse_ron("stances", self.stances)?;
        for spec in stances.stances {
            catalog.add_stance(spec.into_definition())?;
        }

        let combos: ComboFile = parse_ron("combos", self.combos)?;
        for spec in combos.combos {
            catalog.add_combo(spec.into_definition()?)?;
        }

        let hazards: HazardFile = parse_ron("hazards", self.hazards)?;
        for spec in hazards.hazards {
            catalog.add_hazard(spec.into_definition()?)?;
        }

        let zones: ZoneFile = parse_ron("zones", self.zones)?;
        for spec in zones.zones {
            catalog.add_zone(spec.into_definition()?)?;
        }

        let bosses: BossFile = parse_ron("bosses", self.bosses)?;
        for spec in bosses.bosses {
            catalog.add_boss(spec.into_definition(&summon_defaults))?;
        }

        catalog
            .validate()
            .map_err(|e: CatalogError| anyhow::anyhow!("Invalid combat content: {}", e))?;

        tracing::info!(
            statuses = catalog.statuses().count(),
            stances = catalog.stances().count(),
            combos = catalog.combos().count(),
            hazards = catalog.hazards().count(),
            zones = catalog.zones().count(),
            bosses = catalog.bosses().count(),
            "combat catalog loaded"
        );
        Ok(catalog)
    }
}

fn parse_ron<T: DeserializeOwned>(what: &str, content: &str) -> LoadResult<T> {
    ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse {} RON: {}", what, e))
}

impl Catalog {
    /// Builds the catalog from the content compiled into this crate.
    pub fn load_embedded() -> LoadResult<Self> {
        CatalogSources::EMBEDDED.build()
    }
}

/// Content factory that loads all combat content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml      (optional)
/// ├── statuses.ron
/// ├── stances.ron
/// ├── combos.ron
/// ├── hazards.ron
/// ├── zones.ron
/// └── bosses.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load tunables from `config.toml`, or the defaults if it is absent.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            return Ok(CombatConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load and validate every definition file in the data directory.
    pub fn load_catalog(&self) -> LoadResult<Catalog> {
        let config_path = self.data_dir.join("config.toml");
        let config = if config_path.exists() {
            Some(read_file(&config_path)?)
        } else {
            None
        };
        let statuses = self.read("statuses.ron")?;
        let stances = self.read("stances.ron")?;
        let combos = self.read("combos.ron")?;
        let hazards = self.read("hazards.ron")?;
        let zones = self.read("zones.ron")?;
        let bosses = self.read("bosses.ron")?;

        CatalogSources {
            config: config.as_deref(),
            statuses: &statuses,
            stances: &stances,
            combos: &combos,
            hazards: &hazards,
            zones: &zones,
            bosses: &bosses,
        }
        .build()
    }

    fn read(&self, file: &str) -> LoadResult<String> {
        read_file(&self.data_dir.join(file))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
