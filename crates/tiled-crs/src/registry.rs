//! Registry of tile pyramids, built once at startup and shared read-only.
//!
//! Pyramids are found by name or by any spelling of their coordinate system:
//!
//! - `OSMTILE`, `MAPML:OSMTILE`, `urn:ogc:def:crs:MapML::OSMTILE`
//! - the configured code, e.g. `urn:x-ogc:def:crs:EPSG:3857`
//! - normalised spellings of that code: `EPSG:3857`, `urn:ogc:def:crs:EPSG::3857`, ...
//!
//! Lookups are case-insensitive.

use crate::gridset::GridSetConfig;
use crate::pyramid::{self, PyramidDefinition};
use std::collections::HashMap;
use std::sync::Arc;
use tcrs_common::{CrsCode, TcrsError, TcrsResult};
use tracing::{debug, info, warn};

/// Names of the built-in pyramids. Grid sets cannot reuse them.
pub const FIXED_NAMES: [&str; 4] = ["APSTILE", "CBMTILE", "OSMTILE", "WGS84"];

/// Immutable lookup table of pyramids.
#[derive(Debug, Default)]
pub struct PyramidRegistry {
    pyramids: Vec<Arc<PyramidDefinition>>,
    /// Upper-cased alias -> index into `pyramids`
    aliases: HashMap<String, usize>,
}

impl PyramidRegistry {
    pub fn builder() -> PyramidRegistryBuilder {
        PyramidRegistryBuilder::default()
    }

    /// Registry holding only the built-in pyramids.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        for def in pyramid::builtins() {
            if let Err(e) = registry.insert(def) {
                warn!(error = %e, "Skipping built-in pyramid");
            }
        }
        registry
    }

    /// Find a pyramid by name or coordinate system identifier.
    ///
    /// # Errors
    ///
    /// `PyramidNotFound` when nothing matches.
    pub fn get(&self, identifier: &str) -> TcrsResult<Arc<PyramidDefinition>> {
        self.find(identifier)
            .cloned()
            .ok_or_else(|| TcrsError::PyramidNotFound(identifier.to_string()))
    }

    pub fn find(&self, identifier: &str) -> Option<&Arc<PyramidDefinition>> {
        self.aliases
            .get(&identifier.trim().to_uppercase())
            .map(|&i| &self.pyramids[i])
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.find(identifier).is_some()
    }

    /// Canonical names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.pyramids.iter().map(|p| p.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<PyramidDefinition>> {
        self.pyramids.iter()
    }

    pub fn len(&self) -> usize {
        self.pyramids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pyramids.is_empty()
    }

    /// The `EPSG:n` code to emit for a requested pyramid or CRS alias.
    ///
    /// `MAPML:OSMTILE` and `urn:ogc:def:crs:EPSG::3857` both give `EPSG:3857`.
    pub fn supported_output_crs(&self, requested: &str) -> Option<String> {
        let def = self.find(requested)?;
        Some(
            CrsCode::parse(def.code())
                .map(|code| code.output_code())
                .unwrap_or_else(|| def.code().to_string()),
        )
    }

    fn insert(&mut self, def: PyramidDefinition) -> TcrsResult<()> {
        let name = def.name().to_uppercase();
        let name_aliases = [
            name.clone(),
            format!("MAPML:{}", name),
            format!("URN:OGC:DEF:CRS:MAPML::{}", name),
        ];
        if let Some(taken) = name_aliases.iter().find(|a| self.aliases.contains_key(*a)) {
            return Err(TcrsError::Config(format!(
                "duplicate pyramid {}: {} is already registered",
                def.name(),
                taken
            )));
        }

        let index = self.pyramids.len();
        for alias in name_aliases {
            self.aliases.insert(alias, index);
        }

        // Code spellings go to the first pyramid that claims them.
        let mut code_aliases = vec![def.code().trim().to_uppercase()];
        if let Some(code) = CrsCode::parse(def.code()) {
            code_aliases.extend(code.aliases());
        }
        for alias in code_aliases {
            self.aliases.entry(alias).or_insert(index);
        }

        debug!(pyramid = %def.name(), code = %def.code(), levels = def.max_zoom(), "Registered pyramid");
        self.pyramids.push(Arc::new(def));
        Ok(())
    }
}

/// Collects definitions before freezing them into a [`PyramidRegistry`].
#[derive(Debug, Default)]
pub struct PyramidRegistryBuilder {
    definitions: Vec<PyramidDefinition>,
    gridsets: Vec<GridSetConfig>,
}

impl PyramidRegistryBuilder {
    /// Add WGS84, OSMTILE, CBMTILE and APSTILE.
    pub fn with_builtins(mut self) -> Self {
        self.definitions.extend(pyramid::builtins());
        self
    }

    pub fn register(mut self, def: PyramidDefinition) -> Self {
        self.definitions.push(def);
        self
    }

    /// Grid sets are added after explicitly registered definitions.
    /// Unsupported or invalid ones are skipped with a warning, and the
    /// first grid set with a given name wins.
    pub fn with_gridsets<I>(mut self, gridsets: I) -> Self
    where
        I: IntoIterator<Item = GridSetConfig>,
    {
        self.gridsets.extend(gridsets);
        self
    }

    /// # Errors
    ///
    /// `Config` when two registered definitions share a name.
    pub fn build(self) -> TcrsResult<PyramidRegistry> {
        let mut registry = PyramidRegistry::default();
        for def in self.definitions {
            registry.insert(def)?;
        }

        for gridset in self.gridsets {
            if !gridset.is_supported() {
                warn!(gridset = %gridset.name, "Grid set cannot be used as a pyramid, skipping");
                continue;
            }
            if registry.contains(&gridset.name) {
                warn!(gridset = %gridset.name, "Pyramid already registered, skipping grid set");
                continue;
            }
            match gridset.to_pyramid_definition() {
                Ok(def) => registry.insert(def)?,
                Err(e) => {
                    warn!(gridset = %gridset.name, error = %e, "Invalid grid set, skipping");
                }
            }
        }

        info!(pyramids = registry.len(), names = ?registry.names(), "Built pyramid registry");
        Ok(registry)
    }
}
