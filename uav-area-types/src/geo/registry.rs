use crate::error::TypesError;
use crate::geo::crs::{Crs, Hemisphere};
use lazy_static::lazy_static;
use std::collections::BTreeMap;

lazy_static! {
    static ref GLOBAL_REGISTRY: CrsRegistry = CrsRegistry::with_builtin_definitions();
}

/// Known CRS with its human readable name.
#[derive(Debug, Clone, PartialEq)]
pub struct CrsDefinition {
    /// EPSG code.
    pub code: u32,
    /// Name as listed in the EPSG dataset.
    pub name: String,
    /// The CRS itself.
    pub crs: Crs,
}

/// Table of the CRS definitions the measurement crates can resolve.
///
/// The global instance is built once on first access and is read-only afterwards, so it can be used from any number
/// of threads without locking.
#[derive(Debug, Clone, Default)]
pub struct CrsRegistry {
    definitions: BTreeMap<u32, CrsDefinition>,
}

impl CrsRegistry {
    /// Process-wide registry with the built-in definitions.
    pub fn global() -> &'static CrsRegistry {
        &GLOBAL_REGISTRY
    }

    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with WGS84, Web Mercator and all 120 WGS84 UTM zones.
    pub fn with_builtin_definitions() -> Self {
        let mut registry = Self::new();
        registry.insert(4326, "WGS 84", Crs::WGS84);
        registry.insert(3857, "WGS 84 / Pseudo-Mercator", Crs::EPSG3857);

        for zone in 1..=60u8 {
            for (hemisphere, letter) in [(Hemisphere::North, 'N'), (Hemisphere::South, 'S')] {
                if let Ok(crs) = Crs::utm(zone, hemisphere) {
                    registry.insert(crs.epsg(), &format!("WGS 84 / UTM zone {zone}{letter}"), crs);
                }
            }
        }

        log::debug!("CRS registry initialized with {} definitions", registry.len());
        registry
    }

    /// Adds or replaces a definition.
    pub fn insert(&mut self, code: u32, name: &str, crs: Crs) {
        self.definitions.insert(
            code,
            CrsDefinition {
                code,
                name: name.to_string(),
                crs,
            },
        );
    }

    /// Definition for the code, if known.
    pub fn get(&self, code: u32) -> Option<&CrsDefinition> {
        self.definitions.get(&code)
    }

    /// CRS for the code, or [`TypesError::UnknownCrs`].
    pub fn resolve(&self, code: u32) -> Result<Crs, TypesError> {
        self.get(code)
            .map(|definition| definition.crs)
            .ok_or_else(|| TypesError::UnknownCrs(format!("EPSG:{code}")))
    }

    /// Parses an identifier (see [`parse_epsg_code`]) and resolves it.
    pub fn parse(&self, identifier: &str) -> Result<Crs, TypesError> {
        self.resolve(parse_epsg_code(identifier)?)
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true if the registry has no definitions.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Iterates over definitions in the order of their codes.
    pub fn iter(&self) -> impl Iterator<Item = &CrsDefinition> {
        self.definitions.values()
    }
}

/// Extracts the EPSG code from a CRS identifier.
///
/// Accepts formats like:
/// - "EPSG:32633", "epsg:32633"
/// - "urn:ogc:def:crs:EPSG::32633", "urn:ogc:def:crs:EPSG:9.9.1:32633"
/// - "CRS:84", "OGC:CRS84", "urn:ogc:def:crs:OGC:1.3:CRS84" (all mean EPSG:4326 with lon/lat axis order)
/// - "32633"
pub fn parse_epsg_code(identifier: &str) -> Result<u32, TypesError> {
    let normalized = identifier.trim().to_uppercase();

    match normalized.as_str() {
        "CRS:84" | "OGC:CRS84" | "URN:OGC:DEF:CRS:OGC:1.3:CRS84" | "URN:OGC:DEF:CRS:OGC::CRS84" => {
            return Ok(4326)
        }
        _ => {}
    }

    let code = if let Some(code) = normalized.strip_prefix("EPSG:") {
        code
    } else if let Some(rest) = normalized.strip_prefix("URN:OGC:DEF:CRS:EPSG:") {
        rest.rsplit(':').next().unwrap_or(rest)
    } else {
        normalized.as_str()
    };

    code.parse::<u32>()
        .map_err(|_| TypesError::InvalidCrsCode(identifier.to_string()))
}
