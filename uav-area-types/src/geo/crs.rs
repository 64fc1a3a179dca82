use crate::cartesian::NewCartesianPoint2d;
use crate::error::TypesError;
use crate::geo::datum::Datum;
use crate::geo::impls::point::GeoPoint2d;
use crate::geo::impls::projection::{IdentityProjection, WebMercator};
use crate::geo::registry::CrsRegistry;
use crate::geo::traits::point::NewGeoPoint;
use crate::geo::traits::projection::{ChainProjection, InvertedProjection, Projection};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coordinate reference system.
///
/// A CRS is either geographic (longitude and latitude in degrees, EPSG:4326) or projected into meters. Lengths and
/// areas only make sense in a projected CRS.
///
/// Serialized as its `EPSG:<code>` identifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Crs {
    datum: Datum,
    projection_type: ProjectionType,
}

/// Hemisphere of a UTM zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hemisphere {
    /// Latitude >= 0, EPSG codes `326zz`.
    North,
    /// Latitude < 0, EPSG codes `327zz`.
    South,
}

/// Method used to convert geographic coordinates into the CRS coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ProjectionType {
    /// No projection: coordinates are longitude (x) and latitude (y) in degrees.
    None,
    /// Spherical Web Mercator (EPSG:3857).
    WebMercator,
    /// Universal Transverse Mercator zone.
    Utm {
        /// Zone number, `1..=60`.
        zone: u8,
        /// Hemisphere of the zone.
        hemisphere: Hemisphere,
    },
}

impl ProjectionType {
    /// Operator definition understood by the `geodesy` crate, for projections that are evaluated by it.
    pub fn geodesy_definition(&self) -> Option<String> {
        match self {
            ProjectionType::Utm { zone, hemisphere } => Some(match hemisphere {
                Hemisphere::North => format!("utm zone={zone}"),
                Hemisphere::South => format!("utm zone={zone} south"),
            }),
            _ => None,
        }
    }
}

impl Crs {
    /// Geographic WGS84 coordinates, EPSG:4326.
    pub const WGS84: Crs = Crs {
        datum: Datum::WGS84,
        projection_type: ProjectionType::None,
    };

    /// Web Mercator, EPSG:3857.
    pub const EPSG3857: Crs = Crs {
        datum: Datum::WGS84,
        projection_type: ProjectionType::WebMercator,
    };

    /// WGS84 UTM zone. Fails if the zone is outside of `1..=60`.
    pub fn utm(zone: u8, hemisphere: Hemisphere) -> Result<Self, TypesError> {
        if !(1..=60).contains(&zone) {
            return Err(TypesError::InvalidUtmZone(zone));
        }

        Ok(Self {
            datum: Datum::WGS84,
            projection_type: ProjectionType::Utm { zone, hemisphere },
        })
    }

    /// Looks the code up in the global [`CrsRegistry`].
    pub fn from_epsg(code: u32) -> Result<Self, TypesError> {
        CrsRegistry::global().resolve(code)
    }

    /// EPSG code of the CRS.
    pub fn epsg(&self) -> u32 {
        match self.projection_type {
            ProjectionType::None => 4326,
            ProjectionType::WebMercator => 3857,
            ProjectionType::Utm {
                zone,
                hemisphere: Hemisphere::North,
            } => 32600 + zone as u32,
            ProjectionType::Utm {
                zone,
                hemisphere: Hemisphere::South,
            } => 32700 + zone as u32,
        }
    }

    /// Datum of the CRS.
    pub fn datum(&self) -> Datum {
        self.datum
    }

    /// Projection type of the CRS.
    pub fn projection_type(&self) -> &ProjectionType {
        &self.projection_type
    }

    /// Returns true for longitude/latitude systems.
    pub fn is_geographic(&self) -> bool {
        matches!(self.projection_type, ProjectionType::None)
    }

    /// Returns a projection from geographic coordinates into this CRS.
    ///
    /// For a geographic CRS this is an identity projection with longitude as `x` and latitude as `y`.
    pub fn get_projection<In, Out>(
        &self,
    ) -> Result<Box<dyn Projection<InPoint = In, OutPoint = Out>>, TypesError>
    where
        In: NewGeoPoint + 'static,
        Out: NewCartesianPoint2d + 'static,
    {
        match self.projection_type {
            ProjectionType::None => Ok(Box::new(IdentityProjection::new())),
            ProjectionType::WebMercator => Ok(Box::new(WebMercator::new(self.datum))),
            ProjectionType::Utm { .. } => self.geodesy_projection(),
        }
    }

    #[cfg(feature = "geodesy")]
    fn geodesy_projection<In, Out>(
        &self,
    ) -> Result<Box<dyn Projection<InPoint = In, OutPoint = Out>>, TypesError>
    where
        In: NewGeoPoint + 'static,
        Out: NewCartesianPoint2d + 'static,
    {
        use crate::geo::impls::projection::GeodesyProjection;

        let definition = self
            .projection_type
            .geodesy_definition()
            .ok_or_else(|| TypesError::Projection(format!("{self} has no geodesy definition")))?;
        Ok(Box::new(GeodesyProjection::new(&definition)?))
    }

    #[cfg(not(feature = "geodesy"))]
    fn geodesy_projection<In, Out>(
        &self,
    ) -> Result<Box<dyn Projection<InPoint = In, OutPoint = Out>>, TypesError>
    where
        In: NewGeoPoint + 'static,
        Out: NewCartesianPoint2d + 'static,
    {
        Err(TypesError::Projection(format!(
            "{self} requires the `geodesy` feature"
        )))
    }

    /// Returns a projection converting points of this CRS into the `target` CRS through geographic coordinates.
    pub fn transformation_to<P>(
        &self,
        target: &Crs,
    ) -> Result<ChainProjection<P, GeoPoint2d, P>, TypesError>
    where
        P: NewCartesianPoint2d + 'static,
    {
        let from = self.get_projection::<GeoPoint2d, P>()?;
        let to = target.get_projection::<GeoPoint2d, P>()?;

        Ok(ChainProjection::new(
            Box::new(InvertedProjection::new(from)),
            to,
        ))
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

impl FromStr for Crs {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CrsRegistry::global().parse(s)
    }
}

impl TryFrom<String> for Crs {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Crs> for String {
    fn from(value: Crs) -> Self {
        value.to_string()
    }
}
