use crate::cartesian::NewCartesianPoint2d;
use crate::error::TypesError;
use crate::geo::traits::point::NewGeoPoint;
use crate::geo::traits::projection::Projection;
use geodesy::prelude::*;
use std::fmt;
use std::marker::PhantomData;

/// Projection evaluated by the `geodesy` crate from an operator definition, e.g. `utm zone=33`.
///
/// Every instance owns its own context, so instances are never shared between measurements.
pub struct GeodesyProjection<In, Out> {
    definition: String,
    context: Minimal,
    op: OpHandle,
    phantom_in: PhantomData<In>,
    phantom_out: PhantomData<Out>,
}

impl<In, Out> GeodesyProjection<In, Out> {
    /// Instantiates the operator. Fails if `geodesy` rejects the definition.
    pub fn new(definition: &str) -> Result<Self, TypesError> {
        let mut context = Minimal::new();
        let op = context
            .op(definition)
            .map_err(|err| TypesError::Projection(format!("'{definition}': {err}")))?;
        Ok(Self {
            definition: definition.to_string(),
            context,
            op,
            phantom_in: Default::default(),
            phantom_out: Default::default(),
        })
    }
}

impl<In, Out> fmt::Debug for GeodesyProjection<In, Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeodesyProjection")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

impl<In: NewGeoPoint<f64>, Out: NewCartesianPoint2d<f64>> Projection
    for GeodesyProjection<In, Out>
{
    type InPoint = In;
    type OutPoint = Out;

    fn project(&self, input: &Self::InPoint) -> Option<Self::OutPoint> {
        let mut data = [Coor2D::geo(input.lat(), input.lon())];
        self.context.apply(self.op, Fwd, &mut data).ok()?;

        if !data[0].0[0].is_finite() || !data[0].0[1].is_finite() {
            return None;
        }

        Some(Out::new(data[0].0[0], data[0].0[1]))
    }

    fn unproject(&self, input: &Self::OutPoint) -> Option<Self::InPoint> {
        let mut data = [Coor2D([input.x(), input.y()])];
        self.context.apply(self.op, Inv, &mut data).ok()?;

        if !data[0].0[0].is_finite() || !data[0].0[1].is_finite() {
            return None;
        }

        Some(In::latlon(
            data[0].0[1].to_degrees(),
            data[0].0[0].to_degrees(),
        ))
    }
}
