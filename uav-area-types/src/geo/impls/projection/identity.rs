use crate::cartesian::NewCartesianPoint2d;
use crate::geo::traits::point::NewGeoPoint;
use crate::geo::traits::projection::Projection;
use std::marker::PhantomData;

/// Projection of geographic points into a plane without any transformation: `x` is the longitude and `y` is the
/// latitude, both in degrees.
#[derive(Debug, Default)]
pub struct IdentityProjection<In, Out> {
    phantom_in: PhantomData<In>,
    phantom_out: PhantomData<Out>,
}

impl<In, Out> IdentityProjection<In, Out> {
    /// Creates a new instance.
    pub fn new() -> Self {
        Self {
            phantom_in: Default::default(),
            phantom_out: Default::default(),
        }
    }
}

impl<In: NewGeoPoint<f64>, Out: NewCartesianPoint2d<f64>> Projection
    for IdentityProjection<In, Out>
{
    type InPoint = In;
    type OutPoint = Out;

    fn project(&self, input: &Self::InPoint) -> Option<Self::OutPoint> {
        Some(Out::new(input.lon(), input.lat()))
    }

    fn unproject(&self, input: &Self::OutPoint) -> Option<Self::InPoint> {
        Some(In::lonlat(input.x(), input.y()))
    }
}
