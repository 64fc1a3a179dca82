/// Conversion of points between two coordinate systems.
///
/// Both directions may fail (return `None`), for example when a point lies outside of the valid domain of the
/// projection.
pub trait Projection {
    /// Source point type.
    type InPoint;
    /// Target point type.
    type OutPoint;

    /// Converts a source point into the target system.
    fn project(&self, input: &Self::InPoint) -> Option<Self::OutPoint>;
    /// Converts a target point back into the source system.
    fn unproject(&self, input: &Self::OutPoint) -> Option<Self::InPoint>;
}

/// Projection that swaps the directions of the wrapped one.
pub struct InvertedProjection<In, Out> {
    inner: Box<dyn Projection<InPoint = Out, OutPoint = In>>,
}

impl<In, Out> InvertedProjection<In, Out> {
    /// Wraps `inner`.
    pub fn new(inner: Box<dyn Projection<InPoint = Out, OutPoint = In>>) -> Self {
        Self { inner }
    }
}

impl<In, Out> Projection for InvertedProjection<In, Out> {
    type InPoint = In;
    type OutPoint = Out;

    fn project(&self, input: &In) -> Option<Out> {
        self.inner.unproject(input)
    }

    fn unproject(&self, input: &Out) -> Option<In> {
        self.inner.project(input)
    }
}

/// Two projections applied one after another.
pub struct ChainProjection<In, Mid, Out> {
    first: Box<dyn Projection<InPoint = In, OutPoint = Mid>>,
    second: Box<dyn Projection<InPoint = Mid, OutPoint = Out>>,
}

impl<In, Mid, Out> ChainProjection<In, Mid, Out> {
    /// Creates a projection that applies `first` and then `second`.
    pub fn new(
        first: Box<dyn Projection<InPoint = In, OutPoint = Mid>>,
        second: Box<dyn Projection<InPoint = Mid, OutPoint = Out>>,
    ) -> Self {
        Self { first, second }
    }
}

impl<In, Mid, Out> Projection for ChainProjection<In, Mid, Out> {
    type InPoint = In;
    type OutPoint = Out;

    fn project(&self, input: &In) -> Option<Out> {
        self.second.project(&self.first.project(input)?)
    }

    fn unproject(&self, input: &Out) -> Option<In> {
        self.first.unproject(&self.second.unproject(input)?)
    }
}
