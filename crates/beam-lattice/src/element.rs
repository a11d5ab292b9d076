//! Element contract and the statically dispatched [`Element`] enum.

use beam_core::errors::{BeamError, ErrorInfo};
use beam_core::{PhaseSpace, RefPart};
use serde::{Deserialize, Serialize};

use crate::thick::{ConstF, Drift, Quad, Sbend};
use crate::thin::{DipEdge, Marker, Multipole, NonlinearLens, ShortRF};

/// Behaviour shared by every beamline element.
///
/// `push_particle` applies the map of a single slice of length
/// `ds() / nslice()` using the reference particle at the start of that slice.
pub trait BeamlineElement {
    /// Element type name.
    fn name(&self) -> &'static str;

    /// Segment length in m; zero for thin elements.
    fn ds(&self) -> f64;

    /// Number of slices the element is split into.
    fn nslice(&self) -> usize {
        1
    }

    /// Length of one slice.
    fn slice_ds(&self) -> f64 {
        self.ds() / self.nslice() as f64
    }

    /// Pushes one particle through a slice.
    fn push_particle(&self, p: &mut PhaseSpace, refpart: &RefPart);

    /// Pushes the reference particle through a slice.
    fn push_ref(&self, _refpart: &mut RefPart) {}
}

/// Any supported element. The default is the no-op [`Marker`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    /// See [`Marker`].
    Marker(Marker),
    /// See [`ConstF`].
    ConstF(ConstF),
    /// See [`DipEdge`].
    DipEdge(DipEdge),
    /// See [`Drift`].
    Drift(Drift),
    /// See [`Multipole`].
    Multipole(Multipole),
    /// See [`NonlinearLens`].
    #[serde(rename = "nonlinear_lens")]
    NonlinearLens(NonlinearLens),
    /// See [`Quad`].
    Quad(Quad),
    /// See [`Sbend`].
    Sbend(Sbend),
    /// See [`ShortRF`].
    ShortRF(ShortRF),
}

impl Default for Element {
    fn default() -> Self {
        Element::Marker(Marker {})
    }
}

macro_rules! dispatch {
    ($self:ident, $inner:ident => $body:expr) => {
        match $self {
            Element::Marker($inner) => $body,
            Element::ConstF($inner) => $body,
            Element::DipEdge($inner) => $body,
            Element::Drift($inner) => $body,
            Element::Multipole($inner) => $body,
            Element::NonlinearLens($inner) => $body,
            Element::Quad($inner) => $body,
            Element::Sbend($inner) => $body,
            Element::ShortRF($inner) => $body,
        }
    };
}

impl BeamlineElement for Element {
    fn name(&self) -> &'static str {
        dispatch!(self, e => e.name())
    }

    fn ds(&self) -> f64 {
        dispatch!(self, e => e.ds())
    }

    fn nslice(&self) -> usize {
        dispatch!(self, e => e.nslice())
    }

    fn push_particle(&self, p: &mut PhaseSpace, refpart: &RefPart) {
        dispatch!(self, e => e.push_particle(p, refpart))
    }

    fn push_ref(&self, refpart: &mut RefPart) {
        dispatch!(self, e => e.push_ref(refpart))
    }
}

impl Element {
    /// Re-checks parameters, used after deserialisation.
    pub fn validate(&self) -> Result<(), BeamError> {
        match self {
            Element::Marker(_) => Ok(()),
            Element::ConstF(e) => ConstF::new(e.ds, e.kx, e.ky, e.kt, e.nslice).map(drop),
            Element::DipEdge(e) => DipEdge::new(e.psi, e.rc, e.g, e.k2).map(drop),
            Element::Drift(e) => Drift::new(e.ds, e.nslice).map(drop),
            Element::Multipole(e) => Multipole::new(e.m, e.kn, e.ks).map(drop),
            Element::NonlinearLens(e) => NonlinearLens::new(e.knll, e.cnll).map(drop),
            Element::Quad(e) => Quad::new(e.ds, e.k, e.nslice).map(drop),
            Element::Sbend(e) => Sbend::new(e.ds, e.rc, e.nslice).map(drop),
            Element::ShortRF(e) => ShortRF::new(e.v, e.k).map(drop),
        }
    }
}

macro_rules! impl_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(impl From<$ty> for Element {
            fn from(value: $ty) -> Self {
                Element::$variant(value)
            }
        })*
    };
}

impl_from!(
    Marker(Marker),
    ConstF(ConstF),
    DipEdge(DipEdge),
    Drift(Drift),
    Multipole(Multipole),
    NonlinearLens(NonlinearLens),
    Quad(Quad),
    Sbend(Sbend),
    ShortRF(ShortRF),
);

pub(crate) fn check_finite(element: &str, params: &[(&str, f64)]) -> Result<(), BeamError> {
    for (key, value) in params {
        if !value.is_finite() {
            return Err(BeamError::Lattice(
                ErrorInfo::new("non-finite-parameter", "element parameters must be finite")
                    .with_context("element", element)
                    .with_context("parameter", *key)
                    .with_context("value", value.to_string()),
            ));
        }
    }
    Ok(())
}

pub(crate) fn check_nslice(element: &str, nslice: usize) -> Result<(), BeamError> {
    if nslice == 0 {
        return Err(BeamError::Lattice(
            ErrorInfo::new("zero-slices", "nslice must be at least 1").with_context("element", element),
        ));
    }
    Ok(())
}

pub(crate) fn check_nonzero(element: &str, key: &str, value: f64) -> Result<(), BeamError> {
    if value == 0.0 {
        return Err(BeamError::Lattice(
            ErrorInfo::new("zero-parameter", "parameter must be non-zero")
                .with_context("element", element)
                .with_context("parameter", key),
        ));
    }
    Ok(())
}
