//! Ordered list of beamline elements.

use std::path::Path;

use beam_core::errors::{BeamError, ErrorInfo};
use serde::{Deserialize, Serialize};

use crate::element::{BeamlineElement, Element};

/// Ordered list of beamline elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lattice {
    elements: Vec<Element>,
}

impl Lattice {
    /// Builds a lattice after validating every element.
    pub fn new(elements: Vec<Element>) -> Result<Self, BeamError> {
        for (index, element) in elements.iter().enumerate() {
            element.validate().map_err(|err| with_index(err, index))?;
        }
        Ok(Self { elements })
    }

    /// Parses a YAML sequence of tagged element specs.
    pub fn from_yaml_str(text: &str) -> Result<Self, BeamError> {
        let elements: Vec<Element> = serde_yaml::from_str(text).map_err(|err| {
            BeamError::Parse(ErrorInfo::new("lattice-yaml", err.to_string()))
        })?;
        Self::new(elements)
    }

    /// Loads a YAML element list from disk.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, BeamError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| BeamError::io("lattice-read", path, err))?;
        Self::from_yaml_str(&text)
    }

    /// Appends an element.
    pub fn push(&mut self, element: impl Into<Element>) {
        self.elements.push(element.into());
    }

    /// Appends all elements of `other`.
    pub fn extend(&mut self, other: Lattice) {
        self.elements.extend(other.elements);
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the lattice has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates over the elements in beam order.
    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }

    /// Elements in beam order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Sum of all element lengths.
    pub fn total_length(&self) -> f64 {
        self.elements.iter().map(BeamlineElement::ds).sum()
    }

    /// Total number of slices pushed by a full pass.
    pub fn total_slices(&self) -> usize {
        self.elements.iter().map(BeamlineElement::nslice).sum()
    }
}

impl<'a> IntoIterator for &'a Lattice {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

fn with_index(err: BeamError, index: usize) -> BeamError {
    match err {
        BeamError::Lattice(info) => BeamError::Lattice(info.with_context("index", index.to_string())),
        other => other,
    }
}
