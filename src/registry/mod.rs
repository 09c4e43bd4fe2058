//! Read-only lookup of the named elements a condition can reference.
//!
//! Conditions refer to data points, indicators and a handful of builtin
//! enumerations by name. The path resolver and the condition compiler only
//! need to know what shape an element's value has, which is captured by
//! [`ElementOptions`].

use crate::elements::{DataKind, DataPoint, Indicator};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Builtin elements compared directly against an enumerated catalog value.
pub const ENUMERATED_ELEMENTS: [&str; 3] = ["day_of_week", "candle_time", "candle_close_time"];

/// Columns exposed by every candle data point.
pub const CANDLE_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

/// Broad category of an element, used when deciding how literals are coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementKind {
    CandleData,
    Dte,
    Indicator,
    Enumerated,
}

/// Capabilities of a single element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementOptions {
    pub kind: ElementKind,
    #[serde(default)]
    pub columns_available: Vec<String>,
    #[serde(default)]
    pub candle_location: bool,
    #[serde(default)]
    pub can_compared_with: Vec<String>,
}

impl ElementOptions {
    pub fn candle_data() -> Self {
        Self {
            kind: ElementKind::CandleData,
            columns_available: CANDLE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            candle_location: true,
            can_compared_with: comparable(&["candleData", "indicator", "values"]),
        }
    }

    pub fn dte() -> Self {
        Self {
            kind: ElementKind::Dte,
            columns_available: Vec::new(),
            candle_location: false,
            can_compared_with: comparable(&["int"]),
        }
    }

    pub fn indicator(columns: &[String]) -> Self {
        Self {
            kind: ElementKind::Indicator,
            columns_available: columns.to_vec(),
            candle_location: true,
            can_compared_with: comparable(&["candleData", "indicator", "values"]),
        }
    }

    pub fn enumerated() -> Self {
        Self {
            kind: ElementKind::Enumerated,
            columns_available: Vec::new(),
            candle_location: false,
            can_compared_with: comparable(&["enum"]),
        }
    }

    pub fn has_columns(&self) -> bool {
        !self.columns_available.is_empty()
    }

    /// True when literals compared against this element are numbers.
    pub fn compares_numerically(&self) -> bool {
        self.kind == ElementKind::Dte
            || self
                .can_compared_with
                .iter()
                .any(|c| c == "int" || c == "values")
    }
}

fn comparable(kinds: &[&str]) -> Vec<String> {
    kinds.iter().map(|k| k.to_string()).collect()
}

/// Returns true for builtin elements whose right-hand side is an enumerated token.
pub fn is_enumerated(name: &str) -> bool {
    ENUMERATED_ELEMENTS.contains(&name)
}

/// Defines the contract for resolving an element name into its options.
pub trait ElementRegistry: Send + Sync {
    fn options(&self, name: &str) -> Option<&ElementOptions>;

    fn contains(&self, name: &str) -> bool {
        self.options(name).is_some()
    }
}

/// The default registry, built from a strategy's declared elements.
#[derive(Debug, Clone, Default)]
pub struct ElementCatalog {
    elements: AHashMap<String, ElementOptions>,
}

impl ElementCatalog {
    /// An empty catalog with only the builtin enumerated elements.
    pub fn new() -> Self {
        let mut catalog = Self::default();
        for name in ENUMERATED_ELEMENTS {
            catalog
                .elements
                .insert(name.to_string(), ElementOptions::enumerated());
        }
        catalog
    }

    pub fn from_elements(data_points: &[DataPoint], indicators: &[Indicator]) -> Self {
        let mut catalog = Self::new();
        for point in data_points {
            let options = match point.kind {
                DataKind::CandleData => ElementOptions::candle_data(),
                DataKind::Dte => ElementOptions::dte(),
            };
            catalog.insert(&point.name, options);
        }
        for indicator in indicators {
            catalog.insert(&indicator.name, ElementOptions::indicator(&indicator.columns));
        }
        catalog
    }

    pub fn insert(&mut self, name: &str, options: ElementOptions) {
        self.elements.insert(name.to_string(), options);
    }

    pub fn with_element(mut self, name: &str, options: ElementOptions) -> Self {
        self.insert(name, options);
        self
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl ElementRegistry for ElementCatalog {
    fn options(&self, name: &str) -> Option<&ElementOptions> {
        self.elements.get(name)
    }
}
