//! Encoding and decoding of dotted element paths.
//!
//! A path has the grammar `base[.column][.period]` where `period` is one of
//! `current`, `prev` or `prev-N`. Which suffix a segment denotes depends on
//! the element: a segment after `base` is a column when the element exposes
//! columns, otherwise a period when the element supports candle lookups.

use crate::registry::ElementRegistry;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Relative candle an element value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Period {
    Current,
    Prev,
    PrevN(u32),
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Current => write!(f, "current"),
            Period::Prev => write!(f, "prev"),
            Period::PrevN(n) => write!(f, "prev-{}", n),
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current" => Ok(Period::Current),
            "prev" => Ok(Period::Prev),
            other => other
                .strip_prefix("prev-")
                .and_then(|n| n.parse::<u32>().ok())
                .filter(|n| *n > 0)
                .map(Period::PrevN)
                .ok_or_else(|| format!("Invalid period token '{}'", other)),
        }
    }
}

impl TryFrom<String> for Period {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

impl Period {
    /// The `nValue` a `prev-n` period carries.
    pub fn n_value(&self) -> Option<u32> {
        match self {
            Period::PrevN(n) => Some(*n),
            _ => None,
        }
    }
}

/// A decoded reference to an element value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    pub base: String,
    pub column: Option<String>,
    pub period: Option<Period>,
}

impl ElementRef {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            column: None,
            period: None,
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    pub fn encode(&self) -> String {
        let period = self.period.map(|p| p.to_string());
        std::iter::once(self.base.as_str())
            .chain(self.column.as_deref())
            .chain(period.as_deref())
            .join(".")
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Decodes a dotted path using the element's registry options.
///
/// Paths that cannot be resolved (unknown element, unexpected or malformed
/// suffixes) come back as a bare reference holding the raw path, so callers
/// can still display and flag them.
pub fn decode(path: &str, registry: &dyn ElementRegistry) -> ElementRef {
    let mut segments = path.split('.');
    let base = segments.next().unwrap_or_default();
    let rest: Vec<&str> = segments.collect();

    let Some(options) = registry.options(base) else {
        debug!(path, "unresolvable element reference");
        return ElementRef::new(path);
    };

    let decoded = if options.has_columns() {
        match rest.as_slice() {
            [] => Some(ElementRef::new(base)),
            [column] => Some(ElementRef::new(base).with_column(*column)),
            [column, period] => period
                .parse::<Period>()
                .ok()
                .map(|p| ElementRef::new(base).with_column(*column).with_period(p)),
            _ => None,
        }
    } else if options.candle_location {
        match rest.as_slice() {
            [] => Some(ElementRef::new(base)),
            [period] => period
                .parse::<Period>()
                .ok()
                .map(|p| ElementRef::new(base).with_period(p)),
            _ => None,
        }
    } else if rest.is_empty() {
        Some(ElementRef::new(base))
    } else {
        None
    };

    decoded.unwrap_or_else(|| {
        debug!(path, "path suffix does not match element options");
        ElementRef::new(path)
    })
}
