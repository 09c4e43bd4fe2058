use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of raw data feed a data point draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataKind {
    #[serde(rename = "candleData")]
    CandleData,
    #[serde(rename = "dte")]
    Dte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Ema,
    Sma,
    Supertrend,
}

/// A named data source referenced by conditions and indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub id: String,
    pub name: String,
    pub kind: DataKind,
    #[serde(default)]
    pub params: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorParams {
    pub length: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
}

/// A technical indicator computed over a data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub id: String,
    pub name: String,
    pub kind: IndicatorKind,
    pub on_data: String,
    #[serde(default)]
    pub columns: Vec<String>,
    pub params: IndicatorParams,
}

/// Wire form of a [`DataPoint`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPointDef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DataKind,
    #[serde(default)]
    pub params: Map<String, Value>,
}

/// Wire form of an [`Indicator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorDef {
    pub name: String,
    pub indicator: IndicatorKind,
    pub on_data: String,
    #[serde(default)]
    pub on_entire_data: bool,
    #[serde(default)]
    pub columns: Vec<String>,
    pub params: IndicatorParams,
}

impl DataPoint {
    pub fn to_def(&self) -> DataPointDef {
        DataPointDef {
            name: self.name.clone(),
            kind: self.kind,
            params: self.params.clone(),
        }
    }

    pub fn from_def(id: String, def: DataPointDef) -> Self {
        Self {
            id,
            name: def.name,
            kind: def.kind,
            params: def.params,
        }
    }
}

impl Indicator {
    pub fn to_def(&self) -> IndicatorDef {
        IndicatorDef {
            name: self.name.clone(),
            indicator: self.kind,
            on_data: self.on_data.clone(),
            on_entire_data: false,
            columns: self.columns.clone(),
            params: self.params.clone(),
        }
    }

    pub fn from_def(id: String, def: IndicatorDef) -> Self {
        Self {
            id,
            name: def.name,
            kind: def.indicator,
            on_data: def.on_data,
            columns: def.columns,
            params: def.params,
        }
    }
}
