use serde::Serialize;
use serde_json::{Map, Value};

use crate::banding::Band;
use crate::error::PredictError;

// ============================================================================
// VARIANTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    EmployeeSalary,
    StockMarket,
    WfhBurnout,
}

impl Variant {
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "salary" | "employee_salary" | "employee_sal" => Some(Variant::EmployeeSalary),
            "stock" | "stock_market" | "stock_market_pred" => Some(Variant::StockMarket),
            "burnout" | "wfh_burnout" => Some(Variant::WfhBurnout),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::EmployeeSalary => "employee_salary",
            Variant::StockMarket => "stock_market",
            Variant::WfhBurnout => "wfh_burnout",
        }
    }
}

// ============================================================================
// FEATURES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Float,
    Integer,
}

impl FieldKind {
    fn describe(&self) -> &'static str {
        match self {
            FieldKind::Float => "a number",
            FieldKind::Integer => "an integer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FeatureSpec {
    pub const fn float(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Float,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Integer,
        }
    }
}

/// Feature values in the exact order the artifacts were fitted with.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn extract(features: &[FeatureSpec], body: &Map<String, Value>) -> Result<Self, PredictError> {
        let values = features
            .iter()
            .map(|spec| read_field(spec, body))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { values })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn value_of(&self, features: &[FeatureSpec], name: &str) -> Option<f64> {
        features
            .iter()
            .position(|spec| spec.name == name)
            .and_then(|index| self.values.get(index).copied())
    }
}

fn read_field(spec: &FeatureSpec, body: &Map<String, Value>) -> Result<f64, PredictError> {
    let value = body.get(spec.name).ok_or_else(|| {
        PredictError::InvalidInput(format!("missing required field '{}'", spec.name))
    })?;

    let parsed = match spec.kind {
        FieldKind::Float => parse_float(value),
        FieldKind::Integer => parse_integer(value),
    };

    match parsed {
        Some(number) if number.is_finite() => Ok(number),
        Some(_) => Err(PredictError::InvalidInput(format!(
            "field '{}' must be a finite number",
            spec.name
        ))),
        None => Err(PredictError::InvalidInput(format!(
            "field '{}' must be {}, got {}",
            spec.name,
            spec.kind.describe(),
            value
        ))),
    }
}

fn parse_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
}

// JSON floats truncate toward zero; strings must hold an integer literal.
fn parse_integer(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => match number.as_i64() {
            Some(integer) => Some(integer as f64),
            None => number.as_f64().map(f64::trunc),
        },
        Value::String(text) => text.trim().parse::<i64>().ok().map(|integer| integer as f64),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
}

// ============================================================================
// RESULTS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub rounded: f64,
    pub band: Option<&'static Band>,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
