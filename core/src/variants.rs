use serde::Serialize;

use crate::banding::{classify, Band, BURNOUT_BANDS, SALARY_BANDS};
use crate::error::PredictError;
use crate::types::{round2, FeatureSpec, FeatureVector, PredictionResult, Variant};

/// Everything that differs between deployments: fields, constraints, bands,
/// response shape and default artifact names.
#[derive(Debug)]
pub struct VariantSchema {
    pub variant: Variant,
    pub title: &'static str,
    pub features: &'static [FeatureSpec],
    pub bands: Option<&'static [Band]>,
    pub model_file: &'static str,
    pub scaler_file: &'static str,
}

const SALARY_FEATURES: &[FeatureSpec] = &[FeatureSpec::float("age"), FeatureSpec::float("experience")];

const STOCK_FEATURES: &[FeatureSpec] = &[
    FeatureSpec::float("open"),
    FeatureSpec::float("high"),
    FeatureSpec::float("low"),
    FeatureSpec::float("close"),
    FeatureSpec::float("volume"),
    FeatureSpec::integer("year"),
    FeatureSpec::integer("month"),
    FeatureSpec::integer("day"),
];

const BURNOUT_FEATURES: &[FeatureSpec] = &[
    FeatureSpec::float("work_hours"),
    FeatureSpec::float("screen_time_hours"),
    FeatureSpec::integer("meetings_count"),
    FeatureSpec::integer("breaks_taken"),
    FeatureSpec::integer("after_hours_work"),
    FeatureSpec::float("sleep_hours"),
    FeatureSpec::float("task_completion_rate"),
    FeatureSpec::integer("day_type_Weekend"),
];

static SALARY: VariantSchema = VariantSchema {
    variant: Variant::EmployeeSalary,
    title: "Employee Salary Prediction",
    features: SALARY_FEATURES,
    bands: Some(SALARY_BANDS),
    model_file: "adp_linear_regression_model.json",
    scaler_file: "adp_scaler.json",
};

static STOCK: VariantSchema = VariantSchema {
    variant: Variant::StockMarket,
    title: "Stock Price Prediction",
    features: STOCK_FEATURES,
    bands: None,
    model_file: "adp_linear_regression_model.json",
    scaler_file: "adp_scaler.json",
};

static BURNOUT: VariantSchema = VariantSchema {
    variant: Variant::WfhBurnout,
    title: "WFH Burnout Prediction",
    features: BURNOUT_FEATURES,
    bands: Some(BURNOUT_BANDS),
    model_file: "burnout_linear_regression_model.json",
    scaler_file: "burnout_scaler.json",
};

impl Variant {
    pub fn schema(&self) -> &'static VariantSchema {
        match self {
            Variant::EmployeeSalary => &SALARY,
            Variant::StockMarket => &STOCK,
            Variant::WfhBurnout => &BURNOUT,
        }
    }
}

/// Success body of `/predict`; each variant keeps its own field names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PredictionResponse {
    Salary {
        predicted_salary: f64,
        salary_level: &'static str,
        message: &'static str,
        age: f64,
        experience: f64,
    },
    Stock {
        prediction: f64,
    },
    Burnout {
        burnout_score: f64,
        burnout_level: &'static str,
        message: &'static str,
    },
}

impl VariantSchema {
    pub fn feature_names(&self) -> Vec<&'static str> {
        self.features.iter().map(|spec| spec.name).collect()
    }

    pub fn validate(&self, features: &FeatureVector) -> Result<(), PredictError> {
        match self.variant {
            Variant::EmployeeSalary => {
                let age = self.required(features, "age")?;
                let experience = self.required(features, "experience")?;

                if !(18.0..=100.0).contains(&age) {
                    return Err(PredictError::OutOfRange(
                        "Age must be between 18 and 100".to_string(),
                    ));
                }

                if experience < 0.0 || experience > age - 18.0 {
                    return Err(PredictError::OutOfRange(
                        "Experience cannot be negative or greater than (age - 18)".to_string(),
                    ));
                }
                Ok(())
            }
            Variant::StockMarket | Variant::WfhBurnout => Ok(()),
        }
    }

    pub fn classify(&self, prediction: f64) -> Result<PredictionResult, PredictError> {
        let band = match self.bands {
            Some(bands) => Some(classify(bands, prediction).ok_or_else(|| {
                PredictError::Inference(format!("no label band covers {}", prediction))
            })?),
            None => None,
        };

        Ok(PredictionResult {
            rounded: round2(prediction),
            band,
        })
    }

    pub fn respond(
        &self,
        features: &FeatureVector,
        result: &PredictionResult,
    ) -> Result<PredictionResponse, PredictError> {
        match self.variant {
            Variant::EmployeeSalary => {
                let band = self.band_of(result)?;
                Ok(PredictionResponse::Salary {
                    predicted_salary: result.rounded,
                    salary_level: band.label,
                    message: band.message,
                    age: self.required(features, "age")?,
                    experience: self.required(features, "experience")?,
                })
            }
            Variant::StockMarket => Ok(PredictionResponse::Stock {
                prediction: result.rounded,
            }),
            Variant::WfhBurnout => {
                let band = self.band_of(result)?;
                Ok(PredictionResponse::Burnout {
                    burnout_score: result.rounded,
                    burnout_level: band.label,
                    message: band.message,
                })
            }
        }
    }

    fn band_of(&self, result: &PredictionResult) -> Result<&'static Band, PredictError> {
        result
            .band
            .ok_or_else(|| PredictError::Inference("prediction has no label band".to_string()))
    }

    fn required(&self, features: &FeatureVector, name: &str) -> Result<f64, PredictError> {
        features
            .value_of(self.features, name)
            .ok_or_else(|| PredictError::InvalidInput(format!("missing required field '{}'", name)))
    }
}
