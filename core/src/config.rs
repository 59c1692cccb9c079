use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::types::Variant;

pub const VARIANT_ENV: &str = "REGSERVE_VARIANT";
const API_ADDR_ENV: &str = "REGSERVE_API_ADDR";
const MODEL_PATH_ENV: &str = "REGSERVE_MODEL_PATH";
const SCALER_PATH_ENV: &str = "REGSERVE_SCALER_PATH";
const STATIC_DIR_ENV: &str = "REGSERVE_STATIC_DIR";
const CORS_ORIGIN_ENV: &str = "REGSERVE_CORS_ORIGIN";
const LEGACY_STATUS_ENV: &str = "REGSERVE_LEGACY_ERROR_STATUS";

const DEFAULT_API_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5000,http://127.0.0.1:5000";

#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub variant: Variant,
    pub api_addr: SocketAddr,
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub static_dir: PathBuf,
    pub cors_origin: String,
    /// Answer every failure with HTTP 200 and an `error` field.
    pub legacy_error_status: bool,
}

impl ServeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `--variant=<name>` on the command line wins over the environment.
    pub fn from_env_and_args(args: &[String]) -> Result<Self, ConfigError> {
        let variant = match variant_arg(args) {
            Some(value) => value,
            None => return Self::from_env(),
        };

        Self::from_lookup(|key| {
            if key == VARIANT_ENV {
                Some(variant.to_string())
            } else {
                std::env::var(key).ok()
            }
        })
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let variant = match non_blank(lookup(VARIANT_ENV)) {
            Some(value) => Variant::parse(&value).ok_or(ConfigError::UnknownVariant(value))?,
            None => Variant::EmployeeSalary,
        };

        let api_addr_raw =
            non_blank(lookup(API_ADDR_ENV)).unwrap_or_else(|| DEFAULT_API_ADDR.to_string());
        let api_addr = api_addr_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidAddr(api_addr_raw.clone()))?;

        let schema = variant.schema();
        let model_path = non_blank(lookup(MODEL_PATH_ENV))
            .map(PathBuf::from)
            .unwrap_or_else(|| default_artifact_dir(variant).join(schema.model_file));
        let scaler_path = non_blank(lookup(SCALER_PATH_ENV))
            .map(PathBuf::from)
            .unwrap_or_else(|| default_artifact_dir(variant).join(schema.scaler_file));
        let static_dir = non_blank(lookup(STATIC_DIR_ENV))
            .map(PathBuf::from)
            .unwrap_or_else(|| default_static_dir(variant));

        let cors_origin =
            non_blank(lookup(CORS_ORIGIN_ENV)).unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());
        let legacy_error_status = parse_bool(lookup(LEGACY_STATUS_ENV), false);

        Ok(ServeConfig {
            variant,
            api_addr,
            model_path,
            scaler_path,
            static_dir,
            cors_origin,
            legacy_error_status,
        })
    }
}

fn variant_arg(args: &[String]) -> Option<&str> {
    args.iter().find_map(|arg| arg.strip_prefix("--variant="))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    value
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

fn default_artifact_dir(variant: Variant) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("models")
        .join(variant.as_str())
}

fn default_static_dir(variant: Variant) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("static")
        .join(variant.as_str())
}
