//! Query parameter parsing for `/code`
//!
//! Missing or empty `data` is a 400; any other malformed or out-of-range value
//! is rejected as 422 before code generation runs.

use crate::codes::{CodeRequest, OutputFormat, Symbology};
use crate::config::CodesConfig;
use hyper::StatusCode;
use std::collections::HashMap;
use thiserror::Error;

const DEFAULT_SCALE: u32 = 8;
const DEFAULT_BORDER: u32 = 2;

/// Schema-level rejection of a `/code` query
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParamError {
    #[error("query parameter 'data' is required")]
    MissingData,

    #[error("query parameter 'data' must not be empty")]
    EmptyData,

    #[error("invalid value for '{name}': {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl ParamError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            name,
            reason: reason.into(),
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingData | Self::EmptyData => StatusCode::BAD_REQUEST,
            Self::Invalid { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

/// Parse a raw query string into a [`CodeRequest`]
///
/// Values are percent-decoded; for repeated keys the last one wins.
pub fn parse_code_request(
    query: Option<&str>,
    limits: &CodesConfig,
) -> Result<CodeRequest, ParamError> {
    let params: HashMap<String, String> = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .into_owned()
        .collect();
    let get = |name: &str| params.get(name).map(String::as_str);

    let data = get("data").ok_or(ParamError::MissingData)?;
    if data.is_empty() {
        return Err(ParamError::EmptyData);
    }

    let symbology = match get("type") {
        None => Symbology::Qr,
        Some(v) => Symbology::parse(v).ok_or_else(|| {
            ParamError::invalid(
                "type",
                format!("'{v}' is not one of qr, code128, code39, ean13, upca, itf, datamatrix"),
            )
        })?,
    };

    let format = match get("fmt") {
        None => OutputFormat::Png,
        Some(v) => OutputFormat::parse(v)
            .ok_or_else(|| ParamError::invalid("fmt", format!("'{v}' is not one of png, svg")))?,
    };

    Ok(CodeRequest {
        data: data.to_string(),
        symbology,
        format,
        show_text: parse_bool("txt", get("txt"), true)?,
        micro_qr: parse_bool("micro", get("micro"), false)?,
        scale: parse_int("scale", get("scale"), DEFAULT_SCALE, 1, limits.max_scale)?,
        border: parse_int("border", get("border"), DEFAULT_BORDER, 0, limits.max_border)?,
    })
}

fn parse_bool(name: &'static str, value: Option<&str>, default: bool) -> Result<bool, ParamError> {
    let Some(v) = value else {
        return Ok(default);
    };
    match v.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Ok(true),
        "false" | "0" | "no" | "off" | "f" | "n" => Ok(false),
        _ => Err(ParamError::invalid(name, format!("'{v}' is not a boolean"))),
    }
}

fn parse_int(
    name: &'static str,
    value: Option<&str>,
    default: u32,
    min: u32,
    max: u32,
) -> Result<u32, ParamError> {
    let Some(v) = value else {
        return Ok(default);
    };
    let n: i64 = v
        .trim()
        .parse()
        .map_err(|_| ParamError::invalid(name, format!("'{v}' is not an integer")))?;
    u32::try_from(n)
        .ok()
        .filter(|n| (min..=max).contains(n))
        .ok_or_else(|| ParamError::invalid(name, format!("must be between {min} and {max}")))
}
