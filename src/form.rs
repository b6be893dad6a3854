// =============================================================================
// Indicator Form — field declarations and validation
// =============================================================================
//
// Mirrors the four inputs of the dashboard form.  Validation collects every
// field error rather than stopping at the first, so the re-rendered form can
// show them all at once.
// =============================================================================

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::types::{Function, IndicatorRequest, Interval, SeriesType};

pub const SYMBOL_MAX_LEN: usize = 10;
pub const SYMBOL_INITIAL: &str = "IBM";

pub const FIELD_SYMBOL: &str = "symbol";
pub const FIELD_FUNCTION: &str = "function";
pub const FIELD_INTERVAL: &str = "interval";
pub const FIELD_SERIES_TYPE: &str = "series_type";

const REQUIRED: &str = "This field is required.";

/// Field-level validation failures, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("invalid form input: {}", summary(.0))]
pub struct FormErrors(pub BTreeMap<&'static str, Vec<String>>);

fn summary(errors: &BTreeMap<&'static str, Vec<String>>) -> String {
    errors
        .iter()
        .map(|(field, msgs)| format!("{field}: {}", msgs.join(" ")))
        .collect::<Vec<_>>()
        .join("; ")
}

impl FormErrors {
    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Values shown in the form inputs: either the initials or what the user sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    pub symbol: String,
    pub function: String,
    pub interval: String,
    pub series_type: String,
}

impl Default for FormValues {
    fn default() -> Self {
        Self {
            symbol: SYMBOL_INITIAL.to_string(),
            function: Function::default().as_str().to_string(),
            interval: Interval::default().as_str().to_string(),
            series_type: SeriesType::default().as_str().to_string(),
        }
    }
}

impl FormValues {
    /// Echo back raw submitted input (missing fields become empty).
    pub fn from_raw(raw: &HashMap<String, String>) -> Self {
        let get = |k: &str| raw.get(k).cloned().unwrap_or_default();
        Self {
            symbol: get(FIELD_SYMBOL),
            function: get(FIELD_FUNCTION),
            interval: get(FIELD_INTERVAL),
            series_type: get(FIELD_SERIES_TYPE),
        }
    }
}

/// Validate raw key/value input into an [`IndicatorRequest`].
pub fn validate(raw: &HashMap<String, String>) -> Result<IndicatorRequest, FormErrors> {
    let mut errors = FormErrors::default();

    let symbol = clean_symbol(raw.get(FIELD_SYMBOL), &mut errors);
    let function = clean_choice(raw, FIELD_FUNCTION, Function::parse, &mut errors);
    let interval = clean_choice(raw, FIELD_INTERVAL, Interval::parse, &mut errors);
    let series_type = clean_choice(raw, FIELD_SERIES_TYPE, SeriesType::parse, &mut errors);

    match (symbol, function, interval, series_type) {
        (Some(symbol), Some(function), Some(interval), Some(series_type)) if errors.is_empty() => {
            Ok(IndicatorRequest {
                symbol,
                function,
                interval,
                series_type,
            })
        }
        _ => Err(errors),
    }
}

fn clean_symbol(value: Option<&String>, errors: &mut FormErrors) -> Option<String> {
    let symbol = value.map(|v| v.trim()).unwrap_or_default();
    if symbol.is_empty() {
        errors.add(FIELD_SYMBOL, REQUIRED);
        return None;
    }
    let len = symbol.chars().count();
    if len > SYMBOL_MAX_LEN {
        errors.add(
            FIELD_SYMBOL,
            format!("Ensure this value has at most {SYMBOL_MAX_LEN} characters (it has {len})."),
        );
        return None;
    }
    Some(symbol.to_string())
}

fn clean_choice<T>(
    raw: &HashMap<String, String>,
    field: &'static str,
    parse: fn(&str) -> Option<T>,
    errors: &mut FormErrors,
) -> Option<T> {
    let value = raw.get(field).map(|v| v.trim()).unwrap_or_default();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }
    let parsed = parse(value);
    if parsed.is_none() {
        errors.add(
            field,
            format!("Select a valid choice. {value} is not one of the available choices."),
        );
    }
    parsed
}

// =============================================================================
// Tests
// =============================================================================
