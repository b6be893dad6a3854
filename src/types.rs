// =============================================================================
// Shared types used across the indicator dashboard
// =============================================================================

use serde::{Deserialize, Serialize};

/// Technical-indicator function requested from the market-data API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Function {
    #[serde(rename = "HT_PHASOR")]
    HtPhasor,
}

impl Function {
    pub const ALL: &'static [Function] = &[Function::HtPhasor];

    /// Wire name sent as the `function` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HtPhasor => "HT_PHASOR",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.as_str() == value)
    }

    /// Descriptor tying the function to its payload key and chart columns.
    pub fn descriptor(&self) -> &'static IndicatorDescriptor {
        match self {
            Self::HtPhasor => &HT_PHASOR,
        }
    }
}

impl Default for Function {
    fn default() -> Self {
        Self::HtPhasor
    }
}

impl std::fmt::Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sampling frequency of the underlying price data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Daily,
    Weekly,
    Monthly,
}

impl Interval {
    pub const ALL: &'static [Interval] = &[Interval::Daily, Interval::Weekly, Interval::Monthly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|i| i.as_str() == value)
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::Weekly
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw price field the indicator is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    Close,
    Open,
    High,
    Low,
}

impl SeriesType {
    pub const ALL: &'static [SeriesType] = &[
        SeriesType::Close,
        SeriesType::Open,
        SeriesType::High,
        SeriesType::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Close => "Close",
            Self::Open => "Open",
            Self::High => "High",
            Self::Low => "Low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == value)
    }
}

impl Default for SeriesType {
    fn default() -> Self {
        Self::Close
    }
}

impl std::fmt::Display for SeriesType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated indicator query. Only produced by `form::validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorRequest {
    pub symbol: String,
    pub function: Function,
    pub interval: Interval,
    pub series_type: SeriesType,
}

// =============================================================================
// Indicator descriptors
// =============================================================================

/// Everything the transformer and renderer need to know about one indicator.
#[derive(Debug)]
pub struct IndicatorDescriptor {
    pub function: Function,
    /// Columns plotted as line series, in legend order.
    pub columns: &'static [&'static str],
    pub x_label: &'static str,
    pub y_label: &'static str,
}

impl IndicatorDescriptor {
    /// Top-level payload key holding the indicator rows.
    pub fn data_key(&self) -> String {
        format!("Technical Analysis: {}", self.function.as_str())
    }

    pub fn chart_title(&self, symbol: &str) -> String {
        format!("{} for {}", self.function.as_str(), symbol)
    }
}

static HT_PHASOR: IndicatorDescriptor = IndicatorDescriptor {
    function: Function::HtPhasor,
    columns: &["InPhase", "Quadrature"],
    x_label: "Date",
    y_label: "Value",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_round_trip_through_parse() {
        for f in Function::ALL {
            assert_eq!(Function::parse(f.as_str()), Some(*f));
        }
        for i in Interval::ALL {
            assert_eq!(Interval::parse(i.as_str()), Some(*i));
        }
        for s in SeriesType::ALL {
            assert_eq!(SeriesType::parse(s.as_str()), Some(*s));
        }
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!(Function::parse("ht_phasor"), None);
        assert_eq!(Interval::parse("Weekly"), None);
        assert_eq!(SeriesType::parse("CLOSE"), None);
    }

    #[test]
    fn defaults_match_form_initials() {
        assert_eq!(Function::default(), Function::HtPhasor);
        assert_eq!(Interval::default(), Interval::Weekly);
        assert_eq!(SeriesType::default(), SeriesType::Close);
    }

    #[test]
    fn ht_phasor_descriptor() {
        let d = Function::HtPhasor.descriptor();
        assert_eq!(d.data_key(), "Technical Analysis: HT_PHASOR");
        assert_eq!(d.columns, &["InPhase", "Quadrature"]);
        assert_eq!(d.chart_title("IBM"), "HT_PHASOR for IBM");
    }
}
