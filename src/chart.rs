// =============================================================================
// Chart Renderer — indicator series to base64 PNG
// =============================================================================
//
// Draws every descriptor column as a labelled line against the timestamp
// index, with caption, axis descriptions, mesh grid and legend.  The raster is
// drawn into an in-memory RGB buffer, PNG-encoded, then base64-encoded for an
// inline `data:` URI.  Nothing touches the filesystem.
// =============================================================================

use std::io::Cursor;

use base64::Engine;
use chrono::{DateTime, NaiveDateTime};
use plotters::prelude::*;
use thiserror::Error;
use tracing::{error, info};

use crate::series::IndicatorSeries;
use crate::types::IndicatorDescriptor;

/// Output raster size (10 x 5 inches at 100 dpi).
pub const WIDTH: u32 = 1000;
pub const HEIGHT: u32 = 500;

const SECS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("series has no '{0}' column")]
    MissingColumn(String),

    #[error("drawing failed: {0}")]
    Draw(String),

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// A rendered PNG, held in memory only.
#[derive(Debug, Clone)]
pub struct ChartImage {
    png: Vec<u8>,
}

impl ChartImage {
    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.png)
    }
}

/// Render `series` as a line chart titled `"<function> for <symbol>"`.
pub fn render(
    series: &IndicatorSeries,
    symbol: &str,
    descriptor: &IndicatorDescriptor,
) -> Result<ChartImage, RenderError> {
    let result = draw_png(series, symbol, descriptor);
    match &result {
        Ok(img) => info!(bytes = img.png_bytes().len(), "plotting successful"),
        Err(e) => error!(error = %e, "plotting error"),
    }
    result
}

fn draw_png(
    series: &IndicatorSeries,
    symbol: &str,
    descriptor: &IndicatorDescriptor,
) -> Result<ChartImage, RenderError> {
    // Resolve every column up front so a missing one fails before drawing.
    let lines = descriptor
        .columns
        .iter()
        .map(|name| {
            series
                .column(name)
                .map(|points| (*name, to_plot_points(points)))
                .ok_or_else(|| RenderError::MissingColumn((*name).to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let (x_range, y_range) = bounds(&lines);
    let title = descriptor.chart_title(symbol);

    let mut buffer = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&title, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)
            .map_err(draw_err)?;

        let date_label = |x: &f64| format_day(*x);
        chart
            .configure_mesh()
            .x_desc(descriptor.x_label)
            .y_desc(descriptor.y_label)
            .x_labels(8)
            .x_label_formatter(&date_label)
            .draw()
            .map_err(draw_err)?;

        for (idx, (name, points)) in lines.into_iter().enumerate() {
            let style = Palette99::pick(idx).stroke_width(2);
            chart
                .draw_series(LineSeries::new(points, style))
                .map_err(draw_err)?
                .label(name)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }

    let png = encode_png(buffer)?;
    Ok(ChartImage { png })
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

fn encode_png(rgb: Vec<u8>) -> Result<Vec<u8>, RenderError> {
    let img = image::RgbImage::from_raw(WIDTH, HEIGHT, rgb)
        .ok_or_else(|| RenderError::Encode("pixel buffer does not match image size".into()))?;
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(png)
}

/// x = days since the Unix epoch; NaN cells are dropped.
fn to_plot_points(points: Vec<(NaiveDateTime, f64)>) -> Vec<(f64, f64)> {
    points
        .into_iter()
        .filter(|(_, v)| v.is_finite())
        .map(|(ts, v)| (ts.and_utc().timestamp() as f64 / SECS_PER_DAY, v))
        .collect()
}

fn format_day(x: f64) -> String {
    DateTime::from_timestamp((x * SECS_PER_DAY).round() as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Axis ranges covering every point, widened when degenerate.
fn bounds(lines: &[(&str, Vec<(f64, f64)>)]) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let points = lines.iter().flat_map(|(_, pts)| pts.iter());
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !x_min.is_finite() {
        // No plottable points at all.
        return (0.0..1.0, 0.0..1.0);
    }
    if x_max - x_min < f64::EPSILON {
        x_min -= 1.0;
        x_max += 1.0;
    }
    let pad = if y_max - y_min < f64::EPSILON {
        1.0
    } else {
        (y_max - y_min) * 0.05
    };
    (x_min..x_max, (y_min - pad)..(y_max + pad))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alpha_vantage::IndicatorResponse;
    use crate::series::transform;
    use crate::types::Function;
    use serde_json::{json, Value};

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    fn series(body: Value) -> IndicatorSeries {
        let Value::Object(map) = body else {
            panic!("object expected")
        };
        transform(&IndicatorResponse(map), Function::HtPhasor.descriptor()).unwrap()
    }

    fn two_rows() -> IndicatorSeries {
        series(json!({
            "Technical Analysis: HT_PHASOR": {
                "2023-01-02": { "InPhase": "1.5", "Quadrature": "-0.5" },
                "2023-01-01": { "InPhase": "1.0", "Quadrature": "0.2" }
            }
        }))
    }

    #[test]
    fn renders_png_and_base64() {
        let img = render(&two_rows(), "IBM", Function::HtPhasor.descriptor()).unwrap();
        assert!(img.png_bytes().starts_with(PNG_MAGIC));
        let b64 = img.to_base64();
        assert!(!b64.is_empty());
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&b64)
            .unwrap();
        assert_eq!(decoded, img.png_bytes());
    }

    #[test]
    fn missing_quadrature_column_fails() {
        let s = series(json!({
            "Technical Analysis: HT_PHASOR": {
                "2023-01-01": { "InPhase": "1.0" }
            }
        }));
        match render(&s, "IBM", Function::HtPhasor.descriptor()) {
            Err(RenderError::MissingColumn(col)) => assert_eq!(col, "Quadrature"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn single_row_still_renders() {
        let s = series(json!({
            "Technical Analysis: HT_PHASOR": {
                "2023-01-01": { "InPhase": "1.0", "Quadrature": "1.0" }
            }
        }));
        assert!(render(&s, "IBM", Function::HtPhasor.descriptor()).is_ok());
    }

    #[test]
    fn bounds_widen_degenerate_ranges() {
        let lines = vec![("a", vec![(10.0, 3.0)])];
        let (x, y) = bounds(&lines);
        assert_eq!(x, 9.0..11.0);
        assert_eq!(y, 2.0..4.0);
    }

    #[test]
    fn nan_points_dropped() {
        let ts = DateTime::from_timestamp(0, 0).unwrap().naive_utc();
        let pts = to_plot_points(vec![(ts, f64::NAN), (ts, 2.0)]);
        assert_eq!(pts, vec![(0.0, 2.0)]);
    }

    #[test]
    fn day_labels() {
        assert_eq!(format_day(0.0), "1970-01-01");
        assert_eq!(format_day(19358.0), "2023-01-01");
    }
}
