//! Chart rendering for the dashboard
//!
//! The trend chart is rendered to a standalone SVG document so both the
//! backend (`/dashboard/chart.svg`) and the browser can use it. The NDVI
//! overlay is a simulated RGBA raster over the selected plot.

use std::fmt::Write as _;

use rand::Rng;

use crate::dashboard::{self, TrendSeries, TREND_POINTS};
use crate::models::Analysis;

pub const CHART_WIDTH: f64 = 700.0;
pub const CHART_HEIGHT: f64 = 260.0;

const LEFT: f64 = 40.0;
const BASELINE: f64 = 220.0;
const PLOT_WIDTH: f64 = 640.0;
const PLOT_HEIGHT: f64 = 180.0;

const NDVI_ALPHA: u8 = 180;

fn scale_x(x: f64) -> f64 {
    LEFT + ((x - 1.0) / (TREND_POINTS as f64 - 1.0)) * PLOT_WIDTH
}

/// Line path through the series, scaled to its own min/max
pub fn trend_path(series: &TrendSeries) -> String {
    let (min, max) = series
        .points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.y), hi.max(p.y))
        });
    let range = if max - min > 0.0 { max - min } else { 1.0 };

    let mut path = String::new();
    for (i, p) in series.points.iter().enumerate() {
        let cmd = if i == 0 { "M" } else { " L" };
        let y = BASELINE - ((p.y - min) / range) * PLOT_HEIGHT;
        let _ = write!(path, "{cmd} {:.1} {:.1}", scale_x(p.x as f64), y);
    }
    path
}

/// Render the CHI trend as an SVG document.
///
/// The fill gradient is green for crop health above 70, amber otherwise.
pub fn render_trend_svg(series: &TrendSeries, crop_health: f64) -> String {
    let (top, bottom) = if crop_health > 70.0 {
        ("#22c55e", "#16a34a")
    } else {
        ("#f59e0b", "#d97706")
    };
    let line = trend_path(series);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}" role="img" aria-label="{label}">"#,
        w = CHART_WIDTH,
        h = CHART_HEIGHT,
        label = series.caption,
    );
    let _ = write!(
        svg,
        r#"<defs><linearGradient id="chiFill" x1="0" y1="0" x2="0" y2="1"><stop offset="0%" stop-color="{top}" stop-opacity="0.35"/><stop offset="100%" stop-color="{bottom}" stop-opacity="0.05"/></linearGradient></defs>"#
    );
    let _ = write!(
        svg,
        r##"<line x1="{LEFT}" y1="{BASELINE}" x2="{right}" y2="{BASELINE}" stroke="#9ca3af"/><line x1="{LEFT}" y1="{top_y}" x2="{LEFT}" y2="{BASELINE}" stroke="#9ca3af"/>"##,
        right = LEFT + PLOT_WIDTH,
        top_y = BASELINE - PLOT_HEIGHT,
    );

    for i in 0..=4 {
        let y = BASELINE - (i as f64 / 4.0) * PLOT_HEIGHT;
        let _ = write!(
            svg,
            r##"<text x="{x}" y="{y:.1}" font-size="10" text-anchor="end" fill="#6b7280">{label:.1}</text>"##,
            x = LEFT - 6.0,
            label = i as f64 / 4.0,
        );
    }
    for day in (0..=TREND_POINTS).step_by(5) {
        let x = LEFT + (day as f64 / TREND_POINTS as f64) * PLOT_WIDTH;
        let _ = write!(
            svg,
            r##"<text x="{x:.1}" y="{y}" font-size="10" text-anchor="middle" fill="#6b7280">{day}</text>"##,
            y = BASELINE + 16.0,
        );
    }

    if !line.is_empty() {
        let _ = write!(
            svg,
            r#"<path d="{line} L {right} {BASELINE} L {LEFT} {BASELINE} Z" fill="url(#chiFill)"/><path d="{line}" fill="none" stroke="{bottom}" stroke-width="2"/>"#,
            right = LEFT + PLOT_WIDTH,
        );
    }
    let _ = write!(
        svg,
        r##"<text x="{LEFT}" y="{y}" font-size="11" fill="#374151">{caption}</text></svg>"##,
        y = CHART_HEIGHT - 4.0,
        caption = series.caption,
    );
    svg
}

/// Pseudo-colour for an NDVI value in `[0.1, 0.9]`: red, through yellow, to green
pub fn ndvi_color(value: f64) -> [u8; 3] {
    let channel = |v: f64| v.clamp(0.0, 255.0).floor() as u8;
    if value < 0.3 {
        [255, channel(value * 3.33 * 255.0), 0]
    } else if value < 0.6 {
        [channel((0.6 - value) * 3.33 * 255.0), 255, 0]
    } else {
        [0, 255, channel((value - 0.6) * 2.5 * 128.0)]
    }
}

/// Simulated NDVI raster as row-major RGBA bytes.
///
/// Values fall off from the centre of the raster and are shaped by the
/// analysis factors plus per-pixel noise.
pub fn ndvi_rgba<R: Rng + ?Sized>(
    analysis: Option<&Analysis>,
    width: u32,
    height: u32,
    rng: &mut R,
) -> Vec<u8> {
    let (health_factor, stress_factor) = dashboard::factors(analysis);
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    let max_distance = (cx * cx + cy * cy).sqrt().max(1.0);

    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            let distance = (dx * dx + dy * dy).sqrt() / max_distance;
            let noise = (rng.gen::<f64>() - 0.5) * 0.15;
            let value =
                (health_factor * stress_factor * (0.8 - distance * 0.2) + noise).clamp(0.1, 0.9);
            let [r, g, b] = ndvi_color(value);
            pixels.extend_from_slice(&[r, g, b, NDVI_ALPHA]);
        }
    }
    pixels
}
