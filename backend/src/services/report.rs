//! Plot report built from the dashboard metrics

use chrono::{DateTime, Utc};
use serde::Serialize;

use shared::dashboard::{DerivedMetrics, RiskKind, TrendSeries};
use shared::Analysis;

use crate::error::{AppError, AppResult};

const STABLE_BAND: f64 = 0.01;
const NO_ACTION: &str = "No action needed";

/// One row of the plot report table
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReportRow {
    pub metric: String,
    pub current_value: String,
    pub trend: String,
    pub recommendation: String,
}

#[derive(Debug, Serialize)]
pub struct PlotReport {
    pub title: String,
    pub plot_name: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<ReportRow>,
}

/// Direction of the CHI series between its first and last point
pub fn trend_label(series: &TrendSeries) -> &'static str {
    match (series.first(), series.latest()) {
        (Some(first), Some(last)) if (last - first).abs() > STABLE_BAND => {
            if last > first {
                "Increasing"
            } else {
                "Decreasing"
            }
        }
        _ => "Stable",
    }
}

fn recommendation(metrics: &DerivedMetrics, analysis: Option<&Analysis>, kinds: &[RiskKind]) -> String {
    metrics
        .risks
        .iter()
        .find(|r| kinds.contains(&r.kind))
        .map(|r| r.solution.trim_start_matches("Solution: ").to_string())
        .or_else(|| analysis.and_then(|a| a.recommendations.first().cloned()))
        .unwrap_or_else(|| NO_ACTION.to_string())
}

/// Rows for CHI, health, stress, pest risk, yield and moisture.
///
/// Only the CHI and crop health rows have a series to compare against; the
/// other metrics come from a single analysis and report "n/a".
pub fn build_rows(metrics: &DerivedMetrics, analysis: Option<&Analysis>) -> Vec<ReportRow> {
    let kpis = &metrics.kpis;
    let trend = trend_label(&metrics.trend);

    let row = |metric: &str, value: String, trend: &str, kinds: &[RiskKind]| ReportRow {
        metric: metric.to_string(),
        current_value: value,
        trend: trend.to_string(),
        recommendation: recommendation(metrics, analysis, kinds),
    };

    vec![
        row("CHI", format!("{:.2}", kpis.chi / 100.0), trend, &[]),
        row(
            "Crop health",
            format!("{:.1}%", kpis.crop_health),
            trend,
            &[RiskKind::HealthStressContradiction],
        ),
        row(
            "Water stress",
            format!("{:.1}%", kpis.water_stress),
            "n/a",
            &[RiskKind::CriticalWaterStress, RiskKind::ModerateWaterStress],
        ),
        row(
            "Pest risk",
            kpis.pest_risk.to_string(),
            "n/a",
            &[RiskKind::HighPestRisk, RiskKind::AphidRiskSpike],
        ),
        row(
            "Yield prediction",
            format!("{:.1}%", kpis.yield_prediction),
            "n/a",
            &[RiskKind::BelowTargetYield],
        ),
        row(
            "Moisture",
            format!("{:.1}%", kpis.moisture),
            "n/a",
            &[RiskKind::SoilMoistureDeficit, RiskKind::CriticalWaterStress],
        ),
    ]
}

pub fn build_report(
    plot_name: Option<String>,
    metrics: &DerivedMetrics,
    analysis: Option<&Analysis>,
    generated_at: DateTime<Utc>,
) -> PlotReport {
    PlotReport {
        title: format!("Plot report - {}", generated_at.format("%Y-%m-%d")),
        plot_name,
        generated_at,
        rows: build_rows(metrics, analysis),
    }
}

/// Export report rows as CSV
pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in data {
        wtr.serialize(record)
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
}
