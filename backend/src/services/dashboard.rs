//! Dashboard assembly for the selected plot

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use shared::dashboard::{self, DerivedMetrics};
use shared::geometry::{self, Bounds};
use shared::{CropType, GeoPoint, HealthBand, IrrigationMethod, Plot, SoilType};

use crate::error::{AppError, AppResult};
use crate::services::plot::PlotRepository;
use crate::services::storage::DocumentStore;

/// Names offered by the plot selector before the user has saved any plot
pub const DEMO_PLOT_NAMES: [&str; 5] = ["Plot A", "Plot B", "Plot C", "North Field", "South Field"];

const STATIC_MAP_BASE: &str = "https://maps.googleapis.com/maps/api/staticmap";

#[derive(Debug, Serialize)]
pub struct PlotSummary {
    pub id: Uuid,
    pub name: String,
    pub crop_type: CropType,
    pub soil_type: SoilType,
    pub irrigation: IrrigationMethod,
    pub area_hectares: f64,
    pub centroid: Option<GeoPoint>,
    pub bounds: Option<Bounds>,
    pub zoom: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_map_url: Option<String>,
    pub health_band: Option<HealthBand>,
    pub health_color: Option<&'static str>,
    pub analyzed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub plot_names: Vec<String>,
    /// `true` when `plot_names` are demo names rather than saved plots
    pub placeholder: bool,
    pub selected: Option<PlotSummary>,
    #[serde(flatten)]
    pub metrics: DerivedMetrics,
    pub generated_at: DateTime<Utc>,
}

pub struct DashboardService<'a, S> {
    plots: &'a PlotRepository<S>,
    maps_key: Option<&'a str>,
}

impl<'a, S: DocumentStore> DashboardService<'a, S> {
    pub fn new(plots: &'a PlotRepository<S>, maps_key: Option<&'a str>) -> Self {
        Self { plots, maps_key }
    }

    /// Build the dashboard for the named plot, or the first saved plot.
    ///
    /// With no saved plots the view is built from defaults and any requested
    /// name is ignored.
    pub async fn view<R: Rng + ?Sized>(&self, selected: Option<&str>, rng: &mut R) -> AppResult<DashboardView> {
        let plots = self.plots.list().await?;

        if plots.is_empty() {
            return Ok(DashboardView {
                plot_names: DEMO_PLOT_NAMES.iter().map(|n| n.to_string()).collect(),
                placeholder: true,
                selected: None,
                metrics: dashboard::derive(None, rng),
                generated_at: Utc::now(),
            });
        }

        let plot = match selected.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => plots
                .iter()
                .find(|p| p.name == name)
                .ok_or_else(|| AppError::NotFound(format!("Plot '{}'", name)))?,
            None => &plots[0],
        };

        Ok(DashboardView {
            plot_names: plots.iter().map(|p| p.name.clone()).collect(),
            placeholder: false,
            selected: Some(self.summarize(plot)?),
            metrics: dashboard::derive(plot.analysis.as_ref(), rng),
            generated_at: Utc::now(),
        })
    }

    fn summarize(&self, plot: &Plot) -> AppResult<PlotSummary> {
        let bounds = Bounds::of(&plot.boundary);
        let zoom = bounds.as_ref().map(geometry::suggested_zoom);
        let band = plot
            .analysis
            .as_ref()
            .map(|a| HealthBand::from_health(a.crop_health));

        let static_map_url = match (self.maps_key, bounds, zoom) {
            (Some(key), Some(bounds), Some(zoom)) => {
                Some(static_map_url(&plot.boundary, &bounds, zoom, key)?)
            }
            _ => None,
        };

        Ok(PlotSummary {
            id: plot.id,
            name: plot.name.clone(),
            crop_type: plot.crop_type,
            soil_type: plot.soil_type,
            irrigation: plot.irrigation,
            area_hectares: plot.area_hectares(),
            centroid: plot.centroid(),
            bounds,
            zoom,
            static_map_url,
            health_band: band,
            health_color: band.map(|b| b.color()),
            analyzed_at: plot.analysis.as_ref().map(|a| a.processed_at),
        })
    }
}

/// Satellite preview with the boundary drawn as an overlay
pub fn static_map_url(
    boundary: &[GeoPoint],
    bounds: &Bounds,
    zoom: u8,
    api_key: &str,
) -> AppResult<String> {
    let center = bounds.center();
    let vertices = boundary
        .iter()
        .map(|p| format!("{},{}", p.latitude, p.longitude))
        .collect::<Vec<_>>()
        .join("|");

    let params = [
        ("center", format!("{},{}", center.latitude, center.longitude)),
        ("zoom", zoom.to_string()),
        ("size", "600x400".to_string()),
        ("maptype", "satellite".to_string()),
        ("path", format!("color:0x00FF00|weight:3|fillcolor:0x00FF0050|{}", vertices)),
        ("key", api_key.to_string()),
    ];

    let url = reqwest::Url::parse_with_params(STATIC_MAP_BASE, &params)
        .map_err(|e| AppError::Internal(format!("Static map URL error: {}", e)))?;
    Ok(url.into())
}
