//! Wires the field analyzer to the plot repository

use serde::Serialize;

use shared::{Analysis, GeoPoint, Plot, PlotDraft};

use crate::error::AppResult;
use crate::external::inference::{request_analysis, FieldAnalyzer};
use crate::services::plot::PlotRepository;
use crate::services::storage::DocumentStore;

/// Result of saving a plot; `analysis_error` is set when the optional
/// analysis failed and the plot was saved without one
#[derive(Debug, Serialize)]
pub struct CreatePlotOutcome {
    pub plot: Plot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefreshOutcome {
    pub analysis: Analysis,
    pub updated: usize,
}

pub struct AnalysisService<'a, S, A: ?Sized> {
    plots: &'a PlotRepository<S>,
    analyzer: &'a A,
}

impl<'a, S, A> AnalysisService<'a, S, A>
where
    S: DocumentStore,
    A: FieldAnalyzer + ?Sized,
{
    pub fn new(plots: &'a PlotRepository<S>, analyzer: &'a A) -> Self {
        Self { plots, analyzer }
    }

    /// Analyse a drawn boundary without saving anything
    pub async fn preview(
        &self,
        boundary: &[GeoPoint],
        temperature: f64,
        rainfall: f64,
    ) -> AppResult<Analysis> {
        request_analysis(self.analyzer, boundary, temperature, rainfall).await
    }

    /// Re-analyse a saved plot and attach the result to every plot with its name.
    ///
    /// A failed analysis writes nothing, so the previous result stays.
    pub async fn refresh(&self, plot_name: &str) -> AppResult<RefreshOutcome> {
        let plot = self.plots.find_by_name(plot_name).await?;
        let analysis =
            request_analysis(self.analyzer, &plot.boundary, plot.temperature, plot.rainfall).await?;
        let updated = self.plots.attach_analysis(&plot.name, &analysis).await?;
        Ok(RefreshOutcome { analysis, updated })
    }

    /// Validate and save a new plot, analysing it first when asked
    pub async fn create_plot(&self, draft: PlotDraft, analyze: bool) -> AppResult<CreatePlotOutcome> {
        shared::validate_plot_draft(&draft)?;

        let (analysis, analysis_error) = if analyze {
            match request_analysis(self.analyzer, &draft.boundary, draft.temperature, draft.rainfall)
                .await
            {
                Ok(analysis) => (Some(analysis), None),
                Err(e) => (None, Some(e.to_string())),
            }
        } else {
            (None, None)
        };

        let plot = self.plots.create(draft, analysis).await?;
        Ok(CreatePlotOutcome {
            plot,
            analysis_error,
        })
    }
}
