//! Plot repository over a user's plot document

use chrono::Utc;
use uuid::Uuid;

use shared::{Analysis, Plot, PlotDraft};

use crate::error::{AppError, AppResult};
use crate::services::storage::{load_typed, plots_key, save_typed, DocumentStore};

/// Append-only plot collection for one user.
///
/// Names are not unique; lookups by name return the first match and analysis
/// updates apply to every match.
pub struct PlotRepository<S> {
    store: S,
    key: String,
}

impl<S: DocumentStore> PlotRepository<S> {
    pub fn new(store: S, user_id: Uuid) -> Self {
        Self {
            store,
            key: plots_key(user_id),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<Plot>> {
        Ok(load_typed(&self.store, &self.key).await?.unwrap_or_default())
    }

    /// Append a plot built from the draft, returning the stored record
    pub async fn create(&self, draft: PlotDraft, analysis: Option<Analysis>) -> AppResult<Plot> {
        let mut plot = draft.into_plot(Uuid::new_v4(), Utc::now());
        plot.analysis = analysis;

        let mut plots = self.list().await?;
        plots.push(plot.clone());
        save_typed(&self.store, &self.key, &plots).await?;

        tracing::info!(plot_id = %plot.id, name = %plot.name, "Plot created");
        Ok(plot)
    }

    pub async fn find_by_name(&self, name: &str) -> AppResult<Plot> {
        self.list()
            .await?
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| AppError::NotFound(format!("Plot '{}'", name)))
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Plot> {
        self.list()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound("Plot".to_string()))
    }

    /// Replace the analysis of every plot with this name.
    ///
    /// Nothing is written when no plot matches.
    pub async fn attach_analysis(&self, name: &str, analysis: &Analysis) -> AppResult<usize> {
        let mut plots = self.list().await?;
        let mut updated = 0;
        for plot in plots.iter_mut().filter(|p| p.name == name) {
            plot.analysis = Some(analysis.clone());
            updated += 1;
        }

        if updated == 0 {
            return Err(AppError::NotFound(format!("Plot '{}'", name)));
        }

        save_typed(&self.store, &self.key, &plots).await?;
        tracing::info!(name = %name, updated, "Analysis attached");
        Ok(updated)
    }
}
