//! HTTP handlers

pub mod analysis;
pub mod assistant;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod plot;
pub mod profile;
pub mod report;

pub use analysis::preview_analysis;
pub use assistant::assistant_chat;
pub use auth::{login, signup};
pub use dashboard::{get_dashboard, get_trend_chart};
pub use health::health_check;
pub use plot::{
    create_plot, export_plot, export_plots, get_plot, get_plot_by_name, list_plots,
    refresh_analysis,
};
pub use profile::{get_profile, update_profile};
pub use report::get_plot_report;
