//! Business logic services for the AgriLens server

pub mod analysis;
pub mod auth;
pub mod dashboard;
pub mod plot;
pub mod profile;
pub mod report;
pub mod storage;

pub use analysis::AnalysisService;
pub use auth::{AuthService, PgCredentialStore};
pub use dashboard::DashboardService;
pub use plot::PlotRepository;
pub use profile::ProfileService;
pub use storage::PgDocumentStore;
