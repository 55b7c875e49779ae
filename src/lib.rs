//! Risk questionnaire scoring and model-portfolio metrics.
//!
//! Answers fold into a bounded risk score, the score picks one of three model
//! portfolios, and the model's allocations are joined against a fixed ETF
//! dataset to produce illustrative projections.

pub mod config;
pub mod error;
pub mod instruments;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod questionnaire;
pub mod recommendation;
pub mod scoring;
pub mod session;

pub use error::{EngineError, EngineResult, SessionError};
pub use instruments::{Instrument, ReferenceDataset};
pub use metrics::{allocation_breakdown, compute_metrics, HoldingAllocation, MetricsResult};
pub use models::{Model, ModelCatalog, ModelName, ModelOverride};
pub use questionnaire::{AnswerOption, AnswerSequence, Question, Questionnaire};
pub use recommendation::{recommend, Recommendation};
pub use scoring::{compute_risk_score, select_model, select_model_named};
pub use session::{SessionState, SessionStore, Stage, Theme};
