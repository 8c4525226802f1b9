//! Client core for the lesion analysis workflow: the classifier client, the
//! static enrichment table, and the controller that ties them together.

pub mod classifier;
pub mod config;
pub mod enrichment;
pub mod workflow;

pub use classifier::{Classifier, ClassifierError, HttpClassifier};
pub use config::{load_settings, ClassifierSettings, ConfigError};
pub use enrichment::{enrich, lookup, EnrichmentBundle, EnrichmentError};
pub use workflow::{StateTag, WorkflowController, WorkflowError, WorkflowEvent, WorkflowState};
