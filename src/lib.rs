//! Ask360: a rules-based insights assistant for the FreshFoods synthetic
//! yogurt dataset.
//!
//! Questions are routed to one of five fixed intents; each intent handler
//! aggregates freshly generated data and returns KPIs, narrative text, a
//! table and (for trends) a chart, together with a metadata envelope and a
//! reconstructed display query.

pub mod assistant;
pub mod chart;
pub mod data;
pub mod error;
pub mod handlers;
pub mod intent;
pub mod metadata;
pub mod query_builder;

pub use assistant::{Answer, Assistant};
pub use error::{Ask360Error, Result};
pub use handlers::Kpi;
pub use intent::Intent;
pub use metadata::QueryMetadata;
