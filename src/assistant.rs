//! Answer assembly.
//!
//! `Assistant` owns the pipeline configuration (seed, chart directory) and
//! runs route -> handler -> metadata -> query reconstruction for each
//! question. Every call recomputes from scratch; there is no cache and no
//! shared mutable state.

use crate::data::DEFAULT_SEED;
use crate::error::Result;
use crate::handlers::{self, Kpi};
use crate::intent::Intent;
use crate::metadata::QueryMetadata;
use crate::query_builder;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// The full response contract consumed by every presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub intent: Intent,
    pub kpis: Vec<Kpi>,
    pub text: Vec<String>,
    pub table: Vec<serde_json::Value>,
    pub chart_path: Option<String>,
    pub metadata: QueryMetadata,
    pub sql_query: String,
}

/// The question-answering pipeline.
pub struct Assistant {
    seed: u64,
    chart_dir: PathBuf,
}

impl Assistant {
    pub fn new() -> Self {
        Assistant {
            seed: DEFAULT_SEED,
            chart_dir: PathBuf::from("charts"),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_chart_dir(mut self, chart_dir: impl Into<PathBuf>) -> Self {
        self.chart_dir = chart_dir.into();
        self
    }

    /// Answer a natural-language question about FreshFoods yogurt.
    pub fn answer(&self, question: &str) -> Result<Answer> {
        let intent = Intent::route(question);
        info!("Routed question to intent '{}'", intent);

        let output = handlers::handle(intent, self.seed, &self.chart_dir)?;
        let metadata = QueryMetadata::extract(question, intent);
        let sql_query = query_builder::build_query(intent, &metadata);

        Ok(Answer {
            intent,
            kpis: output.kpis,
            text: output.text,
            table: output.table,
            chart_path: output
                .chart_path
                .map(|p| p.to_string_lossy().into_owned()),
            metadata,
            sql_query,
        })
    }
}

impl Default for Assistant {
    fn default() -> Self {
        Assistant::new()
    }
}
