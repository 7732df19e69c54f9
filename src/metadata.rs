//! Query metadata extraction.
//!
//! Every answer carries a descriptive envelope: which data source backed it,
//! the time range, the regions and the filters the question implied. The
//! envelope is derived from the question text and the routed intent alone;
//! it never inspects the computed result.

use crate::intent::Intent;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Descriptive envelope attached to every answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMetadata {
    /// Data sources backing the answer (exactly one per intent).
    pub data_sources: Vec<String>,
    /// Detected or defaulted time range label.
    pub time_range: Option<String>,
    /// Market codes mentioned in the question, or an "all markets" sentinel.
    pub regions: Vec<String>,
    /// Human-readable filter labels (channel, pack, age).
    pub filters: Vec<String>,
}

lazy_static! {
    static ref TIME_PATTERNS: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"last\s+12\s+months|12\s+months").unwrap(), "Last 12 months"),
        (Regex::new(r"2024|twenty\s+twenty\s+four").unwrap(), "2024"),
        (Regex::new(r"2023|twenty\s+twenty\s+three").unwrap(), "2023"),
        (Regex::new(r"last\s+year|yoy|year\s+over\s+year").unwrap(), "2023-2024 (YoY)"),
        (Regex::new(r"year\s+to\s+date|ytd").unwrap(), "Year to date"),
    ];

    // Word-boundary guards keep short codes from matching inside other
    // words; the IN pattern must not match the bare preposition "in".
    static ref MARKET_PATTERNS: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"\b(united\s+states|us)\b").unwrap(), "US"),
        (Regex::new(r"\b(united\s+kingdom|uk)\b").unwrap(), "UK"),
        (Regex::new(r"\b(germany|de)\b").unwrap(), "DE"),
        (Regex::new(r"\b(india|in\s+market|in\s+region|india\s+market)\b").unwrap(), "IN"),
        (Regex::new(r"\b(brazil|br)\b").unwrap(), "BR"),
    ];

    static ref FILTER_PATTERNS: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"e-?commerce").unwrap(), "Channel: E-commerce"),
        (Regex::new(r"retail").unwrap(), "Channel: Retail"),
        (Regex::new(r"multipack|multi\s+pack").unwrap(), "Pack: Multipack"),
        (Regex::new(r"single\s+pack|single").unwrap(), "Pack: Single"),
        (Regex::new(r"18-34|18\s+to\s+34").unwrap(), "Age: 18-34"),
        (Regex::new(r"35-54|35\s+to\s+54").unwrap(), "Age: 35-54"),
        (Regex::new(r"55\+|55\s+plus").unwrap(), "Age: 55+"),
    ];
}

const ALL_MARKETS: &str = "All markets (US, UK, DE, IN, BR)";

impl QueryMetadata {
    /// Derive metadata from the question text and routed intent.
    pub fn extract(question: &str, intent: Intent) -> QueryMetadata {
        let q_lower = question.to_lowercase();

        let data_sources = vec![match intent {
            Intent::Trend | Intent::GrowthMarkets | Intent::ChannelPack => {
                "Insights360 - Sales Facts".to_string()
            }
            Intent::SegmentRepeat => "Insights360 - Segment Analytics".to_string(),
            Intent::Occasions => "Past Projects - Consumer Research".to_string(),
        }];

        let time_range = TIME_PATTERNS
            .iter()
            .find(|(pattern, _)| pattern.is_match(&q_lower))
            .map(|(_, label)| label.to_string())
            .or_else(|| {
                Some(
                    match intent {
                        Intent::Trend | Intent::SegmentRepeat => "2024",
                        Intent::GrowthMarkets | Intent::ChannelPack => "2023-2024 (YoY)",
                        Intent::Occasions => "Current",
                    }
                    .to_string(),
                )
            });

        let mut regions: Vec<String> = Vec::new();
        for (pattern, code) in MARKET_PATTERNS.iter() {
            if pattern.is_match(&q_lower) && !regions.iter().any(|r| r == code) {
                regions.push(code.to_string());
            }
        }
        if regions.is_empty() {
            regions.push(match intent {
                Intent::Occasions => "Global".to_string(),
                _ => ALL_MARKETS.to_string(),
            });
        }

        let mut filters: Vec<String> = FILTER_PATTERNS
            .iter()
            .filter(|(pattern, _)| pattern.is_match(&q_lower))
            .map(|(_, label)| label.to_string())
            .collect();

        // channel_pack always reports its two dimensions, so missing ones
        // are surfaced as explicit "All" sentinels.
        if intent == Intent::ChannelPack {
            if !filters.iter().any(|f| f.contains("Channel")) {
                filters.push("Channel: All (E-commerce, Retail)".to_string());
            }
            if !filters.iter().any(|f| f.contains("Pack")) {
                filters.push("Pack: All (Single, Multipack)".to_string());
            }
        }

        QueryMetadata {
            data_sources,
            time_range,
            regions,
            filters,
        }
    }
}
