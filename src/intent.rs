//! Intent routing: map a free-text question to one of five fixed intents.
//!
//! Routing is ordered first-match regex over the lower-cased question.
//! A question matching several patterns resolves to the earliest one in the
//! priority list; a question matching none falls back to `Trend`.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of question categories the assistant can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Trend,
    GrowthMarkets,
    SegmentRepeat,
    Occasions,
    ChannelPack,
}

lazy_static! {
    static ref ROUTES: Vec<(Intent, Regex)> = vec![
        (
            Intent::Trend,
            Regex::new(r"trend|last\s+12\s+months|monthly|how\s+is\s+yogurt\s+doing").unwrap(),
        ),
        (
            Intent::GrowthMarkets,
            Regex::new(r"top\s+3.*growth|which.*growth\s+markets|fastest\s+growing").unwrap(),
        ),
        (
            Intent::SegmentRepeat,
            Regex::new(r"repeat\s+rate|trial\s+vs\s+repeat|18-34|35-54").unwrap(),
        ),
        (
            Intent::Occasions,
            Regex::new(r"occasion|consumption\s+occasions|when\s+do\s+people\s+consume").unwrap(),
        ),
        (
            Intent::ChannelPack,
            Regex::new(r"(e-?commerce|retail).*(single|multi|multipack)|channel\s+grew\s+faster")
                .unwrap(),
        ),
    ];
}

impl Intent {
    /// Route a question to an intent. First match in priority order wins.
    pub fn route(question: &str) -> Intent {
        let q_lower = question.to_lowercase();
        for (intent, pattern) in ROUTES.iter() {
            if pattern.is_match(&q_lower) {
                return *intent;
            }
        }
        Intent::Trend
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Trend => "trend",
            Intent::GrowthMarkets => "growth_markets",
            Intent::SegmentRepeat => "segment_repeat",
            Intent::Occasions => "occasions",
            Intent::ChannelPack => "channel_pack",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_questions() {
        let questions = [
            "How is yogurt doing at FreshFoods? Show the last 12 months trend.",
            "Show me the monthly trend",
            "How is yogurt doing",
        ];
        for q in questions {
            assert_eq!(Intent::route(q), Intent::Trend, "question: {}", q);
        }
    }

    #[test]
    fn test_growth_markets_questions() {
        let questions = [
            "Which were the top 3 growth markets for yogurt last year?",
            "Which markets have the fastest growing sales?",
            "top 3 growth markets",
        ];
        for q in questions {
            assert_eq!(Intent::route(q), Intent::GrowthMarkets, "question: {}", q);
        }
    }

    #[test]
    fn test_segment_repeat_questions() {
        let questions = [
            "What is the repeat rate by age segment?",
            "trial vs repeat",
            "Compare 18-34 and 35-54 repeat rates",
        ];
        for q in questions {
            assert_eq!(Intent::route(q), Intent::SegmentRepeat, "question: {}", q);
        }
    }

    #[test]
    fn test_occasions_questions() {
        let questions = [
            "What are the top consumption occasions for shelf-stable yogurt?",
            "When do people consume yogurt?",
            "consumption occasions",
        ];
        for q in questions {
            assert_eq!(Intent::route(q), Intent::Occasions, "question: {}", q);
        }
    }

    #[test]
    fn test_channel_pack_questions() {
        let questions = [
            "In e-commerce vs retail, which channel grew faster for multipack yogurt?",
            "ecommerce single pack growth",
            "which channel grew faster",
        ];
        for q in questions {
            assert_eq!(Intent::route(q), Intent::ChannelPack, "question: {}", q);
        }
    }

    #[test]
    fn test_priority_first_match_wins() {
        // Matches both the trend pattern ("monthly") and the segment pattern
        // ("repeat rate"); trend is earlier in the priority list.
        assert_eq!(Intent::route("monthly repeat rate"), Intent::Trend);
    }

    #[test]
    fn test_unmatched_falls_back_to_trend() {
        assert_eq!(Intent::route("tell me something interesting"), Intent::Trend);
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Intent::GrowthMarkets).unwrap();
        assert_eq!(json, "\"growth_markets\"");
    }
}
