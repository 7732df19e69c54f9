//! Pseudo-SQL reconstruction.
//!
//! Builds a human-readable query string from the intent and extracted
//! metadata so the user can see what the answer corresponds to. The string
//! is display-only and never executed; clause order is fixed (time, region,
//! channel, pack, age, product) so output is stable enough to golden-test.

use crate::intent::Intent;
use crate::metadata::QueryMetadata;

/// Build the display query for an intent and its metadata envelope.
pub fn build_query(intent: Intent, metadata: &QueryMetadata) -> String {
    let (select, table, group_by) = match intent {
        Intent::Trend => (
            "SELECT date, SUM(sales_usd) as total_sales",
            "sales_facts",
            "GROUP BY date",
        ),
        Intent::GrowthMarkets => (
            "SELECT market, SUM(sales_usd) as total_sales",
            "sales_facts",
            "GROUP BY market",
        ),
        Intent::ChannelPack => (
            "SELECT channel, pack, SUM(sales_usd) as total_sales",
            "sales_facts",
            "GROUP BY channel, pack",
        ),
        Intent::SegmentRepeat => (
            "SELECT age_bucket, AVG(repeat_rate) as avg_repeat_rate",
            "segment_analytics",
            "GROUP BY age_bucket",
        ),
        Intent::Occasions => ("SELECT occasion, share", "consumer_research", ""),
    };

    let mut where_clauses: Vec<String> = Vec::new();

    if let Some(time_range) = &metadata.time_range {
        if time_range.contains("2024") && !time_range.contains("2023") {
            where_clauses.push("date >= '2024-01-01' AND date < '2025-01-01'".to_string());
        } else if time_range.contains("2023") && !time_range.contains("2024") {
            where_clauses.push("date >= '2023-01-01' AND date < '2024-01-01'".to_string());
        } else if time_range.contains("Last 12 months") {
            where_clauses.push("date >= DATE_SUB(CURRENT_DATE, INTERVAL 12 MONTH)".to_string());
        } else if time_range.contains("YoY") {
            where_clauses.push("date >= '2023-01-01' AND date < '2025-01-01'".to_string());
        }
    }

    // Sentinel regions ("All markets ...", "Global") carry no restriction.
    let real_regions: Vec<&String> = metadata
        .regions
        .iter()
        .filter(|r| !r.contains("All markets") && r.as_str() != "Global")
        .collect();
    if !real_regions.is_empty() {
        let market_list = real_regions
            .iter()
            .map(|r| format!("'{}'", r))
            .collect::<Vec<_>>()
            .join(", ");
        where_clauses.push(format!("market IN ({})", market_list));
    }

    if let Some(channel_filter) = metadata
        .filters
        .iter()
        .find(|f| f.contains("Channel") && !f.contains("All"))
    {
        if channel_filter.contains("E-commerce") {
            where_clauses.push("channel = 'ecommerce'".to_string());
        } else if channel_filter.contains("Retail") {
            where_clauses.push("channel = 'retail'".to_string());
        }
    }

    if let Some(pack_filter) = metadata
        .filters
        .iter()
        .find(|f| f.contains("Pack") && !f.contains("All"))
    {
        if pack_filter.contains("Multipack") {
            where_clauses.push("pack = 'multipack'".to_string());
        } else if pack_filter.contains("Single") {
            where_clauses.push("pack = 'single'".to_string());
        }
    }

    let age_values: Vec<&str> = metadata
        .filters
        .iter()
        .filter(|f| f.contains("Age"))
        .filter_map(|f| f.split(':').nth(1))
        .map(str::trim)
        .collect();
    if !age_values.is_empty() {
        let age_list = age_values
            .iter()
            .map(|a| format!("'{}'", a))
            .collect::<Vec<_>>()
            .join(", ");
        where_clauses.push(format!("age_bucket IN ({})", age_list));
    }

    // Every sales-table question is scoped to the one demo product.
    if matches!(
        intent,
        Intent::Trend | Intent::GrowthMarkets | Intent::ChannelPack
    ) {
        where_clauses.push("product = 'yogurt'".to_string());
    }

    let mut query = format!("{}\nFROM {}", select, table);
    if !where_clauses.is_empty() {
        query.push_str(&format!("\nWHERE {}", where_clauses.join(" AND ")));
    }
    if !group_by.is_empty() {
        query.push_str(&format!("\n{}", group_by));
    }

    match intent {
        Intent::GrowthMarkets => query.push_str("\nORDER BY total_sales DESC\nLIMIT 3"),
        Intent::Occasions => query.push_str("\nORDER BY share DESC"),
        _ => {}
    }

    query
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(
        time_range: &str,
        regions: Vec<&str>,
        filters: Vec<&str>,
    ) -> QueryMetadata {
        QueryMetadata {
            data_sources: vec!["Insights360 - Sales Facts".to_string()],
            time_range: Some(time_range.to_string()),
            regions: regions.into_iter().map(String::from).collect(),
            filters: filters.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn test_trend_golden_query() {
        let metadata = meta("2024", vec!["All markets (US, UK, DE, IN, BR)"], vec![]);
        let query = build_query(Intent::Trend, &metadata);
        assert_eq!(
            query,
            "SELECT date, SUM(sales_usd) as total_sales\n\
             FROM sales_facts\n\
             WHERE date >= '2024-01-01' AND date < '2025-01-01' AND product = 'yogurt'\n\
             GROUP BY date"
        );
    }

    #[test]
    fn test_growth_markets_order_and_limit() {
        let metadata = meta("2023-2024 (YoY)", vec!["All markets (US, UK, DE, IN, BR)"], vec![]);
        let query = build_query(Intent::GrowthMarkets, &metadata);
        assert!(query.starts_with("SELECT market, SUM(sales_usd) as total_sales"));
        assert!(query.contains("date >= '2023-01-01' AND date < '2025-01-01'"));
        assert!(query.ends_with("ORDER BY total_sales DESC\nLIMIT 3"));
    }

    #[test]
    fn test_region_and_filter_clauses_in_order() {
        let metadata = meta(
            "2024",
            vec!["US", "UK"],
            vec!["Channel: E-commerce", "Pack: Multipack"],
        );
        let query = build_query(Intent::ChannelPack, &metadata);
        assert!(query.contains(
            "WHERE date >= '2024-01-01' AND date < '2025-01-01' \
             AND market IN ('US', 'UK') \
             AND channel = 'ecommerce' \
             AND pack = 'multipack' \
             AND product = 'yogurt'"
        ));
    }

    #[test]
    fn test_all_sentinel_filters_add_no_clause() {
        let metadata = meta(
            "2023-2024 (YoY)",
            vec!["All markets (US, UK, DE, IN, BR)"],
            vec![
                "Channel: All (E-commerce, Retail)",
                "Pack: All (Single, Multipack)",
            ],
        );
        let query = build_query(Intent::ChannelPack, &metadata);
        assert!(!query.contains("channel = "));
        assert!(!query.contains("pack = "));
    }

    #[test]
    fn test_segment_repeat_age_in_list() {
        let metadata = QueryMetadata {
            data_sources: vec!["Insights360 - Segment Analytics".to_string()],
            time_range: Some("2024".to_string()),
            regions: vec!["All markets (US, UK, DE, IN, BR)".to_string()],
            filters: vec!["Age: 18-34".to_string(), "Age: 35-54".to_string()],
        };
        let query = build_query(Intent::SegmentRepeat, &metadata);
        assert!(query.contains("age_bucket IN ('18-34', '35-54')"));
        assert!(!query.contains("product = 'yogurt'"));
    }

    #[test]
    fn test_occasions_no_group_by() {
        let metadata = QueryMetadata {
            data_sources: vec!["Past Projects - Consumer Research".to_string()],
            time_range: Some("Current".to_string()),
            regions: vec!["Global".to_string()],
            filters: vec![],
        };
        let query = build_query(Intent::Occasions, &metadata);
        assert_eq!(
            query,
            "SELECT occasion, share\nFROM consumer_research\nORDER BY share DESC"
        );
    }
}
