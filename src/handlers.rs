//! Intent handlers.
//!
//! One handler per intent. Each regenerates the synthetic data it needs from
//! the seed it is given, aggregates with polars, and returns KPIs, narrative
//! text and a table. Only the trend handler has a side effect: it writes a
//! line chart under the caller's chart directory, with a per-request file
//! name so concurrent requests never race on one path.

use crate::chart;
use crate::data;
use crate::error::{Ask360Error, Result};
use crate::intent::Intent;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// A labeled highlight value shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub label: String,
    pub value: String,
}

impl Kpi {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Kpi {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// What a handler computes: KPIs, narrative sentences, a tabular result and
/// (trend only) a chart artifact.
#[derive(Debug, Clone, Default)]
pub struct HandlerOutput {
    pub kpis: Vec<Kpi>,
    pub text: Vec<String>,
    pub table: Vec<serde_json::Value>,
    pub chart_path: Option<PathBuf>,
}

/// Dispatch to the handler for an intent.
pub fn handle(intent: Intent, seed: u64, chart_dir: &Path) -> Result<HandlerOutput> {
    match intent {
        Intent::Trend => handle_trend(seed, chart_dir),
        Intent::GrowthMarkets => handle_growth_markets(seed),
        Intent::SegmentRepeat => handle_segment_repeat(seed),
        Intent::Occasions => handle_occasions(),
        Intent::ChannelPack => handle_channel_pack(seed),
    }
}

/// YoY percent change, or `None` when the prior-year baseline is zero.
/// Undefined growth is excluded from rankings rather than reported as
/// infinity or an error.
fn yoy_percent(prior: f64, current: f64) -> Option<f64> {
    if prior == 0.0 {
        None
    } else {
        Some((current - prior) / prior * 100.0)
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Monthly 2024 sales trend with a line chart.
pub fn handle_trend(seed: u64, chart_dir: &Path) -> Result<HandlerOutput> {
    let facts = data::generate_facts(seed)?;
    let monthly = facts
        .lazy()
        .filter(col("year").eq(lit(2024)))
        .group_by([col("date")])
        .agg([col("sales_usd").sum()])
        .collect()?;

    let dates = monthly.column("date")?.str()?;
    let sales = monthly.column("sales_usd")?.f64()?;
    let mut points: Vec<(String, f64)> = Vec::with_capacity(monthly.height());
    for i in 0..monthly.height() {
        if let (Some(date), Some(value)) = (dates.get(i), sales.get(i)) {
            points.push((date.to_string(), value));
        }
    }
    points.sort_by(|a, b| a.0.cmp(&b.0));

    let (_, start_val) = points
        .first()
        .cloned()
        .ok_or_else(|| Ask360Error::Handler("monthly trend has no rows".to_string()))?;
    let (_, end_val) = points
        .last()
        .cloned()
        .ok_or_else(|| Ask360Error::Handler("monthly trend has no rows".to_string()))?;
    let pct_change = (end_val - start_val) / start_val * 100.0;

    std::fs::create_dir_all(chart_dir)?;
    let chart_path = chart_dir.join(format!("trend-{}.png", Uuid::new_v4()));
    chart::render_trend_chart(&points, &chart_path)?;
    info!("Rendered trend chart to {}", chart_path.display());

    let table = points
        .iter()
        .map(|(date, value)| json!({ "date": date, "sales_usd": round2(*value) }))
        .collect();

    Ok(HandlerOutput {
        kpis: vec![
            Kpi::new("Start (Jan 2024)", format!("${:.2}M", start_val / 1e6)),
            Kpi::new("End (Dec 2024)", format!("${:.2}M", end_val / 1e6)),
            Kpi::new("Change", format!("{:+.1}%", pct_change)),
        ],
        text: vec![
            format!(
                "Yogurt sales in 2024 started at ${:.2}M in January.",
                start_val / 1e6
            ),
            format!("By December, sales reached ${:.2}M.", end_val / 1e6),
            format!(
                "This represents a {:+.1}% change over the year.",
                pct_change
            ),
        ],
        table,
        chart_path: Some(chart_path),
    })
}

/// Sum sales per (group key, year) and fold into per-key (2023, 2024) totals.
fn yearly_totals(
    facts: DataFrame,
    key_columns: &[&str],
) -> Result<HashMap<Vec<String>, (f64, f64)>> {
    let mut group_exprs: Vec<Expr> = key_columns.iter().map(|k| col(*k)).collect();
    group_exprs.push(col("year"));

    let totals = facts
        .lazy()
        .group_by(group_exprs)
        .agg([col("sales_usd").sum()])
        .collect()?;

    let year_col = totals.column("year")?.i32()?;
    let sales_col = totals.column("sales_usd")?.f64()?;
    let key_cols = key_columns
        .iter()
        .map(|k| totals.column(*k).and_then(|s| s.str()))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut by_key: HashMap<Vec<String>, (f64, f64)> = HashMap::new();
    for i in 0..totals.height() {
        let key: Option<Vec<String>> = key_cols
            .iter()
            .map(|c| c.get(i).map(str::to_string))
            .collect();
        let (Some(key), Some(year), Some(sales)) = (key, year_col.get(i), sales_col.get(i))
        else {
            continue;
        };
        let entry = by_key.entry(key).or_insert((0.0, 0.0));
        match year {
            2023 => entry.0 = sales,
            2024 => entry.1 = sales,
            _ => {}
        }
    }
    Ok(by_key)
}

/// Rank YoY growth descending; undefined (zero-baseline) keys come back
/// separately so callers can flag them instead of dividing by zero.
fn yoy_ranking(
    totals: HashMap<Vec<String>, (f64, f64)>,
) -> (Vec<(Vec<String>, f64)>, Vec<Vec<String>>) {
    let mut ranked: Vec<(Vec<String>, f64)> = Vec::new();
    let mut undefined: Vec<Vec<String>> = Vec::new();
    for (key, (prior, current)) in totals {
        match yoy_percent(prior, current) {
            Some(pct) => ranked.push((key, pct)),
            None => undefined.push(key),
        }
    }
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    undefined.sort();
    (ranked, undefined)
}

/// Top 3 markets by YoY sales growth.
pub fn handle_growth_markets(seed: u64) -> Result<HandlerOutput> {
    let facts = data::generate_facts(seed)?;
    let totals = yearly_totals(facts, &["market"])?;
    let (ranked, undefined) = yoy_ranking(totals);

    let top3: Vec<(String, f64)> = ranked
        .into_iter()
        .take(3)
        .filter_map(|(mut key, pct)| key.pop().map(|market| (market, pct)))
        .collect();
    if top3.is_empty() {
        return Err(Ask360Error::Handler(
            "no market has a defined YoY growth".to_string(),
        ));
    }

    let ordinal_labels = ["Top Market", "2nd Market", "3rd Market"];
    let kpis = top3
        .iter()
        .zip(ordinal_labels.iter())
        .map(|((market, pct), label)| Kpi::new(*label, format!("{} ({:.1}%)", market, pct)))
        .collect();

    let mut text = vec!["The top 3 growth markets for yogurt are:".to_string()];
    for (i, (market, pct)) in top3.iter().enumerate() {
        text.push(format!(
            "{}. {} with {:+.1}% YoY growth",
            i + 1,
            market,
            pct
        ));
    }
    for key in &undefined {
        text.push(format!(
            "{} has no 2023 baseline, so its YoY growth is undefined.",
            key.join(" ")
        ));
    }

    let table = top3
        .iter()
        .map(|(market, pct)| json!({ "market": market, "yoy_growth_pct": format!("{:.1}%", pct) }))
        .collect();

    Ok(HandlerOutput {
        kpis,
        text,
        table,
        chart_path: None,
    })
}

/// Average repeat rate per age bucket, highest first.
pub fn handle_segment_repeat(seed: u64) -> Result<HandlerOutput> {
    let segments = data::generate_segments(seed)?;
    let averaged = segments
        .lazy()
        .group_by([col("age_bucket")])
        .agg([col("repeat_rate").mean()])
        .collect()?;

    let buckets = averaged.column("age_bucket")?.str()?;
    let rates = averaged.column("repeat_rate")?.f64()?;
    let mut ranked: Vec<(String, f64)> = Vec::with_capacity(averaged.height());
    for i in 0..averaged.height() {
        if let (Some(bucket), Some(rate)) = (buckets.get(i), rates.get(i)) {
            ranked.push((bucket.to_string(), rate));
        }
    }
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let (highest, highest_rate) = ranked
        .first()
        .cloned()
        .ok_or_else(|| Ask360Error::Handler("segment table has no rows".to_string()))?;

    let mut text = vec!["Average repeat rates by age segment:".to_string()];
    for (bucket, rate) in &ranked {
        text.push(format!("- {}: {:.1}%", bucket, rate * 100.0));
    }
    text.push(format!(
        "The {} segment has the highest repeat rate at {:.1}%.",
        highest,
        highest_rate * 100.0
    ));

    let table = ranked
        .iter()
        .map(|(bucket, rate)| {
            json!({ "age_bucket": bucket, "avg_repeat_rate": format!("{:.1}%", rate * 100.0) })
        })
        .collect();

    Ok(HandlerOutput {
        kpis: vec![Kpi::new(
            "Highest Repeat Rate",
            format!("{} ({:.1}%)", highest, highest_rate * 100.0),
        )],
        text,
        table,
        chart_path: None,
    })
}

/// Consumption occasions by share, largest first.
pub fn handle_occasions() -> Result<HandlerOutput> {
    let mut occasions = data::occasions();
    occasions.sort_by(|a, b| b.share.partial_cmp(&a.share).unwrap_or(std::cmp::Ordering::Equal));

    let top = occasions
        .first()
        .cloned()
        .ok_or_else(|| Ask360Error::Handler("occasion list is empty".to_string()))?;

    let mut text = vec!["Top consumption occasions for shelf-stable yogurt:".to_string()];
    for (i, occasion) in occasions.iter().enumerate() {
        text.push(format!(
            "{}. {}: {:.1}%",
            i + 1,
            occasion.name,
            occasion.share * 100.0
        ));
    }

    let table = occasions
        .iter()
        .map(|o| json!({ "occasion": o.name, "share": format!("{:.1}%", o.share * 100.0) }))
        .collect();

    Ok(HandlerOutput {
        kpis: vec![Kpi::new(
            "Top Occasion",
            format!("{} ({:.1}%)", top.name, top.share * 100.0),
        )],
        text,
        table,
        chart_path: None,
    })
}

/// YoY growth per (channel, pack) combination, fastest first.
pub fn handle_channel_pack(seed: u64) -> Result<HandlerOutput> {
    let facts = data::generate_facts(seed)?;
    let totals = yearly_totals(facts, &["channel", "pack"])?;
    let (ranked, undefined) = yoy_ranking(totals);

    let combos: Vec<(String, String, f64)> = ranked
        .into_iter()
        .filter_map(|(key, pct)| match key.as_slice() {
            [channel, pack] => Some((channel.clone(), pack.clone(), pct)),
            _ => None,
        })
        .collect();
    let (fastest_channel, fastest_pack, fastest_pct) = combos
        .first()
        .cloned()
        .ok_or_else(|| Ask360Error::Handler(
            "no channel/pack combination has a defined YoY growth".to_string(),
        ))?;

    let mut text = vec!["YoY growth by channel and pack:".to_string()];
    for (channel, pack, pct) in &combos {
        text.push(format!("- {} {}: {:+.1}%", channel, pack, pct));
    }
    for key in &undefined {
        text.push(format!(
            "{} has no 2023 baseline, so its YoY growth is undefined.",
            key.join(" ")
        ));
    }
    text.push(format!(
        "The fastest growing combination is {} {} with {:+.1}% growth.",
        fastest_channel, fastest_pack, fastest_pct
    ));

    let table = combos
        .iter()
        .map(|(channel, pack, pct)| {
            json!({
                "channel": channel,
                "pack": pack,
                "yoy_growth_pct": format!("{:.1}%", pct),
            })
        })
        .collect();

    Ok(HandlerOutput {
        kpis: vec![Kpi::new(
            "Fastest Growing",
            format!("{}-{} ({:.1}%)", fastest_channel, fastest_pack, fastest_pct),
        )],
        text,
        table,
        chart_path: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DEFAULT_SEED;

    #[test]
    fn test_yoy_percent_zero_baseline_is_undefined() {
        assert_eq!(yoy_percent(0.0, 1000.0), None);
        assert_eq!(yoy_percent(100.0, 125.0), Some(25.0));
    }

    #[test]
    fn test_growth_markets_exactly_three_rows_descending() {
        let output = handle_growth_markets(DEFAULT_SEED).unwrap();
        assert_eq!(output.table.len(), 3);
        assert_eq!(output.kpis.len(), 3);
        assert_eq!(output.kpis[0].label, "Top Market");

        let pcts: Vec<f64> = output
            .table
            .iter()
            .map(|row| {
                row["yoy_growth_pct"]
                    .as_str()
                    .unwrap()
                    .trim_end_matches('%')
                    .parse()
                    .unwrap()
            })
            .collect();
        assert!(pcts.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_channel_pack_covers_all_four_combinations() {
        let output = handle_channel_pack(DEFAULT_SEED).unwrap();
        assert_eq!(output.table.len(), 4);

        let mut combos: Vec<String> = output
            .table
            .iter()
            .map(|row| {
                format!(
                    "{}-{}",
                    row["channel"].as_str().unwrap(),
                    row["pack"].as_str().unwrap()
                )
            })
            .collect();
        combos.sort();
        assert_eq!(
            combos,
            vec![
                "ecommerce-multipack",
                "ecommerce-single",
                "retail-multipack",
                "retail-single",
            ]
        );

        let pcts: Vec<f64> = output
            .table
            .iter()
            .map(|row| {
                row["yoy_growth_pct"]
                    .as_str()
                    .unwrap()
                    .trim_end_matches('%')
                    .parse()
                    .unwrap()
            })
            .collect();
        assert!(pcts.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_segment_repeat_ranks_three_buckets() {
        let output = handle_segment_repeat(DEFAULT_SEED).unwrap();
        assert_eq!(output.table.len(), 3);
        assert_eq!(output.kpis.len(), 1);
        assert_eq!(output.kpis[0].label, "Highest Repeat Rate");
        // header + one line per bucket + closing sentence
        assert_eq!(output.text.len(), 5);
    }

    #[test]
    fn test_occasions_sorted_by_share() {
        let output = handle_occasions().unwrap();
        assert_eq!(output.table.len(), 4);
        assert_eq!(output.table[0]["occasion"], "breakfast");
        assert_eq!(output.kpis[0].value, "breakfast (45.0%)");
    }

    #[test]
    fn test_trend_writes_chart_and_twelve_rows() {
        let chart_dir = std::env::temp_dir().join("ask360-handler-trend-test");
        let output = handle_trend(DEFAULT_SEED, &chart_dir).unwrap();
        assert_eq!(output.table.len(), 12);
        assert_eq!(output.kpis.len(), 3);

        let chart_path = output.chart_path.unwrap();
        assert!(chart_path.exists());
        let _ = std::fs::remove_dir_all(&chart_dir);
    }

    #[test]
    fn test_trend_table_is_month_ordered() {
        let chart_dir = std::env::temp_dir().join("ask360-handler-trend-order-test");
        let output = handle_trend(DEFAULT_SEED, &chart_dir).unwrap();
        let dates: Vec<&str> = output
            .table
            .iter()
            .map(|row| row["date"].as_str().unwrap())
            .collect();
        assert_eq!(dates.first(), Some(&"2024-01-01"));
        assert_eq!(dates.last(), Some(&"2024-12-01"));
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        let _ = std::fs::remove_dir_all(&chart_dir);
    }
}
