//! Synthetic dataset generators for the FreshFoods yogurt demo.
//!
//! All data is produced in memory from fixed formulas plus seeded Gaussian
//! noise, so every call with the same seed yields the same frames. There is
//! no global RNG state: each generator builds its own `StdRng` from the seed
//! it is given.

use crate::error::Result;
use chrono::{Datelike, Months, NaiveDate};
use itertools::iproduct;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;

/// Seed used when the caller does not specify one.
pub const DEFAULT_SEED: u64 = 42;

pub const MARKETS: [&str; 5] = ["US", "UK", "DE", "IN", "BR"];
pub const CHANNELS: [&str; 2] = ["retail", "ecommerce"];
pub const PACKS: [&str; 2] = ["single", "multipack"];
pub const AGE_BUCKETS: [&str; 3] = ["18-34", "35-54", "55+"];

/// A consumption occasion and its share of total consumption.
/// Shares are research estimates and do not have to sum to 1.
#[derive(Debug, Clone, Serialize)]
pub struct Occasion {
    pub name: &'static str,
    pub share: f64,
}

/// Fixed consumer-research list of consumption occasions.
pub fn occasions() -> Vec<Occasion> {
    vec![
        Occasion { name: "breakfast", share: 0.45 },
        Occasion { name: "post-workout", share: 0.18 },
        Occasion { name: "snack", share: 0.27 },
        Occasion { name: "late-night", share: 0.10 },
    ]
}

/// FNV-1a 64-bit hash over UTF-8 bytes.
///
/// Segment rates are derived from this hash; it has to stay byte-for-byte
/// stable across runs and platforms, which rules out `std`'s randomized
/// hasher. Constants are the standard FNV-1a offset basis and prime.
pub fn stable_hash(s: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in s.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Month-start dates covering Jan 2023 through Dec 2024.
fn month_starts() -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(24);
    let mut current = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid start date");
    let end = NaiveDate::from_ymd_opt(2024, 12, 1).expect("valid end date");
    while current <= end {
        dates.push(current);
        current = current.checked_add_months(Months::new(1)).expect("valid month step");
    }
    dates
}

/// Generate the monthly sales fact table for 2023-2024.
///
/// One row per (month, market, channel, pack) tuple: 24 x 5 x 2 x 2 = 480
/// rows. Sales follow a fixed multiplier formula with N(0, 0.1) noise,
/// floored at zero; units are sales at an approximate price of $3.50.
pub fn generate_facts(seed: u64) -> Result<DataFrame> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 0.1).expect("valid noise distribution");

    let capacity = 24 * MARKETS.len() * CHANNELS.len() * PACKS.len();
    let mut dates: Vec<String> = Vec::with_capacity(capacity);
    let mut years: Vec<i32> = Vec::with_capacity(capacity);
    let mut markets: Vec<&str> = Vec::with_capacity(capacity);
    let mut channels: Vec<&str> = Vec::with_capacity(capacity);
    let mut products: Vec<&str> = Vec::with_capacity(capacity);
    let mut packs: Vec<&str> = Vec::with_capacity(capacity);
    let mut sales_usd: Vec<f64> = Vec::with_capacity(capacity);
    let mut units: Vec<f64> = Vec::with_capacity(capacity);

    for date in month_starts() {
        for (market, channel, pack) in iproduct!(MARKETS, CHANNELS, PACKS) {
            let base = if market == "US" { 100_000.0 } else { 50_000.0 };
            let year_mult = if date.year() == 2024 { 1.0 } else { 0.8 };
            let channel_mult = if channel == "ecommerce" { 1.2 } else { 1.0 };
            let pack_mult = if pack == "multipack" { 1.1 } else { 1.0 };

            let sales: f64 = base
                * year_mult
                * channel_mult
                * pack_mult
                * (1.0 + noise.sample(&mut rng));
            let sales = sales.max(0.0);

            dates.push(date.format("%Y-%m-%d").to_string());
            years.push(date.year());
            markets.push(market);
            channels.push(channel);
            products.push("yogurt");
            packs.push(pack);
            sales_usd.push(sales);
            units.push((sales / 3.5).max(0.0));
        }
    }

    let df = df![
        "date" => dates,
        "year" => years,
        "market" => markets,
        "channel" => channels,
        "product" => products,
        "pack" => packs,
        "sales_usd" => sales_usd,
        "units" => units,
    ]?;

    Ok(df)
}

/// Generate 2024 trial/repeat rates per (market, age bucket): 15 rows.
///
/// Rates come from the stable hash of market+age plus seeded noise, capped
/// at 1.0. There is no lower clamp, so a rate can in principle dip below
/// zero on an unlucky draw.
pub fn generate_segments(seed: u64) -> Result<DataFrame> {
    let mut rng = StdRng::seed_from_u64(seed);
    let trial_noise = Normal::new(0.0, 0.02).expect("valid noise distribution");
    let repeat_noise = Normal::new(0.0, 0.03).expect("valid noise distribution");

    let capacity = MARKETS.len() * AGE_BUCKETS.len();
    let mut years: Vec<i32> = Vec::with_capacity(capacity);
    let mut markets: Vec<&str> = Vec::with_capacity(capacity);
    let mut age_buckets: Vec<&str> = Vec::with_capacity(capacity);
    let mut trial_rates: Vec<f64> = Vec::with_capacity(capacity);
    let mut repeat_rates: Vec<f64> = Vec::with_capacity(capacity);

    for market in MARKETS {
        for age in AGE_BUCKETS {
            let h = stable_hash(&format!("{}{}", market, age));
            let base_trial = 0.15 + (h % 20) as f64 / 100.0;
            let base_repeat = 0.35 + (h % 30) as f64 / 100.0;

            years.push(2024);
            markets.push(market);
            age_buckets.push(age);
            trial_rates.push((base_trial + trial_noise.sample(&mut rng)).min(1.0));
            repeat_rates.push((base_repeat + repeat_noise.sample(&mut rng)).min(1.0));
        }
    }

    let df = df![
        "year" => years,
        "market" => markets,
        "age_bucket" => age_buckets,
        "trial_rate" => trial_rates,
        "repeat_rate" => repeat_rates,
    ]?;

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_hash_golden_values() {
        // Standard FNV-1a 64-bit test vectors.
        assert_eq!(stable_hash(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(stable_hash("a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(stable_hash("foobar"), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn test_facts_shape_and_bounds() {
        let facts = generate_facts(DEFAULT_SEED).unwrap();
        assert_eq!(facts.height(), 480);

        for value in facts.column("sales_usd").unwrap().f64().unwrap() {
            assert!(value.unwrap() >= 0.0);
        }
        for value in facts.column("units").unwrap().f64().unwrap() {
            assert!(value.unwrap() >= 0.0);
        }
    }

    #[test]
    fn test_facts_deterministic_for_same_seed() {
        let a = generate_facts(DEFAULT_SEED).unwrap();
        let b = generate_facts(DEFAULT_SEED).unwrap();

        let sales_a: Vec<f64> = a
            .column("sales_usd")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        let sales_b: Vec<f64> = b
            .column("sales_usd")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(sales_a, sales_b);
    }

    #[test]
    fn test_segments_shape_and_caps() {
        let segments = generate_segments(DEFAULT_SEED).unwrap();
        assert_eq!(segments.height(), 15);

        for value in segments.column("trial_rate").unwrap().f64().unwrap() {
            assert!(value.unwrap() <= 1.0);
        }
        for value in segments.column("repeat_rate").unwrap().f64().unwrap() {
            assert!(value.unwrap() <= 1.0);
        }
    }

    #[test]
    fn test_occasions_fixed_list() {
        let list = occasions();
        assert_eq!(list.len(), 4);
        assert_eq!(list[0].name, "breakfast");
        assert!((list[0].share - 0.45).abs() < f64::EPSILON);
    }
}
