//! Yearly aggregation of daily station observations.
//!
//! Missing readings are excluded from every mean and sum. A statistic whose
//! inputs were all missing stays `None` rather than collapsing to zero.

use std::collections::BTreeMap;

use sqlx::SqlitePool;
use tracing::info;

use crate::{
    db::sqlite::{fetch_all_daily, persist_yearly},
    error::Result,
    reading::{DailyObservation, YearlyAggregate, MISSING},
};

pub fn convert_temp_to_celsius(tenths_of_celsius: f64) -> f64 {
    tenths_of_celsius / 10.0
}

pub fn convert_precip_to_cm(tenths_of_mm: f64) -> f64 {
    tenths_of_mm / 100.0
}

pub fn extract_year(date: i64) -> i64 {
    date / 10000
}

/// Two decimal places, ties to even.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[derive(Debug, Default)]
struct Accumulator {
    max_sum: i64,
    max_count: u32,
    min_sum: i64,
    min_count: u32,
    precip_sum: i64,
    precip_count: u32,
}

impl Accumulator {
    fn add(&mut self, obs: &DailyObservation) {
        if obs.max_temp != MISSING {
            self.max_sum += obs.max_temp;
            self.max_count += 1;
        }
        if obs.min_temp != MISSING {
            self.min_sum += obs.min_temp;
            self.min_count += 1;
        }
        if obs.precipitation != MISSING {
            self.precip_sum += obs.precipitation;
            self.precip_count += 1;
        }
    }

    fn finish(self, station: String, year: i64) -> YearlyAggregate {
        let mean = |sum: i64, count: u32| (count > 0).then(|| sum as f64 / count as f64);

        YearlyAggregate {
            station,
            year,
            avg_max_temp_deg_c: mean(self.max_sum, self.max_count)
                .map(|v| round2(convert_temp_to_celsius(v))),
            avg_min_temp_deg_c: mean(self.min_sum, self.min_count)
                .map(|v| round2(convert_temp_to_celsius(v))),
            total_precipitation_cm: (self.precip_count > 0)
                .then(|| convert_precip_to_cm(self.precip_sum as f64)),
        }
    }
}

/// Groups observations by station and year and computes one aggregate per
/// group, ordered by station then year.
pub fn yearly(observations: &[DailyObservation]) -> Vec<YearlyAggregate> {
    let mut groups: BTreeMap<(&str, i64), Accumulator> = BTreeMap::new();

    for obs in observations {
        groups
            .entry((obs.station.as_str(), obs.year()))
            .or_default()
            .add(obs);
    }

    groups
        .into_iter()
        .map(|((station, year), acc)| acc.finish(station.to_string(), year))
        .collect()
}

/// Rebuilds yearly aggregates from the full `weather` table. Must run after
/// every station file has been loaded.
pub async fn aggregate_yearly(pool: &SqlitePool) -> Result<u64> {
    let observations = fetch_all_daily(pool).await?;
    let aggregates = yearly(&observations);
    info!(
        "Aggregated {} daily rows into {} station years",
        observations.len(),
        aggregates.len()
    );

    persist_yearly(pool, &aggregates).await
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    fn obs(station: &str, date: i64, max: i64, min: i64, precip: i64) -> DailyObservation {
        DailyObservation {
            station: station.to_string(),
            date,
            max_temp: max,
            min_temp: min,
            precipitation: precip,
        }
    }

    #[test]
    fn should_convert_temperatures() {
        assert_eq!(convert_temp_to_celsius(100.0), 10.0);
        assert_eq!(convert_temp_to_celsius(-100.0), -10.0);
        assert_eq!(convert_temp_to_celsius(0.0), 0.0);
    }

    #[test]
    fn should_extract_year() {
        assert_eq!(extract_year(19850101), 1985);
        assert_eq!(extract_year(20141231), 2014);
    }

    #[test]
    fn should_aggregate_one_station_year() {
        let rows = vec![
            obs("USC00110072", 19850101, -6, -83, 160),
            obs("USC00110072", 19850102, -50, -206, 0),
        ];

        let result = yearly(&rows);

        assert_eq!(result.len(), 1);
        let agg = &result[0];
        assert_eq!(agg.station, "USC00110072");
        assert_eq!(agg.year, 1985);
        assert_eq!(agg.avg_max_temp_deg_c, Some(-2.8));
        assert_eq!(agg.avg_min_temp_deg_c, Some(-14.45));
        assert_eq!(agg.total_precipitation_cm, Some(1.6));
    }

    #[test]
    fn should_round_half_way_means_to_even() {
        let rows = vec![
            obs("A", 19900101, 1, -1, 0),
            obs("A", 19900102, 2, -2, 0),
            obs("A", 19900103, 3, -3, 0),
            obs("A", 19900104, 3, -3, MISSING),
        ];

        let agg = &yearly(&rows)[0];

        assert_eq!(agg.avg_max_temp_deg_c, Some(0.22));
        assert_eq!(agg.avg_min_temp_deg_c, Some(-0.22));
    }

    #[test]
    fn should_exclude_missing_values() {
        let rows = vec![
            obs("A", 19900101, 100, MISSING, MISSING),
            obs("A", 19900102, MISSING, 20, 55),
            obs("A", 19900103, 300, 40, MISSING),
        ];

        let agg = &yearly(&rows)[0];

        assert_eq!(agg.avg_max_temp_deg_c, Some(20.0));
        assert_eq!(agg.avg_min_temp_deg_c, Some(3.0));
        assert_eq!(agg.total_precipitation_cm, Some(0.55));
    }

    #[test]
    fn should_give_none_when_all_values_missing() {
        let rows = vec![
            obs("A", 19900101, MISSING, 10, MISSING),
            obs("A", 19900102, MISSING, 30, MISSING),
        ];

        let agg = &yearly(&rows)[0];

        assert_eq!(agg.avg_max_temp_deg_c, None);
        assert_eq!(agg.avg_min_temp_deg_c, Some(2.0));
        assert_eq!(agg.total_precipitation_cm, None);
    }

    #[test]
    fn should_group_by_station_and_year() {
        let rows = vec![
            obs("B", 19860101, 10, 0, 0),
            obs("A", 19851231, 10, 0, 0),
            obs("A", 19860101, 20, 0, 0),
            obs("A", 19850101, 30, 0, 0),
        ];

        let keys: Vec<_> = yearly(&rows)
            .into_iter()
            .map(|a| (a.station, a.year, a.avg_max_temp_deg_c))
            .collect();

        assert_eq!(
            keys,
            vec![
                ("A".to_string(), 1985, Some(2.0)),
                ("A".to_string(), 1986, Some(2.0)),
                ("B".to_string(), 1986, Some(1.0)),
            ]
        );
    }
}
