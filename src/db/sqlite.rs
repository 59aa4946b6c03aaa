//! Insert-if-absent writers and table counts.

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::{
    error::Result,
    reading::{DailyObservation, YearlyAggregate, YieldRecord},
};

/// Outcome of a single insert-if-absent write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inserted {
    New,
    Duplicate,
}

impl Inserted {
    fn from_rows_affected(rows: u64) -> Self {
        if rows == 0 {
            Inserted::Duplicate
        } else {
            Inserted::New
        }
    }
}

pub async fn insert_daily(
    tx: &mut Transaction<'_, Sqlite>,
    obs: &DailyObservation,
) -> Result<Inserted> {
    let result = sqlx::query(
        r#"
            INSERT OR IGNORE INTO weather (station, date, max_temp, min_temp, precipitation)
            VALUES (?1, ?2, ?3, ?4, ?5)"#,
    )
    .bind(&obs.station)
    .bind(obs.date)
    .bind(obs.max_temp)
    .bind(obs.min_temp)
    .bind(obs.precipitation)
    .execute(&mut **tx)
    .await?;

    Ok(Inserted::from_rows_affected(result.rows_affected()))
}

pub async fn insert_yield(
    tx: &mut Transaction<'_, Sqlite>,
    record: &YieldRecord,
) -> Result<Inserted> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO crop_yields (year, yield_bushels) VALUES (?1, ?2)",
    )
    .bind(record.year)
    .bind(record.yield_bushels)
    .execute(&mut **tx)
    .await?;

    Ok(Inserted::from_rows_affected(result.rows_affected()))
}

/// Writes aggregates in one transaction and returns how many were new.
pub async fn persist_yearly(pool: &SqlitePool, aggregates: &[YearlyAggregate]) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for agg in aggregates {
        let result = sqlx::query(
            r#"
                INSERT OR IGNORE INTO weather_yearly
                    (station, year, avg_max_temp_degC, avg_min_temp_degC, total_precipitation_cm)
                VALUES (?1, ?2, ?3, ?4, ?5)"#,
        )
        .bind(&agg.station)
        .bind(agg.year)
        .bind(agg.avg_max_temp_deg_c)
        .bind(agg.avg_min_temp_deg_c)
        .bind(agg.total_precipitation_cm)
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected();
    }

    tx.commit().await?;

    Ok(inserted)
}

pub async fn fetch_all_daily(pool: &SqlitePool) -> Result<Vec<DailyObservation>> {
    let rows = sqlx::query_as::<_, DailyObservation>(
        "SELECT station, date, max_temp, min_temp, precipitation FROM weather",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// `table` must be one of the fixed table names in [`crate::db`].
pub async fn count_rows(pool: &SqlitePool, table: &'static str) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await?;

    Ok(count)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::db::{test_support::fresh_pool, CROP_YIELDS, WEATHER, WEATHER_YEARLY};

    fn observation(date: i64, max_temp: i64) -> DailyObservation {
        DailyObservation {
            station: "USC00110072".to_string(),
            date,
            max_temp,
            min_temp: -83,
            precipitation: 160,
        }
    }

    #[tokio::test]
    async fn should_keep_first_row_on_duplicate_key() {
        let (_dir, pool) = fresh_pool().await;

        let mut tx = pool.begin().await.unwrap();
        let first = insert_daily(&mut tx, &observation(19850101, -6)).await.unwrap();
        let second = insert_daily(&mut tx, &observation(19850101, 999)).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(first, Inserted::New);
        assert_eq!(second, Inserted::Duplicate);
        assert_eq!(count_rows(&pool, WEATHER).await.unwrap(), 1);

        let rows = fetch_all_daily(&pool).await.unwrap();
        assert_eq!(rows[0].max_temp, -6);
    }

    #[tokio::test]
    async fn should_ignore_duplicate_years() {
        let (_dir, pool) = fresh_pool().await;

        let mut tx = pool.begin().await.unwrap();
        let record = YieldRecord {
            year: 1985,
            yield_bushels: 1234567890,
        };
        assert_eq!(insert_yield(&mut tx, &record).await.unwrap(), Inserted::New);
        assert_eq!(
            insert_yield(&mut tx, &record).await.unwrap(),
            Inserted::Duplicate
        );
        tx.commit().await.unwrap();

        assert_eq!(count_rows(&pool, CROP_YIELDS).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn should_persist_yearly_with_nulls() {
        let (_dir, pool) = fresh_pool().await;
        let aggregates = vec![YearlyAggregate {
            station: "A".to_string(),
            year: 1990,
            avg_max_temp_deg_c: None,
            avg_min_temp_deg_c: Some(1.5),
            total_precipitation_cm: None,
        }];

        assert_eq!(persist_yearly(&pool, &aggregates).await.unwrap(), 1);
        assert_eq!(persist_yearly(&pool, &aggregates).await.unwrap(), 0);
        assert_eq!(count_rows(&pool, WEATHER_YEARLY).await.unwrap(), 1);

        let stored = sqlx::query_as::<_, YearlyAggregate>("SELECT * FROM weather_yearly")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stored, aggregates[0]);
    }
}
