use sqlx::SqlitePool;

use crate::error::Result;

const CREATE_WEATHER: &str = "CREATE TABLE weather (
    station TEXT NOT NULL,
    date INTEGER NOT NULL,
    max_temp INTEGER NOT NULL,
    min_temp INTEGER NOT NULL,
    precipitation INTEGER NOT NULL,
    PRIMARY KEY (station, date))";

const CREATE_WEATHER_YEARLY: &str = "CREATE TABLE weather_yearly (
    station TEXT NOT NULL,
    year INTEGER NOT NULL,
    avg_max_temp_degC REAL,
    avg_min_temp_degC REAL,
    total_precipitation_cm REAL,
    PRIMARY KEY (station, year))";

const CREATE_CROP_YIELDS: &str = "CREATE TABLE crop_yields (
    year INTEGER PRIMARY KEY,
    yield_bushels INTEGER NOT NULL)";

/// Drops and recreates all three tables. Any data already loaded is lost.
pub async fn recreate(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;

    for (table, create) in [
        ("weather", CREATE_WEATHER),
        ("weather_yearly", CREATE_WEATHER_YEARLY),
        ("crop_yields", CREATE_CROP_YIELDS),
    ] {
        sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
            .execute(&mut *tx)
            .await?;
        sqlx::query(create).execute(&mut *tx).await?;
    }

    tx.commit().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{sqlite::count_rows, test_support::fresh_pool, WEATHER};

    #[tokio::test]
    async fn should_empty_tables_on_recreate() {
        let (_dir, pool) = fresh_pool().await;
        sqlx::query("INSERT INTO weather VALUES ('A', 19850101, 1, 2, 3)")
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(count_rows(&pool, WEATHER).await.unwrap(), 1);

        recreate(&pool).await.unwrap();

        assert_eq!(count_rows(&pool, WEATHER).await.unwrap(), 0);
    }
}
