//! Filtered, paginated reads.
//!
//! Filters are exact matches joined with AND. Every value reaches SQLite as
//! a bound parameter.

use serde::Serialize;
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::{
    error::Result,
    reading::{DailyObservation, YearlyAggregate, YieldRecord},
};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 50;
pub const MAX_PER_PAGE: i64 = 100;

/// A requested page, already clamped to valid bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        PageRequest {
            page: page.unwrap_or(DEFAULT_PAGE).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total_records: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(request: PageRequest, total_records: i64) -> Self {
        let total_pages = if total_records == 0 {
            0
        } else {
            (total_records + request.per_page - 1) / request.per_page
        };

        Pagination {
            page: request.page,
            per_page: request.per_page,
            total_records,
            total_pages,
            has_next: request.page < total_pages,
            has_prev: request.page > 1,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct Listing<T> {
    pub data: Vec<T>,
    pub count: usize,
}

/// Appends `WHERE a = ? AND b = ? ...` for the predicates that are set.
pub struct Predicates<'q, 'args> {
    qb: &'q mut QueryBuilder<'args, Sqlite>,
    empty: bool,
}

impl<'q, 'args> Predicates<'q, 'args> {
    fn new(qb: &'q mut QueryBuilder<'args, Sqlite>) -> Self {
        Predicates { qb, empty: true }
    }

    fn separator(&mut self) -> &mut QueryBuilder<'args, Sqlite> {
        self.qb.push(if self.empty { " WHERE " } else { " AND " });
        self.empty = false;
        &mut *self.qb
    }

    fn text(&mut self, column: &'static str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.separator()
                .push(column)
                .push(" = ")
                .push_bind(value.to_string());
        }
        self
    }

    fn int(&mut self, column: &'static str, value: Option<i64>) -> &mut Self {
        if let Some(value) = value {
            self.separator().push(column).push(" = ").push_bind(value);
        }
        self
    }
}

/// Filter over a single table.
pub trait Filter {
    const TABLE: &'static str;
    const ORDER_BY: &'static str;

    fn apply(&self, predicates: &mut Predicates<'_, '_>);
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DailyFilter {
    pub station: Option<String>,
    pub date: Option<i64>,
}

impl Filter for DailyFilter {
    const TABLE: &'static str = "weather";
    const ORDER_BY: &'static str = "station, date";

    fn apply(&self, predicates: &mut Predicates<'_, '_>) {
        predicates
            .text("station", self.station.as_deref())
            .int("date", self.date);
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct YearlyFilter {
    pub station: Option<String>,
    pub year: Option<i64>,
}

impl Filter for YearlyFilter {
    const TABLE: &'static str = "weather_yearly";
    const ORDER_BY: &'static str = "station, year";

    fn apply(&self, predicates: &mut Predicates<'_, '_>) {
        predicates
            .text("station", self.station.as_deref())
            .int("year", self.year);
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct YieldFilter {
    pub year: Option<i64>,
}

impl Filter for YieldFilter {
    const TABLE: &'static str = "crop_yields";
    const ORDER_BY: &'static str = "year";

    fn apply(&self, predicates: &mut Predicates<'_, '_>) {
        predicates.int("year", self.year);
    }
}

fn filtered<F: Filter>(select: &str, filter: &F) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(format!("SELECT {select} FROM {}", F::TABLE));
    filter.apply(&mut Predicates::new(&mut qb));
    qb
}

async fn paginate<T, F>(pool: &SqlitePool, filter: &F, request: PageRequest) -> Result<Page<T>>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    F: Filter,
{
    let total_records = filtered("COUNT(*)", filter)
        .build_query_scalar::<i64>()
        .fetch_one(pool)
        .await?;

    let mut qb = filtered("*", filter);
    qb.push(" ORDER BY ")
        .push(F::ORDER_BY)
        .push(" LIMIT ")
        .push_bind(request.per_page)
        .push(" OFFSET ")
        .push_bind(request.offset());
    let data = qb.build_query_as::<T>().fetch_all(pool).await?;

    Ok(Page {
        data,
        pagination: Pagination::new(request, total_records),
    })
}

pub async fn daily(
    pool: &SqlitePool,
    filter: &DailyFilter,
    request: PageRequest,
) -> Result<Page<DailyObservation>> {
    paginate(pool, filter, request).await
}

pub async fn yearly(
    pool: &SqlitePool,
    filter: &YearlyFilter,
    request: PageRequest,
) -> Result<Page<YearlyAggregate>> {
    paginate(pool, filter, request).await
}

pub async fn yields(pool: &SqlitePool, filter: &YieldFilter) -> Result<Listing<YieldRecord>> {
    let mut qb = filtered("*", filter);
    qb.push(" ORDER BY ").push(YieldFilter::ORDER_BY);
    let data = qb.build_query_as::<YieldRecord>().fetch_all(pool).await?;

    Ok(Listing {
        count: data.len(),
        data,
    })
}

// -- Tests -------------------------------------------------------------------
