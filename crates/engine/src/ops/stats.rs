//! Aggregate reports over the ledger.

use sea_orm::{ConnectionTrait, DbBackend, Statement, Value, prelude::*};

use crate::{EngineError, MoneyCents, ResultEngine};

use super::Engine;

/// Headline numbers for a user's ledger (optionally date-bounded).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatisticsSummary {
    pub total_count: i64,
    pub total_amount: MoneyCents,
    /// Mean entry amount, rounded half-up to the cent. Zero when the ledger
    /// slice is empty.
    pub average_amount: MoneyCents,
}

/// Count and summed amount for one taxonomy name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupTotal {
    pub name: String,
    pub count: i64,
    pub total: MoneyCents,
}

/// Summary plus per-type and per-category breakdowns, each ordered by
/// descending total.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatisticsReport {
    pub summary: StatisticsSummary,
    pub by_type: Vec<GroupTotal>,
    pub by_category: Vec<GroupTotal>,
}

/// One calendar month of a trend report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthlyBucket {
    /// `YYYY-MM`.
    pub month: String,
    pub count: i64,
    pub total: MoneyCents,
}

fn round_half_up_div(total: i64, count: i64) -> i64 {
    (total + count / 2) / count
}

fn date_range_condition(start_date: Option<Date>, end_date: Option<Date>) -> (String, Vec<Value>) {
    let mut cond = String::new();
    let mut values = Vec::new();
    if let Some(start) = start_date {
        cond.push_str(" AND money_flows.created_at >= ?");
        values.push(start.into());
    }
    if let Some(end) = end_date {
        cond.push_str(" AND money_flows.created_at <= ?");
        values.push(end.into());
    }
    (cond, values)
}

impl Engine {
    /// Computes count/total/average for the caller's ledger, plus breakdowns
    /// grouped by type name and by category name.
    pub async fn money_flow_statistics(
        &self,
        user_id: &str,
        start_date: Option<Date>,
        end_date: Option<Date>,
    ) -> ResultEngine<StatisticsReport> {
        let backend = self.database.get_database_backend();
        let (range_cond, range_values) = date_range_condition(start_date, end_date);

        let stmt = Statement::from_sql_and_values(
            backend,
            format!(
                "SELECT COUNT(money_flows.id) AS total_count, \
                        COALESCE(SUM(money_flows.amount_cents), 0) AS total_amount \
                 FROM money_flows \
                 WHERE money_flows.user_id = ?{range_cond}"
            ),
            {
                let mut v: Vec<Value> = vec![user_id.into()];
                v.extend(range_values.clone());
                v
            },
        );
        let row = self.database.query_one(stmt).await?;
        let (total_count, total_amount): (i64, i64) = match row {
            Some(row) => (
                row.try_get("", "total_count")?,
                row.try_get("", "total_amount")?,
            ),
            None => (0, 0),
        };
        let average_amount = if total_count > 0 {
            round_half_up_div(total_amount, total_count)
        } else {
            0
        };

        let by_type = self
            .grouped_totals(backend, "types", "type_id", user_id, &range_cond, &range_values)
            .await?;
        let by_category = self
            .grouped_totals(
                backend,
                "categories",
                "category_id",
                user_id,
                &range_cond,
                &range_values,
            )
            .await?;

        Ok(StatisticsReport {
            summary: StatisticsSummary {
                total_count,
                total_amount: MoneyCents::new(total_amount),
                average_amount: MoneyCents::new(average_amount),
            },
            by_type,
            by_category,
        })
    }

    async fn grouped_totals(
        &self,
        backend: DbBackend,
        table: &str,
        fk_column: &str,
        user_id: &str,
        range_cond: &str,
        range_values: &[Value],
    ) -> ResultEngine<Vec<GroupTotal>> {
        let stmt = Statement::from_sql_and_values(
            backend,
            format!(
                "SELECT {table}.name AS name, \
                        COUNT(money_flows.id) AS count, \
                        COALESCE(SUM(money_flows.amount_cents), 0) AS total \
                 FROM money_flows \
                 JOIN {table} ON {table}.id = money_flows.{fk_column} \
                 WHERE money_flows.user_id = ?{range_cond} \
                 GROUP BY {table}.name \
                 ORDER BY total DESC, name ASC"
            ),
            {
                let mut v: Vec<Value> = vec![user_id.into()];
                v.extend(range_values.iter().cloned());
                v
            },
        );

        let rows = self.database.query_all(stmt).await?;
        rows.iter()
            .map(|row| {
                Ok(GroupTotal {
                    name: row.try_get("", "name")?,
                    count: row.try_get("", "count")?,
                    total: MoneyCents::new(row.try_get("", "total")?),
                })
            })
            .collect()
    }

    /// Buckets the caller's ledger by calendar month over the trailing
    /// `months_back` months ending at `end_date`, ascending. Months with no
    /// entries are absent from the result.
    pub async fn trend_analysis(
        &self,
        user_id: &str,
        months_back: u32,
        end_date: Date,
    ) -> ResultEngine<Vec<MonthlyBucket>> {
        let start_date = end_date
            .checked_sub_months(chrono::Months::new(months_back))
            .ok_or_else(|| {
                EngineError::InvalidAmount("months_back out of range".to_string())
            })?;

        let stmt = Statement::from_sql_and_values(
            self.database.get_database_backend(),
            "SELECT strftime('%Y-%m', created_at) AS month, \
                    COUNT(id) AS count, \
                    COALESCE(SUM(amount_cents), 0) AS total \
             FROM money_flows \
             WHERE user_id = ? AND created_at >= ? AND created_at <= ? \
             GROUP BY month \
             ORDER BY month ASC",
            vec![user_id.into(), start_date.into(), end_date.into()],
        );

        let rows = self.database.query_all(stmt).await?;
        rows.iter()
            .map(|row| {
                Ok(MonthlyBucket {
                    month: row.try_get("", "month")?,
                    count: row.try_get("", "count")?,
                    total: MoneyCents::new(row.try_get("", "total")?),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::round_half_up_div;

    #[test]
    fn average_rounds_half_up() {
        assert_eq!(round_half_up_div(10, 4), 3);
        assert_eq!(round_half_up_div(9, 4), 2);
        assert_eq!(round_half_up_div(3_000_000, 2), 1_500_000);
    }
}
