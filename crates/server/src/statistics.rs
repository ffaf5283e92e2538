//! Statistics API endpoints

use api_types::stats::{
    GroupTotal, MonthlyBucket, Period, StatisticsQuery, StatisticsReport, Summary, TrendQuery,
    TrendReport,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::{Months, Utc};

use crate::{ServerError, server::ServerState, user};

fn group_totals(groups: Vec<engine::GroupTotal>) -> Vec<GroupTotal> {
    groups
        .into_iter()
        .map(|group| GroupTotal {
            name: group.name,
            count: group.count,
            total: group.total.to_string(),
        })
        .collect()
}

/// Handle requests for user statistics
pub async fn report(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<StatisticsReport>, ServerError> {
    let report = state
        .engine
        .money_flow_statistics(&user.username, query.start_date, query.end_date)
        .await?;

    Ok(Json(StatisticsReport {
        summary: Summary {
            total_count: report.summary.total_count,
            total_amount: report.summary.total_amount.to_string(),
            average_amount: report.summary.average_amount.to_string(),
        },
        by_type: group_totals(report.by_type),
        by_category: group_totals(report.by_category),
        period: Period {
            start_date: query.start_date,
            end_date: query.end_date,
        },
    }))
}

/// Handle requests for the monthly trend report
pub async fn trend(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<TrendReport>, ServerError> {
    let months = query.months.unwrap_or(6);
    let end_date = Utc::now().date_naive();
    let start_date = end_date
        .checked_sub_months(Months::new(months))
        .ok_or_else(|| ServerError::Generic("months out of range".to_string()))?;

    let buckets = state
        .engine
        .trend_analysis(&user.username, months, end_date)
        .await?;

    Ok(Json(TrendReport {
        period: format!("{start_date} - {end_date}"),
        monthly_breakdown: buckets
            .into_iter()
            .map(|bucket| MonthlyBucket {
                month: bucket.month,
                count: bucket.count,
                total: bucket.total.to_string(),
            })
            .collect(),
    }))
}
