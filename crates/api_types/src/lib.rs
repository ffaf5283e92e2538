use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod catalog {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatusView {
        pub id: i32,
        pub name: String,
        pub description: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatusNew {
        pub name: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TypeView {
        pub id: i32,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TypeNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: i32,
        pub name: String,
        /// Parent type id.
        #[serde(rename = "type")]
        pub type_id: i32,
        pub type_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        /// Parent type id; must be in the caller's working set.
        #[serde(rename = "type")]
        pub type_id: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SubcategoryView {
        pub id: i32,
        pub name: String,
        /// Parent category id.
        #[serde(rename = "category")]
        pub category_id: i32,
        pub category_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SubcategoryNew {
        pub name: String,
        /// Parent category id; must be in the caller's working set.
        #[serde(rename = "category")]
        pub category_id: i32,
    }

    /// Optional `?category=ID` filter for subcategory listings.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SubcategoryQuery {
        pub category: Option<i32>,
    }
}

pub mod money_flow {
    use super::*;

    /// A referenced taxonomy entry, by id and name.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct NamedRef {
        pub id: i32,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MoneyFlowView {
        pub id: i32,
        pub created_at: NaiveDate,
        pub status: NamedRef,
        #[serde(rename = "type")]
        pub flow_type: NamedRef,
        pub category: NamedRef,
        pub subcategory: NamedRef,
        /// Decimal amount with exactly two fractional digits.
        pub amount: String,
        pub comment: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MoneyFlowNew {
        pub created_at: NaiveDate,
        #[serde(rename = "status")]
        pub status_id: i32,
        #[serde(rename = "type")]
        pub type_id: i32,
        #[serde(rename = "category")]
        pub category_id: i32,
        #[serde(rename = "subcategory")]
        pub subcategory_id: i32,
        /// Decimal amount, at most two fractional digits, strictly positive.
        pub amount: String,
        pub comment: Option<String>,
    }

    /// Partial update; absent fields keep their stored values. The owning
    /// user is not part of the contract.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MoneyFlowUpdate {
        pub created_at: Option<NaiveDate>,
        #[serde(rename = "status")]
        pub status_id: Option<i32>,
        #[serde(rename = "type")]
        pub type_id: Option<i32>,
        #[serde(rename = "category")]
        pub category_id: Option<i32>,
        #[serde(rename = "subcategory")]
        pub subcategory_id: Option<i32>,
        pub amount: Option<String>,
        pub comment: Option<String>,
    }

    /// Query-string filters for the list endpoint. Date bounds are
    /// inclusive; the name filters are case-insensitive substring matches.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MoneyFlowQuery {
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        pub status: Option<String>,
        #[serde(rename = "type")]
        pub type_name: Option<String>,
        pub category: Option<String>,
        pub subcategory: Option<String>,
    }
}

pub mod stats {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatisticsQuery {
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Summary {
        pub total_count: i64,
        pub total_amount: String,
        pub average_amount: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupTotal {
        pub name: String,
        pub count: i64,
        pub total: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Period {
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatisticsReport {
        pub summary: Summary,
        pub by_type: Vec<GroupTotal>,
        pub by_category: Vec<GroupTotal>,
        pub period: Period,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TrendQuery {
        /// Trailing window size in months; defaults to 6.
        pub months: Option<u32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyBucket {
        /// `YYYY-MM`.
        pub month: String,
        pub count: i64,
        pub total: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TrendReport {
        /// `start - end` of the analyzed window.
        pub period: String,
        pub monthly_breakdown: Vec<MonthlyBucket>,
    }
}
