pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{
    CatalogScope, CategoryEntry, Engine, EngineBuilder, GroupTotal, MoneyFlowDraft,
    MoneyFlowListFilter, MoneyFlowPatch, MoneyFlowRecord, MonthlyBucket, StatisticsReport,
    StatisticsSummary, SubcategoryEntry,
};

pub mod categories;
pub mod category_ownerships;
pub mod money_flows;
pub mod status_ownerships;
pub mod statuses;
pub mod subcategories;
pub mod subcategory_ownerships;
pub mod type_ownerships;
pub mod types;
pub mod users;

mod error;
mod money;
mod ops;

type ResultEngine<T> = Result<T, EngineError>;
