use sea_orm::{DatabaseConnection, DbErr, error::SqlErr};
use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

mod catalog;
mod flows;
mod ownership;
mod stats;

pub use catalog::{CatalogScope, CategoryEntry, SubcategoryEntry};
pub use flows::{MoneyFlowDraft, MoneyFlowListFilter, MoneyFlowPatch, MoneyFlowRecord};
pub use stats::{GroupTotal, MonthlyBucket, StatisticsReport, StatisticsSummary};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// Canonical form for catalog names: trimmed, inner whitespace collapsed,
/// NFC-normalized so visually identical names land on the same row.
fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let mut out = String::new();
    for token in value.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(token.nfc());
    }
    if out.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(out)
}

/// True for the duplicate-key failure the get-or-create race produces. The
/// unique index is the source of truth; callers re-read instead of failing.
fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_normalization_collapses_whitespace() {
        assert_eq!(
            normalize_required_name("  Основная   работа ", "subcategory").unwrap(),
            "Основная работа"
        );
    }

    #[test]
    fn name_normalization_rejects_empty() {
        assert!(normalize_required_name("   ", "status").is_err());
    }

    #[test]
    fn name_normalization_unifies_composed_forms() {
        // U+0065 U+0301 (decomposed) vs U+00E9 (composed)
        assert_eq!(
            normalize_required_name("Cafe\u{301}", "category").unwrap(),
            normalize_required_name("Caf\u{e9}", "category").unwrap()
        );
    }
}
