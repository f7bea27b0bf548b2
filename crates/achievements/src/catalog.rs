//! Startup seeding of the persisted badge catalog.

use catchlog_core::badges::catalog;

use crate::error::StoreError;
use crate::ledger::BadgeLedger;

/// Insert the static catalog if the persisted catalog is empty.
///
/// Safe to call on every start: a non-empty catalog is left untouched and
/// individual inserts skip codes that already exist. Returns the number of
/// badges inserted. Callers should log a failure and keep running; no badge
/// can be awarded until a later start seeds successfully.
pub async fn seed_if_empty(ledger: &dyn BadgeLedger) -> Result<usize, StoreError> {
    let existing = ledger.count_badges().await?;
    if existing > 0 {
        tracing::debug!(existing, "Badge catalog already seeded");
        return Ok(0);
    }

    let mut inserted = 0;
    for definition in catalog() {
        if ledger.insert_badge(&definition).await? {
            inserted += 1;
        }
    }

    tracing::info!(inserted, "Badge catalog seeded");
    Ok(inserted)
}
