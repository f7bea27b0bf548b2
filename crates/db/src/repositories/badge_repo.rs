//! Repository for the `badges` catalog table.

use catchlog_core::badges::BadgeDefinition;
use sqlx::PgPool;

use crate::models::badge::Badge;

/// Column list for `badges` queries.
const COLUMNS: &str = "id, code, display_name, description, category, \
                       achievement_condition, image_ref, created_at";

/// Provides catalog reads and the seed insert.
pub struct BadgeRepo;

impl BadgeRepo {
    /// Number of badges in the catalog.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM badges")
            .fetch_one(pool)
            .await
    }

    /// Insert a catalog entry.
    ///
    /// Returns `None` when a badge with the same code already exists, so two
    /// processes seeding at once cannot fail each other's startup.
    pub async fn insert(
        pool: &PgPool,
        definition: &BadgeDefinition,
    ) -> Result<Option<Badge>, sqlx::Error> {
        let query = format!(
            "INSERT INTO badges
                (code, display_name, description, category, achievement_condition, image_ref)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT ON CONSTRAINT uq_badges_code DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Badge>(&query)
            .bind(&definition.code)
            .bind(&definition.display_name)
            .bind(&definition.description)
            .bind(definition.category.as_str())
            .bind(&definition.achievement_condition)
            .bind(&definition.image_ref)
            .fetch_optional(pool)
            .await
    }

    /// Find a badge by its symbolic code.
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Badge>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM badges WHERE code = $1");
        sqlx::query_as::<_, Badge>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }
}
