//! Repository for the `user_credits` table.
//!
//! Deduction is a single conditional `UPDATE`, so concurrent generations
//! for the same user can never drive the balance negative.

use sqlx::PgPool;

use crate::models::credit::UserCredits;

const COLUMNS: &str = "user_id, balance, updated_at";

/// Provides balance reads and atomic adjustments.
pub struct CreditRepo;

impl CreditRepo {
    /// Current balance row, if the user has one.
    pub async fn find(pool: &PgPool, user_id: &str) -> Result<Option<UserCredits>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_credits WHERE user_id = $1");
        sqlx::query_as::<_, UserCredits>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Add credits, creating the balance row if needed. Returns the new
    /// balance.
    pub async fn grant(pool: &PgPool, user_id: &str, amount: i32) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            "INSERT INTO user_credits (user_id, balance) VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE
                SET balance = user_credits.balance + EXCLUDED.balance, updated_at = NOW()
             RETURNING balance",
        )
        .bind(user_id)
        .bind(amount)
        .fetch_one(pool)
        .await
    }

    /// Deduct `amount` if the balance covers it.
    ///
    /// Returns the remaining balance, or `None` when the user has no
    /// balance row or too few credits (nothing is deducted in that case).
    pub async fn try_deduct(
        pool: &PgPool,
        user_id: &str,
        amount: i32,
    ) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE user_credits
             SET balance = balance - $2, updated_at = NOW()
             WHERE user_id = $1 AND balance >= $2
             RETURNING balance",
        )
        .bind(user_id)
        .bind(amount)
        .fetch_optional(pool)
        .await
    }
}
