use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{FitnessGoals, GoalsInput};
use crate::store::StoreResult;

#[async_trait]
pub trait GoalsRepo: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> StoreResult<Option<FitnessGoals>>;
    /// Creates the user's goals or overwrites the existing record in place.
    async fn upsert(&self, user_id: Uuid, input: GoalsInput) -> StoreResult<FitnessGoals>;
}

#[derive(Clone)]
pub struct PgGoalsRepo {
    db: PgPool,
}

impl PgGoalsRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GoalsRepo for PgGoalsRepo {
    async fn find_by_user(&self, user_id: Uuid) -> StoreResult<Option<FitnessGoals>> {
        let goals = sqlx::query_as::<_, FitnessGoals>(
            r#"
            SELECT id, user_id, calories, protein, carbs, fat, water, allergies,
                   created_at, updated_at
            FROM fitness_goals
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(goals)
    }

    async fn upsert(&self, user_id: Uuid, input: GoalsInput) -> StoreResult<FitnessGoals> {
        // UNIQUE (user_id) makes this a single atomic create-or-update.
        let goals = sqlx::query_as::<_, FitnessGoals>(
            r#"
            INSERT INTO fitness_goals (id, user_id, calories, protein, carbs, fat, water, allergies)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id) DO UPDATE
               SET calories   = EXCLUDED.calories,
                   protein    = EXCLUDED.protein,
                   carbs      = EXCLUDED.carbs,
                   fat        = EXCLUDED.fat,
                   water      = EXCLUDED.water,
                   allergies  = EXCLUDED.allergies,
                   updated_at = now()
            RETURNING id, user_id, calories, protein, carbs, fat, water, allergies,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(input.calories)
        .bind(input.protein)
        .bind(input.carbs)
        .bind(input.fat)
        .bind(input.water)
        .bind(&input.allergies)
        .fetch_one(&self.db)
        .await?;
        Ok(goals)
    }
}
