use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewRecipe, Recipe, RecipePatch};
use crate::store::StoreResult;

#[async_trait]
pub trait RecipeRepo: Send + Sync {
    /// All recipes, newest first.
    async fn list_all(&self) -> StoreResult<Vec<Recipe>>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Recipe>>;
    async fn create(&self, author_id: Uuid, recipe: NewRecipe) -> StoreResult<Recipe>;
    /// `None` when the recipe does not exist.
    async fn update(&self, id: Uuid, patch: RecipePatch) -> StoreResult<Option<Recipe>>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
    /// Adds the user to the recipe's viewers, refreshing the view time.
    async fn record_view(&self, recipe_id: Uuid, user_id: Uuid) -> StoreResult<()>;
    async fn save_for_user(&self, recipe_id: Uuid, user_id: Uuid) -> StoreResult<()>;
    /// Recipes the user saved, most recently saved first.
    async fn saved_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Recipe>>;
    /// Recipes the user viewed, most recently viewed first.
    async fn viewed_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Recipe>>;
}

const RELATIONS: &str = r#"
    ARRAY(SELECT ss.user_id FROM recipe_saves ss WHERE ss.recipe_id = r.id ORDER BY ss.saved_at) AS saved_by,
    ARRAY(SELECT vv.user_id FROM recipe_views vv WHERE vv.recipe_id = r.id ORDER BY vv.viewed_at) AS viewed_by
"#;

fn select_recipes(tail: &str) -> String {
    format!(
        r#"
        SELECT r.id, r.name, r.ingredients, r.steps, r.image, r.author_id,
               r.created_at, r.updated_at,
               {RELATIONS}
        FROM recipes r
        {tail}
        "#
    )
}

#[derive(Clone)]
pub struct PgRecipeRepo {
    db: PgPool,
}

impl PgRecipeRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecipeRepo for PgRecipeRepo {
    async fn list_all(&self) -> StoreResult<Vec<Recipe>> {
        let sql = select_recipes("ORDER BY r.created_at DESC");
        let rows = sqlx::query_as::<_, Recipe>(&sql).fetch_all(&self.db).await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Recipe>> {
        let sql = select_recipes("WHERE r.id = $1");
        let row = sqlx::query_as::<_, Recipe>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn create(&self, author_id: Uuid, recipe: NewRecipe) -> StoreResult<Recipe> {
        let row = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (id, name, ingredients, steps, image, author_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, ingredients, steps, image, author_id, created_at, updated_at,
                      ARRAY[]::uuid[] AS saved_by, ARRAY[]::uuid[] AS viewed_by
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&recipe.name)
        .bind(&recipe.ingredients)
        .bind(&recipe.steps)
        .bind(&recipe.image)
        .bind(author_id)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, patch: RecipePatch) -> StoreResult<Option<Recipe>> {
        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE recipes
               SET name        = COALESCE($2, name),
                   ingredients = COALESCE($3, ingredients),
                   steps       = COALESCE($4, steps),
                   image       = COALESCE($5, image),
                   updated_at  = now()
             WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.ingredients)
        .bind(&patch.steps)
        .bind(&patch.image)
        .fetch_optional(&self.db)
        .await?;

        match updated {
            Some(id) => self.find_by_id(id).await,
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_view(&self, recipe_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO recipe_views (recipe_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (recipe_id, user_id) DO UPDATE SET viewed_at = now()
            "#,
        )
        .bind(recipe_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn save_for_user(&self, recipe_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO recipe_saves (recipe_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (recipe_id, user_id) DO NOTHING
            "#,
        )
        .bind(recipe_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn saved_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Recipe>> {
        let sql = select_recipes(
            "JOIN recipe_saves s ON s.recipe_id = r.id AND s.user_id = $1 ORDER BY s.saved_at DESC",
        );
        let rows = sqlx::query_as::<_, Recipe>(&sql)
            .bind(user_id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn viewed_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Recipe>> {
        let sql = select_recipes(
            "JOIN recipe_views v ON v.recipe_id = r.id AND v.user_id = $1 ORDER BY v.viewed_at DESC",
        );
        let rows = sqlx::query_as::<_, Recipe>(&sql)
            .bind(user_id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }
}
