use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{repo::RecipeRepo, repo_types::Recipe};
use crate::error::{AppError, AppResult};

pub(crate) fn recipe_not_found() -> AppError {
    AppError::NotFound("Recipe not found".into())
}

/// `:id` path segment of a recipe route. An id that is not a UUID cannot
/// name any recipe, so it is rejected as `NotFound`.
#[derive(Debug)]
pub struct RecipeId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for RecipeId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<Uuid>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(RecipeId(id)),
            Err(rejection) => {
                debug!(error = %rejection.body_text(), "unparseable recipe id");
                Err(recipe_not_found())
            }
        }
    }
}

/// Loads a recipe the caller is about to mutate.
///
/// Missing ids are `NotFound`; recipes authored by someone else (or by nobody)
/// are `Forbidden`.
pub(crate) async fn load_owned_recipe(
    repo: &dyn RecipeRepo,
    id: Uuid,
    user_id: Uuid,
    action: &str,
) -> AppResult<Recipe> {
    let recipe = repo.find_by_id(id).await?.ok_or_else(recipe_not_found)?;
    if !recipe.is_authored_by(user_id) {
        warn!(recipe_id = %id, %user_id, author_id = ?recipe.author_id, action, "owner check failed");
        return Err(AppError::Forbidden(format!(
            "Not authorized to {action} this recipe"
        )));
    }
    Ok(recipe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::repo_types::NewRecipe;
    use crate::store::memory::MemoryStore;

    fn new_recipe() -> NewRecipe {
        NewRecipe {
            name: "Shakshuka".into(),
            ingredients: "eggs, tomatoes".into(),
            steps: "simmer".into(),
            image: String::new(),
        }
    }

    #[tokio::test]
    async fn owner_passes_check() {
        let store = MemoryStore::default();
        let owner = Uuid::new_v4();
        let recipe = RecipeRepo::create(&store, owner, new_recipe()).await.unwrap();
        let loaded = load_owned_recipe(&store, recipe.id, owner, "update").await.unwrap();
        assert_eq!(loaded.id, recipe.id);
    }

    #[tokio::test]
    async fn other_user_is_forbidden() {
        let store = MemoryStore::default();
        let recipe = RecipeRepo::create(&store, Uuid::new_v4(), new_recipe()).await.unwrap();
        let err = load_owned_recipe(&store, recipe.id, Uuid::new_v4(), "delete")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Not authorized to delete this recipe");
    }

    async fn extract_id(uri: &str) -> Result<RecipeId, AppError> {
        use axum::{body::Body, http::Request, routing::get, Router};
        use std::sync::{Arc, Mutex};
        use tower::ServiceExt;

        // Path extraction needs a matched route.
        let seen: Arc<Mutex<Option<Result<RecipeId, AppError>>>> = Arc::default();
        let slot = seen.clone();
        let app = Router::new().route(
            "/recipes/:id",
            get(move |id: Result<RecipeId, AppError>| async move {
                *slot.lock().unwrap() = Some(id);
            }),
        );
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let result = seen.lock().unwrap().take().unwrap();
        result
    }

    #[tokio::test]
    async fn recipe_id_parses_uuids() {
        let id = Uuid::new_v4();
        let RecipeId(parsed) = extract_id(&format!("/recipes/{id}")).await.unwrap();
        assert_eq!(parsed, id);
    }

    #[tokio::test]
    async fn malformed_recipe_id_is_not_found() {
        let err = extract_id("/recipes/not-a-uuid").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.to_string(), "Recipe not found");
    }

    #[tokio::test]
    async fn missing_recipe_is_not_found() {
        let store = MemoryStore::default();
        let err = load_owned_recipe(&store, Uuid::new_v4(), Uuid::new_v4(), "update")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
