use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult};
use crate::auth::repo::UserRepo;
use crate::auth::repo_types::{NewUser, User};
use crate::fitness::repo::GoalsRepo;
use crate::fitness::repo_types::{FitnessGoals, GoalsInput};
use crate::recipes::repo::RecipeRepo;
use crate::recipes::repo_types::{NewRecipe, Recipe, RecipePatch};

/// Process-local store backing every repository trait.
///
/// All state sits behind one lock, so each operation is atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    seq: u64,
    users: HashMap<Uuid, User>,
    goals: HashMap<Uuid, FitnessGoals>,
    recipes: HashMap<Uuid, (u64, Recipe)>,
    // (recipe_id, user_id) -> sequence of the last save / view
    saves: HashMap<(Uuid, Uuid), u64>,
    views: HashMap<(Uuid, Uuid), u64>,
}

impl Inner {
    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn users_of(rel: &HashMap<(Uuid, Uuid), u64>, recipe_id: Uuid) -> Vec<Uuid> {
        let mut users: Vec<(u64, Uuid)> = rel
            .iter()
            .filter(|((r, _), _)| *r == recipe_id)
            .map(|((_, u), seq)| (*seq, *u))
            .collect();
        users.sort_unstable();
        users.into_iter().map(|(_, u)| u).collect()
    }

    fn hydrate(&self, recipe: &Recipe) -> Recipe {
        let mut out = recipe.clone();
        out.saved_by = Self::users_of(&self.saves, recipe.id);
        out.viewed_by = Self::users_of(&self.views, recipe.id);
        out
    }

    /// Recipes related to `user_id`, most recent relation first.
    fn related(&self, rel: &HashMap<(Uuid, Uuid), u64>, user_id: Uuid) -> Vec<Recipe> {
        let mut hits: Vec<(u64, Uuid)> = rel
            .iter()
            .filter(|((_, u), _)| *u == user_id)
            .map(|((r, _), seq)| (*seq, *r))
            .collect();
        hits.sort_unstable_by(|a, b| b.cmp(a));
        hits.into_iter()
            .filter_map(|(_, id)| self.recipes.get(&id))
            .map(|(_, r)| self.hydrate(r))
            .collect()
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            salt: user.salt,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl GoalsRepo for MemoryStore {
    async fn find_by_user(&self, user_id: Uuid) -> StoreResult<Option<FitnessGoals>> {
        Ok(self.inner.read().await.goals.get(&user_id).cloned())
    }

    async fn upsert(&self, user_id: Uuid, input: GoalsInput) -> StoreResult<FitnessGoals> {
        let mut inner = self.inner.write().await;
        let now = OffsetDateTime::now_utc();
        let goals = inner.goals.entry(user_id).or_insert_with(|| FitnessGoals {
            id: Uuid::new_v4(),
            user_id,
            calories: 0.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
            water: 0.0,
            allergies: Vec::new(),
            created_at: now,
            updated_at: now,
        });
        goals.calories = input.calories;
        goals.protein = input.protein;
        goals.carbs = input.carbs;
        goals.fat = input.fat;
        goals.water = input.water;
        goals.allergies = input.allergies;
        goals.updated_at = now;
        Ok(goals.clone())
    }
}

#[async_trait]
impl RecipeRepo for MemoryStore {
    async fn list_all(&self) -> StoreResult<Vec<Recipe>> {
        let inner = self.inner.read().await;
        let mut all: Vec<&(u64, Recipe)> = inner.recipes.values().collect();
        all.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        Ok(all.into_iter().map(|(_, r)| inner.hydrate(r)).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Recipe>> {
        let inner = self.inner.read().await;
        Ok(inner.recipes.get(&id).map(|(_, r)| inner.hydrate(r)))
    }

    async fn create(&self, author_id: Uuid, recipe: NewRecipe) -> StoreResult<Recipe> {
        let mut inner = self.inner.write().await;
        let seq = inner.next_seq();
        let now = OffsetDateTime::now_utc();
        let recipe = Recipe {
            id: Uuid::new_v4(),
            name: recipe.name,
            ingredients: recipe.ingredients,
            steps: recipe.steps,
            image: recipe.image,
            author_id: Some(author_id),
            created_at: now,
            updated_at: now,
            saved_by: Vec::new(),
            viewed_by: Vec::new(),
        };
        inner.recipes.insert(recipe.id, (seq, recipe.clone()));
        Ok(recipe)
    }

    async fn update(&self, id: Uuid, patch: RecipePatch) -> StoreResult<Option<Recipe>> {
        let mut inner = self.inner.write().await;
        let Some((_, recipe)) = inner.recipes.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            recipe.name = name;
        }
        if let Some(ingredients) = patch.ingredients {
            recipe.ingredients = ingredients;
        }
        if let Some(steps) = patch.steps {
            recipe.steps = steps;
        }
        if let Some(image) = patch.image {
            recipe.image = image;
        }
        recipe.updated_at = OffsetDateTime::now_utc();
        let recipe = recipe.clone();
        Ok(Some(inner.hydrate(&recipe)))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.recipes.remove(&id).is_none() {
            return Ok(false);
        }
        inner.saves.retain(|(r, _), _| *r != id);
        inner.views.retain(|(r, _), _| *r != id);
        Ok(true)
    }

    async fn record_view(&self, recipe_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if inner.recipes.contains_key(&recipe_id) {
            let seq = inner.next_seq();
            inner.views.insert((recipe_id, user_id), seq);
        }
        Ok(())
    }

    async fn save_for_user(&self, recipe_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if inner.recipes.contains_key(&recipe_id) && !inner.saves.contains_key(&(recipe_id, user_id)) {
            let seq = inner.next_seq();
            inner.saves.insert((recipe_id, user_id), seq);
        }
        Ok(())
    }

    async fn saved_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Recipe>> {
        let inner = self.inner.read().await;
        Ok(inner.related(&inner.saves, user_id))
    }

    async fn viewed_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Recipe>> {
        let inner = self.inner.read().await;
        Ok(inner.related(&inner.views, user_id))
    }
}
