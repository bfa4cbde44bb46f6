use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Recipe row together with the users who saved and viewed it.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    pub ingredients: String,
    pub steps: String,
    pub image: String,
    pub author_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub saved_by: Vec<Uuid>,
    pub viewed_by: Vec<Uuid>,
}

impl Recipe {
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == Some(user_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub name: String,
    pub ingredients: String,
    pub steps: String,
    pub image: String,
}

/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipePatch {
    pub name: Option<String>,
    pub ingredients: Option<String>,
    pub steps: Option<String>,
    pub image: Option<String>,
}

impl RecipePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.ingredients.is_none() && self.steps.is_none() && self.image.is_none()
    }
}
