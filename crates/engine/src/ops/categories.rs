use uuid::Uuid;

use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    Category, EngineError, ResultEngine, categories, util::normalize_name_key,
};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Add a new category.
    ///
    /// Duplicates are detected on the normalized name key, so "Groceries"
    /// and "  groceries " collide.
    pub async fn create_category(&self, user_id: &str, name: &str) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "category")?;
        let name_norm = normalize_name_key(&name);
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;

            let exists = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id.to_string()))
                .filter(categories::Column::NameNorm.eq(name_norm.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let id = Uuid::new_v4();
            let category = categories::ActiveModel {
                id: ActiveValue::Set(id.to_string()),
                user_id: ActiveValue::Set(user_id.to_string()),
                name: ActiveValue::Set(name),
                name_norm: ActiveValue::Set(name_norm),
                archived: ActiveValue::Set(false),
            };
            category.insert(&db_tx).await?;
            Ok(id)
        })
    }

    /// Lists a user's categories, ordered by name.
    pub async fn list_categories(
        &self,
        user_id: &str,
        include_archived: bool,
    ) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            let mut query = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(categories::Column::Name);
            if !include_archived {
                query = query.filter(categories::Column::Archived.eq(false));
            }
            let models = query.all(&db_tx).await?;

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                out.push(Category::try_from(model)?);
            }
            Ok(out)
        })
    }

    /// Archives/unarchives an existing category.
    ///
    /// Archival never touches balances; transactions and goals keep their
    /// category reference.
    pub async fn set_category_archived(
        &self,
        category_id: Uuid,
        archived: bool,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, user_id, category_id).await?;

            let category = categories::ActiveModel {
                id: ActiveValue::Set(category_id.to_string()),
                archived: ActiveValue::Set(archived),
                ..Default::default()
            };
            category.update(&db_tx).await?;
            Ok(())
        })
    }
}
