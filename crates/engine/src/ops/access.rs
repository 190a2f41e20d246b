//! Ownership checks.
//!
//! Every entity belongs to exactly one user and is never shared. Each
//! operation resolves the entities it touches through these lookups, which
//! filter by the acting `user_id`: an entity that exists but belongs to
//! someone else is indistinguishable from a missing one (`KeyNotFound`).

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, accounts, categories, contributions, goals, transactions,
    transfers, users,
};

use super::Engine;

/// Generates a `require_*` lookup scoped to the acting user for an owned
/// entity.
macro_rules! impl_require_owned {
    ($require_fn:ident, $entity:path, $model:path, $user_col:expr, $err_msg:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            user_id: &str,
            target_id: Uuid,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(target_id.to_string())
                .filter($user_col.eq(user_id.to_string()))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_owned!(
        require_account,
        accounts::Entity,
        accounts::Model,
        accounts::Column::UserId,
        "account not exists"
    );

    impl_require_owned!(
        require_transaction,
        transactions::Entity,
        transactions::Model,
        transactions::Column::UserId,
        "transaction not exists"
    );

    impl_require_owned!(
        require_transfer,
        transfers::Entity,
        transfers::Model,
        transfers::Column::UserId,
        "transfer not exists"
    );

    impl_require_owned!(
        require_goal,
        goals::Entity,
        goals::Model,
        goals::Column::UserId,
        "goal not exists"
    );

    impl_require_owned!(
        require_contribution,
        contributions::Entity,
        contributions::Model,
        contributions::Column::UserId,
        "contribution not exists"
    );

    impl_require_owned!(
        require_category,
        categories::Entity,
        categories::Model,
        categories::Column::UserId,
        "category not exists"
    );

    pub(super) async fn require_user_exists(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<()> {
        let exists = users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .is_some();
        if !exists {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(())
    }

    /// Resolve an optional category reference, ensuring ownership.
    pub(super) async fn require_category_opt(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        category_id: Option<Uuid>,
    ) -> ResultEngine<()> {
        if let Some(id) = category_id {
            self.require_category(db, user_id, id).await?;
        }
        Ok(())
    }
}
