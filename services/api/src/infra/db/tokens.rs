use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection, DbErr, EntityTrait};

use medworld_api_schema::{access_tokens, users};

use crate::domain::repository::TokenRepository;
use crate::domain::types::{AccessToken, User};
use crate::error::ApiError;

use super::user_from_model;

#[derive(Clone)]
pub struct DbTokenRepository {
    pub db: DatabaseConnection,
}

impl TokenRepository for DbTokenRepository {
    async fn create(&self, user_id: i64, name: &str, digest: &str) -> Result<i64, ApiError> {
        let now = Utc::now();
        let model = access_tokens::ActiveModel {
            user_id: Set(user_id),
            name: Set(name.to_owned()),
            token: Set(digest.to_owned()),
            last_used_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create access token")?;
        Ok(model.id)
    }

    async fn find_with_user(&self, id: i64) -> Result<Option<(AccessToken, User)>, ApiError> {
        let row = access_tokens::Entity::find_by_id(id)
            .find_also_related(users::Entity)
            .one(&self.db)
            .await
            .context("find access token")?;
        match row {
            Some((token, Some(user))) => Ok(Some((
                AccessToken {
                    id: token.id,
                    user_id: token.user_id,
                    token_digest: token.token,
                },
                user_from_model(user)?,
            ))),
            _ => Ok(None),
        }
    }

    async fn touch_last_used(&self, id: i64) -> Result<(), ApiError> {
        let now = Utc::now();
        let am = access_tokens::ActiveModel {
            id: Set(id),
            last_used_at: Set(Some(now)),
            updated_at: Set(now),
            ..Default::default()
        };
        // The token can be revoked by a concurrent logout between lookup and
        // touch; a vanished row is not an error here.
        match am.update(&self.db).await {
            Ok(_) | Err(DbErr::RecordNotUpdated) => Ok(()),
            Err(err) => Err(ApiError::Internal(
                anyhow::Error::new(err).context("touch access token"),
            )),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, ApiError> {
        let res = access_tokens::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete access token")?;
        Ok(res.rows_affected > 0)
    }
}
