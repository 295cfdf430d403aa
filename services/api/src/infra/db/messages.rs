use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    LoaderTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use medworld_api_schema::{cabinets, messages};
use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::MessageRepository;
use crate::domain::types::{MessageChanges, MessageView, NewMessage};
use crate::error::ApiError;

use super::{cabinet_from_model, fetch_page, message_from_model, users_by_ids};

#[derive(Clone)]
pub struct DbMessageRepository {
    pub db: DatabaseConnection,
}

/// Hydrates message rows with sender, receiver and cabinet. Sender and
/// receiver both point at users, so they are fetched in one batched query
/// instead of a loader pass per side.
pub(crate) async fn message_views(
    db: &DatabaseConnection,
    models: Vec<messages::Model>,
) -> Result<Vec<MessageView>, ApiError> {
    let cabinet_rows = models
        .load_one(cabinets::Entity, db)
        .await
        .context("load message cabinets")?;

    let mut ids = Vec::with_capacity(models.len() * 2);
    for model in &models {
        ids.push(model.sender_id);
        ids.push(model.receiver_id);
    }
    let user_map = users_by_ids(db, ids).await?;

    let mut views = Vec::with_capacity(models.len());
    for (model, cabinet) in models.into_iter().zip(cabinet_rows) {
        let mut view = MessageView::from(message_from_model(model)?);
        let sender = user_map
            .get(&view.message.sender_id)
            .cloned()
            .context("message sender missing")?;
        let receiver = user_map
            .get(&view.message.receiver_id)
            .cloned()
            .context("message receiver missing")?;
        view.sender = Some(sender);
        view.receiver = Some(receiver);
        view.cabinet = Some(cabinet.map(cabinet_from_model));
        views.push(view);
    }
    Ok(views)
}

impl MessageRepository for DbMessageRepository {
    async fn list(&self, page: PageRequest) -> Result<Page<MessageView>, ApiError> {
        let query = messages::Entity::find().order_by_asc(messages::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "messages").await?;
        let views = message_views(&self.db, models).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<MessageView>, ApiError> {
        let model = messages::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find message by id")?;
        match model {
            Some(model) => Ok(message_views(&self.db, vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: i64) -> Result<bool, ApiError> {
        let count = messages::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .context("count message by id")?;
        Ok(count > 0)
    }

    async fn create(&self, new: &NewMessage) -> Result<i64, ApiError> {
        let now = Utc::now();
        let model = messages::ActiveModel {
            sender_id: Set(new.sender_id),
            receiver_id: Set(new.receiver_id),
            cabinet_id: Set(Some(new.cabinet_id)),
            date: Set(new.date),
            content: Set(Some(new.content.clone())),
            status: Set(new.status.as_str().to_owned()),
            attachments: Set(new.attachments.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create message")?;
        Ok(model.id)
    }

    async fn update(&self, id: i64, changes: &MessageChanges) -> Result<(), ApiError> {
        let mut am = messages::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(content) = &changes.content {
            am.content = Set(Some(content.clone()));
        }
        if let Some(status) = changes.status {
            am.status = Set(status.as_str().to_owned());
        }
        if let Some(attachments) = &changes.attachments {
            am.attachments = Set(attachments.clone());
        }
        am.updated_at = Set(Utc::now());
        am.update(&self.db).await.context("update message")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, ApiError> {
        let res = messages::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete message")?;
        Ok(res.rows_affected > 0)
    }

    async fn conversation(
        &self,
        user_a: i64,
        user_b: i64,
        page: PageRequest,
    ) -> Result<Page<MessageView>, ApiError> {
        let query = messages::Entity::find()
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(messages::Column::SenderId.eq(user_a))
                            .add(messages::Column::ReceiverId.eq(user_b)),
                    )
                    .add(
                        Condition::all()
                            .add(messages::Column::SenderId.eq(user_b))
                            .add(messages::Column::ReceiverId.eq(user_a)),
                    ),
            )
            .order_by_asc(messages::Column::CreatedAt);
        let (models, total) = fetch_page(&self.db, query, page, "conversation messages").await?;
        let views = message_views(&self.db, models).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn list_by_user(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<Page<MessageView>, ApiError> {
        let query = messages::Entity::find()
            .filter(
                Condition::any()
                    .add(messages::Column::SenderId.eq(user_id))
                    .add(messages::Column::ReceiverId.eq(user_id)),
            )
            .order_by_desc(messages::Column::CreatedAt);
        let (models, total) = fetch_page(&self.db, query, page, "user messages").await?;
        let views = message_views(&self.db, models).await?;
        Ok(Page::from_parts(views, total, page))
    }
}
