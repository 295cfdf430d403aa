use sea_orm::entity::prelude::*;

/// Direct message between two users, optionally scoped to a cabinet.
///
/// Two foreign keys point at `users`, so there is no canonical
/// `Related<users::Entity>`; sender/receiver loading is done explicitly in
/// the repository.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub cabinet_id: Option<i64>,
    pub date: chrono::DateTime<chrono::Utc>,
    pub content: Option<Json>,
    pub status: String,
    pub attachments: Option<Json>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::SenderId",
        to = "super::users::Column::Id"
    )]
    Sender,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ReceiverId",
        to = "super::users::Column::Id"
    )]
    Receiver,
    #[sea_orm(
        belongs_to = "super::cabinets::Entity",
        from = "Column::CabinetId",
        to = "super::cabinets::Column::Id"
    )]
    Cabinet,
}

impl Related<super::cabinets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cabinet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
