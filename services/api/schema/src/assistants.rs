use sea_orm::entity::prelude::*;

/// Assistant extension of a user record.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "assistants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub user_id: i64,
    pub cabinet_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::cabinets::Entity",
        from = "Column::CabinetId",
        to = "super::cabinets::Column::Id"
    )]
    Cabinet,
    #[sea_orm(has_many = "super::appointments::Entity")]
    Appointments,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::cabinets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cabinet.def()
    }
}

impl Related<super::appointments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Appointments.def()
    }
}

// doctors via the assistant_doctor link table
impl Related<super::doctors::Entity> for Entity {
    fn to() -> RelationDef {
        super::assistant_doctor::Relation::Doctor.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::assistant_doctor::Relation::Assistant.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
