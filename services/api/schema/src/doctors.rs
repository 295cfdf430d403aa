use sea_orm::entity::prelude::*;

/// Doctor extension of a user record.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "doctors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub user_id: i64,
    pub speciality: Option<String>,
    pub career_start: Option<chrono::NaiveDate>,
    pub cabinet_id: Option<i64>,
    pub consultation_price: f64,
    pub consultation_duration: i32,
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
    #[sea_orm(has_many = "super::consultations::Entity")]
    Consultations,
    #[sea_orm(has_many = "super::prescriptions::Entity")]
    Prescriptions,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
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

impl Related<super::consultations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Consultations.def()
    }
}

impl Related<super::prescriptions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Prescriptions.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

// assistants via the assistant_doctor link table
impl Related<super::assistants::Entity> for Entity {
    fn to() -> RelationDef {
        super::assistant_doctor::Relation::Assistant.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::assistant_doctor::Relation::Doctor.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
