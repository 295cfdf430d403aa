use sea_orm::entity::prelude::*;

/// A scheduled visit. Status machine: SCHEDULED → CONFIRMED → IN_PROGRESS →
/// COMPLETED, with CANCELLED and NO_SHOW as exits; transitions are not
/// constrained at the store level.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "appointments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub date: chrono::DateTime<chrono::Utc>,
    pub status: String,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub cabinet_id: Option<i64>,
    pub consultation_id: Option<i64>,
    pub created_by_assistant_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::patients::Entity",
        from = "Column::PatientId",
        to = "super::patients::Column::Id"
    )]
    Patient,
    #[sea_orm(
        belongs_to = "super::doctors::Entity",
        from = "Column::DoctorId",
        to = "super::doctors::Column::Id"
    )]
    Doctor,
    #[sea_orm(
        belongs_to = "super::cabinets::Entity",
        from = "Column::CabinetId",
        to = "super::cabinets::Column::Id"
    )]
    Cabinet,
    #[sea_orm(
        belongs_to = "super::consultations::Entity",
        from = "Column::ConsultationId",
        to = "super::consultations::Column::Id"
    )]
    Consultation,
    #[sea_orm(
        belongs_to = "super::assistants::Entity",
        from = "Column::CreatedByAssistantId",
        to = "super::assistants::Column::Id"
    )]
    CreatedByAssistant,
    #[sea_orm(has_one = "super::payments::Entity")]
    Payment,
}

impl Related<super::patients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Patient.def()
    }
}

impl Related<super::doctors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Doctor.def()
    }
}

impl Related<super::cabinets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cabinet.def()
    }
}

impl Related<super::consultations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Consultation.def()
    }
}

impl Related<super::assistants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreatedByAssistant.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
