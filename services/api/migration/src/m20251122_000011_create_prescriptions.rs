use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Prescriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Prescriptions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Prescriptions::ConsultationId).big_integer())
                    .col(
                        ColumnDef::new(Prescriptions::PatientId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Prescriptions::DoctorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Prescriptions::PrescriptionDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Prescriptions::Status)
                            .string()
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(ColumnDef::new(Prescriptions::Medications).json_binary())
                    .col(ColumnDef::new(Prescriptions::GeneralInstructions).text())
                    .col(ColumnDef::new(Prescriptions::ValidUntil).date())
                    .col(
                        ColumnDef::new(Prescriptions::RefillsAllowed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Prescriptions::RefillsUsed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Prescriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Prescriptions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Prescriptions::Table, Prescriptions::ConsultationId)
                            .to(Consultations::Table, Consultations::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Prescriptions::Table, Prescriptions::PatientId)
                            .to(Patients::Table, Patients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Prescriptions::Table, Prescriptions::DoctorId)
                            .to(Doctors::Table, Doctors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Prescriptions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Prescriptions {
    Table,
    Id,
    ConsultationId,
    PatientId,
    DoctorId,
    PrescriptionDate,
    Status,
    Medications,
    GeneralInstructions,
    ValidUntil,
    RefillsAllowed,
    RefillsUsed,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Consultations {
    Table,
    Id,
}

#[derive(Iden)]
enum Patients {
    Table,
    Id,
}

#[derive(Iden)]
enum Doctors {
    Table,
    Id,
}
