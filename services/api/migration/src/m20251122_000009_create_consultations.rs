use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Consultations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Consultations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Consultations::DoctorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Consultations::PatientId)
                            .big_integer()
                            .not_null(),
                    )
                    // Unique: at most one consultation per appointment.
                    // Nullable unique still admits many NULLs on Postgres.
                    .col(
                        ColumnDef::new(Consultations::AppointmentId)
                            .big_integer()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Consultations::Notes).text())
                    .col(ColumnDef::new(Consultations::Prescriptions).json_binary())
                    .col(ColumnDef::new(Consultations::Attachments).json_binary())
                    .col(
                        ColumnDef::new(Consultations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Consultations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Consultations::Table, Consultations::DoctorId)
                            .to(Doctors::Table, Doctors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Consultations::Table, Consultations::PatientId)
                            .to(Patients::Table, Patients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Consultations::Table, Consultations::AppointmentId)
                            .to(Appointments::Table, Appointments::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Consultations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Consultations {
    Table,
    Id,
    DoctorId,
    PatientId,
    AppointmentId,
    Notes,
    Prescriptions,
    Attachments,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Doctors {
    Table,
    Id,
}

#[derive(Iden)]
enum Patients {
    Table,
    Id,
}

#[derive(Iden)]
enum Appointments {
    Table,
    Id,
}
