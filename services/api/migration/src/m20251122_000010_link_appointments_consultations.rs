use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Completes the appointments ↔ consultations cycle started in
        // m20251122_000008.
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk-appointments-consultation_id")
                    .from(Appointments::Table, Appointments::ConsultationId)
                    .to(Consultations::Table, Consultations::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_foreign_key(
                ForeignKey::drop()
                    .name("fk-appointments-consultation_id")
                    .table(Appointments::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum Appointments {
    Table,
    ConsultationId,
}

#[derive(Iden)]
enum Consultations {
    Table,
    Id,
}
