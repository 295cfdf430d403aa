use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Hot paths: scoped appointment lookups, conversation queries,
        // token resolution on every authenticated request.
        manager
            .create_index(
                Index::create()
                    .name("idx-appointments-patient_id")
                    .table(Appointments::Table)
                    .col(Appointments::PatientId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-appointments-doctor_id")
                    .table(Appointments::Table)
                    .col(Appointments::DoctorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-appointments-cabinet_id")
                    .table(Appointments::Table)
                    .col(Appointments::CabinetId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-messages-sender_id")
                    .table(Messages::Table)
                    .col(Messages::SenderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-messages-receiver_id")
                    .table(Messages::Table)
                    .col(Messages::ReceiverId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payments-status")
                    .table(Payments::Table)
                    .col(Payments::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-access_tokens-user_id")
                    .table(AccessTokens::Table)
                    .col(AccessTokens::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx-appointments-patient_id",
            "idx-appointments-doctor_id",
            "idx-appointments-cabinet_id",
            "idx-messages-sender_id",
            "idx-messages-receiver_id",
            "idx-payments-status",
            "idx-access_tokens-user_id",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(Iden)]
enum Appointments {
    Table,
    PatientId,
    DoctorId,
    CabinetId,
}

#[derive(Iden)]
enum Messages {
    Table,
    SenderId,
    ReceiverId,
}

#[derive(Iden)]
enum Payments {
    Table,
    Status,
}

#[derive(Iden)]
enum AccessTokens {
    Table,
    UserId,
}
