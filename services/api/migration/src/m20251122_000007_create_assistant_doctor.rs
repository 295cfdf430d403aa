use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AssistantDoctor::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AssistantDoctor::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AssistantDoctor::AssistantId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssistantDoctor::DoctorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssistantDoctor::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(AssistantDoctor::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AssistantDoctor::Table, AssistantDoctor::AssistantId)
                            .to(Assistants::Table, Assistants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AssistantDoctor::Table, AssistantDoctor::DoctorId)
                            .to(Doctors::Table, Doctors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Duplicate attaches must be impossible at the store level.
        manager
            .create_index(
                Index::create()
                    .name("idx-assistant-doctor-pair")
                    .table(AssistantDoctor::Table)
                    .col(AssistantDoctor::AssistantId)
                    .col(AssistantDoctor::DoctorId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AssistantDoctor::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AssistantDoctor {
    Table,
    Id,
    AssistantId,
    DoctorId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Assistants {
    Table,
    Id,
}

#[derive(Iden)]
enum Doctors {
    Table,
    Id,
}
