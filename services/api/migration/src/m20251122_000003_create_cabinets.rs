use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cabinets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cabinets::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cabinets::Name).string().not_null())
                    .col(ColumnDef::new(Cabinets::Phone).string())
                    .col(ColumnDef::new(Cabinets::AdminId).big_integer())
                    .col(ColumnDef::new(Cabinets::Image).string())
                    .col(
                        ColumnDef::new(Cabinets::AccessHandicap)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Cabinets::HasParking)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Cabinets::HasWifi)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Cabinets::AcceptsUrgent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Cabinets::AcceptsInsurance)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Cabinets::OpeningHours).json_binary())
                    .col(ColumnDef::new(Cabinets::LocationLat).double())
                    .col(ColumnDef::new(Cabinets::LocationLng).double())
                    .col(
                        ColumnDef::new(Cabinets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Cabinets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Cabinets::Table, Cabinets::AdminId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Cabinets::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Cabinets {
    Table,
    Id,
    Name,
    Phone,
    AdminId,
    Image,
    AccessHandicap,
    HasParking,
    HasWifi,
    AcceptsUrgent,
    AcceptsInsurance,
    OpeningHours,
    LocationLat,
    LocationLng,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
