use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Seances::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Seances::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Seances::ModuleId).uuid().not_null())
                    .col(ColumnDef::new(Seances::TeacherId).uuid().null())
                    .col(ColumnDef::new(Seances::Date).date().not_null())
                    .col(ColumnDef::new(Seances::Titre).string().null())
                    .col(
                        ColumnDef::new(Seances::HeureDebut)
                            .string()
                            .not_null()
                            .default("08:00:00"),
                    )
                    .col(
                        ColumnDef::new(Seances::HeureFin)
                            .string()
                            .not_null()
                            .default("10:00:00"),
                    )
                    .col(
                        ColumnDef::new(Seances::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Seances::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_seances_module_id")
                            .from(Seances::Table, Seances::ModuleId)
                            .to(Modules::Table, Modules::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_seances_module_id")
                    .table(Seances::Table)
                    .col(Seances::ModuleId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Presences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Presences::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Presences::StudentId).uuid().not_null())
                    .col(ColumnDef::new(Presences::ModuleId).uuid().not_null())
                    .col(ColumnDef::new(Presences::TeacherId).uuid().null())
                    .col(ColumnDef::new(Presences::SeanceId).uuid().not_null())
                    .col(ColumnDef::new(Presences::Statut).string().not_null())
                    .col(ColumnDef::new(Presences::Motif).text().null())
                    .col(
                        ColumnDef::new(Presences::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Presences::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_presences_student_id")
                            .from(Presences::Table, Presences::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_presences_seance_id")
                            .from(Presences::Table, Presences::SeanceId)
                            .to(Seances::Table, Seances::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_presences_seance_id")
                    .table(Presences::Table)
                    .col(Presences::SeanceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_presences_module_student")
                    .table(Presences::Table)
                    .col(Presences::ModuleId)
                    .col(Presences::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Schedules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Schedules::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Schedules::Title).string().not_null())
                    .col(ColumnDef::new(Schedules::ModuleId).uuid().null())
                    .col(ColumnDef::new(Schedules::TeacherId).uuid().null())
                    .col(ColumnDef::new(Schedules::PromotionId).integer().null())
                    .col(ColumnDef::new(Schedules::Room).string().null())
                    .col(ColumnDef::new(Schedules::Kind).string().null())
                    .col(
                        ColumnDef::new(Schedules::Start)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Schedules::End)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Schedules::Color).string().null())
                    .col(ColumnDef::new(Schedules::Notes).text().null())
                    .col(
                        ColumnDef::new(Schedules::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Schedules::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Resources::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Resources::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Resources::Title).string().not_null())
                    .col(ColumnDef::new(Resources::Kind).string().not_null())
                    .col(ColumnDef::new(Resources::Url).string().not_null())
                    .col(ColumnDef::new(Resources::Description).text().null())
                    .col(ColumnDef::new(Resources::ModuleId).uuid().null())
                    .col(ColumnDef::new(Resources::UploadedBy).uuid().null())
                    .col(
                        ColumnDef::new(Resources::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Resources::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_resources_module_id")
                            .from(Resources::Table, Resources::ModuleId)
                            .to(Modules::Table, Modules::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuditLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuditLogs::UserId).uuid().null())
                    .col(ColumnDef::new(AuditLogs::Action).string().not_null())
                    .col(ColumnDef::new(AuditLogs::TargetType).string().null())
                    .col(ColumnDef::new(AuditLogs::TargetId).string().null())
                    .col(ColumnDef::new(AuditLogs::Ip).string().null())
                    .col(
                        ColumnDef::new(AuditLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Resources::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Schedules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Presences::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Seances::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Seances {
    Table,
    Id,
    ModuleId,
    TeacherId,
    Date,
    Titre,
    HeureDebut,
    HeureFin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Presences {
    Table,
    Id,
    StudentId,
    ModuleId,
    TeacherId,
    SeanceId,
    Statut,
    Motif,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Schedules {
    Table,
    Id,
    Title,
    ModuleId,
    TeacherId,
    PromotionId,
    Room,
    Kind,
    Start,
    End,
    Color,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Resources {
    Table,
    Id,
    Title,
    Kind,
    Url,
    Description,
    ModuleId,
    UploadedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AuditLogs {
    Table,
    Id,
    UserId,
    Action,
    TargetType,
    TargetId,
    Ip,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Modules {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
}
