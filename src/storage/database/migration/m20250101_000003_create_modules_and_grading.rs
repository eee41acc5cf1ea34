use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Modules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Modules::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Modules::Title).string().not_null())
                    .col(
                        ColumnDef::new(Modules::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Modules::Description).text().null())
                    .col(
                        ColumnDef::new(Modules::Credits)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Modules::Semester)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Modules::Coefficient)
                            .float()
                            .not_null()
                            .default(1.0),
                    )
                    .col(
                        ColumnDef::new(Modules::IsOptional)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Modules::TeacherId).uuid().null())
                    .col(ColumnDef::new(Modules::PromotionId).integer().null())
                    .col(ColumnDef::new(Modules::FiliereId).integer().null())
                    .col(
                        ColumnDef::new(Modules::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Modules::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_modules_teacher_id")
                            .from(Modules::Table, Modules::TeacherId)
                            .to(Teachers::Table, Teachers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_modules_promotion_id")
                            .from(Modules::Table, Modules::PromotionId)
                            .to(Promotions::Table, Promotions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_modules_teacher_id")
                    .table(Modules::Table)
                    .col(Modules::TeacherId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Notes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Notes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Notes::StudentId).uuid().not_null())
                    .col(ColumnDef::new(Notes::ModuleId).uuid().not_null())
                    .col(
                        ColumnDef::new(Notes::Session)
                            .string()
                            .not_null()
                            .default("Normale"),
                    )
                    .col(
                        ColumnDef::new(Notes::Semester)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Notes::Ce).float().null())
                    .col(ColumnDef::new(Notes::Fe).float().null())
                    .col(ColumnDef::new(Notes::Score).float().null())
                    .col(ColumnDef::new(Notes::Appreciation).text().null())
                    .col(
                        ColumnDef::new(Notes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Notes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notes_student_id")
                            .from(Notes::Table, Notes::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notes_module_id")
                            .from(Notes::Table, Notes::ModuleId)
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
                    .name("idx_notes_student_id")
                    .table(Notes::Table)
                    .col(Notes::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notes_module_id")
                    .table(Notes::Table)
                    .col(Notes::ModuleId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Bulletins::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bulletins::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bulletins::Term).string().not_null())
                    .col(ColumnDef::new(Bulletins::Average).float().null())
                    .col(ColumnDef::new(Bulletins::StudentId).uuid().null())
                    .col(
                        ColumnDef::new(Bulletins::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Bulletins::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bulletins_student_id")
                            .from(Bulletins::Table, Bulletins::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bulletins::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Notes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Modules::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Modules {
    Table,
    Id,
    Title,
    Code,
    Description,
    Credits,
    Semester,
    Coefficient,
    IsOptional,
    TeacherId,
    PromotionId,
    FiliereId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Notes {
    Table,
    Id,
    StudentId,
    ModuleId,
    Session,
    Semester,
    Ce,
    Fe,
    Score,
    Appreciation,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Bulletins {
    Table,
    Id,
    Term,
    Average,
    StudentId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Teachers {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Promotions {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
}
