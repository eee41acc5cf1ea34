use sea_orm_migration::prelude::*;

mod m20250101_000001_create_roles_and_users;
mod m20250101_000002_create_academic_structure;
mod m20250101_000003_create_modules_and_grading;
mod m20250101_000004_create_attendance_and_resources;

/// Database migrator for SeaORM
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_roles_and_users::Migration),
            Box::new(m20250101_000002_create_academic_structure::Migration),
            Box::new(m20250101_000003_create_modules_and_grading::Migration),
            Box::new(m20250101_000004_create_attendance_and_resources::Migration),
        ]
    }
}
