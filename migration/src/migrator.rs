use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202608210001_create_users::Migration),
            Box::new(migrations::m202608210002_create_courses::Migration),
            Box::new(migrations::m202608210003_create_class_sections::Migration),
            Box::new(migrations::m202608210004_create_enrollments::Migration),
            Box::new(migrations::m202608210005_create_assignments::Migration),
            Box::new(migrations::m202608210006_create_submissions::Migration),
            Box::new(migrations::m202608250001_create_attendance::Migration),
        ]
    }
}
