use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use serde::Serialize;

/// An assignment given to a class section. Read-only for the reporting
/// core; created by the assignment collaborator.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_section_id: i64,
    pub title: String,
    pub content: String,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::class_section::Entity",
        from = "Column::ClassSectionId",
        to = "super::class_section::Column::Id"
    )]
    ClassSection,
    #[sea_orm(has_many = "super::submission::Entity")]
    Submissions,
}

impl Related<super::class_section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassSection.def()
    }
}

impl Related<super::submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        class_section_id: i64,
        title: &str,
        content: &str,
        due_date: DateTime<Utc>,
    ) -> Result<Self, DbErr> {
        let assignment = ActiveModel {
            class_section_id: Set(class_section_id),
            title: Set(title.to_owned()),
            content: Set(content.to_owned()),
            due_date: Set(due_date),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        assignment.insert(db).await
    }

    pub async fn for_class(
        db: &DatabaseConnection,
        class_section_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::ClassSectionId.eq(class_section_id))
            .all(db)
            .await
    }
}
