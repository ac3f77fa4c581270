use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use serde::Serialize;

/// Membership fact: a user is enrolled in a class section.
///
/// Unique on (user_id, class_section_id).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub class_section_id: i64,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::class_section::Entity",
        from = "Column::ClassSectionId",
        to = "super::class_section::Column::Id"
    )]
    ClassSection,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::class_section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassSection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn enroll(
        db: &DatabaseConnection,
        user_id: i64,
        class_section_id: i64,
    ) -> Result<Self, DbErr> {
        let enrollment = ActiveModel {
            user_id: Set(user_id),
            class_section_id: Set(class_section_id),
            enrolled_at: Set(Utc::now()),
            ..Default::default()
        };
        enrollment.insert(db).await
    }

    pub async fn is_enrolled(
        db: &DatabaseConnection,
        user_id: i64,
        class_section_id: i64,
    ) -> Result<bool, DbErr> {
        let count = Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::ClassSectionId.eq(class_section_id))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    /// Roster of a class section, in enrollment order.
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
