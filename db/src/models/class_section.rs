use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use serde::Serialize;

/// A teaching section of a course, e.g. "MOB101.N11".
///
/// `join_code` is the short shareable code students use to enroll; it is
/// unique across all sections and generated with collision retry by the
/// class-section service.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "class_sections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    /// Teacher of record for this section.
    pub teacher_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub room: Option<String>,
    pub join_code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::TeacherId",
        to = "super::user::Column::Id"
    )]
    Teacher,
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollments,
    #[sea_orm(has_many = "super::assignment::Entity")]
    Assignments,
    #[sea_orm(has_many = "super::attendance_session::Entity")]
    AttendanceSessions,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Inserts a section with an already-generated join code. Use
    /// `services::class_section` for the collision-checked path.
    pub async fn create(
        db: &DatabaseConnection,
        course_id: i64,
        teacher_id: i64,
        name: &str,
        description: Option<&str>,
        room: Option<&str>,
        join_code: &str,
    ) -> Result<Self, DbErr> {
        let section = ActiveModel {
            course_id: Set(course_id),
            teacher_id: Set(teacher_id),
            name: Set(name.to_owned()),
            description: Set(description.map(|s| s.to_owned())),
            room: Set(room.map(|s| s.to_owned())),
            join_code: Set(join_code.to_owned()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        section.insert(db).await
    }

    pub async fn get_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    pub async fn get_by_join_code(
        db: &DatabaseConnection,
        join_code: &str,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::JoinCode.eq(join_code))
            .one(db)
            .await
    }
}
