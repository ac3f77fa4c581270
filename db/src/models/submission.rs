use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use serde::Serialize;

/// A student's submission for an assignment. Resubmission is allowed, so
/// multiple rows per (assignment, user) can exist; `score` stays null
/// until the submission is graded (0-10 scale).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assignment_id: i64,
    pub user_id: i64,
    pub answer_text: Option<String>,
    pub score: Option<f64>,
    pub feedback: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignment::Entity",
        from = "Column::AssignmentId",
        to = "super::assignment::Column::Id"
    )]
    Assignment,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// `submitted_at` is explicit so graders and seeders can backdate
    /// resubmissions deterministically.
    pub async fn create(
        db: &DatabaseConnection,
        assignment_id: i64,
        user_id: i64,
        answer_text: Option<&str>,
        score: Option<f64>,
        submitted_at: DateTime<Utc>,
    ) -> Result<Self, DbErr> {
        let submission = ActiveModel {
            assignment_id: Set(assignment_id),
            user_id: Set(user_id),
            answer_text: Set(answer_text.map(|s| s.to_owned())),
            score: Set(score),
            feedback: Set(None),
            submitted_at: Set(submitted_at),
            ..Default::default()
        };
        submission.insert(db).await
    }

    pub async fn for_assignments(
        db: &DatabaseConnection,
        assignment_ids: &[i64],
    ) -> Result<Vec<Self>, DbErr> {
        if assignment_ids.is_empty() {
            return Ok(Vec::new());
        }
        Entity::find()
            .filter(Column::AssignmentId.is_in(assignment_ids.iter().copied()))
            .all(db)
            .await
    }
}
