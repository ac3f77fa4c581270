//! Class progress aggregation: completion rates, average scores, and
//! the grade-distribution histogram.

use std::collections::HashMap;

use db::models::{assignment, class_section, enrollment, submission, user};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;

use crate::error::ServiceError;

/// Fixed histogram buckets over per-student average scores. The last
/// upper bound carries an epsilon so a perfect 10 lands in it.
const GRADE_BUCKETS: [(&str, f64, f64); 4] = [
    ("0-<4", 0.0, 4.0),
    ("4-<6.5", 4.0, 6.5),
    ("6.5-<8.5", 6.5, 8.5),
    ("8.5-10", 8.5, 10.00001),
];

#[derive(Debug, Clone, Default, Serialize)]
pub struct GradeBucket {
    pub range: String,
    pub count: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct StudentProgress {
    pub student_id: i64,
    pub username: String,
    pub full_name: String,
    pub total_assignments: usize,
    /// Distinct assignments with at least one submission.
    pub submitted_assignments: usize,
    /// Percentage 0-100, rounded to 2 decimals.
    pub completion_rate: f64,
    /// Mean of effective scores, 0-10; None when nothing is scored yet.
    pub average_score: Option<f64>,
}

#[derive(Debug, Default, Serialize)]
pub struct ClassProgressReport {
    pub class_id: i64,
    pub class_name: String,
    pub total_students: usize,
    pub total_assignments: usize,
    /// Submitted (student, assignment) pairs over N*M, as a percentage.
    pub completion_rate_overall: f64,
    pub class_average_score: Option<f64>,
    pub grade_distribution: Vec<GradeBucket>,
    pub students: Vec<StudentProgress>,
}

pub struct ProgressService;

impl ProgressService {
    /// Builds the full progress report for a class section.
    ///
    /// The effective score of a (student, assignment) pair is the score
    /// of the most recently submitted scored submission; unscored
    /// resubmissions never shadow an earlier scored one.
    pub async fn class_progress(
        db: &DatabaseConnection,
        class_section_id: i64,
    ) -> Result<ClassProgressReport, ServiceError> {
        let class = class_section::Model::get_by_id(db, class_section_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Class".into()))?;

        let enrollments = enrollment::Model::for_class(db, class_section_id).await?;
        let assignments = assignment::Model::for_class(db, class_section_id).await?;

        let total_students = enrollments.len();
        let total_assignments = assignments.len();

        let users = load_roster(db, &enrollments).await?;

        // Nothing to aggregate yet; keep the report shape well formed.
        if total_students == 0 || total_assignments == 0 {
            let students = enrollments
                .iter()
                .map(|e| {
                    let (username, full_name) = display_names(&users, e.user_id);
                    StudentProgress {
                        student_id: e.user_id,
                        username,
                        full_name,
                        total_assignments,
                        submitted_assignments: 0,
                        completion_rate: 0.0,
                        average_score: None,
                    }
                })
                .collect();
            return Ok(ClassProgressReport {
                class_id: class.id,
                class_name: class.name,
                total_students,
                total_assignments,
                completion_rate_overall: 0.0,
                class_average_score: None,
                grade_distribution: empty_distribution(),
                students,
            });
        }

        let assignment_ids: Vec<i64> = assignments.iter().map(|a| a.id).collect();
        let submissions = submission::Model::for_assignments(db, &assignment_ids).await?;

        let mut by_student: HashMap<i64, Vec<&submission::Model>> = HashMap::new();
        for sub in &submissions {
            by_student.entry(sub.user_id).or_default().push(sub);
        }

        let mut students = Vec::with_capacity(total_students);
        let mut total_submitted_pairs = 0usize;
        let mut student_averages = Vec::new();

        for enrollment in &enrollments {
            let subs = by_student
                .get(&enrollment.user_id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);

            let mut by_assignment: HashMap<i64, Vec<&submission::Model>> = HashMap::new();
            for sub in subs {
                by_assignment.entry(sub.assignment_id).or_default().push(sub);
            }

            let submitted_assignments = by_assignment.len();
            total_submitted_pairs += submitted_assignments;

            let completion_rate =
                round2(submitted_assignments as f64 / total_assignments as f64 * 100.0);

            let effective_scores: Vec<f64> = by_assignment
                .values()
                .filter_map(|subs| effective_score(subs))
                .collect();

            let average_score = if effective_scores.is_empty() {
                None
            } else {
                let avg = effective_scores.iter().sum::<f64>() / effective_scores.len() as f64;
                student_averages.push(avg);
                Some(round2(avg))
            };

            let (username, full_name) = display_names(&users, enrollment.user_id);
            students.push(StudentProgress {
                student_id: enrollment.user_id,
                username,
                full_name,
                total_assignments,
                submitted_assignments,
                completion_rate,
                average_score,
            });
        }

        let completion_rate_overall = round2(
            total_submitted_pairs as f64 / (total_students * total_assignments) as f64 * 100.0,
        );

        let class_average_score = if student_averages.is_empty() {
            None
        } else {
            Some(round2(
                student_averages.iter().sum::<f64>() / student_averages.len() as f64,
            ))
        };

        let grade_distribution = GRADE_BUCKETS
            .iter()
            .map(|(range, min, max)| GradeBucket {
                range: (*range).to_owned(),
                count: students
                    .iter()
                    .filter_map(|s| s.average_score)
                    .filter(|avg| *avg >= *min && *avg < *max)
                    .count(),
            })
            .collect();

        Ok(ClassProgressReport {
            class_id: class.id,
            class_name: class.name,
            total_students,
            total_assignments,
            completion_rate_overall,
            class_average_score,
            grade_distribution,
            students,
        })
    }
}

/// Most recent submission with a non-null score wins; ties on the
/// timestamp fall to the higher id (the later insert).
fn effective_score(subs: &[&submission::Model]) -> Option<f64> {
    let mut ordered: Vec<&&submission::Model> = subs.iter().collect();
    ordered.sort_by(|a, b| {
        b.submitted_at
            .cmp(&a.submitted_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    ordered.iter().find_map(|s| s.score)
}

fn empty_distribution() -> Vec<GradeBucket> {
    GRADE_BUCKETS
        .iter()
        .map(|(range, _, _)| GradeBucket {
            range: (*range).to_owned(),
            count: 0,
        })
        .collect()
}

async fn load_roster(
    db: &DatabaseConnection,
    enrollments: &[enrollment::Model],
) -> Result<HashMap<i64, user::Model>, ServiceError> {
    if enrollments.is_empty() {
        return Ok(HashMap::new());
    }
    let ids: Vec<i64> = enrollments.iter().map(|e| e.user_id).collect();
    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

fn display_names(users: &HashMap<i64, user::Model>, user_id: i64) -> (String, String) {
    users
        .get(&user_id)
        .map(|u| (u.username.clone(), u.full_name.clone()))
        .unwrap_or_default()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use db::models::user::{Model as UserModel, Role};
    use db::models::{assignment, class_section, course, enrollment, submission};
    use db::test_utils::setup_test_db;

    struct Ctx {
        db: DatabaseConnection,
        section: class_section::Model,
    }

    async fn setup() -> Ctx {
        let db = setup_test_db().await;
        let teacher = UserModel::create(
            &db,
            "lect1",
            "lect1@test.com",
            "hash",
            "Lecturer One",
            Role::Teacher,
        )
        .await
        .unwrap();
        let course = course::Model::create(&db, "MOB101", "Mobile Programming", None)
            .await
            .unwrap();
        let section = class_section::Model::create(
            &db,
            course.id,
            teacher.id,
            "MOB101.N11",
            None,
            None,
            "JCODE2",
        )
        .await
        .unwrap();
        Ctx { db, section }
    }

    async fn add_student(ctx: &Ctx, username: &str) -> UserModel {
        let user = UserModel::create(
            &ctx.db,
            username,
            &format!("{username}@test.com"),
            "hash",
            username,
            Role::Student,
        )
        .await
        .unwrap();
        enrollment::Model::enroll(&ctx.db, user.id, ctx.section.id)
            .await
            .unwrap();
        user
    }

    async fn add_assignment(ctx: &Ctx, title: &str) -> assignment::Model {
        assignment::Model::create(
            &ctx.db,
            ctx.section.id,
            title,
            "content",
            Utc::now() + Duration::days(7),
        )
        .await
        .unwrap()
    }

    fn bucket_count<'a>(report: &'a ClassProgressReport, range: &str) -> usize {
        report
            .grade_distribution
            .iter()
            .find(|b| b.range == range)
            .map(|b| b.count)
            .unwrap()
    }

    #[tokio::test]
    async fn two_students_two_assignments_worked_example() {
        let ctx = setup().await;
        let a = add_student(&ctx, "alice").await;
        let _b = add_student(&ctx, "bob").await;
        let a1 = add_assignment(&ctx, "A1").await;
        let a2 = add_assignment(&ctx, "A2").await;

        let now = Utc::now();
        submission::Model::create(&ctx.db, a1.id, a.id, Some("x"), Some(8.0), now)
            .await
            .unwrap();
        submission::Model::create(&ctx.db, a2.id, a.id, Some("y"), Some(6.0), now)
            .await
            .unwrap();

        let report = ProgressService::class_progress(&ctx.db, ctx.section.id)
            .await
            .unwrap();

        assert_eq!(report.total_students, 2);
        assert_eq!(report.total_assignments, 2);
        assert_eq!(report.completion_rate_overall, 50.0);
        assert_eq!(report.class_average_score, Some(7.0));

        let alice = report
            .students
            .iter()
            .find(|s| s.username == "alice")
            .unwrap();
        assert_eq!(alice.submitted_assignments, 2);
        assert_eq!(alice.completion_rate, 100.0);
        assert_eq!(alice.average_score, Some(7.0));

        let bob = report
            .students
            .iter()
            .find(|s| s.username == "bob")
            .unwrap();
        assert_eq!(bob.submitted_assignments, 0);
        assert_eq!(bob.completion_rate, 0.0);
        assert_eq!(bob.average_score, None);

        assert_eq!(bucket_count(&report, "6.5-<8.5"), 1);
        assert_eq!(bucket_count(&report, "0-<4"), 0);
        assert_eq!(bucket_count(&report, "4-<6.5"), 0);
        assert_eq!(bucket_count(&report, "8.5-10"), 0);
    }

    #[tokio::test]
    async fn empty_class_returns_well_formed_report() {
        let ctx = setup().await;
        add_student(&ctx, "alice").await;

        // Students but no assignments.
        let report = ProgressService::class_progress(&ctx.db, ctx.section.id)
            .await
            .unwrap();
        assert_eq!(report.total_assignments, 0);
        assert_eq!(report.completion_rate_overall, 0.0);
        assert_eq!(report.class_average_score, None);
        assert_eq!(report.grade_distribution.len(), 4);
        assert!(report.grade_distribution.iter().all(|b| b.count == 0));
        assert_eq!(report.students.len(), 1);
        assert_eq!(report.students[0].average_score, None);
    }

    #[tokio::test]
    async fn missing_class_is_not_found() {
        let ctx = setup().await;
        let err = ProgressService::class_progress(&ctx.db, 9999)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn resubmission_uses_most_recent_scored_submission() {
        let ctx = setup().await;
        let a = add_student(&ctx, "alice").await;
        let a1 = add_assignment(&ctx, "A1").await;

        let t0 = Utc::now() - Duration::hours(2);
        // First scored, then an unscored resubmission; the scored one
        // still counts because unscored rows are skipped.
        submission::Model::create(&ctx.db, a1.id, a.id, None, Some(4.0), t0)
            .await
            .unwrap();
        submission::Model::create(&ctx.db, a1.id, a.id, None, None, t0 + Duration::hours(1))
            .await
            .unwrap();

        let report = ProgressService::class_progress(&ctx.db, ctx.section.id)
            .await
            .unwrap();
        let alice = &report.students[0];
        assert_eq!(alice.average_score, Some(4.0));
        assert_eq!(alice.submitted_assignments, 1);

        // A later scored resubmission supersedes the earlier score.
        submission::Model::create(&ctx.db, a1.id, a.id, None, Some(9.0), t0 + Duration::hours(2))
            .await
            .unwrap();
        let report = ProgressService::class_progress(&ctx.db, ctx.section.id)
            .await
            .unwrap();
        assert_eq!(report.students[0].average_score, Some(9.0));
    }

    #[tokio::test]
    async fn perfect_score_lands_in_top_bucket() {
        let ctx = setup().await;
        let a = add_student(&ctx, "alice").await;
        let a1 = add_assignment(&ctx, "A1").await;
        submission::Model::create(&ctx.db, a1.id, a.id, None, Some(10.0), Utc::now())
            .await
            .unwrap();

        let report = ProgressService::class_progress(&ctx.db, ctx.section.id)
            .await
            .unwrap();
        assert_eq!(bucket_count(&report, "8.5-10"), 1);
    }

    #[tokio::test]
    async fn completion_counts_distinct_assignments_only() {
        let ctx = setup().await;
        let a = add_student(&ctx, "alice").await;
        let a1 = add_assignment(&ctx, "A1").await;
        let _a2 = add_assignment(&ctx, "A2").await;

        let now = Utc::now();
        submission::Model::create(&ctx.db, a1.id, a.id, None, None, now).await.unwrap();
        submission::Model::create(&ctx.db, a1.id, a.id, None, None, now + Duration::minutes(5))
            .await
            .unwrap();

        let report = ProgressService::class_progress(&ctx.db, ctx.section.id)
            .await
            .unwrap();
        let alice = &report.students[0];
        assert_eq!(alice.submitted_assignments, 1);
        assert_eq!(alice.completion_rate, 50.0);
        assert_eq!(report.completion_rate_overall, 50.0);
    }
}
