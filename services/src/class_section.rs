//! Class-section creation with a collision-checked join code.

use db::models::{class_section, course};
use rand::Rng;
use sea_orm::DatabaseConnection;

use crate::code::{generate_code, JOIN_CODE_LEN, MAX_CODE_ATTEMPTS};
use crate::error::{is_unique_violation, ServiceError};

pub struct ClassSectionService;

impl ClassSectionService {
    /// Creates a class section with a fresh unique join code. Sampling
    /// is retried on collision; losing the unique-index race on insert
    /// counts as a collision too.
    pub async fn create<R: Rng + ?Sized>(
        db: &DatabaseConnection,
        rng: &mut R,
        course_id: i64,
        teacher_id: i64,
        name: &str,
        description: Option<&str>,
        room: Option<&str>,
    ) -> Result<class_section::Model, ServiceError> {
        if course::Model::get_by_id(db, course_id).await?.is_none() {
            return Err(ServiceError::NotFound("Course".into()));
        }

        for _ in 0..MAX_CODE_ATTEMPTS {
            let join_code = generate_code(rng, JOIN_CODE_LEN);
            if class_section::Model::get_by_join_code(db, &join_code)
                .await?
                .is_some()
            {
                continue;
            }

            match class_section::Model::create(
                db,
                course_id,
                teacher_id,
                name,
                description,
                room,
                &join_code,
            )
            .await
            {
                Ok(section) => {
                    tracing::info!(
                        class_section_id = section.id,
                        course_id,
                        "class section created"
                    );
                    return Ok(section);
                }
                Err(e) if is_unique_violation(&e) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(ServiceError::CodeGenerationFailed)
    }
}
