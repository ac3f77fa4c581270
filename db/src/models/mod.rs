pub mod assignment;
pub mod attendance_record;
pub mod attendance_session;
pub mod class_section;
pub mod course;
pub mod enrollment;
pub mod submission;
pub mod user;

pub use assignment::Entity as Assignment;
pub use attendance_record::Entity as AttendanceRecord;
pub use attendance_session::Entity as AttendanceSession;
pub use class_section::Entity as ClassSection;
pub use course::Entity as Course;
pub use enrollment::Entity as Enrollment;
pub use submission::Entity as Submission;
pub use user::Entity as User;
