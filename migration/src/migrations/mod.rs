pub mod m202608210001_create_users;
pub mod m202608210002_create_courses;
pub mod m202608210003_create_class_sections;
pub mod m202608210004_create_enrollments;
pub mod m202608210005_create_assignments;
pub mod m202608210006_create_submissions;
pub mod m202608250001_create_attendance;
