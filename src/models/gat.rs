//! Shapes used by the grader assignment tool (GAT) pages.

use serde::{Deserialize, Serialize};

/// A course known to the grader assignment tool.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GatCourse {
    pub name: String,
    pub display_name: String,
}

/// A GAT course as seen from Autolab, with the caller's role in it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GatAutolabCourse {
    #[serde(flatten)]
    pub course: GatCourse,
    pub role: String,
    pub semester: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GatAutolabCoursesResponse {
    pub courses: Vec<GatAutolabCourse>,
    pub email: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CourseRole {
    #[serde(rename = "instructor")]
    Instructor,
    #[serde(rename = "course_assistant")]
    CourseAssistant,
    #[serde(rename = "student")]
    Student,
}

impl CourseRole {
    /// Instructors and course assistants can be assigned grading work.
    pub fn can_grade(self) -> bool {
        matches!(self, CourseRole::Instructor | CourseRole::CourseAssistant)
    }
}

/// A member of a GAT course. Members are keyed by e-mail because they may
/// never have logged in to the portal.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GatCourseUser {
    pub email: String,
    pub display_name: String,
    pub role: CourseRole,
    #[serde(default)]
    pub grading_hours: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GatGradingAssignment {
    pub id: i64,
    pub assessment_name: String,
    pub created_at: String,
    #[serde(default)]
    pub archived: bool,
}

/// One grader/student pairing inside a grading assignment.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GatGradingAssignmentPair {
    pub grader_email: String,
    pub student_email: String,
    pub submission_url: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GatConflictOfInterest {
    pub grader_email: String,
    pub student_email: String,
}
