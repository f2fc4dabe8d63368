use serde::{Deserialize, Serialize};

/// A course offering as listed by `GET /portal/api/my-courses/{username}/`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub catalog_number_source_key: String,
    pub combined_section_id: Option<String>,
    pub course: String,
    pub course_number: String,
    pub course_source_key: String,
    pub course_type: String,
    pub crosslisted_identifier: Option<String>,
    pub friendly_name: String,
    pub instructor: String,
    pub semester_code: String,
    pub subject_source_key: String,
    pub suggested_name: String,
    pub technical_name: String,
    pub term: String,
    pub term_source_key: String,
    pub unique_identifier: String,
}

/// The `data` of the my-courses response: an instructor and their courses.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Courses {
    pub username: String,
    pub courses: Vec<Course>,
}

/// Body of `POST /portal/api/create-course/`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub unique_identifier: String,
    pub display_name: String,
}

/// The `data` of a successful create-course response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateCourseResult {
    pub message: String,
    /// Link to the newly created course on Autolab.
    pub location: String,
}
