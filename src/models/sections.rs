use serde::{Deserialize, Serialize};

use super::gat::GatAutolabCourse;

/// A lecture or recitation section of an Autolab course.
///
/// `days_code` is the Autolab weekday bitmask (Sunday = 1, Monday = 2, ...,
/// Saturday = 64).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CourseSection {
    pub name: String,
    pub is_lecture: bool,
    pub start_time: String,
    pub end_time: String,
    pub days_code: u8,
    /// Set by the editing UI on rows that changed locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<bool>,
}

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

impl CourseSection {
    /// Abbreviated weekday names encoded by `days_code`.
    pub fn days(&self) -> Vec<&'static str> {
        DAY_NAMES
            .iter()
            .enumerate()
            .filter(|(bit, _)| self.days_code & (1 << bit) != 0)
            .map(|(_, name)| *name)
            .collect()
    }
}

/// The `data` of `GET /portal/api/course-sections/{course}/`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CourseSectionsResponse {
    pub course: GatAutolabCourse,
    pub sections: Vec<CourseSection>,
}

/// Body of `POST /portal/api/course-sections/{course}/`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UpsertSectionsRequest {
    pub sections: Vec<CourseSection>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_days_bitmask() {
        let section: CourseSection = serde_json::from_value(json!({
            "name": "A1",
            "is_lecture": false,
            "start_time": "13:00:00",
            "end_time": "14:50:00",
            "days_code": 42
        }))
        .unwrap();

        assert_eq!(section.days(), vec!["Mon", "Wed", "Fri"]);
        assert_eq!(section.updated, None);
    }

    #[test]
    fn upsert_body_omits_local_flag() {
        let body = serde_json::to_value(UpsertSectionsRequest {
            sections: vec![CourseSection {
                name: "LEC".to_string(),
                is_lecture: true,
                start_time: "09:00:00".to_string(),
                end_time: "09:50:00".to_string(),
                days_code: 2,
                updated: None,
            }],
        })
        .unwrap();

        assert!(body["sections"][0].get("updated").is_none());
    }
}
