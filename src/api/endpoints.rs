use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::client::PortalClient;
use crate::loader::PortalApiDataLoader;
use crate::models::{CourseSectionsResponse, Courses, CreateCourseResult, UserProfile};
use crate::utils::path::encode_segment;

/// Builds typed loaders for the Portal API endpoints.
///
/// Every call returns a fresh, independent loader; nothing is sent until its
/// `fetch` runs. Endpoints whose success carries no `data` ("outcome only")
/// use `Value` as the data type and yield `None`.
#[derive(Clone, Debug)]
pub struct PortalApi {
    client: PortalClient,
}

impl PortalApi {
    pub fn new(client: PortalClient) -> Self {
        PortalApi { client }
    }

    pub fn client(&self) -> &PortalClient {
        &self.client
    }

    fn loader<T>(&self, method: Method, endpoint: &str) -> PortalApiDataLoader<T>
    where
        T: DeserializeOwned + Clone + Send + Sync,
    {
        PortalApiDataLoader::with_method(
            self.client.clone(),
            self.client.api_path(endpoint),
            method,
        )
    }

    /// `GET userinfo/`
    pub fn user_info(&self) -> PortalApiDataLoader<UserProfile> {
        self.loader(Method::GET, "userinfo/")
    }

    /// `GET my-courses/{username}/`: courses where `username` is the primary
    /// instructor. Admins may ask for anyone.
    pub fn my_courses(&self, username: &str) -> PortalApiDataLoader<Courses> {
        self.loader(
            Method::GET,
            &format!("my-courses/{}/", encode_segment(username)),
        )
    }

    /// `POST create-course/`, fetched with a `CreateCourseRequest` body.
    pub fn create_course(&self) -> PortalApiDataLoader<CreateCourseResult> {
        self.loader(Method::POST, "create-course/")
    }

    /// `POST admin-update/`: toggles portal admin status. Outcome only.
    pub fn admin_update(&self) -> PortalApiDataLoader<Value> {
        self.loader(Method::POST, "admin-update/")
    }

    /// `GET course-sections/{course}/`
    pub fn course_sections(
        &self,
        course_name: &str,
    ) -> PortalApiDataLoader<CourseSectionsResponse> {
        self.loader(
            Method::GET,
            &format!("course-sections/{}/", encode_segment(course_name)),
        )
    }

    /// `POST course-sections/{course}/`, fetched with an
    /// `UpsertSectionsRequest` body. Outcome only.
    pub fn upsert_course_sections(&self, course_name: &str) -> PortalApiDataLoader<Value> {
        self.loader(
            Method::POST,
            &format!("course-sections/{}/", encode_segment(course_name)),
        )
    }

    /// `POST course-sections/{course}/import/`: pull sections from the
    /// university database. Outcome only.
    pub fn import_course_sections(&self, course_name: &str) -> PortalApiDataLoader<Value> {
        self.loader(
            Method::POST,
            &format!("course-sections/{}/import/", encode_segment(course_name)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortalConfig;
    use crate::error::LoadError;
    use crate::loader::FetchOptions;
    use crate::models::{CourseSection, CreateCourseRequest, UpsertSectionsRequest};
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn api_for(url: String) -> PortalApi {
        PortalApi::new(PortalClient::new(&PortalConfig::new(url)).unwrap())
    }

    #[test]
    fn endpoints_live_under_the_api_prefix() {
        let api = api_for("https://autolab.example.edu".to_string());
        assert_eq!(api.user_info().endpoint(), "/portal/api/userinfo/");
        assert_eq!(
            api.my_courses("jdoe").endpoint(),
            "/portal/api/my-courses/jdoe/"
        );
        assert_eq!(api.create_course().method(), &Method::POST);
        assert_eq!(
            api.import_course_sections("cse 116").endpoint(),
            "/portal/api/course-sections/cse%20116/import/"
        );
    }

    #[tokio::test]
    async fn my_courses_decodes_course_list() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/portal/api/my-courses/prof/")
            .with_body(
                json!({
                    "success": true,
                    "data": {"username": "prof", "courses": []}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let loader = api_for(server.url()).my_courses("prof");
        let courses = loader.fetch(FetchOptions::default()).await.unwrap().unwrap();
        m.assert_async().await;

        assert_eq!(courses.username, "prof");
        assert!(courses.courses.is_empty());
    }

    #[tokio::test]
    async fn create_course_posts_request_and_returns_location() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/portal/api/create-course/")
            .match_body(Matcher::Json(json!({
                "uniqueIdentifier": "2249-CSE-115",
                "displayName": "CSE 115"
            })))
            .with_body(
                json!({
                    "success": true,
                    "data": {
                        "message": "You successfully created the course CSE 115",
                        "location": "https://autolab.cse.buffalo.edu/courses/cse115-f24"
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let body = CreateCourseRequest {
            unique_identifier: "2249-CSE-115".to_string(),
            display_name: "CSE 115".to_string(),
        };
        let loader = api_for(server.url()).create_course();
        let result = loader
            .fetch(FetchOptions::json_body(&body).unwrap())
            .await
            .unwrap()
            .unwrap();
        m.assert_async().await;

        assert!(result.location.ends_with("/courses/cse115-f24"));
    }

    #[tokio::test]
    async fn rejected_sections_report_row_errors() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/portal/api/course-sections/cse116-s25/")
            .with_status(400)
            .with_body(
                json!({
                    "success": false,
                    "error": "There were errors in the sections you provided.",
                    "errors": ["Section A1: end time before start time"]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let body = UpsertSectionsRequest {
            sections: vec![CourseSection {
                name: "A1".to_string(),
                is_lecture: false,
                start_time: "14:00:00".to_string(),
                end_time: "13:00:00".to_string(),
                days_code: 2,
                updated: Some(true),
            }],
        };
        let loader = api_for(server.url()).upsert_course_sections("cse116-s25");
        let err = loader
            .fetch(FetchOptions::json_body(&body).unwrap())
            .await
            .unwrap_err();

        match err {
            LoadError::Api { message, details } => {
                assert_eq!(message, "There were errors in the sections you provided.");
                assert_eq!(details, vec!["Section A1: end time before start time"]);
            }
            other => panic!("expected an API error, got {:?}", other),
        }
    }
}
