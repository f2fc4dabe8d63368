use std::fmt;

use serde::Serialize;

/// Every page the portal can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Page {
    Index,
    CreateCourse,
    BecomeAdmin,
    TangoStatistics,
    GatCourseList,
    GatCourse,
    GatPeople,
    GatPerson,
    GatAutolabAssessments,
    GatCreateNewAssignment,
    GatAssignment,
    CourseSectionsList,
    CourseSections,
    NotFound,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One node of the route tree. Child paths without a leading `/` are
/// relative to their parent.
#[derive(Debug, Clone)]
pub struct RouteRecord {
    pub path: &'static str,
    pub name: Option<&'static str>,
    /// `None` for grouping nodes that only hold children.
    pub page: Option<Page>,
    pub children: Vec<RouteRecord>,
}

impl RouteRecord {
    pub fn page(path: &'static str, name: &'static str, page: Page) -> Self {
        RouteRecord {
            path,
            name: Some(name),
            page: Some(page),
            children: Vec::new(),
        }
    }

    pub fn group(path: &'static str, children: Vec<RouteRecord>) -> Self {
        RouteRecord {
            path,
            name: None,
            page: None,
            children,
        }
    }
}

/// The portal's routes. Everything lives under `/`, which the main layout
/// wraps.
pub fn portal_routes() -> Vec<RouteRecord> {
    vec![
        RouteRecord::group(
            "/",
            vec![
                RouteRecord::page("", "index", Page::Index),
                RouteRecord::page("create-course", "create-course", Page::CreateCourse),
                RouteRecord::page("become-admin", "become-admin", Page::BecomeAdmin),
                RouteRecord::page("tango-statistics", "tango-statistics", Page::TangoStatistics),
                RouteRecord::group(
                    "gat",
                    vec![
                        RouteRecord::page("", "grader-assignment-tool", Page::GatCourseList),
                        RouteRecord::page(
                            ":courseName",
                            "grader-assignment-tool-course",
                            Page::GatCourse,
                        ),
                        RouteRecord::page(
                            ":courseName/people",
                            "grader-assignment-tool-people",
                            Page::GatPeople,
                        ),
                        RouteRecord::page(
                            ":courseName/people/:user/",
                            "grader-assignment-tool-person",
                            Page::GatPerson,
                        ),
                        RouteRecord::page(
                            ":courseName/assignments/new",
                            "grader-assignment-tool-autolab-assessments",
                            Page::GatAutolabAssessments,
                        ),
                        RouteRecord::page(
                            ":courseName/assignments/new/:assessmentName",
                            "grader-assignment-tool-create-new-assignment",
                            Page::GatCreateNewAssignment,
                        ),
                        RouteRecord::page(
                            ":courseName/assignments/:assignmentId",
                            "grader-assignment-tool-assignment",
                            Page::GatAssignment,
                        ),
                    ],
                ),
                RouteRecord::group(
                    "course-sections",
                    vec![
                        RouteRecord::page("", "course-sections", Page::CourseSectionsList),
                        RouteRecord::page(
                            ":courseName",
                            "course-sections-course",
                            Page::CourseSections,
                        ),
                    ],
                ),
            ],
        ),
        RouteRecord {
            path: "/:catchAll(.*)*",
            name: None,
            page: Some(Page::NotFound),
            children: Vec::new(),
        },
    ]
}
