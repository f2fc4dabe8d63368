use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The profile of the logged-in portal user, as returned in the `data`
/// field of `GET /portal/api/userinfo/`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub is_admin: bool,
    /// Any extra fields the backend sends alongside the profile.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn new(
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        is_admin: bool,
    ) -> Self {
        UserProfile {
            username: username.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            is_admin,
            extra: Map::new(),
        }
    }

    /// Display name in "First Last" form.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Campus e-mail address; portal usernames are UBITNames.
    pub fn email(&self) -> String {
        format!("{}@buffalo.edu", self.username)
    }
}
