use crate::entities::{member_entity, profile_entity};
use uuid::Uuid;

/// An active membership joined with its user profile.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberRow {
    pub id: i64,
    pub user_id: Uuid,
    pub department_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl MemberRow {
    /// `display_name`, else "first last", else "No Name". Only empty
    /// strings fall through; whitespace is kept as stored.
    pub fn resolved_name(&self) -> String {
        if let Some(name) = non_empty(&self.display_name) {
            return name.to_string();
        }
        let composed = [non_empty(&self.first_name), non_empty(&self.last_name)]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if composed.is_empty() {
            "No Name".to_string()
        } else {
            composed
        }
    }

    /// Case-insensitive substring match over display, first and last name.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [&self.display_name, &self.first_name, &self.last_name]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

impl From<(member_entity::Model, Option<profile_entity::Model>)> for MemberRow {
    fn from((member, profile): (member_entity::Model, Option<profile_entity::Model>)) -> Self {
        let profile = profile.unwrap_or_else(|| profile_entity::Model {
            id: member.user_id,
            first_name: None,
            last_name: None,
            display_name: None,
            phone: None,
            email: None,
        });
        Self {
            id: member.id,
            user_id: member.user_id,
            department_id: member.department_id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            display_name: profile.display_name,
            phone: profile.phone,
            email: profile.email,
        }
    }
}
