use crate::entities::biometric_entity;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// `template_data` as stored: absent, an opaque string, or JSON.
///
/// Resolved once when the row is loaded; later stages only look at
/// [`BiometricRecord::has_local_id`].
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateData {
    Absent,
    /// A string column value that is not valid JSON.
    Raw(String),
    Parsed(Value),
}

impl TemplateData {
    /// Strings holding serialized JSON are parsed; parse failures keep the raw text.
    pub fn from_column(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => TemplateData::Absent,
            Some(Value::String(text)) => match serde_json::from_str::<Value>(&text) {
                Ok(parsed) => TemplateData::Parsed(parsed),
                Err(_) => TemplateData::Raw(text),
            },
            Some(other) => TemplateData::Parsed(other),
        }
    }

    /// A device-side template slot id: a JSON number, or a string of ASCII digits.
    pub fn has_local_id(&self) -> bool {
        let TemplateData::Parsed(Value::Object(map)) = self else {
            return false;
        };
        match map.get("local_id") {
            Some(Value::Number(_)) => true,
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit())
            }
            _ => false,
        }
    }
}

/// One enrollment attempt, normalized from a `biometric_data` row.
#[derive(Debug, Clone, PartialEq)]
pub struct BiometricRecord {
    pub id: i64,
    pub member_id: Option<i64>,
    pub finger_number: Option<i32>,
    pub biometric_type: String,
    pub template: TemplateData,
    pub has_local_id: bool,
    pub enrollment_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl BiometricRecord {
    pub fn new(
        id: i64,
        member_id: Option<i64>,
        finger_number: Option<i32>,
        biometric_type: impl Into<String>,
        template_data: Option<Value>,
    ) -> Self {
        let template = TemplateData::from_column(template_data);
        Self {
            id,
            member_id,
            finger_number,
            biometric_type: biometric_type.into(),
            has_local_id: template.has_local_id(),
            template,
            enrollment_date: None,
            created_at: None,
            is_active: true,
        }
    }

    pub fn enrolled_at(mut self, at: DateTime<Utc>) -> Self {
        self.enrollment_date = Some(at);
        self
    }

    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Active and typed as a fingerprint capture (case-insensitive).
    pub fn is_eligible(&self) -> bool {
        self.is_active && self.biometric_type.to_lowercase().contains("fingerprint")
    }

    /// Ordering key: enrollment date, then creation time; missing sorts first.
    pub fn sort_key(&self) -> Option<DateTime<Utc>> {
        self.enrollment_date.or(self.created_at)
    }
}

impl From<biometric_entity::Model> for BiometricRecord {
    fn from(m: biometric_entity::Model) -> Self {
        let template = TemplateData::from_column(m.template_data);
        Self {
            id: m.id,
            member_id: m.organization_member_id,
            finger_number: m.finger_number,
            biometric_type: m.biometric_type,
            has_local_id: template.has_local_id(),
            template,
            enrollment_date: m.enrollment_date,
            created_at: m.created_at,
            is_active: m.is_active,
        }
    }
}
