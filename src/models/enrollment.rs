use crate::models::{MemberRow, PaginationInfo};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use utoipa::ToSchema;
use uuid::Uuid;

/// Display value for members without a resolvable department.
pub const NO_GROUP: &str = "No Group";
/// Department filter value meaning "no filter".
pub const ALL_GROUPS: &str = "All Groups";

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// The organization a request is scoped to, resolved before aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrganizationContext {
    pub organization_id: i64,
}

impl OrganizationContext {
    pub fn new(organization_id: i64) -> Self {
        Self { organization_id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Unregistered,
    Partial,
    Complete,
}

impl EnrollmentStatus {
    /// 0 → unregistered, 1 → partial, 2+ → complete.
    pub fn from_slot_count(count: usize) -> Self {
        match count {
            0 => EnrollmentStatus::Unregistered,
            1 => EnrollmentStatus::Partial,
            _ => EnrollmentStatus::Complete,
        }
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnrollmentStatus::Unregistered => write!(f, "unregistered"),
            EnrollmentStatus::Partial => write!(f, "partial"),
            EnrollmentStatus::Complete => write!(f, "complete"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(EnrollmentStatus),
}

impl StatusFilter {
    /// Trimmed and case-insensitive; `not_registered` aliases `unregistered`.
    /// Unknown values fall back to no filter.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(value) = raw.map(|s| s.trim().to_ascii_lowercase()) else {
            return StatusFilter::All;
        };
        match value.as_str() {
            "" | "all" => StatusFilter::All,
            "complete" => StatusFilter::Only(EnrollmentStatus::Complete),
            "partial" => StatusFilter::Only(EnrollmentStatus::Partial),
            "unregistered" | "not_registered" => {
                StatusFilter::Only(EnrollmentStatus::Unregistered)
            }
            other => {
                log::warn!("Ignoring unknown enrollment status filter: {other}");
                StatusFilter::All
            }
        }
    }

    pub fn matches(&self, status: EnrollmentStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }

    /// Value echoed in the `X-Status-Filter` response header.
    pub fn header_value(&self) -> String {
        match self {
            StatusFilter::All => "all".to_string(),
            StatusFilter::Only(status) => status.to_string(),
        }
    }
}

/// Raw query string of `GET /finger/members`. Every field is parsed leniently.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EnrollmentQuery {
    pub limit: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "organizationId")]
    pub organization_id: Option<String>,
    pub search: Option<String>,
    pub department: Option<String>,
    pub status: Option<String>,
}

/// Normalized request for the member listing pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberListParams {
    pub limit: u64,
    pub page: u64,
    pub organization_id: Option<i64>,
    pub search: Option<String>,
    pub department: Option<String>,
    pub status: StatusFilter,
}

impl Default for MemberListParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            page: 1,
            organization_id: None,
            search: None,
            department: None,
            status: StatusFilter::All,
        }
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Leading integer of `raw`, ignoring anything after the digits:
/// `"50abc"` → 50, `"5.5"` → 5, `"abc"` → `None`.
pub fn leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    // overflow saturates; callers clamp anyway
    let value = match digits[..end].parse::<i64>() {
        Ok(v) => v,
        Err(_) if end > 0 => i64::MAX,
        Err(_) => return None,
    };
    Some(sign * value)
}

/// Non-numeric → 10, otherwise clamped into `[1, 100]`.
pub fn parse_limit(raw: Option<&str>) -> u64 {
    match raw.and_then(leading_int) {
        Some(n) => n.clamp(1, MAX_LIMIT as i64) as u64,
        None => DEFAULT_LIMIT,
    }
}

/// Non-numeric or below one → 1.
pub fn parse_page(raw: Option<&str>) -> u64 {
    raw.and_then(leading_int)
        .filter(|n| *n >= 1)
        .map(|n| n as u64)
        .unwrap_or(1)
}

/// Non-numeric or non-positive ids count as absent.
pub fn parse_organization_id(raw: Option<&str>) -> Option<i64> {
    raw.and_then(leading_int)
        .filter(|n| *n > 0)
}

impl EnrollmentQuery {
    pub fn to_params(&self) -> MemberListParams {
        let department = trimmed(&self.department)
            .filter(|d| !d.eq_ignore_ascii_case(ALL_GROUPS));
        MemberListParams {
            limit: parse_limit(self.limit.as_deref()),
            page: parse_page(self.page.as_deref()),
            organization_id: parse_organization_id(self.organization_id.as_deref()),
            search: trimmed(&self.search),
            department,
            status: StatusFilter::parse(self.status.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct StatsQuery {
    #[serde(rename = "organizationId")]
    pub organization_id: Option<String>,
}

/// One row of the enrollment listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MemberEnrollmentView {
    pub id: i64,
    pub user_id: Uuid,
    pub display_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub department_name: String,
    pub finger1_registered: bool,
    pub finger2_registered: bool,
    #[serde(skip)]
    pub status: EnrollmentStatus,
}

impl MemberEnrollmentView {
    pub fn build(member: MemberRow, department_name: Option<&str>, slots: &BTreeSet<u8>) -> Self {
        Self {
            id: member.id,
            user_id: member.user_id,
            display_name: member.resolved_name(),
            department_name: department_name.unwrap_or(NO_GROUP).to_string(),
            finger1_registered: slots.contains(&1),
            finger2_registered: slots.contains(&2),
            status: EnrollmentStatus::from_slot_count(slots.len()),
            first_name: member.first_name,
            last_name: member.last_name,
            phone: member.phone,
            email: member.email,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct FilterOptions {
    /// Distinct, sorted department names across the unfiltered member set.
    pub departments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MemberListResponse {
    pub success: bool,
    pub data: Vec<MemberEnrollmentView>,
    pub pagination: PaginationInfo,
    pub filters: FilterOptions,
}

impl MemberListResponse {
    pub fn empty(limit: u64) -> Self {
        Self {
            success: true,
            data: Vec::new(),
            pagination: PaginationInfo::empty(limit),
            filters: FilterOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EnrollmentStats {
    pub total: u64,
    pub complete: u64,
    pub partial: u64,
    pub unregistered: u64,
}

impl EnrollmentStats {
    pub fn record(&mut self, status: EnrollmentStatus) {
        self.total += 1;
        match status {
            EnrollmentStatus::Complete => self.complete += 1,
            EnrollmentStatus::Partial => self.partial += 1,
            EnrollmentStatus::Unregistered => self.unregistered += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> EnrollmentQuery {
        let mut q = EnrollmentQuery::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "limit" => q.limit = v,
                "page" => q.page = v,
                "organizationId" => q.organization_id = v,
                "search" => q.search = v,
                "department" => q.department = v,
                "status" => q.status = v,
                _ => unreachable!(),
            }
        }
        q
    }

    #[test]
    fn test_status_from_slot_count() {
        assert_eq!(EnrollmentStatus::from_slot_count(0), EnrollmentStatus::Unregistered);
        assert_eq!(EnrollmentStatus::from_slot_count(1), EnrollmentStatus::Partial);
        assert_eq!(EnrollmentStatus::from_slot_count(2), EnrollmentStatus::Complete);
        assert_eq!(EnrollmentStatus::from_slot_count(3), EnrollmentStatus::Complete);
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!(StatusFilter::parse(None), StatusFilter::All);
        assert_eq!(StatusFilter::parse(Some(" ALL ")), StatusFilter::All);
        assert_eq!(
            StatusFilter::parse(Some("Complete")),
            StatusFilter::Only(EnrollmentStatus::Complete)
        );
        assert_eq!(
            StatusFilter::parse(Some(" not_registered ")),
            StatusFilter::parse(Some("unregistered"))
        );
        assert_eq!(StatusFilter::parse(Some("bogus")), StatusFilter::All);
    }

    #[test]
    fn test_status_filter_header_value() {
        assert_eq!(StatusFilter::All.header_value(), "all");
        assert_eq!(
            StatusFilter::parse(Some("NOT_REGISTERED")).header_value(),
            "unregistered"
        );
    }

    #[test]
    fn test_query_defaults() {
        assert_eq!(EnrollmentQuery::default().to_params(), MemberListParams::default());
    }

    #[test]
    fn test_query_lenient_numbers() {
        let p = query(&[("limit", "abc"), ("page", "-3"), ("organizationId", "0")]).to_params();
        assert_eq!(p.limit, DEFAULT_LIMIT);
        assert_eq!(p.page, 1);
        assert_eq!(p.organization_id, None);

        let p = query(&[("limit", "500"), ("page", "4"), ("organizationId", "12")]).to_params();
        assert_eq!(p.limit, MAX_LIMIT);
        assert_eq!(p.page, 4);
        assert_eq!(p.organization_id, Some(12));

        assert_eq!(parse_limit(Some("0")), 1);
    }

    #[test]
    fn test_numbers_use_leading_digits() {
        assert_eq!(leading_int("50abc"), Some(50));
        assert_eq!(leading_int(" 5.5"), Some(5));
        assert_eq!(leading_int("-3x"), Some(-3));
        assert_eq!(leading_int("+7"), Some(7));
        assert_eq!(leading_int("abc"), None);
        assert_eq!(leading_int("-"), None);
        assert_eq!(leading_int(""), None);
        assert_eq!(leading_int("99999999999999999999"), Some(i64::MAX));

        let p = query(&[("limit", "50abc"), ("page", "2.9"), ("organizationId", "12px")]).to_params();
        assert_eq!(p.limit, 50);
        assert_eq!(p.page, 2);
        assert_eq!(p.organization_id, Some(12));
        assert_eq!(parse_limit(Some("1e3")), 1);
    }

    #[test]
    fn test_query_all_groups_is_no_filter() {
        let p = query(&[("department", "all groups"), ("search", "   ")]).to_params();
        assert_eq!(p.department, None);
        assert_eq!(p.search, None);

        let p = query(&[("department", " Finance "), ("search", " ana ")]).to_params();
        assert_eq!(p.department.as_deref(), Some("Finance"));
        assert_eq!(p.search.as_deref(), Some("ana"));
    }

    #[test]
    fn test_view_build() {
        let member = MemberRow {
            id: 3,
            first_name: Some("Sari".into()),
            ..Default::default()
        };
        let slots: BTreeSet<u8> = [2].into_iter().collect();
        let view = MemberEnrollmentView::build(member, None, &slots);
        assert_eq!(view.display_name, "Sari");
        assert_eq!(view.department_name, NO_GROUP);
        assert!(!view.finger1_registered);
        assert!(view.finger2_registered);
        assert_eq!(view.status, EnrollmentStatus::Partial);
    }

    #[test]
    fn test_stats_record() {
        let mut stats = EnrollmentStats::default();
        stats.record(EnrollmentStatus::Complete);
        stats.record(EnrollmentStatus::Unregistered);
        stats.record(EnrollmentStatus::Unregistered);
        assert_eq!(
            stats,
            EnrollmentStats { total: 3, complete: 1, partial: 0, unregistered: 2 }
        );
    }
}
