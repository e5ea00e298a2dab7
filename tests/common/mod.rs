//! In-memory `EnrollmentStore` used by the integration tests.
#![allow(dead_code)]

use attendance_backend::config::EnrollmentConfig;
use attendance_backend::models::{BiometricRecord, MemberRow};
use attendance_backend::services::{EnrollmentService, EnrollmentStore, MemberFilter};
use attendance_backend::utils::Window;
use attendance_backend::{AppError, AppResult};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct StoredMember {
    pub organization_id: i64,
    pub is_active: bool,
    pub row: MemberRow,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CallLog {
    pub member_windows: u32,
    pub biometric_windows: u32,
    pub department_lookups: u32,
    pub largest_id_chunk: usize,
}

#[derive(Default)]
pub struct MemoryStore {
    pub members: Vec<StoredMember>,
    pub departments: Vec<(i64, i64, String)>,
    pub records: Vec<BiometricRecord>,
    pub fail_biometrics: bool,
    /// Member windows after this id fail; `Some(None)` fails the first window.
    pub fail_members_after: Option<Option<i64>>,
    pub calls: Mutex<CallLog>,
}

fn window_of<T>(mut rows: Vec<T>, key: impl Fn(&T) -> i64, window: Window) -> Vec<T> {
    rows.retain(|r| window.after.is_none_or(|after| key(r) > after));
    rows.sort_by_key(|r| key(r));
    rows.truncate(window.limit as usize);
    rows
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn department(mut self, id: i64, organization_id: i64, name: &str) -> Self {
        self.departments.push((id, organization_id, name.to_string()));
        self
    }

    pub fn member(mut self, id: i64, organization_id: i64, department_id: Option<i64>, name: &str) -> Self {
        self.members.push(StoredMember {
            organization_id,
            is_active: true,
            row: MemberRow {
                id,
                user_id: Uuid::from_u128(id as u128),
                department_id,
                display_name: Some(name.to_string()),
                email: Some(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
                ..Default::default()
            },
        });
        self
    }

    pub fn member_for_user(mut self, id: i64, organization_id: i64, user_id: Uuid) -> Self {
        self.members.push(StoredMember {
            organization_id,
            is_active: true,
            row: MemberRow {
                id,
                user_id,
                ..Default::default()
            },
        });
        self
    }

    pub fn inactive_member(mut self, id: i64, organization_id: i64, name: &str) -> Self {
        self = self.member(id, organization_id, None, name);
        if let Some(last) = self.members.last_mut() {
            last.is_active = false;
        }
        self
    }

    pub fn record(mut self, record: BiometricRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn failing_biometrics(mut self) -> Self {
        self.fail_biometrics = true;
        self
    }

    pub fn failing_members(mut self) -> Self {
        self.fail_members_after = Some(None);
        self
    }

    /// Fails the member window that starts after `id`, once earlier windows succeeded.
    pub fn failing_members_after(mut self, id: i64) -> Self {
        self.fail_members_after = Some(Some(id));
        self
    }

    pub fn calls(&self) -> CallLog {
        *self.calls.lock().unwrap()
    }
}

impl EnrollmentStore for MemoryStore {
    async fn find_user_organization(&self, user_id: Uuid) -> AppResult<Option<i64>> {
        Ok(self
            .members
            .iter()
            .filter(|m| m.is_active && m.row.user_id == user_id)
            .min_by_key(|m| m.row.id)
            .map(|m| m.organization_id))
    }

    async fn fetch_member_window(
        &self,
        organization_id: i64,
        filter: &MemberFilter,
        window: Window,
    ) -> AppResult<Vec<MemberRow>> {
        self.calls.lock().unwrap().member_windows += 1;
        if self.fail_members_after == Some(window.after) {
            return Err(AppError::DatabaseError(sea_orm::DbErr::Custom(
                "organization_members query timed out".to_string(),
            )));
        }
        let rows = self
            .members
            .iter()
            .filter(|m| m.is_active && m.organization_id == organization_id)
            .filter(|m| filter.matches(&m.row))
            .map(|m| m.row.clone())
            .collect();
        Ok(window_of(rows, |r| r.id, window))
    }

    async fn find_department_ids_by_name(
        &self,
        organization_id: i64,
        name: &str,
    ) -> AppResult<Vec<i64>> {
        self.calls.lock().unwrap().department_lookups += 1;
        Ok(self
            .departments
            .iter()
            .filter(|(_, org, n)| *org == organization_id && n.eq_ignore_ascii_case(name.trim()))
            .map(|(id, _, _)| *id)
            .collect())
    }

    async fn fetch_department_names(
        &self,
        organization_id: i64,
        ids: &[i64],
    ) -> AppResult<Vec<(i64, String)>> {
        Ok(self
            .departments
            .iter()
            .filter(|(id, org, _)| *org == organization_id && ids.contains(id))
            .map(|(id, _, name)| (*id, name.clone()))
            .collect())
    }

    async fn fetch_biometric_window(
        &self,
        member_ids: &[i64],
        window: Window,
    ) -> AppResult<Vec<BiometricRecord>> {
        {
            let mut calls = self.calls.lock().unwrap();
            calls.biometric_windows += 1;
            calls.largest_id_chunk = calls.largest_id_chunk.max(member_ids.len());
        }
        if self.fail_biometrics {
            return Err(AppError::DatabaseError(sea_orm::DbErr::Custom(
                "biometric_data query timed out".to_string(),
            )));
        }
        let rows = self
            .records
            .iter()
            .filter(|r| r.member_id.is_some_and(|id| member_ids.contains(&id)))
            .filter(|r| r.is_eligible())
            .cloned()
            .collect();
        Ok(window_of(rows, |r| r.id, window))
    }
}

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
}

/// Active fingerprint record with an explicit finger number.
pub fn finger(id: i64, member_id: i64, finger_number: i32, day: u32) -> BiometricRecord {
    BiometricRecord::new(id, Some(member_id), Some(finger_number), "FINGERPRINT", None)
        .enrolled_at(at(day, 9))
}

/// Active fingerprint record whose slot is only known from the device local id.
pub fn local_id(id: i64, member_id: i64, day: u32) -> BiometricRecord {
    BiometricRecord::new(id, Some(member_id), None, "FINGERPRINT", Some(json!({ "local_id": id })))
        .enrolled_at(at(day, 9))
}

pub fn service(store: MemoryStore) -> EnrollmentService<MemoryStore> {
    EnrollmentService::with_store(store, EnrollmentConfig::default())
}

pub fn service_with(store: MemoryStore, limits: EnrollmentConfig) -> EnrollmentService<MemoryStore> {
    EnrollmentService::with_store(store, limits)
}
