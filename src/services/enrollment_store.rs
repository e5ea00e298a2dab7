//! Read access to members, departments and biometric records.

use crate::entities::{biometric_entity, department_entity, member_entity, profile_entity};
use crate::error::AppResult;
use crate::models::{BiometricRecord, MemberRow};
use crate::utils::Window;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

/// Predicates pushed into the member fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberFilter {
    /// Substring over display, first and last name.
    pub search: Option<String>,
    /// Restrict to these departments.
    pub department_ids: Option<Vec<i64>>,
}

impl MemberFilter {
    pub fn is_unfiltered(&self) -> bool {
        self.search.is_none() && self.department_ids.is_none()
    }

    pub fn matches(&self, member: &MemberRow) -> bool {
        let search_ok = self
            .search
            .as_deref()
            .is_none_or(|needle| member.matches_search(needle));
        let department_ok = self.department_ids.as_ref().is_none_or(|ids| {
            member
                .department_id
                .is_some_and(|id| ids.contains(&id))
        });
        search_ok && department_ok
    }
}

/// Data source for the enrollment pipeline.
///
/// Window fetches return rows ordered by id ascending, restricted to
/// `id > window.after` and at most `window.limit` rows.
pub trait EnrollmentStore: Send + Sync {
    /// Organization of the user's first active membership.
    fn find_user_organization(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = AppResult<Option<i64>>> + Send;

    /// Active members of the organization matching `filter`.
    fn fetch_member_window(
        &self,
        organization_id: i64,
        filter: &MemberFilter,
        window: Window,
    ) -> impl Future<Output = AppResult<Vec<MemberRow>>> + Send;

    /// Ids of the organization's departments whose name equals `name`, ignoring case.
    fn find_department_ids_by_name(
        &self,
        organization_id: i64,
        name: &str,
    ) -> impl Future<Output = AppResult<Vec<i64>>> + Send;

    fn fetch_department_names(
        &self,
        organization_id: i64,
        ids: &[i64],
    ) -> impl Future<Output = AppResult<Vec<(i64, String)>>> + Send;

    /// Active fingerprint records belonging to `member_ids`.
    fn fetch_biometric_window(
        &self,
        member_ids: &[i64],
        window: Window,
    ) -> impl Future<Output = AppResult<Vec<BiometricRecord>>> + Send;
}

/// `%term%` for a case-insensitive LIKE, with wildcards in the term escaped.
pub fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn profile_contains(column: profile_entity::Column, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col((profile_entity::Entity, column))))
        .like(LikeExpr::new(pattern).escape('\\'))
}

#[derive(Clone)]
pub struct SeaOrmEnrollmentStore {
    pool: DatabaseConnection,
}

impl SeaOrmEnrollmentStore {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }
}

impl EnrollmentStore for SeaOrmEnrollmentStore {
    async fn find_user_organization(&self, user_id: Uuid) -> AppResult<Option<i64>> {
        let member = member_entity::Entity::find()
            .filter(member_entity::Column::UserId.eq(user_id))
            .filter(member_entity::Column::IsActive.eq(true))
            .order_by_asc(member_entity::Column::Id)
            .one(&self.pool)
            .await?;
        Ok(member.map(|m| m.organization_id))
    }

    async fn fetch_member_window(
        &self,
        organization_id: i64,
        filter: &MemberFilter,
        window: Window,
    ) -> AppResult<Vec<MemberRow>> {
        let mut query = member_entity::Entity::find()
            .find_also_related(profile_entity::Entity)
            .filter(member_entity::Column::OrganizationId.eq(organization_id))
            .filter(member_entity::Column::IsActive.eq(true));

        if let Some(after) = window.after {
            query = query.filter(member_entity::Column::Id.gt(after));
        }
        if let Some(ids) = &filter.department_ids {
            query = query.filter(member_entity::Column::DepartmentId.is_in(ids.iter().copied()));
        }
        if let Some(search) = &filter.search {
            let pattern = contains_pattern(search);
            query = query.filter(
                Condition::any()
                    .add(profile_contains(profile_entity::Column::DisplayName, &pattern))
                    .add(profile_contains(profile_entity::Column::FirstName, &pattern))
                    .add(profile_contains(profile_entity::Column::LastName, &pattern)),
            );
        }

        let rows = query
            .order_by_asc(member_entity::Column::Id)
            .limit(window.limit)
            .all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(MemberRow::from).collect())
    }

    async fn find_department_ids_by_name(
        &self,
        organization_id: i64,
        name: &str,
    ) -> AppResult<Vec<i64>> {
        let departments = department_entity::Entity::find()
            .filter(department_entity::Column::OrganizationId.eq(organization_id))
            .filter(
                Expr::expr(Func::lower(Expr::col(department_entity::Column::Name)))
                    .eq(name.trim().to_lowercase()),
            )
            .order_by_asc(department_entity::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(departments.into_iter().map(|d| d.id).collect())
    }

    async fn fetch_department_names(
        &self,
        organization_id: i64,
        ids: &[i64],
    ) -> AppResult<Vec<(i64, String)>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let departments = department_entity::Entity::find()
            .filter(department_entity::Column::OrganizationId.eq(organization_id))
            .filter(department_entity::Column::Id.is_in(ids.iter().copied()))
            .all(&self.pool)
            .await?;
        Ok(departments.into_iter().map(|d| (d.id, d.name)).collect())
    }

    async fn fetch_biometric_window(
        &self,
        member_ids: &[i64],
        window: Window,
    ) -> AppResult<Vec<BiometricRecord>> {
        if member_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query = biometric_entity::Entity::find()
            .filter(
                biometric_entity::Column::OrganizationMemberId.is_in(member_ids.iter().copied()),
            )
            .filter(biometric_entity::Column::IsActive.eq(true))
            .filter(
                Expr::expr(Func::lower(Expr::col(biometric_entity::Column::BiometricType)))
                    .like("%fingerprint%"),
            );
        if let Some(after) = window.after {
            query = query.filter(biometric_entity::Column::Id.gt(after));
        }

        let rows = query
            .order_by_asc(biometric_entity::Column::Id)
            .limit(window.limit)
            .all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(BiometricRecord::from).collect())
    }
}
