use crate::config::EnrollmentConfig;
use crate::error::AppResult;
use crate::models::*;
use crate::services::enrollment_store::{EnrollmentStore, MemberFilter, SeaOrmEnrollmentStore};
use crate::services::slot_classifier::{SlotSet, resolve_slots};
use crate::utils::KeysetPager;
use sea_orm::DatabaseConnection;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// Fingerprint enrollment listing and summary for one organization.
///
/// Every call rebuilds its state from the store; nothing is cached
/// between requests.
#[derive(Clone)]
pub struct EnrollmentService<S = SeaOrmEnrollmentStore> {
    store: S,
    limits: EnrollmentConfig,
}

impl EnrollmentService {
    pub fn new(pool: DatabaseConnection, limits: EnrollmentConfig) -> Self {
        Self::with_store(SeaOrmEnrollmentStore::new(pool), limits)
    }
}

impl<S: EnrollmentStore> EnrollmentService<S> {
    pub fn with_store(store: S, limits: EnrollmentConfig) -> Self {
        Self {
            store,
            limits: limits.sanitized(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// An explicit organization id wins; otherwise the caller's first active
    /// membership. `None` when neither is available.
    pub async fn resolve_organization(
        &self,
        explicit: Option<i64>,
        user_id: Option<Uuid>,
    ) -> AppResult<Option<OrganizationContext>> {
        if let Some(id) = explicit {
            return Ok(Some(OrganizationContext::new(id)));
        }
        let Some(user_id) = user_id else {
            return Ok(None);
        };
        let organization_id = self.store.find_user_organization(user_id).await?;
        Ok(organization_id.map(OrganizationContext::new))
    }

    /// 获取成员指纹登记列表（过滤 + 分页）
    pub async fn list_members(
        &self,
        ctx: Option<OrganizationContext>,
        params: &MemberListParams,
    ) -> AppResult<MemberListResponse> {
        let Some(ctx) = ctx else {
            log::info!("No organization resolved for enrollment listing");
            return Ok(MemberListResponse::empty(params.limit));
        };
        let organization_id = ctx.organization_id;

        let mut filter = MemberFilter {
            search: params.search.clone(),
            department_ids: None,
        };
        if let Some(name) = &params.department {
            let ids = self
                .store
                .find_department_ids_by_name(organization_id, name)
                .await?;
            if ids.is_empty() {
                log::info!(
                    "Department filter {name:?} not found in organization {organization_id}"
                );
                return Ok(MemberListResponse::empty(params.limit));
            }
            filter.department_ids = Some(ids);
        }

        let members = self.fetch_members(organization_id, &filter).await?;

        // filter options always come from the unfiltered member set
        let all_department_ids: BTreeSet<i64> = if filter.is_unfiltered() {
            members.iter().filter_map(|m| m.department_id).collect()
        } else {
            self.fetch_members(organization_id, &MemberFilter::default())
                .await?
                .iter()
                .filter_map(|m| m.department_id)
                .collect()
        };
        let mut department_ids = all_department_ids.clone();
        department_ids.extend(members.iter().filter_map(|m| m.department_id));
        let department_names = self
            .department_names(organization_id, &department_ids)
            .await?;
        let departments: Vec<String> = all_department_ids
            .iter()
            .filter_map(|id| department_names.get(id).cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let member_ids: Vec<i64> = members.iter().map(|m| m.id).collect();
        let slots = self.fetch_slots(&member_ids).await?;

        let empty = SlotSet::new();
        let rows: Vec<MemberEnrollmentView> = members
            .into_iter()
            .map(|member| {
                let department = member
                    .department_id
                    .and_then(|id| department_names.get(&id))
                    .map(String::as_str);
                let member_slots = slots.get(&member.id).unwrap_or(&empty);
                MemberEnrollmentView::build(member, department, member_slots)
            })
            .filter(|view| params.status.matches(view.status))
            .collect();

        let pagination = PaginationInfo::new(params.page, params.limit, rows.len() as u64);
        log::debug!(
            "Enrollment listing org={organization_id} matched={} page={}/{}",
            pagination.total,
            pagination.page,
            pagination.total_pages
        );

        Ok(MemberListResponse {
            success: true,
            data: pagination.slice(rows),
            pagination,
            filters: FilterOptions { departments },
        })
    }

    /// Counts per status over all active members.
    pub async fn enrollment_stats(
        &self,
        ctx: Option<OrganizationContext>,
    ) -> AppResult<EnrollmentStats> {
        let Some(ctx) = ctx else {
            return Ok(EnrollmentStats::default());
        };

        let members = self
            .fetch_members(ctx.organization_id, &MemberFilter::default())
            .await?;
        let member_ids: Vec<i64> = members.iter().map(|m| m.id).collect();
        let slots = self.fetch_slots(&member_ids).await?;

        let mut stats = EnrollmentStats::default();
        for id in &member_ids {
            let count = slots.get(id).map_or(0, |s| s.len());
            stats.record(EnrollmentStatus::from_slot_count(count));
        }
        log::info!(
            "Enrollment stats org={} total={} complete={} partial={} unregistered={}",
            ctx.organization_id,
            stats.total,
            stats.complete,
            stats.partial,
            stats.unregistered
        );
        Ok(stats)
    }

    /// Every matching member, walked window by window in id order.
    async fn fetch_members(
        &self,
        organization_id: i64,
        filter: &MemberFilter,
    ) -> AppResult<Vec<MemberRow>> {
        let mut pager = KeysetPager::new(self.limits.member_window);
        let mut members = Vec::new();
        while let Some(window) = pager.next_window() {
            let batch = self
                .store
                .fetch_member_window(organization_id, filter, window)
                .await
                .inspect_err(|e| {
                    log::error!(
                        "Member window after {:?} failed for org {organization_id}: {e}",
                        window.after
                    )
                })?;
            pager.advance(batch.len(), batch.last().map(|m| m.id));
            members.extend(batch);
        }
        log::debug!(
            "Fetched {} members for org {organization_id} in {} windows",
            members.len(),
            pager.windows_fetched()
        );
        Ok(members)
    }

    /// Slot sets for `member_ids`, loaded one id chunk at a time. A member's
    /// records all fall inside one chunk, so each chunk is classified alone.
    async fn fetch_slots(&self, member_ids: &[i64]) -> AppResult<HashMap<i64, SlotSet>> {
        let mut slots = HashMap::new();
        for chunk in member_ids.chunks(self.limits.record_id_chunk) {
            let mut pager = KeysetPager::new(self.limits.record_window);
            let mut records = Vec::new();
            while let Some(window) = pager.next_window() {
                let batch = self
                    .store
                    .fetch_biometric_window(chunk, window)
                    .await
                    .inspect_err(|e| log::error!("Biometric window fetch failed: {e}"))?;
                pager.advance(batch.len(), batch.last().map(|r| r.id));
                records.extend(batch);
            }
            slots.extend(resolve_slots(&records));
        }
        Ok(slots)
    }

    async fn department_names(
        &self,
        organization_id: i64,
        ids: &BTreeSet<i64>,
    ) -> AppResult<HashMap<i64, String>> {
        let ids: Vec<i64> = ids.iter().copied().collect();
        let mut names = HashMap::with_capacity(ids.len());
        for chunk in ids.chunks(self.limits.record_id_chunk) {
            names.extend(
                self.store
                    .fetch_department_names(organization_id, chunk)
                    .await?,
            );
        }
        Ok(names)
    }
}
