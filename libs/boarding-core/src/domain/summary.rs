use crate::domain::billing::BillingPeriod;
use crate::domain::room::{RoomCatalog, RoomNo};
use crate::domain::tenant::Tenant;
use serde::Serialize;
use std::collections::HashSet;

/// A tenant as shown to the landlord, with derived payment figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenantView {
    #[serde(flatten)]
    pub tenant: Tenant,
    pub total_due: f64,
    pub paid_this_period: bool,
}

impl TenantView {
    pub fn new(tenant: Tenant, period: BillingPeriod) -> Self {
        Self {
            total_due: tenant.total_due(),
            paid_this_period: tenant.is_paid_for(period),
            tenant,
        }
    }
}

/// Case-insensitive match on tenant name or room label.
pub fn matches_search(tenant: &Tenant, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    needle.is_empty()
        || tenant.name.to_lowercase().contains(&needle)
        || tenant.room_no.as_str().to_lowercase().contains(&needle)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomSummary {
    pub room_no: RoomNo,
    pub tenant_count: usize,
    pub paid_this_period: usize,
    /// Whether a bill distribution would currently be accepted.
    pub distribution_open: bool,
}

pub fn summarize_rooms(
    rooms: &RoomCatalog,
    tenants: &[Tenant],
    period: BillingPeriod,
) -> Vec<RoomSummary> {
    rooms
        .rooms()
        .map(|room_no| {
            let occupants: Vec<&Tenant> = tenants.iter().filter(|t| t.room_no == room_no).collect();
            let paid = occupants.iter().filter(|t| t.is_paid_for(period)).count();
            RoomSummary {
                tenant_count: occupants.len(),
                paid_this_period: paid,
                distribution_open: !occupants.is_empty() && paid == 0,
                room_no,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub period: BillingPeriod,
    pub tenant_count: usize,
    pub occupied_rooms: usize,
    pub expected_rent: f64,
    pub outstanding_amount: f64,
    pub unpaid_tenants: usize,
}

impl DashboardSummary {
    pub fn from_tenants(tenants: &[Tenant], period: BillingPeriod) -> Self {
        let occupied: HashSet<&RoomNo> = tenants.iter().map(|t| &t.room_no).collect();
        let unpaid: Vec<&Tenant> = tenants.iter().filter(|t| !t.is_paid_for(period)).collect();
        Self {
            period,
            tenant_count: tenants.len(),
            occupied_rooms: occupied.len(),
            expected_rent: tenants.iter().map(|t| t.rent_amount).sum(),
            outstanding_amount: unpaid.iter().map(|t| t.total_due()).sum(),
            unpaid_tenants: unpaid.len(),
        }
    }
}
