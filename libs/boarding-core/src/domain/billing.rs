use crate::CoreError;
use crate::domain::room::RoomNo;
use crate::domain::tenant::{Tenant, TenantUpdate};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// --- Billing Period ---

/// A calendar month, rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BillingPeriod {
    year: i32,
    month: u32,
}

impl BillingPeriod {
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::Validation(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }
        if !(0..=9999).contains(&year) {
            return Err(CoreError::Validation(format!(
                "Year must have four digits, got {}",
                year
            )));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for BillingPeriod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::Validation(format!("Invalid billing period: {}", s));
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for BillingPeriod {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BillingPeriod> for String {
    fn from(period: BillingPeriod) -> Self {
        period.to_string()
    }
}

// --- Amounts ---

/// Check that a monetary value is usable: finite and not negative.
pub fn validate_amount(field: &str, amount: f64) -> Result<f64, CoreError> {
    if !amount.is_finite() {
        return Err(CoreError::InvalidAmount(format!("{} must be a number", field)));
    }
    if amount < 0.0 {
        return Err(CoreError::InvalidAmount(format!(
            "{} cannot be negative",
            field
        )));
    }
    Ok(amount)
}

/// Read an amount from loosely-typed input. Accepts JSON numbers and numeric
/// strings (form fields arrive as text); anything else is `InvalidAmount`.
pub fn parse_amount(field: &str, value: &Value) -> Result<f64, CoreError> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Null => {
            return Err(CoreError::InvalidAmount(format!("{} is required", field)));
        }
        _ => None,
    };
    match amount {
        Some(amount) => validate_amount(field, amount),
        None => Err(CoreError::InvalidAmount(format!("{} must be a number", field))),
    }
}

/// Validated aggregate utility bills for one room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtilityTotals {
    electricity: f64,
    water: f64,
}

impl UtilityTotals {
    pub fn new(electricity: f64, water: f64) -> Result<Self, CoreError> {
        Ok(Self {
            electricity: validate_amount("Electricity total", electricity)?,
            water: validate_amount("Water total", water)?,
        })
    }

    pub fn from_json(electricity: &Value, water: &Value) -> Result<Self, CoreError> {
        Ok(Self {
            electricity: parse_amount("Electricity total", electricity)?,
            water: parse_amount("Water total", water)?,
        })
    }

    pub fn electricity(&self) -> f64 {
        self.electricity
    }

    pub fn water(&self) -> f64 {
        self.water
    }
}

// --- Write Batch ---

/// One guarded document write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct BatchWrite {
    pub tenant_id: String,
    pub expected_version: u64,
    pub update: TenantUpdate,
}

/// A group of tenant updates that a store applies all together or not at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    writes: Vec<BatchWrite>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, tenant_id: &str, expected_version: u64, update: TenantUpdate) {
        self.writes.push(BatchWrite {
            tenant_id: tenant_id.to_string(),
            expected_version,
            update,
        });
    }

    pub fn writes(&self) -> &[BatchWrite] {
        &self.writes
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

// --- Distribution ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenantShare {
    pub tenant_id: String,
    pub name: String,
    pub electricity_share: f64,
    pub water_share: f64,
}

/// Result of a successful distribution, as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillSplit {
    pub room_no: RoomNo,
    pub period: BillingPeriod,
    pub tenant_count: usize,
    pub total_electricity: f64,
    pub total_water: f64,
    pub electricity_share: f64,
    pub water_share: f64,
    pub tenants: Vec<TenantShare>,
}

/// Everything needed to persist a distribution: the batch to commit and the
/// summary to return once it has been committed.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionPlan {
    pub batch: WriteBatch,
    pub split: BillSplit,
}

/// Work out how a room's bills are split across `occupants`.
///
/// Fails when the room is empty, or when any occupant has already paid for
/// `period`; in that case the first paid occupant is named in the error.
pub fn plan_distribution(
    room_no: &RoomNo,
    totals: UtilityTotals,
    occupants: &[Tenant],
    period: BillingPeriod,
) -> Result<DistributionPlan, CoreError> {
    if occupants.is_empty() {
        return Err(CoreError::NoTenantsInRoom(room_no.to_string()));
    }

    if let Some(paid) = occupants.iter().find(|t| t.is_paid_for(period)) {
        return Err(CoreError::AlreadyPaidConflict {
            tenant_id: paid.id.clone(),
            tenant_name: paid.name.clone(),
        });
    }

    let count = occupants.len();
    let electricity_share = totals.electricity() / count as f64;
    let water_share = totals.water() / count as f64;

    let mut batch = WriteBatch::new();
    let mut tenants = Vec::with_capacity(count);
    for tenant in occupants {
        batch.update(
            &tenant.id,
            tenant.version,
            TenantUpdate::shares(electricity_share, water_share),
        );
        tenants.push(TenantShare {
            tenant_id: tenant.id.clone(),
            name: tenant.name.clone(),
            electricity_share,
            water_share,
        });
    }

    Ok(DistributionPlan {
        batch,
        split: BillSplit {
            room_no: room_no.clone(),
            period,
            tenant_count: count,
            total_electricity: totals.electricity(),
            total_water: totals.water(),
            electricity_share,
            water_share,
            tenants,
        },
    })
}
