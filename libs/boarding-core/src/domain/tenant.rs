use crate::CoreError;
use crate::domain::billing::{BillingPeriod, validate_amount};
use crate::domain::room::{RoomCatalog, RoomNo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Tenant Document ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub phone: String,
    pub room_no: RoomNo,
    pub rent_amount: f64,
    pub electricity_share: f64,
    pub water_share: f64,
    pub key_money_amount: f64,
    pub is_key_money_paid: bool,
    pub last_paid_month: Option<BillingPeriod>,
    pub last_paid_at: Option<DateTime<Utc>>,
    pub joined_at: DateTime<Utc>,
    pub version: u64,
}

impl Tenant {
    /// Build a new tenant document from validated landlord input.
    /// Utility shares start at zero and no period is marked paid.
    pub fn create(
        id: String,
        owner_id: &str,
        input: NewTenant,
        rooms: &RoomCatalog,
        joined_at: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        if id.is_empty() {
            return Err(CoreError::Validation("Tenant ID cannot be empty".into()));
        }
        if owner_id.is_empty() {
            return Err(CoreError::NotAuthenticated);
        }
        let name = required_text("Name", &input.name)?;
        let phone = required_text("Phone", &input.phone)?;
        let room_no = rooms.parse(&input.room_no)?;
        let rent_amount = validate_amount("Rent amount", input.rent_amount)?;
        let key_money_amount = validate_amount("Key money amount", input.key_money_amount)?;

        Ok(Self {
            id,
            owner_id: owner_id.to_string(),
            name,
            phone,
            room_no,
            rent_amount,
            electricity_share: 0.0,
            water_share: 0.0,
            key_money_amount,
            is_key_money_paid: input.is_key_money_paid,
            last_paid_month: None,
            last_paid_at: None,
            joined_at,
            version: 1,
        })
    }

    /// Rent plus the current utility shares.
    pub fn total_due(&self) -> f64 {
        self.rent_amount + self.electricity_share + self.water_share
    }

    pub fn is_paid_for(&self, period: BillingPeriod) -> bool {
        self.last_paid_month == Some(period)
    }

    /// Apply a field update in place and bump the version.
    pub fn apply(&mut self, update: &TenantUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(phone) = &update.phone {
            self.phone = phone.clone();
        }
        if let Some(room_no) = &update.room_no {
            self.room_no = room_no.clone();
        }
        if let Some(rent_amount) = update.rent_amount {
            self.rent_amount = rent_amount;
        }
        if let Some(key_money_amount) = update.key_money_amount {
            self.key_money_amount = key_money_amount;
        }
        if let Some(is_key_money_paid) = update.is_key_money_paid {
            self.is_key_money_paid = is_key_money_paid;
        }
        if let Some(electricity_share) = update.electricity_share {
            self.electricity_share = electricity_share;
        }
        if let Some(water_share) = update.water_share {
            self.water_share = water_share;
        }
        if let Some(last_paid_month) = update.last_paid_month {
            self.last_paid_month = last_paid_month;
        }
        if let Some(last_paid_at) = update.last_paid_at {
            self.last_paid_at = last_paid_at;
        }
        self.version += 1;
    }
}

fn required_text(field: &str, value: &str) -> Result<String, CoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::Validation(format!("{} cannot be empty", field)));
    }
    Ok(value.to_string())
}

// --- Inputs ---

/// Landlord input for a new tenant.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTenant {
    pub name: String,
    pub phone: String,
    pub room_no: String,
    pub rent_amount: f64,
    #[serde(default)]
    pub key_money_amount: f64,
    #[serde(default)]
    pub is_key_money_paid: bool,
}

/// Landlord edit of an existing tenant. Absent fields are left untouched.
/// Shares and payment state are not editable here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub room_no: Option<String>,
    pub rent_amount: Option<f64>,
    pub key_money_amount: Option<f64>,
    pub is_key_money_paid: Option<bool>,
}

impl TenantPatch {
    pub fn into_update(self, rooms: &RoomCatalog) -> Result<TenantUpdate, CoreError> {
        let update = TenantUpdate {
            name: self.name.as_deref().map(|n| required_text("Name", n)).transpose()?,
            phone: self
                .phone
                .as_deref()
                .map(|p| required_text("Phone", p))
                .transpose()?,
            room_no: self.room_no.as_deref().map(|r| rooms.parse(r)).transpose()?,
            rent_amount: self
                .rent_amount
                .map(|a| validate_amount("Rent amount", a))
                .transpose()?,
            key_money_amount: self
                .key_money_amount
                .map(|a| validate_amount("Key money amount", a))
                .transpose()?,
            is_key_money_paid: self.is_key_money_paid,
            ..TenantUpdate::default()
        };
        if update.is_empty() {
            return Err(CoreError::Validation("Nothing to update".into()));
        }
        Ok(update)
    }
}

// --- Store Update ---

/// Field-level write against a tenant document. `None` leaves a field as is;
/// for the nullable payment fields, `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TenantUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub room_no: Option<RoomNo>,
    pub rent_amount: Option<f64>,
    pub key_money_amount: Option<f64>,
    pub is_key_money_paid: Option<bool>,
    pub electricity_share: Option<f64>,
    pub water_share: Option<f64>,
    pub last_paid_month: Option<Option<BillingPeriod>>,
    pub last_paid_at: Option<Option<DateTime<Utc>>>,
}

impl TenantUpdate {
    /// New utility shares from a bill distribution.
    pub fn shares(electricity_share: f64, water_share: f64) -> Self {
        Self {
            electricity_share: Some(electricity_share),
            water_share: Some(water_share),
            ..Self::default()
        }
    }

    /// Close out `period`: record the payment and zero the utility shares.
    pub fn mark_paid(period: BillingPeriod, paid_at: DateTime<Utc>) -> Self {
        Self {
            electricity_share: Some(0.0),
            water_share: Some(0.0),
            last_paid_month: Some(Some(period)),
            last_paid_at: Some(Some(paid_at)),
            ..Self::default()
        }
    }

    /// Forget the recorded payment.
    pub fn clear_payment() -> Self {
        Self {
            last_paid_month: Some(None),
            last_paid_at: Some(None),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::joined;
    use super::*;

    fn new_tenant() -> NewTenant {
        NewTenant {
            name: "  Kasun Perera ".to_string(),
            phone: "0771234567".to_string(),
            room_no: "Room 01".to_string(),
            rent_amount: 8500.0,
            key_money_amount: 20000.0,
            is_key_money_paid: true,
        }
    }

    #[test]
    fn create_initialises_billing_state() {
        let rooms = RoomCatalog::default();
        let tenant =
            Tenant::create("t-1".into(), "owner-1", new_tenant(), &rooms, joined()).unwrap();

        assert_eq!(tenant.name, "Kasun Perera");
        assert_eq!(tenant.owner_id, "owner-1");
        assert_eq!(tenant.room_no.as_str(), "Room 01");
        assert_eq!(tenant.electricity_share, 0.0);
        assert_eq!(tenant.water_share, 0.0);
        assert_eq!(tenant.last_paid_month, None);
        assert_eq!(tenant.last_paid_at, None);
        assert_eq!(tenant.version, 1);
        assert!(tenant.is_key_money_paid);
    }

    #[test]
    fn create_rejects_bad_input() {
        let rooms = RoomCatalog::default();

        let mut no_name = new_tenant();
        no_name.name = "   ".into();
        assert!(matches!(
            Tenant::create("t".into(), "o", no_name, &rooms, joined()),
            Err(CoreError::Validation(msg)) if msg.contains("Name")
        ));

        let mut no_phone = new_tenant();
        no_phone.phone = "".into();
        assert!(matches!(
            Tenant::create("t".into(), "o", no_phone, &rooms, joined()),
            Err(CoreError::Validation(msg)) if msg.contains("Phone")
        ));

        let mut bad_room = new_tenant();
        bad_room.room_no = "Penthouse".into();
        assert!(matches!(
            Tenant::create("t".into(), "o", bad_room, &rooms, joined()),
            Err(CoreError::Validation(_))
        ));

        let mut negative_rent = new_tenant();
        negative_rent.rent_amount = -1.0;
        assert!(matches!(
            Tenant::create("t".into(), "o", negative_rent, &rooms, joined()),
            Err(CoreError::InvalidAmount(_))
        ));

        let mut negative_key_money = new_tenant();
        negative_key_money.key_money_amount = -5.0;
        assert!(matches!(
            Tenant::create("t".into(), "o", negative_key_money, &rooms, joined()),
            Err(CoreError::InvalidAmount(_))
        ));

        assert!(matches!(
            Tenant::create("t".into(), "", new_tenant(), &rooms, joined()),
            Err(CoreError::NotAuthenticated)
        ));
    }

    #[test]
    fn total_due_adds_rent_and_shares() {
        let rooms = RoomCatalog::default();
        let mut tenant =
            Tenant::create("t-1".into(), "owner-1", new_tenant(), &rooms, joined()).unwrap();
        tenant.apply(&TenantUpdate::shares(1500.0, 400.0));
        assert_eq!(tenant.total_due(), 8500.0 + 1500.0 + 400.0);
    }

    #[test]
    fn mark_paid_zeroes_shares_and_records_period() {
        let rooms = RoomCatalog::default();
        let mut tenant =
            Tenant::create("t-1".into(), "owner-1", new_tenant(), &rooms, joined()).unwrap();
        tenant.apply(&TenantUpdate::shares(1500.0, 400.0));
        let period = BillingPeriod::new(2026, 1).unwrap();

        tenant.apply(&TenantUpdate::mark_paid(period, joined()));

        assert_eq!(tenant.electricity_share, 0.0);
        assert_eq!(tenant.water_share, 0.0);
        assert!(tenant.is_paid_for(period));
        assert_eq!(tenant.last_paid_at, Some(joined()));
        assert_eq!(tenant.version, 3);

        tenant.apply(&TenantUpdate::clear_payment());
        assert!(!tenant.is_paid_for(period));
        assert_eq!(tenant.last_paid_at, None);
    }

    #[test]
    fn patch_validates_supplied_fields_only() {
        let rooms = RoomCatalog::default();
        let update = TenantPatch {
            rent_amount: Some(9000.0),
            room_no: Some("Room 03".into()),
            ..TenantPatch::default()
        }
        .into_update(&rooms)
        .unwrap();
        assert_eq!(update.rent_amount, Some(9000.0));
        assert_eq!(update.room_no.as_ref().map(RoomNo::as_str), Some("Room 03"));
        assert_eq!(update.name, None);
        assert_eq!(update.electricity_share, None);

        let bad = TenantPatch {
            name: Some(" ".into()),
            ..TenantPatch::default()
        };
        assert!(matches!(bad.into_update(&rooms), Err(CoreError::Validation(_))));

        let negative = TenantPatch {
            rent_amount: Some(-10.0),
            ..TenantPatch::default()
        };
        assert!(matches!(
            negative.into_update(&rooms),
            Err(CoreError::InvalidAmount(_))
        ));
    }

    #[test]
    fn empty_patch_is_rejected() {
        let rooms = RoomCatalog::default();
        assert!(matches!(
            TenantPatch::default().into_update(&rooms),
            Err(CoreError::Validation(msg)) if msg.contains("Nothing")
        ));
    }

    #[test]
    fn tenant_round_trips_through_json() {
        let rooms = RoomCatalog::default();
        let mut tenant =
            Tenant::create("t-1".into(), "owner-1", new_tenant(), &rooms, joined()).unwrap();
        tenant.apply(&TenantUpdate::mark_paid(
            BillingPeriod::new(2026, 2).unwrap(),
            joined(),
        ));
        let value = serde_json::to_value(&tenant).unwrap();
        assert_eq!(value["last_paid_month"], "2026-02");
        assert_eq!(value["room_no"], "Room 01");
        let back: Tenant = serde_json::from_value(value).unwrap();
        assert_eq!(back, tenant);
    }
}
