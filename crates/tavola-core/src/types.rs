//! # Domain Types
//!
//! Entities managed by the back-office settings screens.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Settings Entities                               │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Charges      │   │    Customer     │   │   MarketItem    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  charges_id     │   │  customer_id    │   │  item_id        │       │
//! │  │  name, price    │   │  name, phone    │   │  name, price    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Employee     │◄──│     Absent      │   │    Payment      │──►    │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │ Emp.  │
//! │  │  employee_id    │   │  absent_id      │   │  payment_id     │       │
//! │  │  salary, type   │   │  employee_id    │   │  employee_id    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Selection Identity
//! Every entity exposes the identity the selection ledger tracks through
//! [`Entity::entity_id`]. For most kinds this is the primary key. Absences
//! and payments are listed and selected per employee, so their identity is
//! the `employee_id` and several rows can share one selected id.

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, ValidationError};
use crate::validation::{self, ValidationResult};

// =============================================================================
// Entity Contract
// =============================================================================

/// A business record the settings controller can search, select, export and
/// import.
///
/// The controller treats entities as opaque values; it only needs the
/// selection identity and a text match.
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Identity type tracked by the selection ledger.
    type Id: Copy + Eq + Ord + Hash + Debug + Display + Send + Sync + 'static;

    /// Display name of the entity kind (used in logs and events).
    const KIND: &'static str;

    /// Returns the identity tracked by the selection ledger.
    fn entity_id(&self) -> Self::Id;

    /// Returns the primary key of the record.
    ///
    /// Equal to [`Entity::entity_id`] except for kinds selected per parent.
    fn record_id(&self) -> Self::Id {
        self.entity_id()
    }

    /// Returns true if this entity matches a free-text search query.
    ///
    /// An empty (or whitespace) query matches everything.
    fn matches(&self, query: &str) -> bool;

    /// Validates user-editable fields before a single record is written.
    fn validate(&self) -> ValidationResult<()> {
        Ok(())
    }
}

/// Case-insensitive substring match of `query` against any of `fields`.
pub fn text_matches(query: &str, fields: &[&str]) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }

    let needle = query.to_lowercase();
    fields.iter().any(|f| f.to_lowercase().contains(&needle))
}

// =============================================================================
// Entity Kind
// =============================================================================

/// The settings screens that exist, one per entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Charges,
    Customer,
    Employee,
    Absent,
    Payment,
    MarketItem,
}

impl EntityKind {
    /// All kinds, in menu order.
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Charges,
        EntityKind::Customer,
        EntityKind::Employee,
        EntityKind::Absent,
        EntityKind::Payment,
        EntityKind::MarketItem,
    ];

    /// Returns the entity display name.
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Charges => Charges::KIND,
            EntityKind::Customer => Customer::KIND,
            EntityKind::Employee => Employee::KIND,
            EntityKind::Absent => Absent::KIND,
            EntityKind::Payment => Payment::KIND,
            EntityKind::MarketItem => MarketItem::KIND,
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "charges" | "charge" => Ok(EntityKind::Charges),
            "customer" | "customers" => Ok(EntityKind::Customer),
            "employee" | "employees" => Ok(EntityKind::Employee),
            "absent" | "absents" | "absence" | "absences" => Ok(EntityKind::Absent),
            "payment" | "payments" => Ok(EntityKind::Payment),
            "market-item" | "market-items" | "marketitem" | "market" => {
                Ok(EntityKind::MarketItem)
            }
            other => Err(CoreError::UnknownKind(other.to_string())),
        }
    }
}

// =============================================================================
// Charges
// =============================================================================

/// An extra charge applied to orders (packing, delivery, service...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Charges {
    pub charges_id: i64,

    pub charges_name: String,

    /// Price in the smallest currency unit.
    pub charges_price: i64,

    /// Whether the charge is applied to new orders.
    pub is_applicable: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Charges {
    /// Creates an applicable charge stamped with the current time.
    pub fn new(charges_id: i64, name: impl Into<String>, price: i64) -> Self {
        Charges {
            charges_id,
            charges_name: name.into(),
            charges_price: price,
            is_applicable: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

impl Entity for Charges {
    type Id = i64;
    const KIND: &'static str = "Charges";

    fn entity_id(&self) -> i64 {
        self.charges_id
    }

    fn matches(&self, query: &str) -> bool {
        text_matches(
            query,
            &[&self.charges_name, &self.charges_price.to_string()],
        )
    }

    fn validate(&self) -> ValidationResult<()> {
        validation::validate_name("charges_name", &self.charges_name)?;
        validation::validate_positive("charges_price", self.charges_price)
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A restaurant customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub customer_id: i64,

    pub customer_name: String,

    pub customer_phone: String,

    pub customer_email: Option<String>,

    pub customer_address: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// Creates a customer with only the required fields.
    pub fn new(customer_id: i64, name: impl Into<String>, phone: impl Into<String>) -> Self {
        Customer {
            customer_id,
            customer_name: name.into(),
            customer_phone: phone.into(),
            customer_email: None,
            customer_address: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

impl Entity for Customer {
    type Id = i64;
    const KIND: &'static str = "Customer";

    fn entity_id(&self) -> i64 {
        self.customer_id
    }

    fn matches(&self, query: &str) -> bool {
        text_matches(
            query,
            &[
                &self.customer_name,
                &self.customer_phone,
                self.customer_email.as_deref().unwrap_or_default(),
                self.customer_address.as_deref().unwrap_or_default(),
            ],
        )
    }

    fn validate(&self) -> ValidationResult<()> {
        validation::validate_name("customer_name", &self.customer_name)?;
        validation::validate_phone("customer_phone", &self.customer_phone)?;
        if let Some(email) = self.customer_email.as_deref().filter(|e| !e.is_empty()) {
            validation::validate_email("customer_email", email)?;
        }
        Ok(())
    }
}

// =============================================================================
// Employee
// =============================================================================

/// How an employee's salary is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SalaryType {
    #[default]
    Monthly,
    Daily,
}

/// A restaurant employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Employee {
    pub employee_id: i64,

    /// Short human-readable code printed on pay slips.
    pub employee_uid: String,

    pub employee_name: String,

    pub employee_phone: String,

    /// Salary in the smallest currency unit, per `employee_salary_type`.
    pub employee_salary: i64,

    pub employee_salary_type: SalaryType,

    pub employee_position: String,

    #[ts(as = "String")]
    pub employee_joined_date: NaiveDate,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Employee {
    /// Creates a monthly-salaried employee who joined today.
    pub fn new(employee_id: i64, name: impl Into<String>, phone: impl Into<String>, salary: i64) -> Self {
        let now = Utc::now();
        Employee {
            employee_id,
            employee_uid: format!("EMP{employee_id:03}"),
            employee_name: name.into(),
            employee_phone: phone.into(),
            employee_salary: salary,
            employee_salary_type: SalaryType::Monthly,
            employee_position: String::new(),
            employee_joined_date: now.date_naive(),
            created_at: now,
            updated_at: None,
        }
    }
}

impl Entity for Employee {
    type Id = i64;
    const KIND: &'static str = "Employee";

    fn entity_id(&self) -> i64 {
        self.employee_id
    }

    fn matches(&self, query: &str) -> bool {
        text_matches(
            query,
            &[
                &self.employee_uid,
                &self.employee_name,
                &self.employee_phone,
                &self.employee_position,
            ],
        )
    }

    fn validate(&self) -> ValidationResult<()> {
        validation::validate_name("employee_name", &self.employee_name)?;
        validation::validate_phone("employee_phone", &self.employee_phone)?;
        validation::validate_positive("employee_salary", self.employee_salary)
    }
}

// =============================================================================
// Absent
// =============================================================================

/// One day an employee was absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Absent {
    pub absent_id: i64,

    pub employee_id: i64,

    #[ts(as = "String")]
    pub absent_date: NaiveDate,

    pub absent_reason: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Absent {
    /// Creates an absence record.
    pub fn new(absent_id: i64, employee_id: i64, date: NaiveDate, reason: impl Into<String>) -> Self {
        Absent {
            absent_id,
            employee_id,
            absent_date: date,
            absent_reason: reason.into(),
            created_at: Utc::now(),
        }
    }
}

impl Entity for Absent {
    type Id = i64;
    const KIND: &'static str = "Absent";

    /// Absences are selected per employee.
    fn entity_id(&self) -> i64 {
        self.employee_id
    }

    fn record_id(&self) -> i64 {
        self.absent_id
    }

    fn matches(&self, query: &str) -> bool {
        text_matches(
            query,
            &[&self.absent_reason, &self.absent_date.to_string()],
        )
    }
}

// =============================================================================
// Payment
// =============================================================================

/// Kind of salary payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Regular salary payout.
    #[default]
    Paid,
    /// Advance against next salary.
    Advance,
    Bonus,
}

impl Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentType::Paid => write!(f, "paid"),
            PaymentType::Advance => write!(f, "advance"),
            PaymentType::Bonus => write!(f, "bonus"),
        }
    }
}

/// A salary payment made to an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub payment_id: i64,

    pub employee_id: i64,

    /// Amount in the smallest currency unit.
    pub payment_amount: i64,

    pub payment_type: PaymentType,

    #[ts(as = "String")]
    pub payment_date: NaiveDate,

    pub payment_note: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a regular salary payment.
    pub fn new(payment_id: i64, employee_id: i64, amount: i64, date: NaiveDate) -> Self {
        Payment {
            payment_id,
            employee_id,
            payment_amount: amount,
            payment_type: PaymentType::Paid,
            payment_date: date,
            payment_note: None,
            created_at: Utc::now(),
        }
    }
}

impl Entity for Payment {
    type Id = i64;
    const KIND: &'static str = "Payment";

    /// Payments are selected per employee.
    fn entity_id(&self) -> i64 {
        self.employee_id
    }

    fn record_id(&self) -> i64 {
        self.payment_id
    }

    fn matches(&self, query: &str) -> bool {
        text_matches(
            query,
            &[
                &self.payment_amount.to_string(),
                &self.payment_type.to_string(),
                &self.payment_date.to_string(),
                self.payment_note.as_deref().unwrap_or_default(),
            ],
        )
    }

    fn validate(&self) -> ValidationResult<()> {
        validation::validate_positive("payment_amount", self.payment_amount)
    }
}

// =============================================================================
// Market Item
// =============================================================================

/// An item on the market (inventory purchase) list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct MarketItem {
    pub item_id: i64,

    pub item_name: String,

    /// Free-form grouping (vegetables, dairy, spices...).
    pub item_type: String,

    /// Price per `item_measure` in the smallest currency unit.
    pub item_price: i64,

    /// Unit of measure (kg, litre, piece...).
    pub item_measure: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl MarketItem {
    /// Creates a market item priced per kilogram.
    pub fn new(item_id: i64, name: impl Into<String>, item_type: impl Into<String>, price: i64) -> Self {
        MarketItem {
            item_id,
            item_name: name.into(),
            item_type: item_type.into(),
            item_price: price,
            item_measure: "kg".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

impl Entity for MarketItem {
    type Id = i64;
    const KIND: &'static str = "MarketItem";

    fn entity_id(&self) -> i64 {
        self.item_id
    }

    fn matches(&self, query: &str) -> bool {
        text_matches(
            query,
            &[&self.item_name, &self.item_type, &self.item_measure],
        )
    }

    fn validate(&self) -> ValidationResult<()> {
        validation::validate_name("item_name", &self.item_name)?;
        if self.item_measure.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "item_measure".to_string(),
            });
        }
        validation::validate_positive("item_price", self.item_price)
    }
}
