//! # Table Mappings
//!
//! How each entity maps onto its SQLite table.
//!
//! Column order in [`StoredEntity::COLUMNS`] is the bind order of
//! [`StoredEntity::bind_columns`]; the two must stay in step.

use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Sqlite};

use tavola_core::{Absent, Charges, Customer, Employee, Entity, MarketItem, Payment};

/// A parameterized SQLite statement.
pub type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// An entity persisted in its own SQLite table.
pub trait StoredEntity: Entity<Id = i64> + for<'r> FromRow<'r, SqliteRow> + Unpin {
    /// Table name.
    const TABLE: &'static str;

    /// Every column, primary key first.
    const COLUMNS: &'static [&'static str];

    /// `ORDER BY` clause for list queries.
    const ORDER_BY: &'static str;

    /// Binds every column value, in [`StoredEntity::COLUMNS`] order.
    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q>;
}

impl StoredEntity for Charges {
    const TABLE: &'static str = "charges";
    const COLUMNS: &'static [&'static str] = &[
        "charges_id",
        "charges_name",
        "charges_price",
        "is_applicable",
        "created_at",
        "updated_at",
    ];
    const ORDER_BY: &'static str = "charges_id";

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.charges_id)
            .bind(self.charges_name.as_str())
            .bind(self.charges_price)
            .bind(self.is_applicable)
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}

impl StoredEntity for Customer {
    const TABLE: &'static str = "customer";
    const COLUMNS: &'static [&'static str] = &[
        "customer_id",
        "customer_name",
        "customer_phone",
        "customer_email",
        "customer_address",
        "created_at",
        "updated_at",
    ];
    const ORDER_BY: &'static str = "customer_id";

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.customer_id)
            .bind(self.customer_name.as_str())
            .bind(self.customer_phone.as_str())
            .bind(self.customer_email.as_deref())
            .bind(self.customer_address.as_deref())
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}

impl StoredEntity for Employee {
    const TABLE: &'static str = "employee";
    const COLUMNS: &'static [&'static str] = &[
        "employee_id",
        "employee_uid",
        "employee_name",
        "employee_phone",
        "employee_salary",
        "employee_salary_type",
        "employee_position",
        "employee_joined_date",
        "created_at",
        "updated_at",
    ];
    const ORDER_BY: &'static str = "employee_id";

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.employee_id)
            .bind(self.employee_uid.as_str())
            .bind(self.employee_name.as_str())
            .bind(self.employee_phone.as_str())
            .bind(self.employee_salary)
            .bind(self.employee_salary_type)
            .bind(self.employee_position.as_str())
            .bind(self.employee_joined_date)
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}

impl StoredEntity for Absent {
    const TABLE: &'static str = "absent";
    const COLUMNS: &'static [&'static str] = &[
        "absent_id",
        "employee_id",
        "absent_date",
        "absent_reason",
        "created_at",
    ];
    const ORDER_BY: &'static str = "absent_id";

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.absent_id)
            .bind(self.employee_id)
            .bind(self.absent_date)
            .bind(self.absent_reason.as_str())
            .bind(self.created_at)
    }
}

impl StoredEntity for Payment {
    const TABLE: &'static str = "payment";
    const COLUMNS: &'static [&'static str] = &[
        "payment_id",
        "employee_id",
        "payment_amount",
        "payment_type",
        "payment_date",
        "payment_note",
        "created_at",
    ];
    const ORDER_BY: &'static str = "payment_id";

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.payment_id)
            .bind(self.employee_id)
            .bind(self.payment_amount)
            .bind(self.payment_type)
            .bind(self.payment_date)
            .bind(self.payment_note.as_deref())
            .bind(self.created_at)
    }
}

impl StoredEntity for MarketItem {
    const TABLE: &'static str = "market_item";
    const COLUMNS: &'static [&'static str] = &[
        "item_id",
        "item_name",
        "item_type",
        "item_price",
        "item_measure",
        "created_at",
        "updated_at",
    ];
    const ORDER_BY: &'static str = "item_id";

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.item_id)
            .bind(self.item_name.as_str())
            .bind(self.item_type.as_str())
            .bind(self.item_price)
            .bind(self.item_measure.as_str())
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}
