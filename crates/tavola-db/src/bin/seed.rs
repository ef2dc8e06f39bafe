//! # Seed Data Generator
//!
//! Populates the database with demo rows for every settings screen.
//!
//! ## Usage
//! ```bash
//! # Seed ./tavola_dev.db
//! cargo run -p tavola-db --bin seed
//!
//! # Specify database path
//! cargo run -p tavola-db --bin seed -- --db ./data/tavola.db
//! ```
//!
//! ## Generated Rows
//! - Charges: packing, delivery, service
//! - Customers and employees with 10-digit phones
//! - One month of payments and a few absences per employee
//! - Market items across vegetables, dairy and grocery

use std::env;

use chrono::{Duration, NaiveDate, Utc};
use tavola_core::{Absent, Charges, Customer, Employee, MarketItem, Payment, PaymentType};
use tavola_db::{Database, DbConfig, EntityRepository};

const CHARGES: &[(&str, i64)] = &[("Packing", 2000), ("Delivery", 4000), ("Service", 1000)];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Asha Verma", "9876543210"),
    ("Rahul Mehta", "9123456780"),
    ("Neha Kapoor", "9988776655"),
    ("Imran Shaikh", "9012345678"),
];

const EMPLOYEES: &[(&str, &str, &str, i64)] = &[
    ("Sunil Rao", "9800011122", "Chef", 3_000_000),
    ("Priya Nair", "9800033344", "Cashier", 1_800_000),
    ("Vikram Das", "9800055566", "Waiter", 1_500_000),
];

const MARKET_ITEMS: &[(&str, &str, i64, &str)] = &[
    ("Onion", "Vegetable", 4000, "kg"),
    ("Tomato", "Vegetable", 3000, "kg"),
    ("Paneer", "Dairy", 32000, "kg"),
    ("Milk", "Dairy", 6000, "litre"),
    ("Basmati Rice", "Grocery", 12000, "kg"),
    ("Cooking Oil", "Grocery", 15000, "litre"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./tavola_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tavola Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./tavola_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tavola Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.charges().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} charges", existing);
        println!("  Skipping seed to avoid overwriting edits.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let charges = CHARGES
        .iter()
        .zip(1..)
        .map(|((name, price), id)| Charges::new(id, *name, *price))
        .collect();
    report("charges", db.charges().bulk_import(charges).await?);

    let customers = CUSTOMERS
        .iter()
        .zip(1..)
        .map(|((name, phone), id)| Customer::new(id, *name, *phone))
        .collect();
    report("customers", db.customers().bulk_import(customers).await?);

    let employees: Vec<Employee> = EMPLOYEES
        .iter()
        .zip(1..)
        .map(|((name, phone, position, salary), id)| {
            let mut employee = Employee::new(id, *name, *phone, *salary);
            employee.employee_position = position.to_string();
            employee
        })
        .collect();

    let today = Utc::now().date_naive();
    let payments = generate_payments(&employees, today);
    let absents = generate_absents(&employees, today);

    report("employees", db.employees().bulk_import(employees).await?);
    report("payments", db.payments().bulk_import(payments).await?);
    report("absences", db.absents().bulk_import(absents).await?);

    let items = MARKET_ITEMS
        .iter()
        .zip(1..)
        .map(|((name, item_type, price, measure), id)| {
            let mut item = MarketItem::new(id, *name, *item_type, *price);
            item.item_measure = measure.to_string();
            item
        })
        .collect();
    report("market items", db.market_items().bulk_import(items).await?);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn report(label: &str, count: usize) {
    println!("  Imported {} {}", count, label);
}

/// One advance mid-month and one salary payout per employee.
fn generate_payments(employees: &[Employee], today: NaiveDate) -> Vec<Payment> {
    let mut payments = Vec::new();
    let mut next_id = 1;

    for employee in employees {
        let mut advance = Payment::new(
            next_id,
            employee.employee_id,
            employee.employee_salary / 4,
            today - Duration::days(15),
        );
        advance.payment_type = PaymentType::Advance;
        advance.payment_note = Some("Mid-month advance".to_string());
        payments.push(advance);
        next_id += 1;

        payments.push(Payment::new(
            next_id,
            employee.employee_id,
            employee.employee_salary - employee.employee_salary / 4,
            today,
        ));
        next_id += 1;
    }

    payments
}

/// A couple of absences per employee, staggered by employee id.
fn generate_absents(employees: &[Employee], today: NaiveDate) -> Vec<Absent> {
    let mut absents = Vec::new();
    let mut next_id = 1;

    for employee in employees {
        for (offset, reason) in [(3, "Sick leave"), (10, "Family function")] {
            absents.push(Absent::new(
                next_id,
                employee.employee_id,
                today - Duration::days(offset + employee.employee_id),
                reason,
            ));
            next_id += 1;
        }
    }

    absents
}
