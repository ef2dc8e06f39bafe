//! # Validation Module
//!
//! Field validation rules used by the settings screens before a single
//! record is written.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Single-record edit (CLI / form)                                       │
//! │  └── THIS MODULE: length, format and sign checks                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Database (SQLite)                                                     │
//! │  ├── NOT NULL constraints                                              │
//! │  └── PRIMARY KEY constraints                                           │
//! │                                                                         │
//! │  Bulk import skips this module: rows come from a file the user        │
//! │  already exported and are merged as-is.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tavola_core::validation::{validate_name, validate_phone};
//!
//! validate_name("customer_name", "Asha").unwrap();
//! assert!(validate_phone("customer_phone", "98765").is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_NAME_LEN, MAX_SEARCH_QUERY_LEN, PHONE_DIGITS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MIN_NAME_LEN: usize = 2;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (charges, customer, employee, market item).
///
/// ## Rules
/// - Must not be empty
/// - At least 2 and at most 100 characters after trimming
/// - Must not start with a digit
///
/// ## Example
/// ```rust
/// use tavola_core::validation::validate_name;
///
/// assert!(validate_name("charges_name", "Packing").is_ok());
/// assert!(validate_name("charges_name", "").is_err());
/// assert!(validate_name("charges_name", "9 Delivery").is_err());
/// ```
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let len = value.chars().count();
    if len < MIN_NAME_LEN {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min: MIN_NAME_LEN,
        });
    }

    if len > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    if value.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not start with a digit".to_string(),
        });
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Must not be empty
/// - Exactly 10 ASCII digits
pub fn validate_phone(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() != PHONE_DIGITS || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("must be {PHONE_DIGITS} digits"),
        });
    }

    Ok(())
}

/// Validates an e-mail address.
///
/// ## Rules
/// - Exactly one `@` with a non-empty local part
/// - Domain contains a dot that is neither first nor last
/// - No whitespace
pub fn validate_email(field: &str, value: &str) -> ValidationResult<()> {
    let invalid = || ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid e-mail address".to_string(),
    };

    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    match domain.rfind('.') {
        Some(dot) if dot > 0 && dot < domain.len() - 1 => Ok(()),
        _ => Err(invalid()),
    }
}

/// Checks text typed into a settings screen's search bar.
///
/// Blank text is accepted and lists every row. Length is counted in
/// characters after trimming, against [`MAX_SEARCH_QUERY_LEN`].
///
/// Returns the trimmed query the repository will run.
pub fn validate_search_query(query: &str) -> ValidationResult<&str> {
    let trimmed = query.trim();
    if trimmed.chars().count() <= MAX_SEARCH_QUERY_LEN {
        return Ok(trimmed);
    }

    Err(ValidationError::TooLong {
        field: "search query".to_string(),
        max: MAX_SEARCH_QUERY_LEN,
    })
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an amount (price, salary, payment) in the smallest currency unit.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_positive(field: &str, amount: i64) -> ValidationResult<()> {
    if amount <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Charges, Customer, Entity, MarketItem};

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Packing").is_ok());
        assert!(validate_name("name", "  Tea  ").is_ok());

        assert!(matches!(
            validate_name("name", "   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_name("name", "a"),
            Err(ValidationError::TooShort { min: 2, .. })
        ));
        assert!(validate_name("name", &"A".repeat(101)).is_err());
        assert!(validate_name("name", "1st floor").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("phone", "9876543210").is_ok());
        assert!(validate_phone("phone", "").is_err());
        assert!(validate_phone("phone", "98765-43210").is_err());
        assert!(validate_phone("phone", "987654321").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("email", "asha@example.com").is_ok());
        assert!(validate_email("email", "asha@example").is_err());
        assert!(validate_email("email", "@example.com").is_err());
        assert!(validate_email("email", "asha@@example.com").is_err());
        assert!(validate_email("email", "asha @example.com").is_err());
        assert!(validate_email("email", "asha@example.").is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  dal ").unwrap(), "dal");
        assert_eq!(validate_search_query("").unwrap(), "");

        // Counted in characters, not bytes
        assert!(validate_search_query(&"é".repeat(MAX_SEARCH_QUERY_LEN)).is_ok());
        assert!(validate_search_query(&format!("  {}  ", "x".repeat(MAX_SEARCH_QUERY_LEN))).is_ok());
        assert!(matches!(
            validate_search_query(&"x".repeat(MAX_SEARCH_QUERY_LEN + 1)),
            Err(ValidationError::TooLong { max: MAX_SEARCH_QUERY_LEN, .. })
        ));
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("price", 1).is_ok());
        assert!(validate_positive("price", 0).is_err());
        assert!(validate_positive("price", -5).is_err());
    }

    #[test]
    fn test_entity_validate() {
        assert!(Charges::new(1, "Packing", 2000).validate().is_ok());
        assert!(Charges::new(1, "Packing", 0).validate().is_err());

        let mut customer = Customer::new(1, "Asha", "9876543210");
        assert!(customer.validate().is_ok());
        customer.customer_email = Some("not-an-email".to_string());
        assert!(customer.validate().is_err());
        customer.customer_email = Some(String::new());
        assert!(customer.validate().is_ok());

        let mut item = MarketItem::new(1, "Onion", "Vegetable", 4000);
        assert!(item.validate().is_ok());
        item.item_measure = " ".to_string();
        assert!(item.validate().is_err());
    }
}
