//! # Validation Module
//!
//! Field validators shared by every form.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Primitive validators (THIS MODULE)                           │
//! │  ├── email, phone, NIT, password strength                              │
//! │  └── required / positive / non-negative                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Forms (forms.rs)                                             │
//! │  └── Each form derives a FormErrors map from the primitives            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Repositories (syspharma-store)                               │
//! │  └── Uniqueness scan over the loaded array (email, codigo, NIT)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use syspharma_core::validation::{validate_phone, validate_password, PasswordStrength};
//!
//! assert!(validate_phone("3001234567").is_ok());
//! assert!(validate_phone("300-123-4567").is_err());
//!
//! let check = validate_password("Farmacia#2024");
//! assert_eq!(check.strength, PasswordStrength::Strong);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_ITEM_QUANTITY, MAX_PRECIO, MAX_STOCK};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum password length counted as one strength criterion.
pub const PASSWORD_MIN_LENGTH: usize = 8;

// =============================================================================
// String Validators
// =============================================================================

/// Validates that a field is present after trimming.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// Same shape as `^[^\s@]+@[^\s@]+\.[^\s@]+$`:
/// - exactly one `@`
/// - non-empty local part
/// - domain contains a dot with text on both sides
/// - no whitespace anywhere
///
/// ```rust
/// use syspharma_core::validation::validate_email;
///
/// assert!(validate_email("ana@farmacia.co").is_ok());
/// assert!(validate_email("ana@farmacia").is_err());
/// assert!(validate_email("").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    let invalid = || ValidationError::invalid("email", "formato de correo inválido");

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

/// Validates a phone number: exactly 10 ASCII digits.
///
/// Separators (spaces, dashes, parentheses, `+`) are rejected, not stripped.
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    if phone.is_empty() {
        return Err(ValidationError::required("teléfono"));
    }

    if phone.len() != 10 || !phone.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::invalid(
            "teléfono",
            "debe tener exactamente 10 dígitos",
        ));
    }

    Ok(())
}

/// Validates a NIT (tax ID): 9 or 10 ASCII digits.
pub fn validate_nit(nit: &str) -> ValidationResult<()> {
    let nit = nit.trim();

    if nit.is_empty() {
        return Err(ValidationError::required("NIT"));
    }

    if !(9..=10).contains(&nit.len()) || !nit.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::invalid("NIT", "debe tener entre 9 y 10 dígitos"));
    }

    Ok(())
}

// =============================================================================
// Password Strength
// =============================================================================

/// Password strength tier. Ordered: `Weak < Medium < Strong`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    /// Tier for a number of satisfied criteria (0-4).
    pub fn from_satisfied(count: usize) -> Self {
        match count {
            0 | 1 => PasswordStrength::Weak,
            2 | 3 => PasswordStrength::Medium,
            _ => PasswordStrength::Strong,
        }
    }

    /// Spanish label for the strength meter.
    pub fn label(&self) -> &'static str {
        match self {
            PasswordStrength::Weak => "débil",
            PasswordStrength::Medium => "media",
            PasswordStrength::Strong => "fuerte",
        }
    }
}

/// One password criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum PasswordRule {
    MinLength,
    Uppercase,
    Digit,
    Symbol,
}

impl PasswordRule {
    pub const ALL: [PasswordRule; 4] = [
        PasswordRule::MinLength,
        PasswordRule::Uppercase,
        PasswordRule::Digit,
        PasswordRule::Symbol,
    ];

    pub fn is_satisfied_by(&self, password: &str) -> bool {
        match self {
            PasswordRule::MinLength => password.chars().count() >= PASSWORD_MIN_LENGTH,
            PasswordRule::Uppercase => password.chars().any(char::is_uppercase),
            PasswordRule::Digit => password.chars().any(|c| c.is_ascii_digit()),
            PasswordRule::Symbol => password
                .chars()
                .any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
        }
    }

    /// Hint shown under the password field when the rule is missing.
    pub fn hint(&self) -> &'static str {
        match self {
            PasswordRule::MinLength => "Mínimo 8 caracteres",
            PasswordRule::Uppercase => "Al menos una letra mayúscula",
            PasswordRule::Digit => "Al menos un número",
            PasswordRule::Symbol => "Al menos un símbolo",
        }
    }
}

/// Outcome of [`validate_password`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PasswordCheck {
    pub strength: PasswordStrength,
    pub satisfied: usize,
    pub missing: Vec<PasswordRule>,
}

/// Classifies a password by how many criteria it meets.
///
/// The tier depends only on the count of satisfied criteria, so meeting
/// more criteria never lowers it.
pub fn validate_password(password: &str) -> PasswordCheck {
    let missing: Vec<PasswordRule> = PasswordRule::ALL
        .iter()
        .copied()
        .filter(|rule| !rule.is_satisfied_by(password))
        .collect();
    let satisfied = PasswordRule::ALL.len() - missing.len();

    PasswordCheck {
        strength: PasswordStrength::from_satisfied(satisfied),
        satisfied,
        missing,
    }
}

/// Requires a password of at least `min` strength.
pub fn require_password(password: &str, min: PasswordStrength) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("contraseña"));
    }
    if validate_password(password).strength < min {
        return Err(ValidationError::WeakPassword);
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates `value > 0`.
pub fn validate_positive(field: &str, value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates `value >= 0`.
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a product price: strictly positive, at most `MAX_PRECIO`.
pub fn validate_precio(precio: Money) -> ValidationResult<()> {
    validate_positive("precio", precio.centavos())?;

    if precio > MAX_PRECIO {
        return Err(ValidationError::invalid(
            "precio",
            format!("no puede superar {}", MAX_PRECIO),
        ));
    }

    Ok(())
}

/// Validates units on hand: 0..=MAX_STOCK.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    validate_non_negative("stock", stock)?;

    if stock > MAX_STOCK {
        return Err(ValidationError::invalid(
            "stock",
            format!("no puede superar {}", MAX_STOCK),
        ));
    }

    Ok(())
}

/// Validates an order or cart quantity: 1..=MAX_ITEM_QUANTITY.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    validate_positive("cantidad", qty)?;

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::invalid(
            "cantidad",
            format!("no puede superar {}", MAX_ITEM_QUANTITY),
        ));
    }

    Ok(())
}

// =============================================================================
// Form Errors
// =============================================================================

/// Per-field error map a form derives from the validators above.
///
/// Keys are the form's field names; values are the Spanish messages
/// rendered under each input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormErrors(BTreeMap<String, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the error of `result` under `field`, keeping the first one.
    pub fn check(&mut self, field: &str, result: ValidationResult<()>) -> &mut Self {
        if let Err(e) = result {
            self.0.entry(field.to_string()).or_insert_with(|| e.to_string());
        }
        self
    }

    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` if no field failed.
    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.values().next() {
            Some(first) if self.0.len() == 1 => f.write_str(first),
            Some(first) => write!(f, "{} (y {} error(es) más)", first, self.0.len() - 1),
            None => f.write_str("Formulario válido"),
        }
    }
}

impl std::error::Error for FormErrors {}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana@farmacia.co").is_ok());
        assert!(validate_email("  luis.perez@mail.com.co ").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("ana").is_err());
        assert!(validate_email("@farmacia.co").is_err());
        assert!(validate_email("ana@.co").is_err());
        assert!(validate_email("ana@farmacia.").is_err());
        assert!(validate_email("ana maria@farmacia.co").is_err());
        assert!(validate_email("a@b@c.co").is_err());
    }

    #[test]
    fn test_validate_phone_exactly_ten_digits() {
        assert!(validate_phone("3001234567").is_ok());

        assert!(validate_phone("").is_err());
        assert!(validate_phone("300123456").is_err());
        assert!(validate_phone("30012345678").is_err());
        assert!(validate_phone("300-123-4567").is_err());
        assert!(validate_phone("300 123 4567").is_err());
        assert!(validate_phone("(300)1234567").is_err());
        assert!(validate_phone("+573001234567").is_err());
        assert!(validate_phone("30012a4567").is_err());
        assert!(validate_phone("３００１２３４５６７").is_err());
    }

    #[test]
    fn test_validate_nit() {
        assert!(validate_nit("900123456").is_ok());
        assert!(validate_nit("9001234567").is_ok());

        assert!(validate_nit("").is_err());
        assert!(validate_nit("90012345").is_err());
        assert!(validate_nit("90012345678").is_err());
        assert!(validate_nit("900123456-7").is_err());
    }

    #[test]
    fn test_password_tiers() {
        assert_eq!(validate_password("").strength, PasswordStrength::Weak);
        assert_eq!(validate_password("abc").strength, PasswordStrength::Weak);
        assert_eq!(validate_password("abcdefgh").strength, PasswordStrength::Weak);
        assert_eq!(validate_password("abcdefg1").strength, PasswordStrength::Medium);
        assert_eq!(validate_password("Abcdefg1").strength, PasswordStrength::Medium);
        assert_eq!(validate_password("Abcdef1!").strength, PasswordStrength::Strong);
        assert_eq!(validate_password("A1!").strength, PasswordStrength::Medium);
    }

    #[test]
    fn test_password_missing_rules() {
        let check = validate_password("abcdefgh");
        assert_eq!(check.satisfied, 1);
        assert_eq!(
            check.missing,
            vec![PasswordRule::Uppercase, PasswordRule::Digit, PasswordRule::Symbol]
        );
    }

    /// Adding a character that satisfies a new criterion never lowers the tier.
    #[test]
    fn test_password_strength_is_monotonic() {
        let bases = ["", "a", "abcdefgh", "ABC", "123", "!!", "Abc1", "abcdefg!"];
        let additions = ["A", "7", "#", "xxxxxxxx"];

        for base in bases {
            let before = validate_password(base);
            for add in additions {
                let extended = format!("{}{}", base, add);
                let after = validate_password(&extended);
                assert!(after.satisfied >= before.satisfied, "{extended}");
                assert!(after.strength >= before.strength, "{extended}");
            }
        }

        for count in 0..4 {
            assert!(
                PasswordStrength::from_satisfied(count + 1)
                    >= PasswordStrength::from_satisfied(count)
            );
        }
    }

    #[test]
    fn test_require_password() {
        assert!(require_password("Abcdef1!", PasswordStrength::Strong).is_ok());
        assert!(require_password("abcdefg1", PasswordStrength::Medium).is_ok());
        assert_eq!(
            require_password("abc", PasswordStrength::Medium),
            Err(ValidationError::WeakPassword)
        );
        assert!(matches!(
            require_password("", PasswordStrength::Weak),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_numeric_validators() {
        assert!(validate_positive("precio", 1).is_ok());
        assert!(validate_positive("precio", 0).is_err());
        assert!(validate_non_negative("stock", 0).is_ok());
        assert!(validate_non_negative("stock", -1).is_err());
        assert!(validate_precio(Money::from_pesos(1)).is_ok());
        assert!(validate_precio(Money::zero()).is_err());
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_upper_bounds() {
        assert!(validate_precio(MAX_PRECIO).is_ok());
        assert!(validate_precio(Money::from_centavos(i64::MAX / 2)).is_err());
        assert!(validate_stock(MAX_STOCK).is_ok());
        assert!(validate_stock(MAX_STOCK + 1).is_err());
        assert!(validate_stock(i64::MAX).is_err());
        assert!(validate_stock(-1).is_err());
        assert!(validate_quantity(i64::MAX).is_err());
    }

    #[test]
    fn test_form_errors_keeps_first_error_per_field() {
        let mut errors = FormErrors::new();
        errors
            .check("email", validate_email(""))
            .check("email", validate_email("x"))
            .check("telefono", validate_phone("3001234567"));

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("email"), Some("El campo email es obligatorio"));
        assert!(errors.get("telefono").is_none());
        assert!(errors.into_result().is_err());
        assert!(FormErrors::new().into_result().is_ok());
    }
}
