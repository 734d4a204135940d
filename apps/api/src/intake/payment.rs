use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::FieldError;
use crate::models::request::PaymentStatus;

/// What the client typed on the payment step. Nothing is ever charged: the
/// details are checked for shape and a receipt is issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentDetails {
    Card {
        card_number: String,
        card_name: String,
        /// `MM/YY`
        expiry: String,
        cvv: String,
    },
    Upi {
        upi_id: String,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentReceipt {
    pub payment_id: String,
    pub status: PaymentStatus,
    pub amount: i64,
}

fn valid_expiry(expiry: &str) -> bool {
    let Some((mm, yy)) = expiry.split_once('/') else {
        return false;
    };
    let digits = |s: &str, n: usize| s.len() == n && s.chars().all(|c| c.is_ascii_digit());
    digits(mm, 2) && digits(yy, 2) && matches!(mm.parse::<u8>(), Ok(1..=12))
}

pub fn validate_payment(details: &PaymentDetails) -> Vec<FieldError> {
    let mut errors = Vec::new();
    match details {
        PaymentDetails::Card {
            card_number,
            card_name,
            expiry,
            cvv,
        } => {
            let number: String = card_number.chars().filter(|c| !c.is_whitespace()).collect();
            if number.len() != 16 || !number.chars().all(|c| c.is_ascii_digit()) {
                errors.push(FieldError::new(
                    "payment.card_number",
                    "Card number must be 16 digits",
                ));
            }
            if card_name.trim().is_empty() {
                errors.push(FieldError::new(
                    "payment.card_name",
                    "Name on card is required",
                ));
            }
            if !valid_expiry(expiry.trim()) {
                errors.push(FieldError::new("payment.expiry", "Expiry must be MM/YY"));
            }
            if cvv.len() != 3 || !cvv.chars().all(|c| c.is_ascii_digit()) {
                errors.push(FieldError::new("payment.cvv", "CVV must be 3 digits"));
            }
        }
        PaymentDetails::Upi { upi_id } => {
            let upi_id = upi_id.trim();
            if !upi_id.contains('@') || upi_id.len() <= 3 {
                errors.push(FieldError::new("payment.upi_id", "Enter a valid UPI ID"));
            }
        }
    }
    errors
}

/// Validates the details and issues a completed receipt for `amount`.
pub fn process_payment(
    details: &PaymentDetails,
    amount: i64,
) -> Result<PaymentReceipt, Vec<FieldError>> {
    let errors = validate_payment(details);
    if !errors.is_empty() {
        return Err(errors);
    }
    let suffix: u64 = rand::rng().random();
    let payment_id = format!("pay_{suffix:016x}");
    let method = match details {
        PaymentDetails::Card { .. } => "card",
        PaymentDetails::Upi { .. } => "upi",
    };
    info!("Recorded {method} payment {payment_id} for ₹{amount}");
    Ok(PaymentReceipt {
        payment_id,
        status: PaymentStatus::Completed,
        amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(number: &str, name: &str, expiry: &str, cvv: &str) -> PaymentDetails {
        PaymentDetails::Card {
            card_number: number.into(),
            card_name: name.into(),
            expiry: expiry.into(),
            cvv: cvv.into(),
        }
    }

    #[test]
    fn test_valid_card_with_spaces() {
        let d = card("4111 1111 1111 1111", "Asha Rao", "09/28", "123");
        assert!(validate_payment(&d).is_empty());
    }

    #[test]
    fn test_invalid_card_fields() {
        let d = card("4111 1111", "", "13/28", "12a");
        let fields: Vec<_> = validate_payment(&d).into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "payment.card_number",
                "payment.card_name",
                "payment.expiry",
                "payment.cvv"
            ]
        );
    }

    #[test]
    fn test_expiry_shapes() {
        assert!(valid_expiry("01/30"));
        assert!(valid_expiry("12/25"));
        assert!(!valid_expiry("00/25"));
        assert!(!valid_expiry("1/25"));
        assert!(!valid_expiry("0125"));
    }

    #[test]
    fn test_upi() {
        assert!(validate_payment(&PaymentDetails::Upi {
            upi_id: "asha@okbank".into()
        })
        .is_empty());
        assert!(!validate_payment(&PaymentDetails::Upi {
            upi_id: "a@b".into()
        })
        .is_empty());
        assert!(!validate_payment(&PaymentDetails::Upi {
            upi_id: "ashaokbank".into()
        })
        .is_empty());
    }

    #[test]
    fn test_process_payment_issues_receipt() {
        let receipt = process_payment(
            &PaymentDetails::Upi {
                upi_id: "asha@okbank".into(),
            },
            599,
        )
        .unwrap();
        assert!(receipt.payment_id.starts_with("pay_"));
        assert_eq!(receipt.payment_id.len(), 20);
        assert_eq!(receipt.status, PaymentStatus::Completed);
        assert_eq!(receipt.amount, 599);
    }

    #[test]
    fn test_payment_method_tag() {
        let d: PaymentDetails =
            serde_json::from_str(r#"{"method":"upi","upi_id":"x@y"}"#).unwrap();
        assert!(matches!(d, PaymentDetails::Upi { .. }));
    }
}
