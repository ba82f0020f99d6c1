use crate::domain::model::{Receipt, Transaction, TranscribedStatements};
use crate::utils::error::{LinkerError, Result};
use rust_decimal::Decimal;
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(LinkerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(LinkerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(LinkerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(LinkerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(LinkerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        let extension = std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension {
            Some(extension) if allowed_set.contains(extension.as_str()) => {}
            Some(extension) => {
                return Err(LinkerError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(LinkerError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: "File has no extension or invalid filename".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LinkerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(LinkerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

fn invalid_record(message: String) -> LinkerError {
    LinkerError::ValidationError { message }
}

fn non_negative(what: &str, amount: Option<Decimal>) -> Result<()> {
    match amount {
        Some(value) if value.is_sign_negative() && !value.is_zero() => Err(invalid_record(
            format!("{} must not be negative (got {})", what, value),
        )),
        _ => Ok(()),
    }
}

impl Validate for Transaction {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(invalid_record("Transaction name is empty".to_string()));
        }
        non_negative(&format!("Withdrawal of '{}'", self.name), self.withdrawal_amount)?;
        non_negative(&format!("Deposit of '{}'", self.name), self.deposit_amount)?;
        if self.withdrawal_amount.is_some() && self.deposit_amount.is_some() {
            return Err(invalid_record(format!(
                "Transaction '{}' has both a withdrawal and a deposit",
                self.name
            )));
        }
        Ok(())
    }
}

impl Validate for TranscribedStatements {
    fn validate(&self) -> Result<()> {
        self.transcribed_statements
            .iter()
            .flat_map(|statement| statement.transactions.iter())
            .try_for_each(|transaction| transaction.validate())
    }
}

impl Validate for Receipt {
    fn validate(&self) -> Result<()> {
        if self.vendor.trim().is_empty() {
            return Err(invalid_record("Receipt vendor is empty".to_string()));
        }
        for item in &self.items {
            if item.quantity == 0 {
                return Err(invalid_record(format!(
                    "Line item '{}' on the {} receipt has zero quantity",
                    item.name, self.vendor
                )));
            }
            if item.name.trim().is_empty() {
                return Err(invalid_record(format!(
                    "A line item on the {} receipt has no name",
                    self.vendor
                )));
            }
        }
        non_negative(&format!("Grand total of the {} receipt", self.vendor), Some(self.grand_total))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{flexible_datetime, ReceiptLineItem, TranscribedStatement};
    use std::str::FromStr;

    fn receipt(vendor: &str, quantity: u32) -> Receipt {
        Receipt {
            vendor: vendor.to_string(),
            datetime: flexible_datetime::parse("2024-02-10").unwrap(),
            items: vec![ReceiptLineItem {
                quantity,
                name: "Oat milk".to_string(),
                price: Decimal::from_str("3.99").unwrap(),
            }],
            subtotal: Decimal::from_str("3.99").unwrap(),
            grand_total: Decimal::from_str("4.31").unwrap(),
        }
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api_base", "https://example.com").is_ok());
        assert!(validate_url("api_base", "http://example.com").is_ok());
        assert!(validate_url("api_base", "").is_err());
        assert!(validate_url("api_base", "invalid-url").is_err());
        assert!(validate_url("api_base", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        let files = vec!["receipt.JPG".to_string(), "statement.pdf".to_string()];
        assert!(validate_file_extensions("receipt_input", &files, &["jpg", "pdf"]).is_ok());

        let invalid_files = vec!["notes.txt".to_string()];
        assert!(validate_file_extensions("receipt_input", &invalid_files, &["jpg", "pdf"]).is_err());

        let no_extension = vec!["scan".to_string()];
        assert!(validate_file_extensions("receipt_input", &no_extension, &["jpg"]).is_err());
    }

    #[test]
    fn test_receipt_validation() {
        assert!(receipt("Whole Foods", 1).validate().is_ok());
        assert!(receipt("  ", 1).validate().is_err());
        assert!(matches!(
            receipt("Whole Foods", 0).validate(),
            Err(LinkerError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_statement_validation_rejects_negative_withdrawal() {
        let statements = TranscribedStatements {
            transcribed_statements: vec![TranscribedStatement {
                opening_balance: None,
                transactions: vec![Transaction {
                    name: "ATM".to_string(),
                    datetime: flexible_datetime::parse("2024-02-10").unwrap(),
                    withdrawal_amount: Some(Decimal::from_str("-20.00").unwrap()),
                    deposit_amount: None,
                }],
                closing_balance: None,
            }],
        };

        assert!(statements.validate().is_err());
    }

    #[test]
    fn test_transaction_with_withdrawal_and_deposit_is_rejected() {
        let mut transaction = Transaction {
            name: "TRANSFER".to_string(),
            datetime: flexible_datetime::parse("2024-02-10").unwrap(),
            withdrawal_amount: Some(Decimal::from_str("20.00").unwrap()),
            deposit_amount: Some(Decimal::from_str("20.00").unwrap()),
        };
        assert!(matches!(
            transaction.validate(),
            Err(LinkerError::ValidationError { .. })
        ));

        transaction.deposit_amount = None;
        assert!(transaction.validate().is_ok());

        transaction.withdrawal_amount = None;
        assert!(transaction.validate().is_ok());
    }
}
