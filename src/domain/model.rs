use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of a bank statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub name: String,
    #[serde(with = "flexible_datetime")]
    pub datetime: NaiveDateTime,
    pub withdrawal_amount: Option<Decimal>,
    pub deposit_amount: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscribedStatement {
    pub opening_balance: Option<Decimal>,
    pub transactions: Vec<Transaction>,
    pub closing_balance: Option<Decimal>,
}

/// Everything transcribed from one statement document. A single document may
/// hold several statements (e.g. consecutive months).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TranscribedStatements {
    pub transcribed_statements: Vec<TranscribedStatement>,
}

impl TranscribedStatements {
    /// All transactions across all statements, in statement order.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.transcribed_statements
            .iter()
            .flat_map(|s| s.transactions.iter().cloned())
            .collect()
    }

    pub fn merge(documents: Vec<TranscribedStatements>) -> Self {
        Self {
            transcribed_statements: documents
                .into_iter()
                .flat_map(|d| d.transcribed_statements)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLineItem {
    pub quantity: u32,
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub vendor: String,
    #[serde(with = "flexible_datetime")]
    pub datetime: NaiveDateTime,
    pub items: Vec<ReceiptLineItem>,
    pub subtotal: Decimal,
    pub grand_total: Decimal,
}

/// A statement transaction and the receipt that backs it, if one was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledPair {
    pub transaction: Transaction,
    pub receipt: Option<Receipt>,
}

impl ReconciledPair {
    pub fn matched(transaction: Transaction, receipt: Receipt) -> Self {
        Self {
            transaction,
            receipt: Some(receipt),
        }
    }

    pub fn unmatched(transaction: Transaction) -> Self {
        Self {
            transaction,
            receipt: None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.receipt.is_some()
    }

    pub fn transactions(pairs: &[ReconciledPair]) -> Vec<&Transaction> {
        pairs.iter().map(|p| &p.transaction).collect()
    }

    pub fn receipts(pairs: &[ReconciledPair]) -> Vec<Option<&Receipt>> {
        pairs.iter().map(|p| p.receipt.as_ref()).collect()
    }
}

/// Accepts `2024-03-01T12:30:00`, `2024-03-01 12:30:00` or a bare `2024-03-01`
/// (read as midnight). Always writes the full ISO form.
pub mod flexible_datetime {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        let without_zone = raw.trim_end_matches('Z');

        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_local());
        }
        for format in [
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M",
        ] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(without_zone, format) {
                return Some(dt);
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid datetime: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_transaction_accepts_bare_dates_and_float_amounts() {
        let json = serde_json::json!({
            "name": "STARBUCKS #12",
            "datetime": "2024-05-02",
            "withdrawal_amount": 4.5,
            "deposit_amount": null
        });

        let tx: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(tx.datetime.to_string(), "2024-05-02 00:00:00");
        assert_eq!(tx.withdrawal_amount, Some(Decimal::from_str("4.50").unwrap()));
        assert!(tx.deposit_amount.is_none());
    }

    #[test]
    fn test_receipt_datetime_variants() {
        assert!(flexible_datetime::parse("2024-05-02T08:15:00").is_some());
        assert!(flexible_datetime::parse("2024-05-02 08:15").is_some());
        assert!(flexible_datetime::parse("2024-05-02T08:15:00Z").is_some());
        assert!(flexible_datetime::parse("May 2nd").is_none());
    }

    #[test]
    fn test_statements_flatten_in_order() {
        let tx = |name: &str| Transaction {
            name: name.to_string(),
            datetime: flexible_datetime::parse("2024-01-01").unwrap(),
            withdrawal_amount: None,
            deposit_amount: None,
        };
        let statements = TranscribedStatements {
            transcribed_statements: vec![
                TranscribedStatement {
                    opening_balance: None,
                    transactions: vec![tx("a"), tx("b")],
                    closing_balance: None,
                },
                TranscribedStatement {
                    opening_balance: None,
                    transactions: vec![tx("c")],
                    closing_balance: None,
                },
            ],
        };

        let names: Vec<String> = statements.transactions().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
