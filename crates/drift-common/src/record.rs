//! Credit-transaction record model and NDJSON decoding.
//!
//! One line of input is one JSON object. Decoding populates a typed
//! [`Record`] at the boundary: required fields must be present with the
//! right shape, `last_payment_date` may be absent, and the nested
//! `customer` object is carried through unparsed so it can be re-serialized
//! as a single text column without any reformatting.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use snafu::prelude::*;

/// Errors that can occur while decoding an input line into a [`Record`].
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RecordError {
    /// The line is not a well-formed record (invalid JSON, or a missing or
    /// wrongly-typed field; the underlying error names the field).
    #[snafu(display("Malformed record: {source}"))]
    Malformed { source: serde_json::Error },
}

/// One credit-transaction event.
///
/// Field names match the generator's JSON keys. `customer` is an opaque
/// nested object: it is never exploded into sub-columns, only re-serialized
/// verbatim into a single string column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub txid: String,
    /// ISO-8601 event timestamp.
    pub timestamp: String,
    pub credit_product: String,
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub tenor_months: i64,
    pub payment_status: String,
    /// Days past due; never negative.
    pub days_past_due: u32,
    /// ISO date of the most recent payment, absent for accounts with no
    /// payment history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_payment_date: Option<String>,
    pub monthly_transactions: i64,
    pub avg_transaction_amount: f64,
    pub common_category: String,
    /// Customer demographics, carried through unparsed.
    pub customer: Box<RawValue>,
}

impl Record {
    /// The customer object as a JSON text blob.
    pub fn customer_blob(&self) -> &str {
        self.customer.get()
    }
}

/// Decode one line of input into a [`Record`].
///
/// The end-of-stream sentinel (an empty line) is a stream-control signal,
/// not a record; callers must check for it before invoking the decoder.
pub fn decode_record(line: &str) -> Result<Record, RecordError> {
    serde_json::from_str(line).context(MalformedSnafu)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_line() -> String {
        r#"{
            "txid": "9e2f0c1a-5b17-4d67-8a46-7e1c2b3d4f5a",
            "timestamp": "2026-08-05T10:15:30.123456",
            "credit_product": "Auto Loan",
            "loan_amount": 25000.5,
            "interest_rate": 6.25,
            "tenor_months": 48,
            "payment_status": "On Time",
            "days_past_due": 0,
            "last_payment_date": "2026-07-28",
            "monthly_transactions": 42,
            "avg_transaction_amount": 118.75,
            "common_category": "Groceries",
            "customer": {"name": "Ada Fernsby", "annual_income": 91000.0}
        }"#
        .replace('\n', " ")
    }

    #[test]
    fn test_decode_full_record() {
        let record = decode_record(&sample_line()).unwrap();

        assert_eq!(record.txid, "9e2f0c1a-5b17-4d67-8a46-7e1c2b3d4f5a");
        assert_eq!(record.credit_product, "Auto Loan");
        assert_eq!(record.loan_amount, 25000.5);
        assert_eq!(record.tenor_months, 48);
        assert_eq!(record.days_past_due, 0);
        assert_eq!(record.last_payment_date.as_deref(), Some("2026-07-28"));
    }

    #[test]
    fn test_decode_missing_optional_field() {
        let line = r#"{"txid":"t1","timestamp":"2026-08-05T00:00:00","credit_product":"Credit Card","loan_amount":1.0,"interest_rate":2.0,"tenor_months":12,"payment_status":"Late","days_past_due":30,"monthly_transactions":5,"avg_transaction_amount":10.0,"common_category":"Travel","customer":{}}"#;

        let record = decode_record(line).unwrap();
        assert!(record.last_payment_date.is_none());
    }

    #[test]
    fn test_decode_missing_required_field_names_it() {
        let line = r#"{"timestamp":"2026-08-05T00:00:00","credit_product":"Credit Card","loan_amount":1.0,"interest_rate":2.0,"tenor_months":12,"payment_status":"Late","days_past_due":30,"monthly_transactions":5,"avg_transaction_amount":10.0,"common_category":"Travel","customer":{}}"#;

        let err = decode_record(line).unwrap_err();
        assert!(
            err.to_string().contains("txid"),
            "error should name the missing field: {err}"
        );
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        assert!(decode_record("not json at all").is_err());
        assert!(decode_record("{\"txid\": ").is_err());
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        // loan_amount must be a number
        let line = r#"{"txid":"t1","timestamp":"2026-08-05T00:00:00","credit_product":"Credit Card","loan_amount":"a lot","interest_rate":2.0,"tenor_months":12,"payment_status":"Late","days_past_due":30,"monthly_transactions":5,"avg_transaction_amount":10.0,"common_category":"Travel","customer":{}}"#;
        assert!(decode_record(line).is_err());

        // days_past_due is never negative
        let line = r#"{"txid":"t1","timestamp":"2026-08-05T00:00:00","credit_product":"Credit Card","loan_amount":1.0,"interest_rate":2.0,"tenor_months":12,"payment_status":"Late","days_past_due":-3,"monthly_transactions":5,"avg_transaction_amount":10.0,"common_category":"Travel","customer":{}}"#;
        assert!(decode_record(line).is_err());
    }

    #[test]
    fn test_customer_blob_preserved_verbatim() {
        let blob = r#"{"name":"Ada Fernsby","address":{"city":"Dover","state":"DE"},"annual_income":91000.55}"#;
        let line = format!(
            r#"{{"txid":"t1","timestamp":"2026-08-05T00:00:00","credit_product":"Mortgage","loan_amount":1.0,"interest_rate":2.0,"tenor_months":12,"payment_status":"On Time","days_past_due":0,"monthly_transactions":5,"avg_transaction_amount":10.0,"common_category":"Utilities","customer":{blob}}}"#
        );

        let record = decode_record(&line).unwrap();
        assert_eq!(record.customer_blob(), blob);
    }
}
