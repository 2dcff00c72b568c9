//! Parquet encoding for record batches.
//!
//! Converts a batch of records into a single Snappy-compressed Parquet file
//! with a fixed column order matching the destination table. Column matching
//! during the load is by name and case-sensitive, so the uppercase names
//! here must match the table definition exactly. The nested customer object
//! is serialized as one string column, never exploded.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use snafu::prelude::*;

use drift_common::Record;

use crate::error::{
    BatchAssemblySnafu, EmptyBatchSnafu, EncodeError, FileCreateSnafu, ParquetWriteSnafu,
    WriterCreateSnafu,
};

/// Destination column order. The load statement matches by name, so this
/// order is fixed for readability and diffing, not position.
pub const COLUMNS: [&str; 13] = [
    "TXID",
    "TIMESTAMP",
    "CREDIT_PRODUCT",
    "LOAN_AMOUNT",
    "INTEREST_RATE",
    "TENOR_MONTHS",
    "PAYMENT_STATUS",
    "DAYS_PAST_DUE",
    "LAST_PAYMENT_DATE",
    "MONTHLY_TRANSACTIONS",
    "AVG_TRANSACTION_AMOUNT",
    "COMMON_CATEGORY",
    "CUSTOMER",
];

/// The Arrow schema for the destination table.
pub fn table_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("TXID", DataType::Utf8, false),
        Field::new("TIMESTAMP", DataType::Utf8, false),
        Field::new("CREDIT_PRODUCT", DataType::Utf8, false),
        Field::new("LOAN_AMOUNT", DataType::Float64, false),
        Field::new("INTEREST_RATE", DataType::Float64, false),
        Field::new("TENOR_MONTHS", DataType::Int64, false),
        Field::new("PAYMENT_STATUS", DataType::Utf8, false),
        Field::new("DAYS_PAST_DUE", DataType::Int64, false),
        Field::new("LAST_PAYMENT_DATE", DataType::Utf8, true),
        Field::new("MONTHLY_TRANSACTIONS", DataType::Int64, false),
        Field::new("AVG_TRANSACTION_AMOUNT", DataType::Float64, false),
        Field::new("COMMON_CATEGORY", DataType::Utf8, false),
        Field::new("CUSTOMER", DataType::Utf8, false),
    ]))
}

/// Summary of one encoded batch file.
#[derive(Debug, Clone, Copy)]
pub struct EncodedBatch {
    /// Number of records written.
    pub records: usize,
    /// Compressed file size in bytes.
    pub bytes: u64,
}

/// Encode a non-empty batch to a Snappy-compressed Parquet file at `path`.
///
/// Every field of every record is preserved exactly: floats bit-for-bit,
/// strings untruncated, and the customer blob verbatim. Dictionary encoding
/// is disabled to match the destination table's file format expectations.
pub fn encode_batch(records: &[Record], path: &Path) -> Result<EncodedBatch, EncodeError> {
    ensure!(!records.is_empty(), EmptyBatchSnafu);

    let schema = table_schema();
    let batch = to_record_batch(schema.clone(), records)?;

    let file = File::create(path).context(FileCreateSnafu {
        path: path.display().to_string(),
    })?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_dictionary_enabled(false)
        .build();

    let mut writer = ArrowWriter::try_new(file, schema, Some(props)).context(WriterCreateSnafu)?;
    writer.write(&batch).context(ParquetWriteSnafu)?;
    writer.close().context(ParquetWriteSnafu)?;

    let bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    Ok(EncodedBatch {
        records: records.len(),
        bytes,
    })
}

/// Assemble records into an Arrow record batch in the fixed column order.
fn to_record_batch(schema: SchemaRef, records: &[Record]) -> Result<RecordBatch, EncodeError> {
    let txid: StringArray = records.iter().map(|r| Some(r.txid.as_str())).collect();
    let timestamp: StringArray = records.iter().map(|r| Some(r.timestamp.as_str())).collect();
    let credit_product: StringArray = records
        .iter()
        .map(|r| Some(r.credit_product.as_str()))
        .collect();
    let loan_amount = Float64Array::from_iter_values(records.iter().map(|r| r.loan_amount));
    let interest_rate = Float64Array::from_iter_values(records.iter().map(|r| r.interest_rate));
    let tenor_months = Int64Array::from_iter_values(records.iter().map(|r| r.tenor_months));
    let payment_status: StringArray = records
        .iter()
        .map(|r| Some(r.payment_status.as_str()))
        .collect();
    let days_past_due =
        Int64Array::from_iter_values(records.iter().map(|r| i64::from(r.days_past_due)));
    let last_payment_date: StringArray = records
        .iter()
        .map(|r| r.last_payment_date.as_deref())
        .collect();
    let monthly_transactions =
        Int64Array::from_iter_values(records.iter().map(|r| r.monthly_transactions));
    let avg_transaction_amount =
        Float64Array::from_iter_values(records.iter().map(|r| r.avg_transaction_amount));
    let common_category: StringArray = records
        .iter()
        .map(|r| Some(r.common_category.as_str()))
        .collect();
    let customer: StringArray = records.iter().map(|r| Some(r.customer_blob())).collect();

    let columns: Vec<ArrayRef> = vec![
        Arc::new(txid),
        Arc::new(timestamp),
        Arc::new(credit_product),
        Arc::new(loan_amount),
        Arc::new(interest_rate),
        Arc::new(tenor_months),
        Arc::new(payment_status),
        Arc::new(days_past_due),
        Arc::new(last_payment_date),
        Arc::new(monthly_transactions),
        Arc::new(avg_transaction_amount),
        Arc::new(common_category),
        Arc::new(customer),
    ];

    RecordBatch::try_new(schema, columns).context(BatchAssemblySnafu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;
    use drift_common::decode_record;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::TempDir;

    fn record(txid: &str, last_payment_date: Option<&str>) -> Record {
        let last_payment = match last_payment_date {
            Some(d) => format!(r#""last_payment_date":"{d}","#),
            None => String::new(),
        };
        let line = format!(
            r#"{{"txid":"{txid}","timestamp":"2026-08-05T10:15:30.123456","credit_product":"Auto Loan","loan_amount":25000.55,"interest_rate":6.25,"tenor_months":48,"payment_status":"On Time","days_past_due":0,{last_payment}"monthly_transactions":42,"avg_transaction_amount":118.75,"common_category":"Groceries","customer":{{"name":"Ada Fernsby","annual_income":91000.55}}}}"#
        );
        decode_record(&line).unwrap()
    }

    #[test]
    fn test_empty_batch_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.parquet");

        let err = encode_batch(&[], &path).unwrap_err();
        assert!(matches!(err, EncodeError::EmptyBatch));
        assert!(!path.exists());
    }

    #[test]
    fn test_schema_matches_fixed_column_order() {
        let schema = table_schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, COLUMNS);
    }

    #[test]
    fn test_encode_roundtrip_preserves_fields() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("batch.parquet");

        let records = vec![
            record("t1", Some("2026-07-28")),
            record("t2", None),
            record("t3", Some("2025-01-02")),
        ];
        let encoded = encode_batch(&records, &path).unwrap();
        assert_eq!(encoded.records, 3);
        assert!(encoded.bytes > 0);

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap())
            .unwrap()
            .build()
            .unwrap();
        let batches: Vec<RecordBatch> = reader.map(|b| b.unwrap()).collect();
        assert_eq!(batches.len(), 1);
        let batch = &batches[0];
        assert_eq!(batch.num_rows(), 3);

        let batch_schema = batch.schema();
        let names: Vec<&str> = batch_schema
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect();
        assert_eq!(names, COLUMNS);

        let txid = batch
            .column_by_name("TXID")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(txid.value(0), "t1");
        assert_eq!(txid.value(2), "t3");

        let loan = batch
            .column_by_name("LOAN_AMOUNT")
            .unwrap()
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(loan.value(0), 25000.55);

        let last_payment = batch
            .column_by_name("LAST_PAYMENT_DATE")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(last_payment.value(0), "2026-07-28");
        assert!(last_payment.is_null(1));

        // Customer is one string column, carried verbatim.
        let customer = batch
            .column_by_name("CUSTOMER")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(
            customer.value(0),
            r#"{"name":"Ada Fernsby","annual_income":91000.55}"#
        );
    }

    #[test]
    fn test_encode_preserves_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ordered.parquet");

        let records: Vec<Record> = (0..10)
            .map(|i| record(&format!("r{i}"), None))
            .collect();
        encode_batch(&records, &path).unwrap();

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap())
            .unwrap()
            .build()
            .unwrap();
        let batch = reader.into_iter().next().unwrap().unwrap();
        let txid = batch
            .column_by_name("TXID")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();

        for i in 0..10 {
            assert_eq!(txid.value(i), format!("r{i}"));
        }
    }
}
