//! Civil registry record normalization / 人口登记记录规范化
//!
//! Decoding replaces each coded field with its label and adds a derived `ALAMAT`.
//! Every other field is passed through untouched. Encoding is the reverse write
//! path and rejects labels it does not know.

use serde_json::Value;
use std::sync::Arc;

use super::codes::{CodeCategory, LookupError};
use super::nik::{AddressDeriver, NikAddressParser};
use crate::models::Document;
use crate::utils::{value_to_i32, value_to_i64};

/// Field holding the national ID number
pub const NIK_FIELD: &str = "NIK";
/// Derived address field
pub const ADDRESS_FIELD: &str = "ALAMAT";

#[derive(Clone)]
pub struct RecordNormalizer {
    deriver: Arc<dyn AddressDeriver>,
}

impl RecordNormalizer {
    pub fn new(deriver: Arc<dyn AddressDeriver>) -> Self {
        Self { deriver }
    }

    /// Decode a batch of raw records, preserving order / 批量解码
    pub fn normalize(&self, records: Vec<Document>) -> Vec<Document> {
        records.into_iter().map(|record| self.normalize_record(record)).collect()
    }

    /// Decode one raw record / 解码单条记录
    pub fn normalize_record(&self, mut record: Document) -> Document {
        for category in CodeCategory::ALL {
            let field = category.field();
            let code = value_to_i32(record.get(field));
            let label = category.table().label(code);
            record.insert(field.to_string(), Value::String(label.to_string()));
        }

        let nik = value_to_i64(record.get(NIK_FIELD));
        let address = self.deriver.derive(nik);
        record.insert(ADDRESS_FIELD.to_string(), Value::String(address));
        record
    }

    /// Encode labels back to codes / 标签编码为代码
    ///
    /// Coded fields absent from the input stay absent. The derived address is dropped.
    pub fn encode_record(&self, mut record: Document) -> Result<Document, LookupError> {
        for category in CodeCategory::ALL {
            let field = category.field();
            let Some(value) = record.get(field) else {
                continue;
            };
            let code = match value {
                Value::String(label) => category.table().code(label)?,
                other => {
                    return Err(LookupError::NotFound {
                        category,
                        label: other.to_string(),
                    })
                }
            };
            record.insert(field.to_string(), Value::from(code));
        }
        record.remove(ADDRESS_FIELD);
        Ok(record)
    }
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(NikAddressParser::new()))
    }
}

impl std::fmt::Debug for RecordNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordNormalizer").finish_non_exhaustive()
    }
}
