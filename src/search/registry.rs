//! Source registry - per-collection search schema / 数据源注册表
//!
//! Every searchable collection is described once: which fields a filter string is
//! matched against, how the filter value is shaped for each field, and which
//! conditions make up the collection's default listing when no filter is given.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::predicate::{Comparison, Predicate};

/// Civil registry collection, the only one whose records are normalized
pub const CIVIL_REGISTRY_COLLECTION: &str = "dukcapil";

/// How the filter value is shaped for one field / 字段取值规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRule {
    /// Integer when the filter is all digits, upper-cased string otherwise
    Typed,
    /// The filter exactly as received (no case folding, never an integer)
    RawText,
    /// Upper-cased string with one trailing space appended (never an integer)
    PaddedText,
}

/// One searchable field / 可搜索字段
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub rule: ValueRule,
}

impl FieldRule {
    const fn typed(field: &'static str) -> Self {
        Self { field, rule: ValueRule::Typed }
    }

    const fn raw(field: &'static str) -> Self {
        Self { field, rule: ValueRule::RawText }
    }

    const fn padded(field: &'static str) -> Self {
        Self { field, rule: ValueRule::PaddedText }
    }
}

/// Collection search descriptor / 集合搜索描述
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    pub name: &'static str,
    pub search_fields: Vec<FieldRule>,
    /// Conditions AND-ed together for the unfiltered listing; empty means match-all
    pub default_view: Vec<(&'static str, Comparison)>,
}

impl SourceDescriptor {
    fn new(name: &'static str, search_fields: Vec<FieldRule>) -> Self {
        Self { name, search_fields, default_view: Vec::new() }
    }

    fn with_default_view(mut self, conditions: Vec<(&'static str, Comparison)>) -> Self {
        self.default_view = conditions;
        self
    }

    /// Predicate for the unfiltered listing / 无过滤条件时的默认视图
    pub fn default_predicate(&self) -> Predicate {
        if self.default_view.is_empty() {
            return Predicate::MatchAll;
        }
        Predicate::And(
            self.default_view
                .iter()
                .map(|(field, op)| Predicate::compare(*field, op.clone()))
                .collect(),
        )
    }
}

/// Registered sources in fan-out order / 按扇出顺序注册的数据源
static SOURCES: Lazy<Vec<SourceDescriptor>> = Lazy::new(|| {
    use serde_json::json;
    use FieldRule as F;

    vec![
        SourceDescriptor::new("sample_bansos", vec![F::typed("nama_lengkap"), F::typed("nik")]),
        SourceDescriptor::new("bankraya_paylater", vec![F::typed("Nasabah"), F::typed("Hp")])
            .with_default_view(vec![
                ("Hp", Comparison::Ne(json!(-1))),
                ("Tagihan Pokok", Comparison::Gt(json!(10_000_000))),
            ]),
        SourceDescriptor::new("bankraya_pinang_flexi", vec![F::typed("Nama Nasabah"), F::typed("No Hp")])
            .with_default_view(vec![("Tagihan Pokok", Comparison::Gt(json!(10_000_000)))]),
        SourceDescriptor::new(
            "data_posindo",
            vec![F::typed("nama_penerima"), F::typed("nama_petugas"), F::typed("nama_pengirim")],
        ),
        SourceDescriptor::new("dekoruma_customer", vec![F::typed("Email")]),
        SourceDescriptor::new("dekoruma_transaction", vec![F::typed("Guest Email")]),
        SourceDescriptor::new(CIVIL_REGISTRY_COLLECTION, vec![F::typed("NIK"), F::typed("NAMA_LGKP")]),
        SourceDescriptor::new("fithub", vec![F::typed("name"), F::typed("email"), F::raw("phone")]),
        SourceDescriptor::new("gojek_customer", vec![F::typed("Phone"), F::typed("Email")]),
        SourceDescriptor::new(
            "portfolio_bnisekuritas",
            vec![F::typed("product.fundname"), F::typed("cls_initialcode")],
        ),
        SourceDescriptor::new(
            "rupa2_customer",
            vec![F::typed("customer_name"), F::raw("phone"), F::typed("email")],
        )
        .with_default_view(vec![("email", Comparison::Ne(json!("-")))]),
        SourceDescriptor::new("sicepat_customer", shipment_fields()),
        SourceDescriptor::new("sicepat_lama", shipment_fields()),
        SourceDescriptor::new("sim_pendaftaran", vec![F::typed("NAMA"), F::typed("NIK")]),
        SourceDescriptor::new("sim_produksi", vec![F::typed("NO SIM"), F::typed("NAMA")]),
        SourceDescriptor::new("tokopedia_cutomer", vec![F::typed("Full Name"), F::typed("Telephone")]),
        SourceDescriptor::new(
            "user_posaja",
            vec![F::typed("Fullname"), F::typed("Email"), F::typed("Nophone"), F::typed("Noidentitas")],
        )
        .with_default_view(vec![
            ("Noidentitas", Comparison::Exists(true)),
            ("Noidentitas", Comparison::Ne(json!(""))),
            ("Noidentitas", Comparison::Ne(json!(0))),
        ]),
        SourceDescriptor::new("vehicle", vec![F::typed("NIK"), F::padded("NAMA"), F::typed("NOPOL")]),
        SourceDescriptor::new("phone_regis", vec![F::typed("NAME"), F::typed("NIK"), F::typed("PHONE")]),
    ]
});

static BY_NAME: Lazy<HashMap<&'static str, &'static SourceDescriptor>> =
    Lazy::new(|| SOURCES.iter().map(|s| (s.name, s)).collect());

fn shipment_fields() -> Vec<FieldRule> {
    vec![
        FieldRule::typed("Consignee Name"),
        FieldRule::typed("Consignee Phone"),
        FieldRule::typed("Shipper Email"),
        FieldRule::typed("Shipper Phone"),
    ]
}

/// Look up a collection descriptor / 查找集合描述
pub fn get_source(name: &str) -> Option<&'static SourceDescriptor> {
    BY_NAME.get(name).copied()
}

/// All registered collection names in fan-out order / 所有已注册集合
pub fn source_names() -> Vec<String> {
    SOURCES.iter().map(|s| s.name.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_fan_out_collections() {
        let names = source_names();
        assert_eq!(names.len(), 19);
        assert!(names.contains(&CIVIL_REGISTRY_COLLECTION.to_string()));
        for name in &names {
            let source = get_source(name).unwrap();
            assert!((1..=4).contains(&source.search_fields.len()), "{}", name);
        }
    }

    #[test]
    fn test_default_views() {
        assert!(get_source("fithub").unwrap().default_predicate().is_match_all());
        match get_source("user_posaja").unwrap().default_predicate() {
            Predicate::And(items) => assert_eq!(items.len(), 3),
            other => panic!("unexpected predicate {:?}", other),
        }
    }

    #[test]
    fn test_unknown_source() {
        assert!(get_source("not_a_collection").is_none());
    }
}
