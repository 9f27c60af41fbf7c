//! NIK address derivation / 身份证号地址推导
//!
//! A NIK is 16 digits: `PP KK CC DDMMYY SSSS` (province, regency, district,
//! birth date, serial). Women carry the birth day plus 40.

use chrono::{Datelike, NaiveDate, Utc};

/// Derives an address string from a national ID number / 地址推导接口
///
/// Implementations must be pure: the same NIK always yields the same string.
/// An undecodable NIK yields an empty string.
pub trait AddressDeriver: Send + Sync {
    fn derive(&self, nik: i64) -> String;
}

impl<F> AddressDeriver for F
where
    F: Fn(i64) -> String + Send + Sync,
{
    fn derive(&self, nik: i64) -> String {
        self(nik)
    }
}

const PROVINCES: &[(u32, &str)] = &[
    (11, "ACEH"),
    (12, "SUMATERA UTARA"),
    (13, "SUMATERA BARAT"),
    (14, "RIAU"),
    (15, "JAMBI"),
    (16, "SUMATERA SELATAN"),
    (17, "BENGKULU"),
    (18, "LAMPUNG"),
    (19, "KEPULAUAN BANGKA BELITUNG"),
    (21, "KEPULAUAN RIAU"),
    (31, "DKI JAKARTA"),
    (32, "JAWA BARAT"),
    (33, "JAWA TENGAH"),
    (34, "DI YOGYAKARTA"),
    (35, "JAWA TIMUR"),
    (36, "BANTEN"),
    (51, "BALI"),
    (52, "NUSA TENGGARA BARAT"),
    (53, "NUSA TENGGARA TIMUR"),
    (61, "KALIMANTAN BARAT"),
    (62, "KALIMANTAN TENGAH"),
    (63, "KALIMANTAN SELATAN"),
    (64, "KALIMANTAN TIMUR"),
    (65, "KALIMANTAN UTARA"),
    (71, "SULAWESI UTARA"),
    (72, "SULAWESI TENGAH"),
    (73, "SULAWESI SELATAN"),
    (74, "SULAWESI TENGGARA"),
    (75, "GORONTALO"),
    (76, "SULAWESI BARAT"),
    (81, "MALUKU"),
    (82, "MALUKU UTARA"),
    (91, "PAPUA"),
    (92, "PAPUA BARAT"),
];

/// Regency codes from 71 upward are cities
const CITY_CODE_START: u32 = 71;

/// Decoded NIK fields / 解析后的身份证号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NikInfo {
    pub province_code: u32,
    pub province: &'static str,
    pub regency_code: u32,
    pub district_code: u32,
    pub birth_date: NaiveDate,
    pub female: bool,
}

impl NikInfo {
    pub fn address(&self) -> String {
        let kind = if self.regency_code >= CITY_CODE_START { "KOTA" } else { "KAB." };
        format!(
            "PROV. {}, {} {:02}.{:02}, KEC. {:02}.{:02}.{:02}, LAHIR {}",
            self.province,
            kind,
            self.province_code,
            self.regency_code,
            self.province_code,
            self.regency_code,
            self.district_code,
            self.birth_date.format("%d-%m-%Y"),
        )
    }
}

/// Default address deriver / 默认地址推导实现
#[derive(Debug, Clone, Copy)]
pub struct NikAddressParser {
    /// Two-digit years above this fall in the 1900s
    pivot_year: i32,
}

impl NikAddressParser {
    pub fn new() -> Self {
        Self::with_reference_year(Utc::now().year())
    }

    pub fn with_reference_year(year: i32) -> Self {
        Self { pivot_year: year }
    }

    pub fn parse(&self, nik: i64) -> Option<NikInfo> {
        if !(1_000_000_000_000_000..10_000_000_000_000_000).contains(&nik) {
            return None;
        }
        let digits = nik.to_string();
        let part = |range: std::ops::Range<usize>| digits[range].parse::<u32>().ok();

        let province_code = part(0..2)?;
        let regency_code = part(2..4)?;
        let district_code = part(4..6)?;
        let raw_day = part(6..8)?;
        let month = part(8..10)?;
        let yy = part(10..12)? as i32;

        let province = PROVINCES
            .iter()
            .find(|(code, _)| *code == province_code)
            .map(|(_, name)| *name)?;

        let female = raw_day > 40;
        let day = if female { raw_day - 40 } else { raw_day };
        let century = if 2000 + yy <= self.pivot_year { 2000 } else { 1900 };
        let birth_date = NaiveDate::from_ymd_opt(century + yy, month, day)?;

        Some(NikInfo {
            province_code,
            province,
            regency_code,
            district_code,
            birth_date,
            female,
        })
    }
}

impl Default for NikAddressParser {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressDeriver for NikAddressParser {
    fn derive(&self, nik: i64) -> String {
        self.parse(nik).map(|info| info.address()).unwrap_or_default()
    }
}
