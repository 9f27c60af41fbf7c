//! Demographic code tables / 人口登记代码表
//!
//! Each category is a fixed bijection between a small integer code and a label.
//! Forward lookups never fail: an unknown code yields the sentinel `"-"`.
//! Reverse lookups come from user input and report a validation error instead.

use std::fmt;
use thiserror::Error;

/// Label returned for codes with no known meaning / 未知代码占位符
pub const SENTINEL: &str = "-";

/// Reverse lookup failure / 反向查找失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("{category} '{label}' not found, please try again")]
    NotFound { category: CodeCategory, label: String },
}

/// Demographic code category / 代码类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeCategory {
    Religion,
    Gender,
    BloodType,
    Education,
    MaritalStatus,
    Occupation,
    FamilyRole,
}

impl CodeCategory {
    pub const ALL: [CodeCategory; 7] = [
        CodeCategory::Religion,
        CodeCategory::Gender,
        CodeCategory::BloodType,
        CodeCategory::Education,
        CodeCategory::MaritalStatus,
        CodeCategory::Occupation,
        CodeCategory::FamilyRole,
    ];

    /// Record field carrying this category / 对应的记录字段
    pub fn field(self) -> &'static str {
        match self {
            CodeCategory::Religion => "AGAMA",
            CodeCategory::Gender => "JENIS_KLMIN",
            CodeCategory::BloodType => "GOL_DRH",
            CodeCategory::Education => "PDDK_AKH",
            CodeCategory::MaritalStatus => "STAT_KWN",
            CodeCategory::Occupation => "JENIS_PKRJN",
            CodeCategory::FamilyRole => "STAT_HBKEL",
        }
    }

    pub fn table(self) -> &'static CodeTable {
        match self {
            CodeCategory::Religion => &RELIGION,
            CodeCategory::Gender => &GENDER,
            CodeCategory::BloodType => &BLOOD_TYPE,
            CodeCategory::Education => &EDUCATION,
            CodeCategory::MaritalStatus => &MARITAL_STATUS,
            CodeCategory::Occupation => &OCCUPATION,
            CodeCategory::FamilyRole => &FAMILY_ROLE,
        }
    }
}

impl fmt::Display for CodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CodeCategory::Religion => "religion",
            CodeCategory::Gender => "gender",
            CodeCategory::BloodType => "blood type",
            CodeCategory::Education => "education",
            CodeCategory::MaritalStatus => "marital status",
            CodeCategory::Occupation => "occupation",
            CodeCategory::FamilyRole => "family role",
        };
        f.write_str(name)
    }
}

/// Bidirectional code table / 双向代码表
#[derive(Debug)]
pub struct CodeTable {
    pub category: CodeCategory,
    pub entries: &'static [(i32, &'static str)],
    /// Extra labels accepted by reverse lookup only / 仅反向查找接受的别名
    pub aliases: &'static [(&'static str, i32)],
}

impl CodeTable {
    /// Code to label, sentinel when unknown / 代码转标签
    pub fn label(&self, code: i32) -> &'static str {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, label)| *label)
            .unwrap_or(SENTINEL)
    }

    /// Label to code / 标签转代码
    ///
    /// The label is trimmed and upper-cased before matching.
    pub fn code(&self, label: &str) -> Result<i32, LookupError> {
        let wanted = label.trim().to_uppercase();
        self.entries
            .iter()
            .find(|(_, l)| *l == wanted)
            .map(|(code, _)| *code)
            .or_else(|| self.aliases.iter().find(|(l, _)| *l == wanted).map(|(_, code)| *code))
            .ok_or_else(|| LookupError::NotFound {
                category: self.category,
                label: label.to_string(),
            })
    }
}

pub static RELIGION: CodeTable = CodeTable {
    category: CodeCategory::Religion,
    entries: &[
        (1, "ISLAM"),
        (2, "KRISTEN"),
        (3, "KATHOLIK"),
        (4, "HINDU"),
        (5, "BUDDHA"),
        (6, "KHONGHUCU"),
    ],
    aliases: &[],
};

pub static GENDER: CodeTable = CodeTable {
    category: CodeCategory::Gender,
    entries: &[(1, "M"), (2, "F")],
    aliases: &[("PRIA", 1), ("LAKI-LAKI", 1), ("WANITA", 2), ("PEREMPUAN", 2)],
};

pub static BLOOD_TYPE: CodeTable = CodeTable {
    category: CodeCategory::BloodType,
    entries: &[
        (1, "A"),
        (2, "A+"),
        (3, "A-"),
        (4, "AB"),
        (5, "AB+"),
        (6, "AB-"),
        (7, "B"),
        (8, "B+"),
        (9, "B-"),
        (10, "O"),
        (11, "O+"),
        (12, "O-"),
    ],
    aliases: &[],
};

pub static EDUCATION: CodeTable = CodeTable {
    category: CodeCategory::Education,
    entries: &[
        (1, "TIDAK / BELUM SEKOLAH"),
        (2, "BELUM TAMAT SD / SEDERAJAT"),
        (3, "TAMAT SD / SEDERAJAT"),
        (4, "SLTP / SEDERAJAT"),
        (5, "SLTA / SEDERAJAT"),
        (6, "DIPLOMA I / II"),
        (7, "AKADEMI / DIPLOMA III / SARJANA MUDA"),
        (8, "DIPLOMA IV / STRATA I"),
        (9, "STRATA II"),
        (10, "STRATA III"),
    ],
    aliases: &[],
};

pub static MARITAL_STATUS: CodeTable = CodeTable {
    category: CodeCategory::MaritalStatus,
    entries: &[(1, "BELUM KAWIN"), (2, "KAWIN"), (3, "CERAI HIDUP"), (4, "CERAI MATI")],
    aliases: &[],
};

// Codes are sparse; gaps are not assigned
pub static OCCUPATION: CodeTable = CodeTable {
    category: CodeCategory::Occupation,
    entries: &[
        (1, "BELUM / TIDAK BEKERJA"),
        (2, "MENGURUS RUMAH TANGGA"),
        (3, "PELAJAR / MAHASISWA"),
        (4, "PENSIUNAN"),
        (5, "PEGAWAI NEGERI SIPIL"),
        (6, "TNI"),
        (9, "PETANI / PEKEBUN"),
        (10, "PETERNAK"),
        (15, "KARYAWAN SWASTA"),
        (19, "BURUH HARIAN LEPAS"),
        (20, "BURUH TANI / PERKEBUNAN"),
        (23, "PEMBANTU RUMAH TANGGA"),
        (24, "TUKANG CUKUR"),
        (25, "TUKANG LISTRING"),
        (26, "TUKANG BATU"),
        (27, "TUKANG KAYU"),
        (34, "MEKANIK"),
        (38, "PARAJI"),
        (41, "IMAM MASJID"),
        (44, "WARTAWAN"),
        (45, "USTADZ / MUBALIGH"),
        (65, "GURU"),
        (81, "SOPIR"),
        (84, "PEDAGANG"),
        (85, "PERANGKAT DESA"),
        (86, "KEPALA DESA"),
        (87, "BIARAWATI"),
        (88, "WIRASWASTA"),
    ],
    aliases: &[],
};

pub static FAMILY_ROLE: CodeTable = CodeTable {
    category: CodeCategory::FamilyRole,
    entries: &[
        (1, "KEPALA KELUARGA"),
        (2, "SUAMI"),
        (3, "ISTRI"),
        (4, "ANAK"),
        (5, "MENANTU"),
        (6, "CUCU"),
        (7, "ORANGTUA"),
        (8, "MERTUA"),
        (9, "FAMILI LAIN"),
        (10, "PEMBANTU"),
    ],
    aliases: &[],
};
