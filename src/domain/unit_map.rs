// ==========================================
// KC/KCP 绩效报表 ETL - 单元映射表
// ==========================================
// 用途: 子单元名 → 父单元名 静态映射
// 约束: 有序列表，声明顺序即匹配优先级（先匹配先得）
// 说明: 表为人工维护，名称中的空格以下划线书写
// ==========================================

use serde::{Deserialize, Serialize};

/// 映射表条目：父单元 + 别名列表（含自身与下属子单元）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitMapEntry {
    pub parent: String,
    pub aliases: Vec<String>,
}

impl UnitMapEntry {
    pub fn new(parent: &str, aliases: &[&str]) -> Self {
        Self {
            parent: parent.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// 内置映射表（RO Jakarta 1）
pub fn builtin_unit_map() -> Vec<UnitMapEntry> {
    vec![
        UnitMapEntry::new("KC JAKARTA KCK", &["KC JAKARTA KCK"]),
        UnitMapEntry::new("KC JAKARTA KELAPA_GADING", &["KC JAKARTA KELAPA_GADING"]),
        UnitMapEntry::new(
            "KC JAKARTA ARTHA_GADING",
            &["KC JAKARTA ARTHA_GADING", "KCP GADING_BOULEVARD_RAYA"],
        ),
        UnitMapEntry::new(
            "KC JAKARTA CEMPAKA_MAS",
            &["KC JAKARTA CEMPAKA_MAS", "KCP CEMPAKA_PUTIH_RAYA"],
        ),
        UnitMapEntry::new(
            "KC JAKARTA CUT_MUTIAH",
            &["KC JAKARTA CUT_MUTIAH", "KCP CIKINI", "KCP MENTENG"],
        ),
        UnitMapEntry::new(
            "KC JAKARTA GADING_BOULEVARD",
            &[
                "KC JAKARTA GADING_BOULEVARD",
                "KCP CAKUNG_TIPAR",
                "KCP GADING_BOULEVARD_TIMUR",
                "KCP GADING_ELOK",
                "KCP PENGGILINGAN",
            ],
        ),
        UnitMapEntry::new(
            "KC JAKARTA GUNUNG_SAHARI",
            &["KC JAKARTA GUNUNG_SAHARI", "KCP PANGERAN_JAYAKARTA"],
        ),
        UnitMapEntry::new(
            "KC JAKARTA HAYAM_WURUK",
            &[
                "KC JAKARTA HAYAM_WURUK",
                "KCP GAJAH_MADA",
                "KCP GLODOK",
                "KCP JEMBATAN_LIMA",
                "KCP LOKASARI_PLAZA",
                "KCP MANGGA_BESAR",
            ],
        ),
        UnitMapEntry::new(
            "KC JAKARTA JATINEGARA",
            &["KC JAKARTA JATINEGARA", "KCP KLENDER", "KCP MEESTER"],
        ),
        UnitMapEntry::new(
            "KC JAKARTA KOTA",
            &["KC JAKARTA KOTA", "KCP PURI_DELTA_MAS", "KCP TUBAGUS_ANGKE"],
        ),
        UnitMapEntry::new(
            "KC JAKARTA KRAMAT",
            &["KC JAKARTA KRAMAT", "KCP MANGGARAI", "KCP PRAMUKA", "KCP BPKP"],
        ),
        UnitMapEntry::new(
            "KC JAKARTA KREKOT",
            &["KC JAKARTA KREKOT", "KCP KARANGANYAR", "KCP PASAR_BARU"],
        ),
        // 父单元名中的 "_ " 为历史写法，保持原样
        UnitMapEntry::new(
            "KC JAKARTA MANGGA_ DUA",
            &[
                "KC JAKARTA MANGGA_DUA",
                "KCP HARCO_MANGGA_DUA",
                "KCP PASAR_PAGI_MANGGA_DUA",
            ],
        ),
        UnitMapEntry::new(
            "KC JAKARTA PLUIT",
            &[
                "KC JAKARTA PLUIT",
                "KCP MUARA_ANGKE",
                "KCP MUARA_KARANG",
                "KCP TELU_GONG",
            ],
        ),
        UnitMapEntry::new(
            "KC JAKARTA RASUNA_SAID",
            &[
                "KC JAKARTA RASUNA_SAID",
                "KCP KOTA_KASABLANKA",
                "KCP KUNINGAN_EPISENTRUM",
            ],
        ),
        UnitMapEntry::new(
            "KC JAKARTA ROXI",
            &["KC JAKARTA ROXI", "KCP KAMPUS_II_UNTAR", "KCP TOMANG"],
        ),
        UnitMapEntry::new(
            "KC JAKARTA SEGITIGA_SENEN",
            &["KC JAKARTA SEGITIGA_SENEN", "KCP RSPAD"],
        ),
        UnitMapEntry::new(
            "KC JAKARTA SUDIRMAN",
            &[
                "KC JAKARTA SUDIRMAN",
                "KCP BENDUNGAN_HILIR",
                "KCP THAMRIN_CITY",
            ],
        ),
        UnitMapEntry::new(
            "KC JAKARTA SUNTER",
            &[
                "KC JAKARTA SUNTER",
                "KCP DANAU_SUNTER_UTARA",
                "KCP PURI_MUTIARA",
            ],
        ),
        UnitMapEntry::new(
            "KC JAKARTA TANAH_ABANG",
            &[
                "KC JAKARTA TANAH_ABANG",
                "KCP BLOK_B",
                "KCP KEBON_KACANG",
                "KCP PASAR_TANAH_ABANG",
                "KCP T_PLAZA",
                "KCP TELUK_GONG",
            ],
        ),
        UnitMapEntry::new(
            "KC JAKARTA VETERAN",
            &[
                "KC JAKARTA VETERAN",
                "KCP TASPEN",
                "KCP KEMENTRIAN_BUMN",
                "KCP LEMHANAS",
                "KCP PERTAMINA",
                "KCP ABDUL_MUIS",
                "KCP DEPKEU",
            ],
        ),
        UnitMapEntry::new("KC JAKARTA MALL_AMBASADOR", &["KC MALL_AMBASADOR"]),
    ]
}
