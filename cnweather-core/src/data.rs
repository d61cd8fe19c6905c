//! Reference tables: city name -> weather.com.cn code, province -> code prefix + capital.
//!
//! Tables are loaded once and never mutated. [`ReferenceData::load`] walks an
//! ordered list of candidate directories; the first directory holding a table
//! file wins. A missing table is replaced by the embedded default and recorded
//! in the provenance so the caller can warn about it.

use std::{
    collections::HashMap,
    fmt, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    error::DataError,
    model::{CityCodeEntry, ProvinceInfo},
};

pub const CITY_CODES_FILE: &str = "complete_china_weather_city_codes.json";
pub const PROVINCE_CODES_FILE: &str = "china_weather_province_codes.json";

/// (name, code prefix, capital) for the 34 provincial-level divisions.
pub(crate) const PROVINCES: &[(&str, &str, &str)] = &[
    ("北京", "10101", "北京"),
    ("上海", "10102", "上海"),
    ("天津", "10103", "天津"),
    ("重庆", "10104", "重庆"),
    ("黑龙江", "10105", "哈尔滨"),
    ("吉林", "10106", "长春"),
    ("辽宁", "10107", "沈阳"),
    ("内蒙古", "10108", "呼和浩特"),
    ("河北", "10109", "石家庄"),
    ("山西", "10110", "太原"),
    ("陕西", "10111", "西安"),
    ("山东", "10112", "济南"),
    ("新疆", "10113", "乌鲁木齐"),
    ("西藏", "10114", "拉萨"),
    ("青海", "10115", "西宁"),
    ("甘肃", "10116", "兰州"),
    ("宁夏", "10117", "银川"),
    ("河南", "10118", "郑州"),
    ("江苏", "10119", "南京"),
    ("湖北", "10120", "武汉"),
    ("浙江", "10121", "杭州"),
    ("安徽", "10122", "合肥"),
    ("福建", "10123", "福州"),
    ("江西", "10124", "南昌"),
    ("湖南", "10125", "长沙"),
    ("贵州", "10126", "贵阳"),
    ("四川", "10127", "成都"),
    ("广东", "10128", "广州"),
    ("云南", "10129", "昆明"),
    ("广西", "10130", "南宁"),
    ("海南", "10131", "海口"),
    ("香港", "10132", "香港"),
    ("澳门", "10133", "澳门"),
    ("台湾", "10134", "台北"),
];

/// Fallback city table used when no city code file is found.
const EMBEDDED_CITY_CODES: &[(&str, &str)] = &[
    ("北京", "101010100"), ("上海", "101020100"), ("天津", "101030100"), ("重庆", "101040100"),
    ("哈尔滨", "101050101"), ("齐齐哈尔", "101050201"), ("牡丹江", "101050301"),
    ("佳木斯", "101050401"), ("绥化", "101050501"), ("黑河", "101050601"),
    ("大兴安岭", "101050701"), ("伊春", "101050801"), ("大庆", "101050901"),
    ("长春", "101060101"), ("吉林", "101060201"), ("延边", "101060301"), ("四平", "101060401"),
    ("通化", "101060501"), ("白城", "101060601"), ("辽源", "101060701"), ("松原", "101060801"),
    ("白山", "101060901"),
    ("沈阳", "101070101"), ("大连", "101070201"), ("鞍山", "101070301"), ("抚顺", "101070401"),
    ("本溪", "101070501"), ("丹东", "101070601"), ("锦州", "101070701"), ("营口", "101070801"),
    ("阜新", "101070901"), ("辽阳", "101071001"), ("铁岭", "101071101"), ("朝阳", "101071201"),
    ("盘锦", "101071301"), ("葫芦岛", "101071401"),
    ("呼和浩特", "101080101"), ("包头", "101080201"), ("赤峰", "101080601"),
    ("鄂尔多斯", "101080701"),
    ("石家庄", "101090101"), ("保定", "101090201"), ("张家口", "101090301"), ("承德", "101090402"),
    ("唐山", "101090501"), ("廊坊", "101090601"), ("沧州", "101090701"), ("衡水", "101090801"),
    ("邢台", "101090901"), ("邯郸", "101091001"), ("秦皇岛", "101091101"),
    ("太原", "101100101"), ("大同", "101100201"), ("阳泉", "101100301"), ("晋中", "101100401"),
    ("长治", "101100501"), ("晋城", "101100601"), ("临汾", "101100701"), ("运城", "101100801"),
    ("朔州", "101100901"), ("忻州", "101101001"), ("吕梁", "101101100"),
    ("西安", "101110101"), ("咸阳", "101110200"), ("延安", "101110300"), ("榆林", "101110401"),
    ("宝鸡", "101110901"),
    ("济南", "101120101"), ("青岛", "101120201"), ("淄博", "101120301"), ("烟台", "101120501"),
    ("潍坊", "101120601"), ("济宁", "101120701"), ("泰安", "101120801"), ("临沂", "101120901"),
    ("威海", "101121301"),
    ("乌鲁木齐", "101130101"), ("克拉玛依", "101130201"), ("喀什", "101130901"),
    ("拉萨", "101140101"), ("西宁", "101150101"),
    ("兰州", "101160101"), ("天水", "101160901"), ("嘉峪关", "101161401"),
    ("银川", "101170101"),
    ("郑州", "101180101"), ("安阳", "101180201"), ("新乡", "101180301"), ("南阳", "101180701"),
    ("开封", "101180801"), ("洛阳", "101180901"),
    ("南京", "101190101"), ("无锡", "101190201"), ("镇江", "101190301"), ("苏州", "101190401"),
    ("南通", "101190501"), ("扬州", "101190601"), ("盐城", "101190701"), ("徐州", "101190801"),
    ("淮安", "101190901"), ("连云港", "101191001"), ("常州", "101191101"),
    ("武汉", "101200101"), ("襄阳", "101200201"), ("荆州", "101200801"), ("宜昌", "101200901"),
    ("十堰", "101201101"),
    ("杭州", "101210101"), ("湖州", "101210201"), ("嘉兴", "101210301"), ("宁波", "101210401"),
    ("绍兴", "101210501"), ("台州", "101210601"), ("温州", "101210701"), ("丽水", "101210801"),
    ("金华", "101210901"), ("衢州", "101211001"), ("舟山", "101211101"),
    ("合肥", "101220101"), ("蚌埠", "101220201"), ("芜湖", "101220301"), ("安庆", "101220601"),
    ("阜阳", "101220801"), ("黄山", "101221001"),
    ("福州", "101230101"), ("厦门", "101230201"), ("莆田", "101230401"), ("泉州", "101230501"),
    ("漳州", "101230601"),
    ("南昌", "101240101"), ("九江", "101240201"), ("上饶", "101240301"), ("赣州", "101240701"),
    ("景德镇", "101240801"),
    ("长沙", "101250101"), ("湘潭", "101250201"), ("株洲", "101250301"), ("衡阳", "101250401"),
    ("常德", "101250601"), ("岳阳", "101251001"), ("张家界", "101251101"),
    ("贵阳", "101260101"), ("遵义", "101260201"), ("安顺", "101260301"),
    ("成都", "101270101"), ("攀枝花", "101270201"), ("自贡", "101270301"), ("绵阳", "101270401"),
    ("南充", "101270501"), ("泸州", "101271001"), ("宜宾", "101271101"), ("乐山", "101271401"),
    ("德阳", "101272001"),
    ("广州", "101280101"), ("韶关", "101280201"), ("惠州", "101280301"), ("汕头", "101280501"),
    ("深圳", "101280601"), ("珠海", "101280701"), ("佛山", "101280800"), ("肇庆", "101280901"),
    ("湛江", "101281001"), ("江门", "101281101"), ("东莞", "101281601"), ("中山", "101281701"),
    ("昆明", "101290101"), ("大理", "101290201"), ("曲靖", "101290401"), ("玉溪", "101290701"),
    ("丽江", "101291401"), ("西双版纳", "101291601"),
    ("南宁", "101300101"), ("柳州", "101300301"), ("桂林", "101300501"), ("北海", "101301301"),
    ("海口", "101310101"), ("三亚", "101310201"),
    ("香港", "101320101"), ("澳门", "101330101"), ("台北", "101340101"), ("高雄", "101340201"),
];

/// Where a table came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSource {
    File(PathBuf),
    Embedded,
}

impl fmt::Display for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableSource::File(path) => write!(f, "{}", path.display()),
            TableSource::Embedded => f.write_str("embedded defaults"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProvinceRecord {
    code: String,
    #[serde(default)]
    capital: Option<String>,
}

/// Immutable reference tables plus their provenance.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    cities: Vec<CityCodeEntry>,
    city_index: HashMap<String, usize>,
    provinces: Vec<ProvinceInfo>,
    city_source: TableSource,
    province_source: TableSource,
}

impl ReferenceData {
    /// Build from already-resolved tables. Later duplicates of a city name are ignored.
    pub fn from_parts(cities: Vec<CityCodeEntry>, provinces: Vec<ProvinceInfo>) -> Self {
        Self::assemble(cities, provinces, TableSource::Embedded, TableSource::Embedded)
    }

    pub fn embedded() -> Self {
        Self::from_parts(embedded_cities(), embedded_provinces())
    }

    /// Load both tables from the first candidate directory that has each file.
    pub fn load(candidates: &[PathBuf]) -> Result<Self, DataError> {
        let (cities, city_source) = match find_file(candidates, CITY_CODES_FILE) {
            Some(path) => {
                let text = read(&path)?;
                (parse_city_table(&path, &text)?, TableSource::File(path))
            }
            None => (embedded_cities(), TableSource::Embedded),
        };

        let (provinces, province_source) = match find_file(candidates, PROVINCE_CODES_FILE) {
            Some(path) => {
                let text = read(&path)?;
                (parse_province_table(&path, &text)?, TableSource::File(path))
            }
            None => (embedded_provinces(), TableSource::Embedded),
        };

        let data = Self::assemble(cities, provinces, city_source, province_source);
        tracing::info!(
            cities = data.cities.len(),
            provinces = data.provinces.len(),
            city_source = %data.city_source,
            province_source = %data.province_source,
            "Loaded reference data"
        );
        Ok(data)
    }

    fn assemble(
        cities: Vec<CityCodeEntry>,
        provinces: Vec<ProvinceInfo>,
        city_source: TableSource,
        province_source: TableSource,
    ) -> Self {
        let mut deduped = Vec::with_capacity(cities.len());
        let mut city_index = HashMap::with_capacity(cities.len());
        for entry in cities {
            if !city_index.contains_key(&entry.name) {
                city_index.insert(entry.name.clone(), deduped.len());
                deduped.push(entry);
            }
        }

        Self { cities: deduped, city_index, provinces, city_source, province_source }
    }

    /// Cities in table order.
    pub fn cities(&self) -> &[CityCodeEntry] {
        &self.cities
    }

    pub fn code(&self, name: &str) -> Option<&str> {
        self.city_index.get(name).map(|&idx| self.cities[idx].code.as_str())
    }

    pub fn provinces(&self) -> &[ProvinceInfo] {
        &self.provinces
    }

    pub fn province(&self, name: &str) -> Option<&ProvinceInfo> {
        self.provinces.iter().find(|p| p.name == name)
    }

    /// First province (table order) whose name starts `text`.
    pub fn province_prefix_of(&self, text: &str) -> Option<&ProvinceInfo> {
        self.provinces.iter().find(|p| !p.name.is_empty() && text.starts_with(&p.name))
    }

    /// First province (table order) whose name appears anywhere in `text`.
    pub fn province_within(&self, text: &str) -> Option<&ProvinceInfo> {
        self.provinces.iter().find(|p| !p.name.is_empty() && text.contains(&p.name))
    }

    pub fn city_source(&self) -> &TableSource {
        &self.city_source
    }

    pub fn province_source(&self) -> &TableSource {
        &self.province_source
    }

    /// User-facing warnings for every table that fell back to embedded data.
    pub fn fallback_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.city_source == TableSource::Embedded {
            warnings.push(format!(
                "警告: 未能加载完整城市代码文件 {CITY_CODES_FILE}，使用内置备用字典 ({} 个城市)",
                self.cities.len()
            ));
        }
        if self.province_source == TableSource::Embedded {
            warnings.push(format!("警告: 未能加载省份代码文件 {PROVINCE_CODES_FILE}，使用内置省份表"));
        }
        warnings
    }
}

fn find_file(candidates: &[PathBuf], file_name: &str) -> Option<PathBuf> {
    candidates.iter().map(|dir| dir.join(file_name)).find(|path| path.is_file())
}

fn read(path: &Path) -> Result<String, DataError> {
    fs::read_to_string(path).map_err(|source| DataError::Read { path: path.to_path_buf(), source })
}

/// Parse `{"name": "code", ...}` keeping document order.
pub fn parse_city_table(path: &Path, text: &str) -> Result<Vec<CityCodeEntry>, DataError> {
    let map: Map<String, Value> = serde_json::from_str(text)
        .map_err(|source| DataError::Parse { path: path.to_path_buf(), source })?;

    map.into_iter()
        .map(|(name, value)| match value {
            Value::String(code) if !code.trim().is_empty() => {
                Ok(CityCodeEntry { name, code: code.trim().to_string() })
            }
            Value::Number(number) => Ok(CityCodeEntry { name, code: number.to_string() }),
            other => Err(DataError::InvalidEntry {
                path: path.to_path_buf(),
                key: name,
                reason: format!("expected a code string, found {other}"),
            }),
        })
        .collect()
}

/// Parse `{"name": {"code": "...", "capital"?: "..."}, ...}`.
///
/// Capitals missing from the file come from the built-in table; provinces the
/// file omits are appended from the built-in table.
pub fn parse_province_table(path: &Path, text: &str) -> Result<Vec<ProvinceInfo>, DataError> {
    let map: Map<String, Value> = serde_json::from_str(text)
        .map_err(|source| DataError::Parse { path: path.to_path_buf(), source })?;

    let mut provinces = Vec::with_capacity(map.len().max(PROVINCES.len()));
    for (name, value) in map {
        let record: ProvinceRecord =
            serde_json::from_value(value).map_err(|e| DataError::InvalidEntry {
                path: path.to_path_buf(),
                key: name.clone(),
                reason: e.to_string(),
            })?;

        let capital = record
            .capital
            .filter(|c| !c.trim().is_empty())
            .or_else(|| builtin_capital(&name).map(str::to_string))
            .unwrap_or_else(|| name.clone());

        provinces.push(ProvinceInfo { name, code_prefix: record.code.trim().to_string(), capital });
    }

    for info in embedded_provinces() {
        if !provinces.iter().any(|p| p.name == info.name) {
            provinces.push(info);
        }
    }

    Ok(provinces)
}

pub(crate) fn builtin_capital(province: &str) -> Option<&'static str> {
    PROVINCES.iter().find(|(name, _, _)| *name == province).map(|(_, _, capital)| *capital)
}

fn embedded_cities() -> Vec<CityCodeEntry> {
    EMBEDDED_CITY_CODES
        .iter()
        .map(|(name, code)| CityCodeEntry { name: (*name).to_string(), code: (*code).to_string() })
        .collect()
}

fn embedded_provinces() -> Vec<ProvinceInfo> {
    PROVINCES
        .iter()
        .map(|(name, prefix, capital)| ProvinceInfo {
            name: (*name).to_string(),
            code_prefix: (*prefix).to_string(),
            capital: (*capital).to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_tables_are_consistent() {
        let data = ReferenceData::embedded();
        assert_eq!(data.provinces().len(), 34);

        for entry in data.cities() {
            assert_eq!(entry.code.len(), 9, "code for {} must be 9 digits", entry.name);
            assert!(
                data.provinces().iter().any(|p| p.owns_code(&entry.code)),
                "{} has no owning province",
                entry.name
            );
        }

        for province in data.provinces() {
            assert!(data.code(&province.capital).is_some(), "capital {} missing", province.capital);
        }
    }

    #[test]
    fn city_table_keeps_document_order() {
        let text = r#"{"嘉兴": "101210301", "杭州": "101210101", "北京": 101010100}"#;
        let cities = parse_city_table(Path::new("t.json"), text).unwrap();

        let names: Vec<_> = cities.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["嘉兴", "杭州", "北京"]);
        assert_eq!(cities[2].code, "101010100");
    }

    #[test]
    fn city_table_rejects_non_string_codes() {
        let err = parse_city_table(Path::new("t.json"), r#"{"北京": null}"#).unwrap_err();
        assert!(matches!(err, DataError::InvalidEntry { ref key, .. } if key == "北京"));
    }

    #[test]
    fn province_table_fills_capitals_and_missing_provinces() {
        let text = r#"{"浙江": {"code": "101210"}, "测试省": {"code": "109990", "capital": "测试"}}"#;
        let provinces = parse_province_table(Path::new("p.json"), text).unwrap();

        assert_eq!(provinces[0].capital, "杭州");
        assert_eq!(provinces[1].capital, "测试");
        assert!(provinces.iter().any(|p| p.name == "广东"));
        assert_eq!(provinces.iter().filter(|p| p.name == "浙江").count(), 1);
    }

    #[test]
    fn province_lookup_prefix_and_within() {
        let data = ReferenceData::embedded();
        assert_eq!(data.province_prefix_of("浙江嘉兴").map(|p| p.name.as_str()), Some("浙江"));
        assert!(data.province_prefix_of("嘉兴浙江").is_none());
        assert_eq!(data.province_within("嘉兴浙江").map(|p| p.name.as_str()), Some("浙江"));
    }

    #[test]
    fn duplicate_city_names_keep_first() {
        let data = ReferenceData::from_parts(
            vec![
                CityCodeEntry { name: "朝阳".into(), code: "101071201".into() },
                CityCodeEntry { name: "朝阳".into(), code: "101010300".into() },
            ],
            Vec::new(),
        );
        assert_eq!(data.cities().len(), 1);
        assert_eq!(data.code("朝阳"), Some("101071201"));
    }

    #[test]
    fn fallback_warnings_only_for_embedded_tables() {
        assert_eq!(ReferenceData::embedded().fallback_warnings().len(), 2);
    }
}
