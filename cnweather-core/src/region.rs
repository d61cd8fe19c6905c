use crate::{data::ReferenceData, normalize::normalize};

/// The 34 provincial-level names, including special administrative regions.
pub const PROVINCE_NAMES: [&str; 34] = [
    "北京", "天津", "河北", "山西", "内蒙古", "辽宁", "吉林", "黑龙江",
    "上海", "江苏", "浙江", "安徽", "福建", "江西", "山东", "河南", "湖北",
    "湖南", "广东", "广西", "海南", "重庆", "四川", "贵州", "云南", "西藏",
    "陕西", "甘肃", "青海", "宁夏", "新疆", "台湾", "香港", "澳门",
];

const COUNTRY_KEYWORDS: &[&str] = &["中国", "china"];

/// Keyword heuristic: does `location` look like a place with code-based coverage?
///
/// Both the raw and the normalized input are checked, case-insensitively.
pub fn is_domestic(location: &str, data: &ReferenceData) -> bool {
    let raw = location.trim().to_lowercase();
    let normalized = normalize(location).to_lowercase();
    if raw.is_empty() && normalized.is_empty() {
        return false;
    }

    let mentions = |keyword: &str| {
        let keyword = keyword.to_lowercase();
        !keyword.is_empty() && (raw.contains(&keyword) || normalized.contains(&keyword))
    };

    data.cities().iter().any(|entry| mentions(&entry.name))
        || PROVINCE_NAMES.iter().any(|name| mentions(name))
        || COUNTRY_KEYWORDS.iter().any(|kw| mentions(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_city_is_not_domestic() {
        let data = ReferenceData::embedded();
        assert!(!is_domestic("London", &data));
        assert!(!is_domestic("New York", &data));
        assert!(!is_domestic("", &data));
    }

    #[test]
    fn dictionary_city_is_domestic() {
        let data = ReferenceData::embedded();
        assert!(is_domestic("北京", &data));
        assert!(is_domestic("合肥市", &data));
    }

    #[test]
    fn alias_is_domestic_after_normalization() {
        let data = ReferenceData::embedded();
        assert!(is_domestic("沪", &data));
    }

    #[test]
    fn province_and_country_keywords() {
        let data = ReferenceData::from_parts(Vec::new(), Vec::new());
        assert!(is_domestic("西藏阿里", &data));
        assert!(is_domestic("Shenzhen, CHINA", &data));
        assert!(is_domestic("中国某地", &data));
    }
}
