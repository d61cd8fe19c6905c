//! Input clean-up applied before any table lookup.

const ADMIN_SUFFIXES: &[char] = &['市', '县', '区', '省'];

/// One-character abbreviations, matched only against the whole input.
const ALIASES: &[(&str, &str)] = &[
    ("京", "北京"),
    ("沪", "上海"),
    ("津", "天津"),
    ("渝", "重庆"),
    ("冀", "河北"),
    ("晋", "山西"),
    ("蒙", "内蒙古"),
    ("辽", "辽宁"),
    ("吉", "吉林"),
    ("黑", "黑龙江"),
    ("苏", "江苏"),
    ("浙", "浙江"),
    ("皖", "安徽"),
    ("闽", "福建"),
    ("赣", "江西"),
    ("鲁", "山东"),
    ("豫", "河南"),
    ("鄂", "湖北"),
    ("湘", "湖南"),
    ("粤", "广东"),
    ("桂", "广西"),
    ("琼", "海南"),
    ("川", "四川"),
    ("蜀", "四川"),
    ("黔", "贵州"),
    ("滇", "云南"),
    ("藏", "西藏"),
    ("陕", "陕西"),
    ("甘", "甘肃"),
    ("陇", "甘肃"),
    ("青", "青海"),
    ("宁", "宁夏"),
    ("新", "新疆"),
    ("港", "香港"),
    ("澳", "澳门"),
    ("台", "台湾"),
];

/// Trim, drop one trailing administrative suffix, then expand an exact alias.
///
/// A lone suffix character is left alone so the result is never emptied by stripping.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = strip_admin_suffix(trimmed);

    ALIASES
        .iter()
        .find(|(alias, _)| *alias == stripped)
        .map(|(_, full)| (*full).to_string())
        .unwrap_or_else(|| stripped.to_string())
}

fn strip_admin_suffix(s: &str) -> &str {
    match s.strip_suffix(ADMIN_SUFFIXES) {
        Some(rest) if !rest.is_empty() => rest,
        _ => s,
    }
}
