//! Weather-code and condition phrase tables.

/// Chinese description for a WMO weather interpretation code.
pub fn wmo_description(code: u16) -> &'static str {
    match code {
        0 => "晴",
        1 => "晴间多云",
        2 | 3 => "阴",
        45 | 48 => "雾",
        51 | 61 | 80 => "小雨",
        53 | 63 | 81 => "中雨",
        55 | 65 | 82 => "大雨",
        56 | 57 | 66 | 67 => "冻雨",
        71 | 85 => "小雪",
        73 => "中雪",
        75 | 86 => "大雪",
        77 => "米雪",
        95 => "雷暴",
        96 => "雷暴伴冰雹",
        99 => "雷暴伴大冰雹",
        _ => "天气",
    }
}

/// Longest phrases first so "Light rain" is not split by "Rain".
const CONDITIONS: &[(&str, &str)] = &[
    ("Patchy rain possible", "局部小雨"),
    ("Moderate or heavy rain", "中到大雨"),
    ("Moderate or heavy snow", "中到大雪"),
    ("Thundery outbreaks", "雷阵雨"),
    ("Partly cloudy", "多云"),
    ("Moderate rain", "中雨"),
    ("Moderate snow", "中雪"),
    ("Light drizzle", "毛毛雨"),
    ("Thunderstorm", "雷暴"),
    ("Light rain", "小雨"),
    ("Heavy rain", "大雨"),
    ("Light snow", "小雪"),
    ("Heavy snow", "大雪"),
    ("Rain shower", "阵雨"),
    ("Overcast", "阴"),
    ("Showers", "阵雨"),
    ("Drizzle", "毛毛雨"),
    ("Cloudy", "阴"),
    ("Sunny", "晴"),
    ("Clear", "晴"),
    ("Thunder", "雷"),
    ("Sleet", "雨夹雪"),
    ("Haze", "霾"),
    ("Mist", "薄雾"),
    ("Rain", "雨"),
    ("Snow", "雪"),
    ("Fog", "雾"),
];

/// Substitute known English condition phrases with Chinese ones.
///
/// Matching is case-insensitive; unknown words are kept as-is.
pub fn translate_condition(text: &str) -> String {
    let text = text.trim();
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    'outer: while !rest.is_empty() {
        let at_word_start = !out.ends_with(|c: char| c.is_ascii_alphanumeric());
        if at_word_start {
            for (english, chinese) in CONDITIONS {
                let len = english.len();
                let matches = rest.len() >= len
                    && rest.is_char_boundary(len)
                    && rest[..len].eq_ignore_ascii_case(english)
                    && !rest[len..].starts_with(|c: char| c.is_ascii_alphabetic());
                if matches {
                    out.push_str(chinese);
                    rest = &rest[len..];
                    continue 'outer;
                }
            }
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wmo_codes_map_to_phrases() {
        assert_eq!(wmo_description(0), "晴");
        assert_eq!(wmo_description(63), "中雨");
        assert_eq!(wmo_description(99), "雷暴伴大冰雹");
        assert_eq!(wmo_description(42), "天气");
    }

    #[test]
    fn longest_phrase_wins() {
        assert_eq!(translate_condition("Light rain"), "小雨");
        assert_eq!(translate_condition("Partly cloudy"), "多云");
        assert_eq!(translate_condition("light RAIN"), "小雨");
    }

    #[test]
    fn unknown_text_is_kept() {
        assert_eq!(translate_condition("Blowing dust"), "Blowing dust");
        assert_eq!(translate_condition("Light rain, mist"), "小雨, 薄雾");
        assert_eq!(translate_condition("晴"), "晴");
        assert_eq!(translate_condition("Training"), "Training");
    }
}
