//! Static province -> city -> district tables.
//!
//! Lookups use containment: a table key matches when it appears anywhere in
//! the query. The first matching entry in definition order wins, so entries
//! that would shadow a more specific name are listed after it.

use crate::model::AdministrativeUnit;

/// Directly-governed municipalities: province, city and district share the name.
pub const MUNICIPALITIES: &[&str] = &["北京", "上海", "天津", "重庆"];

/// (district, city, province). Consulted before [`CITIES`].
const DISTRICTS: &[(&str, &str, &str)] = &[
    ("海淀", "北京", "北京"), ("东城", "北京", "北京"), ("西城", "北京", "北京"),
    ("丰台", "北京", "北京"), ("石景山", "北京", "北京"), ("门头沟", "北京", "北京"),
    ("房山", "北京", "北京"), ("通州", "北京", "北京"), ("顺义", "北京", "北京"),
    ("昌平", "北京", "北京"), ("大兴", "北京", "北京"), ("怀柔", "北京", "北京"),
    ("平谷", "北京", "北京"), ("密云", "北京", "北京"), ("延庆", "北京", "北京"),
    ("浦东", "上海", "上海"), ("黄浦", "上海", "上海"), ("徐汇", "上海", "上海"),
    ("长宁", "上海", "上海"), ("静安", "上海", "上海"), ("普陀", "上海", "上海"),
    ("虹口", "上海", "上海"), ("杨浦", "上海", "上海"), ("闵行", "上海", "上海"),
    ("宝山", "上海", "上海"), ("嘉定", "上海", "上海"), ("金山", "上海", "上海"),
    ("松江", "上海", "上海"), ("青浦", "上海", "上海"), ("奉贤", "上海", "上海"),
    ("崇明", "上海", "上海"),
    ("滨海新", "天津", "天津"), ("南开", "天津", "天津"), ("河西", "天津", "天津"),
    ("武清", "天津", "天津"), ("宝坻", "天津", "天津"), ("蓟州", "天津", "天津"),
    ("渝中", "重庆", "重庆"), ("沙坪坝", "重庆", "重庆"), ("九龙坡", "重庆", "重庆"),
    ("南岸", "重庆", "重庆"), ("北碚", "重庆", "重庆"), ("渝北", "重庆", "重庆"),
    ("巴南", "重庆", "重庆"), ("万州", "重庆", "重庆"), ("涪陵", "重庆", "重庆"),
    ("永川", "重庆", "重庆"),
    ("西湖", "杭州", "浙江"), ("拱墅", "杭州", "浙江"), ("滨江", "杭州", "浙江"),
    ("萧山", "杭州", "浙江"), ("余杭", "杭州", "浙江"), ("临安", "杭州", "浙江"),
    ("富阳", "杭州", "浙江"), ("桐庐", "杭州", "浙江"), ("淳安", "杭州", "浙江"),
    ("建德", "杭州", "浙江"),
    ("鄞州", "宁波", "浙江"), ("余姚", "宁波", "浙江"), ("慈溪", "宁波", "浙江"),
    ("象山", "宁波", "浙江"),
    ("海宁", "嘉兴", "浙江"), ("桐乡", "嘉兴", "浙江"), ("平湖", "嘉兴", "浙江"),
    ("嘉善", "嘉兴", "浙江"), ("海盐", "嘉兴", "浙江"),
    ("乐清", "温州", "浙江"), ("瑞安", "温州", "浙江"),
    ("义乌", "金华", "浙江"), ("东阳", "金华", "浙江"), ("永康", "金华", "浙江"),
    ("姑苏", "苏州", "江苏"), ("吴江", "苏州", "江苏"), ("昆山", "苏州", "江苏"),
    ("常熟", "苏州", "江苏"), ("张家港", "苏州", "江苏"), ("太仓", "苏州", "江苏"),
    ("江阴", "无锡", "江苏"), ("宜兴", "无锡", "江苏"),
    ("江宁", "南京", "江苏"), ("浦口", "南京", "江苏"), ("六合", "南京", "江苏"),
    ("溧水", "南京", "江苏"), ("高淳", "南京", "江苏"),
    ("天河", "广州", "广东"), ("越秀", "广州", "广东"), ("白云", "广州", "广东"),
    ("番禺", "广州", "广东"), ("花都", "广州", "广东"), ("增城", "广州", "广东"),
    ("从化", "广州", "广东"),
    ("福田", "深圳", "广东"), ("罗湖", "深圳", "广东"), ("南山", "深圳", "广东"),
    ("宝安", "深圳", "广东"), ("龙岗", "深圳", "广东"), ("龙华", "深圳", "广东"),
    ("顺德", "佛山", "广东"), ("南海", "佛山", "广东"),
    ("锦江", "成都", "四川"), ("武侯", "成都", "四川"), ("双流", "成都", "四川"),
    ("温江", "成都", "四川"), ("郫都", "成都", "四川"), ("都江堰", "成都", "四川"),
    ("彭州", "成都", "四川"),
    ("康定", "甘孜", "四川"),
    ("武昌", "武汉", "湖北"), ("汉口", "武汉", "湖北"), ("汉阳", "武汉", "湖北"),
    ("江夏", "武汉", "湖北"), ("黄陂", "武汉", "湖北"),
    ("雁塔", "西安", "陕西"), ("未央", "西安", "陕西"), ("临潼", "西安", "陕西"),
    ("长安", "西安", "陕西"),
    ("思明", "厦门", "福建"), ("集美", "厦门", "福建"),
    ("晋江", "泉州", "福建"), ("石狮", "泉州", "福建"),
    ("景洪", "西双版纳", "云南"),
    ("延吉", "延边", "吉林"),
];

/// (province, cities). Capitals first; names that are also province names go last.
const CITIES: &[(&str, &[&str])] = &[
    ("北京", &["北京"]),
    ("上海", &["上海"]),
    ("天津", &["天津"]),
    ("重庆", &["重庆"]),
    ("黑龙江", &["哈尔滨", "齐齐哈尔", "牡丹江", "佳木斯", "大庆", "绥化", "黑河", "伊春", "鸡西", "鹤岗", "双鸭山", "七台河", "大兴安岭"]),
    ("吉林", &["长春", "四平", "辽源", "通化", "白山", "松原", "白城", "延边", "吉林"]),
    ("辽宁", &["沈阳", "大连", "鞍山", "抚顺", "本溪", "丹东", "锦州", "营口", "阜新", "辽阳", "盘锦", "铁岭", "朝阳", "葫芦岛"]),
    ("内蒙古", &["呼和浩特", "包头", "乌海", "赤峰", "通辽", "鄂尔多斯", "呼伦贝尔", "巴彦淖尔", "乌兰察布"]),
    ("河北", &["石家庄", "唐山", "秦皇岛", "邯郸", "邢台", "保定", "张家口", "承德", "沧州", "廊坊", "衡水"]),
    ("山西", &["太原", "大同", "阳泉", "长治", "晋城", "朔州", "晋中", "运城", "忻州", "临汾", "吕梁"]),
    ("陕西", &["西安", "铜川", "宝鸡", "咸阳", "渭南", "延安", "汉中", "榆林", "安康", "商洛"]),
    ("山东", &["济南", "青岛", "淄博", "枣庄", "东营", "烟台", "潍坊", "济宁", "泰安", "威海", "日照", "临沂", "德州", "聊城", "滨州", "菏泽"]),
    ("新疆", &["乌鲁木齐", "克拉玛依", "吐鲁番", "哈密", "喀什", "伊犁", "石河子"]),
    ("西藏", &["拉萨", "日喀则", "林芝", "昌都", "山南", "那曲"]),
    ("青海", &["西宁", "海东", "格尔木"]),
    ("甘肃", &["兰州", "嘉峪关", "金昌", "白银", "天水", "武威", "张掖", "平凉", "酒泉", "庆阳", "定西", "陇南"]),
    ("宁夏", &["银川", "石嘴山", "吴忠", "固原", "中卫"]),
    ("河南", &["郑州", "开封", "洛阳", "平顶山", "安阳", "鹤壁", "新乡", "焦作", "濮阳", "许昌", "漯河", "三门峡", "南阳", "商丘", "信阳", "周口", "驻马店"]),
    ("江苏", &["南京", "无锡", "徐州", "常州", "苏州", "南通", "连云港", "淮安", "盐城", "扬州", "镇江", "泰州", "宿迁"]),
    ("湖北", &["武汉", "黄石", "十堰", "宜昌", "襄阳", "鄂州", "荆门", "孝感", "荆州", "黄冈", "咸宁", "随州", "恩施"]),
    ("浙江", &["杭州", "宁波", "温州", "嘉兴", "湖州", "绍兴", "金华", "衢州", "舟山", "台州", "丽水"]),
    ("安徽", &["合肥", "芜湖", "蚌埠", "淮南", "马鞍山", "淮北", "铜陵", "安庆", "黄山", "滁州", "阜阳", "宿州", "六安", "亳州", "池州", "宣城"]),
    ("福建", &["福州", "厦门", "莆田", "三明", "泉州", "漳州", "南平", "龙岩", "宁德"]),
    ("江西", &["南昌", "景德镇", "萍乡", "九江", "新余", "鹰潭", "赣州", "吉安", "宜春", "抚州", "上饶"]),
    ("湖南", &["长沙", "株洲", "湘潭", "衡阳", "邵阳", "岳阳", "常德", "张家界", "益阳", "郴州", "永州", "怀化", "娄底"]),
    ("贵州", &["贵阳", "六盘水", "遵义", "安顺", "毕节", "铜仁"]),
    ("四川", &["成都", "自贡", "攀枝花", "泸州", "德阳", "绵阳", "广元", "遂宁", "内江", "乐山", "南充", "眉山", "宜宾", "广安", "达州", "雅安", "巴中", "资阳", "甘孜", "阿坝", "凉山"]),
    ("广东", &["广州", "韶关", "深圳", "珠海", "汕头", "佛山", "江门", "湛江", "茂名", "肇庆", "惠州", "梅州", "汕尾", "河源", "阳江", "清远", "东莞", "中山", "潮州", "揭阳", "云浮"]),
    ("云南", &["昆明", "曲靖", "玉溪", "保山", "昭通", "丽江", "普洱", "临沧", "大理", "红河", "文山", "楚雄", "西双版纳"]),
    ("广西", &["南宁", "柳州", "桂林", "梧州", "北海", "防城港", "钦州", "贵港", "玉林", "百色", "贺州", "河池", "来宾", "崇左"]),
    ("海南", &["海口", "三亚", "三沙", "儋州"]),
    ("香港", &["香港"]),
    ("澳门", &["澳门"]),
    ("台湾", &["台北", "高雄", "台中", "台南", "新北", "桃园"]),
];

pub fn is_municipality(name: &str) -> bool {
    MUNICIPALITIES.contains(&name)
}

/// District-table containment match.
pub fn lookup_district(name: &str) -> Option<AdministrativeUnit> {
    if name.is_empty() {
        return None;
    }

    DISTRICTS
        .iter()
        .find(|(district, _, _)| name.contains(district))
        .map(|(district, city, province)| AdministrativeUnit::new(*province, *city, *district))
}

/// City-table containment match. Municipalities fill all three fields.
pub fn lookup_city(name: &str) -> Option<AdministrativeUnit> {
    if name.is_empty() {
        return None;
    }

    CITIES.iter().find_map(|(province, cities)| {
        cities
            .iter()
            .find(|city| name.contains(*city))
            .map(|city| AdministrativeUnit::city_level(*province, *city))
    })
}

/// District table first, then city table.
pub fn lookup_hierarchy(name: &str) -> Option<AdministrativeUnit> {
    lookup_district(name).or_else(|| lookup_city(name))
}

/// Province of a city listed in the city table.
pub fn province_of_city(city: &str) -> Option<&'static str> {
    CITIES
        .iter()
        .find(|(_, cities)| cities.contains(&city))
        .map(|(province, _)| *province)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn district_takes_priority_over_city() {
        let unit = lookup_hierarchy("杭州余杭").unwrap();
        assert_eq!(unit, AdministrativeUnit::new("浙江", "杭州", "余杭"));
    }

    #[test]
    fn longer_query_still_matches_contained_key() {
        let unit = lookup_hierarchy("浙江省嘉兴市").unwrap();
        assert_eq!(unit, AdministrativeUnit::city_level("浙江", "嘉兴"));
        assert!(!unit.has_district());
    }

    #[test]
    fn query_shorter_than_key_does_not_match() {
        assert!(lookup_hierarchy("嘉").is_none());
    }

    #[test]
    fn municipality_district_keeps_municipality_as_city() {
        let unit = lookup_hierarchy("北京海淀").unwrap();
        assert_eq!(unit, AdministrativeUnit::new("北京", "北京", "海淀"));
    }

    #[test]
    fn municipality_fills_all_fields() {
        let unit = lookup_city("上海").unwrap();
        assert_eq!(unit, AdministrativeUnit::new("上海", "上海", "上海"));
        assert!(is_municipality("上海"));
        assert!(!is_municipality("杭州"));
    }

    #[test]
    fn province_only_input_yields_none() {
        assert!(lookup_hierarchy("浙江").is_none());
        assert!(lookup_hierarchy("").is_none());
    }

    #[test]
    fn capital_listed_before_province_named_city() {
        assert_eq!(lookup_city("吉林长春").unwrap().city, "长春");
        assert_eq!(lookup_city("吉林").unwrap(), AdministrativeUnit::city_level("吉林", "吉林"));
    }

    #[test]
    fn every_district_belongs_to_a_listed_city() {
        for (district, city, province) in DISTRICTS {
            assert_ne!(district, city);
            assert_eq!(province_of_city(city), Some(*province), "{district} -> {city}");
        }
    }
}
