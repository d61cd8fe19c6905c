use crate::{
    data::ReferenceData,
    hierarchy::{self, is_municipality},
    model::AdministrativeUnit,
};

/// Produces a best-guess (province, city, district) triple for free text.
#[derive(Debug, Clone, Copy)]
pub struct GeoCompleter<'a> {
    data: &'a ReferenceData,
}

impl<'a> GeoCompleter<'a> {
    pub fn new(data: &'a ReferenceData) -> Self {
        Self { data }
    }

    /// Never fails; falls back to `{"", raw, raw}`.
    pub fn complete(&self, raw: &str) -> AdministrativeUnit {
        if let Some(unit) = hierarchy::lookup_district(raw) {
            tracing::debug!(input = raw, ?unit, "Completed from district table");
            return unit;
        }

        if let Some(unit) = hierarchy::lookup_city(raw) {
            let unit = if is_municipality(&unit.city) {
                AdministrativeUnit::new(unit.city.clone(), unit.city.clone(), unit.city)
            } else {
                unit
            };
            tracing::debug!(input = raw, ?unit, "Completed from city table");
            return unit;
        }

        if let Some(province) = self.data.province_within(raw) {
            let matched = self
                .data
                .cities()
                .iter()
                .filter(|entry| {
                    province.owns_code(&entry.code)
                        || hierarchy::province_of_city(&entry.name) == Some(province.name.as_str())
                })
                .find(|entry| entry.name != province.name && raw.contains(&entry.name));

            if let Some(entry) = matched {
                tracing::debug!(input = raw, province = %province.name, city = %entry.name, "Completed from province city list");
                return AdministrativeUnit::city_level(province.name.clone(), entry.name.clone());
            }

            tracing::debug!(input = raw, province = %province.name, "Only a province was recognised");
            return AdministrativeUnit::new(province.name.clone(), raw, raw);
        }

        tracing::debug!(input = raw, "No administrative match; treating input as a city");
        AdministrativeUnit::new("", raw, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CityCodeEntry;

    fn data_with_extra_city() -> ReferenceData {
        let mut cities = ReferenceData::embedded().cities().to_vec();
        cities.push(CityCodeEntry { name: "乌镇".into(), code: "101210302".into() });
        ReferenceData::from_parts(cities, ReferenceData::embedded().provinces().to_vec())
    }

    #[test]
    fn district_input_returns_full_triple() {
        let data = ReferenceData::embedded();
        let unit = GeoCompleter::new(&data).complete("义乌");
        assert_eq!(unit, AdministrativeUnit::new("浙江", "金华", "义乌"));
    }

    #[test]
    fn province_plus_city_resolves_city() {
        let data = ReferenceData::embedded();
        let unit = GeoCompleter::new(&data).complete("浙江嘉兴");
        assert_eq!(unit, AdministrativeUnit::city_level("浙江", "嘉兴"));
    }

    #[test]
    fn municipality_fills_all_fields() {
        let data = ReferenceData::embedded();
        let unit = GeoCompleter::new(&data).complete("重庆");
        assert_eq!(unit, AdministrativeUnit::new("重庆", "重庆", "重庆"));
    }

    #[test]
    fn province_scoped_dictionary_scan() {
        let data = data_with_extra_city();
        let unit = GeoCompleter::new(&data).complete("浙江乌镇");
        assert_eq!(unit, AdministrativeUnit::city_level("浙江", "乌镇"));
    }

    #[test]
    fn province_only_keeps_raw_as_city() {
        let data = ReferenceData::embedded();
        let unit = GeoCompleter::new(&data).complete("浙江某村");
        assert_eq!(unit, AdministrativeUnit::new("浙江", "浙江某村", "浙江某村"));
    }

    #[test]
    fn unknown_input_has_empty_province() {
        let data = ReferenceData::embedded();
        let unit = GeoCompleter::new(&data).complete("London");
        assert_eq!(unit, AdministrativeUnit::new("", "London", "London"));
    }
}
