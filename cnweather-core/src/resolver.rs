use crate::{
    data::ReferenceData,
    model::{CityCodeEntry, ProvinceInfo},
};

/// Maps place names to weather.com.cn city codes.
///
/// All scans walk the dictionary in table order and return the first hit, so
/// results are reproducible for a given table.
#[derive(Debug, Clone, Copy)]
pub struct CodeResolver<'a> {
    data: &'a ReferenceData,
}

impl<'a> CodeResolver<'a> {
    pub fn new(data: &'a ReferenceData) -> Self {
        Self { data }
    }

    pub fn resolve_code(&self, name: &str) -> Option<&'a str> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        if let Some(code) = self.data.code(name) {
            tracing::debug!(name, code, "Exact city code match");
            return Some(code);
        }

        if let Some(entry) = containment_scan(self.data.cities().iter(), name) {
            tracing::debug!(name, matched = %entry.name, code = %entry.code, "Containment city code match");
            return Some(entry.code.as_str());
        }

        let province = self.data.province_prefix_of(name)?;
        let rest = name[province.name.len()..].trim();
        if rest.is_empty() {
            return None;
        }

        let scoped = self.cities_in_province(&province.name);
        let entry = containment_scan(scoped.into_iter(), rest)?;
        tracing::debug!(name, province = %province.name, matched = %entry.name, code = %entry.code, "Province-scoped city code match");
        Some(entry.code.as_str())
    }

    /// Province whose code prefix owns `code`.
    pub fn province_of_code(&self, code: &str) -> Option<&'a ProvinceInfo> {
        self.data.provinces().iter().find(|p| p.owns_code(code))
    }

    /// Dictionary cities of a province, in table order.
    pub fn cities_in_province(&self, province: &str) -> Vec<&'a CityCodeEntry> {
        let Some(info) = self.data.province(province) else {
            return Vec::new();
        };

        self.data.cities().iter().filter(|entry| info.owns_code(&entry.code)).collect()
    }
}

fn containment_scan<'e>(
    mut entries: impl Iterator<Item = &'e CityCodeEntry>,
    query: &str,
) -> Option<&'e CityCodeEntry> {
    entries.find(|entry| {
        !entry.name.is_empty() && (query.contains(&entry.name) || entry.name.contains(query))
    })
}
