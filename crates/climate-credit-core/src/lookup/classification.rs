use serde::Deserialize;
use serde_json::Value;

use crate::error::ClimateCreditError;
use crate::ClimateCreditResult;

// ---------------------------------------------------------------------------
// Sector mapper
// ---------------------------------------------------------------------------

/// Industry name -> sector code, the segment key of the corporate PD table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorMapper {
    sectors: Vec<(String, Vec<String>)>,
}

impl SectorMapper {
    /// Build from `{sector: [industry, ...]}`, keeping file order.
    pub fn from_json(value: &Value) -> ClimateCreditResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            ClimateCreditError::reference("industry_to_sector", "expected an object keyed by sector")
        })?;

        let mut sectors = Vec::with_capacity(object.len());
        for (sector, industries) in object {
            let industries: Vec<String> = serde_json::from_value(industries.clone())
                .map_err(|e| ClimateCreditError::reference("industry_to_sector", e.to_string()))?;
            sectors.push((sector.clone(), industries));
        }
        Ok(SectorMapper { sectors })
    }

    /// First sector listing `industry` verbatim.
    pub fn sector(&self, industry: &str) -> Option<&str> {
        self.sectors
            .iter()
            .find(|(_, industries)| industries.iter().any(|i| i == industry))
            .map(|(sector, _)| sector.as_str())
    }
}

// ---------------------------------------------------------------------------
// Industry risk groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct IndustryEntry {
    #[serde(rename = "Industry")]
    industry: String,
}

/// Industries grouped by transition-risk group. The group number is the
/// 1-based position of the group in the file, whatever its label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndustryClassification {
    groups: Vec<(String, Vec<String>)>,
}

impl IndustryClassification {
    /// Build from `{"Group 1": [{"Industry": ...}, ...], ...}`.
    pub fn from_json(value: &Value) -> ClimateCreditResult<Self> {
        let table = "classification_table_by_industry";
        let object = value
            .as_object()
            .ok_or_else(|| ClimateCreditError::reference(table, "expected an object keyed by group"))?;

        let mut groups = Vec::with_capacity(object.len());
        for (label, entries) in object {
            let entries: Vec<IndustryEntry> = serde_json::from_value(entries.clone())
                .map_err(|e| ClimateCreditError::reference(table, e.to_string()))?;
            groups.push((
                label.clone(),
                entries.into_iter().map(|e| e.industry).collect(),
            ));
        }
        Ok(IndustryClassification { groups })
    }

    /// Risk group (1-based) of the first group listing `industry`.
    pub fn group_of(&self, industry: &str) -> Option<u8> {
        self.groups
            .iter()
            .position(|(_, industries)| industries.iter().any(|i| i == industry))
            .and_then(|index| u8::try_from(index + 1).ok())
    }

    pub fn group_labels(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(label, _)| label.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_sector_wins() {
        let mapper = SectorMapper::from_json(&json!({
            "B": ["Mining", "Quarrying"],
            "C": ["Manufacturing", "Mining"]
        }))
        .unwrap();
        assert_eq!(mapper.sector("Mining"), Some("B"));
        assert_eq!(mapper.sector("Manufacturing"), Some("C"));
        assert_eq!(mapper.sector("mining"), None);
    }

    #[test]
    fn test_sector_mapper_rejects_non_list() {
        assert!(SectorMapper::from_json(&json!({ "B": "Mining" })).is_err());
        assert!(SectorMapper::from_json(&json!(["B"])).is_err());
    }

    #[test]
    fn test_group_is_position_not_label() {
        let classification = IndustryClassification::from_json(&json!({
            "Group 1": [{ "Industry": "Software" }],
            "Group 2": [{ "Industry": "Retail" }, { "Industry": "Hotels" }],
            "Heavy": [{ "Industry": "Cement" }]
        }))
        .unwrap();
        assert_eq!(classification.group_of("Software"), Some(1));
        assert_eq!(classification.group_of("Hotels"), Some(2));
        assert_eq!(classification.group_of("Cement"), Some(3));
        assert_eq!(classification.group_of("Banking"), None);
        let labels: Vec<&str> = classification.group_labels().collect();
        assert_eq!(labels, vec!["Group 1", "Group 2", "Heavy"]);
    }
}
