// ============================================================
// VALUE TAXONOMY
// ============================================================
// Fixed four-dimension catalog and the LLM-derived tag system

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// One of the four top-level value dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueDimension {
    CrowdScenario,
    FunctionalValue,
    AssuranceValue,
    ExperienceValue,
}

impl ValueDimension {
    pub const ALL: [ValueDimension; 4] = [
        ValueDimension::CrowdScenario,
        ValueDimension::FunctionalValue,
        ValueDimension::AssuranceValue,
        ValueDimension::ExperienceValue,
    ];
}

impl std::fmt::Display for ValueDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueDimension::CrowdScenario => write!(f, "crowd_scenario"),
            ValueDimension::FunctionalValue => write!(f, "functional_value"),
            ValueDimension::AssuranceValue => write!(f, "assurance_value"),
            ValueDimension::ExperienceValue => write!(f, "experience_value"),
        }
    }
}

/// A top-level dimension with its display name and ordered sub-dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionSpec {
    pub dimension: ValueDimension,
    /// Display name, also the JSON key used in LLM payloads
    pub name: String,
    /// Sub-dimension names; each one becomes a derived output column
    pub sub_dimensions: Vec<String>,
}

impl DimensionSpec {
    fn new(dimension: ValueDimension, name: &str, sub_dimensions: &[&str]) -> Self {
        Self {
            dimension,
            name: name.to_string(),
            sub_dimensions: sub_dimensions.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Read-only catalog of value dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub dimensions: Vec<DimensionSpec>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            dimensions: vec![
                DimensionSpec::new(
                    ValueDimension::CrowdScenario,
                    "人群与场景",
                    &[
                        "用户需求与痛点-使用场景",
                        "用户需求与痛点-购买动机",
                        "用户需求与痛点-未被满足的需求",
                        "用户需求与痛点-痛点问题",
                    ],
                ),
                DimensionSpec::new(
                    ValueDimension::FunctionalValue,
                    "功能价值",
                    &[
                        "产品反馈-产品优点",
                        "产品反馈-产品缺点",
                        "产品反馈-用户期望建议",
                        "产品反馈-设计与外观",
                    ],
                ),
                DimensionSpec::new(
                    ValueDimension::AssuranceValue,
                    "保障价值",
                    &["服务评价-物流配送", "服务评价-售后服务", "服务评价-售前服务"],
                ),
                DimensionSpec::new(
                    ValueDimension::ExperienceValue,
                    "体验价值",
                    &[
                        "品牌形象与口碑-推荐意愿原因分析",
                        "品牌形象与口碑-是否愿意推荐给他人",
                        "品牌形象与口碑-品牌印象",
                        "感官感受",
                        "价格感知",
                    ],
                ),
            ],
        }
    }
}

impl Taxonomy {
    pub fn spec(&self, dimension: ValueDimension) -> Option<&DimensionSpec> {
        self.dimensions.iter().find(|d| d.dimension == dimension)
    }

    /// Derived column names in output order: dimension order, then sub-dimension order.
    pub fn derived_columns(&self) -> Vec<&str> {
        self.dimensions
            .iter()
            .flat_map(|d| d.sub_dimensions.iter().map(|s| s.as_str()))
            .collect()
    }

    /// (dimension name, sub-dimension name) pairs in derived column order.
    pub fn column_paths(&self) -> Vec<(&str, &str)> {
        self.dimensions
            .iter()
            .flat_map(|d| {
                d.sub_dimensions
                    .iter()
                    .map(move |s| (d.name.as_str(), s.as_str()))
            })
            .collect()
    }

    /// Tag system with every catalog slot present and empty.
    pub fn empty_tag_system(&self) -> TagSystem {
        let mut system = TagSystem::new();
        for (dimension, sub) in self.column_paths() {
            system.insert(dimension, sub, Vec::new());
        }
        system
    }

    pub fn validate(&self) -> Result<(), String> {
        for dimension in ValueDimension::ALL {
            let count = self
                .dimensions
                .iter()
                .filter(|d| d.dimension == dimension)
                .count();
            if count != 1 {
                return Err(format!(
                    "taxonomy must define dimension '{}' exactly once (found {})",
                    dimension, count
                ));
            }
        }

        let mut seen = HashSet::new();
        for spec in &self.dimensions {
            if spec.name.trim().is_empty() {
                return Err(format!("dimension '{}' has an empty name", spec.dimension));
            }
            if spec.sub_dimensions.is_empty() {
                return Err(format!("dimension '{}' has no sub-dimensions", spec.name));
            }
            for sub in &spec.sub_dimensions {
                if sub.trim().is_empty() {
                    return Err(format!("dimension '{}' has an empty sub-dimension", spec.name));
                }
                if !seen.insert(sub.as_str()) {
                    return Err(format!("sub-dimension '{}' is defined twice", sub));
                }
            }
        }
        Ok(())
    }
}

/// Three-level tag tree: dimension name -> sub-dimension name -> tags.
///
/// Used both for the corpus-wide tag system and for per-review results,
/// where each leaf carries a polarity marker such as `[正面]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSystem(BTreeMap<String, BTreeMap<String, Vec<String>>>);

impl TagSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dimension: &str, sub_dimension: &str, tags: Vec<String>) {
        self.0
            .entry(dimension.to_string())
            .or_default()
            .insert(sub_dimension.to_string(), tags);
    }

    pub fn tags(&self, dimension: &str, sub_dimension: &str) -> &[String] {
        self.0
            .get(dimension)
            .and_then(|subs| subs.get(sub_dimension))
            .map(|tags| tags.as_slice())
            .unwrap_or(&[])
    }

    pub fn dimensions(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, Vec<String>>)> {
        self.0.iter()
    }

    pub fn tag_count(&self) -> usize {
        self.0
            .values()
            .flat_map(|subs| subs.values())
            .map(|tags| tags.len())
            .sum()
    }

    /// Builds a tag system from an LLM payload, filling every catalog slot.
    ///
    /// Sub-dimensions the model adds under a known dimension are kept;
    /// unknown top-level keys are ignored.
    pub fn from_payload(payload: &Value, taxonomy: &Taxonomy) -> Self {
        let mut system = taxonomy.empty_tag_system();
        for spec in &taxonomy.dimensions {
            let Some(subs) = payload.get(&spec.name).and_then(Value::as_object) else {
                continue;
            };
            for (sub, leaf) in subs {
                system.insert(&spec.name, sub, leaf_tags(leaf));
            }
        }
        system
    }

    /// Projects an LLM payload onto the shape of `reference`; keys outside it are dropped.
    pub fn project(payload: &Value, reference: &TagSystem) -> Self {
        let mut system = TagSystem::new();
        for (dimension, subs) in reference.dimensions() {
            for sub in subs.keys() {
                let tags = payload
                    .get(dimension)
                    .and_then(|d| d.get(sub))
                    .map(leaf_tags)
                    .unwrap_or_default();
                system.insert(dimension, sub, tags);
            }
        }
        system
    }
}

fn leaf_tags(leaf: &Value) -> Vec<String> {
    match leaf {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_catalog_has_sixteen_columns() {
        let taxonomy = Taxonomy::default();
        let columns = taxonomy.derived_columns();

        assert_eq!(columns.len(), 16);
        assert_eq!(columns[0], "用户需求与痛点-使用场景");
        assert_eq!(columns[15], "价格感知");
        assert!(taxonomy.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_dimension() {
        let mut taxonomy = Taxonomy::default();
        taxonomy.dimensions.pop();

        let err = taxonomy.validate().unwrap_err();
        assert!(err.contains("experience_value"));
    }

    #[test]
    fn test_validate_rejects_duplicate_sub_dimension() {
        let mut taxonomy = Taxonomy::default();
        taxonomy.dimensions[1]
            .sub_dimensions
            .push("感官感受".to_string());

        assert!(taxonomy.validate().is_err());
    }

    #[test]
    fn test_from_payload_fills_missing_slots() {
        let taxonomy = Taxonomy::default();
        let payload = json!({
            "功能价值": {
                "产品反馈-产品优点": ["清洁效果", "  ", 42],
                "产品反馈-新增分类": ["噪音"]
            },
            "未知维度": { "x": ["y"] }
        });

        let system = TagSystem::from_payload(&payload, &taxonomy);

        assert_eq!(system.tags("功能价值", "产品反馈-产品优点"), ["清洁效果"]);
        assert_eq!(system.tags("功能价值", "产品反馈-新增分类"), ["噪音"]);
        assert!(system.tags("人群与场景", "用户需求与痛点-使用场景").is_empty());
        assert!(system.tags("未知维度", "x").is_empty());
        assert_eq!(system.tag_count(), 2);
    }

    #[test]
    fn test_project_keeps_reference_shape_only() {
        let taxonomy = Taxonomy::default();
        let reference = taxonomy.empty_tag_system();
        let payload = json!({
            "体验价值": {
                "价格感知": ["[正面]性价比"],
                "额外": ["[负面]忽略"]
            }
        });

        let projected = TagSystem::project(&payload, &reference);

        assert_eq!(projected.tags("体验价值", "价格感知"), ["[正面]性价比"]);
        assert!(projected.tags("体验价值", "额外").is_empty());
        assert_eq!(projected.tag_count(), 1);
    }
}
