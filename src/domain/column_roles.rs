// ============================================================
// COLUMN ROLES
// ============================================================
// Logical column purposes and the rules that map them to headers

use super::taxonomy::ValueDimension;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Sentiment,
    Tag,
    Category,
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnRole::Sentiment => write!(f, "sentiment"),
            ColumnRole::Tag => write!(f, "tag"),
            ColumnRole::Category => write!(f, "category"),
        }
    }
}

/// One `(role, pattern)` rule. Patterns are matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRule {
    pub role: ColumnRole,
    pub pattern: String,
}

/// Prioritized role rules plus the broader fallback patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolePatterns {
    /// Evaluated in order for every header; the first matching rule claims it
    pub rules: Vec<RoleRule>,
    pub tag_fallback: String,
    pub category_fallback: String,
}

impl Default for RolePatterns {
    fn default() -> Self {
        Self {
            rules: vec![
                RoleRule {
                    role: ColumnRole::Sentiment,
                    pattern: r"情感(分析)?|sentiment|评[价分]?[星]?[级]?\d*|score|star|rating|等级"
                        .to_string(),
                },
                RoleRule {
                    role: ColumnRole::Tag,
                    pattern: r"标签|tag|关键词|特征|场景|keyword".to_string(),
                },
                RoleRule {
                    role: ColumnRole::Category,
                    pattern: r"功能|分类|category|类型|type|质量|体验|保障|feature|function"
                        .to_string(),
                },
            ],
            tag_fallback: r"特征|场景|feature|scenario".to_string(),
            category_fallback: r"功能|质量|体验|保障|function|quality|experience|assurance"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Direct,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedColumn {
    pub name: String,
    pub resolution: Resolution,
}

impl ResolvedColumn {
    pub fn direct(name: &str) -> Self {
        Self {
            name: name.to_string(),
            resolution: Resolution::Direct,
        }
    }

    pub fn fallback(name: &str) -> Self {
        Self {
            name: name.to_string(),
            resolution: Resolution::Fallback,
        }
    }
}

/// Physical columns backing each role for one input table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRoleMap {
    pub sentiment: ResolvedColumn,
    pub tag: ResolvedColumn,
    pub category: Option<ResolvedColumn>,
}

impl ColumnRoleMap {
    /// Column whose tags feed `dimension`.
    ///
    /// Crowd/scenario always reads the tag column; the other dimensions read
    /// the category column and reuse the tag column when there is none.
    pub fn column_for(&self, dimension: ValueDimension) -> &str {
        match (dimension, &self.category) {
            (ValueDimension::CrowdScenario, _) | (_, None) => &self.tag.name,
            (_, Some(category)) => &category.name,
        }
    }
}
