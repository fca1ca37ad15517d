//! Maps physical column names to the sentiment/tag/category roles.
//!
//! Rules are evaluated per column in their configured order; the first
//! matching rule claims the column, and a later column claiming the same
//! role replaces an earlier one.

use regex::{Regex, RegexBuilder};
use tracing::{debug, info, warn};

use crate::domain::column_roles::{
    ColumnRole, ColumnRoleMap, ResolvedColumn, RolePatterns,
};
use crate::domain::error::{AppError, Result};

pub struct ColumnResolver {
    rules: Vec<(ColumnRole, Regex)>,
    tag_fallback: Regex,
    category_fallback: Regex,
}

impl ColumnResolver {
    pub fn new(patterns: &RolePatterns) -> Result<Self> {
        let rules = patterns
            .rules
            .iter()
            .map(|rule| Ok((rule.role, compile(&rule.pattern)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            rules,
            tag_fallback: compile(&patterns.tag_fallback)?,
            category_fallback: compile(&patterns.category_fallback)?,
        })
    }

    pub fn resolve(&self, columns: &[String]) -> Result<ColumnRoleMap> {
        let mut sentiment: Option<&str> = None;
        let mut tag: Option<&str> = None;
        let mut category: Option<&str> = None;

        for column in columns {
            let Some(role) = self
                .rules
                .iter()
                .find(|(_, pattern)| pattern.is_match(column))
                .map(|(role, _)| *role)
            else {
                continue;
            };

            let slot = match role {
                ColumnRole::Sentiment => &mut sentiment,
                ColumnRole::Tag => &mut tag,
                ColumnRole::Category => &mut category,
            };
            if let Some(previous) = slot.replace(column.as_str()) {
                debug!(%role, previous, column = %column, "Later column takes over role");
            }
        }

        let sentiment = sentiment
            .map(ResolvedColumn::direct)
            .ok_or_else(|| not_found(ColumnRole::Sentiment, columns))?;

        let tag = match tag {
            Some(name) => ResolvedColumn::direct(name),
            None => {
                warn!("No tag column matched, trying fallback pattern");
                columns
                    .iter()
                    .find(|c| self.tag_fallback.is_match(c))
                    .map(|c| ResolvedColumn::fallback(c))
                    .ok_or_else(|| not_found(ColumnRole::Tag, columns))?
            }
        };

        let category = match category {
            Some(name) => Some(ResolvedColumn::direct(name)),
            None => columns
                .iter()
                .find(|c| c.as_str() != tag.name && self.category_fallback.is_match(c))
                .map(|c| ResolvedColumn::fallback(c)),
        };

        info!(
            sentiment = %sentiment.name,
            tag = %tag.name,
            category = category.as_ref().map(|c| c.name.as_str()).unwrap_or("-"),
            "Column roles resolved"
        );

        Ok(ColumnRoleMap {
            sentiment,
            tag,
            category,
        })
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| AppError::ConfigError(format!("Invalid column pattern '{}': {}", pattern, e)))
}

fn not_found(role: ColumnRole, columns: &[String]) -> AppError {
    AppError::ColumnNotFound {
        role: role.to_string(),
        available: columns.to_vec(),
    }
}
