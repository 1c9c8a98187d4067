//! Named lexical patterns for identity fields.
//!
//! The registry is built once, validated up front and then only read. Workers share
//! it through an `Arc`; nothing in it changes while files are being processed.

use crate::{DocintakeError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Serializable form of one pattern, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDefinition {
    pub name: String,
    pub pattern: String,
    /// Entity names for the capture groups of a compound pattern, in group order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

impl PatternDefinition {
    pub fn single(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
            fields: None,
        }
    }

    pub fn compound(name: &str, pattern: &str, fields: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
            fields: Some(fields.iter().map(|f| f.to_string()).collect()),
        }
    }
}

/// How a pattern's match becomes entity values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternKind {
    /// Stored under the pattern's own name: capture group 1 if present, else the whole match.
    Single,
    /// Each capture group is stored under the matching field name.
    Compound { fields: Vec<String> },
}

#[derive(Debug, Clone)]
pub struct EntityPattern {
    name: String,
    regex: Regex,
    kind: PatternKind,
}

impl EntityPattern {
    pub fn new(definition: &PatternDefinition) -> Result<Self> {
        if definition.name.trim().is_empty() {
            return Err(DocintakeError::validation("entity pattern name must not be empty"));
        }

        let regex = Regex::new(&definition.pattern).map_err(|e| {
            DocintakeError::validation_with_source(
                format!("entity pattern '{}' does not compile", definition.name),
                e,
            )
        })?;
        let groups = regex.captures_len() - 1;

        let kind = match &definition.fields {
            None => {
                if groups > 1 {
                    return Err(DocintakeError::validation(format!(
                        "entity pattern '{}' has {} capture groups; a single-valued pattern may have at most one \
(list `fields` to make it compound)",
                        definition.name, groups
                    )));
                }
                PatternKind::Single
            }
            Some(fields) => {
                if fields.len() != groups {
                    return Err(DocintakeError::validation(format!(
                        "entity pattern '{}' names {} fields but has {} capture groups",
                        definition.name,
                        fields.len(),
                        groups
                    )));
                }
                if fields.iter().any(|f| f.trim().is_empty()) {
                    return Err(DocintakeError::validation(format!(
                        "entity pattern '{}' has an empty field name",
                        definition.name
                    )));
                }
                PatternKind::Compound { fields: fields.clone() }
            }
        };

        Ok(Self {
            name: definition.name.clone(),
            regex,
            kind,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn kind(&self) -> &PatternKind {
        &self.kind
    }

    /// Entity names this pattern can produce.
    pub fn output_names(&self) -> Vec<&str> {
        match &self.kind {
            PatternKind::Single => vec![self.name.as_str()],
            PatternKind::Compound { fields } => fields.iter().map(String::as_str).collect(),
        }
    }

    pub fn to_definition(&self) -> PatternDefinition {
        PatternDefinition {
            name: self.name.clone(),
            pattern: self.regex.as_str().to_string(),
            fields: match &self.kind {
                PatternKind::Single => None,
                PatternKind::Compound { fields } => Some(fields.clone()),
            },
        }
    }
}

/// Built-in patterns for Russian client paperwork.
pub fn builtin_definitions() -> Vec<PatternDefinition> {
    vec![
        PatternDefinition::single(
            "fio",
            r"([А-ЯЁ][а-яё]+(?:-[А-ЯЁ][а-яё]+)?\s+[А-ЯЁ][а-яё]+\s+[А-ЯЁ][а-яё]+)",
        ),
        PatternDefinition::single("birth_date", r"\b(\d{2}\.\d{2}\.\d{4})\b"),
        PatternDefinition::compound(
            "passport_series_number",
            r"\b(\d{2}\s?\d{2})\s*N?\s*(\d{6})\b",
            &["passport_series", "passport_number"],
        ),
        PatternDefinition::single("inn", r"\bИНН\s*(\d{10}|\d{12})\b"),
        PatternDefinition::single("snils", r"\b(\d{3}-\d{3}-\d{3}\s\d{2})\b"),
    ]
}

static BUILTIN_REGISTRY: Lazy<EntityRegistry> = Lazy::new(|| {
    EntityRegistry::from_definitions(&builtin_definitions())
        .expect("Built-in entity patterns are valid and should compile")
});

/// Ordered, immutable set of entity patterns.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    patterns: Vec<EntityPattern>,
}

impl EntityRegistry {
    pub fn builtin() -> Self {
        BUILTIN_REGISTRY.clone()
    }

    /// Compile and validate `definitions`.
    ///
    /// Two patterns may not produce the same entity name.
    pub fn from_definitions(definitions: &[PatternDefinition]) -> Result<Self> {
        let patterns = definitions.iter().map(EntityPattern::new).collect::<Result<Vec<_>>>()?;

        let mut seen = std::collections::HashSet::new();
        for pattern in &patterns {
            for name in pattern.output_names() {
                if !seen.insert(name) {
                    return Err(DocintakeError::validation(format!(
                        "entity name '{}' is produced by more than one pattern",
                        name
                    )));
                }
            }
        }

        Ok(Self { patterns })
    }

    /// The configured registry, or the built-ins when none is configured.
    pub fn from_config(definitions: Option<&[PatternDefinition]>) -> Result<Self> {
        match definitions {
            Some(definitions) => Self::from_definitions(definitions),
            None => Ok(Self::builtin()),
        }
    }

    pub fn patterns(&self) -> &[EntityPattern] {
        &self.patterns
    }

    pub fn get(&self, name: &str) -> Option<&EntityPattern> {
        self.patterns.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
