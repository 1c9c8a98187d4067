use super::registry::{EntityPattern, EntityRegistry, PatternKind};
use crate::types::{EntityValue, StructuredData};

/// Apply every pattern in `registry` to `text`.
///
/// A pattern with no match leaves its entity out of the result. One match is stored
/// as [`EntityValue::Single`], several as [`EntityValue::Multiple`] in order of
/// appearance. A compound pattern splits its first match into its fields, with all
/// whitespace removed from each field.
pub fn extract_entities(text: &str, registry: &EntityRegistry) -> StructuredData {
    let mut data = StructuredData::new();

    for pattern in registry.patterns() {
        match pattern.kind() {
            PatternKind::Single => {
                let matches = single_matches(pattern, text);
                if let Some(value) = EntityValue::from_matches(matches) {
                    data.insert(pattern.name().to_string(), value);
                }
            }
            PatternKind::Compound { fields } => {
                let mut captures = pattern.regex().captures_iter(text);
                let Some(first) = captures.next() else {
                    continue;
                };

                let extra = captures.count();
                if extra > 0 {
                    tracing::debug!(
                        "Pattern '{}' matched {} more time(s); keeping the first match",
                        pattern.name(),
                        extra
                    );
                }

                for (index, field) in fields.iter().enumerate() {
                    if let Some(group) = first.get(index + 1) {
                        data.insert(field.clone(), EntityValue::Single(strip_whitespace(group.as_str())));
                    }
                }
            }
        }
    }

    data
}

fn single_matches(pattern: &EntityPattern, text: &str) -> Vec<String> {
    pattern
        .regex()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
        .map(|m| m.as_str().to_string())
        .collect()
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}
