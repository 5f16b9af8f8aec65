//! YAML processing utilities.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use yaml_rust_davvid::{Yaml, YamlEmitter};

/// Renders reports and configuration as YAML. Multi-line values, such as
/// markdown check messages, are emitted as literal blocks.
pub fn to_yaml<T: Serialize>(data: &T) -> Result<String> {
    let value = serde_yaml::to_value(data).context("Failed to serialize to YAML value")?;

    let mut output = String::new();
    let mut emitter = YamlEmitter::new(&mut output);
    emitter.multiline_strings(true);
    emitter
        .dump(&emitter_node(&value))
        .context("Failed to emit YAML")?;
    Ok(output)
}

fn emitter_node(value: &serde_yaml::Value) -> Yaml {
    use serde_yaml::Value;

    match value {
        Value::Null => Yaml::Null,
        Value::Bool(flag) => Yaml::Boolean(*flag),
        // Counts are integers; anything else keeps its textual form.
        Value::Number(number) => number
            .as_i64()
            .map_or_else(|| Yaml::Real(number.to_string()), Yaml::Integer),
        Value::String(text) => Yaml::String(text.clone()),
        Value::Sequence(items) => Yaml::Array(items.iter().map(emitter_node).collect()),
        Value::Mapping(entries) => Yaml::Hash(
            entries
                .iter()
                .map(|(key, entry)| (emitter_node(key), emitter_node(entry)))
                .collect(),
        ),
        Value::Tagged(tagged) => emitter_node(&tagged.value),
    }
}

/// Deserializes a YAML (or JSON) string.
pub fn from_yaml<T: for<'de> Deserialize<'de>>(yaml: &str) -> Result<T> {
    serde_yaml::from_str(yaml).context("Failed to deserialize YAML")
}

/// Reads and parses a YAML (or JSON) file.
pub fn read_yaml_file<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> Result<T> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read file: {}", path.as_ref().display()))?;

    from_yaml(&content)
        .with_context(|| format!("Failed to parse file: {}", path.as_ref().display()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn to_yaml_emits_mapping() {
        let mut map = BTreeMap::new();
        map.insert("kind", "feature");
        let yaml = to_yaml(&map).unwrap();
        assert!(yaml.contains("kind: feature"));
    }

    #[test]
    fn multiline_messages_become_blocks() {
        let mut map = BTreeMap::new();
        map.insert("message", "first line\nsecond line");
        let yaml = to_yaml(&map).unwrap();
        assert!(yaml.contains("second line"));
        assert!(!yaml.contains("\\n"));
    }

    #[test]
    fn from_yaml_accepts_json() {
        let parsed: BTreeMap<String, u32> = from_yaml(r#"{"additions": 3}"#).unwrap();
        assert_eq!(parsed["additions"], 3);
    }

    #[test]
    fn read_yaml_file_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_yaml_file::<BTreeMap<String, String>, _>(dir.path().join("nope.yaml"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
