//! YAML parsing for the parameter document

use contracts::EvalError;
use serde_yaml::{Mapping, Value};

/// Parse the parameter document into a key/value mapping
///
/// The document must be a flat mapping at the top level.
pub fn parse(content: &str) -> Result<Mapping, EvalError> {
    let value: Value = serde_yaml::from_str(content).map_err(|e| EvalError::Config {
        message: format!("YAML parse error: {e}"),
        source: Some(Box::new(e)),
    })?;

    match value {
        Value::Mapping(map) => Ok(map),
        other => Err(EvalError::config_parse(format!(
            "parameter document must be a mapping, got {}",
            type_name(&other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_mapping() {
        let map = parse("img_width: 240\nsigma_a: 0.083\n").unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_parse_syntax_error() {
        let result = parse("img_width: [unclosed");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), EvalError::Config { .. }));
    }

    #[test]
    fn test_parse_non_mapping_rejected() {
        let result = parse("- just\n- a\n- list\n");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("mapping"));
    }
}
