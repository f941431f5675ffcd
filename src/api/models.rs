use serde_json::{Map, Value};

use crate::api::ApiError;

/// A model offered by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub id: String,
    pub name: Option<String>,
}

impl Model {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// Human-facing label: the display name when the server sent one.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// The list shapes seen in the wild, in the order they are tried.
#[derive(Debug)]
enum ModelListShape {
    /// `{"data": [...]}` (OpenAI and Open WebUI)
    Data(Vec<Value>),
    /// `{"models": [...]}` (Ollama-style proxies)
    Models(Vec<Value>),
    /// `[...]`
    Bare(Vec<Value>),
}

impl ModelListShape {
    fn detect(body: Value) -> Result<Self, ApiError> {
        match body {
            Value::Array(entries) => Ok(ModelListShape::Bare(entries)),
            Value::Object(mut map) => {
                if let Some(entries) = take_list(&mut map, "data")? {
                    return Ok(ModelListShape::Data(entries));
                }
                if let Some(entries) = take_list(&mut map, "models")? {
                    return Ok(ModelListShape::Models(entries));
                }
                Err(ApiError::MalformedResponse(
                    "no model list in response".to_string(),
                ))
            }
            other => Err(ApiError::MalformedResponse(format!(
                "expected a model list, got {}",
                json_kind(&other)
            ))),
        }
    }

    fn into_entries(self) -> Vec<Value> {
        match self {
            ModelListShape::Data(entries)
            | ModelListShape::Models(entries)
            | ModelListShape::Bare(entries) => entries,
        }
    }
}

/// A missing or `null` field means "try the next shape"; anything else that
/// is not an array is an error rather than something to coerce.
fn take_list(map: &mut Map<String, Value>, field: &str) -> Result<Option<Vec<Value>>, ApiError> {
    match map.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(entries)) => Ok(Some(entries)),
        Some(other) => Err(ApiError::MalformedResponse(format!(
            "`{field}` is {}, not a list",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

fn non_empty_str<'a>(object: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// String ids as sent; numeric ids are kept in their decimal form.
fn entry_id(object: &Map<String, Value>) -> Option<String> {
    match object.get("id") {
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => non_empty_str(object, "id").map(str::to_owned),
    }
}

fn decode_entry(index: usize, entry: Value) -> Result<Model, ApiError> {
    match entry {
        Value::String(id) if !id.trim().is_empty() => Ok(Model::new(id.trim())),
        Value::Object(object) => {
            let name = non_empty_str(&object, "name").map(str::to_owned);
            let id = entry_id(&object)
                .or_else(|| name.clone())
                .ok_or_else(|| {
                    ApiError::MalformedResponse(format!("model #{index} has no id or name"))
                })?;
            Ok(Model { id, name })
        }
        other => Err(ApiError::MalformedResponse(format!(
            "model #{index} is {}",
            json_kind(&other)
        ))),
    }
}

/// Normalize a models-endpoint body into a flat, non-empty list.
pub fn decode_model_list(body: Value) -> Result<Vec<Model>, ApiError> {
    let entries = ModelListShape::detect(body)?.into_entries();
    if entries.is_empty() {
        return Err(ApiError::EmptyResult);
    }
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| decode_entry(index, entry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(models: &[Model]) -> Vec<&str> {
        models.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn all_three_shapes_decode_identically() {
        let entries = json!([{"id": "m1", "name": "Model One"}, {"id": "m2"}]);
        let from_data = decode_model_list(json!({"data": entries.clone()})).expect("data");
        let from_models = decode_model_list(json!({"models": entries.clone()})).expect("models");
        let from_bare = decode_model_list(entries).expect("bare");

        assert_eq!(from_data, from_models);
        assert_eq!(from_data, from_bare);
        assert_eq!(ids(&from_data), vec!["m1", "m2"]);
        assert_eq!(from_data[0].label(), "Model One");
        assert_eq!(from_data[1].label(), "m2");
    }

    #[test]
    fn data_takes_priority_over_models() {
        let models = decode_model_list(json!({
            "data": [{"id": "from-data"}],
            "models": [{"id": "from-models"}]
        }))
        .expect("decode");
        assert_eq!(ids(&models), vec!["from-data"]);
    }

    #[test]
    fn null_data_falls_through_to_models() {
        let models = decode_model_list(json!({"data": null, "models": ["llama3"]})).expect("decode");
        assert_eq!(ids(&models), vec!["llama3"]);
    }

    #[test]
    fn entries_fall_back_to_name_or_bare_string() {
        let models =
            decode_model_list(json!([{"name": "named-only"}, "plain-id"])).expect("decode");
        assert_eq!(ids(&models), vec!["named-only", "plain-id"]);
        assert_eq!(models[0].name.as_deref(), Some("named-only"));
        assert_eq!(models[1].name, None);
    }

    #[test]
    fn numeric_ids_are_kept() {
        let models = decode_model_list(json!({"data": [{"id": 7, "name": "Seven"}, {"id": 8}]}))
            .expect("decode");
        assert_eq!(ids(&models), vec!["7", "8"]);
        assert_eq!(models[0].label(), "Seven");
    }

    #[test]
    fn empty_lists_are_empty_results() {
        assert!(matches!(
            decode_model_list(json!({"data": []})),
            Err(ApiError::EmptyResult)
        ));
        assert!(matches!(decode_model_list(json!([])), Err(ApiError::EmptyResult)));
    }

    #[test]
    fn non_array_values_fail_loudly() {
        for body in [
            json!({"data": {"id": "m1"}}),
            json!({"models": "m1"}),
            json!({"object": "list"}),
            json!("m1"),
            json!(42),
            json!([{"object": "model"}]),
            json!([7]),
        ] {
            assert!(
                matches!(decode_model_list(body.clone()), Err(ApiError::MalformedResponse(_))),
                "expected malformed for {body}"
            );
        }
    }
}
