//! Typed result normalization.
//!
//! The engine reports byte output as `{"type": "byteArray", "value": [..]}`.
//! Agents want text, so byte arrays that hold valid UTF-8 are rewritten to
//! `{"type": "string", "value": "..."}`. Anything that cannot be decoded is
//! left exactly as the engine sent it.
use anyhow::{anyhow, Result};
use serde_json::Value;

pub const BYTE_ARRAY_TYPE: &str = "byteArray";
pub const STRING_TYPE: &str = "string";

/// Normalize one typed result in place.
///
/// Values without a `type` tag (error results, non-objects) pass through.
pub fn decode_result(result: &mut Value) {
    let Some(object) = result.as_object_mut() else {
        return;
    };
    if object.get("type").and_then(Value::as_str) != Some(BYTE_ARRAY_TYPE) {
        return;
    }
    let decoded = match object.get("value") {
        Some(bytes) => try_decode_bytes(bytes),
        None => Err(anyhow!("byte array result has no value")),
    };
    match decoded {
        Ok(text) => {
            object.insert("value".to_string(), Value::String(text));
            object.insert("type".to_string(), Value::String(STRING_TYPE.to_string()));
        }
        Err(err) => {
            tracing::warn!("Could not decode byte array: {err:#}");
        }
    }
}

/// Normalize every element of a batch result; non-list values pass through.
pub fn decode_batch(results: &mut Value) {
    if let Some(items) = results.as_array_mut() {
        for item in items {
            decode_result(item);
        }
    }
}

/// Read a JSON byte array and decode it as UTF-8 text.
pub fn try_decode_bytes(value: &Value) -> Result<String> {
    let items = value
        .as_array()
        .ok_or_else(|| anyhow!("byte array value is not a list"))?;
    let bytes = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_u64()
                .and_then(|byte| u8::try_from(byte).ok())
                .ok_or_else(|| anyhow!("element {index} is not a byte in 0..=255: {item}"))
        })
        .collect::<Result<Vec<u8>>>()?;
    String::from_utf8(bytes).map_err(|err| anyhow!("bytes are not valid UTF-8: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn byte_array_becomes_string() {
        let mut result = json!({"type": "byteArray", "value": [104, 101, 108, 108, 111]});
        decode_result(&mut result);
        assert_eq!(result, json!({"type": "string", "value": "hello"}));
    }

    #[test]
    fn multibyte_utf8_decodes() {
        let mut result = json!({"type": "byteArray", "value": [0xe2, 0x9c, 0x93]});
        decode_result(&mut result);
        assert_eq!(result["value"], json!("\u{2713}"));
    }

    #[test]
    fn extra_fields_survive_rewrite() {
        let mut result = json!({"type": "byteArray", "value": [79, 75], "progress": 1});
        decode_result(&mut result);
        assert_eq!(result, json!({"type": "string", "value": "OK", "progress": 1}));
    }

    #[test]
    fn string_result_is_untouched_and_decoding_is_idempotent() {
        let mut result = json!({"type": "byteArray", "value": [97]});
        decode_result(&mut result);
        let once = result.clone();
        decode_result(&mut result);
        assert_eq!(result, once);

        let mut plain = json!({"type": "string", "value": "abc"});
        decode_result(&mut plain);
        assert_eq!(plain, json!({"type": "string", "value": "abc"}));
    }

    #[test]
    fn other_types_pass_through() {
        let mut result = json!({"type": "number", "value": 12});
        decode_result(&mut result);
        assert_eq!(result, json!({"type": "number", "value": 12}));
    }

    #[test]
    fn invalid_utf8_is_left_untouched() {
        let mut result = json!({"type": "byteArray", "value": [255, 254]});
        decode_result(&mut result);
        assert_eq!(result, json!({"type": "byteArray", "value": [255, 254]}));
    }

    #[test]
    fn malformed_values_are_left_untouched() {
        for value in [json!("68656c6c6f"), json!([1, 300]), json!([1, -2]), json!([1.5]), Value::Null] {
            let mut result = json!({"type": "byteArray", "value": value.clone()});
            decode_result(&mut result);
            assert_eq!(result["type"], json!("byteArray"));
            assert_eq!(result["value"], value);
        }
        let mut missing = json!({"type": "byteArray"});
        decode_result(&mut missing);
        assert_eq!(missing, json!({"type": "byteArray"}));
    }

    #[test]
    fn error_result_is_terminal() {
        let mut result = json!({"error": "HTTP 500: boom"});
        decode_result(&mut result);
        decode_batch(&mut result);
        assert_eq!(result, json!({"error": "HTTP 500: boom"}));
    }

    #[test]
    fn batch_items_decode_independently() {
        let mut batch = json!([
            {"type": "byteArray", "value": [104, 105]},
            {"type": "byteArray", "value": [104, "x"]},
            {"type": "string", "value": "ok"}
        ]);
        decode_batch(&mut batch);
        assert_eq!(
            batch,
            json!([
                {"type": "string", "value": "hi"},
                {"type": "byteArray", "value": [104, "x"]},
                {"type": "string", "value": "ok"}
            ])
        );
    }

    #[test]
    fn try_decode_reports_offending_element() {
        let err = try_decode_bytes(&json!([65, 256])).unwrap_err();
        assert!(err.to_string().contains("element 1"));
    }
}
