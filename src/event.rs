use crate::error::EmitError;
use serde::Serialize;
use std::collections::BTreeMap;

/// Structured key/value pairs attached to a log call.
pub type Fields = BTreeMap<String, serde_json::Value>;

/// One structured log record, built per call and serialized immediately.
///
/// Keys appear in declaration order. Anything without a value (empty
/// strings, missing or empty field maps) is left out of the JSON object
/// rather than written as `null` or `{}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Event<'a> {
    #[serde(rename = "msg", skip_serializing_if = "is_blank")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "is_empty_str")]
    pub component: &'a str,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub caller: String,
    #[serde(rename = "ops", skip_serializing_if = "has_no_fields")]
    pub fields: Option<&'a Fields>,
    #[serde(rename = "level", skip_serializing_if = "is_empty_str")]
    pub severity: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    pub stack: Option<String>,
}

impl Event<'_> {
    /// Append the event to `buf` as a compact JSON object followed by `\n`.
    ///
    /// On error `buf` may hold a partial object; callers must not write it.
    pub fn encode(&self, buf: &mut Vec<u8>) -> Result<(), EmitError> {
        serde_json::to_writer(&mut *buf, self)?;
        buf.push(b'\n');
        Ok(())
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

fn is_empty_str(value: &&str) -> bool {
    value.is_empty()
}

fn has_no_fields(fields: &Option<&Fields>) -> bool {
    fields.map_or(true, BTreeMap::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode(event: &Event<'_>) -> String {
        let mut buf = Vec::new();
        event.encode(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_full_event_key_order() {
        let mut fields = Fields::new();
        fields.insert("code".to_string(), json!(500));
        let event = Event {
            message: Some("boom".to_string()),
            component: "server",
            caller: "conn.rs:42".to_string(),
            fields: Some(&fields),
            severity: "error",
            stack: Some("thread 'main'".to_string()),
        };

        assert_eq!(
            encode(&event),
            "{\"msg\":\"boom\",\"component\":\"server\",\"caller\":\"conn.rs:42\",\
             \"ops\":{\"code\":500},\"level\":\"error\",\"stack\":\"thread 'main'\"}\n"
        );
    }

    #[test]
    fn test_empty_values_are_omitted() {
        let fields = Fields::new();
        let event = Event {
            message: Some(String::new()),
            component: "db",
            fields: Some(&fields),
            ..Event::default()
        };
        assert_eq!(encode(&event), "{\"component\":\"db\"}\n");
        assert_eq!(encode(&Event::default()), "{}\n");
    }

    #[test]
    fn test_encode_appends_to_existing_bytes() {
        let mut buf = b"prev\n".to_vec();
        Event { severity: "debug", ..Event::default() }
            .encode(&mut buf)
            .unwrap();
        assert_eq!(buf, b"prev\n{\"level\":\"debug\"}\n");
    }
}
