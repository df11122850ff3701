use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::CliError;

/// Metadata attached to every command response.
#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub request_id: Uuid,
    pub command: &'static str,
    pub generated_at: String,
    pub latency_ms: u64,
    pub warnings: Vec<String>,
}

/// Top-level JSON document written to stdout.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub meta: Meta,
    pub data: Value,
}

pub fn render(envelope: &Envelope, pretty: bool) -> Result<(), CliError> {
    println!("{}", to_json(envelope, pretty)?);
    Ok(())
}

fn to_json(envelope: &Envelope, pretty: bool) -> Result<String, CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(envelope)?
    } else {
        serde_json::to_string(envelope)?
    };
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_serializes_meta_before_data() {
        let envelope = Envelope {
            meta: Meta {
                request_id: Uuid::nil(),
                command: "kpis",
                generated_at: "2026-09-15T00:00:00Z".to_owned(),
                latency_ms: 3,
                warnings: vec!["no shipment data for 'acme'".to_owned()],
            },
            data: Value::Null,
        };

        let compact = to_json(&envelope, false).expect("serialize");
        assert!(compact.starts_with(r#"{"meta":{"request_id":"00000000-0000-0000-0000-000000000000""#));
        assert!(compact.ends_with(r#""data":null}"#));

        let parsed: Value = serde_json::from_str(&to_json(&envelope, true).expect("pretty"))
            .expect("valid json");
        assert_eq!(parsed["meta"]["warnings"], json!(["no shipment data for 'acme'"]));
    }
}
