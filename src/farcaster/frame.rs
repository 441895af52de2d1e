use serde::Deserialize;

/// Inbound frame callback, already decoded and validated by the frame server.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FrameRequest {
    /// First render, no button pressed yet.
    Initial,
    Action(FrameAction),
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FrameAction {
    pub fid: u64,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub custody_address: Option<String>,
    pub liked_cast: bool,
    pub follows_caster: bool,
    #[serde(default)]
    pub recasted: bool,
}

impl FrameRequest {
    pub fn parse(value: serde_json::Value) -> eyre::Result<Self> {
        let request: FrameRequest = serde_json::from_value(value)
            .map_err(|e| eyre::eyre!("Malformed frame request: {}", e))?;

        if let FrameRequest::Action(action) = &request {
            if action.fid == 0 {
                eyre::bail!("Malformed frame request: fid must be non-zero");
            }
        }

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_initial_request() {
        let request = FrameRequest::parse(json!({ "type": "initial" })).unwrap();
        assert_eq!(request, FrameRequest::Initial);
    }

    #[test]
    fn parses_action_with_optional_fields_missing() {
        let request = FrameRequest::parse(json!({
            "type": "action",
            "fid": 42,
            "liked_cast": true,
            "follows_caster": false
        }))
        .unwrap();

        assert_eq!(
            request,
            FrameRequest::Action(FrameAction {
                fid: 42,
                display_name: None,
                custody_address: None,
                liked_cast: true,
                follows_caster: false,
                recasted: false,
            })
        );
    }

    #[test]
    fn rejects_malformed_payloads() {
        let payloads = [
            json!({}),
            json!({ "type": "unknown" }),
            json!({ "type": "action", "liked_cast": true, "follows_caster": true }),
            json!({ "type": "action", "fid": "42", "liked_cast": true, "follows_caster": true }),
            json!({ "type": "action", "fid": 0, "liked_cast": true, "follows_caster": true }),
            json!({ "type": "action", "fid": 1, "liked_cast": null, "follows_caster": true }),
        ];

        for payload in payloads {
            assert!(FrameRequest::parse(payload.clone()).is_err(), "{payload}");
        }
    }
}
