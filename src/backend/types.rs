//! Wire types shared by the backend collaborators

use serde::Deserialize;

/// Response envelope used by every backend route.
///
/// The backend answers `{code, msg, data}`. Some gateways rewrite that into
/// `{result, data}`; an explicit `result` flag wins when present.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub result: Option<bool>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub msg: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.result.unwrap_or(self.code == Some(200))
    }

    /// Short description of a failed envelope for logs and errors
    pub fn failure_reason(&self) -> String {
        match (&self.msg, self.code) {
            (Some(msg), Some(code)) => format!("{msg} (code {code})"),
            (Some(msg), None) => msg.clone(),
            (None, Some(code)) => format!("code {code}"),
            (None, None) => "result flag was false".to_string(),
        }
    }
}

/// `data` payload of the config route; only the data path matters here
#[derive(Debug, Default, Deserialize)]
pub struct ConfigData {
    #[serde(default)]
    pub pre_data_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_code_envelope() {
        let ok: ApiEnvelope<Vec<String>> =
            serde_json::from_value(json!({"msg": "success", "code": 200, "data": ["coin-cap"]}))
                .unwrap();
        assert!(ok.is_success());
        assert_eq!(ok.data.unwrap(), vec!["coin-cap".to_string()]);

        let failed: ApiEnvelope<()> =
            serde_json::from_value(json!({"msg": "boom", "code": 500, "data": null})).unwrap();
        assert!(!failed.is_success());
        assert_eq!(failed.failure_reason(), "boom (code 500)");
    }

    #[test]
    fn test_result_flag_wins() {
        let envelope: ApiEnvelope<ConfigData> =
            serde_json::from_value(json!({"result": false, "code": 200})).unwrap();
        assert!(!envelope.is_success());

        let envelope: ApiEnvelope<ConfigData> =
            serde_json::from_value(json!({"result": true, "data": {"pre_data_path": "/d/x"}}))
                .unwrap();
        assert!(envelope.is_success());
        assert_eq!(
            envelope.data.unwrap().pre_data_path.as_deref(),
            Some("/d/x")
        );
    }

    #[test]
    fn test_empty_envelope_is_failure() {
        let envelope: ApiEnvelope<ConfigData> = serde_json::from_value(json!({})).unwrap();
        assert!(!envelope.is_success());
        assert_eq!(envelope.failure_reason(), "result flag was false");
    }
}
