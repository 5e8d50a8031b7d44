//! HTTP model-serving client.
//!
//! Request:  `POST {endpoint}` with `{"observation": [f32; N], "deterministic": true}`
//! Response: `{"action": 0 | 1 | 2}`

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Policy, PolicyError};
use crate::domain::Action;
use crate::observation::Observation;

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    observation: &'a [f32],
    deterministic: bool,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    action: i64,
}

pub struct HttpPolicy {
    client: reqwest::blocking::Client,
    endpoint: String,
    expected_len: Option<usize>,
}

impl HttpPolicy {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, PolicyError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| PolicyError::Unreachable(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            expected_len: None,
        })
    }

    /// Reject observations of the wrong length before sending them.
    pub fn with_expected_len(mut self, len: usize) -> Self {
        self.expected_len = Some(len);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn decode(body: &str) -> Result<Action, PolicyError> {
        let resp: PredictResponse =
            serde_json::from_str(body).map_err(|e| PolicyError::Decode(e.to_string()))?;
        Action::from_code(resp.action).ok_or(PolicyError::UnknownAction(resp.action))
    }
}

impl Policy for HttpPolicy {
    fn name(&self) -> &str {
        "http"
    }

    fn predict(&self, observation: &Observation) -> Result<Action, PolicyError> {
        if let Some(expected) = self.expected_len {
            if observation.len() != expected {
                return Err(PolicyError::ObservationLength {
                    expected,
                    actual: observation.len(),
                });
            }
        }

        let request = PredictRequest {
            observation: &observation.values,
            deterministic: true,
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| PolicyError::Unreachable(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| PolicyError::Decode(e.to_string()))?;
        if !status.is_success() {
            return Err(PolicyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let action = Self::decode(&body)?;
        debug!(%action, "policy answered");
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    #[test]
    fn decodes_action_codes() {
        assert_eq!(HttpPolicy::decode(r#"{"action": 1}"#).unwrap(), Action::EnterLong);
        assert_eq!(HttpPolicy::decode(r#"{"action": 2}"#).unwrap(), Action::Flatten);
    }

    #[test]
    fn unknown_code_is_an_error() {
        let err = HttpPolicy::decode(r#"{"action": 7}"#).unwrap_err();
        assert!(matches!(err, PolicyError::UnknownAction(7)));
    }

    #[test]
    fn malformed_body_is_decode_error() {
        assert!(matches!(
            HttpPolicy::decode("not json"),
            Err(PolicyError::Decode(_))
        ));
    }

    #[test]
    fn request_body_shape() {
        let values = [0.5_f32, -1.0];
        let json = serde_json::to_string(&PredictRequest {
            observation: &values,
            deterministic: true,
        })
        .unwrap();
        assert_eq!(json, r#"{"observation":[0.5,-1.0],"deterministic":true}"#);
    }

    #[test]
    fn wrong_length_rejected_before_sending() {
        let policy = HttpPolicy::new("http://127.0.0.1:9/predict")
            .unwrap()
            .with_expected_len(528);
        let observation = Observation {
            values: vec![0.0; 10],
            window: 1,
            columns: Vec::new(),
            last_close: 500.0,
            last_timestamp: New_York.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap(),
        };
        assert!(matches!(
            policy.predict(&observation),
            Err(PolicyError::ObservationLength {
                expected: 528,
                actual: 10
            })
        ));
    }
}
