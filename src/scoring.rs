//! Client for the hosted scoring model.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{BattleError, Result};
use crate::features::{FeatureRow, features_to_csv};
use crate::http_client::http_client;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const SERVICE_KEY_HEADER: &str = "DataRobot-Key";

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub url: Option<String>,
    pub api_token: Option<String>,
    pub service_key: Option<String>,
    pub timeout: Duration,
    /// Label in `predictionValues` that means "first creature wins".
    pub positive_class: Option<String>,
}

impl ScoringConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let text = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let timeout_secs = text("SCORING_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 300);

        Self {
            url: text("SCORING_URL"),
            api_token: text("SCORING_API_TOKEN"),
            service_key: text("SCORING_SERVICE_KEY"),
            timeout: Duration::from_secs(timeout_secs),
            positive_class: text("SCORING_POSITIVE_CLASS"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Explanation {
    pub feature: String,
    pub qualitative_strength: String,
    pub strength: Option<f64>,
    pub feature_value: Option<String>,
}

impl Explanation {
    pub fn is_placeholder(&self) -> bool {
        self.feature.is_empty()
    }

    /// `net_speed` / `+++` renders as `NET SPEED +++`.
    pub fn label(&self) -> String {
        if self.is_placeholder() {
            return String::new();
        }
        let feature = self.feature.replace('_', " ").to_uppercase();
        if self.qualitative_strength.is_empty() {
            feature
        } else {
            format!("{feature} {}", self.qualitative_strength)
        }
    }
}

/// Scored output for one submitted row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowPrediction {
    pub row_id: usize,
    pub value: f64,
    /// Ordered by importance, as returned.
    pub explanations: Vec<Explanation>,
}

/// Converts feature rows into win probabilities for the first creature.
pub trait ScoringService {
    fn score(&self, rows: &[FeatureRow], max_explanations: usize) -> Result<Vec<RowPrediction>>;
}

pub struct HttpScoringClient {
    url: String,
    config: ScoringConfig,
}

impl HttpScoringClient {
    pub fn new(config: ScoringConfig) -> Result<Self> {
        let url = config
            .url
            .clone()
            .ok_or_else(|| BattleError::Config("SCORING_URL is not set".to_string()))?;
        Ok(Self { url, config })
    }
}

impl ScoringService for HttpScoringClient {
    fn score(&self, rows: &[FeatureRow], max_explanations: usize) -> Result<Vec<RowPrediction>> {
        let body = features_to_csv(rows, false)?;
        let client = http_client(self.config.timeout)?;

        let mut req = client
            .post(&self.url)
            .query(&[("maxExplanations", max_explanations)])
            .header(USER_AGENT, concat!("battle_sim/", env!("CARGO_PKG_VERSION")))
            .header(CONTENT_TYPE, "text/csv; charset=UTF-8");
        if let Some(token) = self.config.api_token.as_deref() {
            req = req.bearer_auth(token);
        }
        if let Some(key) = self.config.service_key.as_deref() {
            req = req.header(SERVICE_KEY_HEADER, key);
        }

        debug!(
            url = %self.url,
            rows = rows.len(),
            bytes = body.len(),
            "submitting rows for scoring"
        );
        let resp = req.body(body).send()?;
        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            return Err(BattleError::Service {
                status: status.as_u16(),
                body: text,
            });
        }
        parse_prediction_response(&text, self.config.positive_class.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    #[serde(default)]
    data: Option<Vec<WireRow>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRow {
    #[serde(default)]
    row_id: Option<usize>,
    #[serde(default)]
    prediction_values: Option<Vec<WireValue>>,
    #[serde(default)]
    prediction_explanations: Option<Vec<WireExplanation>>,
}

#[derive(Debug, Deserialize)]
struct WireValue {
    #[serde(default)]
    label: Value,
    value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireExplanation {
    #[serde(default)]
    feature: Option<String>,
    #[serde(default)]
    feature_value: Value,
    #[serde(default)]
    strength: Option<f64>,
    #[serde(default)]
    qualitative_strength: Option<String>,
}

impl From<WireExplanation> for Explanation {
    fn from(wire: WireExplanation) -> Self {
        Explanation {
            feature: wire.feature.unwrap_or_default(),
            qualitative_strength: wire.qualitative_strength.unwrap_or_default(),
            strength: wire.strength,
            feature_value: value_text(&wire.feature_value),
        }
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Parses a prediction response body. Missing or null explanation lists are
/// read as empty.
pub fn parse_prediction_response(
    raw: &str,
    positive_class: Option<&str>,
) -> Result<Vec<RowPrediction>> {
    let parsed: PredictionResponse = serde_json::from_str(raw)
        .map_err(|err| BattleError::MalformedResponse(format!("invalid json: {err}")))?;
    let rows = parsed.data.unwrap_or_default();

    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| {
            let values = row.prediction_values.unwrap_or_default();
            let picked = match positive_class {
                Some(class) => values
                    .iter()
                    .find(|v| value_text(&v.label).as_deref() == Some(class)),
                None => values.first(),
            };
            let Some(picked) = picked else {
                return Err(BattleError::MalformedResponse(format!(
                    "row {idx} has no prediction value"
                )));
            };
            if !(0.0..=1.0).contains(&picked.value) {
                warn!(row = idx, value = picked.value, "prediction value outside [0, 1]");
            }
            Ok(RowPrediction {
                row_id: row.row_id.unwrap_or(idx),
                value: picked.value,
                explanations: row
                    .prediction_explanations
                    .unwrap_or_default()
                    .into_iter()
                    .map(Explanation::from)
                    .collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn config_reads_and_clamps() {
        let env = HashMap::from([
            ("SCORING_URL", " https://scoring.example/predict "),
            ("SCORING_TIMEOUT_SECS", "9000"),
            ("SCORING_API_TOKEN", ""),
        ]);
        let cfg = ScoringConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.url.as_deref(), Some("https://scoring.example/predict"));
        assert_eq!(cfg.timeout, Duration::from_secs(300));
        assert!(cfg.api_token.is_none());
    }

    #[test]
    fn client_requires_url() {
        let cfg = ScoringConfig::from_lookup(|_| None);
        assert!(matches!(
            HttpScoringClient::new(cfg),
            Err(BattleError::Config(_))
        ));
    }

    #[test]
    fn explanation_label_formatting() {
        let exp = Explanation {
            feature: "net_sp_attack".to_string(),
            qualitative_strength: "--".to_string(),
            ..Explanation::default()
        };
        assert_eq!(exp.label(), "NET SP ATTACK --");
        assert_eq!(Explanation::default().label(), "");
    }

    #[test]
    fn positive_class_selects_value() {
        let raw = r#"{"data":[{"rowId":0,"predictionValues":[
            {"label":"False","value":0.2},{"label":"True","value":0.8}]}]}"#;
        let rows = parse_prediction_response(raw, Some("True")).unwrap();
        assert!((rows[0].value - 0.8).abs() < 1e-12);
        let rows = parse_prediction_response(raw, None).unwrap();
        assert!((rows[0].value - 0.2).abs() < 1e-12);
        assert!(parse_prediction_response(raw, Some("maybe")).is_err());
    }

    #[test]
    fn non_json_is_malformed() {
        assert!(matches!(
            parse_prediction_response("<html>", None),
            Err(BattleError::MalformedResponse(_))
        ));
    }
}
