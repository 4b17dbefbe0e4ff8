//! Analysis response types and the fixed model response schema.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::severity::Severity;

/// One discrete security finding returned by the remote model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    /// Vulnerability class, e.g. "XSS" or "SQL Injection".
    #[serde(rename = "type")]
    pub vuln_type: String,
    pub severity: Severity,
    pub description: String,
    pub remediation: String,
    /// 1-based line in the submitted source, when the model can cite one.
    #[serde(rename = "lineNumber", skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
}

/// The complete report for one scan.
///
/// `vulnerabilities` keeps the model output order; nothing re-sorts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityAnalysis {
    pub summary: String,
    pub vulnerabilities: Vec<Vulnerability>,
}

impl SecurityAnalysis {
    /// Parse model output text into a validated analysis.
    ///
    /// An analysis only exists if the text parses against the fixed schema
    /// (required fields present, severity one of the known levels). Anything
    /// else is an error, never a partial result.
    pub fn from_model_text(text: &str) -> Result<Self, AnalysisParseError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AnalysisParseError::Empty);
        }
        serde_json::from_str(trimmed).map_err(AnalysisParseError::Json)
    }

    pub fn has_vulnerabilities(&self) -> bool {
        !self.vulnerabilities.is_empty()
    }

    /// Count findings at the given severity. Display helper only.
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.vulnerabilities
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisParseError {
    #[error("model returned an empty response")]
    Empty,
    #[error("model response is not valid analysis JSON: {0}")]
    Json(#[source] serde_json::Error),
}

/// JSON schema requested from the remote model for every audit.
///
/// Mirrors [`SecurityAnalysis`] field for field; `lineNumber` is the only
/// optional property.
pub fn analysis_json_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "summary": {
                "type": "string",
                "description": "A brief one-sentence summary of the security findings."
            },
            "vulnerabilities": {
                "type": "array",
                "description": "A list of security vulnerabilities found in the code.",
                "items": {
                    "type": "object",
                    "properties": {
                        "type": {
                            "type": "string",
                            "description": "The type of vulnerability (e.g., XSS, SQL Injection)."
                        },
                        "severity": {
                            "type": "string",
                            "enum": ["Critical", "High", "Medium", "Low", "Informational"],
                            "description": "The severity of the vulnerability."
                        },
                        "description": {
                            "type": "string",
                            "description": "A detailed explanation of the vulnerability."
                        },
                        "remediation": {
                            "type": "string",
                            "description": "Specific code examples or steps to fix the vulnerability."
                        },
                        "lineNumber": {
                            "type": "integer",
                            "description": "The line number in the code where the vulnerability is located."
                        }
                    },
                    "required": ["type", "severity", "description", "remediation"]
                }
            }
        },
        "required": ["summary", "vulnerabilities"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_response() {
        let text = r#"{
            "summary": "Uses eval on unsanitized input",
            "vulnerabilities": [
                {
                    "type": "Code Injection",
                    "severity": "Critical",
                    "description": "eval executes attacker-controlled input",
                    "remediation": "Use JSON.parse or a safe expression evaluator",
                    "lineNumber": 1
                }
            ]
        }"#;

        let analysis = SecurityAnalysis::from_model_text(text).unwrap();
        assert_eq!(analysis.summary, "Uses eval on unsanitized input");
        assert_eq!(analysis.vulnerabilities.len(), 1);

        let vuln = &analysis.vulnerabilities[0];
        assert_eq!(vuln.vuln_type, "Code Injection");
        assert_eq!(vuln.severity, Severity::Critical);
        assert_eq!(vuln.line_number, Some(1));
    }

    #[test]
    fn test_parse_preserves_finding_order() {
        let text = r#"{
            "summary": "Two findings",
            "vulnerabilities": [
                {"type": "B", "severity": "Low", "description": "b", "remediation": "b"},
                {"type": "A", "severity": "Critical", "description": "a", "remediation": "a"}
            ]
        }"#;

        let analysis = SecurityAnalysis::from_model_text(text).unwrap();
        assert_eq!(analysis.vulnerabilities[0].vuln_type, "B");
        assert_eq!(analysis.vulnerabilities[1].vuln_type, "A");
    }

    #[test]
    fn test_parse_line_number_is_optional() {
        let text = r#"{
            "summary": "ok",
            "vulnerabilities": [
                {"type": "XSS", "severity": "High", "description": "d", "remediation": "r"}
            ]
        }"#;

        let analysis = SecurityAnalysis::from_model_text(text).unwrap();
        assert_eq!(analysis.vulnerabilities[0].line_number, None);
    }

    #[test]
    fn test_parse_rejects_missing_required_field() {
        // remediation missing
        let text = r#"{
            "summary": "bad",
            "vulnerabilities": [
                {"type": "XSS", "severity": "High", "description": "d"}
            ]
        }"#;

        assert!(matches!(
            SecurityAnalysis::from_model_text(text),
            Err(AnalysisParseError::Json(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let err = SecurityAnalysis::from_model_text("I found some bugs!").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("not valid analysis JSON"));
    }

    #[test]
    fn test_parse_rejects_empty_text() {
        assert!(matches!(
            SecurityAnalysis::from_model_text("   \n"),
            Err(AnalysisParseError::Empty)
        ));
    }

    #[test]
    fn test_round_trip_fidelity() {
        let text = r#"{"summary":"s","vulnerabilities":[{"type":"CSRF","severity":"Medium","description":"d","remediation":"r","lineNumber":42}]}"#;
        let analysis = SecurityAnalysis::from_model_text(text).unwrap();
        let reparsed =
            SecurityAnalysis::from_model_text(&serde_json::to_string(&analysis).unwrap()).unwrap();
        assert_eq!(analysis, reparsed);
    }

    #[test]
    fn test_count_by_severity() {
        let text = r#"{
            "summary": "mixed",
            "vulnerabilities": [
                {"type": "A", "severity": "High", "description": "d", "remediation": "r"},
                {"type": "B", "severity": "High", "description": "d", "remediation": "r"},
                {"type": "C", "severity": "Low", "description": "d", "remediation": "r"}
            ]
        }"#;

        let analysis = SecurityAnalysis::from_model_text(text).unwrap();
        assert_eq!(analysis.count_by_severity(Severity::High), 2);
        assert_eq!(analysis.count_by_severity(Severity::Low), 1);
        assert_eq!(analysis.count_by_severity(Severity::Critical), 0);
    }

    #[test]
    fn test_schema_names_required_fields() {
        let schema = analysis_json_schema();
        assert_eq!(schema["required"][0], "summary");
        assert_eq!(schema["required"][1], "vulnerabilities");

        let item_required = &schema["properties"]["vulnerabilities"]["items"]["required"];
        let names: Vec<&str> = item_required
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["type", "severity", "description", "remediation"]);
    }
}
