// Remedi Core - Intent and flow definition types
//
// Intents are the unit of the catalog: a tag, the example phrasings used
// to build its centroid, and the action behind it (a remediation script,
// a guided flow, or both).
//
// Catalog file layout:
//   intents:
//     - tag: wifi_down
//       patterns:
//         - "wifi is not working"
//         - "no wireless connection"
//       script: /opt/remedi/scripts/fix_wifi.sh
//     - tag: vpn_setup
//       patterns:
//         - "set up the vpn"
//       flow:
//         - question: "Which office are you connecting from?"
//           key: office
//           options: ["berlin", "london", "remote"]
//         - question: "What is your employee id?"
//           hint: "Printed on the back of your badge"
//           key: employee_id
//           script: /opt/remedi/scripts/provision_vpn.sh

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level shape of an intent catalog file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentFile {
    /// Intent records, in file order
    pub intents: Vec<Intent>,
}

/// A single dispatchable intent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    /// Unique tag identifying the intent
    pub tag: String,

    /// Example phrasings used to compute the intent centroid
    pub patterns: Vec<String>,

    /// Remediation script to run when this intent matches directly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<PathBuf>,

    /// Guided multi-step flow, if the intent needs user input first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<FlowDefinition>,
}

impl Intent {
    /// Validate structural invariants before the intent enters the catalog
    pub fn validate(&self) -> Result<(), String> {
        if self.tag.trim().is_empty() {
            return Err("intent tag must not be empty".to_string());
        }

        if self.patterns.is_empty() {
            return Err(format!("intent '{}' has no patterns", self.tag));
        }

        if self.patterns.iter().all(|p| p.trim().is_empty()) {
            return Err(format!("intent '{}' has only blank patterns", self.tag));
        }

        if let Some(flow) = &self.flow {
            flow.validate(&self.tag)?;
        }

        Ok(())
    }
}

/// Ordered list of flow steps
///
/// Serializes as a bare sequence so catalog files write `flow:` as a list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowDefinition {
    pub steps: Vec<Step>,
}

impl FlowDefinition {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at a given index, if any
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Script attached to the final step, run when the flow completes
    pub fn terminal_script(&self) -> Option<&PathBuf> {
        self.steps.last().and_then(|s| s.script.as_ref())
    }

    fn validate(&self, tag: &str) -> Result<(), String> {
        if self.steps.is_empty() {
            return Err(format!("intent '{}' declares an empty flow", tag));
        }

        for (idx, step) in self.steps.iter().enumerate() {
            step.validate(tag, idx)?;
        }

        Ok(())
    }
}

/// One question in a guided flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Question shown to the user
    pub question: String,

    /// Optional hint rendered below the question
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,

    /// Suggested answers (free text is still accepted)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    /// Key the answer is recorded under
    pub key: String,

    /// Script to run when this step is the terminal step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<PathBuf>,
}

impl Step {
    fn validate(&self, tag: &str, index: usize) -> Result<(), String> {
        if self.question.trim().is_empty() {
            return Err(format!("intent '{}' flow step {} has an empty question", tag, index));
        }

        if self.key.trim().is_empty() {
            return Err(format!("intent '{}' flow step {} has an empty key", tag, index));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent_yaml() -> &'static str {
        r#"
intents:
  - tag: wifi_down
    patterns:
      - "wifi is not working"
      - "no wireless connection"
    script: /opt/remedi/scripts/fix_wifi.sh
  - tag: vpn_setup
    patterns:
      - "set up the vpn"
    flow:
      - question: "Which office are you connecting from?"
        key: office
        options: ["berlin", "london", "remote"]
      - question: "What is your employee id?"
        hint: "Printed on the back of your badge"
        key: employee_id
        script: /opt/remedi/scripts/provision_vpn.sh
"#
    }

    #[test]
    fn test_parse_catalog_yaml() {
        let file: IntentFile = serde_yaml::from_str(intent_yaml()).unwrap();
        assert_eq!(file.intents.len(), 2);

        let wifi = &file.intents[0];
        assert_eq!(wifi.tag, "wifi_down");
        assert_eq!(wifi.patterns.len(), 2);
        assert!(wifi.script.is_some());
        assert!(wifi.flow.is_none());

        let vpn = &file.intents[1];
        let flow = vpn.flow.as_ref().unwrap();
        assert_eq!(flow.len(), 2);
        assert_eq!(flow.step(0).unwrap().key, "office");
        assert_eq!(flow.step(0).unwrap().options.len(), 3);
        assert_eq!(
            flow.terminal_script().unwrap(),
            &PathBuf::from("/opt/remedi/scripts/provision_vpn.sh")
        );
    }

    #[test]
    fn test_parse_catalog_json() {
        let json = r#"
        {
          "intents": [
            {
              "tag": "printer_jam",
              "patterns": ["printer is jammed"],
              "script": "/opt/remedi/scripts/reset_printer.sh"
            }
          ]
        }
        "#;
        let file: IntentFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.intents[0].tag, "printer_jam");
    }

    #[test]
    fn test_validate_rejects_empty_tag() {
        let intent = Intent {
            tag: "  ".to_string(),
            patterns: vec!["something broke".to_string()],
            script: None,
            flow: None,
        };
        assert!(intent.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_patterns() {
        let intent = Intent {
            tag: "no_patterns".to_string(),
            patterns: vec![],
            script: None,
            flow: None,
        };
        let err = intent.validate().unwrap_err();
        assert!(err.contains("no_patterns"));
    }

    #[test]
    fn test_validate_rejects_empty_flow() {
        let intent = Intent {
            tag: "empty_flow".to_string(),
            patterns: vec!["help".to_string()],
            script: None,
            flow: Some(FlowDefinition::default()),
        };
        assert!(intent.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_step_key() {
        let intent = Intent {
            tag: "bad_step".to_string(),
            patterns: vec!["help".to_string()],
            script: None,
            flow: Some(FlowDefinition {
                steps: vec![Step {
                    question: "What happened?".to_string(),
                    hint: None,
                    options: vec![],
                    key: "".to_string(),
                    script: None,
                }],
            }),
        };
        assert!(intent.validate().is_err());
    }

    #[test]
    fn test_valid_intent_passes() {
        let file: IntentFile = serde_yaml::from_str(intent_yaml()).unwrap();
        for intent in &file.intents {
            assert!(intent.validate().is_ok(), "intent {} should validate", intent.tag);
        }
    }
}
