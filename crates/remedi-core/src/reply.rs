// Remedi Core - User-facing reply types
//
// The wire shape returned to whatever front end drives the engine. The
// kind field serializes as "type" to match existing clients.

use serde::{Deserialize, Serialize};

/// Category of a chat reply
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    /// A remediation ran (or the flow completed)
    Action,
    /// The engine needs a better query
    Clarify,
    /// Next question in an active guided flow
    FlowQuestion,
    /// Answer composed from documentation search
    Knowledge,
    /// Something went wrong and the user should know
    Error,
}

impl ReplyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyKind::Action => "action",
            ReplyKind::Clarify => "clarify",
            ReplyKind::FlowQuestion => "flow_question",
            ReplyKind::Knowledge => "knowledge",
            ReplyKind::Error => "error",
        }
    }
}

impl std::fmt::Display for ReplyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an incoming query should be handled
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Classify and remediate
    #[default]
    Script,
    /// Search the knowledge base
    Kb,
}

/// Reply returned for every handled query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    /// Text shown to the user
    pub response: String,

    /// Reply category
    #[serde(rename = "type")]
    pub kind: ReplyKind,

    /// Suggested answers for flow questions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    /// Session the reply belongs to
    pub session_id: String,
}

impl ChatReply {
    pub fn action(response: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            kind: ReplyKind::Action,
            options: Vec::new(),
            session_id: session_id.into(),
        }
    }

    pub fn clarify(response: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            kind: ReplyKind::Clarify,
            options: Vec::new(),
            session_id: session_id.into(),
        }
    }

    pub fn knowledge(response: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            kind: ReplyKind::Knowledge,
            options: Vec::new(),
            session_id: session_id.into(),
        }
    }

    pub fn error(response: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            kind: ReplyKind::Error,
            options: Vec::new(),
            session_id: session_id.into(),
        }
    }

    pub fn flow_question(
        response: impl Into<String>,
        options: Vec<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            response: response.into(),
            kind: ReplyKind::FlowQuestion,
            options,
            session_id: session_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_as_type_field() {
        let reply = ChatReply::action("done", "sess-1");
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["type"], "action");
        assert_eq!(json["session_id"], "sess-1");
        assert!(json.get("options").is_none());
    }

    #[test]
    fn test_flow_question_keeps_options() {
        let reply = ChatReply::flow_question(
            "## Which office?\n",
            vec!["berlin".to_string(), "london".to_string()],
            "sess-2",
        );
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["type"], "flow_question");
        assert_eq!(json["options"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_mode_parses_lowercase() {
        let mode: QueryMode = serde_json::from_str("\"kb\"").unwrap();
        assert_eq!(mode, QueryMode::Kb);
        assert_eq!(QueryMode::default(), QueryMode::Script);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ReplyKind::FlowQuestion.to_string(), "flow_question");
        assert_eq!(ReplyKind::Error.as_str(), "error");
    }
}
