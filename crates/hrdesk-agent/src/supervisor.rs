// ABOUTME: The supervisor decides which worker acts next or whether the turn is finished.
// ABOUTME: Once a worker has answered it returns FINISH without consulting any classifier.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use hrdesk_core::{ConversationState, Message, Role, RouteDecision, WorkerId};
use serde::Deserialize;
use serde_json::json;

use crate::error::TurnError;
use crate::llm::{ChatMessage, LlmClient, LlmRequest, ToolDefinition};

const ROUTE_TOOL: &str = "route";

const SUPERVISOR_PROMPT: &str = "You are a supervisor tasked with managing a conversation between the \
    following workers: {members}. Given the following user request, respond with the worker to act \
    next. Each worker will perform a task and respond with their results and status.\n\
    ROUTING RULES, in order of precedence:\n\
    1. PolicyAgent: general questions about leave rules, entitlements, carry-forward, or anything \
    in the policy document. These are not about one person and need no employee ID.\n\
    2. DataAgent: only when the message contains or refers to a specific employee ID (such as \
    EMP001) and asks for that person's data or leave balance.\n\
    3. EmailAgent: any request to send or draft an email.\n\
    4. FINISH: once a worker has responded with the information. Do NOT call the same worker \
    twice for the same query.";

const ROUTING_QUESTION: &str = "Given the conversation above, who should act next? \
    Or should we FINISH? Select one of: {options}";

/// Decides the graph's next step from the conversation so far.
#[async_trait]
pub trait Router: Send + Sync {
    async fn decide(&self, state: &ConversationState) -> Result<RouteDecision, TurnError>;
}

/// Maps a conversation that no worker has answered yet onto the closed
/// decision set.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, messages: &[Message]) -> Result<RouteDecision, TurnError>;

    /// Classifier name for logging.
    fn name(&self) -> &str;
}

/// Which classifier backs the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouterKind {
    #[default]
    Llm,
    Rules,
}

impl RouterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouterKind::Llm => "llm",
            RouterKind::Rules => "rules",
        }
    }
}

impl fmt::Display for RouterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "llm" => Ok(RouterKind::Llm),
            "rules" => Ok(RouterKind::Rules),
            other => Err(format!("unknown router '{}', expected 'llm' or 'rules'", other)),
        }
    }
}

/// The routing component of the graph.
pub struct Supervisor {
    classifier: Arc<dyn Classifier>,
}

impl Supervisor {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl Router for Supervisor {
    async fn decide(&self, state: &ConversationState) -> Result<RouteDecision, TurnError> {
        if let Some(worker) = state.last_worker_author() {
            tracing::debug!(
                turn_id = %state.turn_id(),
                %worker,
                "worker already answered; finishing turn"
            );
            return Ok(RouteDecision::Finish);
        }

        let decision = self.classifier.classify(state.messages()).await?;
        tracing::info!(
            turn_id = %state.turn_id(),
            classifier = self.classifier.name(),
            %decision,
            "supervisor routed"
        );
        Ok(decision)
    }
}

#[derive(Debug, Deserialize)]
struct Route {
    next: RouteDecision,
}

/// Classifies with the language model, constrained to a forced `route`
/// tool call whose only argument is an enum of the four decisions.
pub struct LlmClassifier {
    client: Arc<dyn LlmClient>,
}

impl LlmClassifier {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    pub fn build_request(messages: &[Message]) -> LlmRequest {
        let members = WorkerId::ALL.map(|w| w.as_str()).join(", ");
        let options = RouteDecision::labels()
            .map(|l| format!("'{}'", l))
            .join(", ");

        let mut chat = vec![ChatMessage::system(
            SUPERVISOR_PROMPT.replace("{members}", &members),
        )];
        chat.extend(messages.iter().map(ChatMessage::from));
        chat.push(ChatMessage::system(
            ROUTING_QUESTION.replace("{options}", &format!("[{}]", options)),
        ));

        LlmRequest::new(chat).forcing(route_tool())
    }
}

fn route_tool() -> ToolDefinition {
    ToolDefinition {
        name: ROUTE_TOOL.to_string(),
        description: "Select the next role.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "next": {
                    "type": "string",
                    "enum": RouteDecision::labels()
                }
            },
            "required": ["next"]
        }),
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(&self, messages: &[Message]) -> Result<RouteDecision, TurnError> {
        let request = Self::build_request(messages);
        let response = self.client.complete(&request).await?;

        let call = response
            .tool_calls
            .iter()
            .find(|c| c.name == ROUTE_TOOL)
            .ok_or_else(|| {
                TurnError::Classification(format!(
                    "model did not call '{}' (replied: {:?})",
                    ROUTE_TOOL, response.text
                ))
            })?;

        let route: Route = serde_json::from_value(call.arguments.clone()).map_err(|e| {
            TurnError::Classification(format!("{} in arguments {}", e, call.arguments))
        })?;
        Ok(route.next)
    }

    fn name(&self) -> &str {
        "llm"
    }
}

const POLICY_WORDS: &[&str] = &[
    "policy", "policies", "rule", "rules", "allowed", "require", "required", "entitled",
    "entitlement", "eligible",
];
const QUESTION_WORDS: &[&str] = &[
    "what", "how", "when", "can", "do", "does", "is", "are", "may", "who", "why", "which",
    "should", "will",
];
const EMAIL_VERBS: &[&str] = &["send", "draft", "write", "compose", "forward"];
const EMAIL_NOUNS: &[&str] = &["email", "emails", "mail"];
const IMPERATIVE_EMAIL: &[&str] = &["email", "mail", "notify"];
const POLITE_WORDS: &[&str] = &["please", "kindly", "can", "could", "would", "you"];

/// Deterministic keyword classifier over the latest user message.
///
/// Rules apply in order: a general policy question goes to PolicyAgent, a
/// message naming an employee ID that is not an email request goes to
/// DataAgent, an explicit send/draft email request goes to EmailAgent, a
/// conversation a worker has already answered finishes, and anything left
/// goes to PolicyAgent.
#[derive(Debug, Clone, Default)]
pub struct RuleClassifier;

impl RuleClassifier {
    fn words(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_ascii_lowercase)
            .collect()
    }

    /// A question about what the leave rules say, as opposed to a request
    /// to act.
    pub fn asks_about_policy(text: &str) -> bool {
        let words = Self::words(text);
        let is_question = text.trim_end().ends_with('?')
            || words
                .first()
                .is_some_and(|w| QUESTION_WORDS.contains(&w.as_str()));
        is_question && words.iter().any(|w| POLICY_WORDS.contains(&w.as_str()))
    }

    /// An instruction to send or draft an email. Mentioning email as a
    /// topic is not enough: the message must pair a sending verb with an
    /// email noun, or open with "email"/"notify" as a command.
    pub fn requests_email(text: &str) -> bool {
        let words = Self::words(text);
        let has_verb = words.iter().any(|w| EMAIL_VERBS.contains(&w.as_str()));
        let has_noun = words.iter().any(|w| EMAIL_NOUNS.contains(&w.as_str()));
        if has_verb && has_noun {
            return true;
        }
        words
            .iter()
            .find(|w| !POLITE_WORDS.contains(&w.as_str()))
            .is_some_and(|w| IMPERATIVE_EMAIL.contains(&w.as_str()))
    }

    /// True if the text contains an identifier like `EMP001`.
    pub fn mentions_employee_id(text: &str) -> bool {
        Self::words(text).iter().any(|w| {
            w.strip_prefix("emp")
                .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
        })
    }
}

#[async_trait]
impl Classifier for RuleClassifier {
    async fn classify(&self, messages: &[Message]) -> Result<RouteDecision, TurnError> {
        let text = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .ok_or_else(|| TurnError::Classification("no user message to classify".to_string()))?;

        let has_id = Self::mentions_employee_id(text);
        let wants_email = Self::requests_email(text);

        let decision = if !has_id && Self::asks_about_policy(text) {
            RouteDecision::Worker(WorkerId::PolicyAgent)
        } else if has_id && !wants_email {
            RouteDecision::Worker(WorkerId::DataAgent)
        } else if wants_email {
            RouteDecision::Worker(WorkerId::EmailAgent)
        } else if messages.iter().any(|m| m.worker_author().is_some()) {
            RouteDecision::Finish
        } else {
            RouteDecision::Worker(WorkerId::PolicyAgent)
        };
        Ok(decision)
    }

    fn name(&self) -> &str {
        "rules"
    }
}
