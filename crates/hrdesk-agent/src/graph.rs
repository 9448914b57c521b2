// ABOUTME: The orchestration graph: Supervisor -> (Worker -> Supervisor)* -> Finished.
// ABOUTME: One immutable Graph is shared across requests; each invoke owns its own ConversationState.

use std::fmt;
use std::sync::Arc;

use hrdesk_core::{ConversationState, Message, RouteDecision, WorkerId};

use crate::error::TurnError;
use crate::supervisor::Router;
use crate::worker::Worker;

/// Step ceiling applied when the caller does not supply one.
pub const DEFAULT_STEP_LIMIT: usize = 50;

/// A state of the orchestration graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphNode {
    Supervisor,
    Worker(WorkerId),
    Finished,
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphNode::Supervisor => f.write_str("Supervisor"),
            GraphNode::Worker(id) => f.write_str(id.as_str()),
            GraphNode::Finished => f.write_str("Finished"),
        }
    }
}

impl From<RouteDecision> for GraphNode {
    fn from(decision: RouteDecision) -> Self {
        match decision {
            RouteDecision::Worker(id) => GraphNode::Worker(id),
            RouteDecision::Finish => GraphNode::Finished,
        }
    }
}

/// The three workers, one per [`WorkerId`].
pub struct Workers {
    pub data: Worker,
    pub policy: Worker,
    pub email: Worker,
}

impl Workers {
    pub fn get(&self, id: WorkerId) -> &Worker {
        match id {
            WorkerId::DataAgent => &self.data,
            WorkerId::PolicyAgent => &self.policy,
            WorkerId::EmailAgent => &self.email,
        }
    }
}

/// Result of a completed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Content of the last message in the final state.
    pub answer: String,
    pub state: ConversationState,
    /// Every node visited in order, ending with [`GraphNode::Finished`].
    pub path: Vec<GraphNode>,
    pub supervisor_evaluations: usize,
    pub worker_executions: usize,
}

pub struct Graph {
    router: Arc<dyn Router>,
    workers: Workers,
    step_limit: usize,
}

impl Graph {
    pub fn new(router: Arc<dyn Router>, workers: Workers, step_limit: usize) -> Self {
        Self {
            router,
            workers,
            step_limit,
        }
    }

    pub fn step_limit(&self) -> usize {
        self.step_limit
    }

    pub fn workers(&self) -> &Workers {
        &self.workers
    }

    /// Run one turn for a single user message.
    pub async fn invoke(
        &self,
        message: impl Into<String>,
        step_limit: Option<usize>,
    ) -> Result<TurnOutcome, TurnError> {
        let state = ConversationState::new(message);
        self.run(state, step_limit.unwrap_or(self.step_limit)).await
    }

    /// Drive `state` from the Supervisor until Finished or until `step_limit`
    /// node executions have been spent.
    pub async fn run(
        &self,
        mut state: ConversationState,
        step_limit: usize,
    ) -> Result<TurnOutcome, TurnError> {
        let turn_id = state.turn_id();
        tracing::info!(%turn_id, step_limit, "turn started");

        let mut node = GraphNode::Supervisor;
        let mut path = Vec::new();
        let mut supervisor_evaluations = 0;
        let mut worker_executions = 0;

        while node != GraphNode::Finished {
            if path.len() >= step_limit {
                let worker_answered = state.worker_has_answered();
                tracing::error!(%turn_id, step_limit, worker_answered, "step limit reached");
                return Err(TurnError::StepLimit {
                    limit: step_limit,
                    worker_answered,
                });
            }
            path.push(node);

            node = match node {
                GraphNode::Supervisor => {
                    supervisor_evaluations += 1;
                    let decision = self.router.decide(&state).await?;
                    state.set_next(decision);
                    GraphNode::from(decision)
                }
                GraphNode::Worker(id) => {
                    worker_executions += 1;
                    tracing::info!(%turn_id, worker = %id, "worker started");
                    let content = self
                        .workers
                        .get(id)
                        .run(&state)
                        .await
                        .map_err(|source| TurnError::Worker { worker: id, source })?;
                    state.append(Message::from_worker(id, content));
                    GraphNode::Supervisor
                }
                GraphNode::Finished => GraphNode::Finished,
            };
        }
        path.push(GraphNode::Finished);

        tracing::info!(
            %turn_id,
            supervisor_evaluations,
            worker_executions,
            "turn finished"
        );

        Ok(TurnOutcome {
            answer: state.answer().to_string(),
            state,
            path,
            supervisor_evaluations,
            worker_executions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DeskBuilder;
    use crate::llm::{ChatRole, LlmClient, LlmError, LlmRequest, LlmResponse};
    use crate::supervisor::RouterKind;
    use crate::testing::ScriptedLlmClient;
    use async_trait::async_trait;
    use hrdesk_store::{PolicyIndex, RecordingTransport};
    use serde_json::json;

    /// Sends every decision to the same worker, never finishing.
    struct StuckRouter(WorkerId);

    #[async_trait]
    impl Router for StuckRouter {
        async fn decide(&self, _state: &ConversationState) -> Result<RouteDecision, TurnError> {
            Ok(RouteDecision::Worker(self.0))
        }
    }

    /// Answers every request with the last user message it was shown,
    /// yielding first so that concurrent turns interleave.
    struct EchoClient;

    #[async_trait]
    impl LlmClient for EchoClient {
        async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
            tokio::task::yield_now().await;
            let question = request
                .messages
                .iter()
                .rev()
                .find(|m| m.role == ChatRole::User)
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(LlmResponse::text(format!("echo: {question}")))
        }

        fn provider_name(&self) -> &str {
            "echo"
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    const POLICY: &str = "Sick leave: every employee is entitled to 12 days of sick leave per year.\n\n\
        Casual leave: 10 days per year, not carried forward.";

    fn builder(client: Arc<ScriptedLlmClient>) -> DeskBuilder {
        DeskBuilder::new(client, Arc::new(PolicyIndex::from_text(POLICY, 80)))
    }

    #[tokio::test]
    async fn policy_question_takes_one_worker_and_two_evaluations() {
        let client = Arc::new(ScriptedLlmClient::new());
        client.push_route("PolicyAgent");
        client.push_tool_call("policy_search_tool", json!({"query": "sick leave"}));
        client.push_text("You get 12 days of sick leave per year.");
        let graph = builder(client.clone()).build().unwrap();

        let outcome = graph.invoke("What is the sick leave policy?", None).await.unwrap();

        assert_eq!(outcome.answer, "You get 12 days of sick leave per year.");
        assert_eq!(
            outcome.path,
            vec![
                GraphNode::Supervisor,
                GraphNode::Worker(WorkerId::PolicyAgent),
                GraphNode::Supervisor,
                GraphNode::Finished
            ]
        );
        assert_eq!(outcome.supervisor_evaluations, 2);
        assert_eq!(outcome.worker_executions, 1);
        assert_eq!(outcome.state.next(), Some(RouteDecision::Finish));
        // route + two worker calls; the second evaluation never reached the model
        assert_eq!(client.call_count(), 3);

        let second_call = &client.requests()[2];
        assert!(second_call.messages[0].content.contains("12 days of sick leave"));
    }

    #[tokio::test]
    async fn missing_employee_reaches_the_answer() {
        let client = Arc::new(ScriptedLlmClient::new());
        client.push_tool_call("fetch_employee_data", json!({"employee_id": "EMP999"}));
        client.push_text("Employee EMP999 was not found.");
        let graph = builder(client.clone())
            .router_kind(RouterKind::Rules)
            .build()
            .unwrap();

        let outcome = graph
            .invoke("My employee ID is EMP999. How much leave do I have?", None)
            .await
            .unwrap();

        assert!(outcome.answer.contains("not found"));
        assert_eq!(outcome.path[1], GraphNode::Worker(WorkerId::DataAgent));
        let summary = &client.requests()[1].messages[0].content;
        assert!(summary.contains(r#"{"error":"Employee not found."}"#));
    }

    #[tokio::test]
    async fn email_to_manager_end_to_end() {
        let client = Arc::new(ScriptedLlmClient::new());
        client.push_route("EmailAgent");
        client.push_tool_call(
            "send_email_tool",
            json!({
                "recipient": "arjun.verma@example.com",
                "subject": "Message from employee",
                "body": "Hello, I would like to discuss my leave."
            }),
        );
        client.push_text(
            "Email sent successfully to arjun.verma@example.com with subject 'Message from employee'.",
        );
        let transport = Arc::new(RecordingTransport::new());
        let graph = builder(client.clone())
            .transport(transport.clone())
            .build()
            .unwrap();

        let outcome = graph.invoke("Send email to manager", None).await.unwrap();

        assert!(outcome.answer.contains("arjun.verma@example.com"));
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "arjun.verma@example.com");

        let worker_first_call = &client.requests()[1];
        assert!(worker_first_call.messages[0].content.contains("arjun.verma@example.com"));
    }

    #[tokio::test]
    async fn no_worker_runs_twice_in_a_turn() {
        let client = Arc::new(ScriptedLlmClient::new());
        client.push_route("DataAgent");
        client.push_text("Please give me your employee ID.");
        let graph = builder(client).build().unwrap();

        let outcome = graph.invoke("How much leave do I have?", None).await.unwrap();
        let authored: Vec<_> = outcome
            .state
            .messages()
            .iter()
            .filter_map(|m| m.worker_author())
            .collect();
        assert_eq!(authored, vec![WorkerId::DataAgent]);
    }

    #[tokio::test]
    async fn stuck_router_hits_step_limit() {
        let client = Arc::new(ScriptedLlmClient::new());
        for _ in 0..10 {
            client.push_text("Here is the policy.");
        }
        let graph = builder(client)
            .router(Arc::new(StuckRouter(WorkerId::PolicyAgent)))
            .build()
            .unwrap();

        let err = graph.invoke("loop", Some(6)).await.unwrap_err();
        match err {
            TurnError::StepLimit {
                limit,
                worker_answered,
            } => {
                assert_eq!(limit, 6);
                assert!(worker_answered);
            }
            other => panic!("expected StepLimit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn step_limit_before_any_worker_answered() {
        let client = Arc::new(ScriptedLlmClient::new());
        let graph = builder(client.clone())
            .router(Arc::new(StuckRouter(WorkerId::DataAgent)))
            .build()
            .unwrap();

        let err = graph.invoke("hi", Some(1)).await.unwrap_err();
        assert!(matches!(
            err,
            TurnError::StepLimit {
                limit: 1,
                worker_answered: false
            }
        ));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn classification_failure_is_fatal() {
        let client = Arc::new(ScriptedLlmClient::new());
        client.push_route("HRAgent");
        let graph = builder(client).build().unwrap();

        let err = graph.invoke("hi", None).await.unwrap_err();
        assert!(matches!(err, TurnError::Classification(_)));
    }

    #[tokio::test]
    async fn routing_model_failure_is_an_llm_error() {
        let client = Arc::new(ScriptedLlmClient::new());
        client.push_error(LlmError::RateLimited);
        let graph = builder(client.clone()).build().unwrap();

        let err = graph.invoke("What is the policy?", None).await.unwrap_err();
        assert!(matches!(err, TurnError::Llm(LlmError::RateLimited)));
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn worker_model_failure_names_the_worker() {
        let client = Arc::new(ScriptedLlmClient::new());
        client.push_route("PolicyAgent");
        client.push_error(LlmError::RateLimited);
        let graph = builder(client).build().unwrap();

        let err = graph.invoke("What is the policy?", None).await.unwrap_err();
        assert!(matches!(
            err,
            TurnError::Worker {
                worker: WorkerId::PolicyAgent,
                ..
            }
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_turns_share_one_graph() {
        let graph = Arc::new(
            DeskBuilder::new(Arc::new(EchoClient), Arc::new(PolicyIndex::from_text(POLICY, 80)))
                .router_kind(RouterKind::Rules)
                .build()
                .unwrap(),
        );
        let policy_question = "What is the sick leave policy?";
        let data_question = "My employee ID is EMP001. How much leave do I have?";

        let first = tokio::spawn({
            let graph = Arc::clone(&graph);
            async move { graph.invoke(policy_question, None).await }
        });
        let second = tokio::spawn({
            let graph = Arc::clone(&graph);
            async move { graph.invoke(data_question, None).await }
        });
        let (first, second) = tokio::join!(first, second);
        let first = first.unwrap().unwrap();
        let second = second.unwrap().unwrap();

        assert_eq!(first.answer, format!("echo: {policy_question}"));
        assert_eq!(second.answer, format!("echo: {data_question}"));
        assert_eq!(first.path[1], GraphNode::Worker(WorkerId::PolicyAgent));
        assert_eq!(second.path[1], GraphNode::Worker(WorkerId::DataAgent));
        assert_ne!(first.state.turn_id(), second.state.turn_id());
        assert_eq!(first.state.messages().len(), 2);
        assert_eq!(second.state.messages().len(), 2);
    }

    #[test]
    fn node_names() {
        assert_eq!(GraphNode::Supervisor.to_string(), "Supervisor");
        assert_eq!(GraphNode::Worker(WorkerId::EmailAgent).to_string(), "EmailAgent");
        assert_eq!(GraphNode::from(RouteDecision::Finish), GraphNode::Finished);
    }
}
