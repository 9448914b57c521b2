// ABOUTME: DeskBuilder wires an LLM client, data sources, and routing choice into a Graph.
// ABOUTME: The policy index is required; an unset directory or transport falls back to the seed and the log.

use std::sync::Arc;

use hrdesk_core::WorkerId;
use hrdesk_store::{DirectoryError, EmailTransport, EmployeeDirectory, LogTransport, PolicyIndex};

use crate::graph::{DEFAULT_STEP_LIMIT, Graph, Workers};
use crate::llm::LlmClient;
use crate::supervisor::{Classifier, LlmClassifier, Router, RouterKind, RuleClassifier, Supervisor};
use crate::worker::{Contacts, DATA_AGENT_INSTRUCTION, POLICY_AGENT_INSTRUCTION, Worker};
use crate::worker_tools::{FetchEmployeeDataTool, PolicySearchTool, SendEmailTool};

pub struct DeskBuilder {
    client: Arc<dyn LlmClient>,
    directory: Option<Arc<EmployeeDirectory>>,
    policy_index: Arc<PolicyIndex>,
    transport: Option<Arc<dyn EmailTransport>>,
    contacts: Contacts,
    router_kind: RouterKind,
    router: Option<Arc<dyn Router>>,
    step_limit: usize,
}

impl DeskBuilder {
    /// Start a builder. The policy index is built once by the caller from
    /// the policy document and cannot be left out.
    pub fn new(client: Arc<dyn LlmClient>, policy_index: Arc<PolicyIndex>) -> Self {
        Self {
            client,
            directory: None,
            policy_index,
            transport: None,
            contacts: Contacts::default(),
            router_kind: RouterKind::default(),
            router: None,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    pub fn directory(mut self, directory: Arc<EmployeeDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn EmailTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn contacts(mut self, contacts: Contacts) -> Self {
        self.contacts = contacts;
        self
    }

    pub fn router_kind(mut self, kind: RouterKind) -> Self {
        self.router_kind = kind;
        self
    }

    /// Replace the supervisor entirely. Takes precedence over `router_kind`.
    pub fn router(mut self, router: Arc<dyn Router>) -> Self {
        self.router = Some(router);
        self
    }

    pub fn step_limit(mut self, step_limit: usize) -> Self {
        self.step_limit = step_limit;
        self
    }

    pub fn build(self) -> Result<Graph, DirectoryError> {
        let directory = match self.directory {
            Some(directory) => directory,
            None => Arc::new(EmployeeDirectory::seeded()?),
        };
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(LogTransport) as Arc<dyn EmailTransport>);

        let router = self.router.unwrap_or_else(|| {
            let classifier: Arc<dyn Classifier> = match self.router_kind {
                RouterKind::Llm => Arc::new(LlmClassifier::new(self.client.clone())),
                RouterKind::Rules => Arc::new(RuleClassifier),
            };
            Arc::new(Supervisor::new(classifier))
        });

        let workers = Workers {
            data: Worker::new(
                WorkerId::DataAgent,
                DATA_AGENT_INSTRUCTION,
                Arc::new(FetchEmployeeDataTool::new(directory)),
                self.client.clone(),
            ),
            policy: Worker::new(
                WorkerId::PolicyAgent,
                POLICY_AGENT_INSTRUCTION,
                Arc::new(PolicySearchTool::new(self.policy_index)),
                self.client.clone(),
            ),
            email: Worker::new(
                WorkerId::EmailAgent,
                self.contacts.email_instruction(),
                Arc::new(SendEmailTool::new(transport)),
                self.client,
            ),
        };

        tracing::debug!(
            router = %self.router_kind,
            step_limit = self.step_limit,
            "orchestration graph built"
        );
        Ok(Graph::new(router, workers, self.step_limit))
    }
}
