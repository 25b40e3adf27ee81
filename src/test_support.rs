use crate::agent::{Agent, AgentDefinition, AgentSource, infer_skills};
use crate::assign::{DecisionGateway, DecisionRequest, DecisionResponse, GatewayError};
use crate::config::Config;
use crate::context::ProjectContext;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// Write `<agents_dir>/<id><suffix>` with the given content.
pub(crate) fn write_agent_doc(ctx: &ProjectContext, config: &Config, id: &str, content: &str) {
    let dir = ctx.agents_dir(config);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join(format!("{}{}", id, config.agent_file_suffix)),
        content,
    )
    .unwrap();
}

/// Write the versioned catalog file.
pub(crate) fn write_catalog(ctx: &ProjectContext, config: &Config, yaml: &str) {
    let path = ctx.agents_file(config);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, yaml).unwrap();
}

/// Build an in-memory agent for scoring and arbiter tests.
pub(crate) fn make_agent(
    id: &str,
    agent_type: &str,
    patterns: &[&str],
    code_paths: &[&str],
) -> Agent {
    Agent {
        definition: AgentDefinition {
            id: id.to_string(),
            name: format!("{} agent", id),
            agent_type: agent_type.to_string(),
            responsibilities: vec![format!("Handle {} work", agent_type)],
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            relevant_code_paths: code_paths.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        },
        skills: infer_skills("", agent_type),
        token_budget: 1000,
        current_tasks: Vec::new(),
        max_parallel_tasks: 3,
        source: AgentSource::Synthesized,
    }
}

/// Gateway that answers from a script and remembers what it was asked.
/// Once the script runs out every request is a skip.
pub(crate) struct ScriptedGateway {
    answers: Mutex<VecDeque<Result<DecisionResponse, GatewayError>>>,
    requests: Mutex<Vec<DecisionRequest>>,
}

impl ScriptedGateway {
    pub(crate) fn new(answers: Vec<Result<DecisionResponse, GatewayError>>) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn answering(answer: Result<DecisionResponse, GatewayError>) -> Arc<Self> {
        Self::new(vec![answer])
    }

    pub(crate) fn requests(&self) -> Vec<DecisionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl DecisionGateway for ScriptedGateway {
    fn request_decision(
        &self,
        request: &DecisionRequest,
    ) -> Result<DecisionResponse, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(DecisionResponse::Skip))
    }
}
