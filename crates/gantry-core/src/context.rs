use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use serde_json::Value;

use crate::event_payload::EventPayload;
use crate::inputs::GateInputs;
use crate::modes::registry::{is_valid_mode, DEFAULT_MODE};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `RepoRef` used across Gantry components.
pub struct RepoRef {
    pub owner: String,
    pub name: String,
    pub full_name: String,
}

impl RepoRef {
    pub fn from_full_name(full_name: &str) -> Result<Self> {
        let Some((owner, name)) = full_name.split_once('/') else {
            bail!("repository '{full_name}' is not in owner/name form");
        };
        if owner.is_empty() || name.is_empty() {
            bail!("repository '{full_name}' is not in owner/name form");
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
            full_name: full_name.to_string(),
        })
    }
}

/// Snapshot of the triggering environment: the event name, the raw payload
/// value, and the configuration variables. Tests construct this directly;
/// the binary builds it from the process environment.
#[derive(Debug, Clone, Default)]
pub struct ActionEnv {
    pub event_name: String,
    pub payload: Value,
    pub vars: HashMap<String, String>,
}

impl ActionEnv {
    pub fn new(
        event_name: impl Into<String>,
        payload: Value,
        vars: HashMap<String, String>,
    ) -> Self {
        Self {
            event_name: event_name.into(),
            payload,
            vars,
        }
    }

    /// Reads the live process environment plus the event payload file that
    /// the workflow runner points `GITHUB_EVENT_PATH` at.
    pub fn from_process() -> Result<Self> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        let event_name = vars
            .get("GITHUB_EVENT_NAME")
            .cloned()
            .context("GITHUB_EVENT_NAME is not set")?;
        let event_path = vars
            .get("GITHUB_EVENT_PATH")
            .cloned()
            .context("GITHUB_EVENT_PATH is not set")?;
        let raw = std::fs::read_to_string(&event_path)
            .with_context(|| format!("failed to read event payload at {event_path}"))?;
        let payload = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse event payload at {event_path}"))?;
        Ok(Self {
            event_name,
            payload,
            vars,
        })
    }

    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn var_or(&self, key: &str, default: &str) -> String {
        self.var(key).unwrap_or(default).to_string()
    }
}

/// The canonical, event-kind-independent record describing one triggering
/// event. Constructed exactly once per invocation and never mutated.
#[derive(Debug, Clone)]
pub struct EventContext {
    pub run_id: String,
    pub event_name: String,
    pub event_action: Option<String>,
    pub repository: RepoRef,
    pub actor: String,
    pub payload: EventPayload,
    /// Issue or PR number; `0` for manual and scheduled triggers.
    pub entity_number: u64,
    pub is_pr: bool,
    pub inputs: GateInputs,
}

impl EventContext {
    /// True when the event is scoped to an issue or pull request.
    pub fn is_entity_event(&self) -> bool {
        !matches!(
            self.payload,
            EventPayload::WorkflowDispatch(_) | EventPayload::Schedule(_)
        )
    }
}

/// Normalizes the triggering environment and raw payload into an
/// [`EventContext`], or fails with a descriptive configuration error.
pub fn parse_event_context(env: &ActionEnv) -> Result<EventContext> {
    let requested_mode = env.var("MODE").unwrap_or(DEFAULT_MODE);
    if !is_valid_mode(requested_mode) {
        bail!("invalid mode: {requested_mode}");
    }

    let repository = RepoRef::from_full_name(
        env.var("GITHUB_REPOSITORY")
            .context("GITHUB_REPOSITORY is not set")?,
    )?;
    let event_action = env
        .payload
        .get("action")
        .and_then(Value::as_str)
        .map(ToString::to_string);

    let payload = EventPayload::parse(&env.event_name, env.payload.clone())?;
    let (entity_number, is_pr) = match &payload {
        EventPayload::Issues(p) => (p.issue.number, false),
        EventPayload::IssueComment(p) => (p.issue.number, p.issue.pull_request.is_some()),
        EventPayload::PullRequest(p) => (p.pull_request.number, true),
        EventPayload::PullRequestReview(p) => (p.pull_request.number, true),
        EventPayload::PullRequestReviewComment(p) => (p.pull_request.number, true),
        EventPayload::WorkflowDispatch(_) | EventPayload::Schedule(_) => (0, false),
    };

    Ok(EventContext {
        run_id: env.var_or("GITHUB_RUN_ID", ""),
        event_name: env.event_name.clone(),
        event_action,
        repository,
        actor: env.var_or("GITHUB_ACTOR", ""),
        payload,
        entity_number,
        is_pr,
        inputs: GateInputs::from_env(requested_mode, env),
    })
}
