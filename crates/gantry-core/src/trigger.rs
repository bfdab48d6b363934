//! Pure predicates over the canonical context that report whether a
//! human-authored signal asks the agent to engage.

use crate::context::EventContext;
use crate::event_payload::EventPayload;

/// True when `body` contains `phrase` as a case-sensitive literal with a
/// non-alphanumeric (or string edge) boundary on both sides, so `@claude`
/// matches inside a sentence but not inside a longer identifier. Absent or
/// empty text is false, never an error.
pub fn body_contains_trigger(body: Option<&str>, phrase: &str) -> bool {
    let Some(body) = body else {
        return false;
    };
    if body.is_empty() || phrase.is_empty() {
        return false;
    }
    let mut search_from = 0;
    while let Some(offset) = body[search_from..].find(phrase) {
        let start = search_from + offset;
        let end = start + phrase.len();
        let open = body[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let close = body[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if open && close {
            return true;
        }
        search_from = end;
    }
    false
}

/// True for `issues`/`assigned` events whose assignee login equals the
/// configured assignee trigger exactly (a leading `@` on the configured
/// value is tolerated).
pub fn is_assignee_trigger(context: &EventContext) -> bool {
    let wanted = context.inputs.assignee_trigger.trim_start_matches('@');
    if wanted.is_empty() || context.event_action.as_deref() != Some("assigned") {
        return false;
    }
    let Some(payload) = context.payload.issues() else {
        return false;
    };
    payload
        .assignee
        .as_ref()
        .is_some_and(|assignee| assignee.login == wanted)
}

/// True for `issues`/`labeled` events whose label name equals the configured
/// label trigger exactly.
pub fn is_label_trigger(context: &EventContext) -> bool {
    let wanted = context.inputs.label_trigger.as_str();
    if wanted.is_empty() || context.event_action.as_deref() != Some("labeled") {
        return false;
    }
    let Some(payload) = context.payload.issues() else {
        return false;
    };
    payload
        .label
        .as_ref()
        .is_some_and(|label| label.name == wanted)
}

/// Composite trigger decision: direct prompt, assignee, label, or a mention
/// of the trigger phrase in whichever text the event kind carries.
pub fn check_contains_trigger(context: &EventContext) -> bool {
    if !context.inputs.direct_prompt.is_empty() {
        return true;
    }
    if is_assignee_trigger(context) || is_label_trigger(context) {
        return true;
    }
    let phrase = context.inputs.trigger_phrase.as_str();
    match &context.payload {
        EventPayload::Issues(payload) => {
            context.event_action.as_deref() == Some("opened")
                && (body_contains_trigger(payload.issue.body.as_deref(), phrase)
                    || body_contains_trigger(Some(payload.issue.title.as_str()), phrase))
        }
        EventPayload::IssueComment(payload) => {
            body_contains_trigger(payload.comment.body.as_deref(), phrase)
        }
        EventPayload::PullRequest(payload) => {
            matches!(
                context.event_action.as_deref(),
                Some("opened") | Some("synchronize")
            ) && body_contains_trigger(payload.pull_request.body.as_deref(), phrase)
        }
        EventPayload::PullRequestReview(payload) => {
            body_contains_trigger(payload.review.body.as_deref(), phrase)
        }
        EventPayload::PullRequestReviewComment(payload) => {
            body_contains_trigger(payload.comment.body.as_deref(), phrase)
        }
        EventPayload::WorkflowDispatch(_) | EventPayload::Schedule(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        body_contains_trigger, check_contains_trigger, is_assignee_trigger, is_label_trigger,
    };
    use crate::context::{parse_event_context, ActionEnv, EventContext};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn context_for(event_name: &str, payload: Value, extra: &[(&str, &str)]) -> EventContext {
        let mut vars = HashMap::from([
            ("GITHUB_REPOSITORY".to_string(), "acme/widgets".to_string()),
            ("GITHUB_RUN_ID".to_string(), "1".to_string()),
            ("GITHUB_ACTOR".to_string(), "octocat".to_string()),
        ]);
        for (key, value) in extra {
            vars.insert(key.to_string(), value.to_string());
        }
        parse_event_context(&ActionEnv::new(event_name, payload, vars)).expect("context")
    }

    #[test]
    fn unit_body_contains_trigger_requires_boundaries() {
        assert!(body_contains_trigger(Some("Hey @claude, help"), "@claude"));
        assert!(body_contains_trigger(Some("@claude"), "@claude"));
        assert!(!body_contains_trigger(Some("no mention here"), "@claude"));
        assert!(!body_contains_trigger(Some("mail@claude"), "@claude"));
        assert!(!body_contains_trigger(
            Some("ping @claudette please"),
            "@claude"
        ));
    }

    #[test]
    fn unit_body_contains_trigger_accepts_punctuated_phrases() {
        assert!(body_contains_trigger(
            Some("Hey @claude[bot], can you help?"),
            "@claude[bot]"
        ));
    }

    #[test]
    fn unit_body_contains_trigger_handles_absent_or_empty_text() {
        assert!(!body_contains_trigger(None, "@claude"));
        assert!(!body_contains_trigger(Some(""), "@claude"));
        assert!(!body_contains_trigger(Some("anything"), ""));
    }

    #[test]
    fn regression_body_contains_trigger_finds_later_bounded_occurrence() {
        assert!(body_contains_trigger(
            Some("see x@claude and then @claude please"),
            "@claude"
        ));
    }

    #[test]
    fn functional_assignee_trigger_matches_exact_login() {
        let payload = json!({
            "action": "assigned",
            "assignee": {"login": "claude-bot"},
            "issue": {"number": 1, "title": "t"}
        });
        let hit = context_for(
            "issues",
            payload.clone(),
            &[("ASSIGNEE_TRIGGER", "claude-bot")],
        );
        assert!(is_assignee_trigger(&hit));
        assert!(check_contains_trigger(&hit));

        let miss = context_for("issues", payload, &[("ASSIGNEE_TRIGGER", "someone-else")]);
        assert!(!is_assignee_trigger(&miss));
        assert!(!check_contains_trigger(&miss));
    }

    #[test]
    fn functional_assignee_trigger_tolerates_leading_at_sign() {
        let context = context_for(
            "issues",
            json!({
                "action": "assigned",
                "assignee": {"login": "claude-bot"},
                "issue": {"number": 1}
            }),
            &[("ASSIGNEE_TRIGGER", "@claude-bot")],
        );
        assert!(is_assignee_trigger(&context));
    }

    #[test]
    fn functional_label_trigger_matches_exact_name() {
        let payload = json!({
            "action": "labeled",
            "label": {"name": "claude-help"},
            "issue": {"number": 2}
        });
        let hit = context_for("issues", payload.clone(), &[("LABEL_TRIGGER", "claude-help")]);
        assert!(is_label_trigger(&hit));
        assert!(check_contains_trigger(&hit));

        let miss = context_for("issues", payload, &[("LABEL_TRIGGER", "other-label")]);
        assert!(!check_contains_trigger(&miss));
    }

    #[test]
    fn functional_mention_in_issue_comment_triggers() {
        let hit = context_for(
            "issue_comment",
            json!({
                "action": "created",
                "issue": {"number": 3},
                "comment": {"id": 5, "body": "Hey @claude, help"}
            }),
            &[],
        );
        assert!(check_contains_trigger(&hit));

        let miss = context_for(
            "issue_comment",
            json!({
                "action": "created",
                "issue": {"number": 3},
                "comment": {"id": 5, "body": "just a regular comment"}
            }),
            &[],
        );
        assert!(!check_contains_trigger(&miss));
    }

    #[test]
    fn functional_mention_in_opened_issue_body_or_title_triggers() {
        let via_body = context_for(
            "issues",
            json!({"action": "opened", "issue": {"number": 4, "body": "@claude take a look"}}),
            &[],
        );
        assert!(check_contains_trigger(&via_body));

        let via_title = context_for(
            "issues",
            json!({"action": "opened", "issue": {"number": 4, "title": "@claude: broken build"}}),
            &[],
        );
        assert!(check_contains_trigger(&via_title));

        let edited = context_for(
            "issues",
            json!({"action": "edited", "issue": {"number": 4, "body": "@claude take a look"}}),
            &[],
        );
        assert!(!check_contains_trigger(&edited));
    }

    #[test]
    fn functional_direct_prompt_triggers_any_event_kind() {
        let dispatch = context_for(
            "workflow_dispatch",
            json!({"inputs": {}}),
            &[("DIRECT_PROMPT", "fix the flaky test")],
        );
        assert!(check_contains_trigger(&dispatch));

        let bare = context_for("schedule", json!({"schedule": "0 0 * * *"}), &[]);
        assert!(!check_contains_trigger(&bare));
    }

    #[test]
    fn functional_mention_in_review_body_triggers() {
        let context = context_for(
            "pull_request_review",
            json!({
                "action": "submitted",
                "pull_request": {"number": 6},
                "review": {"body": "@claude please address the comments"}
            }),
            &[],
        );
        assert!(check_contains_trigger(&context));
    }

    #[test]
    fn regression_pull_request_body_mention_requires_opened_or_synchronize() {
        let payload = json!({
            "action": "labeled",
            "pull_request": {"number": 7, "body": "@claude review this"}
        });
        let labeled = context_for("pull_request", payload, &[]);
        assert!(!check_contains_trigger(&labeled));

        let opened = context_for(
            "pull_request",
            json!({
                "action": "opened",
                "pull_request": {"number": 7, "body": "@claude review this"}
            }),
            &[],
        );
        assert!(check_contains_trigger(&opened));
    }
}
