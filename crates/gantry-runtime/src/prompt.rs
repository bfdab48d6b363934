use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;

use gantry_core::collaborators::{FetchedEventData, PromptWriter};
use gantry_core::event_payload::EventPayload;
use gantry_core::modes::PreparedModeContext;

use crate::fs_util::write_text_atomic;

/// Renders the agent prompt from the mode-prepared context and fetched data.
/// An override prompt replaces everything; a direct prompt is appended as an
/// explicit instruction section.
pub fn render_prompt(prepared: &PreparedModeContext, data: &FetchedEventData) -> String {
    let context = &prepared.context;
    if !context.inputs.override_prompt.is_empty() {
        return context.inputs.override_prompt.clone();
    }

    let entity_label = if context.is_pr { "PR" } else { "Issue" };
    let mut rendered = format!(
        "You are an automated coding agent responding inside a GitHub repository.\nMode: {}\nRepository: {}\nEvent: {}{}\nActor: @{}",
        prepared.mode,
        context.repository.full_name,
        context.event_name,
        context
            .event_action
            .as_deref()
            .map(|action| format!(" ({action})"))
            .unwrap_or_default(),
        context.actor,
    );
    if context.is_entity_event() {
        rendered.push_str(&format!("\n{entity_label}: #{}", context.entity_number));
    }
    if let Some(base) = prepared.base_branch.as_deref() {
        rendered.push_str(&format!("\nBase branch: {base}"));
    }
    if let Some(branch) = prepared.work_branch.as_deref() {
        rendered.push_str(&format!("\nWorking branch: {branch}"));
    }

    if let Some(entity) = data.entity.as_ref() {
        rendered.push_str(&format!(
            "\n\n{entity_label} title: {}\nAuthor: @{}\n\n{entity_label} body:\n{}",
            entity.title,
            entity.author_login,
            if entity.body.is_empty() {
                "No description provided"
            } else {
                entity.body.as_str()
            }
        ));
    }

    if !data.comments.is_empty() {
        rendered.push_str("\n\nComments:\n");
        for comment in &data.comments {
            rendered.push_str(&format!("- @{}: {}\n", comment.author_login, comment.body));
        }
    }
    if !data.review_comments.is_empty() {
        rendered.push_str("\nReview comments:\n");
        for comment in &data.review_comments {
            rendered.push_str(&format!("- @{}: {}\n", comment.author_login, comment.body));
        }
    }
    if !data.changed_files.is_empty() {
        rendered.push_str("\nChanged files:\n");
        for file in &data.changed_files {
            rendered.push_str(&format!(
                "- {} ({}, +{} -{})\n",
                file.path, file.status, file.additions, file.deletions
            ));
        }
    }
    if !data.attachment_urls.is_empty() {
        rendered.push_str("\nAttachments:\n");
        for url in &data.attachment_urls {
            rendered.push_str(&format!("- {url}\n"));
        }
    }

    if let Some(trigger_body) = trigger_comment_body(&context.payload) {
        rendered.push_str(&format!("\nTrigger comment:\n{trigger_body}\n"));
    }
    if !context.inputs.direct_prompt.is_empty() {
        rendered.push_str(&format!(
            "\nDirect instruction:\n{}\n",
            context.inputs.direct_prompt
        ));
    }
    if !context.inputs.custom_instructions.is_empty() {
        rendered.push_str(&format!(
            "\nCustom instructions:\n{}\n",
            context.inputs.custom_instructions
        ));
    }

    rendered
}

fn trigger_comment_body(payload: &EventPayload) -> Option<&str> {
    match payload {
        EventPayload::IssueComment(p) => p.comment.body.as_deref(),
        EventPayload::PullRequestReview(p) => p.review.body.as_deref(),
        EventPayload::PullRequestReviewComment(p) => p.comment.body.as_deref(),
        _ => None,
    }
}

/// Writes the rendered prompt where the downstream agent step reads it.
pub struct FilePromptWriter {
    path: PathBuf,
}

impl FilePromptWriter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl PromptWriter for FilePromptWriter {
    async fn write_prompt(
        &self,
        prepared: &PreparedModeContext,
        data: &FetchedEventData,
    ) -> Result<()> {
        let rendered = render_prompt(prepared, data);
        write_text_atomic(&self.path, &rendered)?;
        tracing::info!(path = %self.path.display(), bytes = rendered.len(), "wrote agent prompt");
        Ok(())
    }
}
