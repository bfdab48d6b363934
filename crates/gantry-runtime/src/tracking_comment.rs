use anyhow::{bail, Result};
use async_trait::async_trait;

use gantry_core::collaborators::{TrackingComment, TrackingCommentClient};
use gantry_core::context::EventContext;

use crate::github_api_client::GithubApiClient;

/// Hidden marker that identifies the gate's progress comment, so sticky mode
/// can find and reuse it across runs.
pub const TRACKING_COMMENT_MARKER: &str = "<!-- gantry:tracking-comment -->";

pub fn initial_comment_body() -> String {
    format!(
        "Working on it… this comment will be updated with progress.\n\n{TRACKING_COMMENT_MARKER}"
    )
}

pub struct ApiTrackingCommentClient {
    client: GithubApiClient,
}

impl ApiTrackingCommentClient {
    pub fn new(client: GithubApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TrackingCommentClient for ApiTrackingCommentClient {
    async fn create_tracking_comment(&self, context: &EventContext) -> Result<TrackingComment> {
        if !context.is_entity_event() {
            bail!(
                "cannot create a tracking comment for {} events",
                context.event_name
            );
        }
        let body = initial_comment_body();

        if context.inputs.use_sticky_comment {
            let existing = self.client.issue_comments(context.entity_number).await?;
            let marked = existing.iter().find(|comment| {
                comment
                    .body
                    .as_deref()
                    .is_some_and(|text| text.contains(TRACKING_COMMENT_MARKER))
            });
            if let Some(found) = marked {
                let updated = self.client.update_issue_comment(found.id, &body).await?;
                tracing::info!(comment_id = updated.id, "reusing sticky tracking comment");
                return Ok(TrackingComment {
                    id: updated.id,
                    author_login: updated.user.login,
                });
            }
        }

        let created = self
            .client
            .create_issue_comment(context.entity_number, &body)
            .await?;
        tracing::info!(comment_id = created.id, "created tracking comment");
        Ok(TrackingComment {
            id: created.id,
            author_login: created.user.login,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{initial_comment_body, TRACKING_COMMENT_MARKER};

    #[test]
    fn unit_initial_comment_body_carries_the_sticky_marker() {
        let body = initial_comment_body();
        assert!(body.contains(TRACKING_COMMENT_MARKER));
        assert!(body.starts_with("Working on it"));
    }
}
