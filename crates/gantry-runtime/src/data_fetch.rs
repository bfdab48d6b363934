use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

use gantry_core::collaborators::{
    ChangedFile, EntityMetadata, EventDataFetcher, FetchedComment, FetchedEventData,
};
use gantry_core::context::EventContext;

use crate::github_api_client::GithubApiClient;

/// Collects http(s) attachment URLs from free text, including markdown link
/// targets, in first-seen order without duplicates.
pub fn extract_attachment_urls(text: &str) -> Vec<String> {
    let mut urls = Vec::new();
    let mut seen = HashSet::new();
    for token in text.split_whitespace() {
        if let Some(linked) = extract_markdown_link_url(token) {
            push_attachment_url(linked, &mut urls, &mut seen);
        }
        push_attachment_url(token, &mut urls, &mut seen);
    }
    urls
}

fn extract_markdown_link_url(token: &str) -> Option<&str> {
    let open = token.find("](")?;
    let tail = &token[open + 2..];
    let close = tail.find(')')?;
    Some(&tail[..close])
}

fn push_attachment_url(candidate: &str, urls: &mut Vec<String>, seen: &mut HashSet<String>) {
    let trimmed = candidate.trim_end_matches([')', ',', '.', ';']);
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return;
    }
    if seen.insert(trimmed.to_string()) {
        urls.push(trimmed.to_string());
    }
}

pub struct ApiEventDataFetcher {
    client: GithubApiClient,
}

impl ApiEventDataFetcher {
    pub fn new(client: GithubApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EventDataFetcher for ApiEventDataFetcher {
    async fn fetch(&self, context: &EventContext) -> Result<FetchedEventData> {
        let repo = self.client.repo_metadata().await?;
        let mut data = FetchedEventData {
            default_branch: repo.default_branch,
            ..Default::default()
        };
        if !context.is_entity_event() {
            return Ok(data);
        }

        let number = context.entity_number;
        if context.is_pr {
            let pull = self.client.pull_request(number).await?;
            data.entity = Some(EntityMetadata {
                title: pull.title,
                body: pull.body.unwrap_or_default(),
                author_login: pull.user.login,
                state: pull.state,
                head_ref: Some(pull.head.ref_name),
            });
            data.review_comments = self
                .client
                .review_comments(number)
                .await?
                .into_iter()
                .map(|comment| FetchedComment {
                    author_login: comment.user.login,
                    body: comment.body.unwrap_or_default(),
                })
                .collect();
            data.changed_files = self
                .client
                .changed_files(number)
                .await?
                .into_iter()
                .map(|file| ChangedFile {
                    path: file.filename,
                    status: file.status,
                    additions: file.additions,
                    deletions: file.deletions,
                    sha: file.sha,
                })
                .collect();
        } else {
            let issue = self.client.issue(number).await?;
            data.entity = Some(EntityMetadata {
                title: issue.title,
                body: issue.body.unwrap_or_default(),
                author_login: issue.user.login,
                state: issue.state,
                head_ref: None,
            });
        }

        data.comments = self
            .client
            .issue_comments(number)
            .await?
            .into_iter()
            .map(|comment| FetchedComment {
                author_login: comment.user.login,
                body: comment.body.unwrap_or_default(),
            })
            .collect();

        let mut corpus = String::new();
        if let Some(entity) = data.entity.as_ref() {
            corpus.push_str(&entity.body);
            corpus.push('\n');
        }
        for comment in data.comments.iter().chain(data.review_comments.iter()) {
            corpus.push_str(&comment.body);
            corpus.push('\n');
        }
        data.attachment_urls = extract_attachment_urls(&corpus);

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::extract_attachment_urls;

    #[test]
    fn unit_extract_attachment_urls_deduplicates_and_reads_markdown_links() {
        let text =
            "See [trace](https://example.test/trace.log) and https://example.test/trace.log";
        assert_eq!(
            extract_attachment_urls(text),
            vec!["https://example.test/trace.log".to_string()]
        );
    }

    #[test]
    fn unit_extract_attachment_urls_ignores_non_http_tokens() {
        let text = "ftp://example.test/file nothing file.txt";
        assert!(extract_attachment_urls(text).is_empty());
    }

    #[test]
    fn regression_extract_attachment_urls_strips_trailing_punctuation() {
        let text = "screenshot at https://example.test/shot.png.";
        assert_eq!(
            extract_attachment_urls(text),
            vec!["https://example.test/shot.png".to_string()]
        );
    }
}
