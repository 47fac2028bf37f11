//! Chat message shapes and the mapping from build events to messages

use serde::Serialize;

use crate::commits::CommitInfo;
use crate::event::{BuildEvent, BuildStatus};
use crate::utils::{format_duration, truncate_chars};

pub const COLOR_BLUE: u32 = 0x3498DB;
pub const COLOR_GREEN: u32 = 0x2ECC71;
pub const COLOR_RED: u32 = 0xE74C3C;
pub const COLOR_ORANGE: u32 = 0xE67E22;
pub const COLOR_GREY: u32 = 0x95A5A6;

const MAX_COMMIT_SUMMARY_LEN: usize = 256;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatMessage {
    pub content: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbedAuthor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Options that shape the message but do not come from the event
#[derive(Debug, Clone, Default)]
pub struct ComposeOptions<'a> {
    pub failure_mention: Option<&'a str>,
}

/// Build the chat message for `event`. Returns `None` for statuses that are not announced.
pub fn compose(
    event: &BuildEvent,
    commit: Option<&CommitInfo>,
    options: &ComposeOptions<'_>,
) -> Option<ChatMessage> {
    let target = event.target();
    let duration = format_duration(event.duration());
    let log_url = event.log_url.clone();

    let (word, headline) = match event.status {
        BuildStatus::Working => (
            "started",
            Embed {
                title: format!("Deploying {}", target),
                color: COLOR_BLUE,
                description: format!(
                    "Build `{}` started for `{}`",
                    event.short_id(),
                    event.image_tag().unwrap_or("unknown image")
                ),
                url: log_url,
                author: None,
            },
        ),
        BuildStatus::Success => (
            "succeeded",
            Embed {
                title: format!("{} deployed successfully", target),
                color: COLOR_GREEN,
                description: format!("Finished in {}", duration),
                url: event.host().map(|h| format!("https://{}", h)).or(log_url),
                author: None,
            },
        ),
        status if status.is_failure() => (
            "failed",
            Embed {
                title: format!("{} deploy failed", target),
                color: COLOR_RED,
                description: format!("Status {} after {}", status, duration),
                url: log_url,
                author: None,
            },
        ),
        BuildStatus::Cancelled => (
            "cancelled",
            Embed {
                title: format!("{} deploy cancelled", target),
                color: COLOR_ORANGE,
                description: format!("Cancelled after {}", duration),
                url: log_url,
                author: None,
            },
        ),
        _ => return None,
    };

    let mut content = format!("{} deploy {}", target, word);
    if event.status.is_failure() {
        if let Some(mention) = options.failure_mention {
            content = format!("{} {}", mention, content);
        }
    }

    let mut embeds = vec![headline];
    if event.status == BuildStatus::Working {
        if let Some(commit) = commit {
            embeds.push(commit_embed(commit));
        }
    }

    Some(ChatMessage { content, embeds })
}

fn commit_embed(commit: &CommitInfo) -> Embed {
    Embed {
        title: format!("Commit {}", commit.short_sha()),
        color: COLOR_GREY,
        description: truncate_chars(commit.summary(), MAX_COMMIT_SUMMARY_LEN),
        url: commit.html_url.clone(),
        author: Some(EmbedAuthor {
            name: commit.author.clone(),
            icon_url: commit.author_avatar_url.clone(),
        }),
    }
}
