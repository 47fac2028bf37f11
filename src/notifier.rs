//! Build event → chat notification

use tracing::{info, warn};

use crate::commits::{CommitInfo, CommitSource, resolve_repository};
use crate::config::NotifierConfig;
use crate::event::{BuildEvent, BuildStatus};
use crate::message::{ComposeOptions, compose};
use crate::utils::is_deploy_trigger;
use crate::webhook::{Delivery, post_message};

/// What the notifier did with one event
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    NoWebhook,
    NotDeploy { trigger: Option<String> },
    UnexpectedStatus { status: BuildStatus },
    Delivered(Delivery),
}

/// Everything the notifier needs besides the event itself
pub struct NotifierContext<'a> {
    pub config: &'a NotifierConfig,
    pub client: &'a reqwest::Client,
    pub commits: &'a dyn CommitSource,
}

pub async fn handle_build_event(ctx: &NotifierContext<'_>, event: &BuildEvent) -> Outcome {
    let Some(webhook_url) = ctx.config.webhook_url() else {
        warn!("DISCORD_WEBHOOK_URL is not configured; skipping build {}", event.id);
        return Outcome::NoWebhook;
    };

    if !is_deploy_trigger(event.trigger_name(), &ctx.config.deploy_keyword) {
        info!(
            "Build {} from trigger {:?} is not a deploy; skipping",
            event.id,
            event.trigger_name()
        );
        return Outcome::NotDeploy {
            trigger: event.trigger_name().map(String::from),
        };
    }

    if !event.status.is_notifiable() {
        info!("Build {} has status {}; nothing to send", event.id, event.status);
        return Outcome::UnexpectedStatus {
            status: event.status,
        };
    }

    let commit = if event.status == BuildStatus::Working {
        fetch_commit(ctx, event).await
    } else {
        None
    };

    let options = ComposeOptions {
        failure_mention: ctx.config.failure_mention.as_deref(),
    };
    let Some(message) = compose(event, commit.as_ref(), &options) else {
        return Outcome::UnexpectedStatus {
            status: event.status,
        };
    };

    let delivery = post_message(ctx.client, webhook_url, &message).await;
    info!(
        "Notified build {} ({} {}): {:?} {}",
        event.id,
        event.target(),
        event.status,
        delivery.status,
        delivery.body
    );
    Outcome::Delivered(delivery)
}

async fn fetch_commit(ctx: &NotifierContext<'_>, event: &BuildEvent) -> Option<CommitInfo> {
    let sha = event.commit_sha()?;
    let repo = resolve_repository(&ctx.config.github, event)?;

    match ctx.commits.lookup(&repo, sha).await {
        Ok(commit) => commit,
        Err(e) => {
            warn!("Commit lookup for {}@{} failed: {}", repo, sha, e);
            None
        }
    }
}
