//! Command-line front end: drafts a message, uploads a large attachment in
//! slices, then sends it.

mod config;
mod progress;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use largeattach_mailbox::{
    AttachmentOptions, GraphClient, StaticTokenProvider, send_with_large_attachment,
};
use largeattach_protocol::{BodyType, DraftMessage, Importance, ItemBody, Recipient};
use largeattach_transfer::{ChunkedUploader, HttpTransport, ProgressSink, UploaderConfig};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, TOKEN_ENV};

#[derive(Debug, Parser)]
#[command(name = "largeattach", version, about = "Send a large file as a mail attachment")]
struct Args {
    /// File to attach.
    attachment: PathBuf,

    /// Configuration file (defaults to the per-user location).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Recipient address; repeat for several. Overrides the configured list.
    #[arg(long = "to")]
    to: Vec<String>,

    /// Message subject. Overrides the configured subject.
    #[arg(long)]
    subject: Option<String>,

    /// Attachment name shown to recipients (defaults to the file name).
    #[arg(long)]
    name: Option<String>,

    /// Upload the attachment but leave the message as a draft.
    #[arg(long)]
    no_send: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!(version = env!("CARGO_PKG_VERSION"), "largeattach starting");

    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let config = Config::load_or_create(&config_path)?;
    config
        .validate()
        .with_context(|| format!("invalid configuration in {}", config_path.display()))?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(args, config))
}

async fn run(args: Args, config: Config) -> anyhow::Result<()> {
    let token = config
        .resolve_token(std::env::var(TOKEN_ENV).ok())
        .with_context(|| format!("no access token: set {TOKEN_ENV} or access_token"))?;

    let recipients = if args.to.is_empty() {
        config.message.to.clone()
    } else {
        args.to.clone()
    };
    if recipients.is_empty() && !args.no_send {
        anyhow::bail!("no recipients: pass --to or set message.to");
    }

    let draft = DraftMessage {
        subject: args
            .subject
            .clone()
            .unwrap_or_else(|| config.message.subject.clone()),
        importance: Importance::Low,
        body: ItemBody {
            content_type: BodyType::Html,
            content: config.message.body_html.clone(),
        },
        to_recipients: recipients.iter().map(Recipient::address).collect(),
    };

    let client = GraphClient::new(Arc::new(StaticTokenProvider::new(token)), &config.user_id)?
        .with_base_url(&config.graph_base_url);

    let uploader_config = UploaderConfig::new(
        config.slice_size,
        Duration::from_secs(config.slice_timeout_secs),
    )?;
    let (sink, progress_rx) = ProgressSink::channel();
    let uploader = ChunkedUploader::new(HttpTransport::new()?, uploader_config).with_progress(sink);

    let cancel = uploader.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling upload");
            cancel.cancel();
        }
    });
    let logger = tokio::spawn(progress::log_progress(progress_rx));

    let options = AttachmentOptions {
        name: args.name.clone(),
        content_type: None,
        keep_as_draft: args.no_send,
    };
    let result =
        send_with_large_attachment(&client, &uploader, &draft, &args.attachment, &options).await;

    // Closes the progress channel so the logger finishes.
    drop(uploader);
    let _ = logger.await;

    let report = result?;
    match report.upload.error() {
        None => {
            info!(
                message_id = %report.message_id,
                name = %report.attachment_name,
                size = report.attachment_size,
                requests = report.upload.requests(),
                sent = report.sent,
                "done"
            );
            Ok(())
        }
        Some(err) => {
            error!(
                message_id = %report.message_id,
                bytes_sent = report.upload.bytes_sent(),
                requests = report.upload.requests(),
                "upload failed: {err}"
            );
            if let Some(session) = report.upload.resume_session() {
                info!(
                    upload_url = %session.upload_url,
                    expires = %session.expiration_date_time,
                    next = ?session.next_expected_ranges,
                    "session can be resumed until it expires"
                );
            }
            Err(anyhow::anyhow!(err.clone()))
        }
    }
}
