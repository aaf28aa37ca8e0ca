use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    load_settings, load_settings_from, spawn_gift_refresh, ContributionFlow, ContributionGateway,
    FlowVariant, GiftListUpdate, RegistryClient, SubmissionOutcome, SystemClipboard,
    TriggerDataset,
};
use shared::domain::{format_amount, GiftId, PaymentMethod};
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod presenter;

use presenter::TerminalPresenter;

#[derive(Parser, Debug)]
#[command(name = "registry", about = "Wedding gift registry contributions")]
struct Cli {
    /// Registry backend, e.g. http://127.0.0.1:5000
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// pix_fixed, pix_and_card or contribution
    #[arg(long, global = true)]
    variant: Option<FlowVariant>,
    /// Settings file to use instead of ./registry.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List gifts and what is still missing for each.
    Gifts,
    /// Contribute to one gift.
    Contribute(ContributeArgs),
    /// Print the gift list every time it is refreshed.
    Watch,
}

#[derive(Args, Debug)]
struct ContributeArgs {
    #[arg(long)]
    gift_id: i64,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    cpf: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    message: Option<String>,
    /// Only used when the page lets contributors choose the amount.
    #[arg(long)]
    amount: Option<String>,
    /// pix or cartao; defaults to the first method the page offers.
    #[arg(long)]
    method: Option<PaymentMethod>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => load_settings_from(path)?,
        None => load_settings(),
    };
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    if let Some(variant) = cli.variant {
        settings.variant = variant;
    }
    info!(server_url = %settings.server_url, variant = %settings.variant, "registry settings loaded");

    let client = RegistryClient::with_timeout(&settings.server_url, settings.request_timeout())
        .context("failed to build registry client")?;

    match cli.command {
        Command::Gifts => list_gifts(&client).await,
        Command::Contribute(args) => contribute(client, &settings, args).await,
        Command::Watch => {
            let interval = settings
                .gift_refresh_interval()
                .context("gift list refresh is disabled; set gift_refresh_seconds")?;
            watch(client, interval).await
        }
    }
}

async fn list_gifts(client: &RegistryClient) -> Result<()> {
    let gifts = client.list_gifts().await.context("failed to list gifts")?;
    if gifts.is_empty() {
        println!("No gifts available.");
    }
    for gift in gifts {
        let status = if gift.complete { " (complete)" } else { "" };
        println!(
            "#{:<4} {:<40} R$ {:>10} of R$ {:>10}{status}",
            gift.id.0,
            gift.name,
            format_amount(gift.remaining()),
            format_amount(gift.total),
        );
    }
    Ok(())
}

async fn contribute(
    client: RegistryClient,
    settings: &client_core::Settings,
    args: ContributeArgs,
) -> Result<()> {
    let gift = client
        .fetch_gift(GiftId(args.gift_id))
        .await
        .with_context(|| format!("failed to load gift {}", args.gift_id))?;

    let mut flow = ContributionFlow::new(
        settings.flow_config(),
        client,
        TerminalPresenter,
        SystemClipboard::new(),
    );
    flow.open_payment_modal(&TriggerDataset::for_gift(&gift))?;

    if let Some(method) = args.method {
        flow.select_payment_method(method)?;
    }

    let form = flow.form_mut();
    form.name.set_value(args.name);
    form.email.set_value(args.email);
    form.cpf.set_value(args.cpf.unwrap_or_default());
    form.phone.set_value(args.phone.unwrap_or_default());
    form.message.set_value(args.message.unwrap_or_default());

    if let Some(amount) = &args.amount {
        if flow.config().amount_editable {
            flow.set_amount(amount);
        } else {
            warn!(amount = %amount, "this page has a fixed price; ignoring --amount");
        }
    }

    match flow.submit_selected().await {
        Ok(SubmissionOutcome::PixConfirmed {
            copied_to_clipboard,
            ..
        }) => {
            if copied_to_clipboard {
                println!("(PIX key copied to the clipboard)");
            }
            Ok(())
        }
        Ok(SubmissionOutcome::Redirect { .. }) => Ok(()),
        // The presenter has already printed the message for these.
        Err(err) if err.is_user_visible() => bail!("contribution not completed"),
        Err(err) => bail!("contribution not completed: {err}"),
    }
}

async fn watch(client: RegistryClient, interval: std::time::Duration) -> Result<()> {
    let (tx, mut rx) = broadcast::channel(8);
    let handle = spawn_gift_refresh(client, interval, tx)?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            update = rx.recv() => match update {
                Ok(GiftListUpdate::Refreshed(gifts)) => {
                    println!("--- {} gifts ---", gifts.len());
                    for gift in gifts {
                        println!(
                            "#{:<4} {:<40} R$ {:>10} left",
                            gift.id.0,
                            gift.name,
                            format_amount(gift.remaining())
                        );
                    }
                }
                Ok(GiftListUpdate::Failed(message)) => eprintln!("refresh failed: {message}"),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "gift list updates skipped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    handle.abort();
    Ok(())
}
