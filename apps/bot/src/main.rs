use std::sync::Arc;

use anyhow::Result;
use bot::{
    Data,
    command::{self, Command},
    config::Config,
    shutdown::{self, ShutdownSignal},
    webhook,
};
use poise::{Framework, FrameworkOptions};
use serenity::all::{ActivityData, ClientBuilder, FullEvent, GatewayIntents};
use stock::{
    Resolver,
    provider::{InvestingProvider, NaverProvider, http_client},
};
use tracing::{debug, error, info, warn};
use tracing_futures::Instrument;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let http = http_client()?;
    let primary = Arc::new(NaverProvider::new(http.clone()));
    let resolver = Arc::new(Resolver::default_chain(
        http.clone(),
        primary.clone(),
        config.kis_proxy_url.clone(),
    ));
    let investing = Arc::new(InvestingProvider::new(http, primary));

    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;
    let commands = vec![command::quote()];

    let framework = Framework::builder()
        .options(FrameworkOptions {
            event_handler: |serenity_ctx, event, _framework_ctx, data| {
                Box::pin(async move {
                    if let FullEvent::Message { new_message } = event
                        && !new_message.author.bot
                        && new_message.referenced_message.is_none()
                        && let Some(cmd) = Command::parse(&new_message.content)
                    {
                        info!(
                            "[{}] {}",
                            new_message.author.name, new_message.content
                        );

                        let span = tracing::info_span!("command", channel_id = %new_message.channel_id);
                        let text = command::respond(data, cmd).instrument(span).await;

                        if let Err(e) = new_message.channel_id.say(serenity_ctx, text).await {
                            warn!(error = ?e, "send reply failed");
                        }
                    }
                    Ok(())
                })
            },
            commands,
            ..Default::default()
        })
        .setup({
            let resolver = Arc::clone(&resolver);
            let investing = Arc::clone(&investing);
            let version = config.version.clone();

            move |ctx, ready, framework| {
                let resolver = Arc::clone(&resolver);
                let investing = Arc::clone(&investing);
                let version = version.clone();

                Box::pin(async move {
                    info!(
                        "{} [{}] connected successfully!",
                        ready.user.name, ready.user.id
                    );

                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                    ctx.set_activity(Some(ActivityData::custom(format!("Version - {version}"))));

                    Ok(Data {
                        resolver,
                        investing,
                    })
                })
            }
        })
        .build();

    let mut client = ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    tokio::spawn(async move {
        if let Err(why) = client.start().await {
            error!("Client error: {why:?}");
        }
    });

    let signal = ShutdownSignal::new();

    tokio::spawn({
        let signal = signal.clone();
        async move {
            shutdown::os_signal().await;
            debug!("os signal received");
            signal.trigger("signal");
        }
    });

    webhook::serve(&config.webhook, signal).await?;

    // The chat loop is not drained; in-flight commands are dropped.
    info!("Gracefully shutdown");
    std::process::exit(0);
}
