use tracing::info;

use crate::{Context, Error};

#[poise::command(slash_command)]
pub async fn quote(
    ctx: Context<'_>,
    #[description = "Stock code or ticker (e.g., 259960, kospi, QQQ)"] symbol: String,
) -> Result<(), Error> {
    info!("quote: invoked user_id={} symbol={}", ctx.author().id.get(), symbol);
    ctx.defer().await?;

    let text = ctx.data().resolver.resolve_text(&symbol).await;
    ctx.say(text).await?;

    Ok(())
}
