use tgbot_http::{Backend, Bot, BotOptions, Recipient, SendMessage, SendPhoto, TelegramBot};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let token = std::env::var("TG_BOT_TOKEN")?;
    let chat_id = std::env::var("TG_CHAT_ID")?;

    let bot = TelegramBot::from_options(
        Backend::Form,
        BotOptions {
            max_retries: 3,
            retry_backoff_ms: 2_000,
            debug: true,
            ..BotOptions::default()
        },
    )?;
    let recipient = Recipient::new(Bot::new("demo", token), chat_id).pin_all_message(true);

    let sent = bot
        .send_message(&recipient, SendMessage::new("<b>hello</b> from tgbot-http"))
        .await?;
    if let Some(sent) = &sent {
        bot.pin_sent(&recipient, sent).await?;
    }

    let photo = bot
        .send_photo(
            &recipient,
            SendPhoto::new("https://telegram.org/img/t_logo.png").caption("logo"),
        )
        .await?;
    let file_id = photo
        .as_ref()
        .and_then(|envelope| envelope.messages().first().and_then(|m| m.file_id()))
        .map(str::to_owned);
    println!("uploaded photo file_id: {file_id:?}");

    Ok(())
}
