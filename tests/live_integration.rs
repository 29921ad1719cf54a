use std::{
    fs,
    time::{SystemTime, UNIX_EPOCH},
};

use serde::Deserialize;
use tgbot_http::{
    Backend, Bot, BotOptions, PinChatMessage, Recipient, SendMessage, SendPhoto, TelegramBot,
    TgBotError,
};

#[derive(Debug, Deserialize)]
struct SecretsFile {
    #[serde(rename = "TG_BOT_TOKEN")]
    tg_bot_token: Option<String>,
    #[serde(rename = "TG_CHAT_ID")]
    tg_chat_id: Option<String>,
}

fn load_live_credentials() -> Result<(String, String), String> {
    if let (Ok(token), Ok(chat_id)) = (std::env::var("TG_BOT_TOKEN"), std::env::var("TG_CHAT_ID"))
    {
        return Ok((token, chat_id));
    }

    let content = fs::read_to_string("secrets.json")
        .map_err(|_| "TG_BOT_TOKEN/TG_CHAT_ID env or secrets.json is required".to_owned())?;
    let parsed: SecretsFile = serde_json::from_str(&content)
        .map_err(|err| format!("secrets.json could not be parsed: {err}"))?;

    let token = parsed
        .tg_bot_token
        .ok_or_else(|| "missing TG_BOT_TOKEN in secrets.json".to_owned())?;
    let chat_id = parsed
        .tg_chat_id
        .ok_or_else(|| "missing TG_CHAT_ID in secrets.json".to_owned())?;

    Ok((token, chat_id))
}

fn unique_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock must be after epoch")
        .as_millis()
}

#[tokio::test]
async fn live_send_pin_and_media_url_rejection() {
    let (token, chat_id) = match load_live_credentials() {
        Ok(values) => values,
        Err(_) => {
            eprintln!("skipping live test: credentials not found in env or secrets.json");
            return;
        }
    };

    for backend in [Backend::Form, Backend::Multipart] {
        let bot = TelegramBot::from_options(
            backend,
            BotOptions {
                max_retries: 2,
                retry_backoff_ms: 500,
                ..BotOptions::default()
            },
        )
        .expect("bot must build");
        let recipient = Recipient::new(Bot::new("live", token.clone()), chat_id.clone());

        let sent = bot
            .send_message(
                &recipient,
                SendMessage::new(format!("<b>live test</b> {backend:?} {}", unique_suffix())),
            )
            .await
            .expect("send must succeed")
            .expect("envelope must parse");
        assert!(sent.ok, "send failed: {:?}", sent.description);

        let message_id = sent.messages()[0].message_id;
        match bot
            .pin_chat_message(&recipient, PinChatMessage::new(message_id))
            .await
        {
            Ok(pinned) => assert!(pinned.is_some()),
            // Bots without pin rights get a plain 400.
            Err(TgBotError::RetryExhausted { message }) => {
                eprintln!("pin rejected: {message}")
            }
            Err(err) => panic!("unexpected pin error: {err}"),
        }

        let err = bot
            .send_photo(
                &recipient,
                SendPhoto::new("https://example.invalid/definitely-missing.jpg"),
            )
            .await
            .expect_err("unreachable media URL must be rejected");
        assert!(
            matches!(err, TgBotError::SendMediaByUrl { .. }),
            "unexpected error: {err}"
        );
    }
}
