use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::{
    input::{
        InputFile, InputMedia, PinChatMessage, SendAnimation, SendAudio, SendMediaGroup,
        SendMessage, SendPhoto, SendVideo,
    },
    Payload, Recipient, Result, TgBotError,
};

pub(crate) const DEFAULT_PARSE_MODE: &str = "HTML";

/// Request shaping for one Bot API endpoint.
pub(crate) trait EndpointInput {
    const ENDPOINT: &'static str;

    /// Merges recipient defaults into the input and encodes it as form fields.
    fn into_payload(self, recipient: &Recipient) -> Result<Payload>;
}

/// Flattens a serializable struct into form fields.
///
/// Strings are sent as-is, numbers and booleans in their JSON spelling, and
/// nested arrays/objects as JSON strings. `null` fields are omitted.
pub(crate) fn to_payload<T: Serialize>(input: &T) -> Result<Payload> {
    let value = serde_json::to_value(input).map_err(|err| TgBotError::Encode(err.to_string()))?;
    let JsonValue::Object(map) = value else {
        return Err(TgBotError::Encode(
            "payload must serialize to a JSON object".to_owned(),
        ));
    };

    let mut payload = Payload::new();
    for (key, value) in map {
        match value {
            JsonValue::Null => {}
            JsonValue::String(text) => payload.insert(key, text),
            nested @ (JsonValue::Array(_) | JsonValue::Object(_)) => {
                payload.insert(key, nested.to_string())
            }
            scalar => payload.insert(key, scalar.to_string()),
        }
    }
    Ok(payload)
}

fn with_send_defaults(mut payload: Payload, recipient: &Recipient) -> Payload {
    payload.insert_default("parse_mode", DEFAULT_PARSE_MODE);
    payload.insert_default("chat_id", recipient.chat_id.as_str());
    payload
}

fn attach(payload: &mut Payload, key: &str, file: InputFile) {
    match file {
        InputFile::Remote(reference) => payload.insert(key, reference),
        InputFile::Upload(blob) => payload.insert(key, blob),
    }
}

impl EndpointInput for SendMessage {
    const ENDPOINT: &'static str = "sendMessage";

    fn into_payload(self, recipient: &Recipient) -> Result<Payload> {
        Ok(with_send_defaults(to_payload(&self)?, recipient))
    }
}

impl EndpointInput for SendPhoto {
    const ENDPOINT: &'static str = "sendPhoto";

    fn into_payload(self, recipient: &Recipient) -> Result<Payload> {
        let mut payload = with_send_defaults(to_payload(&self)?, recipient);
        attach(&mut payload, "photo", self.photo);
        Ok(payload)
    }
}

impl EndpointInput for SendAudio {
    const ENDPOINT: &'static str = "sendAudio";

    fn into_payload(self, recipient: &Recipient) -> Result<Payload> {
        let mut payload = with_send_defaults(to_payload(&self)?, recipient);
        attach(&mut payload, "audio", self.audio);
        if let Some(thumb) = self.thumb {
            attach(&mut payload, "thumb", thumb);
        }
        Ok(payload)
    }
}

impl EndpointInput for SendVideo {
    const ENDPOINT: &'static str = "sendVideo";

    fn into_payload(self, recipient: &Recipient) -> Result<Payload> {
        let mut payload = with_send_defaults(to_payload(&self)?, recipient);
        attach(&mut payload, "video", self.video);
        if let Some(thumb) = self.thumb {
            attach(&mut payload, "thumb", thumb);
        }
        Ok(payload)
    }
}

impl EndpointInput for SendAnimation {
    const ENDPOINT: &'static str = "sendAnimation";

    fn into_payload(self, recipient: &Recipient) -> Result<Payload> {
        let mut payload = with_send_defaults(to_payload(&self)?, recipient);
        attach(&mut payload, "animation", self.animation);
        if let Some(thumb) = self.thumb {
            attach(&mut payload, "thumb", thumb);
        }
        Ok(payload)
    }
}

#[derive(Serialize)]
struct WireMedia<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    media: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumb: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    supports_streaming: Option<bool>,
}

impl EndpointInput for SendMediaGroup {
    const ENDPOINT: &'static str = "sendMediaGroup";

    /// `media` becomes one JSON string field. Uploads are referenced as
    /// `attach://file<N>` and sent as parts named `file<N>`. Only the first item
    /// gets the default parse mode. Durations are rounded: the API rejects
    /// fractional values in this field.
    fn into_payload(self, recipient: &Recipient) -> Result<Payload> {
        if self.media.is_empty() {
            return Err(TgBotError::Encode(
                "media group must contain at least one item".to_owned(),
            ));
        }

        let mut uploads = Vec::new();
        let mut wire = Vec::with_capacity(self.media.len());
        for (index, item) in self.media.iter().enumerate() {
            let media = match &item.media {
                InputFile::Remote(reference) => reference.clone(),
                InputFile::Upload(blob) => {
                    let name = format!("file{index}");
                    uploads.push((name.clone(), blob.clone()));
                    format!("attach://{name}")
                }
            };
            wire.push(wire_media(item, media, index == 0));
        }
        let media =
            serde_json::to_string(&wire).map_err(|err| TgBotError::Encode(err.to_string()))?;

        let mut payload = to_payload(&self.options)?;
        payload.insert("media", media);
        payload.insert_default("chat_id", recipient.chat_id.as_str());
        for (name, blob) in uploads {
            payload.insert(name, blob);
        }
        Ok(payload)
    }
}

fn wire_media(item: &InputMedia, media: String, first: bool) -> WireMedia<'_> {
    let parse_mode = item
        .parse_mode
        .as_deref()
        .or(first.then_some(DEFAULT_PARSE_MODE));
    WireMedia {
        kind: item.kind.as_str(),
        media,
        caption: item.caption.as_deref(),
        parse_mode,
        duration: item.duration.map(|seconds| seconds.round() as i64),
        width: item.width,
        height: item.height,
        thumb: item.thumb.as_deref(),
        supports_streaming: item.supports_streaming,
    }
}

impl EndpointInput for PinChatMessage {
    const ENDPOINT: &'static str = "pinChatMessage";

    fn into_payload(self, recipient: &Recipient) -> Result<Payload> {
        let mut payload = to_payload(&self)?;
        payload.insert_default("chat_id", recipient.chat_id.as_str());
        Ok(payload)
    }
}
