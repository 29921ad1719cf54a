use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::Blob;

/// Character limit for a photo, video or media-group caption.
pub const MAX_CAPTION_LEN: usize = 1024;
/// Character limit for a text message.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Media source: a remote URL / existing file id, or bytes to upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputFile {
    Remote(String),
    Upload(Blob),
}

impl From<&str> for InputFile {
    fn from(value: &str) -> Self {
        Self::Remote(value.to_owned())
    }
}

impl From<String> for InputFile {
    fn from(value: String) -> Self {
        Self::Remote(value)
    }
}

impl From<Blob> for InputFile {
    fn from(value: Blob) -> Self {
        Self::Upload(value)
    }
}

/// Fields shared by every send-style endpoint.
///
/// `chat_id` and `parse_mode` fall back to the recipient's chat and `HTML`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SendOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_thread_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_notification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protect_content: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_sending_without_reply: Option<bool>,
    /// Sent as a JSON string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<JsonValue>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SendMessage {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_web_page_preview: Option<bool>,
    #[serde(flatten)]
    pub options: SendOptions,
}

impl SendMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SendPhoto {
    #[serde(skip)]
    pub photo: InputFile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption_entities: Option<JsonValue>,
    #[serde(flatten)]
    pub options: SendOptions,
}

impl SendPhoto {
    pub fn new(photo: impl Into<InputFile>) -> Self {
        Self {
            photo: photo.into(),
            caption: None,
            caption_entities: None,
            options: SendOptions::default(),
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SendAudio {
    #[serde(skip)]
    pub audio: InputFile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption_entities: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip)]
    pub thumb: Option<InputFile>,
    #[serde(flatten)]
    pub options: SendOptions,
}

impl SendAudio {
    pub fn new(audio: impl Into<InputFile>) -> Self {
        Self {
            audio: audio.into(),
            caption: None,
            caption_entities: None,
            duration: None,
            performer: None,
            title: None,
            thumb: None,
            options: SendOptions::default(),
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SendVideo {
    #[serde(skip)]
    pub video: InputFile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption_entities: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip)]
    pub thumb: Option<InputFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_streaming: Option<bool>,
    #[serde(flatten)]
    pub options: SendOptions,
}

impl SendVideo {
    pub fn new(video: impl Into<InputFile>) -> Self {
        Self {
            video: video.into(),
            caption: None,
            caption_entities: None,
            duration: None,
            width: None,
            height: None,
            thumb: None,
            supports_streaming: None,
            options: SendOptions::default(),
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SendAnimation {
    #[serde(skip)]
    pub animation: InputFile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption_entities: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip)]
    pub thumb: Option<InputFile>,
    #[serde(flatten)]
    pub options: SendOptions,
}

impl SendAnimation {
    pub fn new(animation: impl Into<InputFile>) -> Self {
        Self {
            animation: animation.into(),
            caption: None,
            caption_entities: None,
            duration: None,
            width: None,
            height: None,
            thumb: None,
            options: SendOptions::default(),
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Document,
    Photo,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Document => "document",
            Self::Photo => "photo",
            Self::Video => "video",
        }
    }
}

/// One item of a media group.
///
/// `duration` may be fractional here; it is rounded when the group is encoded.
#[derive(Clone, Debug, PartialEq)]
pub struct InputMedia {
    pub kind: MediaKind,
    pub media: InputFile,
    pub caption: Option<String>,
    pub parse_mode: Option<String>,
    pub duration: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub thumb: Option<String>,
    pub supports_streaming: Option<bool>,
}

impl InputMedia {
    pub fn new(kind: MediaKind, media: impl Into<InputFile>) -> Self {
        Self {
            kind,
            media: media.into(),
            caption: None,
            parse_mode: None,
            duration: None,
            width: None,
            height: None,
            thumb: None,
            supports_streaming: None,
        }
    }

    pub fn photo(media: impl Into<InputFile>) -> Self {
        Self::new(MediaKind::Photo, media)
    }

    pub fn video(media: impl Into<InputFile>) -> Self {
        Self::new(MediaKind::Video, media)
    }

    pub fn audio(media: impl Into<InputFile>) -> Self {
        Self::new(MediaKind::Audio, media)
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SendMediaGroup {
    pub media: Vec<InputMedia>,
    pub options: SendOptions,
}

impl SendMediaGroup {
    pub fn new(media: impl Into<Vec<InputMedia>>) -> Self {
        Self {
            media: media.into(),
            options: SendOptions::default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PinChatMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    pub message_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_notification: Option<bool>,
}

impl PinChatMessage {
    pub fn new(message_id: i64) -> Self {
        Self {
            message_id,
            ..Self::default()
        }
    }
}
