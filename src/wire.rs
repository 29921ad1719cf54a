use serde::{Deserialize, Serialize};

/// Top-level envelope of every Bot API reply.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ApiResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ResponseParameters>,
}

impl ApiResponse {
    /// Parses a response body. Malformed JSON yields `None`, never an error.
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    /// Server-directed rate-limit delay in seconds.
    pub fn retry_after(&self) -> Option<u64> {
        self.parameters.as_ref()?.retry_after
    }

    pub fn migrate_to_chat_id(&self) -> Option<i64> {
        self.parameters.as_ref()?.migrate_to_chat_id
    }

    /// Messages carried by `result`, whether a single record or a list.
    pub fn messages(&self) -> Vec<&Message> {
        match &self.result {
            Some(ApiResult::One(message)) => vec![message.as_ref()],
            Some(ApiResult::Many(messages)) => messages.iter().collect(),
            Some(ApiResult::Other(_)) | None => Vec::new(),
        }
    }
}

/// `result` field: one message, a media group, or anything else (e.g. `true`
/// from `pinChatMessage`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiResult {
    One(Box<Message>),
    Many(Vec<Message>),
    Other(serde_json::Value),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrate_to_chat_id: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<Vec<FileRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<FileRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<FileRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<FileRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<FileRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_chat: Option<Chat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat: Option<Chat>,
}

impl Message {
    /// Identifier of the attached media.
    ///
    /// Checked in order: largest (last) photo size, video, audio, document,
    /// animation.
    pub fn file_id(&self) -> Option<&str> {
        self.photo
            .as_ref()
            .and_then(|sizes| sizes.last())
            .or(self.video.as_ref())
            .or(self.audio.as_ref())
            .or(self.document.as_ref())
            .or(self.animation.as_ref())
            .map(|file| file.file_id.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_unique_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}
