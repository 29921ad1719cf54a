/// Binary attachment carried in a request payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl Blob {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: None,
            content_type: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Single payload field value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayloadValue {
    Text(String),
    Blob(Blob),
}

impl PayloadValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn blob(value: Blob) -> Self {
        Self::Blob(value)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::Blob(_) => None,
        }
    }

    pub fn is_blob(&self) -> bool {
        matches!(self, Self::Blob(_))
    }
}

impl From<String> for PayloadValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for PayloadValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<i64> for PayloadValue {
    fn from(value: i64) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i32> for PayloadValue {
    fn from(value: i32) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<bool> for PayloadValue {
    fn from(value: bool) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Blob> for PayloadValue {
    fn from(value: Blob) -> Self {
        Self::Blob(value)
    }
}
