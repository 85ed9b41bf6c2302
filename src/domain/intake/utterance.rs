//! What a user can send in one turn.

/// An uploaded image waiting to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.content_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A single user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Utterance {
    Text(String),
    Image(ImageUpload),
}

impl Utterance {
    /// The text of a text turn; `None` for uploads.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Utterance::Text(text) => Some(text),
            Utterance::Image(_) => None,
        }
    }

    /// Short description for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Utterance::Text(_) => "text",
            Utterance::Image(_) => "image",
        }
    }
}

impl From<&str> for Utterance {
    fn from(text: &str) -> Self {
        Utterance::Text(text.to_string())
    }
}

impl From<String> for Utterance {
    fn from(text: String) -> Self {
        Utterance::Text(text)
    }
}

impl From<ImageUpload> for Utterance {
    fn from(upload: ImageUpload) -> Self {
        Utterance::Image(upload)
    }
}
