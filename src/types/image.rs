use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque handle to an encoded image (favicon or thumbnail).
///
/// The bytes are shared and never mutated. Updating a tab's favicon means
/// swapping in a whole new handle, so a reader holding an old snapshot keeps
/// seeing the old image.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageHandle {
    mime: String,
    bytes: Arc<[u8]>,
}

impl ImageHandle {
    pub fn new(mime: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when both handles point at the same allocation.
    pub fn shares_storage(&self, other: &ImageHandle) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Wire shape: `{ "mime": "...", "data": "<base64>" }`.
#[derive(Serialize, Deserialize)]
struct EncodedImage {
    mime: String,
    data: String,
}

impl Serialize for ImageHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EncodedImage {
            mime: self.mime.clone(),
            data: BASE64.encode(&self.bytes),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ImageHandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = EncodedImage::deserialize(deserializer)?;
        let bytes = BASE64
            .decode(encoded.data.as_bytes())
            .map_err(|e| D::Error::custom(format!("invalid base64 image data: {}", e)))?;
        Ok(ImageHandle::new(encoded.mime, bytes))
    }
}
