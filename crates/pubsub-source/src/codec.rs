use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use regex::Regex;
use relay_types::Payload;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

/// Syntactic check only: standard alphabet with at most two trailing `=`.
static BASE64_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+/]*={0,2}$").expect("Invalid regex"));

/// Standard alphabet, padding optional, non-canonical trailing bits accepted.
///
/// Input is normalized by [`significant_symbols`] first.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Why a message body could not be turned into text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Body absent or not shaped like base64
    #[error("Invalid base64 string format detected")]
    InvalidEncoding,

    /// Body is valid base64 for zero bytes
    #[error("Decoded buffer is empty")]
    EmptyAfterDecode,

    /// Body looked like base64 but could not be decoded
    #[error("Error decoding base64 data: {source}")]
    Decode {
        #[from]
        source: base64::DecodeError,
    },
}

impl CodecError {
    /// Empty bodies are routine; everything else points at a broken producer.
    pub fn is_expected(&self) -> bool {
        matches!(self, CodecError::EmptyAfterDecode)
    }
}

/// Decode a base64 message body into text.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn decode_base64_data(data: Option<&str>) -> Result<String, CodecError> {
    let data = data
        .filter(|data| BASE64_PATTERN.is_match(data))
        .ok_or(CodecError::InvalidEncoding)?;

    let bytes = LENIENT.decode(significant_symbols(data))?;
    if bytes.is_empty() {
        return Err(CodecError::EmptyAfterDecode);
    }

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Strip padding and a dangling final symbol that cannot complete a byte.
///
/// `"="` and `"=="` carry no data, and a body of length `4n + 1` decodes its
/// first `4n` symbols.
fn significant_symbols(data: &str) -> &str {
    let data = data.trim_end_matches('=');
    if data.len() % 4 == 1 {
        &data[..data.len() - 1]
    } else {
        data
    }
}

/// Classify decoded text: JSON when it parses, the original text otherwise.
pub fn parse_data(text: String) -> Payload {
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => Payload::Structured(value),
        Err(_) => Payload::Text(text),
    }
}

/// [`decode_base64_data`] followed by [`parse_data`].
pub fn decode(data: Option<&str>) -> Result<Payload, CodecError> {
    decode_base64_data(data).map(parse_data)
}
