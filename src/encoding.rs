//! Base64 handling for binary fields (template files, logo and signature
//! assets) in stored records and editor payloads.

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};

/// Decode a binary field. Accepts a `data:<mime>;base64,<data>` URI or a
/// bare base64 string (the form stored template records use).
pub fn decode_binary(src: &str) -> Result<Vec<u8>, String> {
    let src = src.trim();
    let payload = match src.strip_prefix("data:") {
        Some(rest) => {
            let comma_pos = rest.find(',').ok_or_else(|| {
                "Invalid data URI: missing `,` separator between header and data".to_string()
            })?;
            let header = &rest[..comma_pos];
            if !header.contains(";base64") {
                return Err("Only base64-encoded data URIs are supported. \
                     The header must contain `;base64` (e.g. `data:image/png;base64,...`)."
                    .to_string());
            }
            &rest[comma_pos + 1..]
        }
        None => src,
    };
    // Stored binaries are often wrapped at 76 columns.
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    BASE64_STD
        .decode(compact)
        .map_err(|e| format!("Base64 decode error: {e}"))
}

pub fn encode_binary(bytes: &[u8]) -> String {
    BASE64_STD.encode(bytes)
}

/// `#[serde(with = "...")]` adapter for required binary fields.
pub mod base64_bytes {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode_binary(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::decode_binary(&s).map_err(D::Error::custom)
    }
}

/// `#[serde(with = "...")]` adapter for optional binary fields. `null`,
/// a missing field, `false` and an empty string all mean "no asset".
pub mod base64_opt {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    #[allow(dead_code)]
    enum Field {
        Text(String),
        Flag(bool),
    }

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(b) => serializer.serialize_str(&super::encode_binary(b)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        match Option::<Field>::deserialize(deserializer)? {
            Some(Field::Text(s)) if !s.trim().is_empty() => super::decode_binary(&s)
                .map(Some)
                .map_err(D::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_data_uri_and_bare_base64() {
        assert_eq!(decode_binary("data:image/png;base64,AAEC").unwrap(), vec![0, 1, 2]);
        assert_eq!(decode_binary("AAEC").unwrap(), vec![0, 1, 2]);
        assert_eq!(decode_binary("AA\nEC\n").unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn rejects_non_base64_data_uri() {
        let err = decode_binary("data:text/plain,hello").unwrap_err();
        assert!(err.contains(";base64"));
        assert!(decode_binary("data:image/png;base64").is_err());
    }
}
