//! Versioned JSON envelope for values written to the cache.
//!
//! Every value is stored as `{"v":1,"data":<value>}`. The version is checked
//! before the payload is decoded, so a format change surfaces as
//! [`DecodeError::Version`] rather than a confusing type error.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{DecodeError, Result, SessionError};

pub(crate) const ENVELOPE_VERSION: u8 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a, T: ?Sized> {
    v: u8,
    data: &'a T,
}

#[derive(Deserialize)]
struct Header {
    v: u8,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

pub(crate) fn encode<T>(value: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let envelope = EnvelopeRef {
        v: ENVELOPE_VERSION,
        data: value,
    };

    serde_json::to_vec(&envelope).map_err(SessionError::Encoding)
}

pub(crate) fn decode<T>(bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let header: Header = serde_json::from_slice(bytes).map_err(json_error)?;
    if header.v != ENVELOPE_VERSION {
        return Err(SessionError::Decoding(DecodeError::Version(header.v)));
    }

    let envelope: Envelope<T> = serde_json::from_slice(bytes).map_err(json_error)?;
    Ok(envelope.data)
}

fn json_error(err: serde_json::Error) -> SessionError {
    SessionError::Decoding(DecodeError::Json(err))
}

#[cfg(test)]
mod envelope {
    use std::collections::{BTreeMap, HashMap};

    use serde::{Deserialize, Serialize};

    use super::{decode, encode};
    use crate::{DecodeError, SessionError};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    enum Role {
        Admin,
        Guest { expires: u64 },
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        roles: Vec<Role>,
        tags: BTreeMap<String, Option<i64>>,
    }

    #[test]
    fn wire_format() {
        let bytes = encode(&vec!["item1", "item2"]).unwrap();
        assert!(bytes == br#"{"v":1,"data":["item1","item2"]}"#);
    }

    #[test]
    fn nested_values() {
        let profile = Profile {
            name: "ferris".into(),
            roles: vec![Role::Admin, Role::Guest { expires: 10 }],
            tags: BTreeMap::from([("a".into(), Some(-1)), ("b".into(), None)]),
        };

        let bytes = encode(&profile).unwrap();
        let back: Profile = decode(&bytes).unwrap();
        assert!(back == profile);

        let as_json: serde_json::Value = decode(&bytes).unwrap();
        assert!(as_json["name"] == "ferris");
    }

    #[test]
    fn wrong_type() {
        let bytes = encode(&"not a number").unwrap();
        let err = decode::<u32>(&bytes).unwrap_err();
        assert!(matches!(err, SessionError::Decoding(DecodeError::Json(_))));
    }

    #[test]
    fn garbage() {
        let err = decode::<String>(b"\x00\x01gob").unwrap_err();
        assert!(matches!(err, SessionError::Decoding(DecodeError::Json(_))));
    }

    #[test]
    fn unknown_version() {
        let err = decode::<String>(br#"{"v":9,"data":"x"}"#).unwrap_err();
        assert!(matches!(err, SessionError::Decoding(DecodeError::Version(9))));

        // a missing version is malformed, not a different version
        let err = decode::<String>(br#"{"data":"x"}"#).unwrap_err();
        assert!(matches!(err, SessionError::Decoding(DecodeError::Json(_))));
    }

    #[test]
    fn unserializable() {
        // JSON object keys must be strings.
        let map = HashMap::from([(vec![1u8], 1)]);
        let err = encode(&map).unwrap_err();
        assert!(matches!(err, SessionError::Encoding(_)));
    }
}
