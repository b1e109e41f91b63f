//! # Deterministic Identifiers
//!
//! Training artifacts are content-addressed: the identifier of a stored document is
//! derived from its canonical JSON form, so inserting the same payload twice always
//! targets the same row.
//!
//! The identifier is a name-based UUID (v5) seeded with the nil namespace and the
//! lowercase hex SHA-256 digest of the content.

use serde::{ser::Error as _, Serialize};
use sha2::{Digest, Sha256};
use std::io;
use uuid::Uuid;

/// Creates a deterministic UUID from the hash of string or byte content.
///
/// Equal inputs always produce equal identifiers, and distinct inputs produce
/// distinct identifiers with the collision resistance of SHA-256.
pub fn deterministic_uuid(content: impl AsRef<[u8]>) -> String {
    let digest = Sha256::digest(content.as_ref());
    let hash_hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    Uuid::new_v5(&Uuid::nil(), hash_hex.as_bytes()).to_string()
}

/// Builds the full identifier of a stored document: `<uuid>-<suffix>`.
pub fn training_id(document_json: &str, suffix: &str) -> String {
    format!("{}-{suffix}", deterministic_uuid(document_json))
}

/// A JSON formatter emitting `", "` between members and `": "` after keys.
///
/// Identifiers depend on this exact layout.
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

/// Serializes a value into the canonical document form used for hashing and storage.
///
/// Struct fields keep their declaration order and non-ASCII text is written as-is.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    value.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(serde_json::Error::custom)
}
