// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Pass-through payloads.
//!
//! A [`RawPayload`] carries an already encoded document between the runtime and
//! native code. Nothing on the way inspects or re-encodes the bytes.

use std::{
	borrow::Cow,
	fmt::{self, Debug, Display, Formatter},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, ser};
use serde_json::value::RawValue;

const NULL_LITERAL: &[u8] = b"null";

/// Opaque, already encoded document.
///
/// The absent payload encodes to the literal `null` and `null` decodes back to
/// the absent payload; its byte view is empty.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct RawPayload(Option<Vec<u8>>);

impl RawPayload {
	pub const fn absent() -> Self {
		Self(None)
	}

	pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
		Self(Some(bytes.into()))
	}

	pub fn is_absent(&self) -> bool {
		self.0.is_none()
	}

	/// The carried bytes, empty for the absent payload.
	pub fn as_bytes(&self) -> &[u8] {
		self.0.as_deref().unwrap_or_default()
	}

	/// Encoded form handed across the boundary.
	pub fn encode(&self) -> &[u8] {
		match &self.0 {
			Some(bytes) => bytes,
			None => NULL_LITERAL,
		}
	}

	/// Inverse of [`RawPayload::encode`].
	pub fn decode(bytes: &[u8]) -> Self {
		if bytes == NULL_LITERAL {
			Self::absent()
		} else {
			Self::new(bytes)
		}
	}

	pub fn to_str_lossy(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(self.encode())
	}
}

impl Debug for RawPayload {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match &self.0 {
			Some(bytes) => f.debug_tuple("RawPayload").field(&String::from_utf8_lossy(bytes)).finish(),
			None => f.write_str("RawPayload(absent)"),
		}
	}
}

impl Display for RawPayload {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_str_lossy())
	}
}

impl From<&str> for RawPayload {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl From<String> for RawPayload {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<Vec<u8>> for RawPayload {
	fn from(value: Vec<u8>) -> Self {
		Self::new(value)
	}
}

impl From<&[u8]> for RawPayload {
	fn from(value: &[u8]) -> Self {
		Self::new(value)
	}
}

impl Serialize for RawPayload {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match &self.0 {
			None => serializer.serialize_unit(),
			Some(bytes) => {
				let text = std::str::from_utf8(bytes).map_err(ser::Error::custom)?;
				let raw = RawValue::from_string(text.to_owned()).map_err(ser::Error::custom)?;
				raw.serialize(serializer)
			}
		}
	}
}

impl<'de> Deserialize<'de> for RawPayload {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = Box::<RawValue>::deserialize(deserializer)?;
		Ok(Self::decode(raw.get().as_bytes()))
	}
}
