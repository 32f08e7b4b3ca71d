// Copyright (c) 2022-2023 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

use serde::de::{DeserializeOwned, Error};
use serde_json::Value;

/// Deserialize the data payload of a generic bus message to a typed struct.
pub trait DeserializeMsgData: Into<Option<Value>> {
    fn deserialize<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        match self.into() {
            None => Err(serde_json::Error::custom("Missing field: 'data'")),
            Some(m) => T::deserialize(m),
        }
    }
}
