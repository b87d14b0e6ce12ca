#![cfg(not(unix))]

use serde::{de::Error, Deserialize, Deserializer, Serialize};

/// Stand-in configuration of the syslog and journal outputs on platforms
/// that have neither. Cannot be constructed.
#[derive(Clone, Debug, Serialize)]
pub enum UnixOnly {}

impl<'de> Deserialize<'de> for UnixOnly {
    fn deserialize<D: Deserializer<'de>>(_: D) -> Result<Self, D::Error> {
        Err(D::Error::custom(
            "syslog and journal outputs are not supported on this platform",
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::OutputConfig;

    #[test]
    fn unix_outputs_are_rejected() {
        assert!(serdeconv::from_toml_str::<OutputConfig>(r#"type = "syslog""#).is_err());
        assert!(serdeconv::from_toml_str::<OutputConfig>(r#"type = "journal""#).is_err());
    }
}
