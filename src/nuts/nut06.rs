//! NUT-06: Mint Information
//!
//! <https://github.com/cashubtc/nuts/blob/main/06.md>

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::nut01::PublicKey;
use super::{nut04, nut05};

/// Mint Version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MintVersion {
    /// Mint Software name
    pub name: String,
    /// Mint Version
    pub version: String,
}

impl Serialize for MintVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let combined = format!("{}/{}", self.name, self.version);
        serializer.serialize_str(&combined)
    }
}

impl<'de> Deserialize<'de> for MintVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let combined = String::deserialize(deserializer)?;
        let parts: Vec<&str> = combined.split('/').collect();
        if parts.len() != 2 {
            return Err(serde::de::Error::custom("Invalid mint version string"));
        }
        Ok(MintVersion {
            name: parts[0].to_string(),
            version: parts[1].to_string(),
        })
    }
}

/// Contact Info
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Contact Method i.e. nostr
    pub method: String,
    /// Contact info i.e. npub...
    pub info: String,
}

/// Mint Info [NUT-06]
///
/// Deployed mints disagree on several sub-schemas; any sub-document this
/// wallet cannot parse degrades to `None` instead of failing the whole
/// response.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintInfo {
    /// name of the mint and should be recognizable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// hex pubkey of the mint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pubkey: Option<PublicKey>,
    /// implementation name and the version running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<MintVersion>,
    /// short description of the mint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// long description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_long: Option<String>,
    /// Contact info
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Vec<ContactInfo>>,
    /// shows which NUTs the mint supports
    #[serde(default)]
    pub nuts: Nuts,
    /// Mint's icon URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    /// message of the day that the wallet must display to the user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motd: Option<String>,
    /// server unix timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<u64>,
}

impl<'de> Deserialize<'de> for MintInfo {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;

        fn field<T: serde::de::DeserializeOwned>(value: &Value, name: &str) -> Option<T> {
            value
                .get(name)
                .and_then(|v| serde_json::from_value(v.clone()).ok())
        }

        // Two contact encodings circulate: [["nostr","npub..."]] and
        // [{"method":..,"info":..}]
        let contact = value.get("contact").and_then(|v| {
            let contacts: Option<Vec<ContactInfo>> = serde_json::from_value(v.clone()).ok();
            contacts.or_else(|| {
                let pairs: Vec<Vec<String>> = serde_json::from_value(v.clone()).ok()?;
                Some(
                    pairs
                        .into_iter()
                        .filter(|pair| pair.len() == 2)
                        .map(|pair| ContactInfo {
                            method: pair[0].clone(),
                            info: pair[1].clone(),
                        })
                        .collect(),
                )
            })
        });

        Ok(MintInfo {
            name: field(&value, "name"),
            pubkey: field(&value, "pubkey"),
            version: field(&value, "version"),
            description: field(&value, "description"),
            description_long: field(&value, "description_long"),
            contact,
            nuts: field(&value, "nuts").unwrap_or_default(),
            icon_url: field(&value, "icon_url"),
            motd: field(&value, "motd"),
            time: field(&value, "time"),
        })
    }
}

/// Supported nuts and settings
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nuts {
    /// NUT04 Settings
    #[serde(default)]
    #[serde(rename = "4")]
    pub nut04: nut04::Settings,
    /// NUT05 Settings
    #[serde(default)]
    #[serde(rename = "5")]
    pub nut05: nut05::Settings,
    /// NUT07 Settings
    #[serde(default)]
    #[serde(rename = "7")]
    pub nut07: SupportedSettings,
    /// NUT08 Settings
    #[serde(default)]
    #[serde(rename = "8")]
    pub nut08: SupportedSettings,
    /// NUT09 Settings
    #[serde(default)]
    #[serde(rename = "9")]
    pub nut09: SupportedSettings,
    /// NUT10 Settings
    #[serde(default)]
    #[serde(rename = "10")]
    pub nut10: SupportedSettings,
    /// NUT11 Settings
    #[serde(default)]
    #[serde(rename = "11")]
    pub nut11: SupportedSettings,
    /// NUT12 Settings
    #[serde(default)]
    #[serde(rename = "12")]
    pub nut12: SupportedSettings,
    /// NUT14 Settings
    #[serde(default)]
    #[serde(rename = "14")]
    pub nut14: SupportedSettings,
    /// NUT20 Settings
    #[serde(default)]
    #[serde(rename = "20")]
    pub nut20: SupportedSettings,
}

/// Check state Settings
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupportedSettings {
    /// Setting supported
    #[serde(default)]
    pub supported: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_des_mint_info() {
        let mint_info = r#"{
            "name": "Cashu mint",
            "pubkey": "0296d0aa13b6a31cf0cd974249f28c7b7176d7274712c95a41c7d8066d3f29d679",
            "version": "Nutshell/0.15.3",
            "description": "The mint",
            "contact": [{"method": "nostr", "info": "npub..."}],
            "nuts": {
                "4": {"methods": [{"method": "bolt11", "unit": "sat"}], "disabled": false},
                "5": {"methods": [{"method": "bolt11", "unit": "sat"}], "disabled": false},
                "7": {"supported": true},
                "12": {"supported": true}
            },
            "motd": "Message to display to users."
        }"#;

        let info: MintInfo = serde_json::from_str(mint_info).unwrap();
        assert_eq!(info.name.as_deref(), Some("Cashu mint"));
        assert_eq!(info.version.as_ref().unwrap().name, "Nutshell");
        assert!(info.nuts.nut12.supported);
        assert!(!info.nuts.nut04.disabled);
    }

    #[test]
    fn test_des_mint_info_legacy_contact() {
        let mint_info = r#"{
            "name": "Cashu mint",
            "contact": [["nostr", "npub..."], ["email", "mint@example.com"]]
        }"#;

        let info: MintInfo = serde_json::from_str(mint_info).unwrap();
        let contact = info.contact.unwrap();
        assert_eq!(contact.len(), 2);
        assert_eq!(contact[0].method, "nostr");
        assert_eq!(contact[1].info, "mint@example.com");
    }

    #[test]
    fn test_des_mint_info_ill_typed_fields_degrade() {
        // version is malformed and pubkey is not a key; both degrade to None
        let mint_info = r#"{
            "name": "Cashu mint",
            "pubkey": 42,
            "version": "not-a-version",
            "nuts": {}
        }"#;

        let info: MintInfo = serde_json::from_str(mint_info).unwrap();
        assert_eq!(info.name.as_deref(), Some("Cashu mint"));
        assert!(info.pubkey.is_none());
        assert!(info.version.is_none());
    }
}
