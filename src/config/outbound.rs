use serde::{Deserialize, Serialize};

use crate::config::stream::StreamSettings;

/// Tag of the outbound that private-address traffic is routed to
pub const DIRECT_TAG: &str = "direct";

/// Tag of the outbound that drops traffic
pub const BLOCK_TAG: &str = "block";

// ============================================================================
// Outbound Enum
// ============================================================================

/// Outbound configuration enum
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "protocol", rename_all = "lowercase")]
pub enum Outbound {
    /// VLESS proxy client
    Vless(VlessOutbound),
    /// Direct connection
    Freedom(FreedomOutbound),
    /// Drop everything
    Blackhole(BlackholeOutbound),
}

impl Outbound {
    /// Tag of the outbound, if any
    pub fn tag(&self) -> Option<&str> {
        match self {
            Outbound::Vless(o) => o.tag.as_deref(),
            Outbound::Freedom(o) => o.tag.as_deref(),
            Outbound::Blackhole(o) => o.tag.as_deref(),
        }
    }

    /// Protocol name as written in the `protocol` key
    pub fn protocol(&self) -> &'static str {
        match self {
            Outbound::Vless(_) => "vless",
            Outbound::Freedom(_) => "freedom",
            Outbound::Blackhole(_) => "blackhole",
        }
    }
}

// ============================================================================
// VLESS
// ============================================================================

/// VLESS outbound configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VlessOutbound {
    /// Tag of the outbound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    pub settings: VlessSettings,

    /// Transport and security, absent for plain TCP without TLS
    #[serde(
        rename = "streamSettings",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub stream_settings: Option<StreamSettings>,
}

/// VLESS `settings`
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VlessSettings {
    pub vnext: Vec<VnextServer>,
}

/// A VLESS server and the users allowed on it
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VnextServer {
    pub address: String,

    pub port: u16,

    pub users: Vec<VlessUser>,
}

/// VLESS user
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VlessUser {
    /// User UUID
    pub id: String,

    /// Must be `none` for current VLESS
    #[serde(default = "default_encryption")]
    pub encryption: String,

    /// Flow control (e.g. `xtls-rprx-vision`)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub flow: String,
}

fn default_encryption() -> String {
    "none".to_string()
}

impl VlessOutbound {
    /// Create a VLESS outbound with a single server and user
    pub fn new(address: impl Into<String>, port: u16, uuid: impl Into<String>) -> Self {
        Self {
            tag: None,
            settings: VlessSettings {
                vnext: vec![VnextServer {
                    address: address.into(),
                    port,
                    users: vec![VlessUser {
                        id: uuid.into(),
                        encryption: default_encryption(),
                        flow: String::new(),
                    }],
                }],
            },
            stream_settings: None,
        }
    }

    /// Set the outbound tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Set the flow of every user
    pub fn with_flow(mut self, flow: impl Into<String>) -> Self {
        let flow = flow.into();
        for user in self.users_mut() {
            user.flow = flow.clone();
        }
        self
    }

    /// Set the encryption of every user
    pub fn with_encryption(mut self, encryption: impl Into<String>) -> Self {
        let encryption = encryption.into();
        for user in self.users_mut() {
            user.encryption = encryption.clone();
        }
        self
    }

    /// Attach stream settings
    pub fn with_stream_settings(mut self, stream_settings: StreamSettings) -> Self {
        self.stream_settings = Some(stream_settings);
        self
    }

    /// First configured server
    pub fn server(&self) -> Option<&VnextServer> {
        self.settings.vnext.first()
    }

    fn users_mut(&mut self) -> impl Iterator<Item = &mut VlessUser> {
        self.settings
            .vnext
            .iter_mut()
            .flat_map(|server| server.users.iter_mut())
    }
}

// ============================================================================
// Freedom / Blackhole
// ============================================================================

/// Freedom (direct) outbound configuration
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FreedomOutbound {
    /// Tag of the outbound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl FreedomOutbound {
    /// Create a new freedom outbound with tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
        }
    }
}

/// Blackhole outbound configuration
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct BlackholeOutbound {
    /// Tag of the outbound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl BlackholeOutbound {
    /// Create a new blackhole outbound with tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
        }
    }
}
