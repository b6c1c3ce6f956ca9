use serde::{Deserialize, Serialize};

use crate::config::outbound::DIRECT_TAG;

/// GeoIP list covering private and loopback ranges
pub const PRIVATE_IP_LIST: &str = "geoip:private";

/// Routing section of an Xray configuration
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Routing {
    /// How domains are resolved before matching IP rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_strategy: Option<DomainStrategy>,

    /// Rules, matched in order
    #[serde(default)]
    pub rules: Vec<RoutingRule>,
}

impl Routing {
    /// Routing with only the private-address rule
    pub fn new() -> Self {
        Self {
            domain_strategy: None,
            rules: vec![RoutingRule::private_ip_direct()],
        }
    }

    /// Set the domain strategy
    pub fn with_domain_strategy(mut self, strategy: DomainStrategy) -> Self {
        self.domain_strategy = Some(strategy);
        self
    }
}

/// Domain resolution strategy
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DomainStrategy {
    AsIs,
    IPIfNonMatch,
    IPOnDemand,
}

/// Routing rule
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoutingRule {
    #[serde(rename = "type")]
    pub rule_type: RuleType,

    pub outbound_tag: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip: Vec<String>,
}

impl RoutingRule {
    /// Rule matching destination IPs
    pub fn ip(ips: Vec<String>, outbound_tag: impl Into<String>) -> Self {
        Self {
            rule_type: RuleType::Field,
            outbound_tag: outbound_tag.into(),
            ip: ips,
        }
    }

    /// Send private destinations straight out
    pub fn private_ip_direct() -> Self {
        Self::ip(vec![PRIVATE_IP_LIST.to_string()], DIRECT_TAG)
    }
}

/// Rule type, Xray only knows `field`
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    #[default]
    Field,
}
