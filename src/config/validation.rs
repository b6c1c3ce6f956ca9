//! Configuration validation module.
//!
//! Catches dangling references and clashes in an assembled configuration
//! before it is handed to Xray. Findings are reported, never fixed.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, warn};

use crate::config::XrayConfig;

// ============================================================================
// Error Types
// ============================================================================

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Routing rule references a non-existent outbound.
    RouteOutboundNotFound {
        /// The rule index (0-based).
        rule_index: usize,
        /// The referenced outbound tag.
        outbound: String,
    },

    /// Duplicate outbound tag found.
    DuplicateOutboundTag {
        /// The duplicated tag.
        tag: String,
    },

    /// Two inbounds listen on the same address and port.
    DuplicateInboundPort {
        /// The bind address.
        listen: String,
        /// The clashing port.
        port: u16,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RouteOutboundNotFound {
                rule_index,
                outbound,
            } => {
                let rule_num = rule_index + 1;
                write!(
                    f,
                    "routing rule #{rule_num} references non-existent outbound '{outbound}'"
                )
            }
            Self::DuplicateOutboundTag { tag } => {
                write!(f, "duplicate outbound tag '{tag}'")
            }
            Self::DuplicateInboundPort { listen, port } => {
                write!(f, "more than one inbound listens on {listen}:{port}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Result
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors found.
    pub errors: Vec<ConfigError>,
}

impl ValidationResult {
    /// Create a new empty validation result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed (no errors).
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Check if validation failed (has errors).
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Get the number of errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Add an error to the result.
    pub fn add_error(&mut self, error: ConfigError) {
        self.errors.push(error);
    }

    /// Log all errors using tracing.
    pub fn log_errors(&self) {
        for error in &self.errors {
            warn!(error = %error, "configuration validation error");
        }
    }
}

// ============================================================================
// Validation Implementation
// ============================================================================

impl XrayConfig {
    /// Validate the configuration and return a list of errors.
    ///
    /// Checks performed:
    /// - Outbound tag uniqueness
    /// - Routing rules reference existing outbounds
    /// - No two inbounds share an address and port
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();

        debug!("starting configuration validation");

        let outbound_tags = self.collect_outbound_tags(&mut result);
        debug!(count = outbound_tags.len(), "collected outbound tags");

        self.check_route_outbound_refs(&outbound_tags, &mut result);
        self.check_inbound_ports(&mut result);

        if result.is_ok() {
            debug!("configuration validation passed");
        } else {
            debug!(
                error_count = result.error_count(),
                "configuration validation found problems"
            );
        }

        result
    }

    /// Collect all outbound tags and check for duplicates.
    fn collect_outbound_tags(&self, result: &mut ValidationResult) -> HashSet<String> {
        let mut tags = HashSet::new();

        for outbound in &self.outbounds {
            if let Some(tag) = outbound.tag()
                && !tags.insert(tag.to_string())
            {
                result.add_error(ConfigError::DuplicateOutboundTag {
                    tag: tag.to_string(),
                });
            }
        }

        tags
    }

    /// Check that routing rules point at outbounds that exist.
    fn check_route_outbound_refs(
        &self,
        outbound_tags: &HashSet<String>,
        result: &mut ValidationResult,
    ) {
        for (rule_index, rule) in self.routing.rules.iter().enumerate() {
            if !outbound_tags.contains(&rule.outbound_tag) {
                result.add_error(ConfigError::RouteOutboundNotFound {
                    rule_index,
                    outbound: rule.outbound_tag.clone(),
                });
            }
        }
    }

    /// Check that no two inbounds bind the same socket.
    fn check_inbound_ports(&self, result: &mut ValidationResult) {
        let mut seen = HashSet::new();

        for inbound in &self.inbounds {
            if !seen.insert((inbound.listen(), inbound.port())) {
                result.add_error(ConfigError::DuplicateInboundPort {
                    listen: inbound.listen().to_string(),
                    port: inbound.port(),
                });
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
