//! Broker connection parameters for Kafka-compatible sources.

use crate::closed_enum::{optional_tag, patch_tag};
use crate::errors::{PipelineConfigError, PipelineConfigResult};
use crate::patch::{apply, apply_nullable, double_option, Patchable};
use crate::settings::is_blank;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

closed_enum! {
    /// Transport security of the broker connection.
    pub enum KafkaProtocol("kafka protocol") {
        Plaintext => "PLAINTEXT",
        Ssl => "SSL",
        SaslPlaintext => "SASL_PLAINTEXT",
        SaslSsl => "SASL_SSL",
    }
}

impl Default for KafkaProtocol {
    fn default() -> Self {
        Self::Plaintext
    }
}

closed_enum! {
    /// SASL authentication mechanism.
    pub enum KafkaMechanism("kafka mechanism") {
        Plain => "PLAIN",
        ScramSha256 => "SCRAM-SHA-256",
        ScramSha512 => "SCRAM-SHA-512",
        Gssapi => "GSSAPI",
    }
}

impl KafkaMechanism {
    /// Whether the mechanism authenticates with a username and password.
    pub fn uses_credentials(&self) -> bool {
        matches!(self, Self::Plain | Self::ScramSha256 | Self::ScramSha512)
    }
}

/// Broker connection parameters.
///
/// # Examples
///
/// ```rust
/// use pipeline_config::ConnectionParams;
///
/// let params = ConnectionParams::new(vec!["kafka:9092".to_string()]);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ConnectionParams {
    /// Bootstrap brokers, `host:port`
    pub brokers: Vec<String>,

    #[serde(default)]
    pub protocol: KafkaProtocol,

    /// SASL mechanism; a blank string is treated as absent
    #[serde(
        default,
        deserialize_with = "optional_tag",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<KafkaMechanism>")]
    pub mechanism: Option<KafkaMechanism>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// PEM encoded CA certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_ca: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kerberos_service_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kerberos_keytab: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kerberos_realm: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kerberos_config: Option<String>,

    /// Connect without authenticating even if a mechanism is set
    #[serde(default)]
    pub skip_auth: bool,
}

impl ConnectionParams {
    /// Unauthenticated plaintext connection to the given brokers.
    pub fn new(brokers: Vec<String>) -> Self {
        Self {
            brokers,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> PipelineConfigResult<()> {
        if self.brokers.is_empty() {
            return Err(PipelineConfigError::invalid(
                "brokers",
                "at least one broker is required",
            ));
        }

        if self.brokers.iter().any(|broker| broker.trim().is_empty()) {
            return Err(PipelineConfigError::invalid(
                "brokers",
                "broker addresses cannot be empty",
            ));
        }

        if self.skip_auth {
            return Ok(());
        }

        match self.mechanism {
            Some(mechanism) if mechanism.uses_credentials() => {
                if is_blank(&self.username) || is_blank(&self.password) {
                    return Err(PipelineConfigError::invalid(
                        "mechanism",
                        format!(
                            "username and password are required for mechanism '{}'",
                            mechanism
                        ),
                    ));
                }
            }
            Some(KafkaMechanism::Gssapi) => {
                if is_blank(&self.kerberos_service_name) {
                    return Err(PipelineConfigError::invalid(
                        "kerberos_service_name",
                        "kerberos_service_name is required for mechanism 'GSSAPI'",
                    ));
                }
            }
            _ => {}
        }

        Ok(())
    }
}

/// Sparse update for [`ConnectionParams`].
///
/// `brokers` replaces the broker list wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectionParamsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brokers: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<KafkaProtocol>,

    #[serde(
        default,
        deserialize_with = "patch_tag",
        skip_serializing_if = "Option::is_none"
    )]
    pub mechanism: Option<Option<KafkaMechanism>>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub username: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub password: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub root_ca: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub kerberos_service_name: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub kerberos_keytab: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub kerberos_realm: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub kerberos_config: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_auth: Option<bool>,
}

impl Patchable for ConnectionParams {
    type Patch = ConnectionParamsPatch;

    fn update(&self, patch: &Self::Patch) -> PipelineConfigResult<Self> {
        let mut updated = self.clone();
        apply(&mut updated.brokers, &patch.brokers);
        apply(&mut updated.protocol, &patch.protocol);
        apply_nullable(&mut updated.mechanism, &patch.mechanism);
        apply_nullable(&mut updated.username, &patch.username);
        apply_nullable(&mut updated.password, &patch.password);
        apply_nullable(&mut updated.root_ca, &patch.root_ca);
        apply_nullable(&mut updated.kerberos_service_name, &patch.kerberos_service_name);
        apply_nullable(&mut updated.kerberos_keytab, &patch.kerberos_keytab);
        apply_nullable(&mut updated.kerberos_realm, &patch.kerberos_realm);
        apply_nullable(&mut updated.kerberos_config, &patch.kerberos_config);
        apply(&mut updated.skip_auth, &patch.skip_auth);

        updated.validate()?;
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
