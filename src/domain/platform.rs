//! Supported customer data platforms and their vocabulary

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DomainError;

/// A customer data platform covered by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CdpPlatform {
    Segment,
    Mparticle,
    Lytics,
    Zeotap,
}

impl CdpPlatform {
    pub const ALL: [CdpPlatform; 4] = [
        CdpPlatform::Segment,
        CdpPlatform::Mparticle,
        CdpPlatform::Lytics,
        CdpPlatform::Zeotap,
    ];

    /// Platform-specific terminology injected into generation context.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            CdpPlatform::Segment => &[
                "workspace",
                "source",
                "destination",
                "tracking plan",
                "connections",
                "events",
                "identify",
                "track",
                "page",
                "group",
                "protocols",
                "schema",
                "functions",
                "personas",
                "journeys",
            ],
            CdpPlatform::Mparticle => &[
                "workspace",
                "input",
                "output",
                "data plan",
                "audience",
                "user attribute",
                "identity",
                "custom attributes",
                "forwarding rules",
                "data master",
                "live stream",
                "calculated attributes",
            ],
            CdpPlatform::Lytics => &[
                "collection",
                "identity",
                "audiences",
                "campaigns",
                "segments",
                "integrations",
                "behaviors",
                "entities",
                "workflows",
                "journey orchestration",
            ],
            CdpPlatform::Zeotap => &[
                "unified data",
                "identity resolution",
                "audience builder",
                "connectors",
                "activation",
                "enrichment",
                "attributes",
                "segments",
                "flows",
                "touchpoints",
            ],
        }
    }

    /// Entry point of the platform's official documentation.
    pub fn docs_url(&self) -> &'static str {
        match self {
            CdpPlatform::Segment => "https://segment.com/docs/",
            CdpPlatform::Mparticle => "https://docs.mparticle.com/",
            CdpPlatform::Lytics => "https://learn.lytics.com/",
            CdpPlatform::Zeotap => "https://docs.zeotap.com/",
        }
    }
}

impl fmt::Display for CdpPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CdpPlatform::Segment => write!(f, "SEGMENT"),
            CdpPlatform::Mparticle => write!(f, "MPARTICLE"),
            CdpPlatform::Lytics => write!(f, "LYTICS"),
            CdpPlatform::Zeotap => write!(f, "ZEOTAP"),
        }
    }
}

impl FromStr for CdpPlatform {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SEGMENT" => Ok(CdpPlatform::Segment),
            "MPARTICLE" => Ok(CdpPlatform::Mparticle),
            "LYTICS" => Ok(CdpPlatform::Lytics),
            "ZEOTAP" => Ok(CdpPlatform::Zeotap),
            other => Err(DomainError::validation(format!(
                "Unknown CDP platform '{}'",
                other
            ))),
        }
    }
}
