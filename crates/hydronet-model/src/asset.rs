//! Network element states
//!
//! An [`AssetState`] is always the complete state of one element. Moments
//! carry whole states, never partial patches, so re-applying a put is
//! idempotent.

use crate::id::AssetId;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Kind of network element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Demand node
    Junction,
    /// Fixed-head source
    Reservoir,
    /// Storage node
    Tank,
    /// Pipe link
    Pipe,
    /// Pump link
    Pump,
    /// Valve link
    Valve,
}

impl AssetKind {
    /// Whether this kind connects two nodes
    #[inline]
    #[must_use]
    pub const fn is_link(self) -> bool {
        matches!(self, Self::Pipe | Self::Pump | Self::Valve)
    }

    /// Stable lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Junction => "junction",
            Self::Reservoir => "reservoir",
            Self::Tank => "tank",
            Self::Pipe => "pipe",
            Self::Pump => "pump",
            Self::Valve => "valve",
        }
    }
}

impl Display for AssetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operational status of a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    /// Flow allowed
    Open,
    /// Flow blocked
    Closed,
    /// Valve regulating to its setting
    Active,
}

/// Map position (projected x/y)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Valve control type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValveKind {
    /// Pressure reducing
    Prv,
    /// Pressure sustaining
    Psv,
    /// Flow control
    Fcv,
    /// Throttle control
    Tcv,
}

/// Complete state of one network element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AssetState {
    Junction {
        position: Position,
        elevation: f64,
        base_demand: f64,
    },
    Reservoir {
        position: Position,
        head: f64,
    },
    Tank {
        position: Position,
        elevation: f64,
        initial_level: f64,
        min_level: f64,
        max_level: f64,
        diameter: f64,
    },
    Pipe {
        connections: (AssetId, AssetId),
        length: f64,
        diameter: f64,
        roughness: f64,
        status: LinkStatus,
    },
    Pump {
        connections: (AssetId, AssetId),
        power: f64,
        status: LinkStatus,
    },
    Valve {
        connections: (AssetId, AssetId),
        kind: ValveKind,
        diameter: f64,
        setting: f64,
        status: LinkStatus,
    },
}

impl AssetState {
    /// Element kind
    #[must_use]
    pub const fn kind(&self) -> AssetKind {
        match self {
            Self::Junction { .. } => AssetKind::Junction,
            Self::Reservoir { .. } => AssetKind::Reservoir,
            Self::Tank { .. } => AssetKind::Tank,
            Self::Pipe { .. } => AssetKind::Pipe,
            Self::Pump { .. } => AssetKind::Pump,
            Self::Valve { .. } => AssetKind::Valve,
        }
    }

    /// Whether this element is a link
    #[inline]
    #[must_use]
    pub const fn is_link(&self) -> bool {
        self.kind().is_link()
    }

    /// Endpoint node ids, for links
    #[must_use]
    pub fn connections(&self) -> Option<(&AssetId, &AssetId)> {
        match self {
            Self::Pipe { connections, .. }
            | Self::Pump { connections, .. }
            | Self::Valve { connections, .. } => Some((&connections.0, &connections.1)),
            _ => None,
        }
    }

    /// Link status, for links
    #[must_use]
    pub const fn status(&self) -> Option<LinkStatus> {
        match self {
            Self::Pipe { status, .. } | Self::Pump { status, .. } | Self::Valve { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Copy of this state with a different link status
    ///
    /// Nodes are returned unchanged.
    #[must_use]
    pub fn with_status(&self, new_status: LinkStatus) -> Self {
        let mut next = self.clone();
        if let Self::Pipe { status, .. } | Self::Pump { status, .. } | Self::Valve { status, .. } =
            &mut next
        {
            *status = new_status;
        }
        next
    }

    /// Node position, for nodes
    #[must_use]
    pub const fn position(&self) -> Option<Position> {
        match self {
            Self::Junction { position, .. }
            | Self::Reservoir { position, .. }
            | Self::Tank { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Whether this link touches the given node
    #[must_use]
    pub fn references(&self, node: &AssetId) -> bool {
        self.connections()
            .is_some_and(|(start, end)| start == node || end == node)
    }
}
