//! Strongly typed identifier wrappers.
//!
//! Routes, geofences, and geofence collections are named by strings supplied
//! from outside the engine.  They are stored as `Arc<str>` so cloning an ID
//! into a timer task or an event is a reference-count bump, not a copy.
//!
//! Marker handles are minted by the map sink and are plain integers.

use std::fmt;
use std::sync::Arc;

/// Generate a string-backed ID wrapper.
macro_rules! named_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(Arc<str>);

        impl $name {
            pub fn new(id: impl AsRef<str>) -> Self {
                Self(Arc::from(id.as_ref()))
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(Arc::from(s))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

named_id! {
    /// Identifier of a route in the catalog.  Also keys the per-route agent.
    pub struct RouteId;
}

named_id! {
    /// Identifier of a single geofence within its collection.
    pub struct GeofenceId;
}

named_id! {
    /// Identifier of a geofence collection; routes reference one each.
    pub struct CollectionId;
}

/// Opaque reference to a marker rendered by the map sink.
///
/// The engine never interprets the value; it only hands it back on
/// move/remove calls.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkerHandle(pub u64);

impl MarkerHandle {
    /// Sentinel meaning "no marker", equivalent to `u64::MAX`.
    pub const INVALID: MarkerHandle = MarkerHandle(u64::MAX);
}

impl Default for MarkerHandle {
    /// Returns the `INVALID` sentinel so uninitialized handles are visibly invalid.
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for MarkerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MarkerHandle({})", self.0)
    }
}
