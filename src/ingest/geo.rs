//! Geo-coordinate collaborators.
//!
//! A position fix is optional context for a report. Capture is bounded by a
//! timeout and every failure collapses to "no coordinate".

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::GeoLocation;

/// Default bound on waiting for a position fix
pub const DEFAULT_GEO_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a position fix was not obtained
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Geolocation not supported")]
    Unsupported,

    #[error("Geolocation permission denied")]
    PermissionDenied,

    #[error("Position unavailable: {0}")]
    Unavailable(String),
}

/// Something that can report the device position
#[async_trait]
pub trait GeoSource: Send + Sync {
    async fn current_position(&self) -> Result<GeoLocation, GeoError>;
}

/// A coordinate known up front (entered by hand or from a GPS log)
#[derive(Debug, Clone)]
pub struct FixedGeoSource {
    latitude: f64,
    longitude: f64,
    accuracy: f64,
}

impl FixedGeoSource {
    pub fn new(latitude: f64, longitude: f64, accuracy: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
        }
    }
}

#[async_trait]
impl GeoSource for FixedGeoSource {
    async fn current_position(&self) -> Result<GeoLocation, GeoError> {
        Ok(GeoLocation::new(self.latitude, self.longitude, self.accuracy))
    }
}

/// Device without positioning support
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeoSource;

#[async_trait]
impl GeoSource for NoGeoSource {
    async fn current_position(&self) -> Result<GeoLocation, GeoError> {
        Err(GeoError::Unsupported)
    }
}

/// Ask `source` for a fix, giving up after `timeout`. Never fails.
pub async fn capture_geo_location(source: &dyn GeoSource, timeout: Duration) -> Option<GeoLocation> {
    match tokio::time::timeout(timeout, source.current_position()).await {
        Ok(Ok(geo)) => {
            debug!(coordinates = %geo.format_coordinates(), "Geo-location captured");
            Some(geo)
        }
        Ok(Err(e)) => {
            warn!("Geo-location unavailable: {}", e);
            None
        }
        Err(_) => {
            warn!("Geo-location timed out after {}s", timeout.as_secs_f64());
            None
        }
    }
}
