//! The map session: projection state plus every layer derived from it.
//!
//! Changing the center or mode rebuilds all layers before returning. A sun
//! update rebuilds only the night mesh. A layer whose rebuild fails is logged
//! and left empty; the others are unaffected.

use std::fmt;
use std::time::Duration;

use azmap_config::Config;
use azmap_geometry::{
    DEFAULT_SPLIT_THRESHOLD_KM, GeometryError, Graticule, GraticuleOptions, MapDataProjector,
    ProjectedGeometry, ProjectionStrategy, RebuildReport, RingSet, project_great_circle,
};
use azmap_projection::{GeoPoint, ProjectionError, ProjectionMode, ProjectionState};
use azmap_solar::{NightMesh, SubsolarPoint};
use chrono::{DateTime, Utc};
use glam::DVec2;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::hud::PathSummary;

/// Identifies one derived layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerId {
    Coastline,
    Borders,
    Land,
    Graticule,
    GreatCircle,
    Night,
}

impl LayerId {
    /// Layers fed from loaded ring data.
    pub const DATA: [LayerId; 3] = [Self::Coastline, Self::Borders, Self::Land];

    /// Stable lowercase name, used in logs and as the export key.
    pub fn name(self) -> &'static str {
        match self {
            Self::Coastline => "coastline",
            Self::Borders => "borders",
            Self::Land => "land",
            Self::Graticule => "graticule",
            Self::GreatCircle => "great_circle",
            Self::Night => "night",
        }
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Settings a session is created with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionOptions {
    /// Projection the session starts in.
    pub mode: ProjectionMode,
    /// Jump (km) at which coastline and border polylines are cut.
    pub split_threshold_km: f64,
    /// Graticule construction settings.
    pub graticule: GraticuleOptions,
    /// Maximum segments per data layer.
    pub segment_limit: Option<usize>,
    /// Build the night mesh on sun updates.
    pub night_enabled: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            mode: ProjectionMode::default(),
            split_threshold_km: DEFAULT_SPLIT_THRESHOLD_KM,
            graticule: GraticuleOptions::default(),
            segment_limit: None,
            night_enabled: true,
        }
    }
}

impl SessionOptions {
    /// Options taken from the `view`, `layers` and `night` sections.
    pub fn from_config(config: &Config) -> Self {
        Self {
            mode: config.view.mode,
            split_threshold_km: config.view.split_threshold_km,
            graticule: GraticuleOptions {
                extend_to_horizon: config.view.extend_graticule_to_horizon,
            },
            segment_limit: Some(config.layers.ring_limit),
            night_enabled: config.night.enabled,
        }
    }
}

/// Projected marker positions in km.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Markers {
    /// Always the origin.
    pub center: [f32; 2],
    /// Clamped onto the disc rim when the target has no image.
    pub target: [f32; 2],
    /// `None` when the pole is on the far side of the globe.
    pub north_pole: Option<[f32; 2]>,
}

fn to_f32(p: DVec2) -> [f32; 2] {
    [p.x as f32, p.y as f32]
}

/// A ring source and the projector that keeps its geometry current.
#[derive(Debug)]
struct DataLayer {
    rings: RingSet,
    projector: MapDataProjector,
}

impl DataLayer {
    fn new(strategy: ProjectionStrategy, segment_limit: Option<usize>) -> Self {
        let projector = match segment_limit {
            Some(limit) => MapDataProjector::with_segment_limit(strategy, limit),
            None => MapDataProjector::new(strategy),
        };
        Self {
            rings: RingSet::new(),
            projector,
        }
    }
}

/// Owns the projection state and every derived layer.
#[derive(Debug)]
pub struct MapSession {
    state: ProjectionState,
    target: GeoPoint,
    coastline: DataLayer,
    borders: DataLayer,
    land: DataLayer,
    graticule: Graticule,
    great_circle: ProjectedGeometry,
    night: NightMesh,
    night_enabled: bool,
    sun: Option<SubsolarPoint>,
    sun_updated_at: Option<DateTime<Utc>>,
    markers: Markers,
}

impl MapSession {
    /// Create a session and build every layer that needs no input data.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::InvalidCoordinate`] if the center or target
    /// is out of range.
    pub fn new(
        center: GeoPoint,
        target: GeoPoint,
        options: SessionOptions,
    ) -> Result<Self, ProjectionError> {
        let target = GeoPoint::wrapped(target.lat, target.lon)?;
        let state = ProjectionState::new(options.mode, center)?;
        let split = ProjectionStrategy::Split {
            threshold_km: options.split_threshold_km,
        };

        let mut session = Self {
            state,
            target,
            coastline: DataLayer::new(split, options.segment_limit),
            borders: DataLayer::new(split, options.segment_limit),
            land: DataLayer::new(ProjectionStrategy::Clip, options.segment_limit),
            graticule: Graticule::new(options.graticule),
            great_circle: ProjectedGeometry::new(),
            night: NightMesh::new(),
            night_enabled: options.night_enabled,
            sun: None,
            sun_updated_at: None,
            markers: Markers::default(),
        };
        session.rebuild_all();
        Ok(session)
    }

    #[inline]
    pub fn state(&self) -> &ProjectionState {
        &self.state
    }

    #[inline]
    pub fn center(&self) -> GeoPoint {
        self.state.center()
    }

    #[inline]
    pub fn target(&self) -> GeoPoint {
        self.target
    }

    #[inline]
    pub fn mode(&self) -> ProjectionMode {
        self.state.mode()
    }

    #[inline]
    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    #[inline]
    pub fn graticule(&self) -> &ProjectedGeometry {
        self.graticule.geometry()
    }

    #[inline]
    pub fn great_circle(&self) -> &ProjectedGeometry {
        &self.great_circle
    }

    #[inline]
    pub fn night(&self) -> &NightMesh {
        &self.night
    }

    /// Sun position from the last [`update_night`](Self::update_night).
    #[inline]
    pub fn sun(&self) -> Option<SubsolarPoint> {
        self.sun
    }

    /// Distance and bearings from the current center to the target.
    pub fn path_summary(&self) -> PathSummary {
        PathSummary::between(self.center(), self.target)
    }

    fn data_layer(&self, id: LayerId) -> Option<&DataLayer> {
        match id {
            LayerId::Coastline => Some(&self.coastline),
            LayerId::Borders => Some(&self.borders),
            LayerId::Land => Some(&self.land),
            _ => None,
        }
    }

    fn data_layer_mut(&mut self, id: LayerId) -> Option<&mut DataLayer> {
        match id {
            LayerId::Coastline => Some(&mut self.coastline),
            LayerId::Borders => Some(&mut self.borders),
            LayerId::Land => Some(&mut self.land),
            _ => None,
        }
    }

    /// Line or polygon geometry of a layer. `None` for the night mesh, which
    /// is a triangle list (see [`night`](Self::night)).
    pub fn geometry(&self, id: LayerId) -> Option<&ProjectedGeometry> {
        match id {
            LayerId::Graticule => Some(self.graticule()),
            LayerId::GreatCircle => Some(&self.great_circle),
            LayerId::Night => None,
            data => self.data_layer(data).map(|layer| layer.projector.geometry()),
        }
    }

    /// Replace the rings of a data layer and project them.
    ///
    /// # Errors
    ///
    /// Returns the layer's [`GeometryError`] if projection failed; the layer
    /// is left empty. Ids that are not data layers are ignored.
    pub fn set_layer_data(&mut self, id: LayerId, rings: RingSet) -> Result<(), GeometryError> {
        let state = self.state;
        let Some(layer) = self.data_layer_mut(id) else {
            warn!(layer = %id, "not a data layer, ignoring rings");
            return Ok(());
        };
        layer.rings = rings;
        let report = layer.projector.reproject(&state, &layer.rings)?;
        log_report(id, &report);
        Ok(())
    }

    /// Move the projection center and rebuild every layer.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::InvalidCoordinate`] for an out-of-range
    /// center; nothing changes in that case.
    pub fn set_center(&mut self, lat: f64, lon: f64) -> Result<Vec<(LayerId, GeometryError)>, ProjectionError> {
        self.state.set_center(lat, lon)?;
        info!(lat, lon, "center changed");
        Ok(self.rebuild_all())
    }

    /// Switch projection and rebuild every layer.
    pub fn set_mode(&mut self, mode: ProjectionMode) -> Vec<(LayerId, GeometryError)> {
        self.state.set_mode(mode);
        info!(%mode, "projection changed");
        self.rebuild_all()
    }

    /// Switch to the other projection and rebuild every layer.
    pub fn toggle_mode(&mut self) -> Vec<(LayerId, GeometryError)> {
        self.set_mode(self.state.mode().toggled())
    }

    /// Move the sun to its position at `instant` and rebuild the night mesh.
    pub fn update_night(&mut self, instant: DateTime<Utc>) -> Result<(), GeometryError> {
        let sun = SubsolarPoint::at(instant);
        self.sun = Some(sun);
        self.sun_updated_at = Some(instant);
        debug!(%instant, sun_lat = sun.lat, sun_lon = sun.lon, "sun moved");
        self.rebuild_night()
    }

    /// Move the sun to `now` if at least `interval` has passed since the last
    /// sun update. Returns whether the night mesh was rebuilt.
    pub fn refresh_night(
        &mut self,
        now: DateTime<Utc>,
        interval: Duration,
    ) -> Result<bool, GeometryError> {
        let due = match self.sun_updated_at {
            Some(last) => (now - last).to_std().is_ok_and(|elapsed| elapsed >= interval),
            None => true,
        };
        if !due {
            return Ok(false);
        }
        self.update_night(now)?;
        Ok(true)
    }

    fn rebuild_night(&mut self) -> Result<(), GeometryError> {
        match self.sun {
            Some(sun) if self.night_enabled => self.night.rebuild(&self.state, sun),
            _ => Ok(()),
        }
    }

    /// Rebuild every layer against the current state. Returns the layers
    /// that failed, each now empty.
    pub fn rebuild_all(&mut self) -> Vec<(LayerId, GeometryError)> {
        let state = self.state;
        let mut failures = Vec::new();

        for id in LayerId::DATA {
            let Some(layer) = self.data_layer_mut(id) else {
                continue;
            };
            match layer.projector.reproject(&state, &layer.rings) {
                Ok(report) => log_report(id, &report),
                Err(e) => failures.push((id, e)),
            }
        }

        if let Err(e) = self.graticule.rebuild(&state) {
            failures.push((LayerId::Graticule, e));
        }
        if let Err(e) =
            project_great_circle(&state, state.center(), self.target, &mut self.great_circle)
        {
            failures.push((LayerId::GreatCircle, e));
        }
        if let Err(e) = self.rebuild_night() {
            failures.push((LayerId::Night, e));
        }

        self.markers = Markers {
            center: [0.0, 0.0],
            target: to_f32(state.forward_clamped_point(self.target)),
            north_pole: state.forward_point(GeoPoint::NORTH_POLE).ok().map(to_f32),
        };

        for (id, e) in &failures {
            warn!(layer = %id, error = %e, "layer rebuild failed, drawing it empty");
        }
        failures
    }
}

fn log_report(id: LayerId, report: &RebuildReport) {
    if !report.degenerate_rings.is_empty() {
        debug!(
            layer = %id,
            degenerate = report.degenerate_rings.len(),
            "rings fully beyond the horizon"
        );
    }
    if let Some(e) = report.capacity_error() {
        warn!(layer = %id, error = %e, "segment limit reached");
    }
}
