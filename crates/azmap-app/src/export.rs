//! JSON dump of everything a session has built.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use azmap_geometry::ProjectedGeometry;
use azmap_projection::{GeoPoint, ProjectionMode};
use azmap_solar::NightMesh;
use serde::Serialize;

use crate::error::AppError;
use crate::hud::PathSummary;
use crate::session::{LayerId, MapSession, Markers};

/// Borrowed view of a session, serialized as one JSON document.
#[derive(Debug, Serialize)]
pub struct MapExport<'a> {
    pub mode: ProjectionMode,
    pub radius_km: f64,
    pub center: GeoPoint,
    pub target: GeoPoint,
    pub summary: PathSummary,
    pub markers: &'a Markers,
    pub layers: BTreeMap<&'static str, &'a ProjectedGeometry>,
    pub night: &'a NightMesh,
}

impl<'a> MapExport<'a> {
    pub fn new(session: &'a MapSession) -> Self {
        let layers = [
            LayerId::Coastline,
            LayerId::Borders,
            LayerId::Land,
            LayerId::Graticule,
            LayerId::GreatCircle,
        ]
        .into_iter()
        .filter_map(|id| Some((id.name(), session.geometry(id)?)))
        .collect();

        Self {
            mode: session.mode(),
            radius_km: session.state().radius(),
            center: session.center(),
            target: session.target(),
            summary: session.path_summary(),
            markers: session.markers(),
            layers,
            night: session.night(),
        }
    }
}

/// Write the session's geometry to the file at `path` as pretty-printed JSON.
///
/// The document is serialized in memory first, so [`AppError::Serialize`]
/// means the data could not be encoded and [`AppError::Export`] means the
/// file could not be written.
pub fn write_export(session: &MapSession, path: &Path) -> Result<(), AppError> {
    let json = serde_json::to_vec_pretty(&MapExport::new(session))?;
    write_file(path, &json)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    let export_error = |source| AppError::Export {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(export_error)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes).map_err(export_error)?;
    writer.flush().map_err(export_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionOptions;
    use chrono::{TimeZone, Utc};

    fn session() -> MapSession {
        let mut s = MapSession::new(
            GeoPoint::new(51.5, -0.12),
            GeoPoint::new(40.71, -74.0),
            SessionOptions::default(),
        )
        .unwrap();
        s.update_night(Utc.with_ymd_and_hms(2024, 12, 21, 18, 0, 0).unwrap())
            .unwrap();
        s
    }

    #[test]
    fn test_export_structure() {
        let session = session();
        let value = serde_json::to_value(MapExport::new(&session)).unwrap();

        assert_eq!(value["mode"], "AzimuthalEquidistant");
        assert_eq!(value["center"]["lat"], 51.5);
        assert_eq!(value["layers"]["great_circle"]["vertices"].as_array().unwrap().len(), 101);
        assert_eq!(value["layers"]["graticule"]["segments"].as_array().unwrap().len(), 16);
        assert!(value["layers"]["coastline"]["segments"].as_array().unwrap().is_empty());
        assert!(!value["night"]["vertices"].as_array().unwrap().is_empty());
        assert!(value["night"].get("alpha_grid").is_none());
        assert!(value["summary"]["distance_km"].as_f64().unwrap() > 5000.0);
    }

    #[test]
    fn test_write_export_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        write_export(&session(), &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"north_pole\""));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_full_disk_is_export_error() {
        // /dev/full opens fine and fails every write with ENOSPC.
        let path = Path::new("/dev/full");
        match write_export(&session(), path) {
            Err(AppError::Export { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("expected export error, got {other:?}"),
        }
    }

    #[test]
    fn test_write_export_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("map.json");
        let result = write_export(&session(), &path);
        assert!(matches!(result, Err(AppError::Export { .. })));
    }
}
