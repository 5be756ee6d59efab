//! Loading geographic rings from ESRI shapefiles.

use std::path::{Path, PathBuf};

use azmap_config::LayersConfig;
use azmap_geometry::{GeoRing, RingSet};
use shapefile::{Point, Shape};
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::session::{LayerId, MapSession};

/// Parts with fewer vertices than this cannot be drawn and are skipped.
const MIN_PART_VERTICES: usize = 2;

/// Natural Earth coastline, relative to the data directory.
pub const DEFAULT_COASTLINE: &str = "ne_110m_coastline/ne_110m_coastline.shp";
/// Natural Earth land borders, relative to the data directory.
pub const DEFAULT_BORDERS: &str =
    "ne_110m_admin_0_boundary_lines_land/ne_110m_admin_0_boundary_lines_land.shp";
/// Natural Earth land polygons, relative to the data directory.
pub const DEFAULT_LAND: &str = "ne_110m_land/ne_110m_land.shp";

/// The file a data layer is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSource {
    pub layer: LayerId,
    pub path: PathBuf,
    /// `true` when the path came from config or the command line rather
    /// than the data directory defaults.
    pub configured: bool,
}

/// Pick the shapefile for each data layer: the configured path if any,
/// otherwise the Natural Earth default under `data_dir`.
pub fn layer_sources(layers: &LayersConfig, data_dir: &Path) -> [LayerSource; 3] {
    let pick = |layer: LayerId, configured: &Option<PathBuf>, default: &str| match configured {
        Some(path) => LayerSource {
            layer,
            path: path.clone(),
            configured: true,
        },
        None => LayerSource {
            layer,
            path: data_dir.join(default),
            configured: false,
        },
    };
    [
        pick(LayerId::Coastline, &layers.coastline, DEFAULT_COASTLINE),
        pick(LayerId::Borders, &layers.borders, DEFAULT_BORDERS),
        pick(LayerId::Land, &layers.land, DEFAULT_LAND),
    ]
}

/// Read each source into its session layer. Returns how many layers were
/// loaded.
///
/// A default file that does not exist is skipped with a note; one that
/// exists but cannot be read is skipped with a warning.
///
/// # Errors
///
/// Returns [`AppError::Load`] if a configured file cannot be read.
pub fn load_layers(
    session: &mut MapSession,
    sources: &[LayerSource],
    ring_limit: usize,
) -> Result<usize, AppError> {
    let mut loaded = 0;
    for source in sources {
        if !source.configured && !source.path.exists() {
            info!(
                layer = %source.layer,
                path = %source.path.display(),
                "default data file not found, skipping layer"
            );
            continue;
        }
        let rings = match load_rings(&source.path, ring_limit) {
            Ok(rings) => rings,
            Err(e) if source.configured => return Err(e.into()),
            Err(e) => {
                warn!(layer = %source.layer, error = %e, "layer not loaded");
                continue;
            }
        };
        match session.set_layer_data(source.layer, rings) {
            Ok(()) => loaded += 1,
            Err(e) => warn!(layer = %source.layer, error = %e, "layer left empty"),
        }
    }
    Ok(loaded)
}

/// Errors from reading a shapefile.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be opened or its header is invalid.
    #[error("cannot open shapefile {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: shapefile::Error,
    },

    /// A record inside the file could not be decoded.
    #[error("failed to read shape from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: shapefile::Error,
    },
}

/// Read every polyline part and polygon ring of the shapefile at `path`.
///
/// Longitude is taken from each point's `x` and latitude from `y`. At most
/// `limit` rings are kept; the truncation is logged.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be opened or a record is corrupt.
pub fn load_rings(path: &Path, limit: usize) -> Result<RingSet, LoadError> {
    let mut reader = shapefile::ShapeReader::from_path(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut shapes = Vec::new();
    for shape in reader.iter_shapes() {
        shapes.push(shape.map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?);
    }

    let rings = rings_from_shapes(shapes, limit);
    info!(
        path = %path.display(),
        rings = rings.len(),
        vertices = rings.vertex_count(),
        "loaded shapefile"
    );
    Ok(rings)
}

/// Flatten shapes into rings: one per polyline part or polygon ring.
pub fn rings_from_shapes<I>(shapes: I, limit: usize) -> RingSet
where
    I: IntoIterator<Item = Shape>,
{
    let mut parts = Vec::new();
    let mut unsupported = 0usize;
    let mut short = 0usize;

    for shape in shapes {
        match shape {
            Shape::Polyline(line) => {
                for part in line.parts() {
                    push_part(&mut parts, &mut short, part);
                }
            }
            Shape::Polygon(polygon) => {
                for ring in polygon.rings() {
                    push_part(&mut parts, &mut short, ring.points());
                }
            }
            Shape::NullShape => {}
            _ => unsupported += 1,
        }
    }

    if unsupported > 0 || short > 0 {
        debug!(unsupported, short, "skipped shapefile records");
    }

    let mut rings = RingSet::with_limit(limit);
    rings.extend_truncating(parts);
    rings
}

fn push_part(parts: &mut Vec<GeoRing>, short: &mut usize, points: &[Point]) {
    if points.len() < MIN_PART_VERTICES {
        *short += 1;
        return;
    }
    parts.push(GeoRing::from_lon_lat(points.iter().map(|p| (p.x, p.y))));
}

#[cfg(test)]
mod tests {
    use super::*;
    use azmap_projection::GeoPoint;
    use shapefile::{Polygon, PolygonRing, Polyline};

    use crate::platform::PlatformDirs;
    use crate::session::SessionOptions;

    fn session() -> MapSession {
        MapSession::new(
            GeoPoint::new(51.5, -0.12),
            GeoPoint::new(40.71, -74.0),
            SessionOptions::default(),
        )
        .unwrap()
    }

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_polyline_parts_become_rings() {
        let line = Polyline::with_parts(vec![
            pts(&[(-3.7, 40.4), (2.35, 48.85)]),
            pts(&[(10.0, 0.0), (11.0, 1.0), (12.0, 2.0)]),
        ]);
        let rings = rings_from_shapes([Shape::Polyline(line)], 4096);
        assert_eq!(rings.len(), 2);
        assert_eq!(rings.vertex_count(), 5);
        assert_eq!(rings.rings()[0].points()[0], GeoPoint::new(40.4, -3.7));
    }

    #[test]
    fn test_short_parts_skipped() {
        let mut parts = Vec::new();
        let mut short = 0;
        push_part(&mut parts, &mut short, &pts(&[(1.0, 1.0)]));
        push_part(&mut parts, &mut short, &[]);
        push_part(&mut parts, &mut short, &pts(&[(0.0, 0.0), (1.0, 0.0)]));
        assert_eq!(short, 2);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].len(), 2);
    }

    #[test]
    fn test_polygon_rings() {
        let polygon = Polygon::with_rings(vec![
            PolygonRing::Outer(pts(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)])),
            PolygonRing::Inner(pts(&[(2.0, 2.0), (4.0, 2.0), (4.0, 4.0), (2.0, 4.0), (2.0, 2.0)])),
        ]);
        let rings = rings_from_shapes([Shape::Polygon(polygon), Shape::NullShape], 4096);
        assert_eq!(rings.len(), 2);
    }

    #[test]
    fn test_ring_limit_truncates() {
        let parts = (0..5)
            .map(|i| pts(&[(f64::from(i), 0.0), (f64::from(i), 1.0)]))
            .collect();
        let rings = rings_from_shapes([Shape::Polyline(Polyline::with_parts(parts))], 3);
        assert_eq!(rings.len(), 3);
        assert_eq!(rings.limit(), Some(3));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_rings(&dir.path().join("missing.shp"), 4096);
        assert!(matches!(result, Err(LoadError::Open { .. })));
    }

    #[test]
    fn test_default_sources_under_data_dir() {
        let dirs = PlatformDirs::resolve_with_root(Path::new("base"));
        let sources = layer_sources(&LayersConfig::default(), &dirs.data_dir);
        assert_eq!(sources[0].layer, LayerId::Coastline);
        assert_eq!(sources[0].path, dirs.data_dir.join(DEFAULT_COASTLINE));
        assert_eq!(sources[1].path, dirs.data_dir.join(DEFAULT_BORDERS));
        assert_eq!(sources[2].path, dirs.data_dir.join(DEFAULT_LAND));
        assert!(sources.iter().all(|s| !s.configured));
    }

    #[test]
    fn test_configured_path_wins() {
        let layers = LayersConfig {
            coastline: Some(PathBuf::from("coast.shp")),
            ..LayersConfig::default()
        };
        let sources = layer_sources(&layers, Path::new("data"));
        assert_eq!(sources[0].path, PathBuf::from("coast.shp"));
        assert!(sources[0].configured);
        assert!(!sources[1].configured);
    }

    #[test]
    fn test_missing_defaults_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::resolve_with_root(tmp.path());
        dirs.create_dirs().unwrap();
        let sources = layer_sources(&LayersConfig::default(), &dirs.data_dir);

        let mut s = session();
        assert_eq!(load_layers(&mut s, &sources, 4096).unwrap(), 0);
        assert!(s.geometry(LayerId::Coastline).unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_default_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::resolve_with_root(tmp.path());
        let coastline = dirs.data_dir.join(DEFAULT_COASTLINE);
        std::fs::create_dir_all(coastline.parent().unwrap()).unwrap();
        std::fs::write(&coastline, b"not a shapefile").unwrap();
        let sources = layer_sources(&LayersConfig::default(), &dirs.data_dir);

        let mut s = session();
        assert_eq!(load_layers(&mut s, &sources, 4096).unwrap(), 0);
    }

    #[test]
    fn test_configured_file_must_load() {
        let tmp = tempfile::tempdir().unwrap();
        let layers = LayersConfig {
            borders: Some(tmp.path().join("borders.shp")),
            ..LayersConfig::default()
        };
        let sources = layer_sources(&layers, &tmp.path().join("data"));

        let mut s = session();
        let result = load_layers(&mut s, &sources, 4096);
        assert!(matches!(result, Err(AppError::Load(LoadError::Open { .. }))));
    }
}
