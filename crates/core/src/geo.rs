//! TopoJSON decoding and the composite Albers USA projection used by the map.

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt::Write as _;

use serde::Deserialize;

use crate::error::TopologyError;
use crate::scene::num;

pub type LonLat = (f64, f64);
pub type Ring = Vec<LonLat>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<TopoTransform>,
    pub arcs: Vec<Vec<Vec<f64>>>,
    pub objects: BTreeMap<String, TopoGeometry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TopoTransform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum TopoGeometry {
    GeometryCollection {
        geometries: Vec<TopoGeometry>,
    },
    Polygon {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        id: Option<serde_json::Value>,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
        #[serde(default)]
        id: Option<serde_json::Value>,
    },
    #[serde(other)]
    Unsupported,
}

/// One decoded area feature: polygons made of rings of lon/lat points.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: Option<String>,
    pub polygons: Vec<Vec<Ring>>,
}

impl Shape {
    pub fn points(&self) -> impl Iterator<Item = LonLat> + '_ {
        self.polygons.iter().flatten().flatten().copied()
    }
}

fn id_string(id: Option<&serde_json::Value>) -> Option<String> {
    match id? {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

impl Topology {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Absolute positions for every arc, undoing delta quantization.
    fn decoded_arcs(&self) -> Vec<Vec<LonLat>> {
        self.arcs
            .iter()
            .map(|arc| {
                let positions = arc.iter().filter(|position| position.len() >= 2);
                match self.transform {
                    Some(transform) => {
                        let (mut x, mut y) = (0.0, 0.0);
                        positions
                            .map(|position| {
                                x += position[0];
                                y += position[1];
                                (
                                    x.mul_add(transform.scale[0], transform.translate[0]),
                                    y.mul_add(transform.scale[1], transform.translate[1]),
                                )
                            })
                            .collect()
                    }
                    None => positions.map(|position| (position[0], position[1])).collect(),
                }
            })
            .collect()
    }

    /// Features of the named object, or of `states`, or of the first object.
    pub fn shapes(&self, object: Option<&str>) -> Result<Vec<Shape>, TopologyError> {
        let geometry = object
            .and_then(|name| self.objects.get(name))
            .or_else(|| self.objects.get("states"))
            .or_else(|| self.objects.values().next())
            .ok_or(TopologyError::NoObjects)?;

        let arcs = self.decoded_arcs();
        let mut shapes = Vec::new();
        collect_shapes(geometry, &arcs, &mut shapes)?;
        Ok(shapes)
    }
}

fn collect_shapes(
    geometry: &TopoGeometry,
    arcs: &[Vec<LonLat>],
    shapes: &mut Vec<Shape>,
) -> Result<(), TopologyError> {
    match geometry {
        TopoGeometry::GeometryCollection { geometries } => {
            for child in geometries {
                collect_shapes(child, arcs, shapes)?;
            }
        }
        TopoGeometry::Polygon { arcs: rings, id } => shapes.push(Shape {
            id: id_string(id.as_ref()),
            polygons: vec![decode_polygon(rings, arcs)?],
        }),
        TopoGeometry::MultiPolygon { arcs: polygons, id } => shapes.push(Shape {
            id: id_string(id.as_ref()),
            polygons: polygons
                .iter()
                .map(|rings| decode_polygon(rings, arcs))
                .collect::<Result<_, _>>()?,
        }),
        TopoGeometry::Unsupported => {}
    }
    Ok(())
}

fn decode_polygon(rings: &[Vec<i64>], arcs: &[Vec<LonLat>]) -> Result<Vec<Ring>, TopologyError> {
    rings.iter().map(|ring| decode_ring(ring, arcs)).collect()
}

/// Stitches arcs into a ring; a negative index `i` means arc `!i` reversed.
fn decode_ring(indices: &[i64], arcs: &[Vec<LonLat>]) -> Result<Ring, TopologyError> {
    let mut ring: Ring = Vec::new();
    for &index in indices {
        let (position, reversed) = if index < 0 { (!index, true) } else { (index, false) };
        let arc = usize::try_from(position)
            .ok()
            .and_then(|position| arcs.get(position))
            .ok_or(TopologyError::ArcOutOfRange {
                index,
                len: arcs.len(),
            })?;
        let mut points = arc.clone();
        if reversed {
            points.reverse();
        }
        let skip = usize::from(!ring.is_empty());
        ring.extend(points.into_iter().skip(skip));
    }
    Ok(ring)
}

/// Conic equal-area projection in unit scale, centred on `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ConicEqualArea {
    n: f64,
    c: f64,
    r0: f64,
    rotate: f64,
    center: (f64, f64),
}

impl ConicEqualArea {
    fn new(parallels: (f64, f64), rotate: f64, center: LonLat) -> Self {
        let sy0 = parallels.0.to_radians().sin();
        let n = (sy0 + parallels.1.to_radians().sin()) / 2.0;
        let c = (2.0 * n - sy0).mul_add(sy0, 1.0);
        let mut projection = Self {
            n,
            c,
            r0: c.sqrt() / n,
            rotate,
            center: (0.0, 0.0),
        };
        projection.center = projection.raw(center.0.to_radians(), center.1.to_radians());
        projection
    }

    fn raw(&self, lambda: f64, phi: f64) -> (f64, f64) {
        let r = (2.0 * self.n).mul_add(-phi.sin(), self.c).max(0.0).sqrt() / self.n;
        let angle = lambda * self.n;
        (r * angle.sin(), r.mul_add(-angle.cos(), self.r0))
    }

    /// Screen-oriented offset from the centre, y growing downward.
    fn unit(&self, (lon, lat): LonLat) -> (f64, f64) {
        let mut lambda = (lon + self.rotate).to_radians();
        if lambda > PI {
            lambda -= 2.0 * PI;
        } else if lambda < -PI {
            lambda += 2.0 * PI;
        }
        let (x, y) = self.raw(lambda, lat.to_radians());
        (x - self.center.0, -(y - self.center.1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Region {
    Lower48,
    Alaska,
    Hawaii,
}

fn region((lon, lat): LonLat) -> Region {
    if lat >= 50.0 && lon <= -129.0 {
        Region::Alaska
    } else if (18.0..=23.0).contains(&lat) && (-161.0..=-154.0).contains(&lon) {
        Region::Hawaii
    } else {
        Region::Lower48
    }
}

/// Albers USA: the lower 48 plus scaled Alaska and Hawaii insets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlbersUsa {
    lower48: ConicEqualArea,
    alaska: ConicEqualArea,
    hawaii: ConicEqualArea,
    scale: f64,
    translate: (f64, f64),
}

impl Default for AlbersUsa {
    fn default() -> Self {
        Self {
            lower48: ConicEqualArea::new((29.5, 45.5), 96.0, (-0.6, 38.7)),
            alaska: ConicEqualArea::new((55.0, 65.0), 154.0, (-2.0, 58.5)),
            hawaii: ConicEqualArea::new((8.0, 18.0), 157.0, (-3.0, 19.9)),
            scale: 1070.0,
            translate: (480.0, 250.0),
        }
    }
}

impl AlbersUsa {
    /// Default projection centred in a `width` × `height` surface.
    pub fn centered(width: f64, height: f64) -> Self {
        Self {
            scale: width * 1.1,
            translate: (width / 2.0, height / 2.0),
            ..Self::default()
        }
    }

    /// Scales and translates so that `points` fill the surface minus `padding`.
    pub fn fitted(
        width: f64,
        height: f64,
        padding: f64,
        points: impl IntoIterator<Item = LonLat>,
    ) -> Self {
        let projection = Self::default();
        let bounds = points
            .into_iter()
            .map(|point| projection.unit(point))
            .fold(None, |acc: Option<(f64, f64, f64, f64)>, (x, y)| {
                Some(match acc {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                })
            });

        let Some((x0, y0, x1, y1)) = bounds else {
            return Self::centered(width, height);
        };
        let (span_x, span_y) = (x1 - x0, y1 - y0);
        if span_x <= 0.0 || span_y <= 0.0 {
            return Self::centered(width, height);
        }

        let scale = ((width - 2.0 * padding) / span_x).min((height - 2.0 * padding) / span_y);
        Self {
            scale,
            translate: (
                scale.mul_add(-(x0 + x1), width) / 2.0,
                scale.mul_add(-(y0 + y1), height) / 2.0,
            ),
            ..projection
        }
    }

    pub const fn scale(&self) -> f64 {
        self.scale
    }

    fn unit(&self, point: LonLat) -> (f64, f64) {
        match region(point) {
            Region::Lower48 => self.lower48.unit(point),
            Region::Alaska => {
                let (x, y) = self.alaska.unit(point);
                (0.35f64.mul_add(x, -0.307), 0.35f64.mul_add(y, 0.201))
            }
            Region::Hawaii => {
                let (x, y) = self.hawaii.unit(point);
                (x - 0.205, y + 0.212)
            }
        }
    }

    pub fn project(&self, point: LonLat) -> (f64, f64) {
        let (x, y) = self.unit(point);
        (
            self.scale.mul_add(x, self.translate.0),
            self.scale.mul_add(y, self.translate.1),
        )
    }

    /// SVG path data for a shape, one closed subpath per ring.
    pub fn path(&self, shape: &Shape) -> String {
        let mut path = String::new();
        for ring in shape.polygons.iter().flatten() {
            for (index, point) in ring.iter().enumerate() {
                let (x, y) = self.project(*point);
                let command = if index == 0 { 'M' } else { 'L' };
                let _ = write!(path, "{command}{},{}", num(x), num(y));
            }
            if !ring.is_empty() {
                path.push('Z');
            }
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPOLOGY: &str = r#"{
        "type": "Topology",
        "transform": {"scale": [1.0, 1.0], "translate": [-100.0, 30.0]},
        "arcs": [
            [[0, 0], [10, 0], [0, 10]],
            [[10, 10], [-10, 0], [0, -10]]
        ],
        "objects": {
            "states": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "id": "08", "arcs": [[0, 1]]},
                    {"type": "MultiPolygon", "id": 6, "arcs": [[[-2, -1]]]},
                    {"type": "LineString", "arcs": [0]}
                ]
            }
        }
    }"#;

    #[test]
    fn decodes_quantized_arcs_into_rings() {
        let topology = Topology::from_json(TOPOLOGY).unwrap();
        let shapes = topology.shapes(None).unwrap();

        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].id.as_deref(), Some("08"));
        assert_eq!(
            shapes[0].polygons[0][0],
            vec![(-100.0, 30.0), (-90.0, 30.0), (-90.0, 40.0), (-100.0, 40.0), (-100.0, 30.0)]
        );
        assert_eq!(shapes[1].id.as_deref(), Some("6"));
        assert_eq!(shapes[1].polygons[0][0].first(), Some(&(-100.0, 30.0)));
    }

    #[test]
    fn out_of_range_arc_is_an_error() {
        let topology = Topology {
            transform: None,
            arcs: Vec::new(),
            objects: BTreeMap::from([(
                "states".to_string(),
                TopoGeometry::Polygon {
                    arcs: vec![vec![3]],
                    id: None,
                },
            )]),
        };
        assert_eq!(
            topology.shapes(None),
            Err(TopologyError::ArcOutOfRange { index: 3, len: 0 })
        );
    }

    #[test]
    fn empty_topology_has_no_objects() {
        let topology = Topology {
            transform: None,
            arcs: Vec::new(),
            objects: BTreeMap::new(),
        };
        assert_eq!(topology.shapes(None), Err(TopologyError::NoObjects));
    }

    #[test]
    fn projection_center_maps_to_translate() {
        let projection = AlbersUsa::default();
        let (x, y) = projection.project((-96.6, 38.7));
        assert!((x - 480.0).abs() < 1e-6);
        assert!((y - 250.0).abs() < 1e-6);
    }

    #[test]
    fn projection_keeps_compass_orientation() {
        let projection = AlbersUsa::default();
        let new_york = projection.project((-74.0, 40.7));
        let los_angeles = projection.project((-118.2, 34.0));
        let seattle = projection.project((-122.3, 47.6));

        assert!(new_york.0 > los_angeles.0);
        assert!(seattle.1 < los_angeles.1);
    }

    #[test]
    fn fitted_projection_stays_inside_surface() {
        let points = [(-124.7, 48.4), (-67.0, 44.8), (-80.2, 25.8), (-117.1, 32.7)];
        let projection = AlbersUsa::fitted(600.0, 400.0, 10.0, points);
        for point in points {
            let (x, y) = projection.project(point);
            assert!((9.9..=590.1).contains(&x), "x {x}");
            assert!((9.9..=390.1).contains(&y), "y {y}");
        }
    }

    #[test]
    fn fitting_nothing_falls_back_to_centered() {
        let projection = AlbersUsa::fitted(600.0, 400.0, 10.0, std::iter::empty());
        assert_eq!(projection, AlbersUsa::centered(600.0, 400.0));
    }
}
