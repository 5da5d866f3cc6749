use std::collections::HashMap;

use anyhow::Result;
use serde::Deserialize;

use super::error::PipelineError;

/// `status` attribute of sovereign member states in the boundary dataset.
pub const MEMBER_STATE: &str = "Member State";

// ---------------------------------------------------------------------------
// GeoJSON wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Properties>,
    geometry: Option<Geometry>,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
    iso3: Option<String>,
    status: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: serde_json::Value,
}

type Ring = Vec<Vec<f64>>;

// ---------------------------------------------------------------------------
// Boundaries
// ---------------------------------------------------------------------------

/// Axis-aligned box in lon/lat degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Approximate extent of continental Europe used by the Europe map.
    pub const EUROPE: BoundingBox = BoundingBox {
        min_lon: -10.0,
        min_lat: 42.0,
        max_lon: 15.0,
        max_lat: 60.0,
    };

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_lon <= other.max_lon
            && other.min_lon <= self.max_lon
            && self.min_lat <= other.max_lat
            && other.min_lat <= self.max_lat
    }
}

/// One country outline. Each polygon is its exterior ring as (lon, lat).
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    pub iso3: String,
    pub name: String,
    pub status: String,
    pub polygons: Vec<Vec<[f64; 2]>>,
}

impl Boundary {
    pub fn bbox(&self) -> Option<BoundingBox> {
        let mut points = self.polygons.iter().flatten();
        let first = points.next()?;
        let init = BoundingBox {
            min_lon: first[0],
            min_lat: first[1],
            max_lon: first[0],
            max_lat: first[1],
        };
        Some(points.fold(init, |b, p| BoundingBox {
            min_lon: b.min_lon.min(p[0]),
            min_lat: b.min_lat.min(p[1]),
            max_lon: b.max_lon.max(p[0]),
            max_lat: b.max_lat.max(p[1]),
        }))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundarySet {
    pub boundaries: Vec<Boundary>,
}

/// A boundary with the value it is shaded by; `None` draws as "no data".
#[derive(Debug, Clone, PartialEq)]
pub struct ChoroplethRegion<'a> {
    pub boundary: &'a Boundary,
    pub value: Option<f64>,
}

fn ring(index: usize, coords: &[Vec<f64>]) -> Result<Vec<[f64; 2]>> {
    coords
        .iter()
        .map(|c| match c.as_slice() {
            [lon, lat, ..] => Ok([*lon, *lat]),
            _ => Err(PipelineError::InvalidGeometry {
                index,
                reason: format!("position with {} coordinates", c.len()),
            }
            .into()),
        })
        .collect()
}

impl BoundarySet {
    /// Parse a GeoJSON `FeatureCollection`. Features without geometry or
    /// with non-polygon geometry keep their attributes and no outline.
    pub fn from_geojson(text: &str) -> Result<Self> {
        let collection: FeatureCollection = serde_json::from_str(text)?;
        let mut boundaries = Vec::with_capacity(collection.features.len());

        for (index, feature) in collection.features.into_iter().enumerate() {
            let polygons = match feature.geometry {
                Some(g) if g.kind == "Polygon" => {
                    let rings: Vec<Ring> = serde_json::from_value(g.coordinates)?;
                    match rings.first() {
                        Some(outer) => vec![ring(index, outer)?],
                        None => Vec::new(),
                    }
                }
                Some(g) if g.kind == "MultiPolygon" => {
                    let polys: Vec<Vec<Ring>> = serde_json::from_value(g.coordinates)?;
                    polys
                        .iter()
                        .filter_map(|poly| poly.first())
                        .map(|outer| ring(index, outer))
                        .collect::<Result<_>>()?
                }
                _ => Vec::new(),
            };
            let p = feature.properties.unwrap_or_default();
            boundaries.push(Boundary {
                iso3: p.iso3.unwrap_or_default(),
                name: p.name.unwrap_or_default(),
                status: p.status.unwrap_or_default(),
                polygons,
            });
        }

        log::info!("loaded {} boundaries", boundaries.len());
        Ok(Self { boundaries })
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Only features whose `status` is "Member State".
    pub fn member_states(&self) -> BoundarySet {
        BoundarySet {
            boundaries: self
                .boundaries
                .iter()
                .filter(|b| b.status == MEMBER_STATE)
                .cloned()
                .collect(),
        }
    }

    /// Features whose extent intersects `bbox`.
    pub fn within_bounds(&self, bbox: &BoundingBox) -> BoundarySet {
        BoundarySet {
            boundaries: self
                .boundaries
                .iter()
                .filter(|b| b.bbox().is_some_and(|e| e.intersects(bbox)))
                .cloned()
                .collect(),
        }
    }

    /// Left join of boundaries with per-country values on the ISO3 code.
    pub fn choropleth<'a>(&'a self, values: &HashMap<String, f64>) -> Vec<ChoroplethRegion<'a>> {
        self.boundaries
            .iter()
            .map(|b| ChoroplethRegion {
                boundary: b,
                value: values.get(&b.iso3).copied().filter(|v| v.is_finite()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature",
             "properties": {"iso3": "FRA", "status": "Member State", "name": "France"},
             "geometry": {"type": "Polygon",
                          "coordinates": [[[0.0, 45.0], [5.0, 45.0], [5.0, 50.0], [0.0, 45.0]]]}},
            {"type": "Feature",
             "properties": {"iso3": "JPN", "status": "Member State", "name": "Japan"},
             "geometry": {"type": "MultiPolygon",
                          "coordinates": [[[[130.0, 31.0], [140.0, 35.0], [135.0, 40.0], [130.0, 31.0]]],
                                          [[[141.0, 42.0], [145.0, 43.0], [142.0, 45.0], [141.0, 42.0]]]]}},
            {"type": "Feature",
             "properties": {"iso3": "GRL", "status": "Territory", "name": "Greenland"},
             "geometry": {"type": "Point", "coordinates": [-40.0, 70.0]}}
        ]
    }"#;

    #[test]
    fn parses_polygons_and_multipolygons() {
        let set = BoundarySet::from_geojson(SAMPLE).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.boundaries[0].polygons.len(), 1);
        assert_eq!(set.boundaries[1].polygons.len(), 2);
        assert!(set.boundaries[2].polygons.is_empty());
    }

    #[test]
    fn member_states_and_bounds() {
        let set = BoundarySet::from_geojson(SAMPLE).unwrap().member_states();
        assert_eq!(set.len(), 2);
        let europe = set.within_bounds(&BoundingBox::EUROPE);
        assert_eq!(europe.len(), 1);
        assert_eq!(europe.boundaries[0].iso3, "FRA");
    }

    #[test]
    fn choropleth_is_left_join() {
        let set = BoundarySet::from_geojson(SAMPLE).unwrap();
        let values = HashMap::from([("JPN".to_string(), 3.5), ("USA".to_string(), 9.0)]);
        let regions = set.choropleth(&values);
        assert_eq!(regions.len(), 3);
        assert_eq!(regions[0].value, None);
        assert_eq!(regions[1].value, Some(3.5));
    }
}
