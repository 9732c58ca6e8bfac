use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use geo::{BoundingRect, Geometry, Rect};
use geojson::{feature::Id, Bbox, Feature, FeatureCollection, GeoJson, JsonObject};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::naming::OutputTarget;
use crate::ordinates::ExtraOrdinates;
use crate::simplifier::{simplify_coverage, SimplifyReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    GeoJSON,
}

impl InputFormat {
    /// Infers the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "geojson" | "json" => Some(InputFormat::GeoJSON),
            _ => None,
        }
    }
}

/// One feature: opaque attributes plus an optional geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: Option<Id>,
    pub properties: Option<JsonObject>,
    pub geometry: Option<Geometry<f64>>,
    pub foreign_members: Option<JsonObject>,
    /// Whether the source carried a bbox; it is recomputed on write.
    pub has_bbox: bool,
    pub(crate) extra: ExtraOrdinates,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryTable {
    pub records: Vec<Record>,
    pub foreign_members: Option<JsonObject>,
    pub has_bbox: bool,
}

impl GeometryTable {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound { path: path.to_path_buf() });
        }
        let format = InputFormat::from_path(path)
            .ok_or_else(|| Error::UnsupportedFormat { path: path.to_path_buf() })?;

        let table = match format {
            InputFormat::GeoJSON => Self::read_geojson(path)?,
        };
        info!(path = %path.display(), features = table.len(), "loaded");
        Ok(table)
    }

    fn read_geojson(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| Error::Read { path: path.to_path_buf(), source })?;
        let reader = BufReader::new(file);
        let parse_error = |source: geojson::Error| Error::Parse { path: path.to_path_buf(), source };

        match GeoJson::from_reader(reader).map_err(|e| parse_error(e.into()))? {
            GeoJson::FeatureCollection(fc) => {
                let records = fc
                    .features
                    .into_iter()
                    .map(Record::try_from)
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(parse_error)?;
                Ok(GeometryTable {
                    records,
                    foreign_members: fc.foreign_members,
                    has_bbox: fc.bbox.is_some(),
                })
            }
            GeoJson::Feature(feature) => Ok(GeometryTable {
                records: vec![Record::try_from(feature).map_err(parse_error)?],
                ..Default::default()
            }),
            GeoJson::Geometry(geometry) => {
                let extra = ExtraOrdinates::collect(&geometry.value);
                let geometry = Geometry::<f64>::try_from(geometry).map_err(parse_error)?;
                Ok(GeometryTable {
                    records: vec![Record {
                        id: None,
                        properties: None,
                        geometry: Some(geometry),
                        foreign_members: None,
                        has_bbox: false,
                        extra,
                    }],
                    ..Default::default()
                })
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Simplifies every geometry in place as one coverage.
    pub fn simplify(&mut self, tolerance: f64) -> Result<SimplifyReport> {
        let geometries = self
            .records
            .iter_mut()
            .enumerate()
            .filter_map(|(i, record)| record.geometry.as_mut().map(|g| (i, g)));
        simplify_coverage(geometries, tolerance)
    }

    pub fn to_feature_collection(&self) -> FeatureCollection {
        let features: Vec<Feature> = self.records.iter().map(Record::to_feature).collect();
        let bbox = if self.has_bbox {
            let bounds = self
                .records
                .iter()
                .filter_map(|r| r.geometry.as_ref()?.bounding_rect())
                .reduce(union);
            bounds.map(to_bbox)
        } else {
            None
        };
        FeatureCollection {
            bbox,
            features,
            foreign_members: self.foreign_members.clone(),
        }
    }

    /// Writes the table as a GeoJSON FeatureCollection.
    pub fn write(&self, target: &OutputTarget) -> Result<()> {
        let write_error = |source: std::io::Error| Error::Write { path: target.path.clone(), source };

        let opened = if target.replace {
            File::create(&target.path)
        } else {
            OpenOptions::new().write(true).create_new(true).open(&target.path)
        };
        let file = opened.map_err(write_error)?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &self.to_feature_collection())
            .map_err(|e| write_error(e.into()))?;
        writer.flush().map_err(write_error)?;

        debug!(path = %target.path.display(), replace = target.replace, "written");
        Ok(())
    }
}

impl TryFrom<Feature> for Record {
    type Error = geojson::Error;

    fn try_from(feature: Feature) -> std::result::Result<Self, Self::Error> {
        let extra = feature
            .geometry
            .as_ref()
            .map(|g| ExtraOrdinates::collect(&g.value))
            .unwrap_or_default();
        let geometry = feature.geometry.map(Geometry::<f64>::try_from).transpose()?;
        Ok(Record {
            id: feature.id,
            properties: feature.properties,
            geometry,
            foreign_members: feature.foreign_members,
            has_bbox: feature.bbox.is_some(),
            extra,
        })
    }
}

impl Record {
    pub fn to_feature(&self) -> Feature {
        let bbox = if self.has_bbox {
            self.geometry.as_ref().and_then(|g| g.bounding_rect()).map(to_bbox)
        } else {
            None
        };
        Feature {
            bbox,
            geometry: self.geometry.as_ref().map(|g| {
                let mut value = geojson::Value::from(g);
                self.extra.attach(&mut value);
                geojson::Geometry::new(value)
            }),
            id: self.id.clone(),
            properties: self.properties.clone(),
            foreign_members: self.foreign_members.clone(),
        }
    }
}

fn union(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
        (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
    )
}

fn to_bbox(rect: Rect<f64>) -> Bbox {
    vec![rect.min().x, rect.min().y, rect.max().x, rect.max().y]
}
