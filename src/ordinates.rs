//! Ordinates past x and y (Z, M) that the 2-D geometry model drops.
//!
//! They are recorded per x/y position when a feature is loaded and appended
//! again when it is written. Simplification only removes vertices, so every
//! vertex that survives finds its trailing values.

use std::collections::HashMap;

use geo::Coord;
use geojson::Value;
use tracing::warn;

use crate::edges::{coord_key, CoordKey};

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ExtraOrdinates {
    by_position: HashMap<CoordKey, Vec<f64>>,
}

impl ExtraOrdinates {
    pub fn collect(value: &Value) -> Self {
        let mut extra = ExtraOrdinates::default();
        let mut conflicting = 0usize;
        visit(value, &mut |position| {
            if position.len() <= 2 {
                return;
            }
            let key = coord_key(Coord { x: position[0], y: position[1] });
            let trailing = &position[2..];
            match extra.by_position.get(&key) {
                Some(known) if known.as_slice() != trailing => conflicting += 1,
                Some(_) => {}
                None => {
                    extra.by_position.insert(key, trailing.to_vec());
                }
            }
        });
        if conflicting > 0 {
            warn!(
                positions = conflicting,
                "vertices share x/y but differ in higher ordinates; keeping the first seen"
            );
        }
        extra
    }

    pub fn is_empty(&self) -> bool {
        self.by_position.is_empty()
    }

    /// Appends the recorded ordinates to every 2-D position of `value`.
    pub fn attach(&self, value: &mut Value) {
        if self.is_empty() {
            return;
        }
        visit_mut(value, &mut |position| {
            if position.len() != 2 {
                return;
            }
            let key = coord_key(Coord { x: position[0], y: position[1] });
            if let Some(trailing) = self.by_position.get(&key) {
                position.extend_from_slice(trailing);
            }
        });
    }
}

fn visit(value: &Value, f: &mut dyn FnMut(&[f64])) {
    match value {
        Value::Point(p) => f(p),
        Value::MultiPoint(ps) | Value::LineString(ps) => ps.iter().for_each(|p| f(p)),
        Value::MultiLineString(lines) | Value::Polygon(lines) => lines.iter().flatten().for_each(|p| f(p)),
        Value::MultiPolygon(polygons) => polygons.iter().flatten().flatten().for_each(|p| f(p)),
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                visit(&geometry.value, f);
            }
        }
    }
}

fn visit_mut(value: &mut Value, f: &mut dyn FnMut(&mut Vec<f64>)) {
    match value {
        Value::Point(p) => f(p),
        Value::MultiPoint(ps) | Value::LineString(ps) => ps.iter_mut().for_each(|p| f(p)),
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            lines.iter_mut().flatten().for_each(|p| f(p))
        }
        Value::MultiPolygon(polygons) => polygons.iter_mut().flatten().flatten().for_each(|p| f(p)),
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                visit_mut(&mut geometry.value, f);
            }
        }
    }
}
