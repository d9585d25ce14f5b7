//! Geometry and physical-property helpers shared by the converters.
//!
//! Geometries are attached as `geo:Geometry` nodes holding a WKT literal in
//! `asWKT`, linked from their owner by `hasGeometry`.

use crate::context::ConversionContext;
use anyhow::Result;
use geo::{Coord, LineString, MultiPolygon};
use trafficgraph_graph::{NodeId, Ontology};
use trafficgraph_recording::{BoundingBox, Polygon, Trajectory};
use wkt::ToWkt;

/// geo types are planar, so the height is written by hand.
pub(crate) fn point_wkt([x, y, z]: [f64; 3]) -> String {
    format!("POINT Z ({x} {y} {z})")
}

/// Outline as a closed polygon; `None` below three vertices.
pub(crate) fn to_polygon(outline: &Polygon) -> Option<geo::Polygon<f64>> {
    if outline.len() < 3 {
        return None;
    }
    let ring: Vec<Coord<f64>> = outline.iter().map(|&[x, y]| Coord { x, y }).collect();
    Some(geo::Polygon::new(LineString::new(ring), vec![]))
}

pub(crate) fn polygon_wkt(outline: &Polygon) -> Option<String> {
    to_polygon(outline).map(|polygon| polygon.wkt_string())
}

/// Polygons collected as-is into one MULTIPOLYGON (no union).
pub(crate) fn multipolygon_wkt<'a>(outlines: impl IntoIterator<Item = &'a Polygon>) -> Option<String> {
    let parts: Vec<geo::Polygon<f64>> = outlines.into_iter().filter_map(to_polygon).collect();
    if parts.is_empty() {
        return None;
    }
    Some(MultiPolygon::new(parts).wkt_string())
}

pub(crate) fn linestring_wkt(points: &[[f64; 2]]) -> Option<String> {
    if points.len() < 2 {
        return None;
    }
    let line: LineString<f64> = points.iter().map(|&[x, y]| Coord { x, y }).collect();
    Some(line.wkt_string())
}

pub(crate) fn attach_geometry(
    ctx: &mut ConversionContext<'_>,
    owner: NodeId,
    wkt: String,
) -> Result<NodeId> {
    let geosparql = ctx.ontology(Ontology::GeoSparql)?;
    let geometry = ctx.create_node(&geosparql.class("Geometry"));
    ctx.set_attr(geometry, "asWKT", wkt)?;
    ctx.relate(owner, "hasGeometry", geometry)?;
    Ok(geometry)
}

pub(crate) fn attach_polygon(
    ctx: &mut ConversionContext<'_>,
    owner: NodeId,
    polygon: &Polygon,
) -> Result<Option<NodeId>> {
    polygon_wkt(polygon)
        .map(|wkt| attach_geometry(ctx, owner, wkt))
        .transpose()
}

/// Speed, yaw and acceleration at sample `s`; missing samples are skipped.
pub(crate) fn add_physical_properties(
    ctx: &mut ConversionContext<'_>,
    node: NodeId,
    trajectory: &Trajectory,
    s: usize,
) -> Result<()> {
    if let Some(speed) = trajectory.speed(s) {
        ctx.set_attr(node, "has_speed", speed)?;
    }
    if let Some(heading) = trajectory.heading(s) {
        ctx.set_attr(node, "has_yaw", heading)?;
    }
    if let Some([x, y, z]) = trajectory.acceleration(s) {
        ctx.set_attr(node, "has_acceleration", (x * x + y * y + z * z).sqrt())?;
    }
    Ok(())
}

pub(crate) fn add_bounding_box(
    ctx: &mut ConversionContext<'_>,
    node: NodeId,
    bounding_box: Option<BoundingBox>,
) -> Result<()> {
    if let Some(bb) = bounding_box {
        ctx.set_attr(node, "has_length", bb.length)?;
        ctx.set_attr(node, "has_width", bb.width)?;
        ctx.set_attr(node, "has_height", bb.height)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Contains, Point};
    use wkt::TryFromWkt;

    fn square() -> Polygon {
        vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]]
    }

    #[test]
    fn rings_are_closed() {
        let wkt = polygon_wkt(&square()).unwrap();
        assert!(wkt.starts_with("POLYGON"));
        let parsed = geo::Polygon::<f64>::try_from_wkt_str(&wkt).unwrap();
        assert_eq!(parsed.exterior().0.len(), 5);
        assert_eq!(parsed.exterior().0.first(), parsed.exterior().0.last());
        assert!(polygon_wkt(&vec![[0.0, 0.0], [1.0, 1.0]]).is_none());
    }

    #[test]
    fn multipolygons_skip_degenerate_parts() {
        let parts = [square(), vec![[0.0, 0.0]]];
        let wkt = multipolygon_wkt(&parts).unwrap();
        assert!(wkt.starts_with("MULTIPOLYGON"));
        let parsed = MultiPolygon::<f64>::try_from_wkt_str(&wkt).unwrap();
        assert_eq!(parsed.0.len(), 1);
        assert!(parsed.contains(&Point::new(2.0, 2.0)));
        assert!(multipolygon_wkt(&[] as &[Polygon]).is_none());
    }

    #[test]
    fn linestrings_need_two_points() {
        let wkt = linestring_wkt(&[[0.0, 0.0], [3.0, 1.5]]).unwrap();
        let parsed = LineString::<f64>::try_from_wkt_str(&wkt).unwrap();
        assert_eq!(parsed.0, vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 3.0, y: 1.5 }]);
        assert!(linestring_wkt(&[[0.0, 0.0]]).is_none());
    }

    #[test]
    fn containment() {
        let area = MultiPolygon::new(vec![to_polygon(&square()).unwrap()]);
        assert!(area.contains(&Point::new(2.0, 2.0)));
        assert!(!area.contains(&Point::new(5.0, 2.0)));
        assert!(!MultiPolygon::<f64>::new(vec![]).contains(&Point::new(2.0, 2.0)));
        assert!(to_polygon(&Vec::new()).is_none());
    }

    #[test]
    fn point_wkt_keeps_height() {
        assert_eq!(point_wkt([1.5, -2.0, 0.0]), "POINT Z (1.5 -2 0)");
    }
}
