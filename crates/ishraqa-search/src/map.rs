use serde::{Deserialize, Serialize};

use crate::listing::ProjectStatus;
use crate::types::{Geo, ResultPage};

/// Visible map rectangle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeoBounds {
    pub south_west: Geo,
    pub north_east: Geo,
}

impl GeoBounds {
    pub fn new(south_west: Geo, north_east: Geo) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    pub fn contains(&self, point: Geo) -> bool {
        let lat_ok = point.lat >= self.south_west.lat && point.lat <= self.north_east.lat;
        // Bounds crossing the antimeridian have west > east
        let lng_ok = if self.south_west.lng <= self.north_east.lng {
            point.lng >= self.south_west.lng && point.lng <= self.north_east.lng
        } else {
            point.lng >= self.south_west.lng || point.lng <= self.north_east.lng
        };
        lat_ok && lng_ok
    }
}

/// One pin on the map view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapMarker {
    pub id: String,
    pub position: Geo,
    pub status: ProjectStatus,
    pub color: String,
    pub title: Option<String>,
}

/// Markers for every hit with coordinates, in hit order.
pub fn markers(page: &ResultPage) -> Vec<MapMarker> {
    page.hits
        .iter()
        .filter_map(|hit| {
            let position = hit.geo?;
            let status = hit.status();
            Some(MapMarker {
                id: hit.id.clone(),
                position,
                status,
                color: status.marker_color().to_string(),
                title: hit.title().map(str::to_string),
            })
        })
        .collect()
}

/// Markers that fall inside `bounds`
pub fn markers_within(page: &ResultPage, bounds: &GeoBounds) -> Vec<MapMarker> {
    markers(page)
        .into_iter()
        .filter(|m| bounds.contains(m.position))
        .collect()
}
