use laune_core::domain::PostId;

use super::Marker;

/// Drawing side of the map SDK. The binding decides what to draw;
/// implementations only draw it.
pub trait MapSurface: Send {
    fn place(&mut self, marker: &Marker);

    fn update(&mut self, marker: &Marker);

    fn remove(&mut self, id: &PostId);

    fn open_info(&mut self, marker: &Marker);

    fn close_info(&mut self, id: &PostId);
}

/// Headless surface that logs every drawing call.
#[derive(Debug, Default)]
pub struct TracingSurface;

impl MapSurface for TracingSurface {
    fn place(&mut self, marker: &Marker) {
        tracing::info!(
            post_id = %marker.id,
            lat = marker.latitude,
            lng = marker.longitude,
            icon = marker.icon,
            tooltip = marker.show_tooltip,
            "Marker placed"
        );
    }

    fn update(&mut self, marker: &Marker) {
        tracing::debug!(post_id = %marker.id, tooltip = marker.show_tooltip, "Marker updated");
    }

    fn remove(&mut self, id: &PostId) {
        tracing::info!(post_id = %id, "Marker removed");
    }

    fn open_info(&mut self, marker: &Marker) {
        tracing::info!(
            post_id = %marker.id,
            nickname = %marker.info.nickname,
            comment = %marker.info.comment,
            created = %marker.info.created,
            "Info window opened"
        );
    }

    fn close_info(&mut self, id: &PostId) {
        tracing::debug!(post_id = %id, "Info window closed");
    }
}
