//! Map presentation - marker binding, drawing surface, and the SDK loader.

mod loader;
mod markers;
mod surface;

pub use loader::{DEFAULT_SDK_URL, HttpSdkSource, LoaderError, LoaderState, SdkLoader, SdkSource};
pub use markers::{InfoWindow, Marker, MarkerBinding, TOOLTIP_RADIUS_DEG};
pub use surface::{MapSurface, TracingSurface};
