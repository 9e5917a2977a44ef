//! Marker binding - keeps one marker per visible post on a [`MapSurface`].
//!
//! The binding owns no post data. It reconciles against every collection
//! the controller publishes and tracks which info window is open.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Local;
use tokio::sync::{Mutex, watch};

use laune_core::domain::{Post, PostId};

use super::MapSurface;

/// Radius, in degrees, used to decide whether an area is crowded (about 1 km).
pub const TOOLTIP_RADIUS_DEG: f64 = 0.01;

/// A post crowded by this many neighbours gets no always-on tooltip.
const CROWDED_NEIGHBOURS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct InfoWindow {
    pub nickname: String,
    pub comment: String,
    /// Creation time in local time.
    pub created: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: PostId,
    pub latitude: f64,
    pub longitude: f64,
    pub icon: &'static str,
    pub color: &'static str,
    /// Hover title.
    pub title: String,
    pub show_tooltip: bool,
    pub info: InfoWindow,
}

impl Marker {
    pub fn from_post(post: &Post, show_tooltip: bool) -> Self {
        let created = post
            .created_at_utc()
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();

        Self {
            id: post.id.clone(),
            latitude: post.latitude,
            longitude: post.longitude,
            icon: post.mood.icon(),
            color: post.mood.color(),
            title: post.nickname.clone(),
            show_tooltip,
            info: InfoWindow {
                nickname: post.nickname.clone(),
                comment: post.comment.clone(),
                created,
            },
        }
    }
}

/// Whether `post` is in a sparse enough area to keep its tooltip open.
fn shows_tooltip(post: &Post, posts: &[Post]) -> bool {
    let neighbours = posts
        .iter()
        .filter(|p| p.id != post.id)
        .filter(|p| {
            let d_lat = p.latitude - post.latitude;
            let d_lng = p.longitude - post.longitude;
            (d_lat * d_lat + d_lng * d_lng).sqrt() <= TOOLTIP_RADIUS_DEG
        })
        .count();
    neighbours < CROWDED_NEIGHBOURS
}

pub struct MarkerBinding<S> {
    surface: S,
    markers: HashMap<PostId, Marker>,
    open: Option<PostId>,
}

impl<S: MapSurface> MarkerBinding<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            markers: HashMap::new(),
            open: None,
        }
    }

    pub fn open(&self) -> Option<&PostId> {
        self.open.as_ref()
    }

    pub fn marker(&self, id: &PostId) -> Option<&Marker> {
        self.markers.get(id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Bring markers in line with `posts`.
    pub fn reconcile(&mut self, posts: &[Post]) {
        let live: HashSet<&PostId> = posts.iter().map(|p| &p.id).collect();
        let gone: Vec<PostId> = self
            .markers
            .keys()
            .filter(|id| !live.contains(id))
            .cloned()
            .collect();

        for id in gone {
            if self.open.as_ref() == Some(&id) {
                self.surface.close_info(&id);
                self.open = None;
            }
            self.surface.remove(&id);
            self.markers.remove(&id);
        }

        for post in posts {
            let marker = Marker::from_post(post, shows_tooltip(post, posts));
            match self.markers.get(&post.id) {
                None => self.surface.place(&marker),
                Some(existing) if *existing != marker => self.surface.update(&marker),
                Some(_) => continue,
            }
            self.markers.insert(post.id.clone(), marker);
        }
    }

    /// Click on a marker. Returns whether its info window is now open.
    pub fn toggle(&mut self, id: &PostId) -> bool {
        let Some(marker) = self.markers.get(id) else {
            return false;
        };

        if self.open.as_ref() == Some(id) {
            self.surface.close_info(id);
            self.open = None;
            return false;
        }

        if let Some(previous) = self.open.take() {
            self.surface.close_info(&previous);
        }
        self.surface.open_info(marker);
        self.open = Some(id.clone());
        true
    }

    /// Reconcile on every published collection until the controller goes away.
    pub async fn run(binding: Arc<Mutex<Self>>, mut posts: watch::Receiver<Arc<[Post]>>) {
        let current = posts.borrow_and_update().clone();
        binding.lock().await.reconcile(&current);

        while posts.changed().await.is_ok() {
            let current = posts.borrow_and_update().clone();
            binding.lock().await.reconcile(&current);
        }
        tracing::debug!("Post collection closed, marker binding stopped");
    }
}
