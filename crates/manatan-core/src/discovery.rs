//! Finds reader page images in the host document and reports changes as
//! discrete added/removed events.

use std::collections::HashSet;

use kanal::{Receiver, Sender};
use manatan_config::site::SiteConfig;

use crate::dom::{DescriptorCache, Document, ElementKind, NodeId};

/// Fallback candidates must be at least this tall.
const FALLBACK_MIN_NATURAL_HEIGHT: f64 = 400.0;
/// Anything this short or shorter is an icon or a placeholder.
const MIN_NATURAL_HEIGHT: f64 = 200.0;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiscoveredImage {
    pub node: NodeId,
    pub locator: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryEvent {
    Added(DiscoveredImage),
    Removed(DiscoveredImage),
}

/// Summary of one native mutation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationHint {
    ChildrenAdded(usize),
    AttributeChanged(String),
    ChildrenRemoved(usize),
}

impl MutationHint {
    fn warrants_rescan(&self) -> bool {
        match self {
            MutationHint::ChildrenAdded(count) => *count > 0,
            MutationHint::AttributeChanged(name) => name == "src",
            MutationHint::ChildrenRemoved(count) => *count > 0,
        }
    }
}

pub struct SourceDiscovery {
    selectors: Vec<String>,
    fallback_selector: String,
    current: Vec<DiscoveredImage>,
    subscribers: Vec<Sender<DiscoveryEvent>>,
}

impl SourceDiscovery {
    pub fn new(site: &SiteConfig) -> Self {
        Self {
            selectors: site.image_container_selectors.clone(),
            fallback_selector: site.fallback_selector.clone(),
            current: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<DiscoveryEvent> {
        let (tx, rx) = kanal::unbounded();
        for image in &self.current {
            tx.send(DiscoveryEvent::Added(image.clone())).ok();
        }
        self.subscribers.push(tx);
        rx
    }

    pub fn current(&self) -> &[DiscoveredImage] {
        &self.current
    }

    /// Rescan only if one of the mutation records could have changed the
    /// set of page images.
    pub fn on_mutations(
        &mut self,
        doc: &dyn Document,
        hints: &[MutationHint],
    ) -> Option<Vec<DiscoveryEvent>> {
        if !hints.iter().any(MutationHint::warrants_rescan) {
            return None;
        }
        Some(self.scan(doc))
    }

    pub fn scan(&mut self, doc: &dyn Document) -> Vec<DiscoveryEvent> {
        let mut cache = DescriptorCache::default();
        let found = self.collect(doc, &mut cache);

        let previous: HashSet<&DiscoveredImage> = self.current.iter().collect();
        let next: HashSet<&DiscoveredImage> = found.iter().collect();

        let mut events: Vec<DiscoveryEvent> = self
            .current
            .iter()
            .filter(|img| !next.contains(img))
            .cloned()
            .map(DiscoveryEvent::Removed)
            .collect();
        events.extend(
            found
                .iter()
                .filter(|img| !previous.contains(img))
                .cloned()
                .map(DiscoveryEvent::Added),
        );

        if !events.is_empty() {
            tracing::debug!(images = found.len(), changes = events.len(), "discovery scan");
        }
        self.current = found;
        self.broadcast(&events);
        events
    }

    fn collect(&self, doc: &dyn Document, cache: &mut DescriptorCache) -> Vec<DiscoveredImage> {
        let mut candidates: Vec<NodeId> = Vec::new();
        for selector in &self.selectors {
            for node in doc.query_selector_all(selector) {
                match cache.describe(doc, node).map(|d| d.kind) {
                    Some(ElementKind::Image) => candidates.push(node),
                    Some(ElementKind::Container) => candidates.extend(doc.images_within(node)),
                    None => {}
                }
            }
        }

        if candidates.is_empty() {
            for node in doc.query_selector_all(&self.fallback_selector) {
                if cache.describe(doc, node).is_some_and(|d| {
                    d.kind == ElementKind::Image && d.natural_height > FALLBACK_MIN_NATURAL_HEIGHT
                }) {
                    candidates.push(node);
                }
            }
        }

        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|node| seen.insert(*node))
            .filter_map(|node| {
                let d = cache.describe(doc, node)?;
                let locator = d.locator.as_deref()?;
                let keep = d.connected
                    && d.natural_height > MIN_NATURAL_HEIGHT
                    && !locator.contains("thumbnail")
                    && !d.in_cropper;
                keep.then(|| DiscoveredImage {
                    node,
                    locator: locator.to_string(),
                })
            })
            .collect()
    }

    fn broadcast(&mut self, events: &[DiscoveryEvent]) {
        if events.is_empty() {
            return;
        }
        self.subscribers.retain(|tx| {
            events
                .iter()
                .all(|event| tx.send(event.clone()).is_ok())
        });
    }
}
