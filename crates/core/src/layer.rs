//! Highlight layer management
//!
//! Keeps one overlay surface per mounted page in sync with the highlight
//! collection, the ghost highlight, and the scrolled-to emphasis.
//!
//! Every render pass recomputes viewport geometry from reference positions, so
//! zoom, rotation, and resize changes are always reflected. A page whose
//! computed overlay equals the one last written to a still-attached surface is
//! not written again, which keeps repeated renders invisible to the observer.

use crate::host::{OverlaySurface, ViewerHost};
use doc_model::{
    GhostHighlight, Highlight, HighlightContent, HighlightId, HighlightKind, PageNumber, Rect,
    ReferencePosition, ViewportPosition,
};
use std::collections::HashMap;
use viewer_core::{group_by_page, position_to_viewport, PageViewport};

/// Stable identity of a rendered unit across passes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnitKey {
    Highlight(HighlightId),
    Ghost,
}

/// Visual shape of a rendered unit
#[derive(Debug, Clone, PartialEq)]
pub enum UnitShape {
    /// One part per line/run of the selection
    Text { parts: Vec<Rect> },

    /// A single box, movable and resizable by the caller
    Area { rect: Rect },
}

/// One highlight, projected onto the page's current viewport
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayUnit {
    pub key: UnitKey,
    pub shape: UnitShape,
    pub position: ViewportPosition,
    pub content: Option<HighlightContent>,
    pub is_scrolled_to: bool,
}

/// Everything the caller needs to draw one page's overlay
#[derive(Debug, Clone, PartialEq)]
pub struct PageOverlay {
    pub page_number: PageNumber,
    pub units: Vec<OverlayUnit>,
}

impl PageOverlay {
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn unit(&self, key: &UnitKey) -> Option<&OverlayUnit> {
        self.units.iter().find(|unit| &unit.key == key)
    }
}

/// Counters for observing surface churn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerStats {
    /// Surfaces obtained from the host
    pub surfaces_created: u64,

    /// Cached surfaces found detached and replaced
    pub stale_surfaces: u64,

    /// Overlays written to a surface
    pub renders: u64,

    /// Passes skipped for a page because nothing changed
    pub unchanged: u64,
}

/// A highlight or the ghost, borrowed for one render pass
#[derive(Clone, Copy)]
enum Source<'a> {
    Committed(&'a Highlight),
    Ghost(&'a GhostHighlight),
}

impl Source<'_> {
    fn page_number(&self) -> PageNumber {
        self.position().page_number()
    }

    fn position(&self) -> &ReferencePosition {
        match self {
            Source::Committed(highlight) => &highlight.position,
            Source::Ghost(ghost) => &ghost.position,
        }
    }
}

struct SurfaceEntry<S> {
    surface: S,
    last: Option<PageOverlay>,
}

/// Owner of all per-page overlay surfaces
pub struct HighlightLayerManager<S> {
    surfaces: HashMap<PageNumber, SurfaceEntry<S>>,
    stats: LayerStats,
}

impl<S: OverlaySurface> HighlightLayerManager<S> {
    pub fn new() -> Self {
        Self { surfaces: HashMap::new(), stats: LayerStats::default() }
    }

    /// Reconcile every page of the document with the current highlight state
    pub fn render_all<H>(
        &mut self,
        host: &mut H,
        highlights: &[Highlight],
        ghost: Option<&GhostHighlight>,
        scrolled_to: Option<&HighlightId>,
    ) where
        H: ViewerHost<Surface = S>,
    {
        let sources = highlights.iter().map(Source::Committed).chain(ghost.map(Source::Ghost));
        let by_page = group_by_page(sources, Source::page_number);

        for page in 1..=host.page_count() {
            if !self.ensure_surface(host, page) {
                continue;
            }

            let Some(viewport) = host.page_viewport(page) else {
                log::debug!("page {page} has no viewport, skipping this pass");
                continue;
            };

            let overlay = build_overlay(page, by_page.get(page), &viewport, scrolled_to);
            self.write(page, overlay);
        }
    }

    /// Make sure a live surface is cached for `page`; `false` if the page is not mounted
    fn ensure_surface<H>(&mut self, host: &mut H, page: PageNumber) -> bool
    where
        H: ViewerHost<Surface = S>,
    {
        if let Some(entry) = self.surfaces.get(&page) {
            if entry.surface.is_attached() {
                return true;
            }
            log::debug!("overlay surface for page {page} was detached by the host");
            self.stats.stale_surfaces += 1;
            self.surfaces.remove(&page);
        }

        match host.overlay_layer(page) {
            Some(surface) => {
                log::trace!("created overlay surface for page {page}");
                self.stats.surfaces_created += 1;
                self.surfaces.insert(page, SurfaceEntry { surface, last: None });
                true
            }
            None => false,
        }
    }

    fn write(&mut self, page: PageNumber, overlay: PageOverlay) {
        let Some(entry) = self.surfaces.get_mut(&page) else {
            return;
        };

        if entry.last.as_ref() == Some(&overlay) {
            self.stats.unchanged += 1;
            return;
        }

        entry.surface.render(&overlay);
        entry.last = Some(overlay);
        self.stats.renders += 1;
    }

    /// Forget the surface of a page the host unmounted
    pub fn on_page_unmounted(&mut self, page: PageNumber) -> bool {
        self.surfaces.remove(&page).is_some()
    }

    /// The overlay last written to a page's surface
    pub fn rendered(&self, page: PageNumber) -> Option<&PageOverlay> {
        self.surfaces.get(&page).and_then(|entry| entry.last.as_ref())
    }

    pub fn has_surface(&self, page: PageNumber) -> bool {
        self.surfaces.contains_key(&page)
    }

    pub fn stats(&self) -> LayerStats {
        self.stats
    }
}

impl<S: OverlaySurface> Default for HighlightLayerManager<S> {
    fn default() -> Self {
        Self::new()
    }
}

fn build_overlay(
    page: PageNumber,
    sources: &[Source<'_>],
    viewport: &PageViewport,
    scrolled_to: Option<&HighlightId>,
) -> PageOverlay {
    let units = sources
        .iter()
        .filter_map(|source| {
            let unit = build_unit(source, viewport, scrolled_to);
            if unit.is_none() {
                log::warn!("highlight on page {page} could not be projected");
            }
            unit
        })
        .collect();

    PageOverlay { page_number: page, units }
}

fn build_unit(
    source: &Source<'_>,
    viewport: &PageViewport,
    scrolled_to: Option<&HighlightId>,
) -> Option<OverlayUnit> {
    let position = position_to_viewport(source.position(), viewport)?;

    let (key, kind, content) = match source {
        Source::Committed(highlight) => (
            UnitKey::Highlight(highlight.id.clone()),
            highlight.kind(),
            Some(highlight.content.clone()),
        ),
        Source::Ghost(ghost) => (UnitKey::Ghost, ghost.kind(), ghost.content.clone()),
    };

    let is_scrolled_to = match (&key, scrolled_to) {
        (UnitKey::Highlight(id), Some(target)) => id == target,
        _ => false,
    };

    let shape = match kind {
        HighlightKind::Text => {
            UnitShape::Text { parts: position.rects.iter().map(|rect| rect.rect).collect() }
        }
        HighlightKind::Area => UnitShape::Area { rect: position.bounding_rect.rect },
    };

    Some(OverlayUnit { key, shape, position, content, is_scrolled_to })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScaleValue;
    use doc_model::{PageRect, ScaledRect};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Clone)]
    struct Surface {
        attached: Rc<Cell<bool>>,
        writes: Rc<RefCell<Vec<PageOverlay>>>,
    }

    impl OverlaySurface for Surface {
        fn is_attached(&self) -> bool {
            self.attached.get()
        }

        fn render(&mut self, overlay: &PageOverlay) {
            self.writes.borrow_mut().push(overlay.clone());
        }
    }

    struct Host {
        scale: f64,
        mounted: Vec<PageNumber>,
        attached: HashMap<PageNumber, Rc<Cell<bool>>>,
        writes: Rc<RefCell<Vec<PageOverlay>>>,
    }

    impl Host {
        fn new(mounted: Vec<PageNumber>) -> Self {
            Self { scale: 1.0, mounted, attached: HashMap::new(), writes: Rc::default() }
        }
    }

    impl ViewerHost for Host {
        type Surface = Surface;

        fn page_count(&self) -> u32 {
            3
        }

        fn page_viewport(&self, page: PageNumber) -> Option<PageViewport> {
            self.mounted.contains(&page).then(|| PageViewport::new(600.0, 800.0, self.scale))
        }

        fn overlay_layer(&mut self, page: PageNumber) -> Option<Surface> {
            if !self.mounted.contains(&page) {
                return None;
            }
            let attached = Rc::new(Cell::new(true));
            self.attached.insert(page, attached.clone());
            Some(Surface { attached, writes: self.writes.clone() })
        }

        fn scroll_page_into_view(&mut self, _page: PageNumber, _top: f64) {}

        fn capture_snippet(&mut self, _page: PageNumber, _rect: &Rect) -> Option<String> {
            None
        }

        fn apply_scale_value(&mut self, _value: ScaleValue) {}
    }

    fn scaled(page_number: PageNumber, left: f64, top: f64, width: f64, height: f64) -> ScaledRect {
        ScaledRect {
            x1: left,
            y1: top,
            x2: left + width,
            y2: top + height,
            width: 600.0,
            height: 800.0,
            page_number,
        }
    }

    fn text_highlight(id: &str, page: PageNumber, lines: &[(f64, f64)]) -> Highlight {
        let rects: Vec<ScaledRect> =
            lines.iter().map(|&(left, top)| scaled(page, left, top, 100.0, 10.0)).collect();
        let bounding = scaled(page, 0.0, lines[0].1, 200.0, 10.0 * lines.len() as f64);
        Highlight {
            id: HighlightId::from(id),
            position: ReferencePosition {
                bounding_rect: bounding,
                rects,
                use_pdf_coordinates: false,
            },
            content: HighlightContent::Text(id.to_owned()),
            kind: Some(HighlightKind::Text),
        }
    }

    #[test]
    fn test_groups_units_by_page() {
        let mut host = Host::new(vec![1, 2]);
        let mut layers = HighlightLayerManager::new();
        let highlights = vec![
            text_highlight("a", 1, &[(10.0, 10.0)]),
            text_highlight("b", 2, &[(10.0, 10.0)]),
            text_highlight("c", 1, &[(10.0, 40.0)]),
        ];

        layers.render_all(&mut host, &highlights, None, None);

        let page_one = layers.rendered(1).expect("page 1 rendered");
        let keys: Vec<_> = page_one.units.iter().map(|unit| unit.key.clone()).collect();
        assert_eq!(keys, vec![UnitKey::Highlight("a".into()), UnitKey::Highlight("c".into())]);
        assert_eq!(layers.rendered(2).expect("page 2 rendered").units.len(), 1);
        assert!(!layers.has_surface(3));
    }

    #[test]
    fn test_text_unit_keeps_one_part_per_line() {
        let mut host = Host::new(vec![1]);
        let mut layers = HighlightLayerManager::new();
        let highlights =
            vec![text_highlight("a", 1, &[(10.0, 10.0), (10.0, 20.0), (10.0, 30.0)])];

        layers.render_all(&mut host, &highlights, None, None);

        let unit = &layers.rendered(1).expect("rendered").units[0];
        match &unit.shape {
            UnitShape::Text { parts } => assert_eq!(parts.len(), 3),
            other => panic!("expected text shape, got {other:?}"),
        }
    }

    #[test]
    fn test_repeat_render_is_noop() {
        let mut host = Host::new(vec![1]);
        let mut layers = HighlightLayerManager::new();
        let highlights = vec![text_highlight("a", 1, &[(10.0, 10.0)])];

        layers.render_all(&mut host, &highlights, None, None);
        layers.render_all(&mut host, &highlights, None, None);

        assert_eq!(host.writes.borrow().len(), 1);
        assert_eq!(layers.stats().unchanged, 1);
        assert_eq!(layers.stats().surfaces_created, 1);
    }

    #[test]
    fn test_detached_surface_is_recreated() {
        let mut host = Host::new(vec![1]);
        let mut layers = HighlightLayerManager::new();
        let highlights = vec![text_highlight("a", 1, &[(10.0, 10.0)])];

        layers.render_all(&mut host, &highlights, None, None);
        host.attached[&1].set(false);
        layers.render_all(&mut host, &highlights, None, None);

        assert_eq!(layers.stats().stale_surfaces, 1);
        assert_eq!(layers.stats().surfaces_created, 2);
        assert_eq!(host.writes.borrow().len(), 2);
    }

    #[test]
    fn test_zoom_change_recomputes_geometry() {
        let mut host = Host::new(vec![1]);
        let mut layers = HighlightLayerManager::new();
        let highlights = vec![text_highlight("a", 1, &[(10.0, 10.0)])];

        layers.render_all(&mut host, &highlights, None, None);
        host.scale = 1.5;
        layers.render_all(&mut host, &highlights, None, None);

        let unit = &layers.rendered(1).expect("rendered").units[0];
        assert_eq!(unit.position.rects[0], PageRect::new(1, Rect::new(15.0, 15.0, 150.0, 15.0)));
        assert_eq!(host.writes.borrow().len(), 2);
    }

    #[test]
    fn test_ghost_and_scrolled_to_flags() {
        let mut host = Host::new(vec![1]);
        let mut layers = HighlightLayerManager::new();
        let highlights = vec![text_highlight("a", 1, &[(10.0, 10.0)])];
        let ghost = GhostHighlight {
            position: ReferencePosition {
                bounding_rect: scaled(1, 50.0, 50.0, 100.0, 70.0),
                rects: Vec::new(),
                use_pdf_coordinates: false,
            },
            content: Some(HighlightContent::Image("img".to_owned())),
        };
        let target = HighlightId::from("a");

        layers.render_all(&mut host, &highlights, Some(&ghost), Some(&target));

        let overlay = layers.rendered(1).expect("rendered");
        assert!(overlay.unit(&UnitKey::Highlight(target)).expect("unit").is_scrolled_to);
        let ghost_unit = overlay.unit(&UnitKey::Ghost).expect("ghost unit");
        assert!(!ghost_unit.is_scrolled_to);
        assert_eq!(ghost_unit.shape, UnitShape::Area { rect: Rect::new(50.0, 50.0, 100.0, 70.0) });
    }

    #[test]
    fn test_unmounted_page_forgets_surface() {
        let mut host = Host::new(vec![1]);
        let mut layers = HighlightLayerManager::new();

        layers.render_all(&mut host, &[], None, None);
        assert!(layers.rendered(1).expect("empty overlay written").is_empty());

        assert!(layers.on_page_unmounted(1));
        assert!(!layers.has_surface(1));
        assert!(layers.rendered(1).is_none());
    }
}
