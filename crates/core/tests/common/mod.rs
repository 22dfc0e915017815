//! In-memory viewer host for exercising the engine end to end

#![allow(dead_code)]

use pdf_highlighter_core::{
    OverlaySurface, PageNumber, PageOverlay, PageRect, PageViewport, Rect, ScaleValue,
    SelectionRange, ViewerHost,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub const PAGE_WIDTH: f64 = 600.0;
pub const PAGE_HEIGHT: f64 = 800.0;

/// One write observed on a surface
#[derive(Debug, Clone)]
pub struct Write {
    pub surface: u64,
    pub overlay: PageOverlay,
}

pub struct FakeSurface {
    serial: u64,
    attached: Rc<Cell<bool>>,
    writes: Rc<RefCell<Vec<Write>>>,
}

impl OverlaySurface for FakeSurface {
    fn is_attached(&self) -> bool {
        self.attached.get()
    }

    fn render(&mut self, overlay: &PageOverlay) {
        assert!(self.attached.get(), "wrote into a detached surface");
        self.writes.borrow_mut().push(Write { surface: self.serial, overlay: overlay.clone() });
    }
}

pub struct FakeHost {
    pub page_count: u32,
    viewports: HashMap<PageNumber, PageViewport>,
    attached: HashMap<PageNumber, Rc<Cell<bool>>>,
    writes: Rc<RefCell<Vec<Write>>>,
    next_serial: u64,
    pub scrolls: Vec<(PageNumber, f64)>,
    pub applied_scales: Vec<ScaleValue>,
    pub captures: Vec<(PageNumber, Rect)>,
    pub snippet: Option<String>,
}

impl FakeHost {
    /// Every page mounted at scale 1
    pub fn new(page_count: u32) -> Self {
        let viewports = (1..=page_count)
            .map(|page| (page, PageViewport::new(PAGE_WIDTH, PAGE_HEIGHT, 1.0)))
            .collect();

        Self {
            page_count,
            viewports,
            attached: HashMap::new(),
            writes: Rc::new(RefCell::new(Vec::new())),
            next_serial: 0,
            scrolls: Vec::new(),
            applied_scales: Vec::new(),
            captures: Vec::new(),
            snippet: Some("data:image/png;base64,AAAA".to_string()),
        }
    }

    pub fn set_scale(&mut self, scale: f64) {
        for viewport in self.viewports.values_mut() {
            viewport.scale = scale;
        }
    }

    /// Recycle a page: its node goes away and it has no geometry
    pub fn unmount(&mut self, page: PageNumber) {
        self.viewports.remove(&page);
        if let Some(flag) = self.attached.remove(&page) {
            flag.set(false);
        }
    }

    pub fn mount(&mut self, page: PageNumber) {
        self.viewports.insert(page, PageViewport::new(PAGE_WIDTH, PAGE_HEIGHT, 1.0));
    }

    /// Silently replace a page's node while keeping its geometry
    pub fn recycle_node(&mut self, page: PageNumber) {
        if let Some(flag) = self.attached.remove(&page) {
            flag.set(false);
        }
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.borrow().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.borrow().len()
    }

    pub fn last_overlay(&self, page: PageNumber) -> Option<PageOverlay> {
        self.writes
            .borrow()
            .iter()
            .rev()
            .find(|write| write.overlay.page_number == page)
            .map(|write| write.overlay.clone())
    }
}

impl ViewerHost for FakeHost {
    type Surface = FakeSurface;

    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn page_viewport(&self, page: PageNumber) -> Option<PageViewport> {
        self.viewports.get(&page).copied()
    }

    fn overlay_layer(&mut self, page: PageNumber) -> Option<FakeSurface> {
        if !self.viewports.contains_key(&page) {
            return None;
        }

        self.next_serial += 1;
        let attached = Rc::new(Cell::new(true));
        self.attached.insert(page, Rc::clone(&attached));

        Some(FakeSurface { serial: self.next_serial, attached, writes: Rc::clone(&self.writes) })
    }

    fn scroll_page_into_view(&mut self, page: PageNumber, top: f64) {
        self.scrolls.push((page, top));
    }

    fn capture_snippet(&mut self, page: PageNumber, rect: &Rect) -> Option<String> {
        self.captures.push((page, *rect));
        self.snippet.clone()
    }

    fn apply_scale_value(&mut self, value: ScaleValue) {
        self.applied_scales.push(value);
    }
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

pub fn line(page: PageNumber, left: f64, top: f64, width: f64, height: f64) -> PageRect {
    PageRect::new(page, Rect::new(left, top, width, height))
}

pub fn text_range(text: &str, rects: Vec<PageRect>) -> SelectionRange {
    SelectionRange::new(text, rects)
}

pub fn start() -> Instant {
    Instant::now()
}
