//! Coordinate conversion between a page's natural space and the viewer's
//! scaled, rotated on-screen space, plus the small geometry helpers built on it.

use doc_model::{
    PageNumber, PageRect, Rect, ReferencePosition, ScaledRect, ViewportPosition,
};

/// Gap between a tip and the rectangle it is anchored to.
pub const TIP_GAP_PX: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Quarter,
    Half,
    ThreeQuarter,
}

impl Rotation {
    /// Clockwise rotation in degrees; only multiples of 90 are valid.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Self::None),
            90 => Some(Self::Quarter),
            180 => Some(Self::Half),
            270 => Some(Self::ThreeQuarter),
            _ => None,
        }
    }

    fn swaps_axes(self) -> bool {
        matches!(self, Self::Quarter | Self::ThreeQuarter)
    }
}

/// The host's current description of one page: natural size, zoom and rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageViewport {
    pub page_width: f64,
    pub page_height: f64,
    pub scale: f64,
    pub rotation: Rotation,
}

impl PageViewport {
    pub fn new(page_width: f64, page_height: f64, scale: f64) -> Self {
        Self { page_width, page_height, scale, rotation: Rotation::None }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// On-screen width of the page in pixels.
    pub fn width(&self) -> f64 {
        let natural = if self.rotation.swaps_axes() { self.page_height } else { self.page_width };
        natural * self.scale
    }

    /// On-screen height of the page in pixels.
    pub fn height(&self) -> f64 {
        let natural = if self.rotation.swaps_axes() { self.page_width } else { self.page_height };
        natural * self.scale
    }

    pub fn is_valid(&self) -> bool {
        self.scale.is_finite()
            && self.scale > 0.0
            && self.page_width.is_finite()
            && self.page_width > 0.0
            && self.page_height.is_finite()
            && self.page_height > 0.0
    }

    fn natural_to_viewport(&self, x: f64, y: f64) -> (f64, f64) {
        let (w, h) = (self.page_width, self.page_height);
        let (u, v) = match self.rotation {
            Rotation::None => (x, y),
            Rotation::Quarter => (h - y, x),
            Rotation::Half => (w - x, h - y),
            Rotation::ThreeQuarter => (y, w - x),
        };
        (u * self.scale, v * self.scale)
    }

    fn viewport_to_natural(&self, u: f64, v: f64) -> (f64, f64) {
        let (w, h) = (self.page_width, self.page_height);
        let (u, v) = (u / self.scale, v / self.scale);
        match self.rotation {
            Rotation::None => (u, v),
            Rotation::Quarter => (v, h - u),
            Rotation::Half => (w - u, h - v),
            Rotation::ThreeQuarter => (w - v, u),
        }
    }
}

/// Projects a reference rectangle onto the page's current viewport.
///
/// Returns `None` when the viewport is not laid out yet or the rectangle was
/// recorded against a degenerate page size.
pub fn to_viewport(
    rect: &ScaledRect,
    viewport: &PageViewport,
    use_pdf_coordinates: bool,
) -> Option<PageRect> {
    if !viewport.is_valid() || rect.width <= 0.0 || rect.height <= 0.0 {
        return None;
    }

    let sx = viewport.page_width / rect.width;
    let sy = viewport.page_height / rect.height;
    let flip = |y: f64| if use_pdf_coordinates { viewport.page_height - y } else { y };

    let (u1, v1) = viewport.natural_to_viewport(rect.x1 * sx, flip(rect.y1 * sy));
    let (u2, v2) = viewport.natural_to_viewport(rect.x2 * sx, flip(rect.y2 * sy));

    Some(PageRect::new(rect.page_number, Rect::from_corners(u1, v1, u2, v2)))
}

/// Exact inverse of [`to_viewport`]; the result is measured against the natural page size.
pub fn to_reference(
    rect: &PageRect,
    viewport: &PageViewport,
    use_pdf_coordinates: bool,
) -> Option<ScaledRect> {
    if !viewport.is_valid() {
        return None;
    }

    let flip = |y: f64| if use_pdf_coordinates { viewport.page_height - y } else { y };
    let (x1, y1) = viewport.viewport_to_natural(rect.rect.left, rect.rect.top);
    let (x2, y2) = viewport.viewport_to_natural(rect.rect.right(), rect.rect.bottom());
    let (y1, y2) = (flip(y1), flip(y2));

    Some(ScaledRect {
        x1: x1.min(x2),
        y1: y1.min(y2),
        x2: x1.max(x2),
        y2: y1.max(y2),
        width: viewport.page_width,
        height: viewport.page_height,
        page_number: rect.page_number,
    })
}

pub fn position_to_viewport(
    position: &ReferencePosition,
    viewport: &PageViewport,
) -> Option<ViewportPosition> {
    let convert = |rect: &ScaledRect| to_viewport(rect, viewport, position.use_pdf_coordinates);

    let bounding_rect = convert(&position.bounding_rect)?;
    let rects = position.rects.iter().map(convert).collect::<Option<Vec<_>>>()?;

    Some(ViewportPosition { bounding_rect, rects })
}

pub fn position_to_reference(
    position: &ViewportPosition,
    viewport: &PageViewport,
    use_pdf_coordinates: bool,
) -> Option<ReferencePosition> {
    let convert = |rect: &PageRect| to_reference(rect, viewport, use_pdf_coordinates);

    let bounding_rect = convert(&position.bounding_rect)?;
    let rects = position.rects.iter().map(convert).collect::<Option<Vec<_>>>()?;

    Some(ReferencePosition { bounding_rect, rects, use_pdf_coordinates })
}

/// Smallest rectangle covering every input; keeps the first rectangle's page number.
///
/// Callers must pass at least one rectangle; an empty slice yields `None`.
pub fn merge_rects(rects: &[PageRect]) -> Option<PageRect> {
    let (first, rest) = rects.split_first()?;

    let mut left = first.rect.left;
    let mut top = first.rect.top;
    let mut right = first.rect.right();
    let mut bottom = first.rect.bottom();

    for rect in rest {
        left = left.min(rect.rect.left);
        top = top.min(rect.rect.top);
        right = right.max(rect.rect.right());
        bottom = bottom.max(rect.rect.bottom());
    }

    Some(PageRect::new(first.page_number, Rect::new(left, top, right - left, bottom - top)))
}

/// Items partitioned by page, pages kept in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGroups<T> {
    groups: Vec<(PageNumber, Vec<T>)>,
}

impl<T> PageGroups<T> {
    pub fn get(&self, page_number: PageNumber) -> &[T] {
        self.groups
            .iter()
            .find(|(page, _)| *page == page_number)
            .map(|(_, items)| items.as_slice())
            .unwrap_or(&[])
    }
}

pub fn group_by_page<T>(
    items: impl IntoIterator<Item = T>,
    page_of: impl Fn(&T) -> PageNumber,
) -> PageGroups<T> {
    let mut groups: Vec<(PageNumber, Vec<T>)> = Vec::new();

    for item in items {
        let page = page_of(&item);
        match groups.iter_mut().find(|(existing, _)| *existing == page) {
            Some((_, bucket)) => bucket.push(item),
            None => groups.push((page, vec![item])),
        }
    }

    PageGroups { groups }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TipPlacement {
    pub left: f64,
    pub top: f64,
    pub below: bool,
}

/// Centres a tip over `anchor` and puts it above, or below when above would
/// cross `visible_top`. All values are page-local viewport pixels.
pub fn place_tip(
    anchor: &Rect,
    tip_width: f64,
    tip_height: f64,
    page_width: f64,
    visible_top: f64,
) -> TipPlacement {
    let centre = anchor.left + anchor.width / 2.0;
    let max_left = (page_width - tip_width).max(0.0);
    let left = (centre - tip_width / 2.0).clamp(0.0, max_left);

    let above = anchor.top - tip_height - TIP_GAP_PX;
    if above < visible_top {
        TipPlacement { left, top: anchor.bottom() + TIP_GAP_PX, below: true }
    } else {
        TipPlacement { left, top: above, below: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scaled(x1: f64, y1: f64, x2: f64, y2: f64) -> ScaledRect {
        ScaledRect { x1, y1, x2, y2, width: 600.0, height: 800.0, page_number: 1 }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
    }

    fn assert_scaled_eq(actual: &ScaledRect, expected: &ScaledRect) {
        assert!(close(actual.x1, expected.x1), "x1 {actual:?} vs {expected:?}");
        assert!(close(actual.y1, expected.y1), "y1 {actual:?} vs {expected:?}");
        assert!(close(actual.x2, expected.x2), "x2 {actual:?} vs {expected:?}");
        assert!(close(actual.y2, expected.y2), "y2 {actual:?} vs {expected:?}");
        assert_eq!(actual.page_number, expected.page_number);
    }

    #[test]
    fn identity_viewport_keeps_pixels() {
        let viewport = PageViewport::new(600.0, 800.0, 1.0);
        let rect = to_viewport(&scaled(10.0, 20.0, 110.0, 35.0), &viewport, false)
            .expect("valid viewport");

        assert_eq!(rect.rect, Rect::new(10.0, 20.0, 100.0, 15.0));
    }

    #[test]
    fn zoom_scales_every_edge() {
        let viewport = PageViewport::new(600.0, 800.0, 1.5);
        let rect = to_viewport(&scaled(10.0, 20.0, 110.0, 35.0), &viewport, false)
            .expect("valid viewport");

        assert_eq!(rect.rect, Rect::new(15.0, 30.0, 150.0, 22.5));
    }

    #[test]
    fn rescales_rects_recorded_against_other_page_size() {
        let viewport = PageViewport::new(600.0, 800.0, 1.0);
        let recorded =
            ScaledRect { width: 1200.0, height: 1600.0, ..scaled(20.0, 40.0, 220.0, 70.0) };
        let rect = to_viewport(&recorded, &viewport, false).expect("valid viewport");

        assert_eq!(rect.rect, Rect::new(10.0, 20.0, 100.0, 15.0));
    }

    #[test]
    fn pdf_coordinates_flip_vertical_axis() {
        let viewport = PageViewport::new(600.0, 800.0, 1.0);
        let rect = to_viewport(&scaled(10.0, 700.0, 110.0, 780.0), &viewport, true)
            .expect("valid viewport");

        assert_eq!(rect.rect, Rect::new(10.0, 20.0, 100.0, 80.0));
    }

    #[test]
    fn quarter_rotation_swaps_axes() {
        let viewport = PageViewport::new(600.0, 800.0, 1.0).with_rotation(Rotation::Quarter);
        assert_eq!(viewport.width(), 800.0);
        assert_eq!(viewport.height(), 600.0);

        let rect = to_viewport(&scaled(0.0, 0.0, 100.0, 50.0), &viewport, false)
            .expect("valid viewport");
        assert_eq!(rect.rect, Rect::new(750.0, 0.0, 50.0, 100.0));
    }

    #[test]
    fn invalid_viewport_fails_softly() {
        let viewport = PageViewport::new(600.0, 800.0, 0.0);
        assert!(to_viewport(&scaled(0.0, 0.0, 1.0, 1.0), &viewport, false).is_none());

        let rect = PageRect::new(1, Rect::new(0.0, 0.0, 1.0, 1.0));
        assert!(to_reference(&rect, &viewport, false).is_none());
    }

    #[test]
    fn rotation_from_degrees_normalizes() {
        assert_eq!(Rotation::from_degrees(-90), Some(Rotation::ThreeQuarter));
        assert_eq!(Rotation::from_degrees(450), Some(Rotation::Quarter));
        assert_eq!(Rotation::from_degrees(45), None);
    }

    #[test]
    fn merge_single_rect_is_identity() {
        let rect = PageRect::new(3, Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(merge_rects(&[rect]), Some(rect));
        assert_eq!(merge_rects(&[]), None);
    }

    #[test]
    fn merge_covers_multi_line_selection() {
        let lines = [
            PageRect::new(1, Rect::new(40.0, 10.0, 200.0, 12.0)),
            PageRect::new(1, Rect::new(10.0, 24.0, 300.0, 12.0)),
            PageRect::new(1, Rect::new(10.0, 38.0, 80.0, 12.0)),
        ];

        let merged = merge_rects(&lines).expect("non-empty input");
        assert_eq!(merged.rect, Rect::new(10.0, 10.0, 300.0, 40.0));
        assert_eq!(merged.page_number, 1);
    }

    #[test]
    fn grouping_keeps_insertion_order() {
        let groups = group_by_page(vec![(3, 'a'), (1, 'b'), (3, 'c')], |item| item.0);

        assert_eq!(groups.get(3), &[(3, 'a'), (3, 'c')]);
        assert_eq!(groups.get(1), &[(1, 'b')]);
        assert!(groups.get(7).is_empty());
    }

    #[test]
    fn tip_goes_above_when_room() {
        let anchor = Rect::new(100.0, 200.0, 50.0, 20.0);
        let placement = place_tip(&anchor, 100.0, 40.0, 600.0, 0.0);

        assert_eq!(placement, TipPlacement { left: 75.0, top: 155.0, below: false });
    }

    #[test]
    fn tip_flips_below_and_clamps_to_page() {
        let anchor = Rect::new(0.0, 30.0, 20.0, 10.0);
        let placement = place_tip(&anchor, 100.0, 40.0, 600.0, 0.0);

        assert_eq!(placement, TipPlacement { left: 0.0, top: 45.0, below: true });
    }

    fn rotation() -> impl Strategy<Value = Rotation> {
        prop_oneof![
            Just(Rotation::None),
            Just(Rotation::Quarter),
            Just(Rotation::Half),
            Just(Rotation::ThreeQuarter),
        ]
    }

    proptest! {
        #[test]
        fn reference_round_trip(
            x in 0.0f64..500.0,
            y in 0.0f64..700.0,
            w in 0.5f64..100.0,
            h in 0.5f64..100.0,
            scale in 0.1f64..8.0,
            rotation in rotation(),
            use_pdf_coordinates in any::<bool>(),
        ) {
            let viewport = PageViewport::new(600.0, 800.0, scale).with_rotation(rotation);
            let original = scaled(x, y, x + w, y + h);

            let projected = to_viewport(&original, &viewport, use_pdf_coordinates).unwrap();
            let back = to_reference(&projected, &viewport, use_pdf_coordinates).unwrap();

            assert_scaled_eq(&back, &original);
        }

        #[test]
        fn merge_matches_edge_extremes(
            rects in prop::collection::vec(
                (0.0f64..500.0, 0.0f64..500.0, 0.0f64..50.0, 0.0f64..50.0),
                1..12,
            )
        ) {
            let page_rects: Vec<PageRect> = rects
                .iter()
                .map(|&(l, t, w, h)| PageRect::new(1, Rect::new(l, t, w, h)))
                .collect();
            let merged = merge_rects(&page_rects).unwrap();

            let left = page_rects.iter().map(|r| r.rect.left).fold(f64::INFINITY, f64::min);
            let top = page_rects.iter().map(|r| r.rect.top).fold(f64::INFINITY, f64::min);
            let right = page_rects.iter().map(|r| r.rect.right()).fold(f64::NEG_INFINITY, f64::max);
            let bottom =
                page_rects.iter().map(|r| r.rect.bottom()).fold(f64::NEG_INFINITY, f64::max);

            prop_assert_eq!(merged.rect.left, left);
            prop_assert_eq!(merged.rect.top, top);
            prop_assert!(close(merged.rect.right(), right));
            prop_assert!(close(merged.rect.bottom(), bottom));
        }
    }
}
