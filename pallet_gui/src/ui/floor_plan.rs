//! Floor plan canvas
//!
//! Draws the loaded warehouse image with one marker per pallet on top of it.
//! The view can be zoomed with the mouse wheel (the point under the cursor
//! stays put) and panned by dragging empty space. Clicking a marker selects
//! its pallet; hovering shows a short description.

use std::path::{Path, PathBuf};

use iced::mouse;
use iced::widget::canvas::{self, Frame, Geometry, Path as CanvasPath, Stroke, Text};
use iced::widget::image;
use iced::{Color, Event, Point, Rectangle, Renderer, Size, Theme, Vector};

use pallet_core::Pallet;

use crate::Message;

/// Wheel zoom factor per notch
pub const ZOOM_STEP: f32 = 1.25;
pub const MIN_ZOOM_LEVEL: i32 = -5;
pub const MAX_ZOOM_LEVEL: i32 = 10;

/// Marker geometry in image pixels: a wide bar crossed by a narrow post.
pub const BAR_SIZE: Size = Size::new(60.0, 30.0);
pub const POST_SIZE: Size = Size::new(20.0, 40.0);

const BAR_COLOR: Color = Color::from_rgb(0.0, 0.2, 0.4);
const POST_COLOR: Color = Color::from_rgb(120.0 / 255.0, 60.0 / 255.0, 20.0 / 255.0);
const HIDDEN_COLOR: Color = Color::from_rgb(0.5, 0.5, 0.5);
const SELECTED_COLOR: Color = Color::from_rgb(1.0, 0.76, 0.03);

/// A background image loaded from disk.
#[derive(Debug, Clone)]
pub struct MapImage {
    pub path: PathBuf,
    pub handle: image::Handle,
    /// Pixel dimensions read from the file header
    pub size: Size,
    /// Bumped on every load so the canvas refits
    pub generation: u64,
}

impl MapImage {
    pub fn load(path: &Path, generation: u64) -> Result<Self, String> {
        let (width, height) = ::image::image_dimensions(path)
            .map_err(|e| format!("Could not read image {}: {}", path.display(), e))?;
        if width == 0 || height == 0 {
            return Err(format!("Image {} is empty", path.display()));
        }
        Ok(MapImage {
            path: path.to_path_buf(),
            handle: image::Handle::from_path(path),
            size: Size::new(width as f32, height as f32),
            generation,
        })
    }
}

/// Mapping between image coordinates and canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Canvas pixels per image pixel
    pub scale: f32,
    /// Canvas position of the image origin
    pub offset: Vector,
    /// Wheel notches applied since the last fit
    pub level: i32,
}

impl Viewport {
    /// Fit `image` inside `bounds`, keeping its aspect ratio, centred.
    pub fn fit(image: Size, bounds: Size) -> Self {
        let scale = if image.width <= 0.0 || image.height <= 0.0 {
            1.0
        } else {
            (bounds.width / image.width).min(bounds.height / image.height)
        };
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        Viewport {
            scale,
            offset: Vector::new(
                (bounds.width - image.width * scale) / 2.0,
                (bounds.height - image.height * scale) / 2.0,
            ),
            level: 0,
        }
    }

    pub fn to_scene(&self, p: Point) -> Point {
        Point::new((p.x - self.offset.x) / self.scale, (p.y - self.offset.y) / self.scale)
    }

    pub fn to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.offset.x, p.y * self.scale + self.offset.y)
    }

    /// Zoom one notch around `anchor` (canvas coordinates). Returns `false`
    /// when the zoom level is already at its limit.
    pub fn zoom_at(&mut self, anchor: Point, zoom_in: bool) -> bool {
        let (level, factor) = if zoom_in {
            (self.level + 1, ZOOM_STEP)
        } else {
            (self.level - 1, 1.0 / ZOOM_STEP)
        };
        if !(MIN_ZOOM_LEVEL..=MAX_ZOOM_LEVEL).contains(&level) {
            return false;
        }
        let scene = self.to_scene(anchor);
        self.level = level;
        self.scale *= factor;
        self.offset = Vector::new(anchor.x - scene.x * self.scale, anchor.y - scene.y * self.scale);
        true
    }

    pub fn pan(&mut self, delta: Vector) {
        self.offset = self.offset + delta;
    }
}

/// The two rectangles of a marker, in image coordinates.
pub fn marker_rects(pallet: &Pallet) -> [Rectangle; 2] {
    let centre = Point::new(pallet.x as f32, pallet.y as f32);
    [centred(centre, BAR_SIZE), centred(centre, POST_SIZE)]
}

fn centred(centre: Point, size: Size) -> Rectangle {
    Rectangle::new(
        Point::new(centre.x - size.width / 2.0, centre.y - size.height / 2.0),
        size,
    )
}

/// Top-most pallet whose marker contains `scene` (image coordinates).
pub fn marker_at(pallets: &[Pallet], scene: Point) -> Option<i64> {
    pallets
        .iter()
        .rev()
        .find(|p| marker_rects(p).iter().any(|r| r.contains(scene)))
        .map(|p| p.id)
}

/// Widget-local interaction state.
#[derive(Debug, Default)]
pub struct Interaction {
    viewport: Option<Viewport>,
    generation: Option<u64>,
    drag_from: Option<Point>,
    hovered: Option<i64>,
}

impl Interaction {
    fn viewport(&mut self, map: &MapImage, bounds: Size) -> &mut Viewport {
        if self.generation != Some(map.generation) || self.viewport.is_none() {
            self.generation = Some(map.generation);
            self.drag_from = None;
            self.hovered = None;
            self.viewport = Some(Viewport::fit(map.size, bounds));
        }
        self.viewport.get_or_insert_with(|| Viewport::fit(map.size, bounds))
    }

    fn current(&self, map: &MapImage, bounds: Size) -> Viewport {
        match self.viewport {
            Some(v) if self.generation == Some(map.generation) => v,
            _ => Viewport::fit(map.size, bounds),
        }
    }
}

/// Canvas program for the floor plan
pub struct FloorPlan<'a> {
    pub map: &'a MapImage,
    pub pallets: &'a [Pallet],
    pub selected: Option<i64>,
}

impl<'a> FloorPlan<'a> {
    pub fn new(map: &'a MapImage, pallets: &'a [Pallet], selected: Option<i64>) -> Self {
        Self { map, pallets, selected }
    }

    fn draw_marker(&self, frame: &mut Frame, viewport: &Viewport, pallet: &Pallet) {
        let (bar_color, post_color) = if pallet.visible {
            (BAR_COLOR, POST_COLOR)
        } else {
            (HIDDEN_COLOR, HIDDEN_COLOR)
        };
        let is_selected = self.selected == Some(pallet.id);

        for (rect, color) in marker_rects(pallet).iter().zip([bar_color, post_color]) {
            let top_left = viewport.to_screen(rect.position());
            let size = Size::new(rect.width * viewport.scale, rect.height * viewport.scale);
            let path = CanvasPath::rectangle(top_left, size);
            frame.fill(&path, color);
            frame.stroke(&path, Stroke::default().with_color(Color::BLACK).with_width(1.0));
        }

        if is_selected {
            let [bar, post] = marker_rects(pallet);
            let outline = bar.union(&post).expand(3.0);
            let top_left = viewport.to_screen(outline.position());
            let size = Size::new(outline.width * viewport.scale, outline.height * viewport.scale);
            frame.stroke(
                &CanvasPath::rectangle(top_left, size),
                Stroke::default().with_color(SELECTED_COLOR).with_width(2.0),
            );
        }
    }

    fn draw_tooltip(&self, frame: &mut Frame, anchor: Point, pallet: &Pallet) {
        let content = pallet.tooltip();
        let lines: Vec<&str> = content.lines().collect();
        let line_height = 14.0;
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as f32 * 7.0 + 12.0;
        let height = lines.len() as f32 * line_height + 8.0;

        // Keep the label inside the canvas
        let mut origin = Point::new(anchor.x + 14.0, anchor.y + 14.0);
        if origin.x + width > frame.width() {
            origin.x = (anchor.x - width - 6.0).max(0.0);
        }
        if origin.y + height > frame.height() {
            origin.y = (anchor.y - height - 6.0).max(0.0);
        }

        let background = CanvasPath::rectangle(origin, Size::new(width, height));
        frame.fill(&background, Color::from_rgba(0.1, 0.1, 0.1, 0.9));
        frame.stroke(&background, Stroke::default().with_color(Color::from_rgb(0.4, 0.4, 0.4)).with_width(1.0));

        for (i, line) in lines.iter().enumerate() {
            frame.fill_text(Text {
                content: line.to_string(),
                position: Point::new(origin.x + 6.0, origin.y + 4.0 + i as f32 * line_height),
                color: Color::WHITE,
                size: iced::Pixels(11.0),
                ..Text::default()
            });
        }
    }
}

impl canvas::Program<Message> for FloorPlan<'_> {
    type State = Interaction;

    fn update(
        &self,
        state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let viewport = *state.viewport(self.map, bounds.size());

        match event {
            Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                let position = cursor.position_in(bounds)?;
                let y = match delta {
                    mouse::ScrollDelta::Lines { y, .. } | mouse::ScrollDelta::Pixels { y, .. } => *y,
                };
                if y == 0.0 {
                    return None;
                }
                let viewport = state.viewport(self.map, bounds.size());
                viewport.zoom_at(position, y > 0.0);
                Some(canvas::Action::request_redraw().and_capture())
            }
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let position = cursor.position_in(bounds)?;
                match marker_at(self.pallets, viewport.to_scene(position)) {
                    Some(id) => Some(canvas::Action::publish(Message::PalletClicked(id)).and_capture()),
                    None => {
                        state.drag_from = Some(position);
                        Some(canvas::Action::capture())
                    }
                }
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                state.drag_from.take().map(|_| canvas::Action::capture())
            }
            Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if let Some(from) = state.drag_from {
                    let Some(position) = cursor.position_in(bounds) else {
                        state.drag_from = None;
                        return None;
                    };
                    state.viewport(self.map, bounds.size()).pan(position - from);
                    state.drag_from = Some(position);
                    return Some(canvas::Action::request_redraw().and_capture());
                }

                let hovered = cursor
                    .position_in(bounds)
                    .and_then(|p| marker_at(self.pallets, viewport.to_scene(p)));
                let changed = hovered != state.hovered;
                state.hovered = hovered;
                // Redraw while hovering so the label follows the cursor
                (changed || hovered.is_some()).then(|| canvas::Action::request_redraw())
            }
            Event::Mouse(mouse::Event::CursorLeft) => {
                state.drag_from = None;
                state.hovered.take().map(|_| canvas::Action::request_redraw())
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let viewport = state.current(self.map, bounds.size());
        let palette = theme.extended_palette();

        frame.fill_rectangle(Point::ORIGIN, bounds.size(), palette.background.weak.color);

        frame.with_clip(Rectangle::with_size(bounds.size()), |frame| {
            let image_bounds = Rectangle::new(
                viewport.to_screen(Point::ORIGIN),
                Size::new(self.map.size.width * viewport.scale, self.map.size.height * viewport.scale),
            );
            frame.draw_image(image_bounds, &self.map.handle);

            for pallet in self.pallets {
                self.draw_marker(frame, &viewport, pallet);
            }

            if state.drag_from.is_none() {
                if let Some(position) = cursor.position_in(bounds) {
                    let hovered = state
                        .hovered
                        .and_then(|id| self.pallets.iter().find(|p| p.id == id));
                    if let Some(pallet) = hovered {
                        self.draw_tooltip(frame, position, pallet);
                    }
                }
            }
        });

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.drag_from.is_some() {
            return mouse::Interaction::Grabbing;
        }
        match cursor.position_in(bounds) {
            Some(_) if state.hovered.is_some() => mouse::Interaction::Pointer,
            Some(_) => mouse::Interaction::Grab,
            None => mouse::Interaction::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pallet(id: i64, x: f64, y: f64) -> Pallet {
        Pallet {
            id,
            length: 1.2,
            width: 0.8,
            height: 1.0,
            position: id,
            quality: "A".to_string(),
            weight: 100.0,
            priority: 0,
            x,
            y,
            visible: true,
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_fit_keeps_aspect_and_centres() {
        let v = Viewport::fit(Size::new(1000.0, 500.0), Size::new(500.0, 500.0));
        assert!(approx(v.scale, 0.5));
        assert!(approx(v.offset.x, 0.0));
        assert!(approx(v.offset.y, 125.0));
        assert_eq!(v.level, 0);
    }

    #[test]
    fn test_screen_scene_roundtrip() {
        let v = Viewport {
            scale: 2.0,
            offset: Vector::new(10.0, -4.0),
            level: 3,
        };
        let p = Point::new(33.0, 71.0);
        let back = v.to_scene(v.to_screen(p));
        assert!(approx(back.x, p.x) && approx(back.y, p.y));
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let mut v = Viewport::fit(Size::new(800.0, 600.0), Size::new(800.0, 600.0));
        let anchor = Point::new(200.0, 150.0);
        let before = v.to_scene(anchor);
        assert!(v.zoom_at(anchor, true));
        let after = v.to_scene(anchor);
        assert!(approx(before.x, after.x) && approx(before.y, after.y));
        assert!(approx(v.scale, 1.25));
    }

    #[test]
    fn test_zoom_level_is_clamped() {
        let mut v = Viewport::fit(Size::new(100.0, 100.0), Size::new(100.0, 100.0));
        let anchor = Point::new(50.0, 50.0);
        for _ in 0..10 {
            assert!(v.zoom_at(anchor, true));
        }
        let scale = v.scale;
        assert!(!v.zoom_at(anchor, true));
        assert_eq!(v.level, MAX_ZOOM_LEVEL);
        assert!(approx(v.scale, scale));

        for _ in 0..15 {
            assert!(v.zoom_at(anchor, false));
        }
        assert!(!v.zoom_at(anchor, false));
        assert_eq!(v.level, MIN_ZOOM_LEVEL);
    }

    #[test]
    fn test_pan_moves_offset() {
        let mut v = Viewport::fit(Size::new(100.0, 100.0), Size::new(100.0, 100.0));
        v.pan(Vector::new(5.0, -3.0));
        assert!(approx(v.offset.x, 5.0) && approx(v.offset.y, -3.0));
    }

    #[test]
    fn test_marker_hit_testing() {
        let pallets = vec![pallet(1, 100.0, 100.0), pallet(2, 300.0, 100.0)];
        // Inside the wide bar
        assert_eq!(marker_at(&pallets, Point::new(128.0, 110.0)), Some(1));
        // Inside the post only (below the bar)
        assert_eq!(marker_at(&pallets, Point::new(305.0, 118.0)), Some(2));
        // Right of the post, below the bar
        assert_eq!(marker_at(&pallets, Point::new(115.0, 118.0)), None);
        assert_eq!(marker_at(&pallets, Point::new(200.0, 100.0)), None);
    }

    #[test]
    fn test_overlapping_markers_pick_topmost() {
        let pallets = vec![pallet(1, 100.0, 100.0), pallet(2, 110.0, 100.0)];
        assert_eq!(marker_at(&pallets, Point::new(105.0, 100.0)), Some(2));
    }

    #[test]
    fn test_marker_rects_are_centred() {
        let [bar, post] = marker_rects(&pallet(1, 50.0, 40.0));
        assert_eq!(bar, Rectangle::new(Point::new(20.0, 25.0), BAR_SIZE));
        assert_eq!(post, Rectangle::new(Point::new(40.0, 20.0), POST_SIZE));
    }
}
