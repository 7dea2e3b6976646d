// src/input/gesture.rs

use std::time::{Duration, Instant};

use super::{AnswerInputChannel, InputDeviceFailure, KEYBOARD_ROWS, SPECIAL_KEYS};

/// Landmark indices in the 21-point hand model.
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;

/// Thumb-to-index distance (normalized units) that counts as a pinch.
pub const PINCH_THRESHOLD: f32 = 0.05;

/// Minimum time between two selections.
pub const SELECT_COOLDOWN: Duration = Duration::from_millis(600);

/// A landmark position, normalized to `[0, 1]` over the video frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// An axis-aligned rectangle in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Edges count as inside.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }

    /// Maps a normalized point inside this rectangle to page coordinates.
    pub fn project(&self, point: Point) -> (f32, f32) {
        (
            self.left + point.x * self.width,
            self.top + point.y * self.height,
        )
    }
}

/// One on-screen key and where it is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyRegion {
    pub label: String,
    pub bounds: Rect,
}

/// The two fingertips the gesture keyboard tracks in one video frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandFrame {
    pub index_tip: Point,
    pub thumb_tip: Point,
}

impl HandFrame {
    /// Picks the fingertips out of a full landmark list.
    pub fn from_landmarks(landmarks: &[Point]) -> Option<Self> {
        Some(Self {
            index_tip: *landmarks.get(INDEX_TIP)?,
            thumb_tip: *landmarks.get(THUMB_TIP)?,
        })
    }

    pub fn pinch_distance(&self) -> f32 {
        self.index_tip.distance(self.thumb_tip)
    }
}

/// Lays the virtual keyboard out as equal-width rows inside `area`: the three
/// letter rows, then one row with the editing keys.
pub fn layout_keyboard(area: Rect) -> Vec<KeyRegion> {
    let rows: Vec<Vec<&'static str>> = KEYBOARD_ROWS
        .into_iter()
        .map(|row| (0..row.len()).map(|i| &row[i..i + 1]).collect())
        .chain(std::iter::once(SPECIAL_KEYS.to_vec()))
        .collect();

    let row_height = area.height / rows.len() as f32;
    let mut regions = Vec::new();

    for (r, labels) in rows.iter().enumerate() {
        let key_width = area.width / labels.len() as f32;
        for (k, label) in labels.iter().enumerate() {
            regions.push(KeyRegion {
                label: (*label).to_string(),
                bounds: Rect::new(
                    area.left + k as f32 * key_width,
                    area.top + r as f32 * row_height,
                    key_width,
                    row_height,
                ),
            });
        }
    }

    regions
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureStatus {
    Ready,
    Disabled(InputDeviceFailure),
}

/// Turns hand-landmark frames into key activations.
///
/// The index fingertip selects the hovered key; pinching thumb and index
/// together over a key activates it, at most once per cooldown.
pub struct GestureKeyboard {
    video: Rect,
    keys: Vec<KeyRegion>,
    pinch_threshold: f32,
    cooldown: Duration,
    last_select: Option<Instant>,
    status: GestureStatus,
}

impl GestureKeyboard {
    /// `video` is where the camera image is drawn on the page; landmark
    /// coordinates are relative to it.
    pub fn new(video: Rect, keys: Vec<KeyRegion>) -> Self {
        Self {
            video,
            keys,
            pinch_threshold: PINCH_THRESHOLD,
            cooldown: SELECT_COOLDOWN,
            last_select: None,
            status: GestureStatus::Ready,
        }
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn status(&self) -> &GestureStatus {
        &self.status
    }

    pub fn is_enabled(&self) -> bool {
        self.status == GestureStatus::Ready
    }

    pub fn status_message(&self) -> String {
        match &self.status {
            GestureStatus::Ready => "Gesture keyboard ready - focus a question, move your index finger over keys and pinch to type.".to_string(),
            GestureStatus::Disabled(failure) => failure.to_string(),
        }
    }

    /// Stops reacting to frames after a camera or detector failure.
    pub fn disable(&mut self, failure: InputDeviceFailure) {
        tracing::warn!("{}", failure);
        self.status = GestureStatus::Disabled(failure);
    }

    /// The key under the index fingertip. Overlapping keys resolve to the one
    /// listed last.
    pub fn hovered_key(&self, frame: &HandFrame) -> Option<&KeyRegion> {
        let (x, y) = self.video.project(frame.index_tip);
        self.keys
            .iter()
            .rev()
            .find(|key| key.bounds.contains(x, y))
    }

    /// Processes one detector result. `None` means no hand was found.
    ///
    /// Returns the label of the key activated on `channel`, if any. A key the
    /// channel refuses does not start the cooldown.
    pub fn on_frame<C>(&mut self, frame: Option<&HandFrame>, now: Instant, channel: &C) -> Option<String>
    where
        C: AnswerInputChannel + ?Sized,
    {
        if !self.is_enabled() {
            return None;
        }

        let frame = frame?;
        if frame.pinch_distance() >= self.pinch_threshold {
            return None;
        }

        let cooling_down = self
            .last_select
            .is_some_and(|last| now.saturating_duration_since(last) <= self.cooldown);
        if cooling_down {
            return None;
        }

        let label = self.hovered_key(frame)?.label.clone();
        if !channel.activate_key(&label) {
            tracing::debug!("Gesture key {} refused", label);
            return None;
        }
        self.last_select = Some(now);
        tracing::debug!("Gesture selected key {}", label);
        Some(label)
    }
}
