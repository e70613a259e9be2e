//! Fading position trail drawn behind each drop.
//!
//! The drop keeps a fixed-length history of its positions, newest first.
//! Each frame the history moves down one slot, the current position goes
//! into slot 0, and the companion trail node is redrawn with one segment per
//! adjacent pair of slots.  The trail node itself lives in the
//! [`crate::scene::DropRegistry`] side-table, never on the drop.

use crate::behavior::{Behavior, Host};
use crate::constants::{TRAIL_LENGTH, TRAIL_OPACITY};
use crate::scene::{Scene, Segment, TrailStyle};
use bevy::prelude::*;

#[derive(Component, Debug, Clone, PartialEq)]
pub struct TrailRenderer {
    length: usize,
    pub opacity: f32,
    pub color: Color,
    buffer: Vec<Vec3>,
}

impl Default for TrailRenderer {
    fn default() -> Self {
        Self::new(TRAIL_LENGTH, TRAIL_OPACITY, Color::srgb_u8(0x9C, 0xE3, 0xF9))
    }
}

impl TrailRenderer {
    /// `length` is clamped to at least one slot.
    pub fn new(length: usize, opacity: f32, color: Color) -> Self {
        Self {
            length: length.max(1),
            opacity,
            color,
            buffer: Vec::new(),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Recorded positions, newest first.  Empty until the trail is attached.
    pub fn positions(&self) -> &[Vec3] {
        &self.buffer
    }

    /// Fill every slot with `origin`.
    pub fn reset(&mut self, origin: Vec3) {
        self.buffer.clear();
        self.buffer.resize(self.length, origin);
    }

    /// Drop the oldest slot and put `position` in front.
    pub fn record(&mut self, position: Vec3) {
        if self.buffer.len() != self.length {
            self.reset(position);
            return;
        }
        self.buffer.rotate_right(1);
        self.buffer[0] = position;
    }

    /// `length - 1` segments, newest pair first, each from older to newer.
    pub fn segments(&self) -> Vec<Segment> {
        self.buffer
            .windows(2)
            .map(|pair| Segment {
                start: pair[1],
                end: pair[0],
            })
            .collect()
    }

    pub fn line_color(&self) -> Color {
        self.color.with_alpha(self.opacity)
    }

    pub fn style(&self) -> TrailStyle {
        TrailStyle {
            color: self.line_color(),
        }
    }
}

impl Behavior for TrailRenderer {
    /// Drops from an emitter arrive with the history filled at the spawn
    /// position and the trail node already linked; only fill in what is missing.
    fn on_attach(&mut self, host: &mut Host<'_, '_, '_>) {
        if self.buffer.is_empty() {
            self.reset(host.position);
        }
        if host.scene.trail_of(host.entity).is_none() {
            host.scene.attach_trail(host.entity, self.style());
        }
    }

    fn on_frame(&mut self, host: &mut Host<'_, '_, '_>) {
        self.record(host.position);
        host.scene.redraw_trail(host.entity, self.segments());
    }

    fn on_detach(entity: Entity, scene: &mut Scene<'_, '_>) {
        scene.release_trail(entity);
    }
}
