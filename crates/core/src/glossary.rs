use crate::{Catalog, Role, DEFAULT_SWIPE_THRESHOLD};

/// Role carousel: one slide per catalog entry, each with a picture side and
/// a description side.
#[derive(Debug, Clone)]
pub struct Glossary {
    slides: Vec<Role>,
    index: usize,
    flipped: bool,
    swipe_threshold: u32,
}

impl Glossary {
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            slides: catalog.roles().to_vec(),
            index: 0,
            flipped: false,
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD.unsigned_abs(),
        }
    }

    pub fn with_swipe_threshold(mut self, threshold: i32) -> Self {
        self.swipe_threshold = threshold.unsigned_abs();
        self
    }

    pub fn slides(&self) -> &[Role] {
        &self.slides
    }

    pub fn current(&self) -> Option<&Role> {
        self.slides.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn go_to(&mut self, target: i64) {
        let total = self.slides.len() as i64;
        if total == 0 {
            return;
        }
        let normalized = target.rem_euclid(total) as usize;
        if normalized != self.index {
            self.flipped = false;
        }
        self.index = normalized;
    }

    pub fn next(&mut self) {
        self.go_to(self.index as i64 + 1);
    }

    pub fn prev(&mut self) {
        self.go_to(self.index as i64 - 1);
    }

    pub fn flip(&mut self) {
        self.flipped = true;
    }

    pub fn unflip(&mut self) {
        self.flipped = false;
    }

    pub fn toggle_flip(&mut self) {
        self.flipped = !self.flipped;
    }

    /// Horizontal drag of `delta` pixels: right goes back, left goes forward.
    pub fn swipe(&mut self, delta: i32) {
        if delta.unsigned_abs() <= self.swipe_threshold {
            return;
        }
        if delta > 0 {
            self.prev();
        } else {
            self.next();
        }
    }
}
