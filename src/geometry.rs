/// Rendered size of a region in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn halved_width(&self) -> (u32, u32) {
        split_even(self.width)
    }
}

/// Split a length in two, the first half rounded down.
pub fn split_even(length: u32) -> (u32, u32) {
    let first = length / 2;
    (first, length - first)
}
