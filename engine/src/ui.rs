//! Layout rectangles in surface pixel space.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_size(w: u32, h: u32) -> Self {
        Self { x: 0, y: 0, w, h }
    }

    pub fn size(&self) -> Size {
        Size {
            w: self.w,
            h: self.h,
        }
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    pub fn center(&self) -> (u32, u32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Signed containment test; pointer coordinates may be negative outside the window.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        let (px, py) = (px as i64, py as i64);
        px >= self.x as i64
            && px < self.right() as i64
            && py >= self.y as i64
            && py < self.bottom() as i64
    }

    /// The inner content area; saturates to an empty rect when insets exceed the size.
    pub fn inset(&self, insets: Insets) -> Self {
        Self {
            x: self.x.saturating_add(insets.left),
            y: self.y.saturating_add(insets.top),
            w: self
                .w
                .saturating_sub(insets.left.saturating_add(insets.right)),
            h: self
                .h
                .saturating_sub(insets.top.saturating_add(insets.bottom)),
        }
    }

    /// Places a child of `size` inside this rect at `anchor`, clamping the child to fit.
    pub fn place(&self, size: Size, anchor: Anchor) -> Self {
        let w = size.w.min(self.w);
        let h = size.h.min(self.h);
        let free_w = self.w - w;
        let free_h = self.h - h;

        let x = match anchor {
            Anchor::TopLeft | Anchor::BottomLeft => self.x,
            Anchor::TopCenter | Anchor::Center | Anchor::BottomCenter => self.x + free_w / 2,
        };
        let y = match anchor {
            Anchor::TopLeft | Anchor::TopCenter => self.y,
            Anchor::Center => self.y + free_h / 2,
            Anchor::BottomLeft | Anchor::BottomCenter => self.y + free_h,
        };

        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    pub fn square(side: u32) -> Self {
        Self { w: side, h: side }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insets {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Insets {
    pub const ZERO: Insets = Insets {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    pub fn symmetric(horizontal: u32, vertical: u32) -> Self {
        Self {
            left: horizontal,
            top: vertical,
            right: horizontal,
            bottom: vertical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopCenter,
    Center,
    BottomLeft,
    BottomCenter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_handles_negative_pointer_positions() {
        let r = Rect::new(0, 0, 10, 10);
        assert!(r.contains(0, 9));
        assert!(!r.contains(-1, 5));
        assert!(!r.contains(10, 5));
    }

    #[test]
    fn symmetric_inset_shrinks_both_axes() {
        let inner = Rect::from_size(800, 600).inset(Insets::symmetric(40, 20));
        assert_eq!(inner, Rect::new(40, 20, 720, 560));
    }

    #[test]
    fn place_center_and_bottom_center() {
        let parent = Rect::from_size(100, 100);
        assert_eq!(
            parent.place(Size::new(20, 10), Anchor::Center),
            Rect::new(40, 45, 20, 10)
        );
        assert_eq!(
            parent.place(Size::new(20, 10), Anchor::BottomCenter),
            Rect::new(40, 90, 20, 10)
        );
    }

    #[test]
    fn place_clamps_oversized_child() {
        let parent = Rect::new(5, 5, 50, 40);
        assert_eq!(
            parent.place(Size::square(999), Anchor::TopLeft),
            Rect::new(5, 5, 50, 40)
        );
    }
}
