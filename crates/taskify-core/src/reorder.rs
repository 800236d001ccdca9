use tracing::trace;

// Vertical extent of one rendered item, in the same coordinate space as the
// pointer. The dragged item itself must not be among the candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemBox {
    pub top: f64,
    pub height: f64,
}

impl ItemBox {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    fn midpoint_offset(&self, pointer_y: f64) -> f64 {
        pointer_y - self.top - self.height / 2.0
    }
}

// Index of the candidate the dragged item should be inserted before, or
// None when the pointer sits below every candidate's midpoint (append).
//
// Among candidates whose midpoint lies below the pointer (negative offset),
// the one closest to the pointer wins; an exact tie keeps the earlier
// candidate. Linear scan, rerun on every pointer move.
pub fn insertion_anchor(boxes: &[ItemBox], pointer_y: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (index, item) in boxes.iter().enumerate() {
        let offset = item.midpoint_offset(pointer_y);
        trace!(index, offset, "candidate offset");
        if offset >= 0.0 {
            continue;
        }

        match best {
            Some((_, best_offset)) if offset <= best_offset => {}
            _ => best = Some((index, offset)),
        }
    }

    best.map(|(index, _)| index)
}
