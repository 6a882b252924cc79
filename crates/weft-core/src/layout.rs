//! Layout tree and constraint resolver.
//!
//! A layout is a tree of horizontal/vertical nodes whose leaves name
//! widgets. Resolving the tree against a rectangle assigns each leaf a
//! sub-rectangle according to its constraint.

use std::collections::{HashMap, VecDeque};

use crate::error::{Result, WeftError};
use crate::geometry::Rect;

/// Direction of an interior layout node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    /// Stack children left to right.
    #[default]
    Horizontal,
    /// Stack children top to bottom.
    Vertical,
}

/// Constraint for a layout node along its parent's axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constraint {
    /// Exactly `n` cells, clipped to what is available.
    Length(u16),
    /// `floor(available * p / 100)` cells, `p` in `0..=100`.
    Percent(u8),
    /// A `r / sum-of-weights` share of the space left after fixed
    /// allocations, `r > 0`.
    Ratio(u32),
    /// At least `n` cells (allocated as `n`, clipped to available).
    Min(u16),
    /// At most `n` cells (allocated as `n`, clipped to available).
    Max(u16),
    /// An equal share of the leftover among flexible siblings.
    Flex,
}

impl Constraint {
    /// Whether this constraint takes part in leftover distribution.
    fn is_flexible(self) -> bool {
        matches!(self, Constraint::Ratio(_) | Constraint::Flex)
    }

    /// Distribution weight of a flexible constraint (0 for fixed ones).
    fn weight(self) -> u64 {
        match self {
            Constraint::Ratio(r) => u64::from(r),
            Constraint::Flex => 1,
            _ => 0,
        }
    }

    /// Validate constructor arguments.
    fn check(self) -> Result<()> {
        match self {
            Constraint::Percent(p) if p > 100 => Err(WeftError::Build(format!(
                "Percent({p}) is out of range, percentages must be 0..=100"
            ))),
            Constraint::Ratio(0) => Err(WeftError::Build(
                "Ratio(0) is invalid, ratio weights must be positive".into(),
            )),
            _ => Ok(()),
        }
    }
}

/// Split a length into per-constraint sizes.
///
/// Fixed constraints (`Length`, `Percent`, `Min`, `Max`) are allocated
/// first, in list order; when they over-allocate, later entries collapse
/// to zero rather than clipping earlier ones. The remainder is then
/// split across `Ratio` and `Flex` entries in proportion to their
/// weights, with the rounding leftover assigned to the last flexible
/// entry. A list of percentages covering the whole axis (summing to
/// exactly 100) also keeps its rounding leftover: the last entry
/// absorbs it, so the allocations fill the axis exactly.
pub fn split(total: u16, constraints: &[Constraint]) -> Vec<u16> {
    let mut sizes = vec![0u16; constraints.len()];
    let mut remaining = total;

    // Fixed allocations, in list order.
    for (i, c) in constraints.iter().enumerate() {
        let want = match *c {
            Constraint::Length(n) | Constraint::Min(n) | Constraint::Max(n) => n,
            Constraint::Percent(p) => ((u32::from(total) * u32::from(p)) / 100) as u16,
            Constraint::Ratio(_) | Constraint::Flex => continue,
        };
        let got = want.min(remaining);
        sizes[i] = got;
        remaining -= got;
    }

    // Leftover distribution across flexible entries.
    let total_weight: u64 = constraints.iter().map(|c| c.weight()).sum();
    if total_weight == 0 {
        if remaining > 0 && full_percent_cover(constraints) {
            if let Some(last) = sizes.last_mut() {
                *last += remaining;
            }
        }
        return sizes;
    }
    let mut distributed = 0u16;
    let mut last_flexible = None;
    for (i, c) in constraints.iter().enumerate() {
        if !c.is_flexible() {
            continue;
        }
        let share = (u64::from(remaining) * c.weight() / total_weight) as u16;
        sizes[i] = share;
        distributed += share;
        last_flexible = Some(i);
    }
    if let Some(i) = last_flexible {
        sizes[i] += remaining - distributed;
    }
    sizes
}

/// True when every constraint is a percentage and they sum to 100.
fn full_percent_cover(constraints: &[Constraint]) -> bool {
    if constraints.is_empty() {
        return false;
    }
    let mut sum = 0u32;
    for c in constraints {
        match c {
            Constraint::Percent(p) => sum += u32::from(*p),
            _ => return false,
        }
    }
    sum == 100
}

/// A node in the layout tree.
///
/// A node is a leaf iff it names a widget and has no children; interior
/// nodes stack their children along [`Direction`].
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutNode {
    constraint: Constraint,
    direction: Direction,
    widget: Option<String>,
    children: Vec<LayoutNode>,
}

impl LayoutNode {
    /// Create an interior node that stacks children left to right.
    pub fn horizontal() -> Self {
        Self {
            constraint: Constraint::Flex,
            direction: Direction::Horizontal,
            widget: None,
            children: Vec::new(),
        }
    }

    /// Create an interior node that stacks children top to bottom.
    pub fn vertical() -> Self {
        Self {
            constraint: Constraint::Flex,
            direction: Direction::Vertical,
            widget: None,
            children: Vec::new(),
        }
    }

    /// Create a leaf node bound to a widget id.
    pub fn widget(id: impl Into<String>) -> Self {
        Self {
            constraint: Constraint::Flex,
            direction: Direction::Horizontal,
            widget: Some(id.into()),
            children: Vec::new(),
        }
    }

    /// Set this node's constraint.
    #[must_use]
    pub fn constraint(mut self, c: Constraint) -> Self {
        self.constraint = c;
        self
    }

    /// Append a child node.
    #[must_use]
    pub fn child(mut self, node: LayoutNode) -> Self {
        self.children.push(node);
        self
    }

    /// Returns true if this node is a widget leaf.
    pub fn is_leaf(&self) -> bool {
        self.widget.is_some() && self.children.is_empty()
    }

    /// The widget id of a leaf node.
    pub fn widget_id(&self) -> Option<&str> {
        self.widget.as_deref()
    }

    /// Validate the whole tree.
    ///
    /// Rejects out-of-range constraint arguments and nodes that both
    /// name a widget and carry children.
    pub fn validate(&self) -> Result<()> {
        self.constraint.check()?;
        if self.widget.is_some() && !self.children.is_empty() {
            return Err(WeftError::Build(format!(
                "layout node for widget {:?} cannot have children",
                self.widget.as_deref().unwrap_or_default()
            )));
        }
        for child in &self.children {
            child.validate()?;
        }
        Ok(())
    }

    /// All widget ids at the leaves, breadth-first, left to right.
    pub fn leaf_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        let mut queue = VecDeque::from([self]);
        while let Some(node) = queue.pop_front() {
            if let Some(id) = &node.widget {
                ids.push(id.clone());
            }
            queue.extend(node.children.iter());
        }
        ids
    }

    /// Resolve the tree against a rectangle, producing the rectangle
    /// assigned to each widget leaf.
    ///
    /// Children are positioned contiguously from the origin edge in
    /// list order and receive the full extent on the orthogonal axis.
    /// Resolution is pure: resolving the same tree and rectangle twice
    /// yields equal maps.
    pub fn resolve(&self, area: Rect) -> HashMap<String, Rect> {
        let mut out = HashMap::new();
        self.resolve_into(area, &mut out);
        out
    }

    fn resolve_into(&self, area: Rect, out: &mut HashMap<String, Rect>) {
        if let Some(id) = &self.widget {
            out.insert(id.clone(), area);
            return;
        }
        if self.children.is_empty() {
            return;
        }
        let total = match self.direction {
            Direction::Horizontal => area.width,
            Direction::Vertical => area.height,
        };
        let constraints: Vec<Constraint> = self.children.iter().map(|c| c.constraint).collect();
        let sizes = split(total, &constraints);
        let mut offset = 0u16;
        for (child, size) in self.children.iter().zip(sizes) {
            let rect = match self.direction {
                Direction::Horizontal => {
                    Rect::new(area.x.saturating_add(offset), area.y, size, area.height)
                }
                Direction::Vertical => {
                    Rect::new(area.x, area.y.saturating_add(offset), area.width, size)
                }
            };
            child.resolve_into(rect, out);
            offset = offset.saturating_add(size);
        }
    }
}
