//! Property-based tests for the constraint resolver.
//!
//! Uses proptest to verify the allocation invariants with random
//! constraint lists and rectangles.

#![allow(missing_docs)]

use proptest::prelude::*;

use weft_core::layout::{Constraint, LayoutNode, split};
use weft_core::{Grid, Rect, WidgetManager, Widget, Message, Cell};

/// A list of percentages whose sum stays at or below 100.
fn percent_list() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..=40, 1..6).prop_filter("sum <= 100", |v| {
        v.iter().map(|p| u32::from(*p)).sum::<u32>() <= 100
    })
}

/// A list of percentages summing to exactly 100, built from random cut
/// points of the 0..=100 range.
fn full_percent_list() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..=100, 0..4).prop_map(|mut cuts| {
        cuts.push(0);
        cuts.push(100);
        cuts.sort_unstable();
        cuts.windows(2).map(|w| w[1] - w[0]).collect()
    })
}

proptest! {
    /// Percent allocations never exceed the available length.
    #[test]
    fn percent_sum_bounded(total in 1u16..=300, percents in percent_list()) {
        let constraints: Vec<Constraint> =
            percents.iter().map(|p| Constraint::Percent(*p)).collect();
        let sizes = split(total, &constraints);
        let sum: u32 = sizes.iter().map(|s| u32::from(*s)).sum();
        prop_assert!(sum <= u32::from(total));
    }

    /// Percent lists covering the whole axis allocate it exactly.
    #[test]
    fn full_percent_cover_is_exact(total in 1u16..=300, percents in full_percent_list()) {
        let constraints: Vec<Constraint> =
            percents.iter().map(|p| Constraint::Percent(*p)).collect();
        let sizes = split(total, &constraints);
        let sum: u32 = sizes.iter().map(|s| u32::from(*s)).sum();
        prop_assert_eq!(sum, u32::from(total));
    }

    /// Lengths that fit are allocated verbatim.
    #[test]
    fn fitting_lengths_are_exact(lengths in prop::collection::vec(0u16..=30, 1..6)) {
        let total: u32 = lengths.iter().map(|l| u32::from(*l)).sum();
        prop_assume!(total <= u32::from(u16::MAX));
        let constraints: Vec<Constraint> =
            lengths.iter().map(|l| Constraint::Length(*l)).collect();
        let sizes = split(total as u16, &constraints);
        prop_assert_eq!(sizes, lengths);
    }

    /// Ratio allocations fill the remainder, each at least its floor
    /// share, with the rounding leftover on the last entry.
    #[test]
    fn ratios_fill_remainder(total in 1u16..=300, weights in prop::collection::vec(1u32..=9, 1..6)) {
        let constraints: Vec<Constraint> =
            weights.iter().map(|w| Constraint::Ratio(*w)).collect();
        let sizes = split(total, &constraints);
        let sum: u32 = sizes.iter().map(|s| u32::from(*s)).sum();
        prop_assert_eq!(sum, u32::from(total));

        let weight_sum: u64 = weights.iter().map(|w| u64::from(*w)).sum();
        for (i, (size, weight)) in sizes.iter().zip(&weights).enumerate() {
            let floor = (u64::from(total) * u64::from(*weight) / weight_sum) as u16;
            if i + 1 == sizes.len() {
                prop_assert!(*size >= floor);
            } else {
                prop_assert_eq!(*size, floor);
            }
        }
    }

    /// Resolving the same tree and rectangle twice yields equal maps.
    #[test]
    fn resolution_is_idempotent(
        width in 1u16..=200,
        height in 1u16..=100,
        lengths in prop::collection::vec(0u16..=50, 1..5),
    ) {
        let mut tree = LayoutNode::horizontal();
        for (i, len) in lengths.iter().enumerate() {
            tree = tree.child(
                LayoutNode::widget(format!("w{i}")).constraint(Constraint::Length(*len)),
            );
        }
        let area = Rect::new(0, 0, width, height);
        prop_assert_eq!(tree.resolve(area), tree.resolve(area));
    }

    /// Allocated child rectangles stay inside the parent and never
    /// overlap along the split axis.
    #[test]
    fn children_are_disjoint_and_contained(
        width in 1u16..=200,
        constraints in prop::collection::vec(
            prop_oneof![
                (0u16..=60).prop_map(Constraint::Length),
                (0u8..=50).prop_map(Constraint::Percent),
                (1u32..=5).prop_map(Constraint::Ratio),
                Just(Constraint::Flex),
            ],
            1..6,
        ),
    ) {
        let sizes = split(width, &constraints);
        let sum: u32 = sizes.iter().map(|s| u32::from(*s)).sum();
        prop_assert!(sum <= u32::from(width));
    }
}

/// Widget filling its area with one character, for clip properties.
struct Fill(char);

impl Widget for Fill {
    fn id(&self) -> &str {
        "fill"
    }
    fn handle(&mut self, _msg: &Message) {}
    fn render(&self, width: u16, height: u16) -> Grid {
        let mut grid = Grid::new(width, height);
        grid.fill(Cell::plain(self.0));
        grid
    }
}

proptest! {
    /// Cells inside the frame are preserved, cells outside discarded.
    #[test]
    fn composition_clips_at_the_frame(
        frame_w in 1u16..=60,
        frame_h in 1u16..=30,
        widget_w in 1u16..=100,
    ) {
        let mut manager = WidgetManager::new();
        manager.add_widget(Box::new(Fill('#')));
        manager.set_layout(
            LayoutNode::horizontal()
                .child(LayoutNode::widget("fill").constraint(Constraint::Length(widget_w))),
        );
        let frame = manager.compose(frame_w, frame_h);
        prop_assert_eq!(frame.width(), frame_w);
        prop_assert_eq!(frame.height(), frame_h);
        let visible = widget_w.min(frame_w);
        for y in 0..frame_h {
            for x in 0..frame_w {
                let ch = frame.get(x, y).map(|c| c.ch);
                if x < visible {
                    prop_assert_eq!(ch, Some('#'));
                } else {
                    prop_assert_eq!(ch, Some(' '));
                }
            }
        }
    }
}
