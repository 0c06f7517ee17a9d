//! Property-based invariant tests for container area arithmetic.
//!
//! 1. Percent splits tile the input exactly and floor the first half.
//! 2. Fixed splits tile the input exactly.
//! 3. A border shrinks the usable area by exactly one cell per side.
//! 4. A margin of `m` cells leaves `size - m`, clipped at zero.
//! 5. A fitted widget always lies inside the usable area.

use proptest::prelude::*;
use trellis_layout::{
    Fit, HAlign, Rect, SizeLimits, SpacingSides, SplitAxis, SplitSize, VAlign, fit_widget, split,
    usable_area,
};
use trellis_core::geometry::{Sides, Size};

// ── Helpers ─────────────────────────────────────────────────────────────

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (0u16..=200, 0u16..=200, 0u16..=500, 0u16..=500).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn axis_strategy() -> impl Strategy<Value = SplitAxis> {
    prop_oneof![Just(SplitAxis::Horizontal), Just(SplitAxis::Vertical)]
}

fn halign_strategy() -> impl Strategy<Value = HAlign> {
    prop_oneof![Just(HAlign::Left), Just(HAlign::Center), Just(HAlign::Right)]
}

fn valign_strategy() -> impl Strategy<Value = VAlign> {
    prop_oneof![Just(VAlign::Top), Just(VAlign::Middle), Just(VAlign::Bottom)]
}

fn assert_tiles(area: Rect, axis: SplitAxis, a: Rect, b: Rect) -> Result<(), TestCaseError> {
    match axis {
        SplitAxis::Vertical => {
            prop_assert_eq!(a.width + b.width, area.width);
            prop_assert_eq!(a.height, area.height);
            prop_assert_eq!(b.height, area.height);
            prop_assert_eq!(b.x, area.x + a.width);
        }
        SplitAxis::Horizontal => {
            prop_assert_eq!(a.height + b.height, area.height);
            prop_assert_eq!(a.width, area.width);
            prop_assert_eq!(b.width, area.width);
            prop_assert_eq!(b.y, area.y + a.height);
        }
    }
    prop_assert_eq!(a.origin(), area.origin());
    Ok(())
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Percent splits
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn percent_split_tiles_and_floors(
        area in rect_strategy(),
        axis in axis_strategy(),
        p in 1u8..100,
    ) {
        let (a, b) = split(area, axis, SplitSize::Percent(p));
        assert_tiles(area, axis, a, b)?;

        let len = match axis {
            SplitAxis::Vertical => (area.width, a.width),
            SplitAxis::Horizontal => (area.height, a.height),
        };
        let expected = (u32::from(len.0) * u32::from(p) / 100) as u16;
        prop_assert_eq!(len.1, expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Fixed splits
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn fixed_split_tiles(
        area in rect_strategy(),
        axis in axis_strategy(),
        cells in 0u16..600,
        from_end in any::<bool>(),
    ) {
        let size = if from_end { SplitSize::FixedFromEnd(cells) } else { SplitSize::Fixed(cells) };
        let (a, b) = split(area, axis, size);
        assert_tiles(area, axis, a, b)?;
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Border
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn border_shrinks_by_one_per_side(area in rect_strategy()) {
        let none = SpacingSides::default();
        let plain = usable_area(area, &none, false, None);
        prop_assert_eq!(plain.usable, area);

        let bordered = usable_area(area, &none, true, None);
        prop_assert_eq!(bordered.usable.width, area.width.saturating_sub(2));
        prop_assert_eq!(bordered.usable.height, area.height.saturating_sub(2));
        prop_assert!(area.contains_rect(&bordered.usable));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Margin
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn margin_subtracts_and_clips(
        area in rect_strategy(),
        (t, r, b, l) in (0u16..300, 0u16..300, 0u16..300, 0u16..300),
    ) {
        let margin = SpacingSides {
            top: trellis_layout::Spacing::Cells(t),
            right: trellis_layout::Spacing::Cells(r),
            bottom: trellis_layout::Spacing::Cells(b),
            left: trellis_layout::Spacing::Cells(l),
        };
        let areas = usable_area(area, &margin, false, None);
        let sides = Sides::new(t, r, b, l);
        prop_assert_eq!(
            areas.usable.width,
            area.width.saturating_sub(sides.horizontal_sum())
        );
        prop_assert_eq!(
            areas.usable.height,
            area.height.saturating_sub(sides.vertical_sum())
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Fitting
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn fitted_widget_inside_usable(
        usable in rect_strategy(),
        max in (0u16..100, 0u16..100),
        ratio in prop::option::of((1u16..10, 1u16..10)),
        h in halign_strategy(),
        v in valign_strategy(),
    ) {
        let limits = SizeLimits {
            min: Size::new(1, 1),
            max: Size::new(max.0, max.1),
            ratio,
        };
        match fit_widget(usable, &limits, h, v) {
            Fit::Fits(rect) => {
                prop_assert!(usable.contains_rect(&rect));
                prop_assert!(!rect.is_empty());
                if max.0 != 0 {
                    prop_assert!(rect.width <= max.0);
                }
                if max.1 != 0 {
                    prop_assert!(rect.height <= max.1);
                }
            }
            Fit::TooSmall => {}
        }
    }
}
