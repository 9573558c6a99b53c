/// Horizontal layout of a grouped bar chart: group `i` is centred on `x = i`
/// and its `items` bars share `group_width` of the unit interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarLayout {
    pub groups: usize,
    pub items: usize,
    pub group_width: f64,
}

impl BarLayout {
    pub fn new(groups: usize, items: usize, group_width: f64) -> BarLayout {
        BarLayout {
            groups,
            items,
            group_width,
        }
    }

    pub fn item_width(&self) -> f64 {
        self.group_width / self.items.max(1) as f64
    }

    /// Centre of the bar for item `item` in group `group`.
    pub fn x(&self, group: usize, item: usize) -> f64 {
        let item_width = self.item_width();
        let base = group as f64 - self.group_width / 2.0;
        base + item as f64 * item_width + item_width / 2.0
    }

    /// Left and right edge of the same bar the markers are centred on.
    pub fn span(&self, group: usize, item: usize) -> (f64, f64) {
        let centre = self.x(group, item);
        let half = self.item_width() / 2.0;
        (centre - half, centre + half)
    }

    /// One x-coordinate per group for the given item column.
    pub fn positions(&self, item: usize) -> Vec<f64> {
        (0..self.groups).map(|group| self.x(group, item)).collect()
    }

    /// Extent of the x axis with half a unit of padding around the outer groups.
    pub fn x_range(&self) -> (f64, f64) {
        (-0.5, self.groups.max(1) as f64 - 0.5)
    }
}

#[cfg(test)]
const EPS: f64 = 1e-12;

#[test]
fn two_items_split_the_group() {
    let layout = BarLayout::new(2, 2, 0.8);
    assert!((layout.item_width() - 0.4).abs() < EPS);
    assert!((layout.x(0, 0) - -0.2).abs() < EPS);
    assert!((layout.x(0, 1) - 0.2).abs() < EPS);
    assert!((layout.x(1, 1) - 1.2).abs() < EPS);
    assert_eq!(layout.positions(1).len(), 2);
}

#[test]
fn single_item_sits_on_group_index() {
    let layout = BarLayout::new(3, 1, 0.8);
    for group in 0..3 {
        assert!((layout.x(group, 0) - group as f64).abs() < EPS);
    }
    let (left, right) = layout.span(2, 0);
    assert!((left - 1.6).abs() < EPS);
    assert!((right - 2.4).abs() < EPS);
}

#[test]
fn groups_are_symmetric_and_recomputable() {
    for items in 1..=7 {
        let layout = BarLayout::new(10, items, 0.8);
        for group in 0..10 {
            let first = layout.x(group, 0) - group as f64;
            let last = layout.x(group, items - 1) - group as f64;
            assert!((first + last).abs() < 1e-9, "items={} group={}", items, group);
            assert_eq!(layout.x(group, items - 1), layout.x(group, items - 1));
        }
    }
}

#[test]
fn bars_tile_the_group_width() {
    let layout = BarLayout::new(1, 5, 0.8);
    let (left, _) = layout.span(0, 0);
    let (_, right) = layout.span(0, 4);
    assert!((right - left - 0.8).abs() < 1e-9);
    for item in 1..5 {
        let (_, prev_right) = layout.span(0, item - 1);
        let (next_left, _) = layout.span(0, item);
        assert!((next_left - prev_right).abs() < 1e-9);
    }
}
