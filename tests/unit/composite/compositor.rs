use super::*;

const RED: Rgbw = [255, 0, 0, 0];
const BLUE: Rgbw = [0, 0, 255, 0];

fn g(start: usize, end: usize, color: Rgbw) -> LedColorGroup {
    LedColorGroup::new(start, end, color)
}

#[test]
fn higher_priority_overwrites_lower() {
    let mut layers = PriorityGroups::new();
    layers.insert(5, vec![g(3, 6, BLUE)]);
    layers.insert(1, vec![g(0, 9, RED)]);
    let out = composite(10, &layers);
    assert_eq!(out.groups, vec![g(0, 2, RED), g(3, 6, BLUE), g(7, 9, RED)]);
    assert_eq!(out.clipped_pixels, 0);
}

#[test]
fn equal_priority_later_layer_wins() {
    let mut layers = PriorityGroups::new();
    layers.insert(0, vec![g(0, 4, RED), g(2, 3, BLUE)]);
    let out = composite(5, &layers);
    assert_eq!(out.groups, vec![g(0, 1, RED), g(2, 3, BLUE), g(4, 4, RED)]);
}

#[test]
fn single_pixel_groups_merge_into_runs() {
    let mut layers = PriorityGroups::new();
    layers.insert(0, (0..6).map(|p| g(p, p, RED)).collect());
    assert_eq!(composite(6, &layers).groups, vec![g(0, 5, RED)]);
}

#[test]
fn gaps_split_runs_and_are_not_emitted() {
    let mut layers = PriorityGroups::new();
    layers.insert(0, vec![g(0, 1, RED), g(4, 5, RED)]);
    let out = composite(8, &layers);
    assert_eq!(out.groups, vec![g(0, 1, RED), g(4, 5, RED)]);
    assert!(is_canonical(&out.groups));
}

#[test]
fn out_of_strip_pixels_are_clipped_and_counted() {
    let mut layers = PriorityGroups::new();
    layers.insert(0, vec![g(8, 12, RED), g(20, 21, BLUE)]);
    let out = composite(10, &layers);
    assert_eq!(out.groups, vec![g(8, 9, RED)]);
    assert_eq!(out.clipped_pixels, 5);
}

#[test]
fn canonical_check_rejects_overlap_and_mergeable_neighbors() {
    assert!(is_canonical(&[g(0, 1, RED), g(2, 3, BLUE)]));
    assert!(!is_canonical(&[g(0, 2, RED), g(2, 3, BLUE)]));
    assert!(!is_canonical(&[g(0, 1, RED), g(2, 3, RED)]));
    assert!(!is_canonical(&[g(4, 5, RED), g(0, 1, BLUE)]));
    assert!(is_canonical(&[g(0, 1, RED), g(3, 3, RED)]));
}

#[test]
fn color_at_finds_lit_pixels() {
    let groups = vec![g(0, 1, RED), g(4, 6, BLUE)];
    assert_eq!(color_at(&groups, 1), Some(RED));
    assert_eq!(color_at(&groups, 2), None);
    assert_eq!(color_at(&groups, 6), Some(BLUE));
    assert_eq!(color_at(&groups, 7), None);
}
