use super::*;

fn solid(label: &str) -> ReelImage {
    ReelImage::from_rgba8(label, 1, 1, vec![1, 2, 3, 255]).unwrap()
}

fn filled(n: usize) -> (ImageCollection, Vec<ReelImage>) {
    let images: Vec<_> = (0..n).map(|i| solid(&format!("img{i}"))).collect();
    (ImageCollection::from_images(images.clone()).unwrap(), images)
}

fn order(c: &ImageCollection) -> Vec<ReelImage> {
    c.iter().cloned().collect()
}

#[test]
fn add_stops_at_max() {
    let (mut c, _) = filled(MAX_IMAGES);
    let err = c.add(solid("extra")).unwrap_err();
    assert!(matches!(err, ReelError::CollectionFull { max } if max == MAX_IMAGES));
    assert_eq!(c.len(), MAX_IMAGES);
    assert!(ImageCollection::from_images((0..=MAX_IMAGES).map(|_| solid("x"))).is_err());
}

#[test]
fn remove_returns_image_and_rejects_bad_index() {
    let (mut c, imgs) = filled(3);
    assert_eq!(c.remove(1).unwrap(), imgs[1]);
    assert_eq!(order(&c), vec![imgs[0].clone(), imgs[2].clone()]);
    assert!(matches!(
        c.remove(5),
        Err(ReelError::IndexOutOfRange { index: 5, len: 2 })
    ));
}

#[test]
fn remove_clamps_selection_into_range() {
    let (mut c, _) = filled(3);
    c.select(2).unwrap();
    c.remove(2).unwrap();
    assert_eq!(c.selected(), 1);

    c.remove(1).unwrap();
    assert_eq!(c.selected(), 0);
    c.remove(0).unwrap();
    assert_eq!(c.selected(), 0);
    assert!(c.selected_image().is_none());
}

#[test]
fn remove_after_selection_keeps_selection() {
    let (mut c, imgs) = filled(4);
    c.select(1).unwrap();
    c.remove(3).unwrap();
    assert_eq!(c.selected(), 1);
    assert_eq!(c.selected_image(), Some(&imgs[1]));
}

#[test]
fn remove_before_selection_follows_the_selected_image() {
    let (mut c, imgs) = filled(4);
    c.select(2).unwrap();
    c.remove(0).unwrap();
    assert_eq!(c.selected(), 1);
    assert_eq!(c.selected_image(), Some(&imgs[2]));
}

#[test]
fn removing_the_selected_image_selects_its_successor() {
    let (mut c, imgs) = filled(4);
    c.select(1).unwrap();
    c.remove(1).unwrap();
    assert_eq!(c.selected(), 1);
    assert_eq!(c.selected_image(), Some(&imgs[2]));
}

#[test]
fn reorder_is_noop_at_bounds() {
    let (mut c, imgs) = filled(3);
    assert!(!c.reorder(0, Direction::Left).unwrap());
    assert!(!c.reorder(2, Direction::Right).unwrap());
    assert_eq!(order(&c), imgs);
    assert!(c.reorder(3, Direction::Left).is_err());
}

#[test]
fn reorder_left_then_right_restores_order() {
    let (mut c, imgs) = filled(5);
    for i in 1..5 {
        assert!(c.reorder(i, Direction::Left).unwrap());
        assert_ne!(order(&c), imgs);
        assert!(c.reorder(i - 1, Direction::Right).unwrap());
        assert_eq!(order(&c), imgs);
    }
}

#[test]
fn remove_then_readd_keeps_size() {
    let (mut c, imgs) = filled(4);
    let removed = c.remove(1).unwrap();
    c.add(removed).unwrap();
    assert_eq!(c.len(), 4);
    assert_eq!(
        order(&c),
        vec![imgs[0].clone(), imgs[2].clone(), imgs[3].clone(), imgs[1].clone()]
    );
}

#[test]
fn clear_empties_and_resets_selection() {
    let (mut c, _) = filled(3);
    c.select(2).unwrap();
    c.clear();
    assert!(c.is_empty());
    assert_eq!(c.selected(), 0);
}

#[test]
fn encoding_requires_min_images() {
    let (c, _) = filled(1);
    assert!(matches!(
        c.ensure_ready_for_encoding(),
        Err(ReelError::InsufficientImages { count: 1, min: 2 })
    ));
    let (c, _) = filled(MIN_IMAGES);
    c.ensure_ready_for_encoding().unwrap();
}

#[test]
fn snapshot_is_isolated_from_later_edits() {
    let (mut c, imgs) = filled(3);
    let snap = c.snapshot();
    c.clear();
    assert_eq!(snap.len(), 3);
    assert_eq!(snap.as_slice(), imgs.as_slice());
    assert_eq!(snap.get(2), Some(&imgs[2]));
}
