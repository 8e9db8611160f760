use super::*;

#[test]
fn test_node_flag_values() {
  assert_eq!(NodeFlag::Interior.value(), 1);
  assert_eq!(NodeFlag::Boundary.value(), 2);
  assert_eq!(NodeFlag::Queued.value(), 3);
  assert_eq!(NodeFlag::Done.value(), 4);
}

#[test]
fn test_boundary_class() {
  assert!(!NodeFlag::Interior.is_boundary_class());
  assert!(NodeFlag::Boundary.is_boundary_class());
  assert!(NodeFlag::Queued.is_boundary_class());
  assert!(NodeFlag::Done.is_boundary_class());
}

#[test]
fn test_block_state_ordering() {
  assert!(BlockState::Raw < BlockState::Shaped);
  assert!(BlockState::Shaped < BlockState::Slotted);
  assert!(BlockState::Slotted < BlockState::Linked);
  assert_eq!(BlockState::default(), BlockState::Raw);
  assert_eq!(BlockState::Linked.tag(), 3);
}

#[test]
fn test_block_state_display() {
  assert_eq!(BlockState::Slotted.to_string(), "slotted (2)");
}

#[test]
fn test_load_width_masks() {
  assert_eq!(LoadWidth::Four.mask(), 0b1111);
  assert_eq!(LoadWidth::Two.mask(), 0b0011);
  assert_eq!(LoadWidth::One.mask(), 0b0001);
}

#[test]
fn test_load_width_parse() {
  assert_eq!(LoadWidth::from_groups(4), Some(LoadWidth::Four));
  assert_eq!(LoadWidth::from_groups(2), Some(LoadWidth::Two));
  assert_eq!(LoadWidth::from_groups(1), Some(LoadWidth::One));
  assert_eq!(LoadWidth::from_groups(3), None);
  assert_eq!(LoadWidth::from_groups(0), None);
}

#[test]
fn test_load_width_order_is_by_size() {
  let mut widths = vec![LoadWidth::One, LoadWidth::Four, LoadWidth::Two];
  widths.sort_by(|a, b| b.cmp(a));
  assert_eq!(widths, LoadWidth::ALL.to_vec());
}
