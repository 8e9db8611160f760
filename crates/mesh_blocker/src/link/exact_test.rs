use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::link::greedy::pack_greedy;

fn catalogue(groups: &[u8]) -> LoadCatalogue {
  LoadCatalogue::from_groups(groups).unwrap()
}

fn random_case(rng: &mut StdRng) -> (Vec<u8>, LoadCatalogue) {
  let row_count = rng.random_range(1..=6);
  let rows: Vec<u8> = (0..row_count).map(|_| rng.random_range(0..16u8)).collect();

  let slot_count = rng.random_range(1..=8);
  let mut widths: Vec<LoadWidth> = (0..slot_count)
    .map(|_| LoadWidth::ALL[rng.random_range(0..3)])
    .collect();
  widths.sort_by(|a, b| b.cmp(a));
  (rows, LoadCatalogue::new(widths).unwrap())
}

#[test]
fn test_exact_full_row() {
  let mut map = ConnectivityMap::from_rows(vec![0b1111], 1);
  assert_eq!(
    pack_exact(&mut map, &catalogue(&[4])),
    Some(vec![Placement::new(0, 0, LoadWidth::Four)])
  );
  assert!(map.is_clear());
}

/// The densest row is tried first; a dead end backtracks to the next one.
#[test]
fn test_exact_backtracks() {
  let mut map = ConnectivityMap::from_rows(vec![0b0011, 0b1001], 1);
  let placements = pack_exact(&mut map, &catalogue(&[4, 2])).unwrap();
  assert_eq!(
    placements,
    vec![
      Placement::new(1, 0, LoadWidth::Four),
      Placement::new(0, 0, LoadWidth::Two),
    ]
  );
  assert!(map.is_clear());
}

#[test]
fn test_exact_failure_restores_map() {
  let rows = vec![0b1111, 0b1111];
  let mut map = ConnectivityMap::from_rows(rows.clone(), 2);
  assert_eq!(pack_exact(&mut map, &catalogue(&[4])), None);
  assert_eq!(map.rows(), rows.as_slice());

  let rows = vec![0b1001];
  let mut map = ConnectivityMap::from_rows(rows.clone(), 1);
  assert_eq!(pack_exact(&mut map, &catalogue(&[2])), None);
  assert_eq!(map.rows(), rows.as_slice());
}

#[test]
fn test_exact_empty_map() {
  let mut map = ConnectivityMap::new(2, 4);
  assert_eq!(pack_exact(&mut map, &catalogue(&[4])), Some(vec![]));
}

/// Seeded random bitmaps: the exact packer succeeds whenever the greedy one
/// does, its placements clear the original rows, and failures change nothing.
#[test]
fn test_exact_random_bitmaps() {
  let mut rng = StdRng::seed_from_u64(0x5eed_b10c);

  for case in 0..500 {
    let (rows, catalogue) = random_case(&mut rng);

    let mut greedy_map = ConnectivityMap::from_rows(rows.clone(), 1);
    let greedy = pack_greedy(&mut greedy_map, &catalogue);

    let mut exact_map = ConnectivityMap::from_rows(rows.clone(), 1);
    let exact = pack_exact(&mut exact_map, &catalogue);

    if greedy.is_some() {
      assert!(exact.is_some(), "case {}: greedy packed {:?} but exact failed", case, rows);
    }

    match exact {
      Some(placements) => {
        assert!(exact_map.is_clear(), "case {}", case);
        let mut replay = rows.clone();
        for (slot, placement) in placements.iter().enumerate() {
          assert_eq!(Some(placement.width), catalogue.get(slot), "case {}", case);
          assert_ne!(replay[placement.row] & placement.mask(), 0, "case {}: empty load", case);
          replay[placement.row] &= !placement.mask();
        }
        assert!(replay.iter().all(|&r| r == 0), "case {}: {:?} left {:?}", case, rows, replay);
      }
      None => assert_eq!(exact_map.rows(), rows.as_slice(), "case {}", case),
    }
  }
}
