//! 批量装载 + 批量插入的条目核算
//!
//! 先用STR装载建树,再批量插入一批新点,
//! 验证统计到的数据条目数与插入总量一致。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstar_tree::{RStarTree, Rectangle};

const DIMENSIONS: usize = 4;
const CAPACITY: usize = 128;
const NUM_BULK_LOAD_POINTS: usize = 10_000;
const NUM_BATCH_POINTS: usize = 1_000;
const RANGE_MAX: i32 = 100;

fn generate_random_points(count: usize, id_offset: i32, seed: u64) -> Vec<Rectangle> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let coords: Vec<f32> = (0..DIMENSIONS)
                .map(|_| rng.gen_range(0..=RANGE_MAX) as f32)
                .collect();
            Rectangle::from_point(id_offset + i as i32, coords)
        })
        .collect()
}

#[test]
fn bulk_load_then_batch_insert_accounts_for_every_entry() {
    let mut tree = RStarTree::new(CAPACITY, DIMENSIONS);

    let mut bulk_data = generate_random_points(NUM_BULK_LOAD_POINTS, 0, 0);
    tree.bulk_load(&mut bulk_data);
    assert_eq!(tree.stats().total_data_entries, NUM_BULK_LOAD_POINTS);
    assert_eq!(tree.check_health(), 0);

    let mut batch_data =
        generate_random_points(NUM_BATCH_POINTS, NUM_BULK_LOAD_POINTS as i32, 1);
    tree.batch_insert(&mut batch_data);

    let stats = tree.stats();
    assert_eq!(
        stats.total_data_entries,
        NUM_BULK_LOAD_POINTS + NUM_BATCH_POINTS
    );
    assert_eq!(tree.check_health(), 0);

    // 全空间查询能找回每一条记录
    let everything = Rectangle::new(
        -1,
        vec![0.0; DIMENSIONS],
        vec![RANGE_MAX as f32; DIMENSIONS],
    );
    assert_eq!(
        tree.range_query(&everything).len(),
        NUM_BULK_LOAD_POINTS + NUM_BATCH_POINTS
    );
}

#[test]
fn bulk_load_round_trip_returns_every_point() {
    let data = generate_random_points(2_000, 0, 5);
    let mut tree = RStarTree::new(CAPACITY, DIMENSIONS);
    let mut load = data.clone();
    tree.bulk_load(&mut load);

    for rect in &data {
        let results = tree.range_query(rect);
        assert!(
            results.contains(rect),
            "point query lost record {}",
            rect.id
        );
    }
}

#[test]
fn bulk_load_size_accounting_is_positive_and_bounded() {
    let mut tree = RStarTree::new(CAPACITY, DIMENSIONS);
    let mut data = generate_random_points(NUM_BULK_LOAD_POINTS, 0, 9);
    tree.bulk_load(&mut data);

    let stats = tree.stats();
    assert!(stats.size_bytes > 0);
    // 索引结构的开销远小于数据本体
    assert!(stats.size_bytes < NUM_BULK_LOAD_POINTS * DIMENSIONS * 8);
    assert_eq!(stats.size_bytes, tree.size_bytes());
}
