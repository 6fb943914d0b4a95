//! R*-tree 演示与基准程序
//!
//! 对同一份数据集分别用三种建树策略构建索引:
//! 1. 逐条插入(R*插入,带强制重插)
//! 2. 批量插入(整叶打包挂载)
//! 3. STR批量装载
//!
//! 每种策略计时建树,跑同一批窗口查询,可选与线性扫描交叉验证,
//! 最后打印树的统计信息。数据来源是流文件(-s)或固定种子的随机点。

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstar_tree::{read_stream_file, RStarTree, Rectangle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

/// 数据空间每一维的最大坐标
const SPACE_MAX: i32 = 100_000;

#[derive(Parser, Debug)]
#[command(
    name = "rstar-bench",
    about = "R*-tree demo: build strategies, window queries and validation",
    long_about = "Builds an R*-tree over random or stream-file data with three \
different construction strategies, runs a window-query workload over each tree \
and optionally cross-checks every result set against a brute-force linear scan."
)]
struct Args {
    /// Number of data points to insert
    #[arg(short = 'n', long = "numData", default_value_t = 10_000)]
    num_data: usize,

    /// Number of range queries to perform
    #[arg(short = 'q', long = "numQueries", default_value_t = 1_000)]
    num_queries: usize,

    /// Dimensionality of the data
    #[arg(short = 'd', long = "dimension", default_value_t = 2)]
    dimension: usize,

    /// Node capacity of the R*-tree
    #[arg(short = 'c', long = "capacity", default_value_t = 128)]
    capacity: usize,

    /// Enable brute-force validation of query results
    #[arg(short = 'v', long = "validate")]
    validate: bool,

    /// Stream file to read instead of generating random data
    #[arg(short = 's', long = "stream")]
    stream: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> rstar_tree::Result<()> {
    let data = match &args.stream {
        Some(path) => {
            let points = read_stream_file(path)?;
            info!("Read {} points from {}", points.len(), path.display());
            points
        }
        None => generate_random_points(args.num_data, args.dimension, 0),
    };

    if data.is_empty() {
        return Err("no data points available".into());
    }

    let mut rng = StdRng::seed_from_u64(0);
    let queries = generate_queries(&data, args.num_queries, args.dimension, &mut rng);

    println!("*Test: Insertion*");
    let mut tree = RStarTree::new(args.capacity, args.dimension);
    let start = Instant::now();
    for rect in &data {
        tree.insert(rect.clone());
    }
    println!("Insertion time: {:.3} s", start.elapsed().as_secs_f64());
    run_queries(&tree, &data, &queries, args.validate)?;
    report(&tree);

    println!("*Test: Batch insertion*");
    let mut tree = RStarTree::new(args.capacity, args.dimension);
    let mut batch = data.clone();
    let start = Instant::now();
    tree.batch_insert(&mut batch);
    println!("Insertion time: {:.3} s", start.elapsed().as_secs_f64());
    run_queries(&tree, &data, &queries, args.validate)?;
    report(&tree);

    println!("*Test: Bulk loading*");
    let mut tree = RStarTree::new(args.capacity, args.dimension);
    let mut bulk = data.clone();
    let start = Instant::now();
    tree.bulk_load(&mut bulk);
    println!("Insertion time: {:.3} s", start.elapsed().as_secs_f64());
    run_queries(&tree, &data, &queries, args.validate)?;
    report(&tree);

    println!();
    println!("✅ Benchmark completed.");
    Ok(())
}

/// 用固定种子生成整数坐标的随机点
fn generate_random_points(count: usize, dimensions: usize, seed: u64) -> Vec<Rectangle> {
    let mut rng = StdRng::seed_from_u64(seed);

    (0..count)
        .map(|i| {
            let coords: Vec<f32> = (0..dimensions)
                .map(|_| rng.gen_range(0..SPACE_MAX) as f32)
                .collect();
            Rectangle::from_point(i as i32, coords)
        })
        .collect()
}

/// 生成查询窗口
///
/// 二维数据沿用密度网格策略:80%的窗口锚在有数据的网格单元上,
/// 其余随机。高维数据退化为覆盖每维最多20%范围的均匀随机窗口。
fn generate_queries(
    data: &[Rectangle],
    count: usize,
    dimensions: usize,
    rng: &mut StdRng,
) -> Vec<Rectangle> {
    let mut mins = vec![f32::INFINITY; dimensions];
    let mut maxs = vec![f32::NEG_INFINITY; dimensions];
    for rect in data {
        for d in 0..dimensions {
            mins[d] = mins[d].min(rect.min[d]);
            maxs[d] = maxs[d].max(rect.max[d]);
        }
    }
    let ranges: Vec<f32> = mins
        .iter()
        .zip(&maxs)
        .map(|(lo, hi)| (hi - lo).max(1.0))
        .collect();

    println!(
        "Data range: {:?} to {:?}",
        &mins[..dimensions.min(2)],
        &maxs[..dimensions.min(2)]
    );

    if dimensions == 2 {
        generate_density_queries(data, count, &mins, &ranges, rng)
    } else {
        (0..count)
            .map(|_| {
                let mut query_min = Vec::with_capacity(dimensions);
                let mut query_max = Vec::with_capacity(dimensions);
                for d in 0..dimensions {
                    let size = ranges[d] * 0.2 * rng.gen::<f32>();
                    let lo = mins[d] + rng.gen::<f32>() * (ranges[d] - size);
                    query_min.push(lo);
                    query_max.push(lo + size);
                }
                Rectangle::new(-1, query_min, query_max)
            })
            .collect()
    }
}

/// 二维密度网格查询生成
///
/// 把数据空间切成10x10的网格,统计每格的数据量;大部分查询窗口
/// 覆盖一个非空网格单元及其邻域,避免查询全落在空白区域。
fn generate_density_queries(
    data: &[Rectangle],
    count: usize,
    mins: &[f32],
    ranges: &[f32],
    rng: &mut StdRng,
) -> Vec<Rectangle> {
    const GRID_SIZE: usize = 10;

    let mut density = vec![vec![0usize; GRID_SIZE]; GRID_SIZE];
    for rect in data {
        let gx = (((rect.min[0] - mins[0]) / ranges[0] * GRID_SIZE as f32) as usize)
            .min(GRID_SIZE - 1);
        let gy = (((rect.min[1] - mins[1]) / ranges[1] * GRID_SIZE as f32) as usize)
            .min(GRID_SIZE - 1);
        density[gx][gy] += 1;
    }

    let cells: Vec<(usize, usize)> = (0..GRID_SIZE)
        .flat_map(|i| (0..GRID_SIZE).map(move |j| (i, j)))
        .filter(|&(i, j)| density[i][j] > 0)
        .collect();

    println!("Found {} grid cells with data points", cells.len());

    let cell_w = ranges[0] / GRID_SIZE as f32;
    let cell_h = ranges[1] / GRID_SIZE as f32;

    (0..count)
        .map(|_| {
            if !cells.is_empty() && rng.gen_range(0..100) < 80 {
                // 锚定在一个有数据的网格单元,窗口覆盖该单元加一些邻域
                let (gx, gy) = cells[rng.gen_range(0..cells.len())];
                let min_x = mins[0] + gx as f32 * cell_w;
                let min_y = mins[1] + gy as f32 * cell_h;
                let max_x = min_x + cell_w * (1 + rng.gen_range(0..3)) as f32;
                let max_y = min_y + cell_h * (1 + rng.gen_range(0..3)) as f32;
                Rectangle::new(-1, vec![min_x, min_y], vec![max_x, max_y])
            } else {
                let size_x = ranges[0] * 0.2 * rng.gen::<f32>();
                let size_y = ranges[1] * 0.2 * rng.gen::<f32>();
                let min_x = mins[0] + rng.gen::<f32>() * (ranges[0] - size_x);
                let min_y = mins[1] + rng.gen::<f32>() * (ranges[1] - size_y);
                Rectangle::new(-1, vec![min_x, min_y], vec![min_x + size_x, min_y + size_y])
            }
        })
        .collect()
}

/// 跑查询负载,可选与线性扫描交叉验证
fn run_queries(
    tree: &RStarTree,
    data: &[Rectangle],
    queries: &[Rectangle],
    validate: bool,
) -> rstar_tree::Result<()> {
    let mut tree_time = Duration::ZERO;
    let mut scan_time = Duration::ZERO;

    for query in queries {
        let start = Instant::now();
        let tree_results = tree.range_query(query);
        tree_time += start.elapsed();

        if !validate {
            continue;
        }

        let start = Instant::now();
        let scan_results: Vec<&Rectangle> =
            data.iter().filter(|rect| query.intersects(rect)).collect();
        scan_time += start.elapsed();

        if tree_results.len() != scan_results.len() {
            println!(
                "Query range: {:?}-{:?}",
                query.min, query.max
            );
            println!(
                "R*-tree results count: {} | Linear scan results count: {}",
                tree_results.len(),
                scan_results.len()
            );
            print_result_diff(&tree_results, &scan_results);
            return Err("query results do not match linear scan".into());
        }
    }

    println!("Number of queries: {}", queries.len());
    if validate {
        println!("All queries matched!");
        println!(
            "Total linear scan query time: {:.3} s",
            scan_time.as_secs_f64()
        );
    }
    println!("Total R*-tree query time: {:.3} s", tree_time.as_secs_f64());

    Ok(())
}

/// 打印两边结果的差集,定位丢失或多出的记录
fn print_result_diff(tree_results: &[Rectangle], scan_results: &[&Rectangle]) {
    println!("Results in R*-tree but not in linear scan:");
    for rect in tree_results {
        if !scan_results.iter().any(|other| *other == rect) {
            println!("  [id {}] {:?}-{:?}", rect.id, rect.min, rect.max);
        }
    }

    println!("Results in linear scan but not in R*-tree:");
    for rect in scan_results {
        if !tree_results.iter().any(|other| other == *rect) {
            println!("  [id {}] {:?}-{:?}", rect.id, rect.min, rect.max);
        }
    }
}

/// 打印树的统计信息
fn report(tree: &RStarTree) {
    // 健康检查只在debug构建里跑
    if cfg!(debug_assertions) {
        let violations = tree.check_health();
        if violations > 0 {
            tracing::error!("Health check found {} violations", violations);
        }
    }

    let stats = tree.stats();
    println!("Tree info");
    println!("   Dimension: {}", stats.dimensions);
    println!("   Capacity: {}", stats.capacity);
    println!("   Min capacity: {}", stats.min_capacity);
    println!("   Height: {}", stats.height);
    println!(
        "   Nodes: {} total ({} leaf, {} internal)",
        stats.total_nodes, stats.leaf_nodes, stats.internal_nodes
    );
    println!("   Data entries: {}", stats.total_data_entries);
    println!(
        "   Size in MB: {:.3}",
        stats.size_bytes as f64 / (1024.0 * 1024.0)
    );
    println!(
        "   Node visits: {} total ({} leaf, {} internal)",
        stats.total_node_visits, stats.leaf_node_visits, stats.internal_node_visits
    );
    println!("-------------------------");
    println!();
}
