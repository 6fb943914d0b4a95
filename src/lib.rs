//! # R*-tree 空间索引数据结构
//!
//! 基于 Beckmann 等人的论文 "The R*-tree: An Efficient and Robust Access
//! Method for Points and Rectangles" 的内存R*-tree实现。
//!
//! ## 主要特性
//!
//! - 任意维度的轴对齐矩形与点数据
//! - 动态插入,带一层一次的强制重插(forced reinsertion)
//! - 按重叠面积选择分裂轴和分裂点的R*分裂算法
//! - 批量插入:整叶打包挂载
//! - STR(Sort-Tile-Recursive)自底向上批量装载
//! - 窗口查询,边界相接算命中
//! - 树统计信息、字节数估算与结构健康检查
//!
//! ## 使用示例
//!
//! ```rust
//! use rstar_tree::{RStarTree, Rectangle};
//!
//! // 创建容量为4的二维R*-tree
//! let mut tree = RStarTree::new(4, 2);
//!
//! // 插入一个点和一个矩形
//! tree.insert(Rectangle::from_point(1, vec![1.0, 2.0]));
//! tree.insert(Rectangle::new(2, vec![3.0, 3.0], vec![5.0, 4.0]));
//!
//! // 窗口查询
//! let query = Rectangle::new(-1, vec![0.0, 0.0], vec![4.0, 4.0]);
//! let results = tree.range_query(&query);
//! assert_eq!(results.len(), 2);
//! ```

pub mod algorithms;
pub mod node;
pub mod rectangle;
pub mod rtree;
pub mod stream;

// 重新导出主要的公共接口
pub use node::{Entry, Node, NodeType};
pub use rectangle::Rectangle;
pub use rtree::{RStarTree, TreeStats};
pub use stream::{read_stream_file, StreamError};

use std::error::Error;

pub type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;
