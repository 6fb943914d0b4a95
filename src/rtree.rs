use crate::node::{Entry, Node, NodeType};
use crate::rectangle::Rectangle;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::mem;

/// 查询访问计数器
///
/// 记录范围查询进入过多少个节点,从建树开始单调累加,从不清零。
/// 用Cell做内部可变,让范围查询保持只读借用。
#[derive(Debug, Default)]
pub struct VisitCounters {
    total: Cell<u64>,
    leaf: Cell<u64>,
    internal: Cell<u64>,
}

impl VisitCounters {
    pub(crate) fn record(&self, is_leaf: bool) {
        self.total.set(self.total.get() + 1);
        if is_leaf {
            self.leaf.set(self.leaf.get() + 1);
        } else {
            self.internal.set(self.internal.get() + 1);
        }
    }
}

/// 树的统计信息快照
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub leaf_nodes: usize,
    pub internal_nodes: usize,
    /// 叶子层数据条目总数
    pub total_data_entries: usize,
    /// 树高,空树计为1
    pub height: usize,
    /// 估算的索引结构字节数,叶子条目的数据本体不计入
    pub size_bytes: usize,
    pub total_node_visits: u64,
    pub leaf_node_visits: u64,
    pub internal_node_visits: u64,
    pub dimensions: usize,
    pub capacity: usize,
    pub min_capacity: usize,
}

/// 用于JSON序列化的树结构
#[derive(Debug, Serialize, Deserialize)]
pub struct TreeVisualization {
    pub root: NodeVisualization,
    pub config: TreeConfig,
}

/// 用于JSON序列化的树配置
#[derive(Debug, Serialize, Deserialize)]
pub struct TreeConfig {
    pub max_entries: usize,
    pub min_entries: usize,
    pub dimensions: usize,
}

/// 用于JSON序列化的节点结构
#[derive(Debug, Serialize, Deserialize)]
pub struct NodeVisualization {
    pub mbr: Rectangle,
    pub node_type: NodeType,
    pub level: usize,
    /// 数据条目(仅叶子节点)
    pub data_entries: Vec<Rectangle>,
    /// 子节点(仅索引节点)
    pub child_nodes: Vec<NodeVisualization>,
}

/// R*-tree主结构
///
/// 根节点永远存在:新建的树持有一个空的叶子根。
/// 子节点由父节点经Box独占持有,替换根节点就释放整棵旧树。
#[derive(Debug)]
pub struct RStarTree {
    /// 根节点
    pub(crate) root: Box<Node>,
    /// 最大条目数M
    pub(crate) max_entries: usize,
    /// 最小条目数m(M/2)
    pub(crate) min_entries: usize,
    /// 数据维度
    pub(crate) dimensions: usize,
    /// 查询访问计数
    pub(crate) visits: VisitCounters,
}

impl RStarTree {
    /// 创建新的R*-tree
    pub fn new(max_entries: usize, dimensions: usize) -> Self {
        assert!(max_entries >= 2, "Max entries must be at least 2");
        assert!(dimensions >= 1, "Dimensions must be at least 1");

        RStarTree {
            root: Box::new(Node::new_leaf_node()),
            max_entries,
            min_entries: max_entries / 2,
            dimensions,
            visits: VisitCounters::default(),
        }
    }

    /// 检查树是否为空
    pub fn is_empty(&self) -> bool {
        self.root.is_leaf_node() && self.root.entries.is_empty()
    }

    /// 获取最大条目数
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// 获取最小条目数
    pub fn min_entries(&self) -> usize {
        self.min_entries
    }

    /// 获取数据维度
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// 获取树高(根到叶子的层数,空树为1)
    pub fn height(&self) -> usize {
        self.root.level + 1
    }

    /// 获取叶子层数据条目总数
    pub fn len(&self) -> usize {
        Self::count_entries(&self.root)
    }

    fn count_entries(node: &Node) -> usize {
        if node.is_leaf_node() {
            node.entries.len()
        } else {
            node.entries
                .iter()
                .filter_map(|entry| entry.child())
                .map(Self::count_entries)
                .sum()
        }
    }

    /// 收集树的统计信息
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            dimensions: self.dimensions,
            capacity: self.max_entries,
            min_capacity: self.min_entries,
            total_node_visits: self.visits.total.get(),
            leaf_node_visits: self.visits.leaf.get(),
            internal_node_visits: self.visits.internal.get(),
            ..TreeStats::default()
        };
        Self::collect_stats(&self.root, 1, &mut stats);
        stats.size_bytes = self.size_bytes();
        stats
    }

    fn collect_stats(node: &Node, depth: usize, stats: &mut TreeStats) {
        stats.total_nodes += 1;
        stats.height = stats.height.max(depth);

        if node.is_leaf_node() {
            stats.leaf_nodes += 1;
            stats.total_data_entries += node.entries.len();
        } else {
            stats.internal_nodes += 1;
            for entry in &node.entries {
                if let Entry::Node { node: child, .. } = entry {
                    Self::collect_stats(child, depth + 1, stats);
                }
            }
        }
    }

    /// 估算索引结构占用的字节数
    ///
    /// 每个节点计入:叶子标志、父指针宽度、两个序列描述头;
    /// 索引节点再按条目计入 2·d 个f32坐标和一个子节点指针。
    /// 叶子条目的数据本体视为外部数据,不计入。
    pub fn size_bytes(&self) -> usize {
        Self::node_size_bytes(&self.root, self.dimensions)
    }

    fn node_size_bytes(node: &Node, dimensions: usize) -> usize {
        let mut total = mem::size_of::<bool>()
            + mem::size_of::<usize>()
            + 2 * mem::size_of::<Vec<Entry>>();

        if !node.is_leaf_node() {
            total += node.entries.len() * 2 * dimensions * mem::size_of::<f32>();
            total += node.entries.len() * mem::size_of::<Box<Node>>();

            for entry in &node.entries {
                if let Entry::Node { node: child, .. } = entry {
                    total += Self::node_size_bytes(child, dimensions);
                }
            }
        }

        total
    }

    /// 导出树结构为JSON格式
    ///
    /// 返回包含完整树结构的JSON字符串,用于可视化和调试。
    pub fn export_to_json(&self) -> Result<String, serde_json::Error> {
        let visualization = TreeVisualization {
            root: Self::visualize_node(&self.root),
            config: TreeConfig {
                max_entries: self.max_entries,
                min_entries: self.min_entries,
                dimensions: self.dimensions,
            },
        };
        serde_json::to_string_pretty(&visualization)
    }

    fn visualize_node(node: &Node) -> NodeVisualization {
        let mut data_entries = Vec::new();
        let mut child_nodes = Vec::new();

        for entry in &node.entries {
            match entry {
                Entry::Data { mbr } => data_entries.push(mbr.clone()),
                Entry::Node { node: child, .. } => {
                    child_nodes.push(Self::visualize_node(child));
                }
            }
        }

        NodeVisualization {
            mbr: node.mbr.clone(),
            node_type: node.node_type.clone(),
            level: node.level,
            data_entries,
            child_nodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_creation() {
        let tree = RStarTree::new(10, 2);
        assert_eq!(tree.max_entries(), 10);
        assert_eq!(tree.min_entries(), 5);
        assert_eq!(tree.dimensions(), 2);
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 1);
    }

    #[test]
    #[should_panic(expected = "Max entries must be at least 2")]
    fn test_tree_capacity_too_small() {
        RStarTree::new(1, 2);
    }

    #[test]
    fn test_empty_tree_stats() {
        let tree = RStarTree::new(4, 2);
        let stats = tree.stats();

        assert_eq!(stats.total_nodes, 1);
        assert_eq!(stats.leaf_nodes, 1);
        assert_eq!(stats.internal_nodes, 0);
        assert_eq!(stats.total_data_entries, 0);
        // 空树的高度计为1
        assert_eq!(stats.height, 1);
        assert_eq!(stats.capacity, 4);
        assert_eq!(stats.min_capacity, 2);
    }

    #[test]
    fn test_stats_after_inserts() {
        let mut tree = RStarTree::new(4, 2);
        for i in 0..20 {
            tree.insert(Rectangle::from_point(i, vec![i as f32, i as f32]));
        }

        let stats = tree.stats();
        assert_eq!(stats.total_data_entries, 20);
        assert_eq!(stats.total_nodes, stats.leaf_nodes + stats.internal_nodes);
        assert!(stats.height >= 2);
        assert!(stats.size_bytes > 0);
    }

    #[test]
    fn test_visit_counters_monotonic() {
        let mut tree = RStarTree::new(4, 2);
        for i in 0..10 {
            tree.insert(Rectangle::from_point(i, vec![i as f32, 0.0]));
        }

        let query = Rectangle::new(-1, vec![0.0, 0.0], vec![9.0, 0.0]);
        tree.range_query(&query);
        let first = tree.stats().total_node_visits;
        assert!(first > 0);

        tree.range_query(&query);
        let second = tree.stats().total_node_visits;
        assert!(second > first);
    }

    #[test]
    fn test_json_export() {
        let mut tree = RStarTree::new(4, 2);
        tree.insert(Rectangle::new(1, vec![0.0, 0.0], vec![10.0, 10.0]));
        tree.insert(Rectangle::new(2, vec![5.0, 5.0], vec![15.0, 15.0]));
        tree.insert(Rectangle::new(3, vec![20.0, 20.0], vec![30.0, 30.0]));

        let json = tree.export_to_json().expect("Failed to export JSON");

        assert!(json.contains("\"max_entries\": 4"));
        assert!(json.contains("\"min_entries\": 2"));
        assert!(json.contains("\"data_entries\""));
    }
}
