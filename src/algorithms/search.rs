use crate::node::{Entry, Node};
use crate::rectangle::Rectangle;
use crate::rtree::RStarTree;

/// 窗口查询 - 遵循论文Algorithm Search
impl RStarTree {
    /// 查询与窗口相交的所有叶子条目
    ///
    /// 边界相接算命中。结果顺序由树结构决定,调用方不应依赖。
    pub fn range_query(&self, query: &Rectangle) -> Vec<Rectangle> {
        let mut results = Vec::new();
        self.range_query_recursive(&self.root, query, &mut results);
        results
    }

    /// 递归下降:索引节点选相交的子树,叶子节点收集相交的条目
    fn range_query_recursive(&self, node: &Node, query: &Rectangle, results: &mut Vec<Rectangle>) {
        // 每进入一个节点都计入访问统计
        self.visits.record(node.is_leaf_node());

        for entry in &node.entries {
            if query.intersects(entry.mbr()) {
                match entry {
                    Entry::Data { mbr } => results.push(mbr.clone()),
                    Entry::Node { node: child, .. } => {
                        self.range_query_recursive(child, query, results);
                    }
                }
            }
        }
    }
}
