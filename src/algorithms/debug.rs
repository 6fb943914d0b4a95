use crate::node::{Entry, Node};
use crate::rectangle::Rectangle;
use crate::rtree::RStarTree;
use tracing::error;

/// 调试与一致性检查
impl RStarTree {
    /// 遍历整棵树核对结构不变量,返回发现的违规数量
    ///
    /// 检查项:
    /// - 非根节点的条目数落在[min_entries, max_entries]内
    /// - 索引条目的MBR与子树实际MBR一致
    /// - 子节点缓存的MBR与其条目的实际并集一致
    /// - 子节点层级恰好比父节点低一层
    /// - 所有叶子位于同一深度
    ///
    /// 只记录日志,不做任何修复。
    pub fn check_health(&self) -> usize {
        let mut violations = 0;
        let mut leaf_depths: Vec<usize> = Vec::new();

        self.check_node(&self.root, 1, true, &mut violations, &mut leaf_depths);

        if let (Some(min_depth), Some(max_depth)) =
            (leaf_depths.iter().min(), leaf_depths.iter().max())
        {
            if min_depth != max_depth {
                error!(
                    "Health check: leaves at unequal depths ({} vs {})",
                    min_depth, max_depth
                );
                violations += 1;
            }
        }

        violations
    }

    fn check_node(
        &self,
        node: &Node,
        depth: usize,
        is_root: bool,
        violations: &mut usize,
        leaf_depths: &mut Vec<usize>,
    ) {
        if !is_root && node.entries.len() < self.min_entries {
            error!(
                "Health check: node at level {} has {} entries, below minimum {}",
                node.level,
                node.entries.len(),
                self.min_entries
            );
            *violations += 1;
        }
        if node.entries.len() > self.max_entries {
            error!(
                "Health check: node at level {} has {} entries, above maximum {}",
                node.level,
                node.entries.len(),
                self.max_entries
            );
            *violations += 1;
        }

        if node.is_leaf_node() {
            leaf_depths.push(depth);
            if node.entries.iter().any(|entry| !entry.is_data()) {
                error!("Health check: leaf node holds a child entry");
                *violations += 1;
            }
            return;
        }

        for entry in &node.entries {
            let (entry_mbr, child) = match entry {
                Entry::Node { mbr, node } => (mbr, node),
                Entry::Data { .. } => {
                    error!("Health check: index node at level {} holds a data entry", node.level);
                    *violations += 1;
                    continue;
                }
            };

            let actual: Vec<Rectangle> =
                child.entries.iter().map(|e| e.mbr().clone()).collect();
            let actual_mbr = Rectangle::combine(&actual);

            if *entry_mbr != actual_mbr {
                error!(
                    "Health check: parent entry MBR {:?}-{:?} does not match child MBR {:?}-{:?}",
                    entry_mbr.min, entry_mbr.max, actual_mbr.min, actual_mbr.max
                );
                *violations += 1;
            }
            if child.mbr != actual_mbr {
                error!(
                    "Health check: cached node MBR is stale at level {}",
                    child.level
                );
                *violations += 1;
            }
            if child.level + 1 != node.level {
                error!(
                    "Health check: child at level {} under parent at level {}",
                    child.level, node.level
                );
                *violations += 1;
            }

            self.check_node(child, depth + 1, false, violations, leaf_depths);
        }
    }

    /// 打印完整的树结构用于调试
    pub fn print_tree(&self) {
        fn print_node_recursive(node: &Node, depth: usize) {
            let indent = "  ".repeat(depth);
            let kind = if node.is_leaf_node() { "Leaf" } else { "Index" };
            println!(
                "{}{} node (level={}, mbr={:?}-{:?}, {} entries)",
                indent,
                kind,
                node.level,
                node.mbr.min,
                node.mbr.max,
                node.entries.len()
            );

            for entry in &node.entries {
                match entry {
                    Entry::Data { mbr } => {
                        println!(
                            "{}  [id {}] {:?}-{:?}",
                            indent, mbr.id, mbr.min, mbr.max
                        );
                    }
                    Entry::Node { node: child, .. } => {
                        print_node_recursive(child, depth + 1);
                    }
                }
            }
        }

        println!("R*-tree structure:");
        print_node_recursive(&self.root, 0);
        println!("-------------");
    }
}
