use crate::node::{Entry, Node, NodeType};
use crate::rectangle::Rectangle;
use crate::rtree::RStarTree;
use tracing::warn;

/// 批量插入与STR自底向上装载
impl RStarTree {
    /// 批量插入一批矩形
    ///
    /// 按第一维min坐标排序后切成容量大小的块,每块打包成叶子节点
    /// 整体挂到树上。尾块不足最小填充度时退回逐条插入,保证静止
    /// 状态下每个非根节点都满足最小条目数。
    pub fn batch_insert(&mut self, rectangles: &mut [Rectangle]) {
        if rectangles.is_empty() {
            return;
        }

        if self.root.is_leaf_node() {
            // 树还没长出索引层(空树或单个叶子根):把已有条目并进
            // 本批数据整树重建,避免把一个欠填充的叶子压到非根位置
            let mut all: Vec<Rectangle> = self
                .root
                .entries
                .iter()
                .map(|entry| entry.mbr().clone())
                .collect();
            all.extend(rectangles.iter().cloned());
            self.bulk_load(&mut all);
            return;
        }

        rectangles.sort_by(|a, b| a.min[0].total_cmp(&b.min[0]));

        let max_entries = self.max_entries;
        let min_entries = self.min_entries;
        // 批量路径不做强制重插,溢出一律分裂
        let mut reinserted = vec![false; self.root.level + 1];

        let mut start = 0;
        while start < rectangles.len() {
            let end = (start + max_entries).min(rectangles.len());
            let chunk = &rectangles[start..end];

            if chunk.len() < min_entries {
                // 尾块太小,打包成叶子会破坏最小填充度
                for rect in chunk {
                    self.insert(rect.clone());
                }
            } else {
                let leaf = Node::new_leaf_with(chunk.to_vec());
                self.insert_node_entry(leaf, &mut reinserted);
            }

            start = end;
        }
    }

    /// 把一个现成的子树挂到树上对应的高度
    ///
    /// 从根下降,按子树MBR的面积增量选路,到达目标层(子树层级+1)后
    /// 追加为子条目;溢出时分裂。批量插入用它挂打包好的叶子,
    /// 索引层的强制重插用它把摘下的子树放回去。
    pub(crate) fn insert_node_entry(&mut self, child: Node, reinserted: &mut Vec<bool>) {
        let target_level = child.level + 1;

        // 树不够高时先把根抬起来一层
        if self.root.level < target_level {
            let new_root = Box::new(Node::new(NodeType::Index, target_level));
            let old_root = std::mem::replace(&mut self.root, new_root);
            self.root.entries.push(Entry::Node {
                mbr: old_root.mbr.clone(),
                node: old_root,
            });
            self.root.update_mbr();
        }

        let child_mbr = child.mbr.clone();

        // 下降到目标层
        let mut path = Vec::new();
        {
            let mut current: &Node = &self.root;
            while current.level > target_level {
                let best_index = Self::choose_subtree(&current.entries, &child_mbr);
                path.push(best_index);
                match current.entries.get(best_index) {
                    Some(Entry::Node { node, .. }) => current = node,
                    _ => break,
                }
            }
        }

        let max_entries = self.max_entries;
        let overflow = {
            let parent = match self.get_last_node_mut(&path) {
                Some(node) => node,
                None => {
                    warn!("Failed to reach target level while attaching subtree");
                    return;
                }
            };
            debug_assert_eq!(parent.level, target_level);
            parent.entries.push(Entry::Node {
                mbr: child_mbr,
                node: Box::new(child),
            });
            parent.update_mbr();
            parent.entries.len() > max_entries
        };

        self.adjust_tree_upward(path.clone());

        if overflow {
            self.handle_overflow(path, reinserted, false);
        }
    }

    /// STR自底向上装载 - 丢弃现有的树,从静态数据集重建
    ///
    /// 先按中心坐标递归切片排序,再把排好序的数据切成叶子,
    /// 逐层打包父节点直到只剩一个节点作为新根。空输入把树重置为空。
    pub fn bulk_load(&mut self, rectangles: &mut [Rectangle]) {
        // 旧树整体丢弃
        self.root = Box::new(Node::new_leaf_node());

        if rectangles.is_empty() {
            return;
        }

        str_sort(rectangles, 0, self.dimensions, self.max_entries);

        // 打包叶子层
        let mut current: Vec<Node> = Vec::new();
        let mut offset = 0;
        for size in balanced_groups(rectangles.len(), self.max_entries, self.min_entries) {
            current.push(Node::new_leaf_with(rectangles[offset..offset + size].to_vec()));
            offset += size;
        }

        // 自底向上逐层打包,直到只剩一个节点
        let mut level = 0;
        while current.len() > 1 {
            level += 1;
            let groups = balanced_groups(current.len(), self.max_entries, self.min_entries);
            let mut next = Vec::with_capacity(groups.len());
            let mut children = current.into_iter();

            for size in groups {
                let mut parent = Node::new(NodeType::Index, level);
                for _ in 0..size {
                    if let Some(child) = children.next() {
                        parent.entries.push(Entry::Node {
                            mbr: child.mbr.clone(),
                            node: Box::new(child),
                        });
                    }
                }
                parent.update_mbr();
                next.push(parent);
            }

            current = next;
        }

        if let Some(new_root) = current.pop() {
            self.root = Box::new(new_root);
        }
    }
}

/// 按中心坐标递归切片排序(Sort-Tile-Recursive)
///
/// 第k层递归按第k维中心坐标排序,再把当前切片均分成最多
/// max_entries个子切片,逐个递归下一维,维度用完即终止。
fn str_sort(rects: &mut [Rectangle], depth: usize, dimensions: usize, max_entries: usize) {
    if depth >= dimensions || rects.len() <= 1 {
        return;
    }

    let axis = depth;
    rects.sort_by(|a, b| a.center_coord(axis).total_cmp(&b.center_coord(axis)));

    let slice_size = (rects.len() + max_entries - 1) / max_entries;
    if slice_size == 0 {
        return;
    }

    for chunk in rects.chunks_mut(slice_size) {
        str_sort(chunk, depth + 1, dimensions, max_entries);
    }
}

/// 把n个元素切成若干组,每组大小落在[min, max]之间
///
/// 贪心按max取整组;尾组不足min时和前一组匀一下,避免产生
/// 低于最小填充度的节点。n本身小于min时只能单独成组(只会发生
/// 在根节点上,根不受最小填充度约束)。
fn balanced_groups(n: usize, max: usize, min: usize) -> Vec<usize> {
    let mut groups = Vec::with_capacity(n / max + 2);
    let mut remaining = n;

    while remaining > 0 {
        if remaining >= max + min || remaining <= max {
            let take = remaining.min(max);
            groups.push(take);
            remaining -= take;
        } else {
            // 剩余在 (max, max+min) 之间:直接取满会留下一个小尾巴,
            // 把剩余的均分成两组
            let first = remaining - remaining / 2;
            groups.push(first);
            groups.push(remaining / 2);
            remaining = 0;
        }
    }

    groups
}
