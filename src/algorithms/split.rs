use crate::node::{Entry, Node, NodeType};
use crate::rectangle::Rectangle;
use crate::rtree::RStarTree;
use tracing::warn;

/// 节点分裂算法 - 实现R*论文的轴选择+分裂点选择(ChooseSplitAxis / ChooseSplitIndex)
impl RStarTree {
    /// 处理节点溢出 - 遵循论文Algorithm OverflowTreatment
    ///
    /// 非根节点在本层的重插标记未被消耗时优先强制重插,
    /// 否则执行分裂并在需要时向上级联。
    pub(crate) fn handle_overflow(
        &mut self,
        path: Vec<usize>,
        reinserted: &mut Vec<bool>,
        allow_reinsert: bool,
    ) {
        let level = match self.get_last_node(&path) {
            Some(node) => node.level,
            None => return,
        };

        // OT1: 根节点不重插;每层只重插一次,标记耗尽后只能分裂
        let can_reinsert = allow_reinsert
            && !path.is_empty()
            && reinserted.get(level).map_or(false, |done| !*done);

        if can_reinsert {
            if let Some(flag) = reinserted.get_mut(level) {
                *flag = true;
            }
            if self.reinsert(path.clone(), reinserted) {
                return;
            }
            // 30%取整后为0,放弃重插,直接分裂
        }

        self.split_and_propagate(path, reinserted, allow_reinsert);
    }

    /// 分裂节点并向上传播溢出
    ///
    /// 分裂是一次事务性操作:先确定分裂轴和分裂点,再按轴物理重排条目,
    /// 切开后左半留在原节点,右半搬进新兄弟,最后把兄弟挂到父节点。
    /// 索引节点的子节点跟随各自的条目一起移动,归属关系不会错位。
    pub(crate) fn split_and_propagate(
        &mut self,
        mut path: Vec<usize>,
        reinserted: &mut Vec<bool>,
        allow_reinsert: bool,
    ) {
        let max_entries = self.max_entries;
        let min_entries = self.min_entries;
        let dimensions = self.dimensions;

        // 取出待分裂节点的全部条目
        let (mut entries, node_type, level) = {
            let node = match self.get_last_node_mut(&path) {
                Some(node) => node,
                None => {
                    warn!("Failed to reach node during split");
                    return;
                }
            };
            debug_assert!(!node.entries.is_empty(), "Split on an empty node");

            if node.entries.len() <= max_entries {
                // 不再溢出,只需要同步MBR
                self.adjust_tree_upward(path);
                return;
            }

            (
                std::mem::take(&mut node.entries),
                node.node_type.clone(),
                node.level,
            )
        };

        // CSA1/CSI1: 选出重叠面积最小的(轴,分裂点)组合
        let (best_axis, best_index) = choose_best_split(&entries, min_entries, dimensions);

        // 按获胜轴物理重排后切开
        entries.sort_by(|a, b| a.mbr().min[best_axis].total_cmp(&b.mbr().min[best_axis]));
        let right_entries = entries.split_off(best_index);

        {
            let node = match self.get_last_node_mut(&path) {
                Some(node) => node,
                None => {
                    warn!("Failed to reach node after split evaluation");
                    return;
                }
            };
            node.entries = entries;
            node.update_mbr();
        }

        let mut sibling = Node::new(node_type, level);
        sibling.entries = right_entries;
        sibling.update_mbr();

        // 左半留在原节点,先把它缩小后的MBR同步到祖先的条目里
        self.adjust_tree_upward(path.clone());

        if path.is_empty() {
            // 根节点分裂:创建高一层的新根,持有左右两个兄弟
            let new_root = Box::new(Node::new(NodeType::Index, level + 1));
            let old_root = std::mem::replace(&mut self.root, new_root);

            self.root.entries.push(Entry::Node {
                mbr: old_root.mbr.clone(),
                node: old_root,
            });
            self.root.entries.push(Entry::Node {
                mbr: sibling.mbr.clone(),
                node: Box::new(sibling),
            });
            self.root.update_mbr();
        } else {
            // 把新兄弟追加到父节点,并检查父节点是否溢出
            path.pop();

            let parent_overflow = {
                let parent = match self.get_last_node_mut(&path) {
                    Some(node) => node,
                    None => {
                        warn!("Failed to reach parent node during split propagation");
                        return;
                    }
                };
                parent.entries.push(Entry::Node {
                    mbr: sibling.mbr.clone(),
                    node: Box::new(sibling),
                });
                parent.update_mbr();
                parent.entries.len() > max_entries
            };

            self.adjust_tree_upward(path.clone());

            if parent_overflow {
                self.handle_overflow(path, reinserted, allow_reinsert);
            }
        }
    }
}

/// 选择分裂轴和分裂点
///
/// 对每个坐标轴:按min坐标排序,枚举所有满足最小填充度的分裂点,
/// 用前缀/后缀并集求两侧MBR,取两侧重叠面积最小的组合,
/// 重叠相同时比较两侧面积之和。严格小于才更新,平局保留先到者。
fn choose_best_split(entries: &[Entry], min_entries: usize, dimensions: usize) -> (usize, usize) {
    let n = entries.len();
    debug_assert!(n >= 2 * min_entries, "Not enough entries to split");

    let mut best_axis = 0;
    let mut best_index = min_entries;
    let mut min_overlap = f32::INFINITY;
    let mut min_area = f32::INFINITY;

    for axis in 0..dimensions {
        let mut mbrs: Vec<&Rectangle> = entries.iter().map(|entry| entry.mbr()).collect();
        mbrs.sort_by(|a, b| a.min[axis].total_cmp(&b.min[axis]));

        // 前缀并集: prefix[i] = mbrs[0..=i] 的MBR
        let mut prefix = Vec::with_capacity(n);
        let mut acc = Rectangle::new_empty(dimensions);
        for mbr in &mbrs {
            acc = acc.union(mbr);
            prefix.push(acc.clone());
        }

        // 后缀并集: suffix[i] = mbrs[i..] 的MBR
        let mut suffix = vec![Rectangle::new_empty(dimensions); n];
        let mut acc = Rectangle::new_empty(dimensions);
        for i in (0..n).rev() {
            acc = acc.union(mbrs[i]);
            suffix[i] = acc.clone();
        }

        for split_index in min_entries..=(n - min_entries) {
            let left = &prefix[split_index - 1];
            let right = &suffix[split_index];

            let overlap = left.overlap_area(right);
            let area = left.area() + right.area();

            if overlap < min_overlap || (overlap == min_overlap && area < min_area) {
                min_overlap = overlap;
                min_area = area;
                best_axis = axis;
                best_index = split_index;
            }
        }
    }

    (best_axis, best_index)
}
