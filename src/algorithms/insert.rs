use crate::node::{Entry, Node};
use crate::rectangle::Rectangle;
use crate::rtree::RStarTree;
use tracing::warn;

/// 插入操作相关算法 - 遵循R*论文Algorithm InsertData / ChooseSubtree
impl RStarTree {
    /// 插入新的数据条目
    ///
    /// 每次顶层插入维护一个按层级索引的重插标记向量:
    /// 同一次插入中,每一层的强制重插最多发生一次,之后的溢出直接分裂。
    pub fn insert(&mut self, rect: Rectangle) {
        debug_assert_eq!(
            rect.dimensions(),
            self.dimensions,
            "Rectangle dimensionality does not match the tree"
        );

        // OT1: 每层一个重插标记,本次顶层插入内有效
        let mut reinserted = vec![false; self.root.level + 1];
        self.insert_entry(rect, &mut reinserted, true);
    }

    /// 插入单个数据条目的内部入口
    ///
    /// `allow_reinsert` 为false时(重插引发的再下降)溢出一律分裂。
    pub(crate) fn insert_entry(
        &mut self,
        rect: Rectangle,
        reinserted: &mut Vec<bool>,
        allow_reinsert: bool,
    ) {
        // I1: 选择叶子节点
        let path = self.choose_leaf_path(&rect);
        let max_entries = self.max_entries;

        // I2: 添加记录到叶子节点
        let overflow = {
            let leaf = match self.get_last_node_mut(&path) {
                Some(node) => node,
                None => {
                    warn!("Failed to reach leaf node during insertion");
                    return;
                }
            };
            debug_assert!(leaf.is_leaf_node(), "Insertion descent must end at a leaf");
            leaf.entries.push(Entry::Data { mbr: rect });
            leaf.update_mbr();
            leaf.entries.len() > max_entries
        };

        // I3: 向上传播MBR更新
        self.adjust_tree_upward(path.clone());

        // I4: 处理溢出(重插或分裂,可能向上级联)
        if overflow {
            self.handle_overflow(path, reinserted, allow_reinsert);
        }
    }

    /// 选择叶子节点路径 - 遵循论文ChooseSubtree算法
    ///
    /// 返回从根节点到目标叶子的下标路径,根节点本身是叶子时路径为空。
    pub(crate) fn choose_leaf_path(&self, rect: &Rectangle) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current: &Node = &self.root;

        // CS1: 从根节点开始下降,直到叶子层
        while !current.is_leaf_node() {
            // CS2: 选择面积增量最小的子树
            let best_index = Self::choose_subtree(&current.entries, rect);
            path.push(best_index);

            match current.entries.get(best_index) {
                Some(Entry::Node { node, .. }) => current = node,
                _ => break,
            }
        }

        path
    }

    /// 选择子树 - 面积增量最小者胜出,增量相同时取当前面积更小的
    pub(crate) fn choose_subtree(entries: &[Entry], rect: &Rectangle) -> usize {
        debug_assert!(!entries.is_empty(), "choose_subtree on an empty node");

        let mut best_index = 0;
        let mut min_increase = f32::INFINITY;
        let mut min_area = f32::INFINITY;

        for (i, entry) in entries.iter().enumerate() {
            let mbr = entry.mbr();
            let increase = mbr.area_increase(rect);
            let area = mbr.area();

            if increase < min_increase || (increase == min_increase && area < min_area) {
                min_increase = increase;
                min_area = area;
                best_index = i;
            }
        }

        best_index
    }

    /// 强制重插 - 遵循论文Algorithm ReInsert
    ///
    /// 把溢出节点中离MBR中心最远的30%条目摘下来,从根重新插入,
    /// 给几何上边缘的条目一次换窝的机会。返回false表示30%取整后
    /// 为0,调用方应改为分裂。
    pub(crate) fn reinsert(&mut self, path: Vec<usize>, reinserted: &mut Vec<bool>) -> bool {
        // RI1/RI2: 按到节点MBR中心的距离降序排序所有条目
        let lifted = {
            let node = match self.get_last_node_mut(&path) {
                Some(node) => node,
                None => return false,
            };

            let count = (node.entries.len() as f32 * 0.3) as usize;
            if count == 0 {
                return false;
            }

            let center = node.mbr.center();
            let mut scored: Vec<(f32, Entry)> = std::mem::take(&mut node.entries)
                .into_iter()
                .map(|entry| {
                    let entry_center = entry.mbr().center();
                    let distance: f32 = center
                        .iter()
                        .zip(&entry_center)
                        .map(|(a, b)| (a - b) * (a - b))
                        .sum();
                    (distance, entry)
                })
                .collect();
            scored.sort_by(|a, b| b.0.total_cmp(&a.0));

            // RI3: 最远的count个条目被摘除,其余留在原节点
            let remaining = scored.split_off(count);
            node.entries = remaining.into_iter().map(|(_, entry)| entry).collect();
            node.update_mbr();

            scored
        };

        self.adjust_tree_upward(path);

        // RI4: 从最远的条目开始逐个从根重新插入,重插标记已耗尽,
        // 再下降过程中的任何溢出都走分裂
        for (_, entry) in lifted {
            match entry {
                Entry::Data { mbr } => self.insert_entry(mbr, reinserted, false),
                Entry::Node { node, .. } => self.insert_node_entry(*node, reinserted),
            }
        }

        true
    }

    /// 向上调整树 - 把路径上每一层的MBR同步到父节点的条目里
    pub(crate) fn adjust_tree_upward(&mut self, mut path: Vec<usize>) {
        while !path.is_empty() {
            let child_mbr = {
                let node = match self.get_last_node_mut(&path) {
                    Some(node) => node,
                    None => break,
                };
                node.update_mbr();
                node.mbr.clone()
            };

            let child_index = match path.pop() {
                Some(index) => index,
                None => break,
            };

            let parent = match self.get_last_node_mut(&path) {
                Some(node) => node,
                None => break,
            };
            if let Some(Entry::Node { mbr, .. }) = parent.entries.get_mut(child_index) {
                *mbr = child_mbr;
            }
        }

        self.root.update_mbr();
    }

    /// 根据路径获取节点的可变引用
    pub(crate) fn get_last_node_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let mut current: &mut Node = &mut self.root;

        for &index in path {
            match current.entries.get_mut(index) {
                Some(Entry::Node { node, .. }) => current = node,
                _ => return None,
            }
        }

        Some(current)
    }

    /// 根据路径获取节点的只读引用
    pub(crate) fn get_last_node(&self, path: &[usize]) -> Option<&Node> {
        let mut current: &Node = &self.root;

        for &index in path {
            match current.entries.get(index) {
                Some(Entry::Node { node, .. }) => current = node,
                _ => return None,
            }
        }

        Some(current)
    }
}
