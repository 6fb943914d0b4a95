use crate::rectangle::Rectangle;
use serde::{Deserialize, Serialize};

/// R*-tree节点类型
///
/// 用于明确区分树中的两种节点,避免概念混淆
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeType {
    /// 叶子节点:包含用户插入的真实数据条目
    Leaf,
    /// 索引节点:包含指向子节点的引用条目
    Index,
}

/// R*-tree节点条目
///
/// 每个条目都带一个MBR(最小边界矩形):
/// - Data条目:用户插入的记录,记录id保存在矩形的id字段里,只出现在叶子节点中
/// - Node条目:子节点引用加上该子树的MBR,只出现在索引节点中
///
/// 把子节点和它的MBR放在同一个条目里,保证两者永远成对出现、
/// 成对移动,分裂重排时不会错位。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Entry {
    /// 数据条目:存储用户插入的真实记录
    Data { mbr: Rectangle },

    /// 节点条目:存储指向子节点的引用及其MBR
    Node { mbr: Rectangle, node: Box<Node> },
}

impl Entry {
    /// 获取条目的MBR
    pub fn mbr(&self) -> &Rectangle {
        match self {
            Entry::Data { mbr } => mbr,
            Entry::Node { mbr, .. } => mbr,
        }
    }

    /// 获取条目的MBR(可变引用)
    pub fn mbr_mut(&mut self) -> &mut Rectangle {
        match self {
            Entry::Data { mbr } => mbr,
            Entry::Node { mbr, .. } => mbr,
        }
    }

    /// 检查是否为数据条目
    pub fn is_data(&self) -> bool {
        matches!(self, Entry::Data { .. })
    }

    /// 获取数据条目的记录id(如果是数据条目)
    pub fn data_id(&self) -> Option<i32> {
        match self {
            Entry::Data { mbr } => Some(mbr.id),
            Entry::Node { .. } => None,
        }
    }

    /// 获取节点条目的子节点引用(如果是节点条目)
    pub fn child(&self) -> Option<&Node> {
        match self {
            Entry::Data { .. } => None,
            Entry::Node { node, .. } => Some(node),
        }
    }

    /// 获取节点条目的子节点引用(可变,如果是节点条目)
    pub fn child_mut(&mut self) -> Option<&mut Node> {
        match self {
            Entry::Data { .. } => None,
            Entry::Node { node, .. } => Some(node),
        }
    }
}

/// R*-tree节点
///
/// 子节点通过 `Entry::Node` 里的Box被父节点独占持有,
/// 释放一个节点会连带释放整棵子树。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// 节点的最小边界矩形,包含该节点所有条目的MBR
    pub mbr: Rectangle,

    /// 节点包含的条目列表
    ///
    /// 叶子节点只包含 Entry::Data,索引节点只包含 Entry::Node
    pub entries: Vec<Entry>,

    /// 节点类型
    pub node_type: NodeType,

    /// 节点在树中的层级,叶子层为0,向上递增
    pub level: usize,
}

impl Node {
    /// 创建新的叶子节点(层级固定为0)
    pub fn new_leaf_node() -> Self {
        Node::new(NodeType::Leaf, 0)
    }

    /// 创建新的索引节点
    pub fn new_index_node(level: usize) -> Self {
        Node::new(NodeType::Index, level)
    }

    /// 创建指定类型和层级的节点
    pub fn new(node_type: NodeType, level: usize) -> Self {
        Node {
            mbr: Rectangle::new_empty(0),
            entries: Vec::new(),
            node_type,
            level,
        }
    }

    /// 用一批数据矩形直接构造叶子节点
    ///
    /// 批量插入和STR装载都用这个入口打包叶子。
    pub fn new_leaf_with(rectangles: Vec<Rectangle>) -> Self {
        let mut node = Node::new(NodeType::Leaf, 0);
        node.entries = rectangles
            .into_iter()
            .map(|mbr| Entry::Data { mbr })
            .collect();
        node.update_mbr();
        node
    }

    /// 检查是否为叶子节点
    pub fn is_leaf_node(&self) -> bool {
        matches!(self.node_type, NodeType::Leaf)
    }

    /// 检查是否为索引节点
    pub fn is_index_node(&self) -> bool {
        matches!(self.node_type, NodeType::Index)
    }

    /// 更新节点的MBR以包含所有条目
    ///
    /// 遍历节点中的所有条目,计算能够包含所有条目MBR的最小矩形。
    /// 结果永远是合成MBR(id == -1)。
    pub fn update_mbr(&mut self) {
        if self.entries.is_empty() {
            self.mbr = Rectangle::new_empty(0);
            return;
        }

        let mut mbr = self.entries[0].mbr().clone();
        for entry in &self.entries[1..] {
            mbr = mbr.union(entry.mbr());
        }
        mbr.id = -1;
        self.mbr = mbr;
    }

    /// 添加条目到节点,并更新节点的MBR
    ///
    /// 调用者需要保证条目类型与节点类型匹配:
    /// 叶子节点只能添加 Entry::Data,索引节点只能添加 Entry::Node。
    pub fn add_entry(&mut self, entry: Entry) {
        self.entries.push(entry);
        self.update_mbr();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let leaf_node = Node::new_leaf_node();
        assert!(leaf_node.is_leaf_node());
        assert!(!leaf_node.is_index_node());
        assert_eq!(leaf_node.level, 0);
        assert_eq!(leaf_node.node_type, NodeType::Leaf);

        let index_node = Node::new_index_node(1);
        assert!(!index_node.is_leaf_node());
        assert!(index_node.is_index_node());
        assert_eq!(index_node.level, 1);
    }

    #[test]
    fn test_node_update_mbr() {
        let mut node = Node::new_leaf_node();

        node.add_entry(Entry::Data {
            mbr: Rectangle::new(1, vec![0.0, 0.0], vec![5.0, 5.0]),
        });
        node.add_entry(Entry::Data {
            mbr: Rectangle::new(2, vec![3.0, 3.0], vec![8.0, 8.0]),
        });

        assert_eq!(node.mbr, Rectangle::new(-1, vec![0.0, 0.0], vec![8.0, 8.0]));
        assert_eq!(node.mbr.id, -1);
    }

    #[test]
    fn test_new_leaf_with() {
        let node = Node::new_leaf_with(vec![
            Rectangle::from_point(1, vec![1.0, 1.0]),
            Rectangle::from_point(2, vec![4.0, 2.0]),
        ]);

        assert!(node.is_leaf_node());
        assert_eq!(node.entries.len(), 2);
        assert_eq!(node.mbr, Rectangle::new(-1, vec![1.0, 1.0], vec![4.0, 2.0]));
    }

    #[test]
    fn test_entry_operations() {
        let data_entry = Entry::Data {
            mbr: Rectangle::new(42, vec![0.0, 0.0], vec![5.0, 5.0]),
        };

        assert!(data_entry.is_data());
        assert_eq!(data_entry.data_id(), Some(42));
        assert!(data_entry.child().is_none());

        let child = Box::new(Node::new_leaf_node());
        let node_entry = Entry::Node {
            mbr: Rectangle::new(-1, vec![1.0, 1.0], vec![6.0, 6.0]),
            node: child,
        };

        assert!(!node_entry.is_data());
        assert_eq!(node_entry.data_id(), None);
        assert!(node_entry.child().is_some());
    }
}
