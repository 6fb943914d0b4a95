use serde::{Deserialize, Serialize};

/// 轴对齐边界框 - 用于表示R*-tree中的最小边界矩形(MBR)
///
/// 支持任意维度,坐标使用单精度浮点数。`id == -1` 表示这是一个
/// 由树自己合成的MBR,而不是用户插入的数据记录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rectangle {
    /// 记录标识符,-1 表示合成MBR
    pub id: i32,
    pub min: Vec<f32>,
    pub max: Vec<f32>,
}

/// 相等比较只看坐标,忽略id
///
/// 查询结果与暴力扫描的对比按值进行,两个坐标相同但id不同的
/// 矩形视为同一个几何对象。
impl PartialEq for Rectangle {
    fn eq(&self, other: &Self) -> bool {
        self.min == other.min && self.max == other.max
    }
}

impl Rectangle {
    /// 创建新的矩形
    pub fn new(id: i32, min: Vec<f32>, max: Vec<f32>) -> Self {
        assert_eq!(min.len(), max.len(), "Coordinate vectors must have equal length");
        assert!(
            min.iter().zip(&max).all(|(lo, hi)| lo <= hi),
            "Invalid rectangle bounds"
        );
        Rectangle { id, min, max }
    }

    /// 创建一个点矩形(min == max)
    pub fn from_point(id: i32, coords: Vec<f32>) -> Self {
        Rectangle {
            id,
            min: coords.clone(),
            max: coords,
        }
    }

    /// 创建并集运算的单位元:每一维都是 [+∞, -∞] 的空矩形
    ///
    /// 与任何矩形做并集都返回另一个矩形本身。
    pub fn new_empty(dimensions: usize) -> Self {
        Rectangle {
            id: -1,
            min: vec![f32::INFINITY; dimensions],
            max: vec![f32::NEG_INFINITY; dimensions],
        }
    }

    /// 矩形的维度
    pub fn dimensions(&self) -> usize {
        self.min.len()
    }

    /// 计算矩形面积(各维度边长的乘积)
    ///
    /// 点矩形的面积为0。
    pub fn area(&self) -> f32 {
        let mut result = 1.0f32;
        for d in 0..self.min.len() {
            result *= self.max[d] - self.min[d];
        }
        result
    }

    /// 计算两个矩形的并集MBR
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        debug_assert_eq!(self.dimensions(), other.dimensions());
        let min = self
            .min
            .iter()
            .zip(&other.min)
            .map(|(a, b)| a.min(*b))
            .collect();
        let max = self
            .max
            .iter()
            .zip(&other.max)
            .map(|(a, b)| a.max(*b))
            .collect();
        Rectangle { id: -1, min, max }
    }

    /// 计算一组矩形的并集MBR
    ///
    /// 空序列返回零维的单位元矩形。
    pub fn combine(rectangles: &[Rectangle]) -> Rectangle {
        let mut iter = rectangles.iter();
        let first = match iter.next() {
            Some(rect) => rect,
            None => return Rectangle::new_empty(0),
        };
        let mut combined = first.clone();
        for rect in iter {
            combined = combined.union(rect);
        }
        combined.id = -1;
        combined
    }

    /// 计算扩大到包含另一个矩形所需的面积增量
    ///
    /// 直接在一次循环里累乘合并前后的面积,避免构造临时并集矩形。
    pub fn area_increase(&self, other: &Rectangle) -> f32 {
        let mut combined_area = 1.0f32;
        let mut original_area = 1.0f32;

        for d in 0..self.min.len() {
            let new_min = self.min[d].min(other.min[d]);
            let new_max = self.max[d].max(other.max[d]);

            original_area *= self.max[d] - self.min[d];
            combined_area *= new_max - new_min;
        }

        combined_area - original_area
    }

    /// 计算两个矩形的交集面积
    ///
    /// 任何一维不相交则交集面积为0。
    pub fn overlap_area(&self, other: &Rectangle) -> f32 {
        let mut area = 1.0f32;
        for d in 0..self.min.len() {
            let overlap_min = self.min[d].max(other.min[d]);
            let overlap_max = self.max[d].min(other.max[d]);

            if overlap_max < overlap_min {
                return 0.0;
            }
            area *= overlap_max - overlap_min;
        }
        area
    }

    /// 判断两个矩形是否相交
    ///
    /// 边界相接也算相交。这是查询用的布尔判定,与 `overlap_area` 分开:
    /// 点矩形和恰好落在查询边界上的记录交集面积为0,但仍然相交。
    pub fn intersects(&self, other: &Rectangle) -> bool {
        for d in 0..self.min.len() {
            if other.min[d] > self.max[d] || other.max[d] < self.min[d] {
                return false;
            }
        }
        true
    }

    /// 计算矩形中心点
    pub fn center(&self) -> Vec<f32> {
        self.min
            .iter()
            .zip(&self.max)
            .map(|(lo, hi)| (lo + hi) / 2.0)
            .collect()
    }

    /// 单个维度上的中心坐标,排序比较时避免分配整个中心向量
    pub fn center_coord(&self, axis: usize) -> f32 {
        (self.min[axis] + self.max[axis]) / 2.0
    }

    /// 判断矩形是否为点(每一维宽度都为0)
    pub fn is_point(&self) -> bool {
        self.min == self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_creation() {
        let rect = Rectangle::new(1, vec![0.0, 0.0], vec![10.0, 10.0]);
        assert_eq!(rect.min, vec![0.0, 0.0]);
        assert_eq!(rect.max, vec![10.0, 10.0]);
        assert_eq!(rect.dimensions(), 2);
    }

    #[test]
    fn test_rectangle_area() {
        let rect = Rectangle::new(-1, vec![0.0, 0.0], vec![10.0, 5.0]);
        assert_eq!(rect.area(), 50.0);

        // 点矩形面积为0
        let point = Rectangle::from_point(7, vec![3.0, 4.0]);
        assert_eq!(point.area(), 0.0);
    }

    #[test]
    fn test_rectangle_union() {
        let rect1 = Rectangle::new(-1, vec![0.0, 0.0], vec![5.0, 5.0]);
        let rect2 = Rectangle::new(-1, vec![3.0, 3.0], vec![8.0, 8.0]);
        let union = rect1.union(&rect2);
        assert_eq!(union, Rectangle::new(-1, vec![0.0, 0.0], vec![8.0, 8.0]));
    }

    #[test]
    fn test_union_laws() {
        // 并集满足交换律、结合律、幂等律,单位元是空矩形
        let a = Rectangle::new(-1, vec![0.0, 0.0], vec![2.0, 2.0]);
        let b = Rectangle::new(-1, vec![1.0, -1.0], vec![3.0, 1.0]);
        let c = Rectangle::new(-1, vec![-2.0, 0.5], vec![0.5, 4.0]);

        assert_eq!(a.union(&b), b.union(&a));
        assert_eq!(a.union(&b).union(&c), a.union(&b.union(&c)));
        assert_eq!(a.union(&a), a);

        let identity = Rectangle::new_empty(2);
        assert_eq!(identity.union(&a), a);
        assert_eq!(a.union(&identity), a);
    }

    #[test]
    fn test_combine() {
        let rects = vec![
            Rectangle::new(1, vec![0.0, 0.0], vec![1.0, 1.0]),
            Rectangle::new(2, vec![4.0, 4.0], vec![5.0, 6.0]),
            Rectangle::new(3, vec![-2.0, 2.0], vec![0.0, 3.0]),
        ];
        let combined = Rectangle::combine(&rects);
        assert_eq!(combined, Rectangle::new(-1, vec![-2.0, 0.0], vec![5.0, 6.0]));
        assert_eq!(combined.id, -1);

        // 空序列返回零维单位元
        assert_eq!(Rectangle::combine(&[]).dimensions(), 0);
    }

    #[test]
    fn test_area_increase() {
        let rect1 = Rectangle::new(-1, vec![0.0, 0.0], vec![5.0, 5.0]);
        let rect2 = Rectangle::new(-1, vec![3.0, 3.0], vec![8.0, 8.0]);
        // 8*8 - 5*5 = 64 - 25 = 39
        assert_eq!(rect1.area_increase(&rect2), 39.0);
        // 包含在内部的矩形不需要扩大
        let inner = Rectangle::new(-1, vec![1.0, 1.0], vec![2.0, 2.0]);
        assert_eq!(rect1.area_increase(&inner), 0.0);
    }

    #[test]
    fn test_overlap_area() {
        let rect1 = Rectangle::new(-1, vec![0.0, 0.0], vec![5.0, 5.0]);
        let rect2 = Rectangle::new(-1, vec![3.0, 3.0], vec![8.0, 8.0]);
        assert_eq!(rect1.overlap_area(&rect2), 4.0);

        let rect3 = Rectangle::new(-1, vec![10.0, 10.0], vec![15.0, 15.0]);
        assert_eq!(rect1.overlap_area(&rect3), 0.0);

        // 只在边界相接,交集面积为0但仍然相交
        let rect4 = Rectangle::new(-1, vec![5.0, 0.0], vec![9.0, 5.0]);
        assert_eq!(rect1.overlap_area(&rect4), 0.0);
        assert!(rect1.intersects(&rect4));
    }

    #[test]
    fn test_intersects() {
        let rect1 = Rectangle::new(-1, vec![0.0, 0.0], vec![5.0, 5.0]);
        let rect2 = Rectangle::new(-1, vec![3.0, 3.0], vec![8.0, 8.0]);
        let rect3 = Rectangle::new(-1, vec![10.0, 10.0], vec![15.0, 15.0]);

        assert!(rect1.intersects(&rect2));
        assert!(rect2.intersects(&rect1)); // 对称
        assert!(!rect1.intersects(&rect3));

        // 点矩形落在查询边界上
        let point = Rectangle::from_point(1, vec![5.0, 5.0]);
        assert!(rect1.intersects(&point));
        assert!(point.intersects(&rect1));
    }

    #[test]
    fn test_center() {
        let rect = Rectangle::new(-1, vec![0.0, 2.0], vec![4.0, 6.0]);
        assert_eq!(rect.center(), vec![2.0, 4.0]);
        assert_eq!(rect.center_coord(0), 2.0);
        assert_eq!(rect.center_coord(1), 4.0);
    }

    #[test]
    fn test_equality_ignores_id() {
        let a = Rectangle::new(1, vec![0.0, 0.0], vec![1.0, 1.0]);
        let b = Rectangle::new(2, vec![0.0, 0.0], vec![1.0, 1.0]);
        assert_eq!(a, b);
    }
}
