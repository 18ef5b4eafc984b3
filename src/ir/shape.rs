/*
 * PartialShape: 支持动态维度与动态秩的形状系统
 *
 * 张量形状在图构建时可能只部分已知：
 * - 某些维度未知（如 batch），写作 `?`
 * - 连维度数（秩）都未知，写作 `[...]`
 *
 * # 示例
 * ```
 * use only_infer::ir::PartialShape;
 *
 * let fixed = PartialShape::fixed(&[1, 3, 22, 22]);
 * assert_eq!(fixed.to_string(), "[1, 3, 22, 22]");
 *
 * let partial = PartialShape::new(&[Some(1), Some(3), None, Some(25)]);
 * assert_eq!(partial.to_string(), "[1, 3, ?, 25]");
 *
 * assert_eq!(PartialShape::dynamic().to_string(), "[...]");
 * ```
 */

use crate::ir::GraphError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 维度值：Some(n) 表示固定值 n，None 表示动态（任意值）
pub type Dim = Option<usize>;

/// 部分已知的形状
///
/// `dims` 为 None 表示秩（维度数）本身是动态的。
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartialShape {
    dims: Option<Vec<Dim>>,
}

impl PartialShape {
    /// 创建一个秩固定、维度可部分动态的形状
    pub fn new(dims: &[Dim]) -> Self {
        Self {
            dims: Some(dims.to_vec()),
        }
    }

    /// 从固定形状创建（所有维度都是确定的）
    pub fn fixed(dims: &[usize]) -> Self {
        Self {
            dims: Some(dims.iter().map(|&d| Some(d)).collect()),
        }
    }

    /// 秩未知的完全动态形状
    pub const fn dynamic() -> Self {
        Self { dims: None }
    }

    /// 秩已知但每一维都动态的形状
    pub fn dynamic_with_rank(rank: usize) -> Self {
        Self {
            dims: Some(vec![None; rank]),
        }
    }

    /// 获取秩（动态秩返回 None）
    pub fn rank(&self) -> Option<usize> {
        self.dims.as_ref().map(Vec::len)
    }

    /// 获取指定维度的值
    ///
    /// 维度动态、秩动态或越界时返回 None
    pub fn dim(&self, index: usize) -> Dim {
        self.dims
            .as_ref()
            .and_then(|dims| dims.get(index).copied().flatten())
    }

    /// 获取内部维度数组的引用（动态秩返回 None）
    pub fn dims(&self) -> Option<&[Dim]> {
        self.dims.as_deref()
    }

    /// 所有维度都确定
    pub fn is_static(&self) -> bool {
        self.dims
            .as_ref()
            .is_some_and(|dims| dims.iter().all(Option::is_some))
    }

    pub fn is_dynamic(&self) -> bool {
        !self.is_static()
    }

    /// 转换为固定形状向量（如果所有维度都是固定的）
    pub fn to_shape(&self) -> Option<Vec<usize>> {
        self.dims.as_ref()?.iter().copied().collect()
    }

    /// 元素总数（仅静态形状可知，动态时为 `Ok(None)`）；乘积溢出时报错
    pub fn element_count(&self) -> Result<Option<usize>, GraphError> {
        let Some(shape) = self.to_shape() else {
            return Ok(None);
        };
        checked_product(shape)
            .map(Some)
            .ok_or_else(|| GraphError::ShapeInference(format!("形状{self}的元素总数溢出")))
    }

    /// 检查此形状是否与另一个形状兼容
    ///
    /// 兼容规则：
    /// - 任一方秩动态则兼容
    /// - 秩必须相同
    /// - 对于每个维度：至少有一个是 None，或者值相等
    pub fn is_compatible(&self, other: &Self) -> bool {
        match (&self.dims, &other.dims) {
            (None, _) | (_, None) => true,
            (Some(a), Some(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(x, y)| match (x, y) {
                        (None, _) | (_, None) => true,
                        (Some(x), Some(y)) => x == y,
                    })
            }
        }
    }

    /// 合并两个形状，取更具体的值
    ///
    /// 如果两个形状不兼容，返回 None。
    pub fn merge(&self, other: &Self) -> Option<Self> {
        let (a, b) = match (&self.dims, &other.dims) {
            (None, _) => return Some(other.clone()),
            (_, None) => return Some(self.clone()),
            (Some(a), Some(b)) => (a, b),
        };
        if a.len() != b.len() {
            return None;
        }

        let merged: Option<Vec<Dim>> = a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| match (x, y) {
                (None, None) => Some(None),
                (Some(v), None) | (None, Some(v)) => Some(Some(*v)),
                (Some(x), Some(y)) => (x == y).then_some(Some(*x)),
            })
            .collect();

        merged.map(|dims| Self { dims: Some(dims) })
    }

    /// 转换为用于显示的字符串（动态维度显示为 ?，动态秩显示为 [...]）
    pub fn to_display_string(&self) -> String {
        let Some(dims) = &self.dims else {
            return "[...]".to_string();
        };
        let parts: Vec<String> = dims
            .iter()
            .map(|d| match d {
                Some(n) => n.to_string(),
                None => "?".to_string(),
            })
            .collect();
        format!("[{}]", parts.join(", "))
    }
}

/// 默认为秩未知的完全动态形状
impl Default for PartialShape {
    fn default() -> Self {
        Self::dynamic()
    }
}

impl fmt::Display for PartialShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

/// 从固定形状转换
impl From<&[usize]> for PartialShape {
    fn from(shape: &[usize]) -> Self {
        Self::fixed(shape)
    }
}

impl<const N: usize> From<[usize; N]> for PartialShape {
    fn from(shape: [usize; N]) -> Self {
        Self::fixed(&shape)
    }
}

impl From<Vec<usize>> for PartialShape {
    fn from(shape: Vec<usize>) -> Self {
        Self::fixed(&shape)
    }
}

impl From<Vec<Dim>> for PartialShape {
    fn from(dims: Vec<Dim>) -> Self {
        Self { dims: Some(dims) }
    }
}

/// 各维度之积，溢出时为 None
pub(crate) fn checked_product(dims: impl IntoIterator<Item = usize>) -> Option<usize> {
    dims.into_iter().try_fold(1_usize, usize::checked_mul)
}
