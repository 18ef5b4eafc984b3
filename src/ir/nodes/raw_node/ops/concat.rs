use crate::ir::descriptor::NodeTypeDescriptor;
use crate::ir::nodes::raw_node::{InputInfo, OutputInfo, TraitOp};
use crate::ir::{Dim, ElementType, GraphError, PartialShape};

/// Concat 节点：沿 `axis` 拼接所有输入
///
/// axis 可为负数（从末尾计数）；除拼接轴外其余维度必须兼容。
#[derive(Debug, Clone)]
pub(crate) struct Concat {
    axis: i64,
}

impl Concat {
    pub(crate) const fn new(axis: i64) -> Self {
        Self { axis }
    }

    fn normalize_axis(&self, rank: usize) -> Result<usize, GraphError> {
        let rank_i = rank as i64;
        let axis = if self.axis < 0 {
            self.axis + rank_i
        } else {
            self.axis
        };
        if axis < 0 || axis >= rank_i {
            return Err(GraphError::ShapeInference(format!(
                "Concat的axis={}超出秩为{}的输入范围",
                self.axis, rank
            )));
        }
        Ok(axis as usize)
    }
}

impl TraitOp for Concat {
    fn type_name(&self) -> &'static str {
        "Concat"
    }

    fn infer_outputs(&self, inputs: &[InputInfo]) -> Result<Vec<OutputInfo>, GraphError> {
        if inputs.is_empty() {
            return Err(GraphError::ShapeInference(
                "Concat至少需要1个输入".to_string(),
            ));
        }

        // 1. 元素类型必须一致
        let mut element_type = ElementType::Dynamic;
        for input in inputs {
            element_type = element_type.merge(input.element_type).ok_or_else(|| {
                GraphError::ShapeInference(format!(
                    "Concat的输入元素类型不一致：{} 与 {}",
                    element_type, input.element_type
                ))
            })?;
        }

        // 2. 拼接轴上求和，其余维度合并
        let mut merged: Option<Vec<Dim>> = None;
        let mut axis_sum: Dim = Some(0);
        let mut axis_index = None;
        for input in inputs {
            let Some(dims) = input.partial_shape.dims() else {
                // 秩未知的输入让拼接轴长度也变为未知
                axis_sum = None;
                continue;
            };
            let axis = match axis_index {
                Some(axis) => axis,
                None => {
                    let axis = self.normalize_axis(dims.len())?;
                    axis_index = Some(axis);
                    axis
                }
            };
            if dims.len() <= axis {
                return Err(GraphError::ShapeInference(format!(
                    "Concat的输入秩不一致：{}",
                    input.partial_shape
                )));
            }
            axis_sum = match (axis_sum, dims[axis]) {
                (Some(sum), Some(d)) => Some(sum + d),
                _ => None,
            };

            let mut current = dims.to_vec();
            current[axis] = None;
            merged = match merged {
                None => Some(current),
                Some(prev) => {
                    let prev_shape = PartialShape::new(&prev);
                    let merged_shape = prev_shape
                        .merge(&PartialShape::new(&current))
                        .ok_or_else(|| {
                            GraphError::ShapeInference(format!(
                                "Concat的输入形状{}与{}在非拼接轴上不兼容",
                                prev_shape, input.partial_shape
                            ))
                        })?;
                    merged_shape.dims().map(<[Dim]>::to_vec)
                }
            };
        }

        let partial_shape = match (merged, axis_index) {
            (Some(mut dims), Some(axis)) => {
                dims[axis] = axis_sum;
                PartialShape::new(&dims)
            }
            _ => PartialShape::dynamic(),
        };
        Ok(vec![OutputInfo::new(element_type, partial_shape)])
    }

    fn to_descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::Concat { axis: self.axis }
    }
}
