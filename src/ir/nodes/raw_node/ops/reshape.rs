use crate::ir::descriptor::NodeTypeDescriptor;
use crate::ir::nodes::raw_node::{InputInfo, OutputInfo, TraitOp, check_input_count};
use crate::ir::shape::checked_product;
use crate::ir::{Dim, GraphError, PartialShape};

/// Reshape 节点：输入 0 为数据，输入 1 为一维整数目标形状
///
/// 目标形状中：
/// - `-1` 表示由元素总数推出（至多一个）
/// - `0` 在 `special_zero` 为 true 时表示沿用输入的对应维度
#[derive(Debug, Clone)]
pub(crate) struct Reshape {
    special_zero: bool,
}

impl Reshape {
    pub(crate) const fn new(special_zero: bool) -> Self {
        Self { special_zero }
    }

    fn infer_with_pattern(
        &self,
        data: &PartialShape,
        pattern: &[i64],
    ) -> Result<PartialShape, GraphError> {
        let mut dims: Vec<Dim> = Vec::with_capacity(pattern.len());
        let mut infer_index = None;
        for (i, &value) in pattern.iter().enumerate() {
            match value {
                -1 => {
                    if infer_index.replace(i).is_some() {
                        return Err(GraphError::ShapeInference(format!(
                            "Reshape的目标形状{pattern:?}中只能有一个-1"
                        )));
                    }
                    dims.push(None);
                }
                0 if self.special_zero => {
                    let copied = match data.rank() {
                        Some(rank) if i >= rank => {
                            return Err(GraphError::ShapeInference(format!(
                                "Reshape的目标形状{pattern:?}第{i}维为0，但输入{data}没有该维度"
                            )));
                        }
                        _ => data.dim(i),
                    };
                    dims.push(copied);
                }
                v if v < 0 => {
                    return Err(GraphError::ShapeInference(format!(
                        "Reshape的目标形状{pattern:?}中含有非法值{v}"
                    )));
                }
                v => {
                    let dim = usize::try_from(v).map_err(|_| {
                        GraphError::ShapeInference(format!(
                            "Reshape的目标形状{pattern:?}中的值{v}超出可表示范围"
                        ))
                    })?;
                    dims.push(Some(dim));
                }
            }
        }

        // 输入元素总数未知时只能给出部分形状
        let Some(total) = data.element_count()? else {
            return Ok(PartialShape::new(&dims));
        };

        let known: Option<Vec<usize>> = dims
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != infer_index)
            .map(|(_, d)| *d)
            .collect();
        let Some(known) = known else {
            return Ok(PartialShape::new(&dims));
        };
        let known = checked_product(known).ok_or_else(|| {
            GraphError::ShapeInference(format!("Reshape的目标形状{pattern:?}的元素总数溢出"))
        })?;

        match infer_index {
            Some(i) => {
                if known == 0 || total % known != 0 {
                    return Err(GraphError::ShapeInference(format!(
                        "无法将{total}个元素（输入{data}）reshape为{pattern:?}"
                    )));
                }
                dims[i] = Some(total / known);
            }
            None => {
                if known != total {
                    return Err(GraphError::ShapeInference(format!(
                        "无法将{total}个元素（输入{data}）reshape为{pattern:?}"
                    )));
                }
            }
        }
        Ok(PartialShape::new(&dims))
    }
}

impl TraitOp for Reshape {
    fn type_name(&self) -> &'static str {
        "Reshape"
    }

    fn infer_outputs(&self, inputs: &[InputInfo]) -> Result<Vec<OutputInfo>, GraphError> {
        check_input_count(inputs, 2, 2)?;
        let (data, pattern) = (&inputs[0], &inputs[1]);

        if !pattern.element_type.is_dynamic() && !pattern.element_type.is_integral() {
            return Err(GraphError::ShapeInference(format!(
                "Reshape的目标形状必须是整数类型，但得到: {}",
                pattern.element_type
            )));
        }
        if let Some(rank) = pattern.partial_shape.rank() {
            if rank != 1 {
                return Err(GraphError::ShapeInference(format!(
                    "Reshape的目标形状必须是一维张量，但得到: {}",
                    pattern.partial_shape
                )));
            }
        }

        let partial_shape = match &pattern.constant {
            Some(values) => self.infer_with_pattern(&data.partial_shape, values)?,
            // 目标形状非常量：只知道输出的秩（若目标长度已知）
            None => match pattern.partial_shape.dim(0) {
                Some(rank) => PartialShape::dynamic_with_rank(rank),
                None => PartialShape::dynamic(),
            },
        };
        Ok(vec![OutputInfo::new(data.element_type, partial_shape)])
    }

    fn to_descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::Reshape {
            special_zero: self.special_zero,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reshape_pattern_inference() {
        let reshape = Reshape::new(true);
        let data = PartialShape::fixed(&[1, 1000, 4]);

        assert_eq!(
            reshape.infer_with_pattern(&data, &[1, 4000]).unwrap(),
            PartialShape::fixed(&[1, 4000])
        );
        assert_eq!(
            reshape.infer_with_pattern(&data, &[0, -1]).unwrap(),
            PartialShape::fixed(&[1, 4000])
        );
        // 元素总数不一致
        assert!(
            reshape
                .infer_with_pattern(&PartialShape::fixed(&[4]), &[1, 4000])
                .is_err()
        );
        // 两个 -1
        assert!(reshape.infer_with_pattern(&data, &[-1, -1]).is_err());
    }

    #[test]
    fn test_reshape_pattern_overflow() {
        let reshape = Reshape::new(false);
        let result = reshape.infer_with_pattern(&PartialShape::fixed(&[4]), &[i64::MAX, 4]);
        assert!(matches!(
            result,
            Err(GraphError::ShapeInference(msg)) if msg.contains("溢出")
        ));
        // 输入元素数未知时不做乘积，只给出部分形状
        let partial = reshape
            .infer_with_pattern(&PartialShape::new(&[None]), &[i64::MAX, 4])
            .unwrap();
        assert_eq!(partial.dim(1), Some(4));
    }

    #[test]
    fn test_reshape_dynamic_input() {
        let reshape = Reshape::new(false);
        let data = PartialShape::new(&[None, Some(4)]);
        assert_eq!(
            reshape.infer_with_pattern(&data, &[-1, 2]).unwrap(),
            PartialShape::new(&[None, Some(2)])
        );
    }
}
