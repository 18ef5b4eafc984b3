use super::{InputInfo, OutputInfo, TraitOp, check_input_count};
use crate::ir::descriptor::NodeTypeDescriptor;
use crate::ir::{ElementType, GraphError, PartialShape};

/// 整数常量节点（主要用作 Reshape 的目标形状等“形状类”输入）
#[derive(Debug, Clone)]
pub(crate) struct Constant {
    element_type: ElementType,
    shape: Vec<usize>,
    values: Vec<i64>,
}

impl Constant {
    pub(crate) fn new(
        element_type: ElementType,
        shape: &[usize],
        values: &[i64],
    ) -> Result<Self, GraphError> {
        if !element_type.is_integral() {
            return Err(GraphError::InvalidOperation(format!(
                "Constant节点只支持整数类型，但得到: {element_type}"
            )));
        }
        let expected = shape.iter().product::<usize>();
        if values.len() != expected {
            return Err(GraphError::InvalidOperation(format!(
                "Constant节点形状{shape:?}需要{expected}个值，实际为{}个",
                values.len()
            )));
        }
        Ok(Self {
            element_type,
            shape: shape.to_vec(),
            values: values.to_vec(),
        })
    }
}

impl TraitOp for Constant {
    fn type_name(&self) -> &'static str {
        "Constant"
    }

    fn infer_outputs(&self, inputs: &[InputInfo]) -> Result<Vec<OutputInfo>, GraphError> {
        check_input_count(inputs, 0, 0)?;
        Ok(vec![OutputInfo::new(
            self.element_type,
            PartialShape::fixed(&self.shape),
        )])
    }

    fn constant_values(&self) -> Option<&[i64]> {
        Some(&self.values)
    }

    fn to_descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::Constant {
            values: self.values.clone(),
        }
    }
}
