use crate::ir::descriptor::NodeTypeDescriptor;
use crate::ir::nodes::raw_node::{InputInfo, OutputInfo, TraitOp, check_input_count};
use crate::ir::{ElementType, GraphError};

/// ReLU 激活节点
///
/// 逐元素算子：输出的类型和形状与输入完全一致
#[derive(Debug, Clone, Default)]
pub(crate) struct Relu;

impl TraitOp for Relu {
    fn type_name(&self) -> &'static str {
        "Relu"
    }

    fn infer_outputs(&self, inputs: &[InputInfo]) -> Result<Vec<OutputInfo>, GraphError> {
        check_input_count(inputs, 1, 1)?;
        let input = &inputs[0];
        if input.element_type == ElementType::Boolean {
            return Err(GraphError::ShapeInference(
                "Relu的输入不能是boolean类型".to_string(),
            ));
        }
        Ok(vec![OutputInfo::new(
            input.element_type,
            input.partial_shape.clone(),
        )])
    }

    fn to_descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::Relu
    }
}
