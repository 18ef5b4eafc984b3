use super::{InputInfo, NodeRole, OutputInfo, TraitOp, check_input_count};
use crate::ir::descriptor::NodeTypeDescriptor;
use crate::ir::GraphError;

/// 图输出节点
///
/// 输出端口与其输入的源张量是同一个张量：类型/形状原样透传，
/// 张量名也直接取自源端口（见 `Output::tensor_owner`）。
#[derive(Debug, Clone, Default)]
pub(crate) struct ResultOp;

impl TraitOp for ResultOp {
    fn type_name(&self) -> &'static str {
        "Result"
    }

    fn role(&self) -> NodeRole {
        NodeRole::Result
    }

    fn infer_outputs(&self, inputs: &[InputInfo]) -> Result<Vec<OutputInfo>, GraphError> {
        check_input_count(inputs, 1, 1)?;
        Ok(vec![OutputInfo::new(
            inputs[0].element_type,
            inputs[0].partial_shape.clone(),
        )])
    }

    fn to_descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::Result
    }
}
