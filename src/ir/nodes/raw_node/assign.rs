use super::{InputInfo, NodeRole, OutputInfo, TraitOp, check_input_count};
use crate::ir::descriptor::NodeTypeDescriptor;
use crate::ir::GraphError;

/// 状态赋值节点：把输入写入名为 `variable_id` 的状态变量
///
/// 没有输出，只能作为图的 sink 被保留下来。输入可以暂缺（先建节点、后接线）。
#[derive(Debug, Clone)]
pub(crate) struct Assign {
    variable_id: String,
}

impl Assign {
    pub(crate) fn new(variable_id: &str) -> Self {
        Self {
            variable_id: variable_id.to_string(),
        }
    }
}

impl TraitOp for Assign {
    fn type_name(&self) -> &'static str {
        "Assign"
    }

    fn role(&self) -> NodeRole {
        NodeRole::Sink
    }

    fn output_count(&self) -> usize {
        0
    }

    fn infer_outputs(&self, inputs: &[InputInfo]) -> Result<Vec<OutputInfo>, GraphError> {
        check_input_count(inputs, 0, 1)?;
        Ok(Vec::new())
    }

    fn to_descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::Assign {
            variable_id: self.variable_id.clone(),
        }
    }
}
