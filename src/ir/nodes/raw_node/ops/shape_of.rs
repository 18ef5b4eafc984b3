use crate::ir::descriptor::NodeTypeDescriptor;
use crate::ir::nodes::raw_node::{InputInfo, OutputInfo, TraitOp, check_input_count};
use crate::ir::{ElementType, GraphError, PartialShape};

/// ShapeOf 节点：输出输入张量的形状（i64 一维张量）
#[derive(Debug, Clone, Default)]
pub(crate) struct ShapeOf;

impl TraitOp for ShapeOf {
    fn type_name(&self) -> &'static str {
        "ShapeOf"
    }

    fn infer_outputs(&self, inputs: &[InputInfo]) -> Result<Vec<OutputInfo>, GraphError> {
        check_input_count(inputs, 1, 1)?;
        // 输出长度等于输入的秩；秩未知时长度也未知
        let rank = inputs[0].partial_shape.rank();
        Ok(vec![OutputInfo::new(
            ElementType::I64,
            PartialShape::new(&[rank]),
        )])
    }

    fn to_descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::ShapeOf
    }
}
