use super::{InputInfo, NodeRole, OutputInfo, TraitOp, check_input_count};
use crate::ir::descriptor::NodeTypeDescriptor;
use crate::ir::{ElementType, GraphError, PartialShape};

/// 图输入节点
///
/// 没有输入端；唯一输出的类型/形状由用户声明，reshape 时被改写。
#[derive(Debug, Clone)]
pub(crate) struct Parameter {
    element_type: ElementType,
    partial_shape: PartialShape,
}

impl Parameter {
    pub(crate) const fn new(element_type: ElementType, partial_shape: PartialShape) -> Self {
        Self {
            element_type,
            partial_shape,
        }
    }

    pub(crate) const fn partial_shape(&self) -> &PartialShape {
        &self.partial_shape
    }

    pub(crate) fn set_partial_shape(&mut self, partial_shape: PartialShape) {
        self.partial_shape = partial_shape;
    }

    pub(crate) const fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub(crate) fn set_element_type(&mut self, element_type: ElementType) {
        self.element_type = element_type;
    }
}

impl TraitOp for Parameter {
    fn type_name(&self) -> &'static str {
        "Parameter"
    }

    fn role(&self) -> NodeRole {
        NodeRole::Parameter
    }

    fn infer_outputs(&self, inputs: &[InputInfo]) -> Result<Vec<OutputInfo>, GraphError> {
        check_input_count(inputs, 0, 0)?;
        Ok(vec![OutputInfo::new(
            self.element_type,
            self.partial_shape.clone(),
        )])
    }

    fn to_descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::Parameter
    }
}
