/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : Node 构建方法（new_*）
 *
 * 每个构建方法都会立即完成一次类型/形状推导，推导失败则不产生节点。
 */

use super::raw_node::{Assign, Concat, Constant, Parameter, Relu, Reshape, ResultOp, ShapeOf};
use super::{Node, NodeRef, Output};
use crate::ir::{ElementType, GraphError, PartialShape};

impl Node {
    /// 创建图输入节点
    pub fn new_parameter(
        element_type: ElementType,
        partial_shape: impl Into<PartialShape>,
        name: Option<&str>,
    ) -> Result<NodeRef, GraphError> {
        Self::new(
            Parameter::new(element_type, partial_shape.into()),
            &[],
            name,
        )
    }

    /// 创建图输出节点
    pub fn new_result(source: &Output, name: Option<&str>) -> Result<NodeRef, GraphError> {
        Self::new(ResultOp, &[source.clone()], name)
    }

    /// 创建整数常量节点
    pub fn new_constant(
        element_type: ElementType,
        shape: &[usize],
        values: &[i64],
        name: Option<&str>,
    ) -> Result<NodeRef, GraphError> {
        Self::new(Constant::new(element_type, shape, values)?, &[], name)
    }

    pub fn new_relu(input: &Output, name: Option<&str>) -> Result<NodeRef, GraphError> {
        Self::new(Relu, &[input.clone()], name)
    }

    pub fn new_concat(
        inputs: &[Output],
        axis: i64,
        name: Option<&str>,
    ) -> Result<NodeRef, GraphError> {
        Self::new(Concat::new(axis), inputs, name)
    }

    pub fn new_shape_of(input: &Output, name: Option<&str>) -> Result<NodeRef, GraphError> {
        Self::new(ShapeOf, &[input.clone()], name)
    }

    pub fn new_reshape(
        data: &Output,
        pattern: &Output,
        special_zero: bool,
        name: Option<&str>,
    ) -> Result<NodeRef, GraphError> {
        Self::new(
            Reshape::new(special_zero),
            &[data.clone(), pattern.clone()],
            name,
        )
    }

    /// 创建状态赋值节点（sink）；`source` 可以暂缺，之后用 `set_arguments` 接上
    pub fn new_assign(
        variable_id: &str,
        source: Option<&Output>,
        name: Option<&str>,
    ) -> Result<NodeRef, GraphError> {
        let inputs: Vec<Output> = source.into_iter().cloned().collect();
        Self::new(Assign::new(variable_id), &inputs, name)
    }
}
