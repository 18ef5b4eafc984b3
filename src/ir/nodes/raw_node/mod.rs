/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 节点的具体算子类型（原始节点）
 *
 * 这里只提供驱动图核心所需的最小算子集合，每个算子只负责自己的
 * “校验并推导输出类型/形状”。更完整的逐算子推导规则属于上层算子库。
 */

mod assign;
mod constant;
mod ops;
mod parameter;
mod result;

pub(crate) use assign::Assign;
pub(crate) use constant::Constant;
pub(crate) use ops::*;
pub(crate) use parameter::Parameter;
pub(crate) use result::ResultOp;

use crate::ir::descriptor::NodeTypeDescriptor;
use crate::ir::{ElementType, GraphError, PartialShape};
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

#[enum_dispatch]
#[derive(Debug, Clone)]
pub(crate) enum OpKind {
    Parameter,
    ResultOp,
    Constant,
    Assign,
    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓算子↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    Relu,
    Concat,
    ShapeOf,
    Reshape,
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑算子↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/
}

/// 节点在图中的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    /// 图输入
    Parameter,
    /// 图输出
    Result,
    /// 有副作用的终端节点（如状态赋值）
    Sink,
    /// 普通算子
    Op,
}

/// 推导时某个输入端可见的信息
#[derive(Debug, Clone)]
pub(crate) struct InputInfo {
    pub element_type: ElementType,
    pub partial_shape: PartialShape,
    /// 若输入来自常量节点，则为其整数取值
    pub constant: Option<Vec<i64>>,
}

/// 推导得到的某个输出的类型与形状
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OutputInfo {
    pub element_type: ElementType,
    pub partial_shape: PartialShape,
}

impl OutputInfo {
    pub(crate) const fn new(element_type: ElementType, partial_shape: PartialShape) -> Self {
        Self {
            element_type,
            partial_shape,
        }
    }
}

#[enum_dispatch(OpKind)]
pub(crate) trait TraitOp {
    fn type_name(&self) -> &'static str;

    fn role(&self) -> NodeRole {
        NodeRole::Op
    }

    /// 输出端口数量（节点创建时即固定）
    fn output_count(&self) -> usize {
        1
    }

    // 根据输入端的类型/形状推导本算子各输出的类型/形状（只在 Node 中调用，
    // 返回的 ShapeInference 错误信息不必包含节点信息，Node 会补上）
    fn infer_outputs(&self, inputs: &[InputInfo]) -> Result<Vec<OutputInfo>, GraphError>;

    /// 常量节点的整数取值（其余算子为 None）
    fn constant_values(&self) -> Option<&[i64]> {
        None
    }

    fn to_descriptor(&self) -> NodeTypeDescriptor;
}

/// 检查输入数量是否在 [min, max] 范围内
pub(crate) fn check_input_count(
    inputs: &[InputInfo],
    min: usize,
    max: usize,
) -> Result<(), GraphError> {
    if inputs.len() < min || inputs.len() > max {
        let expected = if min == max {
            format!("{min}")
        } else {
            format!("{min}~{max}")
        };
        return Err(GraphError::ShapeInference(format!(
            "需要{expected}个输入，实际为{}个",
            inputs.len()
        )));
    }
    Ok(())
}
