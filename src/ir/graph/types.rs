/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : Graph 模块的类型定义
 */

use crate::ir::nodes::Output;

/// `Graph::add_output` 的目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// 图中某个张量的名字
    TensorName(String),
    /// 按节点名（friendly name）+ 输出索引定位
    OpOutput { op_name: String, index: usize },
    /// 直接给出端口
    Port(Output),
}

impl From<&str> for OutputTarget {
    fn from(name: &str) -> Self {
        Self::TensorName(name.to_string())
    }
}

impl From<String> for OutputTarget {
    fn from(name: String) -> Self {
        Self::TensorName(name)
    }
}

impl From<(&str, usize)> for OutputTarget {
    fn from((op_name, index): (&str, usize)) -> Self {
        Self::OpOutput {
            op_name: op_name.to_string(),
            index,
        }
    }
}

impl From<Output> for OutputTarget {
    fn from(port: Output) -> Self {
        Self::Port(port)
    }
}

impl From<&Output> for OutputTarget {
    fn from(port: &Output) -> Self {
        Self::Port(port.clone())
    }
}

/// `Graph::reshape` 中一条新形状所针对的张量
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeTarget {
    /// Parameter 输出张量的名字
    TensorName(String),
    /// Parameter 的输出端口
    Port(Output),
}

impl From<&str> for ShapeTarget {
    fn from(name: &str) -> Self {
        Self::TensorName(name.to_string())
    }
}

impl From<String> for ShapeTarget {
    fn from(name: String) -> Self {
        Self::TensorName(name)
    }
}

impl From<Output> for ShapeTarget {
    fn from(port: Output) -> Self {
        Self::Port(port)
    }
}

impl From<&Output> for ShapeTarget {
    fn from(port: &Output) -> Self {
        Self::Port(port.clone())
    }
}
