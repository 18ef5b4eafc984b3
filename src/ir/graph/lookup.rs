/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : Graph 输入/输出查找与 add_output
 */

use super::{Graph, GraphError, OutputTarget};
use crate::ir::nodes::{Node, NodeRef, Output};
use std::rc::Rc;
use tracing::debug;

impl Graph {
    // ========== 输入（Parameter 的输出）==========

    pub fn inputs(&self) -> Result<Vec<Output>, GraphError> {
        self.parameters.iter().map(|p| p.output(0)).collect()
    }

    /// 图唯一的输入；Parameter 不是恰好一个时报错
    pub fn input(&self) -> Result<Output, GraphError> {
        single_port(&self.parameters, "Parameter")
    }

    pub fn input_at(&self, index: usize) -> Result<Output, GraphError> {
        port_at(&self.parameters, index)
    }

    pub fn input_by_name(&self, tensor_name: &str) -> Result<Output, GraphError> {
        port_by_name(&self.parameters, tensor_name)
    }

    // ========== 输出（Result 的输出）==========

    pub fn outputs(&self) -> Result<Vec<Output>, GraphError> {
        self.results.iter().map(|r| r.output(0)).collect()
    }

    /// 图唯一的输出；Result 不是恰好一个时报错
    pub fn output(&self) -> Result<Output, GraphError> {
        single_port(&self.results, "Result")
    }

    pub fn output_at(&self, index: usize) -> Result<Output, GraphError> {
        port_at(&self.results, index)
    }

    /// Result 的输出与其源张量同名，因此可以用源张量的名字找到对应 Result 的输出
    pub fn output_by_name(&self, tensor_name: &str) -> Result<Output, GraphError> {
        port_by_name(&self.results, tensor_name)
    }

    // ========== add_output ==========

    /// 把图中某个张量追加为图输出，返回对应 Result 的输出端口
    ///
    /// - 目标本身已是 Result 的输出时原样返回
    /// - 图中已有 Result 连到该张量时返回那个 Result 的输出，不重复创建
    pub fn add_output(&mut self, target: impl Into<OutputTarget>) -> Result<Output, GraphError> {
        let port = self.resolve_output_target(target.into())?;
        if port.node().is_result() {
            return Ok(port);
        }
        for result in &self.results {
            if result.input_value(0)? == port {
                return result.output(0);
            }
        }

        let result = Node::new_result(&port, None)?;
        self.results.push(Rc::clone(&result));
        self.invalidate_cache();
        debug!(graph = %self.name, port = %port, "追加图输出");
        result.output(0)
    }

    fn resolve_output_target(&self, target: OutputTarget) -> Result<Output, GraphError> {
        let ordered = self.ordered_ops()?;
        match target {
            OutputTarget::TensorName(name) => {
                let mut candidates = Vec::new();
                for node in ordered.iter().filter(|n| !n.is_result()) {
                    candidates.extend(node.outputs().into_iter().filter(|o| o.has_name(&name)));
                }
                match candidates.len() {
                    0 => Err(GraphError::NameNotFound(name)),
                    1 => Ok(candidates.remove(0)),
                    _ => Err(GraphError::AmbiguousPort(format!(
                        "张量名'{name}'对应多个输出"
                    ))),
                }
            }
            OutputTarget::OpOutput { op_name, index } => {
                let matched: Vec<&NodeRef> = ordered
                    .iter()
                    .filter(|n| n.friendly_name() == op_name)
                    .collect();
                match matched.as_slice() {
                    [] => Err(GraphError::NameNotFound(op_name)),
                    [node] => node.output(index),
                    _ => Err(GraphError::AmbiguousPort(format!(
                        "节点名'{op_name}'对应多个节点"
                    ))),
                }
            }
            OutputTarget::Port(port) => {
                if ordered.iter().any(|n| Rc::ptr_eq(n, port.node())) {
                    Ok(port)
                } else {
                    Err(GraphError::NodeNotFound(port.node().id()))
                }
            }
        }
    }
}

fn single_port(nodes: &[NodeRef], kind: &str) -> Result<Output, GraphError> {
    match nodes {
        [node] => node.output(0),
        _ => Err(GraphError::AmbiguousPort(format!(
            "图中有{}个{kind}，请通过索引或张量名指定",
            nodes.len()
        ))),
    }
}

fn port_at(nodes: &[NodeRef], index: usize) -> Result<Output, GraphError> {
    nodes
        .get(index)
        .ok_or(GraphError::IndexOutOfRange {
            index,
            len: nodes.len(),
        })?
        .output(0)
}

/// 名字对应多个不同张量时报错；多个 Result 连到同一源张量视为同一张量
fn port_by_name(nodes: &[NodeRef], tensor_name: &str) -> Result<Output, GraphError> {
    let mut matched: Vec<Output> = Vec::new();
    for node in nodes {
        let port = node.output(0)?;
        if port.has_name(tensor_name) {
            matched.push(port);
        }
    }
    let Some(first) = matched.first() else {
        return Err(GraphError::NameNotFound(tensor_name.to_string()));
    };
    let owner = first.tensor_owner();
    if let Some(other) = matched.iter().find(|p| p.tensor_owner() != owner) {
        return Err(GraphError::NameConflict(format!(
            "张量名'{tensor_name}'同时属于{owner}和{}",
            other.tensor_owner()
        )));
    }
    Ok(first.clone())
}
