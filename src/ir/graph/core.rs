/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : Graph 核心操作：构造、名称、Parameter/Result/Sink 的增删
 */

use super::{Graph, GraphError};
use crate::ir::nodes::{Node, NodeRef, NodeRole, Output};
use crate::ir::shared_info::SharedGraphInfo;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

impl Graph {
    // ========== 创建 ==========

    /// 由 Result 与 Parameter 构造图
    pub fn new(results: &[NodeRef], parameters: &[NodeRef]) -> Result<Self, GraphError> {
        Self::with_sinks(results, &[], parameters)
    }

    /// 由 Result、Sink 与 Parameter 构造图
    ///
    /// 构造时即完成一次拓扑排序；从根可达的 Parameter 必须都已在 `parameters` 中声明。
    pub fn with_sinks(
        results: &[NodeRef],
        sinks: &[NodeRef],
        parameters: &[NodeRef],
    ) -> Result<Self, GraphError> {
        check_boundary(&[], results, NodeRole::Result)?;
        check_boundary(&[], sinks, NodeRole::Sink)?;
        check_boundary(&[], parameters, NodeRole::Parameter)?;

        let graph = Self {
            name: "default_graph".to_string(),
            parameters: parameters.to_vec(),
            results: results.to_vec(),
            sinks: sinks.to_vec(),
            shared_info: SharedGraphInfo::new(),
            ordered_ops: RefCell::new(Rc::from(Vec::new())),
        };
        graph.ordered_ops()?;
        graph.check_parameters_declared()?;
        debug!(
            graph = %graph.name,
            results = graph.results.len(),
            sinks = graph.sinks.len(),
            parameters = graph.parameters.len(),
            "创建图"
        );
        Ok(graph)
    }

    /// 由任意输出端口构造图：不是 Result 输出的端口会被包上新的 Result 节点
    pub fn from_outputs(outputs: &[Output], parameters: &[NodeRef]) -> Result<Self, GraphError> {
        let results = outputs
            .iter()
            .map(|output| {
                if output.node().is_result() {
                    Ok(Rc::clone(output.node()))
                } else {
                    Node::new_result(output, None)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(&results, parameters)
    }

    /// 设置图名（构造时的链式写法）
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    // ========== 基础访问器 ==========

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn parameters(&self) -> &[NodeRef] {
        &self.parameters
    }

    pub fn results(&self) -> &[NodeRef] {
        &self.results
    }

    pub fn sinks(&self) -> &[NodeRef] {
        &self.sinks
    }

    pub fn parameter_index(&self, parameter: &NodeRef) -> Option<usize> {
        self.parameters.iter().position(|p| Rc::ptr_eq(p, parameter))
    }

    pub fn result_index(&self, result: &NodeRef) -> Option<usize> {
        self.results.iter().position(|r| Rc::ptr_eq(r, result))
    }

    pub(crate) const fn shared_info(&self) -> &Rc<SharedGraphInfo> {
        &self.shared_info
    }

    // ========== 边界增删（都会让拓扑缓存失效）==========

    pub fn add_parameters(&mut self, parameters: &[NodeRef]) -> Result<(), GraphError> {
        check_boundary(&self.parameters, parameters, NodeRole::Parameter)?;
        self.parameters.extend_from_slice(parameters);
        self.invalidate_cache();
        Ok(())
    }

    pub fn remove_parameter(&mut self, parameter: &NodeRef) -> Result<(), GraphError> {
        remove_boundary(&mut self.parameters, parameter)?;
        self.invalidate_cache();
        Ok(())
    }

    pub fn add_results(&mut self, results: &[NodeRef]) -> Result<(), GraphError> {
        check_boundary(&self.results, results, NodeRole::Result)?;
        self.results.extend_from_slice(results);
        self.invalidate_cache();
        Ok(())
    }

    pub fn remove_result(&mut self, result: &NodeRef) -> Result<(), GraphError> {
        remove_boundary(&mut self.results, result)?;
        self.invalidate_cache();
        Ok(())
    }

    pub fn add_sinks(&mut self, sinks: &[NodeRef]) -> Result<(), GraphError> {
        check_boundary(&self.sinks, sinks, NodeRole::Sink)?;
        self.sinks.extend_from_slice(sinks);
        self.invalidate_cache();
        Ok(())
    }

    pub fn remove_sink(&mut self, sink: &NodeRef) -> Result<(), GraphError> {
        remove_boundary(&mut self.sinks, sink)?;
        self.invalidate_cache();
        Ok(())
    }

    /// 拓扑序中的每个 Parameter 都必须已在图中声明
    pub(in crate::ir::graph) fn check_parameters_declared(&self) -> Result<(), GraphError> {
        for node in self.ordered_ops()?.iter() {
            if node.is_parameter() && self.parameter_index(node).is_none() {
                return Err(GraphError::UndeclaredParameter(node.to_string()));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids = |nodes: &[NodeRef]| nodes.iter().map(|n| n.id()).collect::<Vec<_>>();
        f.debug_struct("Graph")
            .field("name", &self.name)
            .field("parameters", &ids(&self.parameters))
            .field("results", &ids(&self.results))
            .field("sinks", &ids(&self.sinks))
            .field("use_topological_cache", &self.shared_info.use_topological_cache())
            .finish()
    }
}

/// 检查待加入的边界节点：角色正确，且既不与已有节点重复、彼此之间也不重复
fn check_boundary(
    existing: &[NodeRef],
    incoming: &[NodeRef],
    role: NodeRole,
) -> Result<(), GraphError> {
    for (i, node) in incoming.iter().enumerate() {
        if node.role() != role {
            return Err(GraphError::InvalidOperation(format!(
                "{node}的角色不是{role:?}"
            )));
        }
        let duplicated = existing.iter().any(|n| Rc::ptr_eq(n, node))
            || incoming[..i].iter().any(|n| Rc::ptr_eq(n, node));
        if duplicated {
            return Err(GraphError::InvalidOperation(format!("{node}已在图中")));
        }
    }
    Ok(())
}

fn remove_boundary(list: &mut Vec<NodeRef>, node: &NodeRef) -> Result<(), GraphError> {
    let index = list
        .iter()
        .position(|n| Rc::ptr_eq(n, node))
        .ok_or(GraphError::NodeNotFound(node.id()))?;
    list.remove(index);
    Ok(())
}
