/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : Graph 拓扑排序与拓扑缓存
 *
 * 排序规则（确定性）：
 * - 根依次为：Result（按加入顺序）、Sink、Parameter
 * - 每个节点先访问各输入的源节点（按输入索引），再访问控制依赖（按添加顺序）
 * - 后序输出，即每个节点都排在它的全部依赖之后
 */

use super::{Graph, GraphError};
use crate::ir::nodes::{NodeId, NodeRef};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::{debug, trace};

impl Graph {
    /// 获取图中所有节点的拓扑序
    ///
    /// 缓存有效时直接返回上一次的结果（同一个 `Rc`），否则重新遍历并
    /// 更新各节点与本图的成员关系。
    pub fn ordered_ops(&self) -> Result<Rc<[NodeRef]>, GraphError> {
        if self.shared_info.use_topological_cache() {
            return Ok(Rc::clone(&self.ordered_ops.borrow()));
        }

        let roots = self.roots();
        self.shared_info.set_roots(&roots);
        let ordered = topological_sort(&roots)?;

        // 1. 上次在序列中、这次不在的节点解除登记
        let current: HashSet<NodeId> = ordered.iter().map(|n| n.id()).collect();
        for node in self.shared_info.members() {
            if !current.contains(&node.id()) {
                node.remove_shared_info(&self.shared_info);
                trace!(graph = %self.name, node = %node.id(), "节点离开图");
            }
        }
        // 2. 新访问到的节点登记
        for node in &ordered {
            if !node.has_shared_info(&self.shared_info) {
                node.insert_shared_info(&self.shared_info);
                trace!(graph = %self.name, node = %node.id(), "节点加入图");
            }
        }
        self.shared_info.set_members(&ordered);

        let ordered: Rc<[NodeRef]> = ordered.into();
        *self.ordered_ops.borrow_mut() = Rc::clone(&ordered);
        self.shared_info.set_use_topological_cache(true);
        debug!(graph = %self.name, node_count = ordered.len(), "重新计算拓扑序");
        Ok(ordered)
    }

    /// 遍历的根：Result、Sink、Parameter
    pub(in crate::ir::graph) fn roots(&self) -> Vec<NodeRef> {
        self.results
            .iter()
            .chain(&self.sinks)
            .chain(&self.parameters)
            .cloned()
            .collect()
    }

    /// 图的边界改变时让缓存失效
    pub(in crate::ir::graph) fn invalidate_cache(&self) {
        if self.shared_info.use_topological_cache() {
            trace!(graph = %self.name, "图边界改变，拓扑缓存失效");
        }
        self.shared_info.set_use_topological_cache(false);
        self.shared_info.set_roots(&self.roots());
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// 从 `roots` 出发沿输入边与控制依赖做后序深度优先遍历
///
/// 返回的序列中每个节点都位于它的所有依赖之后；遇到环时返回 `CycleDetected`。
pub fn topological_sort(roots: &[NodeRef]) -> Result<Vec<NodeRef>, GraphError> {
    let mut marks: HashMap<NodeId, Mark> = HashMap::new();
    let mut ordered = Vec::new();
    // (节点, 它的依赖, 下一个待访问依赖的下标)
    let mut stack: Vec<(NodeRef, Vec<NodeRef>, usize)> = Vec::new();

    for root in roots {
        if marks.contains_key(&root.id()) {
            continue;
        }
        marks.insert(root.id(), Mark::Visiting);
        stack.push((Rc::clone(root), root.dependencies(), 0));

        while let Some((node, dependencies, next)) = stack.last_mut() {
            if let Some(dependency) = dependencies.get(*next) {
                *next += 1;
                match marks.get(&dependency.id()).copied() {
                    Some(Mark::Done) => {}
                    Some(Mark::Visiting) => {
                        return Err(GraphError::CycleDetected(format!("{dependency}位于环上")));
                    }
                    None => {
                        let dependency = Rc::clone(dependency);
                        marks.insert(dependency.id(), Mark::Visiting);
                        let nested = dependency.dependencies();
                        stack.push((dependency, nested, 0));
                    }
                }
            } else {
                marks.insert(node.id(), Mark::Done);
                ordered.push(Rc::clone(node));
                stack.pop();
            }
        }
    }
    Ok(ordered)
}
