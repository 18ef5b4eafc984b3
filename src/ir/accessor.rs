/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 只读访问图/节点内部的共享信息（调试与测试用）
 */

use crate::ir::graph::Graph;
use crate::ir::nodes::Node;
use crate::ir::shared_info::SharedGraphInfo;
use std::rc::Rc;

/// 暴露 `Graph` 自己的 `SharedGraphInfo`
pub struct GraphAccessor<'a> {
    graph: &'a Graph,
}

impl<'a> GraphAccessor<'a> {
    pub const fn new(graph: &'a Graph) -> Self {
        Self { graph }
    }

    pub fn shared_info(&self) -> Rc<SharedGraphInfo> {
        Rc::clone(self.graph.shared_info())
    }
}

/// 暴露节点当前所属各图的 `SharedGraphInfo`
pub struct NodeAccessor<'a> {
    node: &'a Node,
}

impl<'a> NodeAccessor<'a> {
    pub const fn new(node: &'a Node) -> Self {
        Self { node }
    }

    /// 仍存活的成员关系
    pub fn shared_info(&self) -> Vec<Rc<SharedGraphInfo>> {
        self.node.shared_infos()
    }

    pub fn belongs_to(&self, info: &Rc<SharedGraphInfo>) -> bool {
        self.node.has_shared_info(info)
    }
}
