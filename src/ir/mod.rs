/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 计算图中间表示（IR）
 *
 * - nodes: 节点、输入/输出端口、算子类型
 * - graph: 由 Parameter/Result/Sink 界定的图，拓扑序缓存与查找/reshape
 * - shared_info: 图与其节点共享的缓存状态
 */

mod accessor;
mod descriptor;
mod display;
mod element_type;
mod graph;
mod nodes;
mod shape;
mod shared_info;

#[cfg(test)]
mod tests;

pub use accessor::{GraphAccessor, NodeAccessor};
pub use descriptor::{GraphDescriptor, NodeDescriptor, NodeTypeDescriptor, OutputDescriptor};
pub use element_type::ElementType;
pub use graph::{Graph, GraphError, OutputTarget, ShapeTarget, topological_sort};
pub use nodes::{Input, Node, NodeId, NodeRef, NodeRole, Output, replace_node};
pub use shape::{Dim, PartialShape};
pub use shared_info::SharedGraphInfo;
