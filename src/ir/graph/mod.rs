/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : Graph 模块：由 Result/Sink/Parameter 界定的计算图
 *
 * 各 impl 块分散在子模块中：
 * - core.rs: 构造、名称、Parameter/Result/Sink 的增删
 * - ordering.rs: 拓扑排序与缓存
 * - lookup.rs: 按名称/索引查找输入输出、add_output
 * - reshape.rs: 全图类型推导与 reshape
 * - describe.rs: describe/summary
 */

mod core;
mod describe;
mod error;
mod lookup;
mod ordering;
mod reshape;
mod types;

pub use error::GraphError;
pub use ordering::topological_sort;
pub use types::{OutputTarget, ShapeTarget};

use crate::ir::nodes::NodeRef;
use crate::ir::shared_info::SharedGraphInfo;
use std::cell::RefCell;
use std::rc::Rc;

/// 计算图
///
/// 图本身只记录边界（Parameter/Result/Sink），节点之间的连接保存在节点上；
/// 从 Result 与 Sink 出发沿生产者边可达的所有节点构成这个图。
/// 多个图可以共享节点，每个图通过自己的 `SharedGraphInfo` 追踪拓扑缓存是否有效。
pub struct Graph {
    pub(in crate::ir::graph) name: String,
    pub(in crate::ir::graph) parameters: Vec<NodeRef>,
    pub(in crate::ir::graph) results: Vec<NodeRef>,
    pub(in crate::ir::graph) sinks: Vec<NodeRef>,
    pub(in crate::ir::graph) shared_info: Rc<SharedGraphInfo>,
    /// 最近一次的拓扑序；缓存有效时原样返回同一个 Rc
    pub(in crate::ir::graph) ordered_ops: RefCell<Rc<[NodeRef]>>,
}
