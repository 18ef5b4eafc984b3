/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 计算图节点
 *
 * 节点以 `Rc<Node>`（即 `NodeRef`）共享所有权：多个图可以引用同一段子图，
 * 最后一个持有者释放时节点才被销毁。
 * - 数据边：输入端强引用源输出（生产者），输出端只弱引用消费者
 * - 控制依赖：强引用被依赖节点，被依赖节点弱引用依赖者
 * - 图成员关系：弱引用各图的 SharedGraphInfo
 * 所有改变拓扑的改写都会立刻让相关图的拓扑缓存失效。
 */

mod node_builders;
mod port;
pub(crate) mod raw_node;

pub use port::{Input, Output};
pub use raw_node::NodeRole;

use self::raw_node::{InputInfo, OpKind, TraitOp};
use crate::ir::descriptor::NodeTypeDescriptor;
use crate::ir::display::format_node_display;
use crate::ir::shared_info::SharedGraphInfo;
use crate::ir::{ElementType, GraphError, PartialShape};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::ptr;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// 进程内唯一的节点标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 节点的共享句柄
pub type NodeRef = Rc<Node>;

pub struct Node {
    id: NodeId,
    state: RefCell<NodeState>,
}

struct NodeState {
    friendly_name: String,
    op: OpKind,
    /// 每个输入端对应的源输出
    inputs: Vec<Output>,
    outputs: Vec<OutputSlot>,
    control_deps: Vec<NodeRef>,
    control_dependents: Vec<Weak<Node>>,
    /// 所属各图的共享信息（图被销毁后自动失活）
    shared_infos: Vec<Weak<SharedGraphInfo>>,
}

/// 输出端口的实际存储
#[derive(Default)]
struct OutputSlot {
    element_type: ElementType,
    partial_shape: PartialShape,
    names: BTreeSet<String>,
    /// 消费者：(节点, 输入索引)
    targets: Vec<(Weak<Node>, usize)>,
}

impl Node {
    /// 创建节点、登记到各源输出的消费者列表，并立即做一次类型/形状推导
    ///
    /// 未指定名称时使用 `{类型}_{id}`
    pub(crate) fn new(
        op: impl Into<OpKind>,
        arguments: &[Output],
        name: Option<&str>,
    ) -> Result<NodeRef, GraphError> {
        let op = op.into();
        for argument in arguments {
            argument.check_valid()?;
        }

        let id = NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed));
        let outputs = (0..op.output_count()).map(|_| OutputSlot::default()).collect();
        let node = Rc::new(Self {
            id,
            state: RefCell::new(NodeState {
                friendly_name: name.map_or_else(
                    || format!("{}_{}", op.type_name(), id),
                    ToString::to_string,
                ),
                op,
                inputs: arguments.to_vec(),
                outputs,
                control_deps: Vec::new(),
                control_dependents: Vec::new(),
                shared_infos: Vec::new(),
            }),
        });

        for (input_index, argument) in arguments.iter().enumerate() {
            argument.node().add_target(argument.index(), &node, input_index);
        }
        node.validate_and_infer_types()?;
        Ok(node)
    }

    // ========== 基础访问器 ==========

    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// 显示用名称，不要求唯一
    pub fn friendly_name(&self) -> String {
        self.state.borrow().friendly_name.clone()
    }

    pub fn set_friendly_name(&self, name: &str) {
        self.state.borrow_mut().friendly_name = name.to_string();
    }

    pub fn type_name(&self) -> &'static str {
        self.state.borrow().op.type_name()
    }

    pub fn role(&self) -> NodeRole {
        self.state.borrow().op.role()
    }

    pub fn is_parameter(&self) -> bool {
        self.role() == NodeRole::Parameter
    }

    pub fn is_result(&self) -> bool {
        self.role() == NodeRole::Result
    }

    pub fn is_sink(&self) -> bool {
        self.role() == NodeRole::Sink
    }

    pub fn input_size(&self) -> usize {
        self.state.borrow().inputs.len()
    }

    pub fn output_size(&self) -> usize {
        self.state.borrow().outputs.len()
    }

    // ========== 端口 ==========

    pub fn input(self: &Rc<Self>, index: usize) -> Result<Input, GraphError> {
        let len = self.input_size();
        if index >= len {
            return Err(GraphError::IndexOutOfRange { index, len });
        }
        Ok(Input::new(Rc::clone(self), index))
    }

    pub fn inputs(self: &Rc<Self>) -> Vec<Input> {
        (0..self.input_size())
            .map(|i| Input::new(Rc::clone(self), i))
            .collect()
    }

    pub fn output(self: &Rc<Self>, index: usize) -> Result<Output, GraphError> {
        let len = self.output_size();
        if index >= len {
            return Err(GraphError::IndexOutOfRange { index, len });
        }
        Ok(Output::new(Rc::clone(self), index))
    }

    pub fn outputs(self: &Rc<Self>) -> Vec<Output> {
        (0..self.output_size())
            .map(|i| Output::new(Rc::clone(self), i))
            .collect()
    }

    /// 第 `index` 个输入端当前连接的源输出
    pub fn input_value(&self, index: usize) -> Result<Output, GraphError> {
        let state = self.state.borrow();
        state
            .inputs
            .get(index)
            .cloned()
            .ok_or(GraphError::IndexOutOfRange {
                index,
                len: state.inputs.len(),
            })
    }

    pub fn input_values(&self) -> Vec<Output> {
        self.state.borrow().inputs.clone()
    }

    pub fn output_element_type(&self, index: usize) -> Result<ElementType, GraphError> {
        let state = self.state.borrow();
        state
            .outputs
            .get(index)
            .map(|slot| slot.element_type)
            .ok_or(GraphError::IndexOutOfRange {
                index,
                len: state.outputs.len(),
            })
    }

    pub fn output_partial_shape(&self, index: usize) -> Result<PartialShape, GraphError> {
        let state = self.state.borrow();
        state
            .outputs
            .get(index)
            .map(|slot| slot.partial_shape.clone())
            .ok_or(GraphError::IndexOutOfRange {
                index,
                len: state.outputs.len(),
            })
    }

    /// 排序时需要先于本节点的所有节点：各输入的源节点，然后是控制依赖
    pub(crate) fn dependencies(&self) -> Vec<NodeRef> {
        let state = self.state.borrow();
        state
            .inputs
            .iter()
            .map(|source| Rc::clone(source.node()))
            .chain(state.control_deps.iter().cloned())
            .collect()
    }

    // ========== 数据边改写 ==========

    /// 把第 `index` 个输入改接到 `source`
    pub fn set_argument(self: &Rc<Self>, index: usize, source: &Output) -> Result<(), GraphError> {
        source.check_valid()?;
        let old_source = {
            let mut state = self.state.borrow_mut();
            let len = state.inputs.len();
            let slot = state
                .inputs
                .get_mut(index)
                .ok_or(GraphError::IndexOutOfRange { index, len })?;
            std::mem::replace(slot, source.clone())
        };

        old_source
            .node()
            .remove_target(old_source.index(), self, index);
        source.node().add_target(source.index(), self, index);

        invalidate_nodes([self.as_ref(), old_source.node().as_ref(), source.node().as_ref()]);
        Ok(())
    }

    /// 整体替换所有输入（输入个数可以改变，本节点的输出与其消费者不受影响）
    pub fn set_arguments(self: &Rc<Self>, sources: &[Output]) -> Result<(), GraphError> {
        for source in sources {
            source.check_valid()?;
        }
        let old_sources = std::mem::replace(&mut self.state.borrow_mut().inputs, sources.to_vec());

        for (index, old) in old_sources.iter().enumerate() {
            old.node().remove_target(old.index(), self, index);
        }
        for (index, source) in sources.iter().enumerate() {
            source.node().add_target(source.index(), self, index);
        }

        invalidate_nodes(
            std::iter::once(self.as_ref())
                .chain(old_sources.iter().map(|o| o.node().as_ref()))
                .chain(sources.iter().map(|o| o.node().as_ref())),
        );
        Ok(())
    }

    // ========== 控制依赖 ==========

    pub fn control_dependencies(&self) -> Vec<NodeRef> {
        self.state.borrow().control_deps.clone()
    }

    pub fn control_dependents(&self) -> Vec<NodeRef> {
        self.state
            .borrow()
            .control_dependents
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }

    /// 要求 `dependency` 排在本节点之前（不产生数据边）
    pub fn add_control_dependency(self: &Rc<Self>, dependency: &NodeRef) -> Result<(), GraphError> {
        if Rc::ptr_eq(self, dependency) {
            return Err(GraphError::InvalidOperation(format!(
                "{self}不能控制依赖自身"
            )));
        }
        {
            let mut state = self.state.borrow_mut();
            if state.control_deps.iter().any(|d| Rc::ptr_eq(d, dependency)) {
                return Ok(());
            }
            state.control_deps.push(Rc::clone(dependency));
        }
        dependency
            .state
            .borrow_mut()
            .control_dependents
            .push(Rc::downgrade(self));

        invalidate_nodes([self.as_ref(), dependency.as_ref()]);
        Ok(())
    }

    /// 移除一条控制依赖，返回是否确实移除了
    pub fn remove_control_dependency(self: &Rc<Self>, dependency: &NodeRef) -> bool {
        let removed = {
            let mut state = self.state.borrow_mut();
            let before = state.control_deps.len();
            state.control_deps.retain(|d| !Rc::ptr_eq(d, dependency));
            before != state.control_deps.len()
        };
        if removed {
            dependency.forget_dependent(self);
            invalidate_nodes([self.as_ref(), dependency.as_ref()]);
        }
        removed
    }

    pub fn clear_control_dependencies(self: &Rc<Self>) {
        let dependencies = std::mem::take(&mut self.state.borrow_mut().control_deps);
        if dependencies.is_empty() {
            return;
        }
        for dependency in &dependencies {
            dependency.forget_dependent(self);
        }
        invalidate_nodes(std::iter::once(self.as_ref()).chain(dependencies.iter().map(|d| d.as_ref())));
    }

    fn forget_dependent(&self, dependent: &Node) {
        self.state
            .borrow_mut()
            .control_dependents
            .retain(|w| w.strong_count() > 0 && !ptr::eq(w.as_ptr(), dependent));
    }

    // ========== 类型/形状推导 ==========

    /// 校验本节点并根据输入推导各输出的类型与形状
    pub fn validate_and_infer_types(&self) -> Result<(), GraphError> {
        let input_infos = self
            .input_values()
            .iter()
            .map(Output::to_input_info)
            .collect::<Vec<InputInfo>>();

        let inferred = self
            .state
            .borrow()
            .op
            .infer_outputs(&input_infos)
            .map_err(|e| self.decorate_error(e))?;

        let mut state = self.state.borrow_mut();
        if inferred.len() != state.outputs.len() {
            let expected = state.outputs.len();
            drop(state);
            return Err(GraphError::ShapeInference(format!(
                "{self}推导出{}个输出，但应有{expected}个",
                inferred.len()
            )));
        }
        for (slot, info) in state.outputs.iter_mut().zip(inferred) {
            slot.element_type = info.element_type;
            slot.partial_shape = info.partial_shape;
        }
        Ok(())
    }

    fn decorate_error(&self, error: GraphError) -> GraphError {
        match error {
            GraphError::ShapeInference(msg) => GraphError::ShapeInference(format!("{self}：{msg}")),
            other => other,
        }
    }

    /// 设置 Parameter 节点声明的形状（输出形状同步更新）
    pub fn set_partial_shape(&self, partial_shape: PartialShape) -> Result<(), GraphError> {
        if !self.is_parameter() {
            return Err(GraphError::InvalidOperation(format!(
                "{self}不是Parameter节点，不能直接设置形状"
            )));
        }
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if let OpKind::Parameter(param) = &mut state.op {
            param.set_partial_shape(partial_shape.clone());
        }
        state.outputs[0].partial_shape = partial_shape;
        Ok(())
    }

    /// 设置 Parameter 节点声明的元素类型（输出类型同步更新）
    pub fn set_element_type(&self, element_type: ElementType) -> Result<(), GraphError> {
        if !self.is_parameter() {
            return Err(GraphError::InvalidOperation(format!(
                "{self}不是Parameter节点，不能直接设置元素类型"
            )));
        }
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if let OpKind::Parameter(param) = &mut state.op {
            param.set_element_type(element_type);
        }
        state.outputs[0].element_type = element_type;
        Ok(())
    }

    /// Parameter 节点声明的元素类型与形状（其余节点为 None）
    pub(crate) fn parameter_declaration(&self) -> Option<(ElementType, PartialShape)> {
        match &self.state.borrow().op {
            OpKind::Parameter(param) => Some((param.element_type(), param.partial_shape().clone())),
            _ => None,
        }
    }

    pub(crate) fn constant_values(&self) -> Option<Vec<i64>> {
        self.state.borrow().op.constant_values().map(<[i64]>::to_vec)
    }

    pub(crate) fn op_descriptor(&self) -> NodeTypeDescriptor {
        self.state.borrow().op.to_descriptor()
    }

    // ========== 输出端口存储（供 port.rs 使用）==========

    fn output_names(&self, index: usize) -> BTreeSet<String> {
        self.state
            .borrow()
            .outputs
            .get(index)
            .map(|slot| slot.names.clone())
            .unwrap_or_default()
    }

    fn set_output_names(&self, index: usize, names: BTreeSet<String>) {
        if let Some(slot) = self.state.borrow_mut().outputs.get_mut(index) {
            slot.names = names;
        }
    }

    fn add_target(&self, output_index: usize, consumer: &NodeRef, input_index: usize) {
        if let Some(slot) = self.state.borrow_mut().outputs.get_mut(output_index) {
            slot.targets.push((Rc::downgrade(consumer), input_index));
        }
    }

    fn remove_target(&self, output_index: usize, consumer: &Node, input_index: usize) {
        if let Some(slot) = self.state.borrow_mut().outputs.get_mut(output_index) {
            slot.targets.retain(|(w, i)| {
                w.strong_count() > 0 && !(ptr::eq(w.as_ptr(), consumer) && *i == input_index)
            });
        }
    }

    fn target_inputs(&self, output_index: usize) -> Vec<Input> {
        self.state
            .borrow()
            .outputs
            .get(output_index)
            .map(|slot| {
                slot.targets
                    .iter()
                    .filter_map(|(w, i)| w.upgrade().map(|node| Input::new(node, *i)))
                    .collect()
            })
            .unwrap_or_default()
    }

    // ========== 图成员关系 ==========

    /// 当前所属各图（仍存活）的共享信息
    pub(crate) fn shared_infos(&self) -> Vec<Rc<SharedGraphInfo>> {
        self.state
            .borrow()
            .shared_infos
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }

    pub(crate) fn has_shared_info(&self, info: &Rc<SharedGraphInfo>) -> bool {
        self.state
            .borrow()
            .shared_infos
            .iter()
            .any(|w| ptr::eq(w.as_ptr(), Rc::as_ptr(info)))
    }

    pub(crate) fn insert_shared_info(&self, info: &Rc<SharedGraphInfo>) {
        let mut state = self.state.borrow_mut();
        state.shared_infos.retain(|w| w.strong_count() > 0);
        if !state
            .shared_infos
            .iter()
            .any(|w| ptr::eq(w.as_ptr(), Rc::as_ptr(info)))
        {
            state.shared_infos.push(Rc::downgrade(info));
        }
    }

    pub(crate) fn remove_shared_info(&self, info: &Rc<SharedGraphInfo>) {
        self.state
            .borrow_mut()
            .shared_infos
            .retain(|w| w.strong_count() > 0 && !ptr::eq(w.as_ptr(), Rc::as_ptr(info)));
    }
}

/// 让这些节点所属的每个图的拓扑缓存失效
pub(crate) fn invalidate_nodes<'a>(nodes: impl IntoIterator<Item = &'a Node>) {
    for node in nodes {
        for info in node.shared_infos() {
            if info.use_topological_cache() {
                trace!(node = %node.id(), shared_info = info.id(), "拓扑缓存失效");
            }
            info.set_use_topological_cache(false);
        }
    }
}

/// 用 `replacement` 替换 `target`：
/// - `target` 的每个输出的所有消费者改接到 `replacement` 的同号输出
/// - 依赖 `target` 的控制依赖改为依赖 `replacement`，`replacement` 继承 `target` 的控制依赖
pub fn replace_node(target: &NodeRef, replacement: &NodeRef) -> Result<(), GraphError> {
    if Rc::ptr_eq(target, replacement) {
        return Ok(());
    }
    if target.is_result() {
        return Err(GraphError::InvalidOperation(format!(
            "{target}是Result节点，不能被替换"
        )));
    }
    if target.output_size() != replacement.output_size() {
        return Err(GraphError::InvalidOperation(format!(
            "{target}有{}个输出，而{replacement}有{}个输出，无法替换",
            target.output_size(),
            replacement.output_size()
        )));
    }

    for i in 0..target.output_size() {
        target.output(i)?.replace(&replacement.output(i)?)?;
    }

    for dependent in target.control_dependents() {
        if Rc::ptr_eq(&dependent, replacement) {
            continue;
        }
        dependent.remove_control_dependency(target);
        dependent.add_control_dependency(replacement)?;
    }
    for dependency in target.control_dependencies() {
        if !Rc::ptr_eq(&dependency, replacement) {
            replacement.add_control_dependency(&dependency)?;
        }
    }

    invalidate_nodes([target.as_ref(), replacement.as_ref()]);
    Ok(())
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        write!(
            f,
            "{}",
            format_node_display(self.id, &state.friendly_name, state.op.type_name())
        )
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &state.friendly_name)
            .field("type", &state.op.type_name())
            .finish()
    }
}
