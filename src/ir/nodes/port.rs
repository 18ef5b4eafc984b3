/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 节点的输入/输出端口句柄
 *
 * 端口句柄只是 (节点, 索引) 对，可随意克隆；真正的存储在 Node 内部。
 */

use super::raw_node::InputInfo;
use super::{NodeRef, invalidate_nodes};
use crate::ir::display::format_port_display;
use crate::ir::{ElementType, GraphError, PartialShape, topological_sort};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// 节点的第 `index` 个输出（一个张量）
#[derive(Clone)]
pub struct Output {
    node: NodeRef,
    index: usize,
}

impl Output {
    /// 索引须已由调用方检查过（输出个数在节点创建后不再变化）
    pub(super) const fn new(node: NodeRef, index: usize) -> Self {
        Self { node, index }
    }

    pub const fn node(&self) -> &NodeRef {
        &self.node
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    pub fn element_type(&self) -> ElementType {
        self.node
            .output_element_type(self.index)
            .unwrap_or_default()
    }

    pub fn partial_shape(&self) -> PartialShape {
        self.node
            .output_partial_shape(self.index)
            .unwrap_or_default()
    }

    pub(super) fn check_valid(&self) -> Result<(), GraphError> {
        let len = self.node.output_size();
        if self.index >= len {
            return Err(GraphError::IndexOutOfRange {
                index: self.index,
                len,
            });
        }
        Ok(())
    }

    pub(super) fn to_input_info(&self) -> InputInfo {
        InputInfo {
            element_type: self.element_type(),
            partial_shape: self.partial_shape(),
            constant: self.node.constant_values(),
        }
    }

    // ========== 张量名 ==========

    /// 真正承载张量名的输出
    ///
    /// Result 节点的输出与其输入是同一张量，因此沿 Result 链回溯到源输出。
    pub fn tensor_owner(&self) -> Self {
        let mut current = self.clone();
        let mut visited = HashSet::new();
        while current.node.is_result() && visited.insert(current.node.id()) {
            match current.node.input_value(0) {
                Ok(source) => current = source,
                Err(_) => break,
            }
        }
        current
    }

    /// 本张量的全部名字（已排序）
    pub fn tensor_names(&self) -> BTreeSet<String> {
        let owner = self.tensor_owner();
        owner.node.output_names(owner.index)
    }

    /// 任取一个名字（字典序最小者）
    pub fn any_name(&self) -> Option<String> {
        self.tensor_names().into_iter().next()
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.tensor_names().contains(name)
    }

    /// 用 `names` 整体替换本张量的名字
    pub fn set_names<I, S>(&self, names: I) -> Result<(), GraphError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let owner = self.tensor_owner();
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        owner.check_name_conflicts(&names)?;
        owner.node.set_output_names(owner.index, names);
        Ok(())
    }

    /// 在已有名字之外追加 `names`
    pub fn add_names<I, S>(&self, names: I) -> Result<(), GraphError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let owner = self.tensor_owner();
        let mut merged = owner.node.output_names(owner.index);
        let added: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        owner.check_name_conflicts(&added)?;
        merged.extend(added);
        owner.node.set_output_names(owner.index, merged);
        Ok(())
    }

    /// 同一图内一个张量名只能属于一个张量
    fn check_name_conflicts(&self, names: &BTreeSet<String>) -> Result<(), GraphError> {
        if names.is_empty() {
            return Ok(());
        }
        for info in self.node.shared_infos() {
            // 缓存失效时名册可能过期，按图的当前根重新求可达节点
            let members = if info.use_topological_cache() {
                info.members()
            } else {
                topological_sort(&info.roots())?
            };
            if !members.iter().any(|m| Rc::ptr_eq(m, &self.node)) {
                continue;
            }
            for member in members {
                // Result 的输出只是别名
                if member.is_result() {
                    continue;
                }
                for index in 0..member.output_size() {
                    if Rc::ptr_eq(&member, &self.node) && index == self.index {
                        continue;
                    }
                    let taken = member.output_names(index);
                    if let Some(name) = names.iter().find(|n| taken.contains(*n)) {
                        return Err(GraphError::NameConflict(format!(
                            "'{name}'已属于{}",
                            Self::new(Rc::clone(&member), index)
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    // ========== 消费者 ==========

    /// 当前连接到本输出的所有输入端
    pub fn target_inputs(&self) -> Vec<Input> {
        self.node.target_inputs(self.index)
    }

    /// 把本输出的所有消费者改接到 `replacement`
    ///
    /// `replacement` 自身节点上的输入端保持不变，避免形成自环。
    pub fn replace(&self, replacement: &Self) -> Result<(), GraphError> {
        replacement.check_valid()?;
        if self == replacement {
            return Ok(());
        }
        for input in self.target_inputs() {
            if Rc::ptr_eq(&input.node, &replacement.node) {
                continue;
            }
            input.replace_source_output(replacement)?;
        }
        invalidate_nodes([self.node.as_ref(), replacement.node.as_ref()]);
        Ok(())
    }
}

impl PartialEq for Output {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node) && self.index == other.index
    }
}

impl Eq for Output {}

impl Hash for Output {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.id().hash(state);
        self.index.hash(state);
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            format_port_display(&self.node.to_string(), "输出", self.index)
        )
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("node", &self.node.id())
            .field("index", &self.index)
            .finish()
    }
}

/// 节点的第 `index` 个输入端
#[derive(Clone)]
pub struct Input {
    node: NodeRef,
    index: usize,
}

impl Input {
    pub(super) const fn new(node: NodeRef, index: usize) -> Self {
        Self { node, index }
    }

    pub const fn node(&self) -> &NodeRef {
        &self.node
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    /// 当前连接的源输出
    pub fn source_output(&self) -> Result<Output, GraphError> {
        self.node.input_value(self.index)
    }

    pub fn element_type(&self) -> Result<ElementType, GraphError> {
        Ok(self.source_output()?.element_type())
    }

    pub fn partial_shape(&self) -> Result<PartialShape, GraphError> {
        Ok(self.source_output()?.partial_shape())
    }

    /// 把本输入改接到 `source`
    pub fn replace_source_output(&self, source: &Output) -> Result<(), GraphError> {
        self.node.set_argument(self.index, source)
    }
}

impl PartialEq for Input {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node) && self.index == other.index
    }
}

impl Eq for Input {}

impl Hash for Input {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.id().hash(state);
        self.index.hash(state);
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            format_port_display(&self.node.to_string(), "输入", self.index)
        )
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("node", &self.node.id())
            .field("index", &self.index)
            .finish()
    }
}
