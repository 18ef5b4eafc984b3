/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : SharedGraphInfo：同一个图的所有节点共享的状态
 *
 * 每个 Graph 恰好拥有一个 SharedGraphInfo；该图最近一次拓扑排序访问到的每个节点
 * 都持有它的弱引用。任何改变拓扑的节点级改写都会经由这些引用把缓存标志置为 false，
 * 因此失效是在改写时主动推送的，而不是查询时再去探测。
 */

use crate::ir::nodes::{Node, NodeRef};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SHARED_INFO_ID: AtomicU64 = AtomicU64::new(1);

/// 图级共享信息：拓扑缓存有效标志 + 最近一次排序的节点名册
#[derive(Debug)]
pub struct SharedGraphInfo {
    id: u64,
    use_topological_cache: Cell<bool>,
    /// 最近一次拓扑排序结果（弱引用），用于跨节点的张量名冲突检查
    members: RefCell<Vec<Weak<Node>>>,
    /// 图当前的遍历根（弱引用），缓存失效时据此重新求可达节点
    roots: RefCell<Vec<Weak<Node>>>,
}

impl SharedGraphInfo {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            id: NEXT_SHARED_INFO_ID.fetch_add(1, Ordering::Relaxed),
            use_topological_cache: Cell::new(false),
            members: RefCell::new(Vec::new()),
            roots: RefCell::new(Vec::new()),
        })
    }

    /// 仅用于日志/调试输出的编号
    pub fn id(&self) -> u64 {
        self.id
    }

    /// 拓扑缓存当前是否有效
    pub fn use_topological_cache(&self) -> bool {
        self.use_topological_cache.get()
    }

    pub(crate) fn set_use_topological_cache(&self, value: bool) {
        self.use_topological_cache.set(value);
    }

    /// 最近一次排序访问到且仍存活的节点
    pub(crate) fn members(&self) -> Vec<NodeRef> {
        self.members
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }

    pub(crate) fn set_members(&self, members: &[NodeRef]) {
        *self.members.borrow_mut() = members.iter().map(Rc::downgrade).collect();
    }

    pub(crate) fn roots(&self) -> Vec<NodeRef> {
        self.roots.borrow().iter().filter_map(Weak::upgrade).collect()
    }

    pub(crate) fn set_roots(&self, roots: &[NodeRef]) {
        *self.roots.borrow_mut() = roots.iter().map(Rc::downgrade).collect();
    }
}
