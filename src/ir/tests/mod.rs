mod ordering_property;
mod tensor_names;
mod topological_cache;

use crate::ir::{ElementType, Graph, GraphAccessor, Node, NodeAccessor, NodeRef, PartialShape};
use std::rc::Rc;

/// Parameter -> Relu -> Relu -> Result 的单链图
pub(super) struct ReluChain {
    pub arg0: NodeRef,
    pub relu1: NodeRef,
    pub relu2: NodeRef,
    pub result: NodeRef,
    pub graph: Graph,
}

pub(super) fn relu_chain() -> ReluChain {
    let arg0 = Node::new_parameter(ElementType::F32, PartialShape::fixed(&[1]), Some("data")).unwrap();
    let relu1 = Node::new_relu(&arg0.output(0).unwrap(), Some("relu1")).unwrap();
    let relu2 = Node::new_relu(&relu1.output(0).unwrap(), Some("relu2")).unwrap();
    let result = Node::new_result(&relu2.output(0).unwrap(), None).unwrap();
    let graph = Graph::new(&[result.clone()], &[arg0.clone()]).unwrap();
    ReluChain {
        arg0,
        relu1,
        relu2,
        result,
        graph,
    }
}

/// 同 `relu_chain`，但各张量带名字：input / relu_t1 / relu_t2
pub(super) fn named_relu_chain() -> ReluChain {
    let chain = relu_chain();
    chain.arg0.output(0).unwrap().set_names(["input"]).unwrap();
    chain.relu1.output(0).unwrap().set_names(["relu_t1"]).unwrap();
    chain.relu2.output(0).unwrap().set_names(["relu_t2"]).unwrap();
    chain.graph.validate_nodes_and_infer_types().unwrap();
    chain
}

pub(super) fn parameter(shape: impl Into<PartialShape>, name: &str) -> NodeRef {
    Node::new_parameter(ElementType::F32, shape, Some(name)).unwrap()
}

/// 拓扑序中每个节点都只属于这一个图
pub(super) fn all_ops_have_same_info(graph: &Graph) -> bool {
    let shared_info = GraphAccessor::new(graph).shared_info();
    graph.ordered_ops().unwrap().iter().all(|op| {
        let infos = NodeAccessor::new(op).shared_info();
        infos.len() == 1 && Rc::ptr_eq(&infos[0], &shared_info)
    })
}

/// 拓扑序中每个节点都排在其所有依赖之后
pub(super) fn respects_dependencies(ordered: &[NodeRef]) -> bool {
    ordered.iter().enumerate().all(|(i, node)| {
        node.input_values()
            .iter()
            .map(|source| Rc::clone(source.node()))
            .chain(node.control_dependencies())
            .all(|dep| ordered[..i].iter().any(|n| Rc::ptr_eq(n, &dep)))
    })
}
