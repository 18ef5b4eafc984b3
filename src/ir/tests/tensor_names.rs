use super::{named_relu_chain, parameter, relu_chain};
use crate::assert_err;
use crate::ir::{Graph, GraphAccessor, GraphError, Node, PartialShape};
use std::collections::BTreeSet;

fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(ToString::to_string).collect()
}

#[test]
fn test_set_and_add_names() {
    let arg = parameter(PartialShape::fixed(&[1]), "data");
    let output = arg.output(0).unwrap();
    assert!(output.tensor_names().is_empty());
    assert_eq!(output.any_name(), None);

    output.set_names(["tensor", "tensor2"]).unwrap();
    assert_eq!(output.tensor_names(), names(&["tensor", "tensor2"]));
    assert_eq!(output.any_name().as_deref(), Some("tensor"));

    output.add_names(["alias"]).unwrap();
    assert_eq!(output.tensor_names(), names(&["alias", "tensor", "tensor2"]));

    // set_names 整体替换
    output.set_names(["only"]).unwrap();
    assert_eq!(output.tensor_names(), names(&["only"]));
    assert!(output.has_name("only"));
    assert!(!output.has_name("tensor"));
}

#[test]
fn test_result_port_aliases_source_names() {
    let chain = named_relu_chain();
    let result_out = chain.result.output(0).unwrap();

    assert_eq!(result_out.tensor_names(), names(&["relu_t2"]));
    assert_eq!(result_out.tensor_owner(), chain.relu2.output(0).unwrap());

    // 给 Result 的端口命名等同于给源张量命名
    result_out.add_names(["final"]).unwrap();
    assert!(chain.relu2.output(0).unwrap().has_name("final"));
}

#[test]
fn test_name_conflict_within_graph() {
    let chain = named_relu_chain();
    // relu_t1 已属于 relu1 的输出
    assert_err!(
        chain.relu2.output(0).unwrap().add_names(["relu_t1"]),
        GraphError::NameConflict(msg) if msg.contains("relu_t1")
    );
    assert_err!(
        chain.arg0.output(0).unwrap().set_names(["relu_t2"]),
        GraphError::NameConflict(_)
    );
    // 失败时名字不变
    assert_eq!(chain.relu2.output(0).unwrap().tensor_names(), names(&["relu_t2"]));

    // 重设自己已有的名字不算冲突
    chain.relu1.output(0).unwrap().set_names(["relu_t1"]).unwrap();
}

#[test]
fn test_same_name_allowed_outside_graph() {
    let chain = named_relu_chain();
    // 不属于任何图的节点可以使用图中已有的名字
    let other = parameter(PartialShape::fixed(&[1]), "other");
    other.output(0).unwrap().set_names(["relu_t1"]).unwrap();
    assert!(other.output(0).unwrap().has_name("relu_t1"));
    assert!(chain.relu1.output(0).unwrap().has_name("relu_t1"));
}

#[test]
fn test_validate_detects_duplicated_names() {
    // 节点加入图之前命名，冲突只能在全图校验时发现
    let arg = parameter(PartialShape::fixed(&[1]), "data");
    arg.output(0).unwrap().set_names(["dup"]).unwrap();
    let relu = Node::new_relu(&arg.output(0).unwrap(), None).unwrap();
    relu.output(0).unwrap().set_names(["dup"]).unwrap();
    let result = Node::new_result(&relu.output(0).unwrap(), None).unwrap();

    let graph = Graph::new(&[result], &[arg]).unwrap();
    assert_err!(
        graph.validate_nodes_and_infer_types(),
        GraphError::NameConflict(msg) if msg.contains("dup")
    );
}

#[test]
fn test_unnamed_chain_has_no_names() {
    let chain = relu_chain();
    for node in chain.graph.ordered_ops().unwrap().iter() {
        for output in node.outputs() {
            assert!(output.tensor_names().is_empty());
        }
    }
}

// ==================== 缓存失效期间的命名 ====================

#[test]
fn test_name_conflict_with_node_added_since_last_sort() {
    // data -> a -> Result
    let data = parameter(PartialShape::fixed(&[1]), "data");
    let a = Node::new_relu(&data.output(0).unwrap(), Some("a")).unwrap();
    let result = Node::new_result(&a.output(0).unwrap(), None).unwrap();
    let graph = Graph::new(&[result.clone()], &[data]).unwrap();

    // b 在图外命名，再接到 Result 上，此时拓扑缓存失效且尚未重排
    let b = Node::new_relu(&a.output(0).unwrap(), Some("b")).unwrap();
    b.output(0).unwrap().set_names(["t"]).unwrap();
    result.set_argument(0, &b.output(0).unwrap()).unwrap();
    assert!(!GraphAccessor::new(&graph).shared_info().use_topological_cache());

    assert_err!(
        a.output(0).unwrap().set_names(["t"]),
        GraphError::NameConflict(msg) if msg.contains("'t'")
    );
    assert!(a.output(0).unwrap().tensor_names().is_empty());
    assert_eq!(graph.ordered_ops().unwrap().len(), 4);
}

#[test]
fn test_name_released_by_node_removed_since_last_sort() {
    let chain = named_relu_chain();
    // 绕过 relu1，它不再属于图
    chain
        .relu2
        .set_argument(0, &chain.arg0.output(0).unwrap())
        .unwrap();

    chain.arg0.output(0).unwrap().add_names(["relu_t1"]).unwrap();
    assert!(chain.arg0.output(0).unwrap().has_name("relu_t1"));
    chain.graph.validate_nodes_and_infer_types().unwrap();
}
