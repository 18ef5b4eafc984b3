use super::{all_ops_have_same_info, parameter, relu_chain};
use crate::ir::{
    ElementType, Graph, GraphAccessor, Node, NodeAccessor, PartialShape, replace_node,
};
use std::rc::Rc;

/// 拓扑缓存测试
///
/// 每个改写之后缓存立即失效，下一次查询时重新排序并恢复有效，
/// 且拓扑序中每个节点都只属于本图。

// ==================== 基础 ====================

#[test]
fn test_caching_basic() {
    let chain = relu_chain();
    let shared_info = GraphAccessor::new(&chain.graph).shared_info();

    // 构造图时已完成一次排序
    assert!(shared_info.use_topological_cache());

    for node in [&chain.arg0, &chain.relu1, &chain.relu2, &chain.result] {
        let infos = NodeAccessor::new(node).shared_info();
        assert_eq!(infos.len(), 1);
        assert!(NodeAccessor::new(node).belongs_to(&shared_info));
    }
    assert_eq!(chain.graph.ordered_ops().unwrap().len(), 4);
}

#[test]
fn test_caching_returns_same_sequence() {
    let chain = relu_chain();
    let first = chain.graph.ordered_ops().unwrap();
    let second = chain.graph.ordered_ops().unwrap();
    assert!(Rc::ptr_eq(&first, &second));

    // 改写后得到新的序列
    chain.relu2.add_control_dependency(&chain.arg0).unwrap();
    let third = chain.graph.ordered_ops().unwrap();
    assert!(!Rc::ptr_eq(&first, &third));
    assert!(Rc::ptr_eq(&third, &chain.graph.ordered_ops().unwrap()));
}

#[test]
fn test_chain_order() {
    let chain = relu_chain();
    let ordered = chain.graph.ordered_ops().unwrap();
    let ids: Vec<_> = ordered.iter().map(|n| n.id()).collect();
    assert_eq!(
        ids,
        vec![
            chain.arg0.id(),
            chain.relu1.id(),
            chain.relu2.id(),
            chain.result.id()
        ]
    );
}

// ==================== 节点级改写 ====================

#[test]
fn test_caching_replace_node() {
    let chain = relu_chain();
    let shared_info = GraphAccessor::new(&chain.graph).shared_info();
    assert!(shared_info.use_topological_cache());

    let new_relu = Node::new_relu(&chain.relu1.output(0).unwrap(), None).unwrap();
    replace_node(&chain.relu2, &new_relu).unwrap();

    assert!(!shared_info.use_topological_cache());
    // 排序之前新节点还不属于图
    assert!(!NodeAccessor::new(&new_relu).belongs_to(&shared_info));
    assert_eq!(chain.graph.ordered_ops().unwrap().len(), 4);
    assert!(NodeAccessor::new(&new_relu).belongs_to(&shared_info));
    assert!(shared_info.use_topological_cache());
    assert!(all_ops_have_same_info(&chain.graph));

    // 被替换的节点离开了图
    assert!(NodeAccessor::new(&chain.relu2).shared_info().is_empty());
}

#[test]
fn test_caching_replace_source_output() {
    let chain = relu_chain();
    let shared_info = GraphAccessor::new(&chain.graph).shared_info();

    chain
        .relu2
        .input(0)
        .unwrap()
        .replace_source_output(&chain.relu1.output(0).unwrap())
        .unwrap();

    // 即使连回同一个源也视为改写
    assert!(!shared_info.use_topological_cache());
    assert_eq!(chain.graph.ordered_ops().unwrap().len(), 4);
    assert!(shared_info.use_topological_cache());
    assert!(all_ops_have_same_info(&chain.graph));
}

#[test]
fn test_caching_dangling_node() {
    let chain = relu_chain();
    let shared_info = GraphAccessor::new(&chain.graph).shared_info();

    // 只是新建一个消费者，图没有变化
    let _dangling = Node::new_relu(&chain.relu1.output(0).unwrap(), None).unwrap();

    assert!(shared_info.use_topological_cache());
    assert_eq!(chain.graph.ordered_ops().unwrap().len(), 4);
}

#[test]
fn test_caching_replace_output() {
    let chain = relu_chain();
    let shared_info = GraphAccessor::new(&chain.graph).shared_info();

    let new_relu = Node::new_relu(&chain.relu1.output(0).unwrap(), None).unwrap();
    chain
        .relu2
        .output(0)
        .unwrap()
        .replace(&new_relu.output(0).unwrap())
        .unwrap();

    assert!(!shared_info.use_topological_cache());
    assert_eq!(chain.graph.ordered_ops().unwrap().len(), 4);
    assert!(shared_info.use_topological_cache());
    assert!(all_ops_have_same_info(&chain.graph));
    assert_eq!(
        chain.result.input_value(0).unwrap(),
        new_relu.output(0).unwrap()
    );
}

#[test]
fn test_caching_set_argument() {
    let chain = relu_chain();
    let shared_info = GraphAccessor::new(&chain.graph).shared_info();

    chain
        .relu2
        .set_argument(0, &chain.arg0.output(0).unwrap())
        .unwrap();

    assert!(!shared_info.use_topological_cache());
    assert_eq!(chain.graph.ordered_ops().unwrap().len(), 3);
    assert!(shared_info.use_topological_cache());
    assert!(all_ops_have_same_info(&chain.graph));
    // relu1 已不可达，成员关系随之解除
    assert!(!NodeAccessor::new(&chain.relu1).belongs_to(&shared_info));
}

#[test]
fn test_caching_set_arguments() {
    let chain = relu_chain();
    let shared_info = GraphAccessor::new(&chain.graph).shared_info();

    chain
        .relu2
        .set_arguments(&[chain.arg0.output(0).unwrap()])
        .unwrap();

    assert!(!shared_info.use_topological_cache());
    assert_eq!(chain.graph.ordered_ops().unwrap().len(), 3);
    assert!(shared_info.use_topological_cache());
    assert!(all_ops_have_same_info(&chain.graph));
}

#[test]
fn test_caching_add_control_dependency() {
    let chain = relu_chain();
    let shared_info = GraphAccessor::new(&chain.graph).shared_info();

    chain.relu2.add_control_dependency(&chain.arg0).unwrap();

    assert!(!shared_info.use_topological_cache());
    assert_eq!(chain.graph.ordered_ops().unwrap().len(), 4);
    assert!(shared_info.use_topological_cache());
    assert!(all_ops_have_same_info(&chain.graph));
}

#[test]
fn test_caching_remove_control_dependency() {
    let chain = relu_chain();
    let shared_info = GraphAccessor::new(&chain.graph).shared_info();

    // 移除不存在的控制依赖不影响缓存
    assert!(!chain.relu2.remove_control_dependency(&chain.arg0));
    assert!(shared_info.use_topological_cache());

    chain.relu2.add_control_dependency(&chain.arg0).unwrap();
    chain.graph.ordered_ops().unwrap();
    assert!(chain.relu2.remove_control_dependency(&chain.arg0));
    assert!(!shared_info.use_topological_cache());
    assert_eq!(chain.graph.ordered_ops().unwrap().len(), 4);
}

// ==================== 图边界改写 ====================

#[test]
fn test_caching_result_parameter_sink() {
    let mut chain = relu_chain();
    let shared_info = GraphAccessor::new(&chain.graph).shared_info();
    assert!(shared_info.use_topological_cache());

    let check_caching_status = |graph: &Graph, expected_number_of_ops: usize| {
        assert!(!shared_info.use_topological_cache());
        assert_eq!(graph.ordered_ops().unwrap().len(), expected_number_of_ops);
        assert!(shared_info.use_topological_cache());
        assert!(all_ops_have_same_info(graph));
    };

    let result2 = Node::new_result(&chain.relu2.output(0).unwrap(), None).unwrap();
    chain.graph.add_results(&[result2.clone()]).unwrap();
    check_caching_status(&chain.graph, 5);

    chain.graph.remove_result(&result2).unwrap();
    check_caching_status(&chain.graph, 4);

    let arg1 = Node::new_parameter(ElementType::Dynamic, PartialShape::dynamic(), None).unwrap();
    chain.graph.add_parameters(&[arg1.clone()]).unwrap();
    check_caching_status(&chain.graph, 5);

    chain.graph.remove_parameter(&arg1).unwrap();
    check_caching_status(&chain.graph, 4);

    let assign = Node::new_assign("state", None, None).unwrap();
    chain.graph.add_sinks(&[assign.clone()]).unwrap();
    check_caching_status(&chain.graph, 5);

    chain.graph.remove_sink(&assign).unwrap();
    check_caching_status(&chain.graph, 4);
}

#[test]
fn test_caching_multiple_components() {
    let arg0 = parameter(PartialShape::fixed(&[1]), "arg0");
    let relu0 = Node::new_relu(&arg0.output(0).unwrap(), None).unwrap();
    let result0 = Node::new_result(&relu0.output(0).unwrap(), None).unwrap();

    let arg1 = parameter(PartialShape::fixed(&[1]), "arg1");
    let relu1 = Node::new_relu(&arg1.output(0).unwrap(), None).unwrap();
    let result1 = Node::new_result(&relu1.output(0).unwrap(), None).unwrap();

    let graph = Graph::new(&[result0.clone(), result1.clone()], &[arg0.clone(), arg1.clone()])
        .unwrap();

    let shared_info = GraphAccessor::new(&graph).shared_info();
    assert!(shared_info.use_topological_cache());
    assert!(all_ops_have_same_info(&graph));

    // 先第一个 Result 的分量，再第二个
    let ordered = graph.ordered_ops().unwrap();
    let ids: Vec<_> = ordered.iter().map(|n| n.id()).collect();
    assert_eq!(
        ids,
        vec![
            arg0.id(),
            relu0.id(),
            result0.id(),
            arg1.id(),
            relu1.id(),
            result1.id()
        ]
    );
}

#[test]
fn test_caching_shared_nodes() {
    let arg0 = parameter(PartialShape::fixed(&[1]), "arg0");
    let relu0 = Node::new_relu(&arg0.output(0).unwrap(), None).unwrap();
    let result0 = Node::new_result(&relu0.output(0).unwrap(), None).unwrap();

    let f1 = Graph::new(&[result0.clone()], &[arg0.clone()]).unwrap();
    let f2 = Graph::new(&[result0.clone()], &[arg0.clone()]).unwrap();

    let f1_shared_info = GraphAccessor::new(&f1).shared_info();
    let f2_shared_info = GraphAccessor::new(&f2).shared_info();

    for node in f1.ordered_ops().unwrap().iter() {
        // 两个图都拥有该节点，因此节点有两份共享信息
        let accessor = NodeAccessor::new(node);
        assert_eq!(accessor.shared_info().len(), 2);
        assert!(accessor.belongs_to(&f1_shared_info));
        assert!(accessor.belongs_to(&f2_shared_info));
    }

    relu0.add_control_dependency(&arg0).unwrap();
    assert!(!f1_shared_info.use_topological_cache());
    assert!(!f2_shared_info.use_topological_cache());
}

#[test]
fn test_dropped_graph_releases_membership() {
    let arg0 = parameter(PartialShape::fixed(&[1]), "arg0");
    let relu0 = Node::new_relu(&arg0.output(0).unwrap(), None).unwrap();
    let result0 = Node::new_result(&relu0.output(0).unwrap(), None).unwrap();

    let f1 = Graph::new(&[result0.clone()], &[arg0.clone()]).unwrap();
    {
        let _f2 = Graph::new(&[result0.clone()], &[arg0.clone()]).unwrap();
        assert_eq!(NodeAccessor::new(&relu0).shared_info().len(), 2);
    }
    assert_eq!(NodeAccessor::new(&relu0).shared_info().len(), 1);
    assert!(all_ops_have_same_info(&f1));
}
