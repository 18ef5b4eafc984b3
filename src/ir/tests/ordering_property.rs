use super::{parameter, respects_dependencies};
use crate::ir::{Graph, Node, NodeId, NodeRef, Output, PartialShape, topological_sort};
use proptest::prelude::*;
use proptest::sample::Index;
use std::collections::HashSet;
use std::rc::Rc;

/// 随机 DAG：两个 Parameter 之后依次追加 Concat 节点，每个 Concat 只从已有节点取输入；
/// 控制依赖也只从编号小的节点指向编号大的节点，因此不会成环
fn random_graph(picks: &[Vec<Index>], controls: &[(Index, Index)]) -> (Vec<NodeRef>, Graph) {
    let mut nodes = vec![
        parameter(PartialShape::fixed(&[1]), "a"),
        parameter(PartialShape::fixed(&[1]), "b"),
    ];
    for inputs in picks {
        let len = nodes.len();
        let sources: Vec<Output> = inputs
            .iter()
            .map(|pick| nodes[pick.index(len)].output(0).unwrap())
            .collect();
        nodes.push(Node::new_concat(&sources, 0, None).unwrap());
    }
    for (from, to) in controls {
        let len = nodes.len();
        let (dep, node) = (from.index(len), to.index(len));
        if dep < node {
            nodes[node].add_control_dependency(&nodes[dep]).unwrap();
        }
    }

    let results: Vec<NodeRef> = nodes[2..]
        .iter()
        .filter(|n| n.output(0).unwrap().target_inputs().is_empty())
        .map(|n| Node::new_result(&n.output(0).unwrap(), None).unwrap())
        .collect();
    let graph = Graph::new(&results, &nodes[..2]).unwrap();
    (nodes, graph)
}

fn ids(nodes: &[NodeRef]) -> Vec<NodeId> {
    nodes.iter().map(|n| n.id()).collect()
}

proptest! {
    #[test]
    fn ordering_respects_all_dependencies(
        picks in prop::collection::vec(prop::collection::vec(any::<Index>(), 1..4), 1..12),
        controls in prop::collection::vec((any::<Index>(), any::<Index>()), 0..6),
    ) {
        let (nodes, graph) = random_graph(&picks, &controls);
        let ordered = graph.ordered_ops().unwrap();

        prop_assert!(respects_dependencies(&ordered));
        // 每个节点恰好出现一次
        prop_assert_eq!(ordered.len(), nodes.len() + graph.results().len());
        let unique: HashSet<NodeId> = ordered.iter().map(|n| n.id()).collect();
        prop_assert_eq!(unique.len(), ordered.len());
    }

    #[test]
    fn ordering_is_deterministic_and_cached(
        picks in prop::collection::vec(prop::collection::vec(any::<Index>(), 1..4), 1..12),
        controls in prop::collection::vec((any::<Index>(), any::<Index>()), 0..6),
    ) {
        let (_nodes, graph) = random_graph(&picks, &controls);
        let first = graph.ordered_ops().unwrap();
        prop_assert!(Rc::ptr_eq(&first, &graph.ordered_ops().unwrap()));

        let mut roots = graph.results().to_vec();
        roots.extend_from_slice(graph.parameters());
        let standalone = topological_sort(&roots).unwrap();
        prop_assert_eq!(ids(&standalone), ids(&first));
    }
}
