/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 计算图节点与端口的显示格式化
 */

use super::NodeId;

/// 格式化计算图节点的显示
///
/// # Returns
/// 返回格式化后的字符串，格式为：`节点[id={}, name={}, type={}]`
pub(in crate::ir) fn format_node_display(id: NodeId, name: &str, type_name: &str) -> String {
    format!("节点[id={}, name={}, type={}]", id, name, type_name)
}

/// 格式化端口的显示，格式为：`节点[...]的输出#i` / `节点[...]的输入#i`
pub(in crate::ir) fn format_port_display(node_display: &str, kind: &str, index: usize) -> String {
    format!("{node_display}的{kind}#{index}")
}
