/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : Graph describe/summary 相关方法
 */

use super::{Graph, GraphError};
use crate::ir::descriptor::{GraphDescriptor, NodeDescriptor, OutputDescriptor};
use crate::ir::nodes::NodeRef;

impl Graph {
    // ========== 图描述（describe）==========

    /// 导出图的描述符（调试、工具查看用）
    ///
    /// 节点按拓扑序排列
    ///
    /// # 示例
    /// ```ignore
    /// let descriptor = graph.describe()?;
    /// println!("{}", descriptor.to_json().unwrap());
    /// ```
    pub fn describe(&self) -> Result<GraphDescriptor, GraphError> {
        let mut descriptor = GraphDescriptor::new(&self.name);
        for node in self.ordered_ops()?.iter() {
            descriptor.add_node(Self::describe_node(node));
        }
        Ok(descriptor)
    }

    fn describe_node(node: &NodeRef) -> NodeDescriptor {
        let outputs = node
            .outputs()
            .iter()
            .map(|output| OutputDescriptor {
                element_type: output.element_type(),
                partial_shape: output.partial_shape(),
                tensor_names: output.tensor_names().into_iter().collect(),
            })
            .collect();
        let inputs = node
            .input_values()
            .iter()
            .map(|source| (source.node().id().0, source.index()))
            .collect();
        let control_dependencies = node
            .control_dependencies()
            .iter()
            .map(|dep| dep.id().0)
            .collect();

        NodeDescriptor {
            id: node.id().0,
            name: node.friendly_name(),
            node_type: node.op_descriptor(),
            role: node.role(),
            outputs,
            inputs,
            control_dependencies,
        }
    }

    // ========== 图摘要（summary）==========

    /// 打印图摘要
    pub fn summary(&self) -> Result<(), GraphError> {
        println!("{}", self.summary_string()?);
        Ok(())
    }

    /// 返回图摘要字符串（Unicode 文本表格，用于控制台输出）
    ///
    /// # 示例
    /// ```ignore
    /// // ┌──────────┬───────────┬──────────┬────────┬────────┐
    /// // │ 节点名称 │ 类型      │ 输出形状 │ 张量名 │ 父节点 │
    /// // ├──────────┼───────────┼──────────┼────────┼────────┤
    /// // │ data     │ Parameter │ [1, 3]   │ x      │ -      │
    /// // ...
    /// ```
    pub fn summary_string(&self) -> Result<String, GraphError> {
        let desc = self.describe()?;
        let rows: Vec<[String; 5]> = desc
            .nodes
            .iter()
            .map(|node| {
                [
                    node.name.clone(),
                    node.node_type.type_name().to_string(),
                    Self::format_output_shapes(node),
                    Self::format_tensor_names(node),
                    Self::format_parent_names(&desc, node),
                ]
            })
            .collect();

        let headers = ["节点名称", "类型", "输出形状", "张量名", "父节点"];
        let mut widths = headers.map(Self::display_width);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(Self::display_width(cell));
            }
        }

        let border = |left: &str, mid: &str, right: &str| {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("{left}{}{right}\n", segments.join(mid))
        };
        let line = |cells: &[&str]| {
            let padded: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(cell, w)| {
                    let pad = w - Self::display_width(cell);
                    format!(" {cell}{} ", " ".repeat(pad))
                })
                .collect();
            format!("│{}│\n", padded.join("│"))
        };

        let mut output = format!("图: {}\n", desc.name);
        output.push_str(&border("┌", "┬", "┐"));
        output.push_str(&line(headers.as_slice()));
        output.push_str(&border("├", "┼", "┤"));
        for row in &rows {
            let cells: Vec<&str> = row.iter().map(String::as_str).collect();
            output.push_str(&line(&cells));
        }
        output.push_str(&border("└", "┴", "┘"));
        output.push_str(&format!(
            "Parameter: {}，Result: {}，Sink: {}，节点总数: {}\n",
            self.parameters.len(),
            self.results.len(),
            self.sinks.len(),
            desc.nodes.len()
        ));
        Ok(output)
    }

    fn format_output_shapes(node: &NodeDescriptor) -> String {
        if node.outputs.is_empty() {
            return "-".to_string();
        }
        node.outputs
            .iter()
            .map(|o| format!("{}{}", o.element_type, o.partial_shape))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn format_tensor_names(node: &NodeDescriptor) -> String {
        let names: Vec<&str> = node
            .outputs
            .iter()
            .flat_map(|o| o.tensor_names.iter().map(String::as_str))
            .collect();
        if names.is_empty() {
            "-".to_string()
        } else {
            names.join(", ")
        }
    }

    /// 格式化父节点名称列表
    fn format_parent_names(desc: &GraphDescriptor, node: &NodeDescriptor) -> String {
        if node.inputs.is_empty() {
            "-".to_string()
        } else {
            node.inputs
                .iter()
                .filter_map(|(id, _)| desc.find_node(*id))
                .map(|n| n.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        }
    }

    /// 计算字符串显示宽度（考虑中文字符）
    fn display_width(s: &str) -> usize {
        s.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum()
    }
}
