/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 图描述符（Graph Descriptor）
 *                 按拓扑序排列的图快照，用于调试输出与外部工具查看；
 *                 只导出，不提供反序列化回图的能力
 */

use super::{ElementType, NodeRole, PartialShape};
use serde::{Deserialize, Serialize};

/// 图的可序列化描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDescriptor {
    /// 格式版本
    pub version: String,
    /// 图名称
    pub name: String,
    /// 所有节点描述（拓扑序）
    pub nodes: Vec<NodeDescriptor>,
}

/// 节点描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// 节点 ID
    pub id: u64,
    /// 节点名称（friendly name）
    pub name: String,
    /// 节点类型
    pub node_type: NodeTypeDescriptor,
    /// 节点在图中的角色
    pub role: NodeRole,
    /// 各输出端口
    pub outputs: Vec<OutputDescriptor>,
    /// 各输入端口的源：(节点 ID, 输出索引)
    pub inputs: Vec<(u64, usize)>,
    /// 控制依赖的节点 ID
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub control_dependencies: Vec<u64>,
}

/// 输出端口描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDescriptor {
    pub element_type: ElementType,
    pub partial_shape: PartialShape,
    /// 张量名（已排序）
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tensor_names: Vec<String>,
}

/// 节点类型描述（包含类型特定参数）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeTypeDescriptor {
    Parameter,
    Result,
    Constant { values: Vec<i64> },
    Assign { variable_id: String },
    Relu,
    Concat { axis: i64 },
    ShapeOf,
    Reshape { special_zero: bool },
}

impl NodeTypeDescriptor {
    /// 获取类型名称
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Parameter => "Parameter",
            Self::Result => "Result",
            Self::Constant { .. } => "Constant",
            Self::Assign { .. } => "Assign",
            Self::Relu => "Relu",
            Self::Concat { .. } => "Concat",
            Self::ShapeOf => "ShapeOf",
            Self::Reshape { .. } => "Reshape",
        }
    }
}

impl GraphDescriptor {
    /// 当前格式版本
    pub const CURRENT_VERSION: &'static str = "1.0";

    pub fn new(name: &str) -> Self {
        Self {
            version: Self::CURRENT_VERSION.to_string(),
            name: name.to_string(),
            nodes: Vec::new(),
        }
    }

    pub fn add_node(&mut self, node: NodeDescriptor) {
        self.nodes.push(node);
    }

    /// 导出为 JSON 字符串（调试/工具查看用）
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 按 ID 查找节点描述
    pub fn find_node(&self, id: u64) -> Option<&NodeDescriptor> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
