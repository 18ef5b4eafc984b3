/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 计算图（Graph/Node）操作的错误类型
 */

use crate::ir::NodeId;
use thiserror::Error;

/// 图操作错误类型
///
/// 所有错误都在调用点同步返回给调用方，核心内部不做任何重试。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    // ========== 查找类错误 ==========
    #[error("图中不存在节点{0}")]
    NodeNotFound(NodeId),
    #[error("未找到名称：{0}")]
    NameNotFound(String),
    #[error("索引{index}越界（共{len}个）")]
    IndexOutOfRange { index: usize, len: usize },
    /// 单数访问器（如 `input()`）遇到 0 个或多个候选
    #[error("无法唯一确定端口：{0}")]
    AmbiguousPort(String),

    // ========== 命名冲突 ==========
    #[error("张量名冲突：{0}")]
    NameConflict(String),

    // ========== 形状相关 ==========
    #[error("无效的reshape：{0}")]
    InvalidReshape(String),
    #[error("类型/形状推导失败：{0}")]
    ShapeInference(String),

    // ========== 图结构 ==========
    #[error("图引用了未注册的参数节点：{0}")]
    UndeclaredParameter(String),
    #[error("图中存在环：{0}")]
    CycleDetected(String),
    #[error("无效操作：{0}")]
    InvalidOperation(String),
}
