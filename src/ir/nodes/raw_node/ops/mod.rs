/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 普通算子节点（非 Parameter/Result/Sink）
 */

mod concat;
mod relu;
mod reshape;
mod shape_of;

pub(crate) use concat::Concat;
pub(crate) use relu::Relu;
pub(crate) use reshape::Reshape;
pub(crate) use shape_of::ShapeOf;
