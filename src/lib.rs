//! # Only Infer
//!
//! `only_infer`是面向推理的计算图中间表示（IR）：节点可以被自由地重新连线
//! （替换输入、重设参数、增删控制依赖），而图的拓扑序作为缓存在多个共享子图的
//! 图实例之间保持正确。
//!

pub mod ir;
pub mod utils;
