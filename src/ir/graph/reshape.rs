/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : Graph 全图类型推导与 reshape
 */

use super::{Graph, GraphError, ShapeTarget};
use crate::ir::nodes::{NodeRef, Output};
use crate::ir::PartialShape;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::rc::Rc;
use tracing::{debug, warn};

impl Graph {
    /// 按拓扑序逐个节点推导类型与形状，再做全图检查：
    /// - 可达的 Parameter 都已声明
    /// - 同一张量名只属于一个张量
    pub fn validate_nodes_and_infer_types(&self) -> Result<(), GraphError> {
        let ordered = self.ordered_ops()?;
        for node in ordered.iter() {
            node.validate_and_infer_types()?;
        }
        self.check_parameters_declared()?;

        let mut owners: HashMap<String, Output> = HashMap::new();
        // Result 的输出只是源张量的别名，跳过
        for node in ordered.iter().filter(|n| !n.is_result()) {
            for output in node.outputs() {
                for name in output.tensor_names() {
                    match owners.entry(name) {
                        Entry::Occupied(entry) => {
                            return Err(GraphError::NameConflict(format!(
                                "'{}'同时属于{}和{}",
                                entry.key(),
                                entry.get(),
                                output
                            )));
                        }
                        Entry::Vacant(entry) => {
                            entry.insert(output.clone());
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// 批量修改 Parameter 的形状并重新推导全图
    ///
    /// 目标可以是 Parameter 输出的张量名或端口（不接受节点名）。
    /// 失败时所有 Parameter 恢复原形状并重新推导，图保持调用前的状态。
    pub fn reshape<I, T, S>(&self, new_shapes: I) -> Result<(), GraphError>
    where
        I: IntoIterator<Item = (T, S)>,
        T: Into<ShapeTarget>,
        S: Into<PartialShape>,
    {
        // 1. 解析目标，同一个 Parameter 只能得到一个形状
        let mut requests: Vec<(NodeRef, PartialShape)> = Vec::new();
        for (target, shape) in new_shapes {
            let parameter = self.resolve_shape_target(target.into())?;
            let shape = shape.into();
            match requests.iter().find(|(p, _)| Rc::ptr_eq(p, &parameter)) {
                Some((_, existing)) if *existing != shape => {
                    return Err(GraphError::InvalidReshape(format!(
                        "{parameter}被同时指定为{existing}和{shape}"
                    )));
                }
                Some(_) => {}
                None => requests.push((parameter, shape)),
            }
        }

        // 2. 记录原形状后应用新形状
        let originals: Vec<(NodeRef, PartialShape)> = requests
            .iter()
            .filter_map(|(p, _)| {
                p.parameter_declaration()
                    .map(|(_, shape)| (Rc::clone(p), shape))
            })
            .collect();
        for (parameter, shape) in &requests {
            parameter.set_partial_shape(shape.clone())?;
        }

        // 3. 重新推导，失败则回滚
        if let Err(e) = self.validate_nodes_and_infer_types() {
            warn!(graph = %self.name, error = %e, "reshape失败，恢复原形状");
            for (parameter, shape) in &originals {
                parameter.set_partial_shape(shape.clone())?;
            }
            if let Err(restore_error) = self.validate_nodes_and_infer_types() {
                warn!(graph = %self.name, error = %restore_error, "恢复原形状后重新推导失败");
            }
            return Err(match e {
                GraphError::ShapeInference(msg) => GraphError::InvalidReshape(msg),
                other => other,
            });
        }

        debug!(graph = %self.name, parameters = requests.len(), "reshape完成");
        Ok(())
    }

    fn resolve_shape_target(&self, target: ShapeTarget) -> Result<NodeRef, GraphError> {
        match target {
            ShapeTarget::TensorName(name) => {
                match self.input_by_name(&name) {
                    Ok(port) => return Ok(Rc::clone(port.node())),
                    Err(GraphError::NameNotFound(_)) => {}
                    Err(e) => return Err(e),
                }
                let named_elsewhere = self
                    .ordered_ops()?
                    .iter()
                    .filter(|n| !n.is_result())
                    .flat_map(|n| n.outputs())
                    .any(|o| o.has_name(&name));
                if named_elsewhere {
                    Err(GraphError::InvalidReshape(format!(
                        "张量'{name}'不是Parameter的输出"
                    )))
                } else {
                    Err(GraphError::NameNotFound(name))
                }
            }
            ShapeTarget::Port(port) => {
                if self.parameter_index(port.node()).is_some() {
                    Ok(Rc::clone(port.node()))
                } else {
                    Err(GraphError::InvalidReshape(format!(
                        "{port}不是本图Parameter的输出"
                    )))
                }
            }
        }
    }

    /// 图中是否存在形状未完全确定的张量
    pub fn is_dynamic(&self) -> Result<bool, GraphError> {
        Ok(self
            .ordered_ops()?
            .iter()
            .flat_map(|n| n.outputs())
            .any(|o| o.partial_shape().is_dynamic()))
    }
}
