use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// 张量元素类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ElementType {
    /// 尚未确定（类型推导前或由上游决定）
    #[default]
    Dynamic,
    Boolean,
    F16,
    F32,
    F64,
    I8,
    I32,
    I64,
    U8,
}

impl ElementType {
    pub const fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic)
    }

    pub const fn is_integral(&self) -> bool {
        matches!(self, Self::I8 | Self::I32 | Self::I64 | Self::U8)
    }

    /// 合并两个元素类型：Dynamic 让位于具体类型，两个不同的具体类型无法合并
    pub fn merge(self, other: Self) -> Option<Self> {
        match (self, other) {
            (Self::Dynamic, t) | (t, Self::Dynamic) => Some(t),
            (a, b) if a == b => Some(a),
            _ => None,
        }
    }
}

impl Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dynamic => "dynamic",
            Self::Boolean => "boolean",
            Self::F16 => "f16",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::I8 => "i8",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
        };
        write!(f, "{}", name)
    }
}
