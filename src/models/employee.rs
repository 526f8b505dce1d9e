use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 员工记录，只读列表，不走缓存
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Employee {
    pub id: i32,
    pub name: String,
}

/// 员工表为空时写入的初始数据
pub const DEFAULT_EMPLOYEES: [&str; 4] = ["Alice Smith", "Bob Johnson", "Charlie Brown", "David Lee"];
