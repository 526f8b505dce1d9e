use serde::Deserialize;

/// 创建用户的查询参数（`POST /users/?name=..&email=..`）
///
/// 字段缺失按空字符串处理，交给存储层统一校验。
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}
