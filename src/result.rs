use serde::{Deserialize, Serialize};

/// 统一响应包装，`code` 为 0 表示成功
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResult<T: Serialize> {
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<T>,
    /// 请求已成功但附带需要运维关注的问题
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl<T: Serialize> ApiResult<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            error_message: None,
            content: Some(data),
            warning: None,
        }
    }

    pub fn error(code: i32, message: &str) -> Self {
        Self {
            code,
            error_message: Some(message.to_string()),
            content: None,
            warning: None,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }
}

pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const USER_EXISTS: i32 = 1001;
    pub const STORE_UNAVAILABLE: i32 = 5003;
}
