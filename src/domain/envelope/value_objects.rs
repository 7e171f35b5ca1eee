//! Envelope Context - Value Objects

use serde_json::Value;

/// 响应元数据 `meta`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvelopeMeta {
    pub message: Option<String>,
    pub error_code: Option<String>,
}

impl EnvelopeMeta {
    /// 宽松读取 `meta`：非对象返回 `None`，非字符串字段视为缺失
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);
        Some(Self {
            message: text("message"),
            error_code: text("errorCode"),
        })
    }

    /// 非空的 message
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }

    /// 非空的 errorCode
    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref().filter(|c| !c.is_empty())
    }
}

/// 统一响应信封 `{success, data, meta}`
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub success: bool,
    pub data: Value,
    pub meta: Option<EnvelopeMeta>,
}

impl Envelope {
    /// 从响应体识别信封
    ///
    /// 只有当响应体是对象且包含布尔类型的 `success` 字段时才视为信封，
    /// 其余响应（旧接口、非标准格式）返回 `None`。
    pub fn parse(body: &Value) -> Option<Self> {
        let success = body.get("success").and_then(Value::as_bool)?;
        Some(Self {
            success,
            data: body.get("data").cloned().unwrap_or(Value::Null),
            meta: body.get("meta").and_then(EnvelopeMeta::from_value),
        })
    }
}
