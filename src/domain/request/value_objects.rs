//! Request Context - Value Objects

use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use http::Method;
use serde_json::Value;
use uuid::Uuid;

/// 请求追踪头，原始请求与重放请求共用同一个值
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// JSON 内容类型（默认）
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// 请求体
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    /// 无请求体
    #[default]
    Empty,
    /// JSON 请求体
    Json(Value),
    /// multipart/form-data 请求体（boundary 由传输层生成）
    Multipart(Vec<FormPart>),
}

impl RequestBody {
    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Vec<FormPart>> for RequestBody {
    fn from(parts: Vec<FormPart>) -> Self {
        Self::Multipart(parts)
    }
}

/// multipart 表单字段
///
/// 数据全部自持有，保证重放时可以逐字节重建同一个表单
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub content: FormPartContent,
}

/// 表单字段内容
#[derive(Debug, Clone, PartialEq)]
pub enum FormPartContent {
    /// 普通文本字段
    Text(String),
    /// 二进制字段（文件或带类型的 blob）
    Bytes {
        data: Vec<u8>,
        file_name: Option<String>,
        mime: Option<String>,
    },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: FormPartContent::Text(value.into()),
        }
    }

    /// JSON blob 字段（`Content-Type: application/json`）
    pub fn json(name: impl Into<String>, value: &Value) -> Self {
        Self {
            name: name.into(),
            content: FormPartContent::Bytes {
                data: value.to_string().into_bytes(),
                file_name: None,
                mime: Some(JSON_CONTENT_TYPE.to_string()),
            },
        }
    }

    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: Option<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            content: FormPartContent::Bytes {
                data,
                file_name: Some(file_name.into()),
                mime,
            },
        }
    }
}

/// 调用方可选参数：额外请求头与查询参数
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub params: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// 追加请求头，保留同名的已有值
    pub fn append_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// 追加查询参数；同名参数可重复（例如 `sort`）
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// 仅在值存在时追加查询参数
    pub fn param_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }
}

/// 待发送请求描述
///
/// 完整记录一次出站调用（方法、路径、参数、请求体、请求头），
/// 以便在凭证刷新后原样重放。`retried` 标记该描述是否已经是重放，
/// 已重放的请求再遇到 401 时不会再次触发刷新。
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub method: Method,
    pub path: String,
    pub params: Vec<(String, String)>,
    pub body: RequestBody,
    pub headers: HeaderMap,
    retried: bool,
}

impl PendingRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            body: RequestBody::Empty,
            headers: HeaderMap::new(),
            retried: false,
        }
    }

    pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = body.into();
        self
    }

    /// 合并调用方选项；同名头整体替换，多值全部保留
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.params.extend(options.params);
        for name in options.headers.keys() {
            self.headers.remove(name);
        }
        for (name, value) in options.headers.iter() {
            self.headers.append(name.clone(), value.clone());
        }
        self
    }

    /// 合并默认请求头，调用方已设置的头优先
    pub fn with_default_headers(mut self, defaults: &HeaderMap) -> Self {
        let caller_set: Vec<HeaderName> = defaults
            .keys()
            .filter(|name| self.headers.contains_key(*name))
            .cloned()
            .collect();
        for (name, value) in defaults.iter() {
            if !caller_set.contains(name) {
                self.headers.append(name.clone(), value.clone());
            }
        }
        self
    }

    /// 分配请求追踪 ID（已存在则保留）
    pub fn with_request_id(mut self) -> Self {
        if !self.headers.contains_key(REQUEST_ID_HEADER) {
            if let Ok(value) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
                self.headers
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }
        }
        self
    }

    pub fn request_id(&self) -> Option<&str> {
        self.headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
    }

    /// 是否已经是一次重放
    pub fn is_retry(&self) -> bool {
        self.retried
    }

    /// 转换为重放请求：内容不变，仅置位 `retried`
    pub fn into_replay(mut self) -> Self {
        self.retried = true;
        self
    }

    /// 实际使用的内容类型
    ///
    /// - multipart 请求体：返回 `None`，由传输层生成带 boundary 的头
    /// - 调用方显式设置：使用调用方的值
    /// - 其余：`application/json`
    pub fn content_type(&self) -> Option<HeaderValue> {
        if self.body.is_multipart() {
            return None;
        }
        Some(
            self.headers
                .get(CONTENT_TYPE)
                .cloned()
                .unwrap_or_else(|| HeaderValue::from_static(JSON_CONTENT_TYPE)),
        )
    }
}
