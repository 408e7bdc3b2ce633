//! Backend error message localization.
//!
//! The backend answers in English. For Chinese locales known messages are
//! translated; anything unknown passes through unchanged.

/// Marker the backend returns when the login session has expired.
pub const SESSION_EXPIRED_MARKER: &str = "未登录或登陆已过期";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    Chinese,
    Other,
}

impl Locale {
    /// `zh`, `zh-CN`, `zh-TW`... are Chinese; everything else is not.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        if tag.trim().to_ascii_lowercase().starts_with("zh") {
            Self::Chinese
        } else {
            Self::Other
        }
    }
}

const MESSAGE_MAP: &[(&str, &str)] = &[
    ("The given data was invalid.", "输入的数据无效，请检查您的邮箱和密码"),
    ("Invalid credentials.", "邮箱或密码错误"),
    ("User not found.", "用户不存在"),
    ("Email or password is incorrect.", "邮箱或密码不正确"),
    ("Authentication failed.", "认证失败"),
    ("Login failed.", "登录失败"),
    ("Email already exists.", "邮箱已被注册"),
    ("User already exists.", "用户已存在"),
    ("Registration failed.", "注册失败"),
    ("Invalid email format.", "邮箱格式无效"),
    ("Password too short.", "密码长度不足"),
    ("Password too weak.", "密码强度不足"),
    ("Server error.", "服务器错误"),
    ("Network error.", "网络错误"),
    ("Request timeout.", "请求超时"),
    ("Service unavailable.", "服务不可用"),
    ("Access denied.", "访问被拒绝"),
    ("Forbidden.", "禁止访问"),
    ("Not found.", "未找到"),
    ("Bad request.", "请求错误"),
    ("Unauthorized.", "未授权"),
    ("Verification code invalid.", "验证码无效"),
    ("Verification code expired.", "验证码已过期"),
    ("Verification code required.", "验证码不能为空"),
    ("Token invalid.", "令牌无效"),
    ("Token expired.", "令牌已过期"),
    ("Token required.", "令牌不能为空"),
];

#[must_use]
pub fn backend_message(locale: Locale, message: &str) -> String {
    if locale == Locale::Chinese {
        if let Some((_, translated)) = MESSAGE_MAP.iter().find(|(english, _)| *english == message) {
            return (*translated).to_string();
        }
    }
    message.to_string()
}

/// Text for an error status that came without a backend message.
#[must_use]
pub fn status_message(locale: Locale, status: u16) -> String {
    match (locale, status) {
        (Locale::Chinese, 400) => "请求参数错误".to_string(),
        (Locale::Chinese, 401) => "未授权，请重新登录".to_string(),
        (Locale::Chinese, 403) => "拒绝访问".to_string(),
        (Locale::Chinese, 404) => "请求的资源不存在".to_string(),
        (Locale::Chinese, code) => format!("请求失败 ({code})"),
        (Locale::Other, 400) => "Invalid request parameters".to_string(),
        (Locale::Other, 401) => "Unauthorized, please log in again".to_string(),
        (Locale::Other, 403) => "Access denied".to_string(),
        (Locale::Other, 404) => "Requested resource not found".to_string(),
        (Locale::Other, code) => format!("request failed ({code})"),
    }
}

#[must_use]
pub fn timeout_message(locale: Locale) -> String {
    match locale {
        Locale::Chinese => "请求超时".to_string(),
        Locale::Other => "Request timed out".to_string(),
    }
}

#[must_use]
pub fn network_message(locale: Locale) -> String {
    match locale {
        Locale::Chinese => "网络错误，请检查您的网络连接".to_string(),
        Locale::Other => "Network error, please check your connection".to_string(),
    }
}
