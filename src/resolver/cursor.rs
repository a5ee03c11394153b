//! 游标编解码
//!
//! 游标是偏移量的不透明编码：`base64("arrayconnection:" + 十进制偏移)`。
//! 这里只负责编码本身，不涉及分页语义

use crate::error::QuickGqlResult;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

const CURSOR_PREFIX: &str = "arrayconnection:";

// 不可信输入的解码上限
const MAX_CURSOR_LEN: usize = 256;

/// 把偏移量编码为游标
#[must_use]
pub fn encode_cursor(offset: u64) -> String {
    BASE64.encode(format!("{}{}", CURSOR_PREFIX, offset))
}

/// 把游标解码为偏移量
///
/// 两端空白会被去除；任何格式问题都返回 `CursorError`
pub fn decode_cursor(cursor: &str) -> QuickGqlResult<u64> {
    let token = cursor.trim();
    if token.is_empty() {
        return Err(crate::quick_error!(cursor, cursor, "游标为空"));
    }
    if token.len() > MAX_CURSOR_LEN {
        return Err(crate::quick_error!(
            cursor,
            cursor,
            format!("游标长度超过上限 {}", MAX_CURSOR_LEN)
        ));
    }

    let bytes = BASE64
        .decode(token)
        .map_err(|e| crate::quick_error!(cursor, cursor, format!("base64解码失败: {}", e)))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| crate::quick_error!(cursor, cursor, "游标内容不是UTF-8文本"))?;
    let digits = text
        .strip_prefix(CURSOR_PREFIX)
        .ok_or_else(|| crate::quick_error!(cursor, cursor, "缺少游标前缀"))?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(crate::quick_error!(cursor, cursor, "偏移量不是非负整数"));
    }
    digits
        .parse::<u64>()
        .map_err(|e| crate::quick_error!(cursor, cursor, format!("偏移量超出范围: {}", e)))
}
