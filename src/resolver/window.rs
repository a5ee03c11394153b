//! 分页窗口计算
//!
//! 由 `first` / `last` / `after` / `before` 与结果总数计算 skip 与 limit。
//! 规则优先级：first 组合优先，其次 last 组合，最后单独的 after / before

use crate::error::{QuickGqlError, QuickGqlResult};
use crate::resolver::cursor::encode_cursor;
use serde::{Deserialize, Serialize};

/// 游标分页参数（after/before 已解码为偏移量）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorArgs {
    pub first: Option<u64>,
    pub last: Option<u64>,
    pub after: Option<u64>,
    pub before: Option<u64>,
}

/// 分页窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub skip: u64,
    /// `None` 表示不限制
    pub limit: Option<u64>,
}

impl PageWindow {
    pub const FULL: PageWindow = PageWindow { skip: 0, limit: None };

    /// 窗口在长度为 `len` 的序列上的下标区间
    pub fn range(&self, len: usize) -> std::ops::Range<usize> {
        let start = (self.skip as usize).min(len);
        let end = match self.limit {
            Some(limit) => start.saturating_add(limit as usize).min(len),
            None => len,
        };
        start..end
    }

    /// 已知总数时窗口之后是否还有记录
    pub fn has_next(&self, count: Option<u64>) -> bool {
        match (count, self.limit) {
            (Some(count), Some(limit)) => self.skip.saturating_add(limit) < count,
            _ => false,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.skip > 0
    }
}

impl CursorArgs {
    /// 计算窗口
    ///
    /// 请求 `last` 时必须提供总数，否则返回 `MissingCount`；
    /// `after` 已是最大偏移量时返回游标错误
    pub fn window(&self, count: Option<u64>) -> QuickGqlResult<PageWindow> {
        let CursorArgs { first, last, after, before } = *self;
        if last.is_some() && count.is_none() {
            return Err(QuickGqlError::MissingCount);
        }
        // after 之后第一条记录的偏移量
        let start = after.map(start_after).transpose()?;

        let (skip, limit) = match (first, last, start, before) {
            (Some(first), _, Some(start), _) => (start, Some(first)),
            (Some(first), _, None, Some(before)) => (0, Some(first.min(before.saturating_sub(1)))),
            (Some(first), _, None, None) => (0, Some(first)),
            (None, Some(last), start, before) => {
                let count = count.ok_or(QuickGqlError::MissingCount)?;
                match (before, start) {
                    (Some(before), _) => {
                        let limit = last.min(before);
                        (before - limit, Some(limit))
                    }
                    (None, Some(start)) => (start, Some(last.min(count.saturating_sub(start)))),
                    (None, None) => (count.saturating_sub(last), Some(last)),
                }
            }
            (None, None, Some(start), _) => (start, None),
            (None, None, None, Some(before)) => (0, Some(before)),
            (None, None, None, None) => (0, None),
        };

        crate::debug_log!(
            "分页窗口: first={:?}, last={:?}, after={:?}, before={:?}, count={:?} -> skip={}, limit={:?}",
            first, last, after, before, count, skip, limit
        );
        Ok(PageWindow { skip, limit })
    }
}

fn start_after(after: u64) -> QuickGqlResult<u64> {
    after
        .checked_add(1)
        .ok_or_else(|| crate::quick_error!(cursor, encode_cursor(after), "偏移量超出范围"))
}
