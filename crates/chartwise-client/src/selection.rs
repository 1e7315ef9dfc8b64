//! 프로세스 전역 선택 종목.
//!
//! 상세 화면이 열려 있는 동안만 선택이 유지됩니다. [`SelectedStock::select`]가
//! 돌려주는 가드가 drop되면 선택이 해제됩니다.

use std::sync::{Arc, RwLock};
use tracing::{debug, error};

/// 현재 선택된 종목 ID.
#[derive(Debug, Clone, Default)]
pub struct SelectedStock {
    inner: Arc<RwLock<Option<i64>>>,
}

impl SelectedStock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 현재 선택된 종목.
    pub fn current(&self) -> Option<i64> {
        match self.inner.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                error!("SelectedStock RwLock poisoned (read), recovering");
                *poisoned.into_inner()
            }
        }
    }

    /// 종목을 선택합니다. 가드가 살아 있는 동안 선택이 유지됩니다.
    #[must_use = "가드를 drop하면 선택이 즉시 해제됩니다"]
    pub fn select(&self, stock_id: i64) -> SelectionGuard {
        self.set(Some(stock_id));
        debug!(stock_id, "종목 선택");
        SelectionGuard {
            owner: self.clone(),
            stock_id,
        }
    }

    fn set(&self, value: Option<i64>) {
        match self.inner.write() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => {
                error!("SelectedStock RwLock poisoned (write), recovering");
                *poisoned.into_inner() = value;
            }
        }
    }

    /// 이 종목이 아직 선택되어 있을 때만 해제합니다.
    fn clear_if(&self, stock_id: i64) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("SelectedStock RwLock poisoned (write), recovering");
                poisoned.into_inner()
            }
        };
        if *guard == Some(stock_id) {
            *guard = None;
            debug!(stock_id, "종목 선택 해제");
        }
    }
}

/// 선택 해제 가드.
#[derive(Debug)]
pub struct SelectionGuard {
    owner: SelectedStock,
    stock_id: i64,
}

impl SelectionGuard {
    pub fn stock_id(&self) -> i64 {
        self.stock_id
    }
}

impl Drop for SelectionGuard {
    fn drop(&mut self) {
        self.owner.clear_if(self.stock_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_clears_on_drop() {
        let selected = SelectedStock::new();
        {
            let guard = selected.select(42);
            assert_eq!(guard.stock_id(), 42);
            assert_eq!(selected.current(), Some(42));
        }
        assert_eq!(selected.current(), None);
    }

    #[test]
    fn test_stale_guard_does_not_clear_newer_selection() {
        let selected = SelectedStock::new();
        let first = selected.select(1);
        let second = selected.select(2);
        drop(first);
        assert_eq!(selected.current(), Some(2));
        drop(second);
        assert_eq!(selected.current(), None);
    }
}
