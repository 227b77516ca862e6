//! Development-mode error detail switch
//!
//! 開発モードでのみ、内部エラーの詳細（原因チェーン）を応答に含めます。
//! 起動時に一度だけ設定する想定です。

use std::sync::atomic::{AtomicBool, Ordering};

static EXPOSE_DETAILS: AtomicBool = AtomicBool::new(false);

/// 応答にエラー詳細を含めるかどうかを設定
pub fn set_expose_details(enabled: bool) {
    EXPOSE_DETAILS.store(enabled, Ordering::Relaxed);
}

/// 応答にエラー詳細を含めるかどうか
pub fn expose_details() -> bool {
    EXPOSE_DETAILS.load(Ordering::Relaxed)
}
