// ==========================================
// 业务管理套件 - 时钟能力
// ==========================================
// 用途: 发票已付推断、占位邮箱时间种子
// 说明: 测试注入 FixedClock 以冻结时间
// ==========================================

use chrono::{Local, NaiveDate};

/// 时钟能力接口
pub trait Clock: Send + Sync {
    /// 本地日历日期
    fn today(&self) -> NaiveDate;

    /// 毫秒时间戳
    fn timestamp_millis(&self) -> i64;
}

/// 系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn timestamp_millis(&self) -> i64 {
        Local::now().timestamp_millis()
    }
}

/// 固定时钟
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub today: NaiveDate,
    pub millis: i64,
}

impl FixedClock {
    pub fn new(today: NaiveDate, millis: i64) -> Self {
        Self { today, millis }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn timestamp_millis(&self) -> i64 {
        self.millis
    }
}
