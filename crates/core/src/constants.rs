/// Currency assumed when an account is created without an explicit one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Color assigned to goals (and their savings accounts) created without one.
pub const DEFAULT_GOAL_COLOR: &str = "#3B82F6";

/// Alert threshold applied to budgets created without an explicit one.
pub const DEFAULT_ALERT_THRESHOLD: i32 = 80;

/// Number of months covered by the dashboard history series.
pub const DASHBOARD_HISTORY_MONTHS: u32 = 6;

/// Number of transactions surfaced in the dashboard recent list.
pub const DASHBOARD_RECENT_TRANSACTIONS: i64 = 5;
