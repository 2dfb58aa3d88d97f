pub const ACCOUNT_TYPE_BANK_ACCOUNT: &str = "BANK_ACCOUNT";
pub const ACCOUNT_TYPE_CREDIT_CARD: &str = "CREDIT_CARD";
pub const ACCOUNT_TYPE_CASH: &str = "CASH";
pub const ACCOUNT_TYPE_INVESTMENT_ACCOUNT: &str = "INVESTMENT_ACCOUNT";
pub const ACCOUNT_TYPE_SAVINGS: &str = "SAVINGS";
