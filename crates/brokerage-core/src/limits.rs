//! Field widths and list bounds shared by the input records, the wire
//! codec and the executors' result checks.

pub const SYMBOL_LEN: usize = 15;
pub const ST_ID_LEN: usize = 4;
pub const TT_ID_LEN: usize = 3;
pub const BROKER_NAME_LEN: usize = 49;
pub const SECTOR_NAME_LEN: usize = 30;
pub const INDUSTRY_NAME_LEN: usize = 50;
pub const CO_NAME_LEN: usize = 60;
pub const F_NAME_LEN: usize = 20;
pub const L_NAME_LEN: usize = 25;
pub const TAX_ID_LEN: usize = 20;
pub const ISSUE_LEN: usize = 6;
pub const TABLE_NAME_LEN: usize = 30;
pub const TX_ID_LEN: usize = 4;

pub const MAX_BROKER_LIST_LEN: usize = 40;
pub const MAX_FEED_LEN: usize = 20;
pub const MAX_TRADE_IDS: usize = 20;

pub const MAX_ACCT_LEN: usize = 10;
pub const MIN_HIST_LEN: usize = 10;
pub const MAX_HIST_LEN: usize = 30;

pub const MIN_DAY_LEN: usize = 5;
pub const MAX_DAY_LEN: usize = 20;
pub const MAX_FIN_LEN: usize = 20;
pub const MAX_NEWS_LEN: usize = 2;

pub const MAX_TRADE_STATUS_LEN: usize = 50;
