//! Deterministic generation of a small brokerage dataset.
//!
//! Ids follow the usual numbering: customers from `4300000001`, five
//! accounts per customer from `43000000001`, trades from
//! `200000000000001`. The same seed always yields the same tables.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use brokerage_core::{status_id, TradeType};

use crate::tables::*;

pub const FIRST_CUSTOMER_ID: i64 = 4_300_000_001;
pub const FIRST_ACCOUNT_ID: i64 = 43_000_000_001;
pub const FIRST_TRADE_ID: i64 = 200_000_000_000_001;
pub const ACCOUNTS_PER_CUSTOMER: usize = 5;

/// Completed trades generated per account.
const TRADES_PER_ACCOUNT: usize = 6;
const DAILY_MARKET_DAYS: i64 = 120;
const QUARTERS: i32 = 20;
const NEWS_PER_COMPANY: usize = 2;

const FIRST_NAMES: [&str; 20] = [
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Charles", "Karen",
];

const LAST_NAMES: [&str; 20] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin",
];

const SECTORS: [&str; 12] = [
    "Basic Materials",
    "Capital Goods",
    "Conglomerates",
    "Consumer Cyclical",
    "Consumer Non-Cyclical",
    "Energy",
    "Financial",
    "Healthcare",
    "Services",
    "Technology",
    "Transportation",
    "Utilities",
];

const INDUSTRY_KINDS: [&str; 2] = ["Products", "Services"];

const COMPANY_PREFIXES: [&str; 20] = [
    "Acme", "Apex", "Atlas", "Beacon", "Cobalt", "Delta", "Ember", "Falcon", "Granite", "Harbor",
    "Ion", "Juniper", "Keystone", "Lumen", "Meridian", "Nova", "Orion", "Pioneer", "Quartz",
    "Summit",
];

const COMPANY_SUFFIXES: [&str; 10] = [
    "Industries", "Holdings", "Systems", "Partners", "Group", "Labs", "Works", "Dynamics",
    "Networks", "Resources",
];

const EXCHANGES: [(&str, &str); 4] = [
    ("NYSE", "New York Stock Exchange"),
    ("NASDAQ", "Nasdaq Stock Market"),
    ("AMEX", "American Stock Exchange"),
    ("PCX", "Pacific Exchange"),
];

const FEDERAL_RATES: [f64; 5] = [0.10, 0.15, 0.20, 0.25, 0.30];
const STATE_RATES: [f64; 5] = [0.01, 0.02, 0.03, 0.04, 0.05];

const LOT_SIZES: [i32; 4] = [100, 200, 400, 800];

#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub customers: usize,
    pub seed: u64,
    /// First day after the generated history; market data ends the day
    /// before.
    pub base_date: NaiveDate,
    /// Last-trade prices are drawn from this band.
    pub price_low: f64,
    pub price_high: f64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig {
            customers: 100,
            seed: 1,
            base_date: NaiveDate::from_ymd_opt(2005, 1, 3).unwrap_or_default(),
            price_low: 20.0,
            price_high: 30.0,
        }
    }
}

/// Build the full table set for `config`.
pub fn generate(config: &DatasetConfig) -> Tables {
    let mut gen = Generator {
        rng: StdRng::seed_from_u64(config.seed),
        config: config.clone(),
        tables: Tables {
            next_trade_id: FIRST_TRADE_ID,
            ..Tables::default()
        },
    };

    gen.reference_data();
    gen.market();
    gen.customers();
    gen.initial_trades();
    gen.pending_orders();

    tracing::debug!(
        customers = gen.tables.customers.len(),
        accounts = gen.tables.accounts.len(),
        securities = gen.tables.securities.len(),
        trades = gen.tables.trades.len(),
        "dataset generated"
    );
    gen.tables
}

struct Generator {
    rng: StdRng,
    config: DatasetConfig,
    tables: Tables,
}

impl Generator {
    fn base_dts(&self) -> NaiveDateTime {
        self.config.base_date.and_time(NaiveTime::MIN)
    }

    fn price(&mut self) -> f64 {
        round_cents(
            self.rng
                .gen_range(self.config.price_low..=self.config.price_high),
        )
    }

    fn reference_data(&mut self) {
        for (i, name) in SECTORS.iter().enumerate() {
            let sc_id = format!("SC{:02}", i + 1);
            for (j, kind) in INDUSTRY_KINDS.iter().enumerate() {
                self.tables.industries.push(Industry {
                    in_id: format!("IN{:02}", i * INDUSTRY_KINDS.len() + j + 1),
                    name: format!("{} {}", name, kind),
                    sc_id: sc_id.clone(),
                });
            }
            self.tables.sectors.push(Sector {
                sc_id,
                name: name.to_string(),
            });
        }

        for (ex_id, name) in EXCHANGES {
            self.tables.exchanges.push(Exchange {
                ex_id: ex_id.to_string(),
                name: name.to_string(),
                desc: format!("{} equities", name),
            });
        }

        for (i, rate) in FEDERAL_RATES.iter().enumerate() {
            self.tables.tax_rates.push(TaxRate {
                tx_id: format!("US{}", i + 1),
                name: format!("US Federal Income Tax Bracket {}", i + 1),
                rate: *rate,
            });
        }
        for (i, rate) in STATE_RATES.iter().enumerate() {
            self.tables.tax_rates.push(TaxRate {
                tx_id: format!("ST{}", i + 1),
                name: format!("State Income Tax Region {}", i + 1),
                rate: *rate,
            });
        }

        let brokers = (self.config.customers / 10).max(5);
        for i in 0..brokers {
            self.tables.brokers.push(Broker {
                b_id: 4_300_000_001 + i as i64,
                name: format!(
                    "{} {}",
                    FIRST_NAMES[i % FIRST_NAMES.len()],
                    LAST_NAMES[(i / FIRST_NAMES.len() + i) % LAST_NAMES.len()]
                ),
                num_trades: 0,
                comm_total: 0.0,
            });
        }
    }

    fn market(&mut self) {
        let companies = (self.config.customers / 2)
            .clamp(20, COMPANY_PREFIXES.len() * COMPANY_SUFFIXES.len());
        let base_dts = self.base_dts();

        for i in 0..companies {
            let co_id = 4_300_000_001 + i as i64;
            let name = format!(
                "{} {}",
                COMPANY_PREFIXES[i % COMPANY_PREFIXES.len()],
                COMPANY_SUFFIXES[(i / COMPANY_PREFIXES.len()) % COMPANY_SUFFIXES.len()]
            );
            let in_id = self.tables.industries[i % self.tables.industries.len()]
                .in_id
                .clone();
            let ceo = format!(
                "{} {}",
                FIRST_NAMES[self.rng.gen_range(0..FIRST_NAMES.len())],
                LAST_NAMES[self.rng.gen_range(0..LAST_NAMES.len())]
            );
            self.tables.companies.push(Company {
                co_id,
                name: name.clone(),
                in_id,
                ceo,
                sp_rate: "AAA".to_string(),
                address_line2: "Suite 100".to_string(),
            });

            let symbol = symbol_for(i);
            let ex_id = EXCHANGES[i % EXCHANGES.len()].0.to_string();
            self.tables.securities.push(Security {
                symbol: symbol.clone(),
                issue: "COMMON".to_string(),
                name: format!("Common of {}", name),
                co_id,
                ex_id,
                num_out: self.rng.gen_range(100_000_000..3_000_000_000),
                pe: round_cents(self.rng.gen_range(5.0..60.0)),
                exch_date: self.config.base_date - Duration::days(self.rng.gen_range(365..3650)),
            });

            self.daily_market(&symbol);

            let price = self.price();
            self.tables.last_trade.insert(
                symbol,
                LastTrade {
                    price,
                    open_price: price,
                    vol: 0,
                    dts: base_dts,
                },
            );

            self.financials(co_id);
            for n in 0..NEWS_PER_COMPANY {
                let days = self.rng.gen_range(1..365);
                self.tables.news.push(NewsItem {
                    co_id,
                    headline: format!("{} news bulletin {}", name, n + 1),
                    summary: format!("Summary of bulletin {} about {}", n + 1, name),
                    item: format!("Full text of bulletin {} about {}.", n + 1, name),
                    dts: base_dts - Duration::days(days),
                });
            }
        }
    }

    fn daily_market(&mut self, symbol: &str) {
        let mut close = self.price();
        for back in (1..=DAILY_MARKET_DAYS).rev() {
            let date = self.config.base_date - Duration::days(back);
            let step: f64 = self.rng.gen_range(-0.5..0.5);
            close = round_cents(
                (close + step).clamp(self.config.price_low, self.config.price_high),
            );
            let spread: f64 = self.rng.gen_range(0.0..0.5);
            self.tables.daily_market.push(DailyMarket {
                symbol: symbol.to_string(),
                date,
                close,
                high: round_cents(close + spread),
                low: round_cents(close - spread),
                vol: self.rng.gen_range(10_000..1_000_000),
            });
        }
    }

    fn financials(&mut self, co_id: i64) {
        let first_year = self.config.base_date.year() - QUARTERS / 4;
        for q in 0..QUARTERS {
            let year = first_year + q / 4;
            let qtr = q % 4 + 1;
            let month = (qtr - 1) as u32 * 3 + 1;
            let qtr_start =
                NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(self.config.base_date);
            let revenue: f64 = round_cents(self.rng.gen_range(1.0e6..5.0e8));
            let margin: f64 = self.rng.gen_range(-0.05..0.2);
            self.tables.financials.push(Financial {
                co_id,
                year,
                qtr,
                qtr_start,
                revenue,
                net_earn: round_cents(revenue * margin),
            });
        }
    }

    fn customers(&mut self) {
        let symbols: Vec<String> = self
            .tables
            .securities
            .iter()
            .map(|s| s.symbol.clone())
            .collect();

        for i in 0..self.config.customers {
            let c_id = FIRST_CUSTOMER_ID + i as i64;
            let f_name = FIRST_NAMES[self.rng.gen_range(0..FIRST_NAMES.len())].to_string();
            let l_name = LAST_NAMES[self.rng.gen_range(0..LAST_NAMES.len())].to_string();
            let tax_id = format!("{:03}-{:02}-{:04}", 100 + i % 900, i / 900 % 100, i % 10_000);
            let tier = (i % 3) as i32 + 1;
            self.tables.customers.push(Customer {
                c_id,
                tax_id: tax_id.clone(),
                f_name: f_name.clone(),
                l_name: l_name.clone(),
                tier,
                email_2: format!("{}.{}@mindspring.com", f_name, l_name).to_lowercase(),
                address_line2: "Apt. 10C".to_string(),
                tax_rates: vec![
                    format!("US{}", self.rng.gen_range(1..=FEDERAL_RATES.len())),
                    format!("ST{}", self.rng.gen_range(1..=STATE_RATES.len())),
                ],
            });

            for j in 0..ACCOUNTS_PER_CUSTOMER {
                let ca_id = FIRST_ACCOUNT_ID + (i * ACCOUNTS_PER_CUSTOMER + j) as i64;
                let b_id = self.tables.brokers[self.rng.gen_range(0..self.tables.brokers.len())].b_id;
                self.tables.accounts.push(Account {
                    ca_id,
                    b_id,
                    c_id,
                    name: format!("{} {} account {}", f_name, l_name, j + 1),
                    tax_st: (j % 3) as i32,
                    bal: round_cents(self.rng.gen_range(10_000.0..100_000.0)),
                });
                self.tables.permissions.push(AccountPermission {
                    ca_id,
                    acl: "0000".to_string(),
                    tax_id: tax_id.clone(),
                    f_name: f_name.clone(),
                    l_name: l_name.clone(),
                });
                if j == 0 {
                    self.tables.permissions.push(AccountPermission {
                        ca_id,
                        acl: "0011".to_string(),
                        tax_id: format!("AP-{:010}", ca_id % 10_000_000_000),
                        f_name: FIRST_NAMES[self.rng.gen_range(0..FIRST_NAMES.len())]
                            .to_string(),
                        l_name: LAST_NAMES[self.rng.gen_range(0..LAST_NAMES.len())]
                            .to_string(),
                    });
                }
            }

            let watched: usize = self.rng.gen_range(5..=10);
            let watched = watched.min(symbols.len());
            let mut list: Vec<String> = Vec::with_capacity(watched);
            while list.len() < watched {
                let s = &symbols[self.rng.gen_range(0..symbols.len())];
                if !list.contains(s) {
                    list.push(s.clone());
                }
            }
            self.tables.watch_lists.insert(c_id, list);
        }
    }

    fn owner_name(&self, ca_id: i64) -> String {
        self.tables
            .account(ca_id)
            .and_then(|a| self.tables.customer(a.c_id))
            .map(|c| format!("{} {}", c.f_name, c.l_name))
            .unwrap_or_default()
    }

    fn tier_of(&self, ca_id: i64) -> i32 {
        self.tables
            .account(ca_id)
            .and_then(|a| self.tables.customer(a.c_id))
            .map(|c| c.tier)
            .unwrap_or(3)
    }

    /// Completed buys, each with its lot, settlement and history.
    fn initial_trades(&mut self) {
        let base_dts = self.base_dts();
        let accounts: Vec<i64> = self.tables.accounts.iter().map(|a| a.ca_id).collect();

        for ca_id in accounts {
            let exec_name = self.owner_name(ca_id);
            let tier = self.tier_of(ca_id);
            for _ in 0..TRADES_PER_ACCOUNT {
                let sec_idx = self.rng.gen_range(0..self.tables.securities.len());
                let symbol = self.tables.securities[sec_idx].symbol.clone();
                let s_name = self.tables.securities[sec_idx].name.clone();
                let trade_type = if self.rng.gen_bool(0.5) {
                    TradeType::MarketBuy
                } else {
                    TradeType::LimitBuy
                };
                let qty = LOT_SIZES[self.rng.gen_range(0..LOT_SIZES.len())];
                let price = self.price();
                let is_cash = self.rng.gen_bool(0.8);
                let dts = base_dts
                    - Duration::days(self.rng.gen_range(1..DAILY_MARKET_DAYS))
                    + Duration::seconds(self.rng.gen_range(34_200..57_600));
                let chrg = trade_charge(trade_type.id(), tier);
                let comm = round_cents(commission_rate(tier) / 100.0 * f64::from(qty) * price);
                let t_id = self.tables.allocate_trade_id();

                self.tables.trades.insert(
                    t_id,
                    Trade {
                        t_id,
                        dts,
                        st_id: status_id::COMPLETED.to_string(),
                        tt_id: trade_type.id().to_string(),
                        is_cash,
                        symbol: symbol.clone(),
                        qty,
                        bid_price: price,
                        ca_id,
                        exec_name: exec_name.clone(),
                        trade_price: Some(price),
                        chrg,
                        comm,
                        tax: 0.0,
                        lifo: self.rng.gen_bool(0.5),
                    },
                );

                if trade_type.is_market() {
                    self.tables.add_history(t_id, dts, status_id::SUBMITTED);
                } else {
                    self.tables.add_history(t_id, dts, status_id::PENDING);
                    self.tables
                        .add_history(t_id, dts + Duration::minutes(1), status_id::SUBMITTED);
                }
                self.tables
                    .add_history(t_id, dts + Duration::minutes(2), status_id::COMPLETED);

                self.tables.holdings.push(Holding {
                    t_id,
                    ca_id,
                    symbol: symbol.clone(),
                    dts,
                    price,
                    qty,
                });
                let held = self.tables.summary_qty(ca_id, &symbol);
                self.tables.set_summary_qty(ca_id, &symbol, held + qty);

                let amt = round_cents(-(f64::from(qty) * price + chrg + comm));
                self.tables.settlements.insert(
                    t_id,
                    Settlement {
                        cash_type: cash_type(is_cash).to_string(),
                        due_date: dts.date() + Duration::days(2),
                        amt,
                    },
                );
                if is_cash {
                    self.tables.cash_transactions.insert(
                        t_id,
                        CashTransaction {
                            dts,
                            amt,
                            name: cash_transaction_name(trade_type.name(), qty, &s_name),
                        },
                    );
                }
            }
        }
    }

    /// A pending limit order on every third account.
    fn pending_orders(&mut self) {
        let base_dts = self.base_dts();
        let accounts: Vec<(i64, i64)> = self
            .tables
            .accounts
            .iter()
            .step_by(3)
            .map(|a| (a.ca_id, a.b_id))
            .collect();
        let limit_types = [TradeType::LimitBuy, TradeType::LimitSell, TradeType::StopLoss];

        for (n, (ca_id, b_id)) in accounts.into_iter().enumerate() {
            let trade_type = limit_types[n % limit_types.len()];
            let symbol = self.tables.securities
                [self.rng.gen_range(0..self.tables.securities.len())]
            .symbol
            .clone();
            let qty = LOT_SIZES[self.rng.gen_range(0..LOT_SIZES.len())];
            let bid_price = self.price();
            let tier = self.tier_of(ca_id);
            let dts = base_dts - Duration::hours(self.rng.gen_range(1..48));
            let exec_name = self.owner_name(ca_id);
            let t_id = self.tables.allocate_trade_id();

            self.tables.trades.insert(
                t_id,
                Trade {
                    t_id,
                    dts,
                    st_id: status_id::PENDING.to_string(),
                    tt_id: trade_type.id().to_string(),
                    is_cash: true,
                    symbol: symbol.clone(),
                    qty,
                    bid_price,
                    ca_id,
                    exec_name,
                    trade_price: None,
                    chrg: trade_charge(trade_type.id(), tier),
                    comm: round_cents(
                        commission_rate(tier) / 100.0 * f64::from(qty) * bid_price,
                    ),
                    tax: 0.0,
                    lifo: true,
                },
            );
            self.tables.add_history(t_id, dts, status_id::PENDING);
            self.tables.trade_requests.push(PendingRequest {
                t_id,
                tt_id: trade_type.id().to_string(),
                symbol,
                qty,
                bid_price,
                b_id,
            });
        }
    }
}

/// Four-letter ticker for the `i`th security: `AAAA`, `AAAB`, ...
fn symbol_for(i: usize) -> String {
    let mut n = i;
    let mut letters = [b'A'; 4];
    for slot in letters.iter_mut().rev() {
        *slot = b'A' + (n % 26) as u8;
        n /= 26;
    }
    letters.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_tables() {
        let config = DatasetConfig {
            customers: 20,
            ..DatasetConfig::default()
        };
        assert_eq!(generate(&config), generate(&config));
    }

    #[test]
    fn ids_and_counts() {
        let tables = generate(&DatasetConfig {
            customers: 20,
            ..DatasetConfig::default()
        });
        assert_eq!(tables.customers.len(), 20);
        assert_eq!(tables.accounts.len(), 20 * ACCOUNTS_PER_CUSTOMER);
        assert_eq!(tables.customers[0].c_id, FIRST_CUSTOMER_ID);
        assert_eq!(tables.accounts[0].ca_id, FIRST_ACCOUNT_ID);
        assert_eq!(tables.trades.keys().next(), Some(&FIRST_TRADE_ID));
        assert_eq!(
            tables.next_trade_id,
            FIRST_TRADE_ID + tables.trades.len() as i64
        );
        assert!(!tables.trade_requests.is_empty());
    }

    #[test]
    fn summaries_match_lots() {
        let tables = generate(&DatasetConfig {
            customers: 10,
            ..DatasetConfig::default()
        });
        for ((ca_id, symbol), qty) in &tables.holding_summary {
            let lots: i32 = tables
                .holdings
                .iter()
                .filter(|h| h.ca_id == *ca_id && &h.symbol == symbol)
                .map(|h| h.qty)
                .sum();
            assert_eq!(lots, *qty);
        }
    }

    #[test]
    fn symbols_are_distinct() {
        assert_eq!(symbol_for(0), "AAAA");
        assert_eq!(symbol_for(1), "AAAB");
        assert_eq!(symbol_for(26), "AABA");
    }
}
