//! Data Maintenance: periodic small updates to slowly changing tables.

use super::{FramePosition, FrameScope, FrameSpec, Outcome, Transaction};
use crate::error::TxnError;
use crate::inputs::DataMaintenanceInput;
use crate::isolation::IsolationLevel;
use crate::outputs::DataMaintenanceOutput;
use crate::session::DbSession;
use crate::status;
use crate::storage::{FrameId, Value};

/// Tables the frame knows how to touch.
pub const TABLES: [&str; 12] = [
    "ACCOUNT_PERMISSION",
    "ADDRESS",
    "COMPANY",
    "CUSTOMER",
    "CUSTOMER_TAXRATE",
    "DAILY_MARKET",
    "EXCHANGE",
    "FINANCIAL",
    "NEWS_ITEM",
    "SECURITY",
    "TAXRATE",
    "WATCH_ITEM",
];

#[derive(Debug, Default)]
pub struct DataMaintenance;

impl Transaction for DataMaintenance {
    type Input = DataMaintenanceInput;
    type Output = DataMaintenanceOutput;

    const FRAMES: &'static [FrameSpec] = &[FrameSpec::new(
        FrameId::DataMaintenance1,
        IsolationLevel::ReadCommitted,
        FrameScope::Mutating,
        FramePosition::Only,
    )];

    fn run(
        &mut self,
        db: &mut DbSession,
        input: &DataMaintenanceInput,
    ) -> Result<Outcome<DataMaintenanceOutput>, TxnError> {
        if !TABLES.contains(&input.table_name.as_str()) {
            return Ok(Outcome::new(
                status::DATA_MAINTENANCE_UNKNOWN_TABLE,
                DataMaintenanceOutput::default(),
            ));
        }

        let result = Self::FRAMES[0].call(
            db,
            vec![
                Value::from(input.acct_id),
                Value::from(input.c_id),
                Value::from(input.co_id),
                Value::from(input.day_of_month),
                Value::from(input.symbol.as_str()),
                Value::from(input.table_name.as_str()),
                Value::from(input.tx_id.as_str()),
                Value::from(input.vol_incr),
            ],
        )?;

        db.commit()?;
        Ok(Outcome::new(
            status::SUCCESS,
            DataMaintenanceOutput {
                rows_updated: i32::try_from(result.affected).unwrap_or(i32::MAX),
            },
        ))
    }
}
