//! Broker Volume: pending trade-request volume per broker in a sector.

use super::{count, FramePosition, FrameScope, FrameSpec, Outcome, Transaction};
use crate::error::TxnError;
use crate::inputs::BrokerVolumeInput;
use crate::isolation::IsolationLevel;
use crate::limits::MAX_BROKER_LIST_LEN;
use crate::outputs::BrokerVolumeOutput;
use crate::session::DbSession;
use crate::status;
use crate::storage::{FrameId, Value};

#[derive(Debug, Default)]
pub struct BrokerVolume;

impl Transaction for BrokerVolume {
    type Input = BrokerVolumeInput;
    type Output = BrokerVolumeOutput;

    const FRAMES: &'static [FrameSpec] = &[FrameSpec::new(
        FrameId::BrokerVolume1,
        IsolationLevel::ReadCommitted,
        FrameScope::ReadOnly,
        FramePosition::Only,
    )];

    fn run(
        &mut self,
        db: &mut DbSession,
        input: &BrokerVolumeInput,
    ) -> Result<Outcome<BrokerVolumeOutput>, TxnError> {
        let frame = &Self::FRAMES[0];

        let mut params = Vec::with_capacity(1 + input.broker_list.len());
        params.push(Value::from(input.sector_name.as_str()));
        params.extend(input.broker_list.iter().map(|b| Value::from(b.as_str())));

        let result = frame.call(db, params)?;

        let mut out = BrokerVolumeOutput::default();
        for row in result.rows() {
            out.broker_name.push(row.text(0)?);
            out.volume.push(row.float(1)?);
        }
        out.list_len = count(out.broker_name.len());

        if out.list_len < 0 || out.list_len as usize > MAX_BROKER_LIST_LEN {
            db.rollback()?;
            return Ok(Outcome::new(status::BROKER_VOLUME_BAD_LIST_LEN, out));
        }

        db.commit()?;
        Ok(Outcome::new(status::SUCCESS, out))
    }
}
