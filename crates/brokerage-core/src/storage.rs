//! The storage backend boundary.
//!
//! Executors never see SQL. Each frame is one call to a named frame
//! function with positional parameters, answered synchronously with zero
//! or more result sets and an affected-row count. Around those calls the
//! backend only has to understand begin / set-isolation / commit /
//! rollback.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::isolation::IsolationLevel;

/// Every frame function a backend must provide.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FrameId {
    BrokerVolume1,
    CustomerPosition1,
    CustomerPosition2,
    CustomerPosition3,
    MarketFeed1,
    MarketWatch1,
    SecurityDetail1,
    TradeLookup1,
    TradeLookup2,
    TradeLookup3,
    TradeLookup4,
    TradeOrder1,
    TradeOrder2,
    TradeOrder3,
    TradeOrder4,
    TradeOrder5,
    TradeOrder6,
    TradeResult1,
    TradeResult2,
    TradeResult3,
    TradeResult4,
    TradeResult5,
    TradeResult6,
    TradeStatus1,
    TradeUpdate1,
    TradeUpdate2,
    TradeUpdate3,
    DataMaintenance1,
    TradeCleanup1,
}

impl FrameId {
    /// Name of the stored function implementing the frame.
    pub fn function_name(self) -> &'static str {
        match self {
            FrameId::BrokerVolume1 => "BrokerVolumeFrame1",
            FrameId::CustomerPosition1 => "CustomerPositionFrame1",
            FrameId::CustomerPosition2 => "CustomerPositionFrame2",
            FrameId::CustomerPosition3 => "CustomerPositionFrame3",
            FrameId::MarketFeed1 => "MarketFeedFrame1",
            FrameId::MarketWatch1 => "MarketWatchFrame1",
            FrameId::SecurityDetail1 => "SecurityDetailFrame1",
            FrameId::TradeLookup1 => "TradeLookupFrame1",
            FrameId::TradeLookup2 => "TradeLookupFrame2",
            FrameId::TradeLookup3 => "TradeLookupFrame3",
            FrameId::TradeLookup4 => "TradeLookupFrame4",
            FrameId::TradeOrder1 => "TradeOrderFrame1",
            FrameId::TradeOrder2 => "TradeOrderFrame2",
            FrameId::TradeOrder3 => "TradeOrderFrame3",
            FrameId::TradeOrder4 => "TradeOrderFrame4",
            FrameId::TradeOrder5 => "TradeOrderFrame5",
            FrameId::TradeOrder6 => "TradeOrderFrame6",
            FrameId::TradeResult1 => "TradeResultFrame1",
            FrameId::TradeResult2 => "TradeResultFrame2",
            FrameId::TradeResult3 => "TradeResultFrame3",
            FrameId::TradeResult4 => "TradeResultFrame4",
            FrameId::TradeResult5 => "TradeResultFrame5",
            FrameId::TradeResult6 => "TradeResultFrame6",
            FrameId::TradeStatus1 => "TradeStatusFrame1",
            FrameId::TradeUpdate1 => "TradeUpdateFrame1",
            FrameId::TradeUpdate2 => "TradeUpdateFrame2",
            FrameId::TradeUpdate3 => "TradeUpdateFrame3",
            FrameId::DataMaintenance1 => "DataMaintenanceFrame1",
            FrameId::TradeCleanup1 => "TradeCleanupFrame1",
        }
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function_name())
    }
}

/// A parameter or column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Short type name, for decode errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::Timestamp(_) => "timestamp",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

/// One result row, positional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(pub Vec<Value>);

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Row(values)
    }

    fn column(&self, idx: usize) -> Result<&Value, StorageError> {
        self.0.get(idx).ok_or(StorageError::MissingColumn(idx))
    }

    fn mismatch(&self, idx: usize, expected: &'static str) -> StorageError {
        let found = self.0.get(idx).map(Value::kind).unwrap_or("none");
        StorageError::Decode {
            column: idx,
            expected,
            found,
        }
    }

    pub fn int(&self, idx: usize) -> Result<i64, StorageError> {
        match self.column(idx)? {
            Value::Int(v) => Ok(*v),
            _ => Err(self.mismatch(idx, "int")),
        }
    }

    pub fn int32(&self, idx: usize) -> Result<i32, StorageError> {
        let v = self.int(idx)?;
        i32::try_from(v).map_err(|_| self.mismatch(idx, "int32"))
    }

    /// Floats, with integers widened.
    pub fn float(&self, idx: usize) -> Result<f64, StorageError> {
        match self.column(idx)? {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            _ => Err(self.mismatch(idx, "float")),
        }
    }

    pub fn boolean(&self, idx: usize) -> Result<bool, StorageError> {
        match self.column(idx)? {
            Value::Bool(v) => Ok(*v),
            Value::Int(v) => Ok(*v != 0),
            _ => Err(self.mismatch(idx, "bool")),
        }
    }

    pub fn text(&self, idx: usize) -> Result<String, StorageError> {
        match self.column(idx)? {
            Value::Text(v) => Ok(v.clone()),
            _ => Err(self.mismatch(idx, "text")),
        }
    }

    pub fn opt_text(&self, idx: usize) -> Result<Option<String>, StorageError> {
        match self.column(idx)? {
            Value::Null => Ok(None),
            Value::Text(v) => Ok(Some(v.clone())),
            _ => Err(self.mismatch(idx, "text")),
        }
    }

    pub fn date(&self, idx: usize) -> Result<NaiveDate, StorageError> {
        match self.column(idx)? {
            Value::Date(v) => Ok(*v),
            Value::Timestamp(v) => Ok(v.date()),
            _ => Err(self.mismatch(idx, "date")),
        }
    }

    pub fn timestamp(&self, idx: usize) -> Result<NaiveDateTime, StorageError> {
        match self.column(idx)? {
            Value::Timestamp(v) => Ok(*v),
            _ => Err(self.mismatch(idx, "timestamp")),
        }
    }
}

/// What a frame call returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub result_sets: Vec<Vec<Row>>,
    /// Rows inserted, updated or deleted by the call.
    pub affected: u64,
}

impl QueryResult {
    pub fn empty() -> Self {
        QueryResult::default()
    }

    pub fn single(rows: Vec<Row>) -> Self {
        QueryResult {
            result_sets: vec![rows],
            affected: 0,
        }
    }

    pub fn with_affected(mut self, affected: u64) -> Self {
        self.affected = affected;
        self
    }

    /// The first result set, or nothing.
    pub fn rows(&self) -> &[Row] {
        self.set(0)
    }

    pub fn set(&self, idx: usize) -> &[Row] {
        self.result_sets.get(idx).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A frame function invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameCall {
    pub frame: FrameId,
    pub params: Vec<Value>,
}

impl FrameCall {
    pub fn new(frame: FrameId, params: Vec<Value>) -> Self {
        FrameCall { frame, params }
    }

    pub fn param(&self, idx: usize) -> Result<&Value, StorageError> {
        self.params.get(idx).ok_or(StorageError::MissingParam {
            frame: self.frame,
            idx,
        })
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot connect to storage: {0}")]
    Connect(String),

    #[error("{frame} failed: {reason}")]
    Execute { frame: FrameId, reason: String },

    #[error("{frame}: missing parameter {idx}")]
    MissingParam { frame: FrameId, idx: usize },

    #[error("column {0} missing from result row")]
    MissingColumn(usize),

    #[error("column {column}: expected {expected}, found {found}")]
    Decode {
        column: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{0}")]
    Transaction(String),
}

/// One persistent connection to the storage backend.
///
/// A connection is owned by exactly one worker for its whole life and is
/// never used from two threads at once.
pub trait StorageConnection: Send {
    fn begin(&mut self) -> Result<(), StorageError>;
    fn set_isolation(&mut self, level: IsolationLevel) -> Result<(), StorageError>;
    fn execute(&mut self, call: &FrameCall) -> Result<QueryResult, StorageError>;
    fn commit(&mut self) -> Result<(), StorageError>;
    fn rollback(&mut self) -> Result<(), StorageError>;
}

/// Opens storage connections; shared by every worker of a server.
pub trait StorageConnector: Send + Sync {
    fn connect(&self) -> Result<Box<dyn StorageConnection>, StorageError>;
}
