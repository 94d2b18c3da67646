//! ledgerlens-core: canonical statement model, amount-classification policy,
//! and pipeline configuration shared by every parser.

pub mod config;
pub mod policy;
pub mod statement;

pub use config::PipelineConfig;
pub use policy::{AmountRole, classify_amount, split_quantity_value};
pub use statement::{
    FeeKind, ParsedAllocation, ParsedFee, ParsedPosition, ParsedStatement, meta,
};
