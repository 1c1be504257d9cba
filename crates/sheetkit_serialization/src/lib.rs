//! `sheetkit_serialization` v1:
//! `xlsx` response encoder flattening entity records into one worksheet.
//!
//! Module layout:
//! - `conf`      : fixed field sets and default presets
//! - `spec`      : options, schema plan, records, errors
//! - `store`     : collaborator traits and in-memory backends
//! - `payload`   : payload shape normalization
//! - `planner`   : column planning from the first record
//! - `formatter` : per-record value resolution
//! - `encoder`   : encode orchestration
//! - `util`      : pure JSON/date helpers
pub mod conf;
pub mod encoder;
pub mod formatter;
pub mod payload;
pub mod planner;
pub mod spec;
pub mod store;
pub mod util;

pub use conf::derive_default_export_options;
pub use encoder::XlsxEncoder;
pub use formatter::{RowFormatter, format_value};
pub use payload::EnumPayload;
pub use planner::{derive_ordered_field_names, plan_columns};
pub use spec::{
    DataEncodingError, EnumEncodeFailure, EnumEncodingErrorKind, EnumSubFieldRender,
    EnumValueRule, RawRecord, SpecColumn, SpecEncodeContext, SpecExportOptions,
    SpecFieldDefinition, SpecNestedSlot, SpecSchemaPlan, SpecSubRecord, SpecTerm, StoreError,
};
pub use store::{
    CacheBypass, CodedValueTable, FieldDefinitionRegistry, IdentityTranslator,
    MemoryFieldRegistry, MemoryNestedRecordStore, MemoryTermStore, NestedRecordStore,
    NoopCacheBypass, TermStore, Translator,
};
