// Domain layer - River schemas, tables and views
pub mod resample;
pub mod river;
pub mod table;
pub mod view;
