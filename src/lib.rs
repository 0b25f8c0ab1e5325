pub mod apply;
pub mod buffer;
pub mod catalogue;
pub mod error;
pub mod matcher;
pub mod report;
pub mod run;
pub mod source_file;
pub mod validate;
