pub mod io;
pub mod polars_ext;
pub mod summary;
