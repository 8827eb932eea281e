//! Output sinks: console text, local CSV, S3 Parquet.

pub mod console;
pub mod csv_file;
pub mod parquet_file;

use crate::domain::entities::OutputLocation;
use crate::ports::sink_port::SinkPort;

use console::ConsoleSink;
use csv_file::CsvFileSink;
use parquet_file::S3ParquetSink;

/// Picks the sink for the configured output location.
pub fn sink_for(location: &OutputLocation) -> Box<dyn SinkPort> {
    match location {
        OutputLocation::Console => Box::new(ConsoleSink),
        OutputLocation::LocalPath(path) => Box::new(CsvFileSink::new(path.clone())),
        OutputLocation::S3(uri) => Box::new(S3ParquetSink::new(uri.clone())),
    }
}
