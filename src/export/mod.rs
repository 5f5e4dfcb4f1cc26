pub mod csv_report;

pub use csv_report::{
    opportunity_file_name, report_file_name, write_consolidated_report, write_opportunity_report,
};
