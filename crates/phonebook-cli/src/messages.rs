use phonebook_core::BatchReport;

pub const INVALID_FORMAT: &str =
    "The phone number does not match the 07XXXXXXXX or 7XXXXXXXX format. Please check it.";
pub const SAVED: &str = "The phone number was saved";
pub const ALREADY_EXISTS: &str = "The phone number already exists";
pub const ERROR_RECORDED: &str = "An error occurred and the details were recorded. \
     Contact support or try again after checking your data.";

pub fn batch_saved(report: &BatchReport) -> String {
    format!(
        "Saved {} of {} numbers ({} invalid, {} rejected by the store)",
        report.inserted, report.received, report.rejected_invalid, report.rejected_by_store
    )
}

pub fn batch_failed(report: &BatchReport) -> String {
    format!(
        "{} numbers were not saved ({} invalid, {} not stored). {ERROR_RECORDED}",
        report.not_saved(),
        report.rejected_invalid,
        report.rejected_by_store
    )
}
