//! Moving register data in and out of the store.
//!
//! - **CSV report**: a read-only master report joining the roster with
//!   attendance totals and exam scores, for spreadsheets.
//! - **JSON backup**: a snapshot of every store key that can be restored
//!   later, replacing the store wholesale.
//!
//! # Example
//!
//! ```
//! use student_register::exchange::{export_backup, import_backup, render_backup};
//! use student_register::{AccessContext, Storage};
//!
//! let store = Storage::open_in_memory()?;
//! store.set("theme", "dark")?;
//!
//! let text = render_backup(&export_backup(&store)?)?;
//! store.clear()?;
//! import_backup(&AccessContext::admin(), &store, &text)?;
//!
//! assert_eq!(store.get("theme")?.as_deref(), Some("dark"));
//! # Ok::<(), student_register::Error>(())
//! ```

mod backup;
mod report;

pub use backup::{
    backup_file_name, clear_all, decode_backup, export_backup, import_backup, render_backup,
};
pub use report::{
    attendance_totals, export_csv, report_header, AttendanceTotals, ReportInputs,
    REPORT_FILE_NAME,
};
