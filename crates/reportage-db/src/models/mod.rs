//! Database row models.

pub mod department;
pub mod history;
pub mod organization;
pub mod position;
pub mod report_request;
pub mod report_response;
pub mod role;
pub mod user;

pub use department::DepartmentRow;
pub use history::{RequestHistoryRow, ResponseCommentRow, ResponseHistoryRow};
pub use organization::OrganizationRow;
pub use position::PositionRow;
pub use report_request::{ReportRequestAttachmentRow, ReportRequestRow};
pub use report_response::{ReportResponseRow, ResponseItemRow};
pub use role::RoleRow;
pub use user::{CreateUser, UpdateUser, UserRow};
