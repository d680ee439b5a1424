//! API request/response models.

pub mod requests;
pub mod responses;
pub mod statistics;

pub use requests::{
    AttachmentResponse, CreateReportRequestRequest, ForwardReportRequestRequest,
    ListRequestsQuery, ReportRequestResponse, RequestHistoryResponse, UpdateReportRequestRequest,
    UpdateStatusRequest, UploadQuery,
};
pub use responses::{
    EvaluateRequest, ReportResponseDto, ResponseCommentDto, ResponseHistoryDto,
    ResponseItemDto, ResponseItemRequest, SelfEvaluateRequest, SendBackRequest,
    SubmitResponseRequest,
};
pub use statistics::{
    DocumentFileDto, NamedRefDto, StatisticsResponse, StatisticsRowDto, StatisticsSummaryDto,
};
