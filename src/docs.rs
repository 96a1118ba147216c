use utoipa::OpenApi;
use crate::modules::video::dto::{ProcessVideoResponse, PushEnvelope, PushMessage, VideoNotification};
use crate::modules::video::model::{StatusRecord, VideoStatus};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::video::handler::process_video,
        crate::modules::video::handler::get_video_status,
    ),
    components(
        schemas(
            PushEnvelope, PushMessage, VideoNotification,
            ProcessVideoResponse, StatusRecord, VideoStatus,
        )
    ),
    tags(
        (name = "Processing", description = "Video transcoding pipeline")
    )
)]
pub struct ApiDoc;
