use super::model::StatusRecord;
use crate::state::AppState;
use anyhow::Result;

pub struct VideoService;

impl VideoService {
    pub async fn find_status(state: AppState, video_id: &str) -> Result<Option<StatusRecord>> {
        Ok(state.status.get(video_id).await?)
    }
}
