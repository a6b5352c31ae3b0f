pub mod app_state;
pub mod snapshot;
pub mod user_record;

pub use app_state::AppState;
pub use snapshot::Snapshot;
pub use user_record::UserRecord;
