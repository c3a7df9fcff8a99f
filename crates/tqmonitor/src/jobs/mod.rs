pub mod browser;
pub mod detail;
pub mod model;
pub mod normalize;
pub mod payload;
pub mod poller;
pub mod relation;
pub mod render;
pub mod state;

pub use browser::{JobBrowser, Strategy};
pub use detail::DetailResolver;
pub use model::{
    ChainRecord, GroupRecord, JobRecord, JobStatus, NormalizedRecord, PageRequest, PageResult,
    RecordKind, StatsSnapshot, StatusFilter,
};
pub use poller::{PollState, PollUpdate, PollingController};
pub use relation::{ChainView, GroupView};
pub use state::{AppState, JobsCursor, Panel, RequestTicket, View};
