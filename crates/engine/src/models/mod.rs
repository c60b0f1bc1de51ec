pub mod event;
pub mod match_data;
pub mod matches;
pub mod pesilat;
pub mod schedule;
pub mod timer;

pub use event::{Foul, FoulType, LedgerEvent, ScoreDetail, Technique, Warning, WarningType};
pub use match_data::{Appended, MAX_ENTRY_POINTS, MAX_FOUL_DEDUCTION, PesilatMatchData, reduce_score};
pub use matches::{DEFAULT_TOTAL_ROUNDS, Match, MatchStatus, StatusTransition};
pub use pesilat::{CornerColor, Pesilat};
pub use schedule::{ScheduleCorner, ScheduleTanding, ScheduleTgr, TgrCategory, VenueAssignable};
pub use timer::{MatchTimer, TimerState};
